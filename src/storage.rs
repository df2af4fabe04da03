//! Document-store gateway and aggregation stage builders.
//!
//! The [`Storage`] trait is the seam between the ingestion pipeline and the
//! backing document store: bulk writes into named collections plus the
//! administrative operations (enumerate, drop) the surrounding tooling
//! needs. [`MongoStore`] is the production implementation; tests use the
//! generated `MockStorage`.

use async_trait::async_trait;
use mockall::automock;
use mongodb::bson::{doc, Bson, Document};
use mongodb::{Client, Database};
use thiserror::Error;
use tracing::info;

use crate::decode::EventRecord;

/// Failures talking to the document store. Always fatal for the run.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("invalid event-store connection string `{uri}`")]
    Connect {
        uri: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("bulk write to collection `{collection}` failed")]
    Write {
        collection: String,
        #[source]
        source: mongodb::error::Error,
    },

    #[error("event-store admin operation failed")]
    Admin(#[source] mongodb::error::Error),

    #[error("record is not a JSON object and cannot be stored")]
    NotADocument(#[source] mongodb::bson::ser::Error),
}

/// Gateway to a named database within the document store. One long-lived
/// handle is constructed per run and reused sequentially across all writes.
#[cfg_attr(any(test, feature = "test-export-mocks"), automock)]
#[async_trait]
pub trait Storage: Send + Sync {
    /// Bulk-insert a batch of documents into a named collection.
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), StorageError>;

    /// Names of every database on the store.
    async fn database_names(&self) -> Result<Vec<String>, StorageError>;

    /// Names of every collection in this database.
    async fn collection_names(&self) -> Result<Vec<String>, StorageError>;

    /// Drop one collection of this database.
    async fn drop_collection(&self, collection: &str) -> Result<(), StorageError>;

    /// Drop this database entirely.
    async fn drop_database(&self) -> Result<(), StorageError>;
}

/// Production gateway over the MongoDB driver.
pub struct MongoStore {
    client: Client,
    database: Database,
}

impl MongoStore {
    /// Build the handle for one run. The driver connects lazily, so this
    /// validates the connection string rather than dialling the server.
    pub async fn connect(uri: &str, database: &str) -> Result<Self, StorageError> {
        let client = Client::with_uri_str(uri)
            .await
            .map_err(|source| StorageError::Connect {
                uri: uri.to_owned(),
                source,
            })?;
        let database = client.database(database);
        info!(database = database.name(), "configured event store");
        Ok(Self { client, database })
    }
}

#[async_trait]
impl Storage for MongoStore {
    async fn insert_many(
        &self,
        collection: &str,
        documents: Vec<Document>,
    ) -> Result<(), StorageError> {
        self.database
            .collection::<Document>(collection)
            .insert_many(documents)
            .await
            .map(|_| ())
            .map_err(|source| StorageError::Write {
                collection: collection.to_owned(),
                source,
            })
    }

    async fn database_names(&self) -> Result<Vec<String>, StorageError> {
        self.client
            .list_database_names()
            .await
            .map_err(StorageError::Admin)
    }

    async fn collection_names(&self) -> Result<Vec<String>, StorageError> {
        self.database
            .list_collection_names()
            .await
            .map_err(StorageError::Admin)
    }

    async fn drop_collection(&self, collection: &str) -> Result<(), StorageError> {
        self.database
            .collection::<Document>(collection)
            .drop()
            .await
            .map_err(StorageError::Admin)
    }

    async fn drop_database(&self) -> Result<(), StorageError> {
        self.database.drop().await.map_err(StorageError::Admin)
    }
}

/// Convert a decoded event record into a storable BSON document.
pub fn to_document(record: &EventRecord) -> Result<Document, StorageError> {
    mongodb::bson::to_document(record).map_err(StorageError::NotADocument)
}

// Aggregation stage builders consumed by the analysis layer. Each wraps its
// argument in the corresponding pipeline stage skeleton; the ingestion core
// treats the stages as opaque.

pub fn filter_stage(body: Document) -> Document {
    doc! { "$match": body }
}

pub fn group_stage(body: Document) -> Document {
    doc! { "$group": body }
}

pub fn sort_stage(body: Document) -> Document {
    doc! { "$sort": body }
}

pub fn project_stage(body: Document) -> Document {
    doc! { "$project": body }
}

pub fn unwind_stage(body: impl Into<Bson>) -> Document {
    doc! { "$unwind": body.into() }
}
