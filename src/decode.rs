//! Streaming decode of concatenated JSON event records out of one archive.
//!
//! A decompressed archive is a bare sequence of JSON objects with no
//! separator between them: not an array, not newline-delimited. Decoding
//! therefore parses exactly one value at the cursor and resumes from the
//! byte immediately after it, until the buffer is exhausted.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use serde_json::Value;
use tracing::debug;

use crate::error::{ArchiveFormatError, IngestError};

/// One decoded activity notification. Opaque except for its `type` field.
pub type EventRecord = Value;

/// Read one compressed archive file into its decompressed text buffer.
pub fn read_archive(path: &Path) -> Result<String, IngestError> {
    let file = File::open(path)?;
    let mut buffer = String::new();
    GzDecoder::new(file)
        .read_to_string(&mut buffer)
        .map_err(|source| ArchiveFormatError::Gunzip {
            path: path.to_owned(),
            source,
        })?;
    debug!(path = %path.display(), bytes = buffer.len(), "decompressed archive");
    Ok(buffer)
}

/// Iterator over the concatenated records of one decompressed buffer.
///
/// Exhaustion of the stream is end-of-buffer; an `Err` item is corruption
/// and carries the byte offset where the failing object began. There is no
/// partial-record recovery past that point.
pub struct RecordStream<'a> {
    path: &'a Path,
    inner: serde_json::StreamDeserializer<'a, serde_json::de::StrRead<'a>, Value>,
}

impl<'a> RecordStream<'a> {
    pub fn new(path: &'a Path, buffer: &'a str) -> Self {
        Self {
            path,
            inner: serde_json::Deserializer::from_str(buffer).into_iter(),
        }
    }

    /// Index just past the last successfully decoded record.
    pub fn byte_offset(&self) -> usize {
        self.inner.byte_offset()
    }
}

impl Iterator for RecordStream<'_> {
    type Item = Result<EventRecord, ArchiveFormatError>;

    fn next(&mut self) -> Option<Self::Item> {
        let offset = self.inner.byte_offset();
        match self.inner.next()? {
            Ok(record) => Some(Ok(record)),
            Err(source) => Some(Err(ArchiveFormatError::Decode {
                path: self.path.to_owned(),
                offset,
                source,
            })),
        }
    }
}

/// Decode every record of `buffer`, failing on the first malformed object.
pub fn decode_all(path: &Path, buffer: &str) -> Result<Vec<EventRecord>, ArchiveFormatError> {
    RecordStream::new(path, buffer).collect()
}

/// Routing key for classification: the record's top-level `type` field.
pub fn event_type(record: &EventRecord) -> Option<&str> {
    record.get("type").and_then(Value::as_str)
}
