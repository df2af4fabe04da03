use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

use tempfile::tempdir;
use zip::write::SimpleFileOptions;

use archive_ingest::acquire::{resolve, ArchiveSource, SourceSelection};
use archive_ingest::download::MockDownload;
use archive_ingest::error::{ArchiveFormatError, ArgumentError, IngestError};

const URL_TEMPLATE: &str = "http://data.githubarchive.org/{date}.json.gz";

#[test]
fn selecting_no_source_is_an_argument_error() {
    let err = ArchiveSource::select(SourceSelection::default()).unwrap_err();
    assert_eq!(err, ArgumentError::NoSource);
}

#[test]
fn selecting_two_sources_names_both_flags() {
    let err = ArchiveSource::select(SourceSelection {
        url: Some("http://example.org/a.json.gz".to_owned()),
        zip: Some(PathBuf::from("/tmp/archives.zip")),
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(
        err,
        ArgumentError::MultipleSources {
            flags: vec!["url", "zip"],
        }
    );
}

#[test]
fn an_empty_value_for_the_chosen_mode_is_rejected() {
    let err = ArchiveSource::select(SourceSelection {
        date: Some(String::new()),
        ..Default::default()
    })
    .unwrap_err();
    assert_eq!(err, ArgumentError::EmptyValue { flag: "date" });
}

#[test]
fn a_single_supplied_mode_becomes_that_source() {
    let source = ArchiveSource::select(SourceSelection {
        date: Some("2012-04-05-2".to_owned()),
        ..Default::default()
    })
    .unwrap();
    assert_eq!(source, ArchiveSource::DateRange("2012-04-05-2".to_owned()));
}

#[tokio::test]
async fn directory_mode_uses_the_path_as_is_and_stays_user_owned() {
    let dir = tempdir().unwrap();
    let downloader = MockDownload::new();

    let workdir = resolve(
        &ArchiveSource::Directory(dir.path().to_owned()),
        &dir.path().join("unused-workdir"),
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap();

    assert_eq!(workdir.path, dir.path());
    assert!(workdir.user_owned);
    assert!(dir.path().exists());
}

#[tokio::test]
async fn date_mode_substitutes_the_validated_expression_into_the_template() {
    let dir = tempdir().unwrap();
    let workdir = dir.path().join("work");

    let mut downloader = MockDownload::new();
    downloader
        .expect_fetch()
        .withf(|url, _dest| {
            url == "http://data.githubarchive.org/2012-04-{05..25}-{2..18}.json.gz"
        })
        .times(1)
        .returning(|_url, dest| Ok(dest.join("2012-04-05-2.json.gz")));

    let resolved = resolve(
        &ArchiveSource::DateRange("2012-04-{05..25}-{2..18}".to_owned()),
        &workdir,
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap();

    assert!(!resolved.user_owned);
    assert!(workdir.is_dir());
}

#[tokio::test]
async fn an_invalid_date_expression_fails_before_any_download() {
    let dir = tempdir().unwrap();
    let downloader = MockDownload::new();

    let err = resolve(
        &ArchiveSource::DateRange("2012-4-05-2".to_owned()),
        &dir.path().join("work"),
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap_err();

    assert!(matches!(err, IngestError::DateExpression(_)));
}

#[tokio::test]
async fn url_mode_clears_the_working_directory_before_fetching() {
    let dir = tempdir().unwrap();
    let workdir = dir.path().join("work");
    std::fs::create_dir_all(&workdir).unwrap();
    std::fs::write(workdir.join("stale.json.gz"), b"old").unwrap();

    let mut downloader = MockDownload::new();
    downloader
        .expect_fetch()
        .times(1)
        .returning(|_url, dest| Ok(dest.join("fresh.json.gz")));

    resolve(
        &ArchiveSource::Url("http://example.org/fresh.json.gz".to_owned()),
        &workdir,
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap();

    assert!(!workdir.join("stale.json.gz").exists());
}

#[tokio::test]
async fn zip_mode_extracts_archives_into_the_working_directory() {
    let dir = tempdir().unwrap();
    let zip_path = dir.path().join("archives.zip");
    let workdir = dir.path().join("work");

    let mut writer = zip::ZipWriter::new(File::create(&zip_path).unwrap());
    writer
        .start_file("2012-04-05-2.json.gz", SimpleFileOptions::default())
        .unwrap();
    writer.write_all(b"payload").unwrap();
    writer.finish().unwrap();

    let downloader = MockDownload::new();
    let resolved = resolve(
        &ArchiveSource::ZipFile(zip_path),
        &workdir,
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap();

    assert!(resolved.path.join("2012-04-05-2.json.gz").is_file());
}

#[tokio::test]
async fn a_non_zip_input_is_an_archive_format_error() {
    let dir = tempdir().unwrap();
    let not_a_zip = dir.path().join("not-a-zip.zip");
    std::fs::write(&not_a_zip, b"plain text").unwrap();

    let downloader = MockDownload::new();
    let err = resolve(
        &ArchiveSource::ZipFile(not_a_zip),
        &dir.path().join("work"),
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap_err();

    assert!(matches!(
        err,
        IngestError::ArchiveFormat(ArchiveFormatError::BadZip { .. })
    ));
}

#[tokio::test]
async fn file_list_copies_valid_files_and_collects_every_invalid_name() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("present.json.gz"), b"data").unwrap();
    let workdir = dir.path().join("work");

    let entry = format!("{},present.json.gz,missing.json.gz", src.display());
    let downloader = MockDownload::new();
    let err = resolve(
        &ArchiveSource::FileList(vec![entry]),
        &workdir,
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap_err();

    // The valid file was copied before the collected failure came back.
    assert!(workdir.join("present.json.gz").is_file());
    match err {
        IngestError::FileResolution { invalid } => {
            assert_eq!(invalid, vec!["missing.json.gz".to_owned()]);
        }
        other => panic!("expected a file-resolution error, got {other:?}"),
    }
}

#[tokio::test]
async fn a_bare_absolute_path_entry_resolves_to_its_own_file() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    let file = src.join("2012-04-05-2.json.gz");
    std::fs::write(&file, b"data").unwrap();
    let workdir = dir.path().join("work");

    let downloader = MockDownload::new();
    let resolved = resolve(
        &ArchiveSource::FileList(vec![file.display().to_string()]),
        &workdir,
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap();

    assert!(resolved.path.join("2012-04-05-2.json.gz").is_file());
}

#[tokio::test]
async fn unresolved_names_accumulate_across_the_whole_list() {
    let dir = tempdir().unwrap();
    let src = dir.path().join("src");
    std::fs::create_dir_all(&src).unwrap();
    std::fs::write(src.join("ok.json.gz"), b"data").unwrap();
    let workdir = dir.path().join("work");

    let entries = vec![
        format!("{},ok.json.gz,gone.json.gz", src.display()),
        format!("{}/nowhere", dir.path().display()),
    ];
    let downloader = MockDownload::new();
    let err = resolve(
        &ArchiveSource::FileList(entries),
        &workdir,
        URL_TEMPLATE,
        &downloader,
    )
    .await
    .unwrap_err();

    match err {
        IngestError::FileResolution { invalid } => {
            assert_eq!(invalid.len(), 2);
            assert!(invalid.contains(&"gone.json.gz".to_owned()));
        }
        other => panic!("expected a file-resolution error, got {other:?}"),
    }
}
