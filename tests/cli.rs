use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_every_source_selection_flag() {
    let mut cmd = Command::cargo_bin("archive-ingest").expect("Binary exists");
    cmd.arg("ingest").arg("--help");

    cmd.assert().success().stdout(
        predicate::str::contains("--url")
            .and(predicate::str::contains("--date"))
            .and(predicate::str::contains("--source-dir"))
            .and(predicate::str::contains("--zip"))
            .and(predicate::str::contains("--files"))
            .and(predicate::str::contains("--delete-after")),
    );
}

#[test]
fn invoking_without_a_source_fails_with_the_exactly_one_message() {
    let mut cmd = Command::cargo_bin("archive-ingest").expect("Binary exists");
    cmd.arg("ingest");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("no archive source supplied"));
}

#[test]
fn invoking_with_two_sources_names_the_offending_flags() {
    let mut cmd = Command::cargo_bin("archive-ingest").expect("Binary exists");
    cmd.arg("ingest")
        .arg("--url")
        .arg("http://example.org/a.json.gz")
        .arg("--zip")
        .arg("/tmp/archives.zip");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("multiple archive sources"));
}

#[test]
fn a_bad_date_expression_fails_before_touching_the_network() {
    let mut cmd = Command::cargo_bin("archive-ingest").expect("Binary exists");
    cmd.arg("ingest").arg("--date").arg("2012-4-05-2");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("month"));
}
