use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn help_lists_subcommands() {
    Command::cargo_bin("verba")
        .unwrap()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("extract"))
        .stdout(predicate::str::contains("audit"))
        .stdout(predicate::str::contains("calc"))
        .stdout(predicate::str::contains("export"));
}

#[test]
fn extract_requires_files() {
    Command::cargo_bin("verba")
        .unwrap()
        .arg("extract")
        .assert()
        .failure()
        .stderr(predicate::str::contains("ao menos um arquivo"));
}

#[test]
fn extract_reports_unreadable_file_without_aborting() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("corrupto.pdf");
    std::fs::write(&bad, b"not a pdf").unwrap();

    Command::cargo_bin("verba")
        .unwrap()
        .arg("extract")
        .arg(&bad)
        .assert()
        .success()
        .stdout(predicate::str::contains("corrupto.pdf"))
        .stdout(predicate::str::contains("ERRO"));
}

#[test]
fn export_csv_writes_header_row() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("corrupto.pdf");
    std::fs::write(&bad, b"not a pdf").unwrap();
    let out = dir.path().join("saida.csv");

    Command::cargo_bin("verba")
        .unwrap()
        .args(["export", "csv"])
        .arg(&bad)
        .arg("--output")
        .arg(&out)
        .assert()
        .success();

    let content = std::fs::read_to_string(&out).unwrap();
    let header = content.lines().next().unwrap();
    assert_eq!(header.split(';').count(), 13);
    assert!(header.starts_with("Arquivo;Nome"));
}

#[test]
fn status_shows_index_tables() {
    Command::cargo_bin("verba")
        .unwrap()
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("Tabela SELIC"))
        .stdout(predicate::str::contains("Tabela INPC"));
}

#[test]
fn unknown_index_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let bad = dir.path().join("stub.pdf");
    std::fs::write(&bad, b"not a pdf").unwrap();

    Command::cargo_bin("verba")
        .unwrap()
        .arg("audit")
        .arg(&bad)
        .args(["--corrected", "--index", "IGPM"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Unknown correction index"));
}
