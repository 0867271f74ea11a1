use predicates::prelude::*;
use std::fs;
use tempfile::tempdir;

#[test]
fn status_reports_paths_and_store() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("logs.json"), "[]").expect("write store");

    assert_cmd::cargo::cargo_bin_cmd!("astraea")
        .current_dir(tmp.path())
        .env("ASTRAEA_HOME", tmp.path())
        .arg("status")
        .assert()
        .success()
        .stdout(predicate::str::contains("store.backend=file"))
        .stdout(predicate::str::contains("store.records=0"))
        .stdout(predicate::str::contains("cycle_plans=1"));
}

#[test]
fn status_flags_misspelled_env_vars() {
    let tmp = tempdir().expect("tempdir");
    fs::write(tmp.path().join("logs.json"), "[]").expect("write store");

    assert_cmd::cargo::cargo_bin_cmd!("astraea")
        .current_dir(tmp.path())
        .env("ASTRAEA_HOME", tmp.path())
        .env("ASTRAEA_WRTIE_KEY", "oops")
        .arg("status")
        .assert()
        .failure()
        .stdout(predicate::str::contains("unknown env var ASTRAEA_WRTIE_KEY"));
}

#[test]
fn invalid_config_fails_commands() {
    let tmp = tempdir().expect("tempdir");
    fs::write(
        tmp.path().join("astraea.toml"),
        "[store]\nbackend = \"s3\"\n",
    )
    .expect("write config");

    assert_cmd::cargo::cargo_bin_cmd!("astraea")
        .current_dir(tmp.path())
        .env("ASTRAEA_HOME", tmp.path())
        .env_remove("ASTRAEA_STORE_BACKEND")
        .arg("list")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown store backend"));
}
