use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

#[test]
fn no_arguments_prints_usage() {
    cargo_bin_cmd!("crashsift")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn too_many_arguments_prints_usage() {
    cargo_bin_cmd!("crashsift")
        .arg("core.1")
        .arg("core.2")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Usage"));
}

#[test]
fn missing_core_file_is_reported_on_stderr() {
    let temp = tempdir().unwrap();
    let missing = temp.path().join("core.404");
    cargo_bin_cmd!("crashsift")
        .arg(&missing)
        .assert()
        .failure()
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains(format!("File not found : {}", missing.display())));
}

#[test]
fn version_flag_reports_version() {
    cargo_bin_cmd!("crashsift")
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(crashsift_core::version()));
}

#[test]
fn core_file_named_tools_is_analyzed_when_path_qualified() {
    let temp = tempdir().unwrap();
    cargo_bin_cmd!("crashsift")
        .current_dir(temp.path())
        .arg("./tools")
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found : ./tools"));
    cargo_bin_cmd!("crashsift")
        .current_dir(temp.path())
        .args(["--", "tools"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("File not found : tools"));
}

#[test]
fn help_explains_core_file_named_tools() {
    cargo_bin_cmd!("crashsift")
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("./tools"));
}
