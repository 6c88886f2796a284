//! End-to-end CLI tests for the ff-downloader binary.

#![allow(deprecated)]

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Binary command run inside `workdir` with an empty config home.
fn command_in(workdir: &Path) -> Command {
    let config_home = workdir.join("xdg-config");
    std::fs::create_dir_all(&config_home).unwrap();

    let mut cmd = Command::cargo_bin("ff-downloader").unwrap();
    cmd.current_dir(workdir)
        .env("XDG_CONFIG_HOME", &config_home)
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn test_binary_help_displays_usage() {
    let tempdir = TempDir::new().unwrap();
    command_in(tempdir.path())
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("direct downloads"));
}

#[test]
fn test_binary_invalid_flag_returns_error() {
    let tempdir = TempDir::new().unwrap();
    command_in(tempdir.path())
        .arg("--invalid-flag")
        .assert()
        .failure()
        .stderr(predicate::str::contains("error"));
}

#[test]
fn test_missing_links_file_writes_template_and_exits_one() {
    let tempdir = TempDir::new().unwrap();
    let out_dir = tempdir.path().join("out");

    command_in(tempdir.path())
        .arg("-o")
        .arg(&out_dir)
        .assert()
        .code(1)
        .stdout(predicate::str::contains("links.txt"));

    let template = std::fs::read_to_string(tempdir.path().join("links.txt")).unwrap();
    assert_eq!(template, "- https://fuckingfast.co/example.iso\n");
    assert!(!out_dir.exists(), "nothing should be downloaded");
}

#[test]
fn test_empty_links_file_exits_zero() {
    let tempdir = TempDir::new().unwrap();
    std::fs::write(tempdir.path().join("links.txt"), "\n   \n").unwrap();

    command_in(tempdir.path())
        .arg("-o")
        .arg(tempdir.path().join("out"))
        .assert()
        .success()
        .stdout(predicate::str::contains("No links to download."));
}

#[test]
fn test_invalid_config_file_exits_two() {
    let tempdir = TempDir::new().unwrap();
    let config_path = tempdir.path().join("bad.toml");
    std::fs::write(&config_path, "workers = 0\n").unwrap();
    std::fs::write(tempdir.path().join("links.txt"), "https://example.invalid/x\n").unwrap();

    command_in(tempdir.path())
        .arg("--config")
        .arg(&config_path)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("workers"));
}

#[tokio::test]
async fn test_partial_failure_still_exits_zero_with_summary() {
    let server = MockServer::start().await;
    for name in ["one", "two"] {
        Mock::given(method("GET"))
            .and(path(format!("/dl/{name}.bin")))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(name.as_bytes().to_vec()))
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/dl/missing.bin"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let tempdir = TempDir::new().unwrap();
    let links_path = tempdir.path().join("my-links.txt");
    std::fs::write(
        &links_path,
        format!(
            "- {0}/dl/one.bin\n\n- {0}/dl/missing.bin\n{0}/dl/two.bin\n",
            server.uri()
        ),
    )
    .unwrap();
    let out_dir = tempdir.path().join("out");

    command_in(tempdir.path())
        .arg("-i")
        .arg(&links_path)
        .arg("-o")
        .arg(&out_dir)
        .arg("-w")
        .arg("2")
        .arg("--direct-host")
        .arg(server.address().to_string())
        .assert()
        .success()
        .stdout(predicate::str::contains("Done: 2 downloaded, 1 failed (3 total)"))
        .stdout(predicate::str::contains("missing.bin"));

    assert_eq!(std::fs::read(out_dir.join("one.bin")).unwrap(), b"one");
    assert_eq!(std::fs::read(out_dir.join("two.bin")).unwrap(), b"two");
    assert!(!out_dir.join("missing.bin").exists());
}
