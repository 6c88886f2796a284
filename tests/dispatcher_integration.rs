//! Integration tests for the concurrent dispatcher.

use std::collections::HashSet;
use std::time::{Duration, Instant};

use ff_downloader_core::{DownloadEngine, DownloaderConfig, FailureKind};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config_for(server: &MockServer, output_dir: &std::path::Path) -> DownloaderConfig {
    DownloaderConfig::new(output_dir)
        .with_direct_host(server.address().to_string())
        .with_page_timeout(Duration::from_millis(300))
        .with_fetch_timeout(Duration::from_millis(500))
}

async fn mount_file(server: &MockServer, file_path: &str, body: &[u8]) {
    Mock::given(method("GET"))
        .and(path(file_path))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(body.to_vec()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_one_timeout_does_not_stop_other_links() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    for name in ["a", "b"] {
        Mock::given(method("GET"))
            .and(path(format!("/page/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!(
                "<script>window.open('{}/dl/{name}.bin')</script>",
                server.uri()
            )))
            .mount(&server)
            .await;
        mount_file(&server, &format!("/dl/{name}.bin"), name.as_bytes()).await;
    }
    // Landing page and fallback fetch both stall past their timeouts.
    Mock::given(method("GET"))
        .and(path("/page/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let links = vec![
        format!("{}/page/a", server.uri()),
        format!("{}/page/slow", server.uri()),
        format!("{}/page/b", server.uri()),
    ];
    let engine = DownloadEngine::new(config_for(&server, temp_dir.path()).with_workers(3))
        .expect("engine should build");

    let summary = engine.run_all(&links).await.expect("run should finish");

    assert_eq!(summary.total(), 3);
    assert_eq!(summary.completed(), 2);
    assert_eq!(summary.failed(), 1);

    let failure = summary.failures().next().expect("one failure");
    assert_eq!(failure.original_url, links[1]);
    assert_eq!(
        failure.error.as_ref().map(|e| e.kind),
        Some(FailureKind::Fetch)
    );

    assert_eq!(std::fs::read(temp_dir.path().join("a.bin")).expect("read a"), b"a");
    assert_eq!(std::fs::read(temp_dir.path().join("b.bin")).expect("read b"), b"b");
    assert_eq!(std::fs::read_dir(temp_dir.path()).expect("read dir").count(), 2);
}

#[tokio::test]
async fn test_single_worker_processes_every_link() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let mut links = Vec::new();
    for i in 0..5 {
        let file_path = format!("/dl/file{i}.dat");
        mount_file(&server, &file_path, format!("payload {i}").as_bytes()).await;
        links.push(format!("{}{file_path}", server.uri()));
    }

    let engine = DownloadEngine::new(config_for(&server, temp_dir.path()).with_workers(1))
        .expect("engine should build");
    let summary = engine.run_all(&links).await.expect("run should finish");

    assert_eq!(summary.completed(), 5);
    let originals: HashSet<&str> = summary
        .outcomes()
        .iter()
        .map(|o| o.original_url.as_str())
        .collect();
    assert_eq!(originals.len(), 5);
    for i in 0..5 {
        assert_eq!(
            std::fs::read_to_string(temp_dir.path().join(format!("file{i}.dat"))).expect("read"),
            format!("payload {i}")
        );
    }
}

#[tokio::test]
async fn test_links_run_concurrently_up_to_worker_count() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    let mut links = Vec::new();
    for i in 0..4 {
        let file_path = format!("/dl/slow{i}.bin");
        Mock::given(method("GET"))
            .and(path(file_path.as_str()))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_bytes(b"x".to_vec())
                    .set_delay(Duration::from_millis(300)),
            )
            .mount(&server)
            .await;
        links.push(format!("{}{file_path}", server.uri()));
    }

    let config = config_for(&server, temp_dir.path())
        .with_fetch_timeout(Duration::from_secs(5))
        .with_workers(4);
    let engine = DownloadEngine::new(config).expect("engine should build");

    let started = Instant::now();
    let summary = engine.run_all(&links).await.expect("run should finish");
    let elapsed = started.elapsed();

    assert_eq!(summary.completed(), 4);
    // Four sequential 300ms responses would take at least 1.2s.
    assert!(elapsed < Duration::from_millis(1100), "took {elapsed:?}");
}

#[tokio::test]
async fn test_duplicate_names_get_distinct_files() {
    let server = MockServer::start().await;
    let temp_dir = TempDir::new().expect("failed to create temp dir");

    Mock::given(method("GET"))
        .and(path("/dl/same"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-disposition", "attachment; filename=\"same.iso\"")
                .set_body_bytes(b"iso".to_vec()),
        )
        .mount(&server)
        .await;

    let link = format!("{}/dl/same", server.uri());
    let links = vec![link.clone(), link];
    let engine = DownloadEngine::new(config_for(&server, temp_dir.path()).with_workers(1))
        .expect("engine should build");
    let summary = engine.run_all(&links).await.expect("run should finish");

    assert_eq!(summary.completed(), 2);
    assert!(temp_dir.path().join("same.iso").exists());
    assert!(temp_dir.path().join("same (1).iso").exists());
}
