use std::time::{Duration, Instant};

use crate::helpers::{wait_for_file_containing, ServerProcess};

/// The binary serves the seed set, logs to the requested file, and exits
/// cleanly on SIGTERM.
#[cfg(unix)]
#[test]
fn serve_and_terminate_cleanly() {
    let log_dir = tempfile::tempdir().unwrap();
    let log_file = log_dir.path().join("metafs.log");

    let mut server = ServerProcess::spawn(&["--log-file", log_file.to_str().unwrap()]);

    let health: serde_json::Value = reqwest::blocking::get(server.url("/health"))
        .unwrap()
        .json()
        .unwrap();
    assert_eq!(health["status"], "ok");

    let path = reqwest::blocking::get(server.url("/resolve-inode/4"))
        .unwrap()
        .text()
        .unwrap();
    assert_eq!(path, "/documents/readme.md");

    server.terminate();

    let start = Instant::now();
    let status = loop {
        if let Some(status) = server.child.try_wait().unwrap() {
            break status;
        }
        assert!(
            start.elapsed() < Duration::from_secs(10),
            "metafs did not exit after SIGTERM"
        );
        std::thread::sleep(Duration::from_millis(50));
    };
    assert!(status.success(), "exit status: {:?}", status);

    assert!(wait_for_file_containing(
        &log_file,
        "metafs starting",
        Duration::from_secs(2)
    ));
    // The reader thread may lag the exit slightly.
    std::thread::sleep(Duration::from_millis(200));
    assert!(server.stderr_contains("metafs: stopped"));
}

/// `--no-seed` starts with the root directory only.
#[test]
fn no_seed_serves_root_only() {
    let server = ServerProcess::spawn(&["--no-seed"]);

    let dump: serde_json::Value = reqwest::blocking::get(server.url("/debug/files"))
        .unwrap()
        .json()
        .unwrap();
    let filesystem = dump["filesystem"].as_object().unwrap();
    assert_eq!(filesystem.len(), 1);
    assert_eq!(filesystem["/"]["ino"], 1);

    let resp = reqwest::blocking::get(server.url("/metadata?path=/test.txt")).unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);
}
