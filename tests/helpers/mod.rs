use std::io::{BufRead, BufReader};
use std::net::SocketAddr;
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::net::TcpListener;
use tokio::sync::oneshot;

use metafs::store::MetadataStore;

/// An in-process server on an ephemeral port, stopped on drop.
pub struct TestServer {
    pub addr: SocketAddr,
    pub store: Arc<MetadataStore>,
    shutdown: Option<oneshot::Sender<()>>,
}

impl TestServer {
    /// Serve the standard seed set: `/`, `/test.txt`, `/documents`,
    /// `/documents/readme.md`.
    pub async fn seeded() -> Self {
        Self::start(MetadataStore::seeded(1000, 1000)).await
    }

    pub async fn start(store: MetadataStore) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind ephemeral port");
        let addr = listener.local_addr().expect("local addr");
        let store = Arc::new(store);
        let (tx, rx) = oneshot::channel::<()>();

        let served = Arc::clone(&store);
        tokio::spawn(async move {
            let shutdown = async {
                let _ = rx.await;
            };
            if let Err(e) = metafs::server::serve(listener, served, shutdown).await {
                eprintln!("test server error: {}", e);
            }
        });

        TestServer {
            addr,
            store,
            shutdown: Some(tx),
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("http://{}{}", self.addr, route)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// A `metafs serve` child process with its stderr captured line by line.
pub struct ServerProcess {
    pub child: Child,
    pub base_url: String,
    pub stderr_lines: Arc<Mutex<Vec<String>>>,
}

impl ServerProcess {
    /// Spawn the binary on a free port and wait until it reports its address.
    pub fn spawn(extra_args: &[&str]) -> Self {
        let mut child = Command::new(env!("CARGO_BIN_EXE_metafs"))
            .args(["serve", "--port", "0"])
            .args(extra_args)
            .env("RUST_LOG", "info")
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .expect("failed to spawn metafs");

        let stderr = child.stderr.take().expect("stderr piped");
        let lines: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
        let lines_clone = Arc::clone(&lines);
        let (url_tx, url_rx) = mpsc::channel();

        std::thread::spawn(move || {
            for line in BufReader::new(stderr).lines().map_while(Result::ok) {
                if let Some(url) = line.strip_prefix("metafs: listening on ") {
                    let _ = url_tx.send(url.trim().to_string());
                }
                lines_clone.lock().unwrap().push(line);
            }
        });

        let base_url = match url_rx.recv_timeout(Duration::from_secs(10)) {
            Ok(url) => url,
            Err(_) => {
                let _ = child.kill();
                panic!(
                    "metafs did not report a listen address; stderr: {:?}",
                    lines.lock().unwrap()
                );
            }
        };

        ServerProcess {
            child,
            base_url,
            stderr_lines: lines,
        }
    }

    pub fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    /// Deliver SIGTERM through the system `kill` utility.
    pub fn terminate(&self) {
        let status = Command::new("kill")
            .args(["-TERM", &self.child.id().to_string()])
            .status()
            .expect("failed to run kill");
        assert!(status.success());
    }

    pub fn stderr_contains(&self, needle: &str) -> bool {
        self.stderr_lines
            .lock()
            .unwrap()
            .iter()
            .any(|l| l.contains(needle))
    }
}

impl Drop for ServerProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}

/// Poll until `path` exists and contains `needle`.
pub fn wait_for_file_containing(path: &Path, needle: &str, timeout: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < timeout {
        if let Ok(text) = std::fs::read_to_string(path) {
            if text.contains(needle) {
                return true;
            }
        }
        std::thread::sleep(Duration::from_millis(50));
    }
    false
}
