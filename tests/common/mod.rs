#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

use runtrack::client::RunClient;
use runtrack::config::ConfigFile;
use runtrack::engine::{Launcher, Poller};
use runtrack::exec::LaunchBackend;
use runtrack::fs::{FileSystem, RealFileSystem};
use runtrack::run::RunLayout;
use runtrack::server::{self, AppState};

pub use runtrack_test_utils::init_tracing;

/// A live API server on an ephemeral localhost port.
///
/// Dropping it shuts the server down.
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: RunClient,
    shutdown: Option<oneshot::Sender<()>>,
    handle: JoinHandle<()>,
}

impl TestServer {
    /// Start the full router with the given launch backend.
    pub async fn start(cfg: &ConfigFile, backend: Arc<dyn LaunchBackend>) -> Self {
        let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
        let layout = RunLayout::from_config(cfg);
        fs.create_dir_all(layout.reports_dir()).unwrap();

        let launcher = Launcher::from_config(cfg, Arc::clone(&fs), backend);
        let poller = Poller::new(layout.clone(), fs, cfg.status.log_excerpt_lines);
        let state = AppState {
            launcher: Arc::new(launcher),
            poller: Arc::new(poller),
            push_interval: cfg.status.push_interval,
        };
        let app = server::router(state, layout.reports_dir(), &cfg.storage.reports_url_prefix);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server::serve_on(listener, app, async {
                let _ = rx.await;
            })
            .await
            .unwrap();
        });

        let client = RunClient::new(format!("http://{addr}")).unwrap();
        Self {
            addr,
            client,
            shutdown: Some(tx),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.handle.abort();
    }
}
