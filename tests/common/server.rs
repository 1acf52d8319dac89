//! Test server lifecycle management
//!
//! Each test gets an isolated server with its own data file and its own mock
//! Open Library service.

use super::constants::*;
use super::open_library::MockOpenLibrary;
use book_catalog_server::catalog_store::{CatalogStore, JsonFileBookPersistence};
use book_catalog_server::metadata::OpenLibraryClient;
use book_catalog_server::server::{
    make_app, GuardedMetadataFetcher, RequestsLoggingLevel, ServerConfig,
};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;

#[derive(Default)]
pub struct TestServerOptions {
    /// Raw content written to the data file before the server loads it.
    pub initial_data: Option<String>,
    /// Lookup service to use instead of a fresh mock.
    pub lookup_base_url: Option<String>,
}

/// Test server instance with an isolated data file
///
/// When dropped, the server gracefully shuts down and temp resources are cleaned up.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The JSON file backing the catalog
    pub data_file: PathBuf,

    // Private fields - keep resources alive until drop
    _temp_dir: TempDir,
    _open_library: Option<MockOpenLibrary>,
    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a server with an empty catalog, backed by the mock Open Library.
    pub async fn spawn() -> Self {
        Self::spawn_with(TestServerOptions::default()).await
    }

    pub async fn spawn_with(options: TestServerOptions) -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_file = temp_dir.path().join("library.json");
        if let Some(content) = &options.initial_data {
            std::fs::write(&data_file, content).expect("Failed to write initial data");
        }

        let (open_library, lookup_base_url) = match options.lookup_base_url {
            Some(url) => (None, url),
            None => {
                let mock = MockOpenLibrary::spawn().await;
                let url = mock.base_url.clone();
                (Some(mock), url)
            }
        };

        let catalog_store =
            CatalogStore::load(Box::new(JsonFileBookPersistence::new(data_file.clone())));
        let metadata_fetcher: GuardedMetadataFetcher = Arc::new(
            OpenLibraryClient::new(&lookup_base_url, LOOKUP_TIMEOUT_SECS)
                .expect("Failed to build lookup client"),
        );

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();
        let base_url = format!("http://127.0.0.1:{}", port);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            frontend_dir_path: None,
        };
        let app = make_app(
            config,
            Arc::new(Mutex::new(catalog_store)),
            metadata_fetcher,
        );

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
        });

        let server = Self {
            base_url,
            data_file,
            _temp_dir: temp_dir,
            _open_library: open_library,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the /health endpoint
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/health", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }

    /// Parses the data file as it currently is on disk.
    #[allow(dead_code)]
    pub fn read_data_file(&self) -> serde_json::Value {
        let content = std::fs::read_to_string(&self.data_file).expect("Failed to read data file");
        serde_json::from_str(&content).expect("Data file is not valid JSON")
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
