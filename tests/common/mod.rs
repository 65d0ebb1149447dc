//! Shared MongoDB deployment for the integration tests.
//!
//! One MongoDB 7.0 container serves every test in a test binary. The
//! container is started from a background thread with its own Tokio runtime
//! so it outlives the per-test `ConnectionManager` runtimes, and it is
//! removed by an `atexit` hook. Tests stay independent by working in a
//! database whose name carries a short per-test suffix.

#![allow(dead_code)]

pub mod fixtures;

use std::path::Path;
use std::sync::OnceLock;
use std::time::Duration;

use mongo_tour::{ConnectionManager, TourConfig};
use mongodb::Client;
use mongodb::options::ClientOptions;
use testcontainers::ImageExt;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

static CONNECTION_STRING: OnceLock<String> = OnceLock::new();

/// Container id, kept so the exit hook can remove it.
static CONTAINER_ID: OnceLock<String> = OnceLock::new();

unsafe extern "C" {
    fn atexit(f: extern "C" fn()) -> i32;
}

extern "C" fn remove_container() {
    if let Some(id) = CONTAINER_ID.get() {
        let _ = std::process::Command::new("docker")
            .args(["rm", "-f", id])
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .status();
    }
}

fn shared_connection_string() -> &'static str {
    CONNECTION_STRING.get_or_init(|| {
        let (tx, rx) = std::sync::mpsc::sync_channel(1);

        std::thread::spawn(move || {
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
                .expect("Failed to create container runtime");

            rt.block_on(async {
                let container = Mongo::default()
                    .with_tag("7.0")
                    .start()
                    .await
                    .expect("Failed to start MongoDB container");

                let _ = CONTAINER_ID.set(container.id().to_string());
                unsafe {
                    atexit(remove_container);
                }

                let host = container.get_host().await.expect("Failed to get host");
                let port = container.get_host_port_ipv4(27017).await.expect("Failed to get port");
                let connection_string = format!("mongodb://{}:{}", host, port);

                let opts = ClientOptions::parse(&connection_string).await.expect("Failed to parse");
                let probe = Client::with_options(opts).expect("Failed to create probe client");
                for _ in 0..30 {
                    if probe.list_database_names().await.is_ok() {
                        break;
                    }
                    tokio::time::sleep(Duration::from_millis(100)).await;
                }
                drop(probe);

                tx.send(connection_string).expect("Failed to send connection string");

                // Keep the container alive until the process exits.
                std::future::pending::<()>().await;
            });
        });

        rx.recv().expect("Failed to receive connection string")
    })
}

/// A connected manager plus a unique database namespace for one test.
///
/// `client` is declared before `manager` so it is dropped while the
/// manager's runtime still exists.
pub struct TestDeployment {
    pub client: Client,
    pub manager: ConnectionManager,
    pub connection_string: String,
    test_id: String,
}

impl TestDeployment {
    pub fn start() -> Self {
        let connection_string = shared_connection_string().to_string();
        let manager = ConnectionManager::new().expect("Failed to create connection manager");
        let client = manager
            .connect(&connection_string, Duration::from_secs(30))
            .expect("Failed to connect to test container");
        let test_id = uuid::Uuid::new_v4().to_string()[..8].to_string();

        Self { client, manager, connection_string, test_id }
    }

    /// Namespaced database name for this test.
    pub fn db_name(&self, name: &str) -> String {
        format!("{}_{}", name, self.test_id)
    }

    /// A tour configuration pointing at this test's database, with every
    /// local file placed under `dir`.
    pub fn tour_config(&self, dir: &Path) -> TourConfig {
        let mut config = TourConfig {
            uri: self.connection_string.clone(),
            database: self.db_name("tour"),
            server_selection_timeout_secs: 30,
            ..Default::default()
        };
        config.files.upload_path = dir.join("oldImage.jpg");
        config.files.download_path = dir.join("newImage.jpg");
        config.files.import_path = dir.join("colors.json");
        config
    }
}
