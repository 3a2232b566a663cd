//! Shared fixtures for integration tests.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use configurator::error::ConfigError;
use configurator::exec::{ReloadTrigger, SystemRunner, Validator};
use configurator::http::{build_router, AppState};
use configurator::render::Transformer;
use configurator::state::ConfigState;
use configurator::store::Store;

pub const EXEC_TIMEOUT: Duration = Duration::from_secs(5);

/// In-memory stand-in for the config store.
#[derive(Clone)]
pub struct MemoryStore {
    document: Arc<Mutex<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new(document: &str) -> Self {
        Self {
            document: Arc::new(Mutex::new(document.as_bytes().to_vec())),
        }
    }

    /// Replace the upstream document, as a store write would.
    #[allow(dead_code)]
    pub fn set(&self, document: &str) {
        *self.document.lock().unwrap() = document.as_bytes().to_vec();
    }
}

impl Store for MemoryStore {
    async fn fetch(&self) -> Result<Vec<u8>, ConfigError> {
        Ok(self.document.lock().unwrap().clone())
    }
}

pub struct Fixture {
    pub state: Arc<ConfigState<MemoryStore, SystemRunner>>,
    pub store: MemoryStore,
    pub target: std::path::PathBuf,
    // Holds the target directory alive for the test's duration.
    _dir: tempfile::TempDir,
}

/// Build a ConfigState over a MemoryStore, rendering with the identity
/// JSON transformer into a temp directory.
pub fn fixture(initial: &str, check_cmd: Option<&str>, reload_cmd: Option<&str>) -> Fixture {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("rendered.json");
    let store = MemoryStore::new(initial);
    let state = ConfigState::new(
        store.clone(),
        Transformer::Json,
        target.clone(),
        Validator::new(check_cmd.map(String::from), EXEC_TIMEOUT, SystemRunner),
        ReloadTrigger::new(reload_cmd.map(String::from), EXEC_TIMEOUT, SystemRunner),
    );
    Fixture {
        state: Arc::new(state),
        store,
        target,
        _dir: dir,
    }
}

/// Like `fixture`, but with the initial pull already committed.
pub async fn committed_fixture(
    initial: &str,
    check_cmd: Option<&str>,
    reload_cmd: Option<&str>,
) -> Fixture {
    let fx = fixture(initial, check_cmd, reload_cmd);
    fx.state.update().await.expect("initial update");
    fx
}

/// Serve the real router on an ephemeral port; returns the bound address.
#[allow(dead_code)]
pub async fn spawn_server(state: Arc<ConfigState<MemoryStore, SystemRunner>>) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = build_router(AppState { config: state });
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}
