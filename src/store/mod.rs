//! Config store clients.
//!
//! # Data Flow
//! ```text
//! configstore URI (e.g. consul://host:8500/path/to/key)
//!     → from_uri (scheme factory)
//!     → Store::fetch → raw document bytes
//!     → ConfigState::update (parse, render, validate, commit)
//! ```
//!
//! # Design Decisions
//! - The store supplies raw bytes only; parsing and validation belong to
//!   the state engine
//! - Watching for upstream changes is the collaborator's job: anything
//!   that detects a change calls `ConfigState::update`

use url::Url;

use crate::error::ConfigError;

pub mod consul;

pub use consul::ConsulStore;

/// Source of the raw configuration document.
pub trait Store: Send + Sync + 'static {
    fn fetch(&self) -> impl std::future::Future<Output = Result<Vec<u8>, ConfigError>> + Send;
}

/// Builds a store client from a configstore URI, dispatching on scheme.
pub fn from_uri(uri: &Url) -> Result<ConsulStore, ConfigError> {
    match uri.scheme() {
        "consul" => ConsulStore::new(uri),
        other => Err(ConfigError::Backend(format!(
            "unrecognized config store backend: {other}"
        ))),
    }
}
