//! Configurator: distributes a centrally stored JSON configuration
//! document to one node.
//!
//! The document is pulled from a key/value store, rendered through a
//! named transformer into a target file, and gated behind an external
//! check command; an HTTP API edits the live document incrementally.

pub mod error;
pub mod exec;
pub mod http;
pub mod render;
pub mod state;
pub mod store;
pub mod tree;

pub use error::{ConfigError, ExecError};
pub use render::Transformer;
pub use state::{Candidate, ConfigState, Snapshot};
pub use store::Store;
