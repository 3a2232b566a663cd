//! HTTP surface for inspecting and editing the live document.
//!
//! # Data Flow
//! ```text
//! GET  /v1/status          → process identity (version, transformer)
//! GET  /v1/render          → ConfigState::last_render
//! POST /v1/render          → copy → load(body) → validate (no commit)
//! GET  /v1/config/{path}   → ConfigState::get
//! POST /v1/config/{path}   → mutate: Merge (object onto object) | Append
//! PUT  /v1/config/{path}   → mutate: Replace
//! DEL  /v1/config/{path}   → mutate: Delete
//! ```
//!
//! # Design Decisions
//! - Handlers are generic over the store and command runner so the full
//!   router is exercised in tests without a live Consul
//! - Validation failures are surfaced verbatim: the check command's
//!   output is the response body

pub mod handlers;
pub mod server;

pub use server::{build_router, serve, AppState};
