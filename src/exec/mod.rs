//! External command execution subsystem.
//!
//! # Data Flow
//! ```text
//! candidate rendered bytes
//!     → validator.rs (temp file, FILE env, check command)
//!     → pass: commit proceeds
//!     → fail: ExecError with the command's combined output
//!
//! after commit:
//!     reload.rs (reload command, best effort, failures logged)
//! ```
//!
//! # Design Decisions
//! - All spawning goes through the CommandRunner trait so the state
//!   machine is testable without real processes
//! - Commands run under `sh -c`; stdout and stderr are captured together
//! - Every run is bounded by the configured timeout; an unbounded check
//!   would stall all future mutations (the write lock spans validation)

pub mod reload;
pub mod runner;
pub mod validator;

pub use reload::ReloadTrigger;
pub use runner::{CommandRunner, ExecStatus, SystemRunner};
pub use validator::Validator;
