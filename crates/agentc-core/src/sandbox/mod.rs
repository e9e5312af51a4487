//! Sandbox: safe external-command execution for agent behaviors.
//!
//! Commands are checked against a fixed denylist before anything is spawned,
//! run with full stdout/stderr capture, and killed when they exceed a
//! wall-clock timeout. Every call resolves to a [`CommandExecutionRecord`];
//! refusals, spawn failures and timeouts are failure records, never errors.
//!
//! # Modules
//!
//! - [`denylist`]: destructive command-name patterns
//! - [`execution`]: `CommandSandbox`, `SandboxConfig`, `ExecOptions`, records
//! - [`error`]: `SandboxError` / `SandboxResult` (directory changes only)

pub mod denylist;
pub mod error;
pub mod execution;

pub use error::{SandboxError, SandboxResult};
pub use execution::{
    resolve_directory, CommandExecutionRecord, CommandSandbox, ExecOptions, SandboxConfig,
};
