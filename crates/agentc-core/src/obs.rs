//! Structured observability hooks for agentc lifecycle events.
//!
//! This module provides:
//! - Invocation-scoped tracing spans via [`invocation_span`]
//! - Emission functions for key events: invocation start/finish, artifact
//!   writes, parse issues, and sandboxed command outcomes
//!
//! Events use stable `event = "..."` names so log pipelines can filter on
//! them. Verbosity follows `RUST_LOG` (see [`crate::telemetry`]).

use std::path::Path;

use tracing::{info, warn};

/// Span tagging every event of one agent invocation with its run id.
///
/// Attach it to the invocation future with `tracing::Instrument` rather than
/// entering it, since the invocation crosses await points.
pub fn invocation_span(run_id: &str, agent: &str) -> tracing::Span {
    tracing::info_span!("agentc.invocation", run_id = %run_id, agent = %agent)
}

/// Emit event: invocation started.
pub fn emit_invocation_started(run_id: &str, agent: &str, arg_count: usize) {
    info!(event = "invocation.started", run_id = %run_id, agent = %agent, arg_count = arg_count);
}

/// Emit event: invocation reached a terminal state.
pub fn emit_invocation_finished(run_id: &str, agent: &str, duration_ms: u64, success: bool) {
    info!(
        event = "invocation.finished",
        run_id = %run_id,
        agent = %agent,
        duration_ms = duration_ms,
        success = success,
    );
}

/// Emit event: an artifact was written (or left unchanged) on disk.
pub fn emit_artifact_written(slug: &str, path: &Path, outcome: &str) {
    info!(event = "artifact.written", slug = %slug, path = %path.display(), outcome = %outcome);
}

/// Emit event: a field of an artifact could not be parsed (warn level).
pub fn emit_parse_issue(agent: &str, field: &str, message: &str) {
    warn!(event = "artifact.parse_issue", agent = %agent, field = %field, message = %message);
}

/// Emit event: a command was refused by the denylist (warn level).
pub fn emit_command_denied(command: &str, pattern: &str) {
    warn!(event = "command.denied", command = %command, pattern = %pattern);
}

/// Emit event: a command exceeded its timeout and was killed (warn level).
pub fn emit_command_timed_out(command: &str, timeout_ms: u64) {
    warn!(event = "command.timed_out", command = %command, timeout_ms = timeout_ms);
}

/// Emit event: a spawned command exited.
pub fn emit_command_finished(command: &str, exit_code: i32, duration_ms: u64) {
    info!(
        event = "command.finished",
        command = %command,
        exit_code = exit_code,
        duration_ms = duration_ms,
    );
}
