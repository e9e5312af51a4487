//! agentc Core Library
//!
//! Renders agent specifications into Rust source artifacts, recovers specs
//! from those artifacts, and executes agents under a uniform contract with a
//! sandbox for external commands.

pub mod codegen;
pub mod domain;
pub mod obs;
pub mod parser;
pub mod registry;
pub mod runtime;
pub mod sandbox;
pub mod store;
pub mod telemetry;

pub use codegen::{render, render_as, GeneratedArtifact, ARTIFACT_SUFFIX};

pub use domain::{
    slugify, spec_digest, AgentSpec, AgentcError, ArtifactLiterals, FieldSpec, FieldType,
    GenerationError, Result, Schema, ToolBinding, ValidationError,
};

pub use parser::{parse_artifact, parse_spec, DigestStatus, FieldIssue, ParsedArtifact};

pub use registry::{builtin_behavior, AgentRegistry, LoadedAgent, RegisteredAgent};

pub use runtime::{
    coerce_arguments, AgentBehavior, AgentContext, AgentError, AgentInput, AgentOutcome,
    AgentRuntime, CommandBehavior, EchoBehavior, ExecutionResult, RuntimeConfig, RuntimeState,
    COMMAND_TOOL_ID,
};

pub use sandbox::{
    CommandExecutionRecord, CommandSandbox, ExecOptions, SandboxConfig, SandboxError,
};

pub use store::{ApiResponse, ArtifactStore, CollisionPolicy, WriteOutcome, WrittenArtifact};

pub use obs::{
    emit_artifact_written, emit_command_denied, emit_command_finished, emit_command_timed_out,
    emit_invocation_finished, emit_invocation_started, emit_parse_issue, invocation_span,
};
pub use telemetry::init_tracing;

/// Everything a generated artifact needs in scope.
pub mod prelude {
    pub use crate::domain::{AgentSpec, ArtifactLiterals};
    pub use crate::registry::AgentRegistry;
    pub use crate::runtime::{AgentBehavior, AgentContext, AgentError, AgentInput, AgentOutcome};
    pub use async_trait::async_trait;
    pub use serde_json::{json, Value};
}

/// agentc version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
