//! Domain models for agentc.
//!
//! - `AgentSpec`: structured description of an agent
//! - `Schema` / `FieldSpec`: ordered input and output fields
//! - `ToolBinding`: tools an agent may call
//! - `slugify`: name → registry identifier
//! - `spec_digest`: content digest stamped into generated artifacts

pub mod digest;
pub mod error;
pub mod slug;
pub mod spec;

pub use digest::spec_digest;
pub use error::{AgentcError, GenerationError, Result, ValidationError};
pub use slug::slugify;
pub use spec::{AgentSpec, ArtifactLiterals, FieldSpec, FieldType, Schema, ToolBinding};
