//! Agents rendered from `specs/*.json` by the build script and compiled into
//! this crate, one module per slug. Each module is the unmodified output of
//! [`agentc_core::render`] plus a `SOURCE` constant holding its text.

use agentc_core::{AgentRegistry, AgentSpec};

/// A compiled artifact and the source it was compiled from.
pub struct CompiledArtifact {
    pub slug: &'static str,
    pub source: &'static str,
    pub spec: fn() -> AgentSpec,
    pub register: fn(&mut AgentRegistry) -> agentc_core::Result<()>,
}

include!(concat!(env!("OUT_DIR"), "/artifacts.rs"));
