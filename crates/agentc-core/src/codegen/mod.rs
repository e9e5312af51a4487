//! Code generation: renders an [`AgentSpec`] into a Rust source artifact.
//!
//! The artifact satisfies the runtime contract: it exposes `spec()`, a unit
//! struct implementing [`AgentBehavior`](crate::runtime::AgentBehavior) and a
//! `register()` hook for an [`AgentRegistry`](crate::registry::AgentRegistry).
//! Every spec field is embedded at a label-prefixed position (`name:`,
//! `description:`, `version:`, `system_prompt:`, `tools:`, `input_schema:`,
//! `output_schema:`) so [`crate::parser`] can recover it. Tools and schemas
//! are raw JSON text, decoded by [`AgentSpec::from_artifact`] at run time.

pub mod literal;

use crate::domain::{slugify, spec_digest, AgentSpec, Result, ValidationError};

use literal::{check_renderable, json_literal, raw_literal, schema_json, string_literal, tools_json};

/// File suffix for generated artifacts.
pub const ARTIFACT_SUFFIX: &str = ".agent.rs";

/// Header line carrying the spec digest.
pub const DIGEST_MARKER: &str = "// spec-digest: ";

const LITERAL_INDENT: &str = "        ";

/// A rendered artifact, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub slug: String,
    pub file_name: String,
    pub digest: String,
    pub source: String,
}

/// File name for a slug.
pub fn artifact_file_name(slug: &str) -> String {
    format!("{slug}{ARTIFACT_SUFFIX}")
}

/// PascalCase type name for the generated behavior struct.
fn behavior_type_name(slug: &str) -> String {
    let mut name: String = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert_str(0, "Agent");
    }
    if name == "Self" {
        name.push_str("Agent");
    }
    name
}

/// Render `spec` into artifact source text.
///
/// Deterministic: the same spec always renders byte-identical output.
/// Fails with a validation error for empty identity fields and with a
/// generation error when some text has no safe literal form.
pub fn render(spec: &AgentSpec) -> Result<GeneratedArtifact> {
    render_as(spec, &slugify(&spec.name))
}

/// Render `spec` under an explicit slug. Used when the natural slug of the
/// name is already taken by another agent.
pub fn render_as(spec: &AgentSpec, slug: &str) -> Result<GeneratedArtifact> {
    spec.validate()?;

    let slug = slug.to_string();
    if slug.is_empty() {
        return Err(ValidationError::EmptyField {
            field: "slug".to_string(),
        }
        .into());
    }

    check_renderable("name", &spec.name)?;
    check_renderable("description", &spec.description)?;
    check_renderable("version", &spec.version)?;

    let prompt = raw_literal(&spec.system_prompt)?;
    let tools = json_literal(&tools_json(&spec.tools, LITERAL_INDENT))?;
    let input_schema = json_literal(&schema_json(&spec.input_schema, LITERAL_INDENT))?;
    let output_schema = json_literal(&schema_json(&spec.output_schema, LITERAL_INDENT))?;

    let digest = spec_digest(spec)?;
    let type_name = behavior_type_name(&slug);

    let source = format!(
        r#"// @generated by agentc {version}
// Labelled literals below are read back by `agentc show`; keep each label on its own line.
{DIGEST_MARKER}{digest}

use agentc_core::prelude::*;

pub const SLUG: &str = {slug_lit};

pub fn spec() -> AgentSpec {{
    AgentSpec::from_artifact(ArtifactLiterals {{
        name: {name},
        description: {description},
        version: {agent_version},
        system_prompt: {prompt},
        tools: {tools},
        input_schema: {input_schema},
        output_schema: {output_schema},
    }})
}}

pub struct {type_name};

#[async_trait]
impl AgentBehavior for {type_name} {{
    async fn execute(&self, ctx: &mut AgentContext, input: AgentInput) -> AgentOutcome {{
        Ok(json!({{
            "agent": ctx.agent_name(),
            "input": input.to_value(),
        }}))
    }}
}}

pub fn register(registry: &mut AgentRegistry) -> agentc_core::Result<()> {{
    registry.register_as(SLUG, spec(), std::sync::Arc::new({type_name}))
}}
"#,
        version = crate::VERSION,
        slug_lit = string_literal(&slug),
        name = string_literal(&spec.name),
        description = string_literal(&spec.description),
        agent_version = string_literal(&spec.version),
    );

    Ok(GeneratedArtifact {
        file_name: artifact_file_name(&slug),
        slug,
        digest,
        source,
    })
}
