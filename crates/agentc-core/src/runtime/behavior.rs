//! The extension point every agent implements, and the built-in behaviors.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::context::{AgentContext, AgentInput};

/// Errors an agent behavior may raise. The runtime converts every one of
/// them into a failed [`ExecutionResult`](super::ExecutionResult).
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("{0}")]
    Message(String),

    #[error("command failed: {0}")]
    Command(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl AgentError {
    pub fn msg(message: impl Into<String>) -> Self {
        Self::Message(message.into())
    }
}

/// What a behavior returns.
pub type AgentOutcome = std::result::Result<Value, AgentError>;

/// An agent's actual behavior.
#[async_trait]
pub trait AgentBehavior: Send + Sync {
    async fn execute(&self, ctx: &mut AgentContext, input: AgentInput) -> AgentOutcome;
}

/// Returns the agent identity, its prompt and the coerced input.
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoBehavior;

#[async_trait]
impl AgentBehavior for EchoBehavior {
    async fn execute(&self, ctx: &mut AgentContext, input: AgentInput) -> AgentOutcome {
        Ok(json!({
            "agent": ctx.agent_name(),
            "systemPrompt": ctx.system_prompt(),
            "input": input.to_value(),
        }))
    }
}

/// Tool id that selects [`CommandBehavior`] for artifacts loaded from disk.
pub const COMMAND_TOOL_ID: &str = "command_sandbox";

/// Runs the `command` input field (with the optional `args` array field)
/// through the sandbox in the invocation's working directory. An optional
/// `cwd` field changes that directory first.
#[derive(Debug, Clone, Copy, Default)]
pub struct CommandBehavior;

#[async_trait]
impl AgentBehavior for CommandBehavior {
    async fn execute(&self, ctx: &mut AgentContext, input: AgentInput) -> AgentOutcome {
        let command = input
            .str("command")
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AgentError::msg("input field 'command' is required"))?
            .to_string();
        let args = input.list("args").unwrap_or_default();

        if let Some(dir) = input.str("cwd").filter(|d| !d.is_empty()) {
            ctx.change_directory(dir)
                .await
                .map_err(|e| AgentError::Command(e.to_string()))?;
        }

        let record = ctx.run_command(&command, &args).await;
        if !record.success {
            let reason = if record.stderr.is_empty() {
                format!("'{}' exited with {}", record.command, record.exit_code)
            } else {
                record.stderr.trim().to_string()
            };
            return Err(AgentError::Command(reason));
        }

        Ok(serde_json::to_value(record).map_err(anyhow::Error::from)?)
    }
}
