//! Agent execution contract.
//!
//! An invocation walks `Created → InputCoerced → Executing` and ends in
//! `Succeeded` or `Failed`. Coercion failures, behavior errors and behavior
//! panics all end in a [`ExecutionResult::Failed`] value; nothing is
//! re-raised to the caller.

pub mod behavior;
pub mod coerce;
pub mod context;
pub mod result;

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Instant;

use futures::FutureExt;
use serde::{Deserialize, Serialize};
use tracing::Instrument;
use uuid::Uuid;

use crate::domain::AgentSpec;
use crate::obs;
use crate::sandbox::CommandSandbox;

pub use behavior::{AgentBehavior, AgentError, AgentOutcome, CommandBehavior, EchoBehavior, COMMAND_TOOL_ID};
pub use coerce::coerce_arguments;
pub use context::{AgentContext, AgentInput};
pub use result::ExecutionResult;

/// Invocation lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuntimeState {
    Created,
    InputCoerced,
    Executing,
    Succeeded,
    Failed,
}

impl RuntimeState {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }
}

/// Runtime knobs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Fail the invocation on an unparsable `number` argument instead of
    /// substituting `0`.
    #[serde(default)]
    pub strict_numbers: bool,
}

/// Runs one agent's behavior against raw argument lists.
pub struct AgentRuntime {
    spec: Arc<AgentSpec>,
    behavior: Arc<dyn AgentBehavior>,
    sandbox: CommandSandbox,
    config: RuntimeConfig,
    state: RuntimeState,
}

impl std::fmt::Debug for AgentRuntime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRuntime")
            .field("agent", &self.spec.name)
            .field("config", &self.config)
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

impl AgentRuntime {
    pub fn new(
        spec: Arc<AgentSpec>,
        behavior: Arc<dyn AgentBehavior>,
        sandbox: CommandSandbox,
        config: RuntimeConfig,
    ) -> Self {
        Self {
            spec,
            behavior,
            sandbox,
            config,
            state: RuntimeState::Created,
        }
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    /// State reached by the most recent invocation.
    pub fn state(&self) -> RuntimeState {
        self.state
    }

    fn transition(&mut self, next: RuntimeState) {
        tracing::debug!(agent = %self.spec.name, from = ?self.state, to = ?next, "runtime state");
        self.state = next;
    }

    /// Execute one invocation. Always returns a result.
    pub async fn run(&mut self, args: &[String]) -> ExecutionResult {
        let run_id = Uuid::new_v4();
        let span = obs::invocation_span(&run_id.to_string(), &self.spec.name);
        self.run_inner(run_id, args).instrument(span).await
    }

    async fn run_inner(&mut self, run_id: Uuid, args: &[String]) -> ExecutionResult {
        let started = Instant::now();
        let run_label = run_id.to_string();
        let agent = self.spec.name.clone();

        self.state = RuntimeState::Created;
        obs::emit_invocation_started(&run_label, &agent, args.len());

        let result = match coerce_arguments(&self.spec.input_schema, args, self.config.strict_numbers) {
            Err(e) => ExecutionResult::failed(&agent, run_id, e.to_string()),
            Ok(input) => {
                self.transition(RuntimeState::InputCoerced);

                let mut ctx = AgentContext::new(self.spec.clone(), run_id, self.sandbox.clone());
                let behavior = self.behavior.clone();

                self.transition(RuntimeState::Executing);
                let outcome = AssertUnwindSafe(behavior.execute(&mut ctx, input))
                    .catch_unwind()
                    .await;

                match outcome {
                    Ok(Ok(output)) => ExecutionResult::succeeded(&agent, run_id, output),
                    Ok(Err(e)) => ExecutionResult::failed(&agent, run_id, e.to_string()),
                    Err(payload) => {
                        let message = panic_message(payload.as_ref());
                        tracing::error!(agent = %agent, panic = %message, "agent behavior panicked");
                        ExecutionResult::failed(&agent, run_id, format!("agent panicked: {message}"))
                    }
                }
            }
        };

        self.transition(if result.is_success() {
            RuntimeState::Succeeded
        } else {
            RuntimeState::Failed
        });
        obs::emit_invocation_finished(
            &run_label,
            &agent,
            started.elapsed().as_millis() as u64,
            result.is_success(),
        );
        result
    }
}
