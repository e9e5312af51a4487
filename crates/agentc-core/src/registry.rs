//! Start-time agent registry.
//!
//! Agents are registered explicitly, either by a generated artifact's
//! `register()` hook compiled into the host, or from a parsed artifact with
//! one of the built-in behaviors. Lookups never touch the filesystem.

use std::collections::HashMap;
use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{slugify, AgentSpec, AgentcError, Result, ValidationError};
use crate::runtime::{
    AgentBehavior, AgentRuntime, CommandBehavior, EchoBehavior, ExecutionResult, RuntimeConfig,
    COMMAND_TOOL_ID,
};
use crate::sandbox::CommandSandbox;

/// A registered agent.
#[derive(Clone)]
pub struct RegisteredAgent {
    pub spec: Arc<AgentSpec>,
    pub behavior: Arc<dyn AgentBehavior>,
}

/// Built-in behavior for an agent loaded from an artifact on disk:
/// [`CommandBehavior`] when the spec binds the command tool, otherwise
/// [`EchoBehavior`].
pub fn builtin_behavior(spec: &AgentSpec) -> Arc<dyn AgentBehavior> {
    if spec.has_tool(COMMAND_TOOL_ID) {
        Arc::new(CommandBehavior)
    } else {
        Arc::new(EchoBehavior)
    }
}

/// Map from agent identifier (slug) to its spec and behavior.
#[derive(Default)]
pub struct AgentRegistry {
    agents: HashMap<String, RegisteredAgent>,
    sandbox: CommandSandbox,
    config: RuntimeConfig,
}

impl std::fmt::Debug for AgentRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AgentRegistry")
            .field("agents", &self.ids())
            .field("sandbox", &self.sandbox)
            .field("config", &self.config)
            .finish()
    }
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sandbox handed to every invocation.
    pub fn with_sandbox(mut self, sandbox: CommandSandbox) -> Self {
        self.sandbox = sandbox;
        self
    }

    pub fn with_config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    pub fn sandbox(&self) -> &CommandSandbox {
        &self.sandbox
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Register under the slug of the spec's name.
    pub fn register(&mut self, spec: AgentSpec, behavior: Arc<dyn AgentBehavior>) -> Result<()> {
        let slug = slugify(&spec.name);
        self.register_as(&slug, spec, behavior)
    }

    /// Register under an explicit identifier. Identifiers are unique.
    pub fn register_as(
        &mut self,
        id: &str,
        spec: AgentSpec,
        behavior: Arc<dyn AgentBehavior>,
    ) -> Result<()> {
        if id.is_empty() {
            return Err(ValidationError::EmptyField {
                field: "slug".to_string(),
            }
            .into());
        }
        if self.agents.contains_key(id) {
            return Err(AgentcError::DuplicateAgent(id.to_string()));
        }

        tracing::debug!(id = %id, agent = %spec.name, "agent registered");
        self.agents.insert(
            id.to_string(),
            RegisteredAgent {
                spec: Arc::new(spec),
                behavior,
            },
        );
        Ok(())
    }

    /// Register a spec recovered from an artifact with its built-in behavior.
    pub fn register_loaded(&mut self, id: &str, spec: AgentSpec) -> Result<()> {
        let behavior = builtin_behavior(&spec);
        self.register_as(id, spec, behavior)
    }

    /// Look up by identifier, falling back to the slug of `id` so display
    /// names resolve too.
    pub fn resolve(&self, id: &str) -> Option<LoadedAgent> {
        let (key, agent) = self
            .agents
            .get_key_value(id)
            .or_else(|| self.agents.get_key_value(slugify(id).as_str()))?;

        Some(LoadedAgent {
            id: key.clone(),
            agent: agent.clone(),
            sandbox: self.sandbox.clone(),
            config: self.config.clone(),
        })
    }

    /// Resolve and invoke. An unknown identifier is a failed result.
    pub async fn invoke(&self, id: &str, args: Vec<String>) -> ExecutionResult {
        match self.resolve(id) {
            Some(agent) => agent.invoke(args).await,
            None => {
                tracing::warn!(id = %id, "invocation of unknown agent");
                ExecutionResult::failed(id, Uuid::new_v4(), format!("unknown agent: {id}"))
            }
        }
    }

    /// Registered identifiers, sorted.
    pub fn ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.agents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }
}

/// A resolved agent, ready to invoke any number of times.
#[derive(Clone)]
pub struct LoadedAgent {
    id: String,
    agent: RegisteredAgent,
    sandbox: CommandSandbox,
    config: RuntimeConfig,
}

impl LoadedAgent {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.agent.spec
    }

    /// Run one invocation with a fresh runtime.
    pub async fn invoke(&self, args: Vec<String>) -> ExecutionResult {
        let mut runtime = AgentRuntime::new(
            self.agent.spec.clone(),
            self.agent.behavior.clone(),
            self.sandbox.clone(),
            self.config.clone(),
        );
        runtime.run(&args).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ToolBinding;

    #[test]
    fn test_register_rejects_duplicates() {
        let mut registry = AgentRegistry::new();
        registry
            .register(AgentSpec::new("Stock Bot", "d", "1"), Arc::new(EchoBehavior))
            .unwrap();
        let err = registry
            .register(AgentSpec::new("stock bot", "d", "2"), Arc::new(EchoBehavior))
            .unwrap_err();
        assert!(matches!(err, AgentcError::DuplicateAgent(id) if id == "stock-bot"));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resolve_by_slug_or_name() {
        let mut registry = AgentRegistry::new();
        registry
            .register(AgentSpec::new("Stock Bot", "d", "1"), Arc::new(EchoBehavior))
            .unwrap();

        assert_eq!(registry.resolve("stock-bot").unwrap().id(), "stock-bot");
        assert_eq!(registry.resolve("Stock Bot").unwrap().spec().name, "Stock Bot");
        assert!(registry.resolve("weather-bot").is_none());
    }

    #[test]
    fn test_register_as_rejects_empty_id() {
        let mut registry = AgentRegistry::new();
        let err = registry
            .register_as("", AgentSpec::new("x", "d", "1"), Arc::new(EchoBehavior))
            .unwrap_err();
        assert!(matches!(err, AgentcError::Validation(_)));
    }

    #[test]
    fn test_builtin_behavior_selection() {
        let mut registry = AgentRegistry::new();
        let spec = AgentSpec::new("Shell", "d", "1").with_tool(ToolBinding::from_id(COMMAND_TOOL_ID));
        registry.register_loaded("shell", spec).unwrap();
        registry
            .register_loaded("echo", AgentSpec::new("Echo", "d", "1"))
            .unwrap();
        assert_eq!(registry.ids(), vec!["echo", "shell"]);
    }

    #[tokio::test]
    async fn test_invoke_unknown_is_failed() {
        let registry = AgentRegistry::new();
        let result = registry.invoke("ghost", vec![]).await;
        assert!(!result.is_success());
        assert_eq!(result.message(), Some("unknown agent: ghost"));
    }
}
