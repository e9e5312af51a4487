//! Per-invocation state handed to agent behaviors.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::{Map, Value};
use uuid::Uuid;

use crate::domain::AgentSpec;
use crate::sandbox::{resolve_directory, CommandExecutionRecord, CommandSandbox, ExecOptions, SandboxResult};

/// Structured input record produced by argument coercion.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentInput {
    fields: Map<String, Value>,
}

impl AgentInput {
    pub(crate) fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    pub fn str(&self, field: &str) -> Option<&str> {
        self.get(field).and_then(Value::as_str)
    }

    pub fn number(&self, field: &str) -> Option<f64> {
        self.get(field).and_then(Value::as_f64)
    }

    pub fn bool(&self, field: &str) -> Option<bool> {
        self.get(field).and_then(Value::as_bool)
    }

    /// String items of an array field.
    pub fn list(&self, field: &str) -> Option<Vec<String>> {
        self.get(field).and_then(Value::as_array).map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
    }

    pub fn contains(&self, field: &str) -> bool {
        self.fields.contains_key(field)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.fields.clone())
    }
}

/// What a behavior can see and do during one invocation.
///
/// The working directory here belongs to this invocation alone: it starts at
/// the sandbox's directory when the invocation begins, and changes made with
/// [`change_directory`](Self::change_directory) are invisible to any other
/// invocation or to the shared sandbox.
#[derive(Debug, Clone)]
pub struct AgentContext {
    spec: Arc<AgentSpec>,
    run_id: Uuid,
    sandbox: CommandSandbox,
    cwd: PathBuf,
}

impl AgentContext {
    pub fn new(spec: Arc<AgentSpec>, run_id: Uuid, sandbox: CommandSandbox) -> Self {
        let cwd = sandbox.working_directory();
        Self {
            spec,
            run_id,
            sandbox,
            cwd,
        }
    }

    pub fn agent_name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &AgentSpec {
        &self.spec
    }

    pub fn system_prompt(&self) -> &str {
        &self.spec.system_prompt
    }

    pub fn run_id(&self) -> Uuid {
        self.run_id
    }

    pub fn has_tool(&self, id: &str) -> bool {
        self.spec.has_tool(id)
    }

    pub fn sandbox(&self) -> &CommandSandbox {
        &self.sandbox
    }

    pub fn working_directory(&self) -> &Path {
        &self.cwd
    }

    /// Change this invocation's working directory. Relative paths resolve
    /// against the current one; the target must be an existing directory.
    pub async fn change_directory(&mut self, path: impl AsRef<Path>) -> SandboxResult<&Path> {
        self.cwd = resolve_directory(&self.cwd, path.as_ref()).await?;
        Ok(&self.cwd)
    }

    /// Run a command through the sandbox in this invocation's directory.
    pub async fn run_command(&self, command: &str, args: &[String]) -> CommandExecutionRecord {
        self.run_command_with(command, args, ExecOptions::default())
            .await
    }

    /// Like [`run_command`](Self::run_command) with explicit options. A `cwd`
    /// in `options` wins over the invocation's directory.
    pub async fn run_command_with(
        &self,
        command: &str,
        args: &[String],
        mut options: ExecOptions,
    ) -> CommandExecutionRecord {
        if options.cwd.is_none() {
            options.cwd = Some(self.cwd.clone());
        }
        self.sandbox.execute(command, args, options).await
    }
}
