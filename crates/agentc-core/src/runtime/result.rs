//! Terminal outcome of an invocation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// What an invocation produced. Failures carry the agent name and the time
/// they happened; they are values, never panics or errors.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ExecutionResult {
    Succeeded {
        agent: String,
        run_id: Uuid,
        timestamp: DateTime<Utc>,
        output: Value,
    },
    Failed {
        agent: String,
        run_id: Uuid,
        timestamp: DateTime<Utc>,
        message: String,
    },
}

impl ExecutionResult {
    pub fn succeeded(agent: impl Into<String>, run_id: Uuid, output: Value) -> Self {
        Self::Succeeded {
            agent: agent.into(),
            run_id,
            timestamp: Utc::now(),
            output,
        }
    }

    pub fn failed(agent: impl Into<String>, run_id: Uuid, message: impl Into<String>) -> Self {
        Self::Failed {
            agent: agent.into(),
            run_id,
            timestamp: Utc::now(),
            message: message.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded { .. })
    }

    pub fn agent(&self) -> &str {
        match self {
            Self::Succeeded { agent, .. } | Self::Failed { agent, .. } => agent,
        }
    }

    pub fn run_id(&self) -> Uuid {
        match self {
            Self::Succeeded { run_id, .. } | Self::Failed { run_id, .. } => *run_id,
        }
    }

    /// Failure message, if any.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Failed { message, .. } => Some(message),
            Self::Succeeded { .. } => None,
        }
    }

    /// Behavior output, if any.
    pub fn output(&self) -> Option<&Value> {
        match self {
            Self::Succeeded { output, .. } => Some(output),
            Self::Failed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failed_serializes_with_status_tag() {
        let result = ExecutionResult::failed("Bot", Uuid::nil(), "boom");
        let value = serde_json::to_value(&result).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["agent"], "Bot");
        assert_eq!(value["message"], "boom");
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_accessors() {
        let ok = ExecutionResult::succeeded("Bot", Uuid::nil(), json!({"x": 1}));
        assert!(ok.is_success());
        assert_eq!(ok.output(), Some(&json!({"x": 1})));
        assert_eq!(ok.message(), None);
        assert_eq!(ok.agent(), "Bot");

        let back: ExecutionResult =
            serde_json::from_value(serde_json::to_value(&ok).unwrap()).unwrap();
        assert_eq!(back, ok);
    }
}
