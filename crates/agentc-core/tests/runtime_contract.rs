//! Execution contract: coercion, failure containment and terminal states.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use agentc_core::prelude::*;
use agentc_core::{
    AgentRuntime, CommandSandbox, ExecutionResult, FieldSpec, FieldType, RuntimeConfig,
    RuntimeState,
};

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn quote_spec() -> Arc<AgentSpec> {
    Arc::new(
        AgentSpec::new("Stock Bot", "quotes", "1.0.0")
            .with_input("query", FieldSpec::new(FieldType::String, true, "q"))
            .with_input("limit", FieldSpec::optional(FieldType::Number))
            .with_input("live", FieldSpec::optional(FieldType::Boolean))
            .with_input("fields", FieldSpec::optional(FieldType::Array)),
    )
}

/// Returns its input and counts calls.
#[derive(Default)]
struct Recording {
    calls: AtomicUsize,
}

#[async_trait]
impl AgentBehavior for Recording {
    async fn execute(&self, _ctx: &mut AgentContext, input: AgentInput) -> AgentOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(input.to_value())
    }
}

struct Panicking;

#[async_trait]
impl AgentBehavior for Panicking {
    async fn execute(&self, _ctx: &mut AgentContext, _input: AgentInput) -> AgentOutcome {
        panic!("behavior exploded");
    }
}

fn runtime(behavior: Arc<dyn AgentBehavior>, config: RuntimeConfig) -> AgentRuntime {
    AgentRuntime::new(quote_spec(), behavior, CommandSandbox::default(), config)
}

#[tokio::test]
async fn test_coerced_input_reaches_behavior() {
    let behavior = Arc::new(Recording::default());
    let mut rt = runtime(behavior.clone(), RuntimeConfig::default());

    let result = rt.run(&args(&["AAPL", "5", "true", "price, volume"])).await;

    assert!(result.is_success());
    assert_eq!(
        result.output(),
        Some(&json!({
            "query": "AAPL",
            "limit": 5,
            "live": true,
            "fields": ["price", "volume"],
        }))
    );
    assert_eq!(behavior.calls.load(Ordering::SeqCst), 1);
    assert_eq!(rt.state(), RuntimeState::Succeeded);
}

#[tokio::test]
async fn test_unparsable_number_defaults_to_zero() {
    let mut rt = runtime(Arc::new(Recording::default()), RuntimeConfig::default());
    let result = rt.run(&args(&["AAPL", "abc"])).await;

    assert!(result.is_success());
    assert_eq!(result.output().unwrap()["limit"], json!(0));
}

#[tokio::test]
async fn test_strict_numbers_fail_before_execution() {
    let behavior = Arc::new(Recording::default());
    let mut rt = runtime(
        behavior.clone(),
        RuntimeConfig {
            strict_numbers: true,
        },
    );
    let result = rt.run(&args(&["AAPL", "abc"])).await;

    assert!(!result.is_success());
    assert!(result.message().unwrap().contains("invalid number for 'limit'"));
    assert_eq!(behavior.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_missing_required_argument_fails_without_executing() {
    let behavior = Arc::new(Recording::default());
    let mut rt = runtime(behavior.clone(), RuntimeConfig::default());

    let result = rt.run(&[]).await;

    match &result {
        ExecutionResult::Failed { agent, message, .. } => {
            assert_eq!(agent, "Stock Bot");
            assert_eq!(message, "missing required parameter: query");
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert_eq!(behavior.calls.load(Ordering::SeqCst), 0);
    assert_eq!(rt.state(), RuntimeState::Failed);
}

#[tokio::test]
async fn test_panic_in_behavior_becomes_failed() {
    let mut rt = runtime(Arc::new(Panicking), RuntimeConfig::default());
    let result = rt.run(&args(&["AAPL"])).await;

    assert!(!result.is_success());
    assert_eq!(result.agent(), "Stock Bot");
    assert!(result.message().unwrap().contains("behavior exploded"));
    assert_eq!(rt.state(), RuntimeState::Failed);
}

#[tokio::test]
async fn test_runtime_is_reusable_across_invocations() {
    let mut rt = runtime(Arc::new(Recording::default()), RuntimeConfig::default());

    let failed = rt.run(&[]).await;
    let ok = rt.run(&args(&["MSFT"])).await;

    assert!(!failed.is_success());
    assert!(ok.is_success());
    assert_ne!(failed.run_id(), ok.run_id());
    assert_eq!(rt.state(), RuntimeState::Succeeded);
}

#[tokio::test]
async fn test_failed_result_serializes_for_consumers() {
    let mut rt = runtime(Arc::new(Panicking), RuntimeConfig::default());
    let value = serde_json::to_value(rt.run(&args(&["AAPL"])).await).unwrap();

    assert_eq!(value["status"], "failed");
    assert_eq!(value["agent"], "Stock Bot");
    assert!(value["timestamp"].as_str().is_some());
}
