//! Rendered artifacts compiled into this crate: they must register, run, and
//! parse back to the spec they were compiled with.

use agentc_conformance::{hostile_prompt, stock_bot, wide_form, ARTIFACTS};
use agentc_core::{parse_artifact, parse_spec, render, AgentRegistry, AgentcError, DigestStatus};
use serde_json::json;

#[test]
fn test_every_spec_file_is_compiled() {
    let slugs: Vec<_> = ARTIFACTS.iter().map(|a| a.slug).collect();
    assert_eq!(slugs, vec!["hostile-prompt", "stock-bot", "wide-form"]);
}

#[test]
fn test_compiled_spec_matches_parsed_source() {
    for artifact in ARTIFACTS {
        let compiled = (artifact.spec)();
        let parsed = parse_artifact(artifact.source);

        assert!(parsed.is_clean(), "{}: {:?}", artifact.slug, parsed.issues);
        assert_eq!(parsed.digest, DigestStatus::Matches, "{}", artifact.slug);
        assert_eq!(parsed.spec, compiled, "{}", artifact.slug);
        assert_eq!(parse_spec(artifact.source), compiled);
    }
}

#[test]
fn test_rerendering_compiled_spec_is_byte_identical() {
    for artifact in ARTIFACTS {
        let fresh = render(&(artifact.spec)()).unwrap();
        assert_eq!(fresh.slug, artifact.slug);
        assert_eq!(fresh.source, artifact.source, "{}", artifact.slug);
    }
}

#[tokio::test]
async fn test_register_hooks_bind_slugs() {
    let mut registry = AgentRegistry::new();
    for artifact in ARTIFACTS {
        (artifact.register)(&mut registry).unwrap();
    }
    assert_eq!(registry.ids(), vec!["hostile-prompt", "stock-bot", "wide-form"]);

    let result = registry
        .invoke(stock_bot::SLUG, vec!["AAPL".into(), "5".into()])
        .await;
    assert!(result.is_success(), "{result:?}");
    assert_eq!(
        result.output(),
        Some(&json!({"agent": "Stock Bot", "input": {"query": "AAPL", "limit": 5}}))
    );
}

#[test]
fn test_register_hook_rejects_second_registration() {
    let mut registry = AgentRegistry::new();
    stock_bot::register(&mut registry).unwrap();
    assert!(matches!(
        stock_bot::register(&mut registry),
        Err(AgentcError::DuplicateAgent(id)) if id == stock_bot::SLUG
    ));
}

#[tokio::test]
async fn test_wide_schema_compiles_and_runs() {
    let spec = wide_form::spec();
    assert_eq!(spec.input_schema.len(), 64);
    assert_eq!(spec.output_schema.len(), 64);
    let names = spec.input_schema.names();
    assert_eq!(names.first(), Some(&"field_00"));
    assert_eq!(names.last(), Some(&"field_63"));

    let mut registry = AgentRegistry::new();
    wide_form::register(&mut registry).unwrap();

    let args: Vec<String> = (0..64).map(|i| format!("v{i}")).collect();
    let result = registry.invoke(wide_form::SLUG, args).await;
    assert!(result.is_success(), "{result:?}");

    let input = &result.output().unwrap()["input"];
    assert_eq!(input["field_00"], json!("v0"));
    assert_eq!(input["field_63"], json!("v63"));
}

#[test]
fn test_hostile_text_survives_compilation() {
    let spec = hostile_prompt::spec();

    assert_eq!(spec.description, "Says \"hi\" \\ and {braces}");
    assert!(spec.system_prompt.contains("Never emit \"### fences."));
    assert!(spec.system_prompt.contains("\nname: \"Impostor\"\n"));
    assert!(hostile_prompt::SOURCE.contains("system_prompt: r####\"You are"));

    assert_eq!(spec.tools[0].id, "#channel");
    assert_eq!(spec.tools[1].display_name, "\"#quoted");
    assert_eq!(
        spec.input_schema.get("template").map(|f| f.description.as_str()),
        Some("use {curly} braces } {")
    );
    assert_eq!(
        spec.output_schema.get("page").map(|f| f.description.as_str()),
        Some("form\u{000c}feed")
    );
}
