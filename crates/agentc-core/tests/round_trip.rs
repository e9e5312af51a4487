//! Generate-then-parse tests: every spec field must survive the artifact.

use agentc_core::{
    parse_artifact, render, AgentSpec, DigestStatus, FieldSpec, FieldType, ToolBinding,
};

fn stock_bot() -> AgentSpec {
    AgentSpec::new("Stock Bot", "Looks up stock quotes", "1.0.0")
        .with_prompt("You are a stock assistant.")
        .with_tool(ToolBinding::new("stock_quote", "Stock Quote", "finance"))
        .with_input("query", FieldSpec::new(FieldType::String, true, "q"))
        .with_output("result", FieldSpec::new(FieldType::String, true, "r"))
}

fn round_trip(spec: &AgentSpec) -> AgentSpec {
    let artifact = render(spec).expect("render");
    let parsed = parse_artifact(&artifact.source);
    assert!(parsed.is_clean(), "issues: {:?}", parsed.issues);
    assert_eq!(parsed.digest, DigestStatus::Matches);
    parsed.spec
}

#[test]
fn test_stock_bot_round_trips() {
    let spec = stock_bot();
    assert_eq!(round_trip(&spec), spec);
}

#[test]
fn test_empty_schemas_and_tools_round_trip() {
    let spec = AgentSpec::new("Blank", "Nothing declared", "0.0.1");
    let artifact = render(&spec).unwrap();

    assert!(artifact.source.contains("input_schema: r#\"{}\"#,"));
    assert!(artifact.source.contains("tools: r#\"[]\"#,"));
    assert_eq!(round_trip(&spec), spec);
}

#[test]
fn test_nested_braces_in_text_fields() {
    let spec = AgentSpec::new("Brace Bot", "use {curly} braces", "1.0.0")
        .with_tool(ToolBinding::new("fmt", "Format ] [ tool", "text}"))
        .with_input(
            "template",
            FieldSpec::new(FieldType::String, true, "a {{nested}} template with } and {"),
        )
        .with_input("items", FieldSpec::new(FieldType::Array, false, "[a, b]"))
        .with_output("out", FieldSpec::new(FieldType::Object, false, "{\"k\": 1}"));

    assert_eq!(round_trip(&spec), spec);
}

#[test]
fn test_quotes_backslashes_and_unicode_in_scalars() {
    let spec = AgentSpec::new(
        "Quote \"Bot\" \\ ünïcödé",
        "Says \"hi\"\tand\\or leaves",
        "2.0.0-beta+\"x\"",
    );
    assert_eq!(round_trip(&spec), spec);
}

#[test]
fn test_hostile_prompts_round_trip() {
    let prompts = [
        "",
        "plain",
        "multi\nline\n\nwith blank lines\n",
        "ends with quote\"",
        "raw fence \"# inside",
        "wider fences \"### and \"#",
        "labels inside\nname: \"Impostor\"\ntools: json!([])\noutput_schema: json!({",
        "unbalanced }}} ]]] {{",
        "backslashes \\n \\\" stay literal",
        "tabs\tand unicode ✓ ß",
    ];

    for prompt in prompts {
        let spec = stock_bot().with_prompt(prompt);
        assert_eq!(round_trip(&spec).system_prompt, prompt, "prompt {prompt:?}");
    }
}

#[test]
fn test_wide_schema_round_trips() {
    let mut spec = AgentSpec::new("Wide Form", "Sixty-four inputs", "1.0.0");
    for i in 0..64 {
        spec = spec
            .with_input(
                format!("field_{i:02}"),
                FieldSpec::new(FieldType::String, i % 2 == 0, "use {curly} braces"),
            )
            .with_output(format!("out_{i:02}"), FieldSpec::optional(FieldType::Number));
    }

    let parsed = round_trip(&spec);
    assert_eq!(parsed.input_schema.len(), 64);
    assert_eq!(parsed.input_schema.names()[63], "field_63");
    assert_eq!(parsed, spec);
}

#[test]
fn test_hash_prefixed_schema_text_round_trips() {
    let spec = stock_bot()
        .with_tool(ToolBinding::new("#channel", "\"# quoted", "\"##"))
        .with_input("tag", FieldSpec::new(FieldType::String, false, "#hashtag"))
        .with_output("page", FieldSpec::new(FieldType::String, false, "form\u{000c}feed"));

    assert_eq!(round_trip(&spec), spec);
}

#[test]
fn test_schema_order_is_preserved() {
    let spec = AgentSpec::new("Ordered", "d", "1")
        .with_input("zeta", FieldSpec::required(FieldType::String))
        .with_input("alpha", FieldSpec::optional(FieldType::Number))
        .with_input("mid", FieldSpec::optional(FieldType::Boolean));

    let parsed = round_trip(&spec);
    assert_eq!(parsed.input_schema.names(), vec!["zeta", "alpha", "mid"]);
}

#[test]
fn test_hand_edit_flips_digest_status() {
    let artifact = render(&stock_bot()).unwrap();
    let edited = artifact
        .source
        .replace("version: \"1.0.0\"", "version: \"1.0.1\"");

    let parsed = parse_artifact(&edited);
    assert!(parsed.is_clean());
    assert_eq!(parsed.spec.version, "1.0.1");
    assert_eq!(parsed.digest, DigestStatus::Edited);
}

#[test]
fn test_rendering_is_byte_stable() {
    let spec = stock_bot();
    let first = render(&spec).unwrap();
    let reparsed = parse_artifact(&first.source).spec;
    assert_eq!(render(&reparsed).unwrap().source, first.source);
}
