//! Artifact persistence: collisions, edits, and loading into a registry.

use agentc_core::{
    AgentRegistry, AgentSpec, AgentcError, ArtifactStore, CollisionPolicy, DigestStatus,
    FieldSpec, FieldType, WriteOutcome,
};

fn spec(name: &str) -> AgentSpec {
    AgentSpec::new(name, "Looks up quotes", "1.0.0")
        .with_input("query", FieldSpec::new(FieldType::String, true, "q"))
}

fn store_in(dir: &tempfile::TempDir, policy: CollisionPolicy) -> ArtifactStore {
    ArtifactStore::new(dir.path()).with_policy(policy)
}

#[test]
fn test_reject_is_the_default_policy() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    store.write(&spec("Stock Bot")).unwrap();

    let err = store.write(&spec("stock bot!")).unwrap_err();
    match err {
        AgentcError::SlugCollision {
            slug,
            existing,
            requested,
        } => {
            assert_eq!(slug, "stock-bot");
            assert_eq!(existing, "Stock Bot");
            assert_eq!(requested, "stock bot!");
        }
        other => panic!("expected collision, got {other:?}"),
    }
    assert_eq!(store.read_slug("stock-bot").unwrap().spec.name, "Stock Bot");
}

#[test]
fn test_overwrite_replaces_other_agent() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, CollisionPolicy::Overwrite);
    store.write(&spec("Stock Bot")).unwrap();

    let written = store.write(&spec("STOCK BOT")).unwrap();
    assert_eq!(written.outcome, WriteOutcome::Overwrote);
    assert_eq!(store.read_slug("stock-bot").unwrap().spec.name, "STOCK BOT");
}

#[test]
fn test_suffix_finds_first_free_slug() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, CollisionPolicy::Suffix);

    let first = store.write(&spec("Stock Bot")).unwrap();
    let second = store.write(&spec("stock bot")).unwrap();
    let third = store.write(&spec("Stock-Bot")).unwrap();

    assert_eq!(first.slug, "stock-bot");
    assert_eq!(second.slug, "stock-bot-2");
    assert_eq!(third.slug, "stock-bot-3");
    assert_eq!(second.outcome, WriteOutcome::Created);

    let parsed = store.read_slug("stock-bot-2").unwrap();
    assert_eq!(parsed.spec.name, "stock bot");
    assert_eq!(parsed.digest, DigestStatus::Matches);

    let again = store.write(&spec("stock bot")).unwrap();
    assert_eq!(again.slug, "stock-bot-2");
    assert_eq!(again.outcome, WriteOutcome::Unchanged);
}

#[test]
fn test_same_name_is_an_edit_under_every_policy() {
    for policy in [
        CollisionPolicy::Reject,
        CollisionPolicy::Overwrite,
        CollisionPolicy::Suffix,
    ] {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(&dir, policy);
        store.write(&spec("Stock Bot")).unwrap();

        let edited = spec("Stock Bot").with_prompt("New prompt");
        let written = store.write(&edited).unwrap();
        assert_eq!(written.outcome, WriteOutcome::Updated, "{policy}");
        assert_eq!(written.slug, "stock-bot");
    }
}

#[test]
fn test_hand_edited_artifact_is_detected() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path());
    let written = store.write(&spec("Stock Bot")).unwrap();

    let text = std::fs::read_to_string(&written.path).unwrap();
    std::fs::write(
        &written.path,
        text.replace("\"Looks up quotes\"", "\"Looks up quotes and news\""),
    )
    .unwrap();

    let parsed = store.read_slug("stock-bot").unwrap();
    assert_eq!(parsed.spec.description, "Looks up quotes and news");
    assert_eq!(parsed.digest, DigestStatus::Edited);

    // Rewriting the original spec restores the generated form.
    let rewritten = store.write(&spec("Stock Bot")).unwrap();
    assert_eq!(rewritten.outcome, WriteOutcome::Updated);
    assert_eq!(
        store.read_slug("stock-bot").unwrap().digest,
        DigestStatus::Matches
    );
}

#[test]
fn test_suffixed_artifacts_register_side_by_side() {
    let dir = tempfile::tempdir().unwrap();
    let store = store_in(&dir, CollisionPolicy::Suffix);
    let a = store.write(&spec("Stock Bot")).unwrap();
    let b = store.write(&spec("stock bot")).unwrap();

    let mut registry = AgentRegistry::new();
    for written in [&a, &b] {
        let parsed = store.read(&written.path).unwrap();
        registry.register_loaded(&written.slug, parsed.spec).unwrap();
    }

    assert_eq!(registry.ids(), vec!["stock-bot", "stock-bot-2"]);
    assert_eq!(registry.resolve("stock-bot-2").unwrap().spec().name, "stock bot");
}

#[test]
fn test_generation_error_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = ArtifactStore::new(dir.path().join("agents"));

    let err = store
        .write(&spec("Stock Bot").with_prompt("windows\r\nline"))
        .unwrap_err();
    assert!(matches!(err, AgentcError::Generation(_)));
    assert!(!store.artifact_path("stock-bot").exists());
}
