//! Integration tests for domain partitioning

use parley_engine::{DEFAULT_DOMAIN, IntentEngine};

use crate::{entities, parser};

#[test]
fn new_engine_has_only_the_default_domain() {
    let engine = IntentEngine::new();
    assert_eq!(engine.domains(), vec![DEFAULT_DOMAIN]);
    assert!(engine.intent_parsers(DEFAULT_DOMAIN).is_empty());
    assert!(engine.entity_types(DEFAULT_DOMAIN).is_empty());
    assert!(engine.regex_entity_types(DEFAULT_DOMAIN).is_empty());
    assert!(engine.best_intent("anything at all").is_none());
}

#[test]
fn register_domain_is_idempotent() {
    let engine = IntentEngine::new();
    assert!(engine.register_domain("music"));
    engine.register_entity("jazz", "Genre", "music");
    assert!(!engine.register_domain("music"));

    assert_eq!(engine.domains(), vec![DEFAULT_DOMAIN, "music"]);
    assert!(engine.entity_types("music").contains("Genre"));
}

#[test]
fn entities_never_cross_domains() {
    let engine = IntentEngine::new();
    engine.register_entity("tree", "Entity1", "Domain1");
    engine.register_entity("house", "Entity2", "Domain2");
    engine.register_intent_parser(parser("Parser1", &["Entity1", "Entity2"]), "Domain1").unwrap();
    engine.register_intent_parser(parser("Parser2", &["Entity1", "Entity2"]), "Domain2").unwrap();

    // Each domain has only one of the two entities
    assert_eq!(engine.determine_intent("tree house", 10).count(), 0);
}

#[test]
fn same_type_name_is_separate_per_domain() {
    let engine = IntentEngine::new();
    engine.register_entity("jazz", "Genre", "music");
    engine.register_entity("comedy", "Genre", "movies");
    engine.register_intent_parser(parser("Play", &["Genre"]), "music").unwrap();
    engine.register_intent_parser(parser("Watch", &["Genre"]), "movies").unwrap();

    let result = engine.best_intent("some jazz please").unwrap();
    assert_eq!((result.domain.as_str(), result.intent_type.as_str()), ("music", "Play"));
    let result = engine.best_intent("some comedy please").unwrap();
    assert_eq!((result.domain.as_str(), result.intent_type.as_str()), ("movies", "Watch"));
}

#[test]
fn results_merge_across_domains() {
    let engine = IntentEngine::new();
    entities(&engine, "Domain1", &[("tree", "Entity1")]);
    entities(&engine, "Domain2", &[("tree", "Entity1"), ("tree house", "Place")]);
    engine.register_intent_parser(parser("Parser1", &["Entity1"]), "Domain1").unwrap();
    engine.register_intent_parser(parser("Parser1", &["Entity1"]), "Domain2").unwrap();
    engine.register_intent_parser(parser("Visit", &["Place"]), "Domain2").unwrap();

    let results: Vec<_> = engine.determine_intent("go to the tree house", 10).collect();
    let seen: Vec<(&str, &str)> = results
        .iter()
        .map(|r| (r.domain.as_str(), r.intent_type.as_str()))
        .collect();
    assert_eq!(
        seen,
        vec![("Domain2", "Visit"), ("Domain1", "Parser1"), ("Domain2", "Parser1")]
    );
}

#[test]
fn dropping_a_domain_removes_its_results() {
    let engine = IntentEngine::new();
    engine.register_entity("jazz", "Genre", "music");
    engine.register_intent_parser(parser("Play", &["Genre"]), "music").unwrap();
    assert!(engine.best_intent("jazz").is_some());

    assert!(engine.drop_domain("music"));
    assert!(!engine.drop_domain("music"));
    assert!(!engine.has_domain("music"));
    assert!(engine.best_intent("jazz").is_none());
}

#[test]
fn default_domain_cannot_be_dropped() {
    let engine = IntentEngine::new();
    assert!(!engine.drop_domain(DEFAULT_DOMAIN));
    assert!(engine.require_domain(DEFAULT_DOMAIN).is_ok());
    assert!(engine.require_domain("missing").unwrap_err().is_invalid_argument());
}

#[test]
fn streams_see_the_registry_at_creation() {
    let engine = IntentEngine::new();
    engine.register_entity("jazz", "Genre", "music");
    engine.register_intent_parser(parser("Play", &["Genre"]), "music").unwrap();

    let stream = engine.determine_intent("jazz", 5);
    engine.drop_domain("music");
    assert_eq!(stream.count(), 1);
}
