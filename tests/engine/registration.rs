//! Integration tests for registration and removal

use parley_engine::{DEFAULT_DOMAIN, IntentEngine};
use parley_intent::{IntentBuilder, IntentDefinition, SlotRequirement};

use crate::{entities, parser};

// =============================================================================
// Entities
// =============================================================================

#[test]
fn entity_surfaces_are_normalized() {
    let engine = IntentEngine::new();
    assert!(engine.register_entity("Tree   House", "Building", DEFAULT_DOMAIN));
    assert!(!engine.register_entity("tree house", "Building", DEFAULT_DOMAIN));
    assert_eq!(
        engine.entity_types(DEFAULT_DOMAIN).into_iter().collect::<Vec<_>>(),
        vec!["Building"]
    );
}

#[test]
fn blank_entities_are_ignored() {
    let engine = IntentEngine::new();
    assert!(!engine.register_entity("   ", "Thing", DEFAULT_DOMAIN));
    assert!(!engine.register_entity("thing", " ", DEFAULT_DOMAIN));
    assert!(engine.entity_types(DEFAULT_DOMAIN).is_empty());
}

#[test]
fn registering_into_unknown_domain_creates_it() {
    let engine = IntentEngine::new();
    engine.register_entity("jazz", "Genre", "music");
    assert!(engine.has_domain("music"));
    assert_eq!(engine.domains(), vec![DEFAULT_DOMAIN, "music"]);
}

// =============================================================================
// Regex Entities
// =============================================================================

#[test]
fn invalid_regex_reports_domain() {
    let engine = IntentEngine::new();
    let err = engine
        .register_regex_entity(r"(?P<Broken>[a-z", "music")
        .unwrap_err();
    assert!(err.is_invalid_pattern());
    let context = err.context.unwrap();
    assert_eq!(context.domain.as_deref(), Some("music"));
    assert_eq!(context.operation.as_deref(), Some("register_regex_entity"));
}

#[test]
fn regex_types_are_listed() {
    let engine = IntentEngine::new();
    let types = engine
        .register_regex_entity(r"from (?P<Origin>\w+) to (?P<Destination>\w+)", DEFAULT_DOMAIN)
        .unwrap();
    assert_eq!(types.len(), 2);
    assert_eq!(engine.regex_entity_types(DEFAULT_DOMAIN), types);
    assert_eq!(engine.regex_patterns(DEFAULT_DOMAIN).len(), 1);
}

#[test]
fn drop_regex_is_true_exactly_once() {
    let engine = IntentEngine::new();
    engine.register_regex_entity(r"the cat (?P<Cat>.*)", "pets").unwrap();
    assert!(engine.drop_regex_entity("pets", "Cat"));
    assert!(!engine.drop_regex_entity("pets", "Cat"));
    assert!(!engine.drop_regex_entity("nowhere", "Cat"));
}

#[test]
fn drop_entity_removes_keywords_and_regexes() {
    let engine = IntentEngine::new();
    engine.register_entity("rex", "Dog", DEFAULT_DOMAIN);
    engine.register_regex_entity(r"the dog (?P<Dog>\w+)", DEFAULT_DOMAIN).unwrap();

    assert!(engine.drop_entity(DEFAULT_DOMAIN, "Dog"));
    assert!(engine.entity_types(DEFAULT_DOMAIN).is_empty());
    assert!(engine.regex_entity_types(DEFAULT_DOMAIN).is_empty());
    assert!(!engine.drop_entity(DEFAULT_DOMAIN, "Dog"));
}

// =============================================================================
// Intent Parsers
// =============================================================================

#[test]
fn malformed_parser_is_rejected() {
    let engine = IntentEngine::new();
    let nameless = IntentDefinition {
        name: String::new(),
        required: vec![SlotRequirement::new("Thing")],
        optional: Vec::new(),
        at_least_one: Vec::new(),
        excludes: Vec::new(),
    };
    let err = engine
        .register_intent_parser(nameless, DEFAULT_DOMAIN)
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(engine.intent_parsers(DEFAULT_DOMAIN).is_empty());
}

#[test]
fn same_name_overwrites_in_place() {
    let engine = IntentEngine::new();
    engine.register_intent_parser(parser("First", &["A"]), DEFAULT_DOMAIN).unwrap();
    engine.register_intent_parser(parser("Second", &["B"]), DEFAULT_DOMAIN).unwrap();
    engine.register_intent_parser(parser("First", &["C"]), DEFAULT_DOMAIN).unwrap();

    let parsers = engine.intent_parsers(DEFAULT_DOMAIN);
    let names: Vec<&str> = parsers.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["First", "Second"]);
    assert_eq!(parsers[0].required, vec![SlotRequirement::new("C")]);
}

#[test]
fn overwritten_parser_changes_results() {
    let engine = IntentEngine::new();
    entities(&engine, DEFAULT_DOMAIN, &[("tree", "Entity1"), ("house", "Entity2")]);
    engine.register_intent_parser(parser("Parser", &["Entity1"]), DEFAULT_DOMAIN).unwrap();
    let before = engine.best_intent("tree").unwrap();
    assert_eq!(before.value("Entity1"), Some("tree"));

    engine.register_intent_parser(parser("Parser", &["Entity2"]), DEFAULT_DOMAIN).unwrap();
    assert!(engine.best_intent("tree").is_none());
    assert_eq!(engine.best_intent("house").unwrap().intent_type, "Parser");
}

#[test]
fn drop_intent_parser_ignores_unknown_names() {
    let engine = IntentEngine::new();
    engine.register_intent_parser(parser("A", &["X"]), DEFAULT_DOMAIN).unwrap();
    engine.register_intent_parser(parser("B", &["X"]), DEFAULT_DOMAIN).unwrap();

    assert_eq!(engine.drop_intent_parser(DEFAULT_DOMAIN, &["A", "Missing"]), 1);
    assert_eq!(engine.drop_intent_parser(DEFAULT_DOMAIN, &["A"]), 0);
    assert_eq!(engine.drop_intent_parser("nowhere", &["B"]), 0);
    assert_eq!(engine.intent_parsers(DEFAULT_DOMAIN).len(), 1);
}

#[test]
fn parser_builder_with_optional_registers() {
    let engine = IntentEngine::new();
    let intent = IntentBuilder::new("WeatherIntent")
        .require("Weather")
        .optionally("Location")
        .build()
        .unwrap();
    engine.register_intent_parser(intent.clone(), DEFAULT_DOMAIN).unwrap();
    assert_eq!(engine.intent_parsers(DEFAULT_DOMAIN), vec![intent]);
}
