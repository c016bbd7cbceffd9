//! Integration tests for regex entities

use parley_foundation::{EnglishTokenizer, TagSource, Tokenizer};
use parley_lexicon::{RegexEntity, RegexRegistry};

#[test]
fn named_groups_define_entity_types() {
    let entity = RegexEntity::compile(r"from (?P<Origin>\w+) to (?P<Destination>\w+)").unwrap();
    let types: Vec<&str> = entity.entity_types().iter().map(String::as_str).collect();
    assert_eq!(types, vec!["Destination", "Origin"]);
    assert!(entity.defines("Origin"));
    assert!(!entity.defines("Vehicle"));
}

#[test]
fn invalid_pattern_is_rejected_at_registration() {
    let mut registry = RegexRegistry::new();
    let err = registry.register(r"the dog (?P<Dog>.*").unwrap_err();
    assert!(err.is_invalid_pattern());
    assert!(registry.is_empty());
}

#[test]
fn catch_all_pattern_is_counted() {
    let mut registry = RegexRegistry::new();
    assert!(registry.register(".*").unwrap().is_empty());
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.patterns(), vec![".*".to_string()]);
}

#[test]
fn duplicate_pattern_is_stored_once() {
    let mut registry = RegexRegistry::new();
    registry.register(r"(?P<Number>\d+)").unwrap();
    registry.register(r"(?P<Number>\d+)").unwrap();
    assert_eq!(registry.len(), 1);
}

#[test]
fn matches_map_to_tokens() {
    let mut registry = RegexRegistry::new();
    registry.register(r"the dog (?P<Dog>.*)").unwrap();
    let utterance = EnglishTokenizer.utterance("walk the dog Rex now");
    let tags = registry.matches(&utterance, 0.9);

    assert_eq!(tags.len(), 1);
    let tag = &tags[0];
    assert_eq!(&*tag.entity_type, "Dog");
    assert_eq!(tag.surface, "Rex now");
    assert_eq!((tag.start, tag.end), (3, 5));
    assert_eq!(tag.source, TagSource::Regex);
}

#[test]
fn drop_type_removes_defining_patterns() {
    let mut registry = RegexRegistry::new();
    registry.register(r"the cat (?P<Cat>.*)").unwrap();
    registry.register(r"the dog (?P<Dog>.*)").unwrap();

    assert!(registry.drop_type("Cat"));
    assert!(!registry.drop_type("Cat"));
    assert_eq!(registry.entity_types().into_iter().collect::<Vec<_>>(), vec!["Dog"]);
}
