//! Integration tests for registry snapshots

use std::sync::Arc;

use parley_engine::{DEFAULT_DOMAIN, DomainSnapshot, EngineSnapshot, EntityRecord, IntentEngine};
use parley_foundation::{EngineConfig, EnglishTokenizer};
use parley_intent::IntentBuilder;

use crate::parser;

fn populated() -> IntentEngine {
    let engine = IntentEngine::with_config(EngineConfig::default().with_max_window(3)).unwrap();
    engine.register_entity("weather", "Weather", DEFAULT_DOMAIN);
    engine.register_entity_alias("nyc", "new york", "Location", DEFAULT_DOMAIN);
    engine
        .register_regex_entity(r"in (?P<Days>\d+) days", DEFAULT_DOMAIN)
        .unwrap();
    engine
        .register_intent_parser(
            IntentBuilder::new("Forecast")
                .require("Weather")
                .optionally("Location")
                .optionally("Days")
                .build()
                .unwrap(),
            DEFAULT_DOMAIN,
        )
        .unwrap();
    engine.register_entity("jazz", "Genre", "music");
    engine.register_intent_parser(parser("Play", &["Genre"]), "music").unwrap();
    engine
}

fn restore(snapshot: &EngineSnapshot) -> IntentEngine {
    IntentEngine::from_snapshot(snapshot, Arc::new(EnglishTokenizer::new())).unwrap()
}

#[test]
fn snapshot_captures_everything() {
    let snapshot = populated().snapshot();
    assert_eq!(snapshot.config.max_window, 3);
    assert_eq!(snapshot.domains.len(), 2);

    let default = snapshot.domain(DEFAULT_DOMAIN).unwrap();
    assert_eq!(
        default.entities[1],
        EntityRecord {
            surface: "nyc".to_string(),
            entity_type: "Location".to_string(),
            canonical: "new york".to_string(),
        }
    );
    assert_eq!(default.regex_patterns.len(), 1);
    assert_eq!(default.intents[0].name, "Forecast");
}

#[test]
fn restored_engine_answers_the_same() {
    let original = populated();
    let restored = restore(&original.snapshot());

    assert_eq!(restored.domains(), original.domains());
    assert_eq!(restored.config(), original.config());
    for text in ["weather in nyc in 3 days", "some jazz", "nothing here"] {
        let a: Vec<String> = original.determine_intent(text, 5).map(|r| r.to_string()).collect();
        let b: Vec<String> = restored.determine_intent(text, 5).map(|r| r.to_string()).collect();
        assert_eq!(a, b, "{text}");
    }
    assert_eq!(restored.snapshot(), original.snapshot());
}

#[test]
fn missing_default_domain_is_recreated() {
    let snapshot = EngineSnapshot {
        config: EngineConfig::default(),
        domains: vec![DomainSnapshot {
            name: "music".to_string(),
            entities: Vec::new(),
            regex_patterns: Vec::new(),
            intents: Vec::new(),
        }],
    };
    let engine = restore(&snapshot);
    assert_eq!(engine.domains(), vec![DEFAULT_DOMAIN, "music"]);
}

#[test]
fn invalid_pattern_fails_restore() {
    let mut snapshot = populated().snapshot();
    snapshot.domains[0].regex_patterns.push("(?P<Broken>".to_string());
    let err = IntentEngine::from_snapshot(&snapshot, Arc::new(EnglishTokenizer::new())).unwrap_err();
    assert!(err.is_invalid_pattern());
    assert_eq!(err.context.unwrap().domain.as_deref(), Some(DEFAULT_DOMAIN));
}

#[test]
fn invalid_config_fails_restore() {
    let mut snapshot = populated().snapshot();
    snapshot.config.max_window = 0;
    assert!(IntentEngine::from_snapshot(&snapshot, Arc::new(EnglishTokenizer::new())).is_err());
}
