//! Integration tests for engine configuration

use parley_foundation::{EngineConfig, ErrorKind};

#[test]
fn defaults() {
    let config = EngineConfig::default();
    assert_eq!(config.max_window, 5);
    assert_eq!(config.max_edit_distance, 1);
    assert_eq!(config.fuzzy_min_chars, 4);
    assert!((config.regex_confidence - 0.9).abs() < f64::EPSILON);
    assert!((config.optional_weight - 0.5).abs() < f64::EPSILON);
}

#[test]
fn builders_chain() {
    let config = EngineConfig::exact()
        .with_max_window(2)
        .with_fuzzy_min_chars(6)
        .with_optional_weight(1.0);
    assert_eq!(config.max_edit_distance, 0);
    assert_eq!(config.max_window, 2);
    assert!(config.validate().is_ok());
}

#[test]
fn fuzzy_gate() {
    let config = EngineConfig::default();
    assert!(!config.allows_fuzzy(3));
    assert!(config.allows_fuzzy(4));
    assert!(!EngineConfig::exact().allows_fuzzy(40));
}

#[test]
fn out_of_range_values_are_rejected() {
    for config in [
        EngineConfig::default().with_max_window(0),
        EngineConfig::default().with_regex_confidence(0.0),
        EngineConfig::default().with_regex_confidence(1.5),
        EngineConfig::default().with_optional_weight(-0.1),
        EngineConfig::default().with_optional_weight(f64::NAN),
    ] {
        let err = config.validate().unwrap_err();
        assert!(matches!(err.kind, ErrorKind::InvalidConfig(_)));
    }
}
