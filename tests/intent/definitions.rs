//! Integration tests for intent definitions

use parley_intent::{IntentBuilder, IntentDefinition, SlotRequirement};

// =============================================================================
// Builder
// =============================================================================

#[test]
fn builder_collects_every_section() {
    let intent = IntentBuilder::new("Route")
        .require("Place")
        .require_as("Place", "via")
        .optionally("Time")
        .one_of(["Car", "Bus"])
        .exclude("Cancel")
        .build()
        .unwrap();

    assert_eq!(
        intent.required,
        vec![SlotRequirement::new("Place"), SlotRequirement::named("Place", "via")]
    );
    assert_eq!(intent.optional, vec![SlotRequirement::new("Time")]);
    assert_eq!(intent.at_least_one, vec![vec!["Car".to_string(), "Bus".to_string()]]);
    assert_eq!(intent.excludes, vec!["Cancel".to_string()]);
    assert_eq!(
        intent.entity_types().into_iter().collect::<Vec<_>>(),
        vec!["Bus", "Cancel", "Car", "Place", "Time"]
    );
}

#[test]
fn display_is_compact() {
    let intent = IntentDefinition::builder("Route")
        .require_as("Place", "to")
        .optionally("Time")
        .one_of(["Car"])
        .exclude("Cancel")
        .build()
        .unwrap();
    assert_eq!(intent.to_string(), "Route +to:Place ?Time (Car) !Cancel");
}

#[test]
fn intent_without_requirements_is_allowed() {
    let intent = IntentBuilder::new("Anything").build().unwrap();
    assert!(intent.entity_types().is_empty());
}

// =============================================================================
// Validation
// =============================================================================

#[test]
fn blank_name_is_rejected() {
    let err = IntentBuilder::new("  ").require("Thing").build().unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn duplicate_slot_is_rejected() {
    let err = IntentBuilder::new("Twice")
        .require("Place")
        .optionally("Place")
        .build()
        .unwrap_err();
    assert!(err.is_invalid_argument());
    assert!(err.to_string().contains("Place"));
}

#[test]
fn empty_group_is_rejected() {
    let err = IntentBuilder::new("Nothing")
        .one_of(Vec::<String>::new())
        .build()
        .unwrap_err();
    assert!(err.is_invalid_argument());
}

#[test]
fn hand_built_definition_is_validated() {
    let intent = IntentDefinition {
        name: "Broken".to_string(),
        required: vec![SlotRequirement::named("", "slot")],
        optional: Vec::new(),
        at_least_one: Vec::new(),
        excludes: Vec::new(),
    };
    assert!(intent.validate().is_err());
}
