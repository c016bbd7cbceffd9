//! Integration tests for Layer 4: Engine
//!
//! Tests for registration, lazy determination, domains, and snapshots.

mod domains;
mod registration;
mod snapshots;

use parley_engine::IntentEngine;
use parley_intent::{IntentBuilder, IntentDefinition};

/// Definition requiring each of `types`.
pub fn parser(name: &str, types: &[&str]) -> IntentDefinition {
    types
        .iter()
        .fold(IntentBuilder::new(name), |b, t| b.require(*t))
        .build()
        .unwrap()
}

/// Registers each `(surface, type)` pair in `domain`.
pub fn entities(engine: &IntentEngine, domain: &str, pairs: &[(&str, &str)]) {
    for (surface, entity_type) in pairs {
        engine.register_entity(surface, entity_type, domain);
    }
}
