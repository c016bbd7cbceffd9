//! Domain registry and intent determination for Parley.
//!
//! This crate provides:
//! - [`IntentEngine`] - Thread-safe registry of domains, entities, and intents
//! - [`IntentStream`] - Lazy, globally ranked results for one utterance
//! - [`Domain`] - A persistent partition of entities and definitions
//! - [`EngineSnapshot`] - Plain-data copy of the registry for persistence
//! - [`EngineStats`] - Counters exposing how much work queries performed

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod domain;
pub mod engine;
pub mod snapshot;
pub mod stats;
pub mod stream;

pub use domain::{DEFAULT_DOMAIN, Domain};
pub use engine::IntentEngine;
pub use snapshot::{DomainSnapshot, EngineSnapshot, EntityRecord};
pub use stats::{EngineStats, StatsSnapshot};
pub use stream::IntentStream;
