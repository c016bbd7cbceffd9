//! Intent definitions and scoring for Parley.
//!
//! This crate provides:
//! - [`IntentDefinition`] and [`IntentBuilder`] - What an intent needs to match
//! - [`IntentScorer`] - Binds a tagging's entities to a definition's slots
//! - [`IntentResult`] - A ranked interpretation with its slots and remainder

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod definition;
pub mod result;
pub mod scoring;

pub use definition::{IntentBuilder, IntentDefinition, SlotRequirement};
pub use result::{IntentMatch, IntentResult, Slot};
pub use scoring::IntentScorer;
