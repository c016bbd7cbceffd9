//! Entity tagging and disambiguation for Parley.
//!
//! This crate provides:
//! - [`EntityTagger`] - Builds a [`Lattice`] of overlapping entity candidates
//! - [`TaggingResolver`] - Lazily yields non-overlapping [`Tagging`]s, best first

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod resolver;
pub mod tagger;

pub use resolver::{SPAN_PREFERENCE, Tagging, TaggingResolver};
pub use tagger::{EntityTagger, Lattice};
