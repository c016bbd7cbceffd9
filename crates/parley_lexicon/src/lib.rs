//! Entity lookup structures for Parley.
//!
//! This crate provides:
//! - [`EntityIndex`] - Persistent character trie with exact and fuzzy lookup
//! - [`RegexRegistry`] - Regex entities defined by named capture groups

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod pattern;
pub mod trie;

pub use pattern::{RegexEntity, RegexRegistry};
pub use trie::{EntityIndex, FuzzyHit, IndexEntry, normalize_key};
