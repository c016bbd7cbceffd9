//! Parley - Intent recognition
//!
//! This crate re-exports all layers of the Parley system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 5: parley_runtime    — REPL, CLI, snapshot persistence
//! Layer 4: parley_engine     — Domains, registry, lazy ranked intent stream
//! Layer 3: parley_intent     — Intent definitions, scoring, results
//! Layer 2: parley_tagger     — Entity lattice, best-first tagging resolver
//! Layer 1: parley_lexicon    — Entity trie with fuzzy lookup, regex entities
//! Layer 0: parley_foundation — Tokens, tags, config, errors
//! ```

pub use parley_engine as engine;
pub use parley_foundation as foundation;
pub use parley_intent as intent;
pub use parley_lexicon as lexicon;
pub use parley_runtime as runtime;
pub use parley_tagger as tagger;
