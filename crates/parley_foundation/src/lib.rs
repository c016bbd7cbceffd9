//! Core types, tokenization, errors, and configuration for Parley.
//!
//! This crate provides:
//! - [`Token`] and [`Utterance`] - Tokenized text with character offsets
//! - [`Tokenizer`] - Pluggable tokenization, with [`EnglishTokenizer`] as default
//! - [`EntityTag`] - A candidate entity span found in an utterance
//! - [`EngineConfig`] - Search bounds and scoring weights
//! - [`Error`] - Rich error types with context

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod error;
pub mod tag;
pub mod token;
pub mod tokenizer;

pub use config::EngineConfig;
pub use error::{Error, ErrorContext, ErrorKind, Result};
pub use tag::{EntityTag, TagSource};
pub use token::{Token, Utterance};
pub use tokenizer::{EnglishTokenizer, Tokenizer};
