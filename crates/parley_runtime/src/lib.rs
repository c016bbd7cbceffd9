//! REPL, CLI, and snapshot persistence for Parley.
//!
//! This crate provides:
//! - [`Repl`] - Interactive read-eval-print loop over an [`IntentEngine`](parley_engine::IntentEngine)
//! - [`Command`] - The `:`-prefixed command language shared by the REPL and scripts
//! - Engine snapshot serialization and deserialization

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod command;
pub mod editor;
mod highlight;
pub mod repl;
pub mod serialize;
pub mod session;

pub use command::Command;
pub use editor::{LineEditor, ReadResult, RustylineEditor};
pub use repl::{Repl, Response};
pub use serialize::{from_bytes, load_from_file, save_to_file, to_bytes};
pub use session::Session;
