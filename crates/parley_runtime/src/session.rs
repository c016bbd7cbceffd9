//! Session state for the REPL.
//!
//! The session owns the engine, the domain that registration commands
//! target, and how many results an utterance prints.

use std::path::Path;
use std::sync::Arc;

use parley_engine::{DEFAULT_DOMAIN, IntentEngine};
use parley_foundation::{EnglishTokenizer, Result};

use crate::serialize;

/// Default number of results printed per utterance.
pub const DEFAULT_TOP: usize = 3;

/// Session state for an interactive REPL session.
#[derive(Debug)]
pub struct Session {
    /// The engine all commands act on.
    engine: IntentEngine,

    /// Domain targeted by registration commands.
    domain: String,

    /// Results printed per utterance.
    top: usize,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Creates a session over an empty engine.
    #[must_use]
    pub fn new() -> Self {
        Self::with_engine(IntentEngine::new())
    }

    /// Creates a session over an existing engine.
    #[must_use]
    pub fn with_engine(engine: IntentEngine) -> Self {
        Self {
            engine,
            domain: DEFAULT_DOMAIN.to_string(),
            top: DEFAULT_TOP,
        }
    }

    /// Returns the engine.
    #[must_use]
    pub const fn engine(&self) -> &IntentEngine {
        &self.engine
    }

    /// Returns the current domain.
    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Switches the current domain, creating it if needed.
    pub fn use_domain(&mut self, name: &str) {
        self.engine.register_domain(name);
        self.domain = name.to_string();
    }

    /// Returns how many results an utterance prints.
    #[must_use]
    pub const fn top(&self) -> usize {
        self.top
    }

    /// Sets how many results an utterance prints.
    pub fn set_top(&mut self, top: usize) {
        self.top = top;
    }

    /// Writes the engine's snapshot to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        serialize::save_to_file(&self.engine.snapshot(), path)
    }

    /// Replaces the engine with one restored from `path`.
    ///
    /// Falls back to the default domain if the current one is not in the
    /// snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the snapshot fails
    /// validation. The session is unchanged on error.
    pub fn load(&mut self, path: &Path) -> Result<()> {
        let snapshot = serialize::load_from_file(path)?;
        self.engine = IntentEngine::from_snapshot(&snapshot, Arc::new(EnglishTokenizer))?;
        if !self.engine.has_domain(&self.domain) {
            self.domain = DEFAULT_DOMAIN.to_string();
        }
        Ok(())
    }

    /// Called after `name` was dropped, so the session never targets a
    /// missing domain.
    pub(crate) fn forget_domain(&mut self, name: &str) {
        if self.domain == name {
            self.domain = DEFAULT_DOMAIN.to_string();
        }
    }
}
