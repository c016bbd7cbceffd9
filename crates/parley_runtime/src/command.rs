//! The REPL command language.
//!
//! Lines starting with `:` are commands; `#` starts a comment line; anything
//! else is an utterance to interpret. Scripts passed to the binary use the
//! same syntax, one command per line.
//!
//! Intent definitions are written as sections:
//!
//! ```text
//! :intent Route require to:Place optional Time one-of Car Bus exclude Cancel
//! ```
//!
//! `slot:Type` binds a required or optional entity under a slot name other
//! than its type. Each `one-of` section is a separate group.

use std::path::PathBuf;

use parley_foundation::{Error, Result};
use parley_intent::{IntentBuilder, IntentDefinition};

/// One parsed REPL line.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// `:domain NAME`
    Domain(String),
    /// `:use NAME`
    Use(String),
    /// `:entity TYPE SURFACE...`
    Entity {
        /// Entity type.
        entity_type: String,
        /// Surface form, possibly several words.
        surface: String,
    },
    /// `:alias TYPE CANONICAL SURFACE...`
    Alias {
        /// Entity type.
        entity_type: String,
        /// Value reported when the alias matches.
        canonical: String,
        /// Surface form, possibly several words.
        surface: String,
    },
    /// `:regex PATTERN`
    Regex(String),
    /// `:intent NAME SECTIONS...`
    Intent(IntentDefinition),
    /// `:drop-intent NAME...`
    DropIntent(Vec<String>),
    /// `:drop-entity TYPE`
    DropEntity(String),
    /// `:drop-regex TYPE`
    DropRegex(String),
    /// `:drop-domain NAME`
    DropDomain(String),
    /// `:domains`
    Domains,
    /// `:intents`
    Intents,
    /// `:entities`
    Entities,
    /// `:top N`
    Top(usize),
    /// `:save PATH`
    Save(PathBuf),
    /// `:load PATH`
    Load(PathBuf),
    /// `:stats`
    Stats,
    /// `:help`
    Help,
    /// `:quit`
    Quit,
    /// Anything that is not a command.
    Utterance(String),
}

/// Every command word, for completion and help.
pub const COMMAND_NAMES: &[&str] = &[
    ":domain",
    ":use",
    ":entity",
    ":alias",
    ":regex",
    ":intent",
    ":drop-intent",
    ":drop-entity",
    ":drop-regex",
    ":drop-domain",
    ":domains",
    ":intents",
    ":entities",
    ":top",
    ":save",
    ":load",
    ":stats",
    ":help",
    ":quit",
];

/// Section keywords inside `:intent`.
pub const INTENT_SECTIONS: &[&str] = &["require", "optional", "one-of", "exclude"];

#[derive(Clone, Copy)]
enum Section {
    Require,
    Optional,
    OneOf,
    Exclude,
}

impl Command {
    /// Parses one line.
    ///
    /// Returns `None` for blank and comment lines.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown command, missing arguments,
    /// or a malformed intent definition.
    pub fn parse(line: &str) -> Result<Option<Self>> {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return Ok(None);
        }
        if !line.starts_with(':') {
            return Ok(Some(Self::Utterance(line.to_string())));
        }

        let (name, rest) = match line.split_once(char::is_whitespace) {
            Some((name, rest)) => (name, rest.trim()),
            None => (line, ""),
        };
        let words: Vec<&str> = rest.split_whitespace().collect();

        let command = match name {
            ":domain" => Self::Domain(single(name, &words)?),
            ":use" => Self::Use(single(name, &words)?),
            ":entity" => {
                let [entity_type, surface @ ..] = words.as_slice() else {
                    return Err(usage(name, "TYPE SURFACE..."));
                };
                if surface.is_empty() {
                    return Err(usage(name, "TYPE SURFACE..."));
                }
                Self::Entity {
                    entity_type: (*entity_type).to_string(),
                    surface: surface.join(" "),
                }
            }
            ":alias" => {
                let [entity_type, canonical, surface @ ..] = words.as_slice() else {
                    return Err(usage(name, "TYPE CANONICAL SURFACE..."));
                };
                if surface.is_empty() {
                    return Err(usage(name, "TYPE CANONICAL SURFACE..."));
                }
                Self::Alias {
                    entity_type: (*entity_type).to_string(),
                    canonical: (*canonical).to_string(),
                    surface: surface.join(" "),
                }
            }
            ":regex" => {
                if rest.is_empty() {
                    return Err(usage(name, "PATTERN"));
                }
                Self::Regex(rest.to_string())
            }
            ":intent" => Self::Intent(parse_intent(&words)?),
            ":drop-intent" => {
                if words.is_empty() {
                    return Err(usage(name, "NAME..."));
                }
                Self::DropIntent(words.iter().map(ToString::to_string).collect())
            }
            ":drop-entity" => Self::DropEntity(single(name, &words)?),
            ":drop-regex" => Self::DropRegex(single(name, &words)?),
            ":drop-domain" => Self::DropDomain(single(name, &words)?),
            ":domains" => Self::Domains,
            ":intents" => Self::Intents,
            ":entities" => Self::Entities,
            ":top" => {
                let raw = single(name, &words)?;
                let count = raw
                    .parse()
                    .map_err(|_| Error::invalid_argument(format!("invalid result count: {raw}")))?;
                Self::Top(count)
            }
            ":save" => Self::Save(path(name, rest)?),
            ":load" => Self::Load(path(name, rest)?),
            ":stats" => Self::Stats,
            ":help" | ":h" => Self::Help,
            ":quit" | ":q" | ":exit" => Self::Quit,
            other => {
                return Err(Error::invalid_argument(format!(
                    "unknown command: {other} (try :help)"
                )));
            }
        };
        Ok(Some(command))
    }
}

fn usage(name: &str, arguments: &str) -> Error {
    Error::invalid_argument(format!("usage: {name} {arguments}"))
}

fn single(name: &str, words: &[&str]) -> Result<String> {
    match words {
        [word] => Ok((*word).to_string()),
        _ => Err(usage(name, "NAME")),
    }
}

fn path(name: &str, rest: &str) -> Result<PathBuf> {
    if rest.is_empty() {
        return Err(usage(name, "PATH"));
    }
    Ok(PathBuf::from(rest))
}

fn parse_intent(words: &[&str]) -> Result<IntentDefinition> {
    let [name, items @ ..] = words else {
        return Err(usage(
            ":intent",
            "NAME [require T..] [optional T..] [one-of T..] [exclude T..]",
        ));
    };

    let mut builder = IntentBuilder::new(*name);
    let mut section = None;
    // Open `one-of` section, pushed even when empty so validation sees it
    let mut group: Option<Vec<String>> = None;

    for &item in items {
        let next = match item {
            "require" => Some(Section::Require),
            "optional" => Some(Section::Optional),
            "one-of" => Some(Section::OneOf),
            "exclude" => Some(Section::Exclude),
            _ => None,
        };
        if let Some(next) = next {
            if let Some(members) = group.take() {
                builder = builder.one_of(members);
            }
            if matches!(next, Section::OneOf) {
                group = Some(Vec::new());
            }
            section = Some(next);
            continue;
        }

        match section {
            None => {
                return Err(Error::invalid_argument(format!(
                    "expected one of {} before '{item}'",
                    INTENT_SECTIONS.join(", ")
                )));
            }
            Some(Section::Require) => {
                builder = match item.split_once(':') {
                    Some((slot, entity_type)) => builder.require_as(entity_type, slot),
                    None => builder.require(item),
                };
            }
            Some(Section::Optional) => {
                builder = match item.split_once(':') {
                    Some((slot, entity_type)) => builder.optionally_as(entity_type, slot),
                    None => builder.optionally(item),
                };
            }
            Some(Section::OneOf) => group.get_or_insert_with(Vec::new).push(item.to_string()),
            Some(Section::Exclude) => builder = builder.exclude(item),
        }
    }
    if let Some(members) = group {
        builder = builder.one_of(members);
    }

    builder.build()
}
