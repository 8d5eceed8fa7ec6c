//! Mode-aware token lookups over dot-notation maps.
//!
//! [`TokenContext`] owns the selected mode together with its memoized
//! lookups. Every mode switch clears those caches before the next read.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use crate::json::MuiFlat;

const MODE_SEPARATOR: &str = ".valuesByMode.";

/// A semantic slot and the token names that may fill it, in priority order.
///
/// A candidate matches a token named exactly like it or ending in
/// `-{candidate}`, so `primary-main` finds `lighthouse-theme-primary-main`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPath<'a> {
    /// Slot name used in diagnostics, e.g. `palette.primary.main`.
    pub slot: &'a str,
    /// Candidate token names.
    pub candidates: &'a [&'a str],
}

impl<'a> TokenPath<'a> {
    /// Creates a path for `slot`.
    #[must_use]
    pub const fn new(slot: &'a str, candidates: &'a [&'a str]) -> Self {
        Self { slot, candidates }
    }
}

/// Error returned when no candidate of a [`TokenPath`] has a value.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// None of the candidates matched a token with a value.
    #[error("no token for `{slot}` (tried {})", .tried.join(", "))]
    NotFound {
        /// Slot that was requested.
        slot: String,
        /// Candidates that were tried.
        tried: Vec<String>,
    },
}

/// Capability to resolve semantic slots to token values.
pub trait TokenSource {
    /// Resolves `path` in the currently selected mode.
    fn lookup(&mut self, path: &TokenPath<'_>) -> Result<String, LookupError>;

    /// Name of the currently selected mode.
    fn mode(&self) -> &str;
}

/// Explicit lookup context replacing a process-wide "current mode".
#[derive(Debug, Clone, Default)]
pub struct TokenContext {
    values: MuiFlat,
    modes: Vec<String>,
    default_mode: String,
    mode: String,
    resolved: HashMap<String, Option<String>>,
    prefix_scans: HashMap<String, Vec<String>>,
    candidate_matches: HashMap<String, Option<String>>,
}

impl TokenContext {
    /// Creates an empty context whose default mode is `default_mode`.
    #[must_use]
    pub fn new(default_mode: impl Into<String>) -> Self {
        let default_mode = default_mode.into();
        Self {
            mode: default_mode.clone(),
            modes: vec![default_mode.clone()],
            default_mode,
            ..Self::default()
        }
    }

    /// Adds the entries of a dot-notation map and learns its modes.
    pub fn extend(&mut self, values: MuiFlat) {
        for key in values.keys() {
            if let Some((_, mode)) = key.rsplit_once(MODE_SEPARATOR) {
                if !self.modes.iter().any(|known| known == mode) {
                    self.modes.push(mode.to_owned());
                }
            }
        }
        self.values.extend(values);
        self.invalidate();
    }

    /// Builder form of [`TokenContext::extend`].
    #[must_use]
    pub fn with_values(mut self, values: MuiFlat) -> Self {
        self.extend(values);
        self
    }

    /// Modes seen so far, default mode first.
    #[must_use]
    pub fn modes(&self) -> &[String] {
        &self.modes
    }

    /// The mode used when a requested mode is unknown.
    #[must_use]
    pub fn default_mode(&self) -> &str {
        &self.default_mode
    }

    /// Selects `mode`, matching case-insensitively.
    ///
    /// Unknown modes fall back to the default mode with a warning. Caches are
    /// cleared either way. Returns the mode actually selected.
    pub fn set_mode(&mut self, mode: &str) -> &str {
        let selected = self
            .modes
            .iter()
            .find(|known| known.eq_ignore_ascii_case(mode))
            .cloned()
            .unwrap_or_else(|| {
                warn!(
                    requested = %mode,
                    fallback = %self.default_mode,
                    "unknown token mode; using default"
                );
                self.default_mode.clone()
            });
        self.mode = selected;
        self.invalidate();
        &self.mode
    }

    /// Drops every memoized lookup.
    pub fn invalidate(&mut self) {
        self.resolved.clear();
        self.prefix_scans.clear();
        self.candidate_matches.clear();
    }

    /// Value of `name` in the selected mode, then the default mode, then any
    /// mode. Empty values count as missing.
    pub fn get(&mut self, name: &str) -> Option<String> {
        if let Some(cached) = self.resolved.get(name) {
            return cached.clone();
        }

        let value = self
            .mode_value(name, &self.mode)
            .or_else(|| self.mode_value(name, &self.default_mode))
            .or_else(|| {
                let prefix = format!("{name}{MODE_SEPARATOR}");
                self.values
                    .range(prefix.clone()..)
                    .take_while(|(key, _)| key.starts_with(&prefix))
                    .map(|(_, value)| value)
                    .find(|value| !value.is_empty())
                    .cloned()
            });

        self.resolved.insert(name.to_owned(), value.clone());
        value
    }

    fn mode_value(&self, name: &str, mode: &str) -> Option<String> {
        self.values
            .get(&format!("{name}{MODE_SEPARATOR}{mode}"))
            .filter(|value| !value.is_empty())
            .cloned()
    }

    /// Distinct token names starting with `prefix`, in name order.
    pub fn names_with_prefix(&mut self, prefix: &str) -> Vec<String> {
        if let Some(cached) = self.prefix_scans.get(prefix) {
            return cached.clone();
        }

        let mut names: Vec<String> = Vec::new();
        for key in self
            .values
            .range(prefix.to_owned()..)
            .map(|(key, _)| key)
            .take_while(|key| key.starts_with(prefix))
        {
            let name = key.rsplit_once(MODE_SEPARATOR).map_or(key.as_str(), |(name, _)| name);
            if names.last().map(String::as_str) != Some(name) {
                names.push(name.to_owned());
            }
        }

        self.prefix_scans.insert(prefix.to_owned(), names.clone());
        names
    }

    /// Token name matching `candidate` exactly or by `-{candidate}` suffix.
    ///
    /// Among suffix matches the one with the fewest segments before the
    /// candidate wins, so `primary-main` picks `theme-primary-main` over
    /// `theme-button-primary-main`. Ties go to the first name in order.
    pub fn find(&mut self, candidate: &str) -> Option<String> {
        if let Some(cached) = self.candidate_matches.get(candidate) {
            return cached.clone();
        }

        let suffix = format!("-{candidate}");
        let found = self
            .names_with_prefix("")
            .into_iter()
            .filter(|name| name == candidate || name.ends_with(&suffix))
            .min_by_key(|name| name.matches('-').count());

        self.candidate_matches.insert(candidate.to_owned(), found.clone());
        found
    }
}

impl TokenSource for TokenContext {
    fn lookup(&mut self, path: &TokenPath<'_>) -> Result<String, LookupError> {
        for candidate in path.candidates {
            if let Some(value) = self.find(candidate).and_then(|name| self.get(&name)) {
                return Ok(value);
            }
        }
        debug!(slot = %path.slot, "no candidate token found");
        Err(LookupError::NotFound {
            slot: path.slot.to_owned(),
            tried: path.candidates.iter().map(|c| (*c).to_owned()).collect(),
        })
    }

    fn mode(&self) -> &str {
        &self.mode
    }
}
