//! Build configuration stored as JSON next to the project.

use std::{
    fs, io,
    path::{Path, PathBuf},
};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokens::{CollectionKind, EmitOptions, ScopeRules, ScopeTarget};

/// Default configuration file name, relative to the working directory.
pub const CONFIG_FILE: &str = "tokens.config.json";

/// Environment variable holding a comma-separated collection filter.
pub const COLLECTIONS_ENV: &str = "TOKENS_COLLECTIONS";

/// Settings for one pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildConfig {
    /// Figma variables export to read.
    pub input: PathBuf,
    /// Directory receiving the generated files.
    pub out_dir: PathBuf,
    /// Case-insensitive substrings selecting collections; `None` auto-detects
    /// one core and one theme collection.
    pub collections: Option<Vec<String>>,
    /// Only emit mode overrides that differ from the default mode.
    pub diff_against_default: bool,
    /// Keep `var()` references in theme-like CSS.
    pub prefer_alias: bool,
    /// Unit appended to numeric `FLOAT` values in CSS.
    pub float_unit: Option<String>,
    /// Write `theme.{mode}.json` for the theme collection.
    pub emit_theme: bool,
    /// Skip the build when the input digest is unchanged.
    pub skip_unchanged: bool,
    /// Per-mode scope overrides, keyed by mode name.
    pub scopes: IndexMap<String, ScopeTarget>,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("tokens/figma-variables.json"),
            out_dir: PathBuf::from("build/tokens"),
            collections: None,
            diff_against_default: true,
            prefer_alias: true,
            float_unit: None,
            emit_theme: true,
            skip_unchanged: true,
            scopes: IndexMap::new(),
        }
    }
}

impl BuildConfig {
    /// Applies the collection filter from [`COLLECTIONS_ENV`], if set.
    pub fn apply_env(&mut self) {
        if let Ok(value) = std::env::var(COLLECTIONS_ENV) {
            if let Some(filter) = parse_collection_filter(&value) {
                self.collections = Some(filter);
            }
        }
    }

    /// Scope rules with this config's overrides applied.
    #[must_use]
    pub fn scope_rules(&self) -> ScopeRules {
        ScopeRules::with_overrides(
            self.scopes
                .iter()
                .map(|(mode, target)| (mode.as_str(), target.clone())),
        )
    }

    /// Emitter options for a collection of the given kind.
    #[must_use]
    pub fn emit_options(&self, kind: CollectionKind) -> EmitOptions {
        EmitOptions {
            diff_against_default: self.diff_against_default,
            prefer_alias: self.prefer_alias && kind == CollectionKind::Theme,
            float_unit: self.float_unit.clone(),
        }
    }
}

/// Splits `"core, Theme"` into lowercase filter terms.
///
/// Returns `None` when no non-empty term remains.
#[must_use]
pub fn parse_collection_filter(value: &str) -> Option<Vec<String>> {
    let terms: Vec<String> = value
        .split(',')
        .map(str::trim)
        .filter(|term| !term.is_empty())
        .map(str::to_lowercase)
        .collect();
    (!terms.is_empty()).then_some(terms)
}

/// Failure to read or write `tokens.config.json`.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("config file io: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not a valid [`BuildConfig`].
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}

/// Location of the [`BuildConfig`] file for a project.
#[derive(Debug, Clone)]
pub struct ConfigStore {
    path: PathBuf,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(PathBuf::from(CONFIG_FILE))
    }
}

impl ConfigStore {
    /// Store backed by the file at `path`.
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Reads the settings; a missing file yields [`BuildConfig::default`] and
    /// absent keys keep their defaults.
    pub fn load(&self) -> Result<BuildConfig, ConfigError> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Ok(BuildConfig::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }

    /// Writes `config` as pretty JSON, creating parent directories.
    pub fn save(&self, config: &BuildConfig) -> Result<(), ConfigError> {
        if let Some(parent) = self.path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        let mut json = serde_json::to_string_pretty(config)?;
        json.push('\n');
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Path of the settings file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
