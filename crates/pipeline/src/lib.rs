#![doc = include_str!("../README.md")]
#![warn(clippy::pedantic, missing_docs, unreachable_pub)]

use std::{io, path::PathBuf};

use thiserror::Error;
use tokens::ResolveError;

pub mod builder;
pub mod config;
pub mod digest;
pub mod source;

pub use builder::{build, run, write_outputs, BuildOutput, BuildReport, BuiltCollection};
pub use config::{BuildConfig, ConfigError, ConfigStore};
pub use digest::DigestStore;
pub use source::{load_export, select_collections, SelectedCollection};

/// Errors that abort a token build.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The export file does not exist.
    #[error("input file {} not found", .0.display())]
    MissingInput(PathBuf),
    /// Reading or writing a file failed.
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// File or directory involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },
    /// The export is not valid JSON of the expected shape.
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        /// Export that failed to parse.
        path: PathBuf,
        /// Underlying error.
        source: serde_json::Error,
    },
    /// An output could not be serialized.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// Auto-detection found no collection of the named role.
    #[error("no {0} collection found in export")]
    CollectionNotFound(&'static str),
    /// The collection filter matched nothing.
    #[error("no collections matched filter `{0}`")]
    NoCollectionsMatched(String),
    /// Alias resolution failed inside a primitive collection.
    #[error("collection `{collection}`: {source}")]
    Resolve {
        /// Collection being resolved.
        collection: String,
        /// Underlying error.
        source: ResolveError,
    },
}
