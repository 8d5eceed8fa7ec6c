//! Reads the export and picks the collections that take part in a build.

use std::{fs, io, path::Path};

use tokens::{Collection, CollectionKind, RawExport};
use tracing::{debug, info};

use crate::PipelineError;

/// A collection chosen for the build, with the role it plays.
#[derive(Debug, Clone, Copy)]
pub struct SelectedCollection<'a> {
    /// The collection itself.
    pub collection: &'a Collection,
    /// Primitive or theme-like.
    pub kind: CollectionKind,
}

/// Reads the raw bytes of the export file.
pub fn read_input(path: &Path) -> Result<Vec<u8>, PipelineError> {
    fs::read(path).map_err(|source| match source.kind() {
        io::ErrorKind::NotFound => PipelineError::MissingInput(path.to_path_buf()),
        _ => PipelineError::Io {
            path: path.to_path_buf(),
            source,
        },
    })
}

/// Parses export bytes read from `path`.
pub fn parse_export(path: &Path, bytes: &[u8]) -> Result<RawExport, PipelineError> {
    let export: RawExport =
        serde_json::from_slice(bytes).map_err(|source| PipelineError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    debug!(
        collections = export.meta.variable_collections.len(),
        variables = export.meta.variables.len(),
        "parsed export"
    );
    Ok(export)
}

/// Reads and parses the export at `path`.
pub fn load_export(path: &Path) -> Result<RawExport, PipelineError> {
    let bytes = read_input(path)?;
    parse_export(path, &bytes)
}

/// Selects the collections to build, in document order.
///
/// With a filter, every collection whose name contains one of the
/// (case-insensitive) terms is built and classified by name. Without one,
/// exactly one core-like and one theme-like collection are required.
pub fn select_collections<'a>(
    export: &'a RawExport,
    filter: Option<&[String]>,
) -> Result<Vec<SelectedCollection<'a>>, PipelineError> {
    match filter {
        Some(terms) if !terms.is_empty() => {
            let terms: Vec<String> = terms.iter().map(|term| term.to_lowercase()).collect();
            let selected: Vec<_> = export
                .collections()
                .filter(|collection| {
                    let name = collection.name.to_lowercase();
                    terms.iter().any(|term| name.contains(term.as_str()))
                })
                .map(|collection| SelectedCollection {
                    collection,
                    kind: CollectionKind::detect(&collection.name),
                })
                .collect();
            if selected.is_empty() {
                return Err(PipelineError::NoCollectionsMatched(terms.join(",")));
            }
            info!(count = selected.len(), filter = %terms.join(","), "selected collections");
            Ok(selected)
        }
        _ => auto_detect(export),
    }
}

fn auto_detect(export: &RawExport) -> Result<Vec<SelectedCollection<'_>>, PipelineError> {
    let core = export
        .collections()
        .find(|collection| collection.name.to_lowercase().contains("core"))
        .ok_or(PipelineError::CollectionNotFound("core"))?;
    let theme = export
        .collections()
        .filter(|collection| collection.id != core.id)
        .find(|collection| CollectionKind::detect(&collection.name) == CollectionKind::Theme)
        .ok_or(PipelineError::CollectionNotFound("theme"))?;

    info!(core = %core.name, theme = %theme.name, "auto-detected collections");
    Ok(vec![
        SelectedCollection {
            collection: core,
            kind: CollectionKind::Primitive,
        },
        SelectedCollection {
            collection: theme,
            kind: CollectionKind::Theme,
        },
    ])
}
