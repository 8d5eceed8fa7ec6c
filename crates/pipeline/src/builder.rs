//! Runs the flatten → resolve → emit chain over the selected collections and
//! writes the results.

use std::{
    fs,
    path::{Path, PathBuf},
};

use tokens::{
    assemble_theme, emit_css, flat_json, flatten, mui_flat, naming, plan_scopes,
    render_css_file, resolve_internal_aliases, variable_css_names, CollectionKind, FlatMap,
    MuiFlat, RawExport, ResolverMap, ThemeOptions, TokenContext,
};
use tracing::{debug, info};

use crate::config::BuildConfig;
use crate::digest::{build_digest, DigestStore};
use crate::source::{parse_export, read_input, select_collections};
use crate::PipelineError;

/// Name of the stylesheet that concatenates every built collection.
pub const AGGREGATE_CSS: &str = "tokens.css";

/// Everything produced for one collection.
#[derive(Debug, Clone)]
pub struct BuiltCollection {
    /// Display name of the collection.
    pub name: String,
    /// File stem used for its outputs.
    pub slug: String,
    /// Primitive or theme-like.
    pub kind: CollectionKind,
    /// Name of the default mode.
    pub default_mode: String,
    /// Mode names in declared order.
    pub modes: Vec<String>,
    /// Flat tokens; literals only for primitive collections.
    pub flat: FlatMap,
    /// Stylesheet including the generated banner.
    pub css: String,
    /// Dot-notation map with every value resolved.
    pub mui_flat: MuiFlat,
}

/// In-memory result of a build.
#[derive(Debug, Clone)]
pub struct BuildOutput {
    /// Collections in build order.
    pub collections: Vec<BuiltCollection>,
    /// Assembled theme per mode of the theme collection.
    pub themes: Vec<(String, ThemeOptions)>,
}

impl BuildOutput {
    /// Concatenation of every collection's stylesheet in build order.
    #[must_use]
    pub fn aggregate_css(&self) -> String {
        self.collections
            .iter()
            .map(|collection| collection.css.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Summary of a [`run`].
#[derive(Debug, Clone, Default)]
pub struct BuildReport {
    /// `true` when input and settings were unchanged and nothing was written.
    pub skipped: bool,
    /// SHA-256 of the input export and the build settings.
    pub digest: String,
    /// Files written, in write order.
    pub written: Vec<PathBuf>,
}

/// Builds every selected collection without touching the filesystem.
pub fn build(export: &RawExport, config: &BuildConfig) -> Result<BuildOutput, PipelineError> {
    let selected = select_collections(export, config.collections.as_deref())?;
    let names = variable_css_names(export);
    let rules = config.scope_rules();

    let mut flats = Vec::with_capacity(selected.len());
    for entry in &selected {
        let mut flat = flatten(entry.collection, &export.meta.variables, &names);
        if entry.kind == CollectionKind::Primitive {
            resolve_internal_aliases(&mut flat, entry.collection).map_err(|source| {
                PipelineError::Resolve {
                    collection: entry.collection.name.clone(),
                    source,
                }
            })?;
        }
        flats.push(flat);
    }

    let resolver: ResolverMap = flats.iter().collect();
    debug!(tokens = resolver.len(), "assembled resolver map");

    let mut collections = Vec::with_capacity(selected.len());
    for (entry, flat) in selected.iter().zip(flats) {
        let collection = entry.collection;
        let plan = plan_scopes(collection, entry.kind, &rules);
        let body = emit_css(&flat, &plan, &resolver, &config.emit_options(entry.kind));
        let mui_flat = mui_flat(&flat, &resolver, &plan.default_mode);

        info!(
            collection = %collection.name,
            kind = entry.kind.as_str(),
            tokens = flat.len(),
            modes = collection.modes.len(),
            "built collection"
        );

        collections.push(BuiltCollection {
            name: collection.name.clone(),
            slug: naming::collection_slug(&collection.name),
            kind: entry.kind,
            default_mode: plan.default_mode,
            modes: collection.modes.iter().map(|mode| mode.name.clone()).collect(),
            css: render_css_file(&collection.name, &body),
            mui_flat,
            flat,
        });
    }

    let themes = if config.emit_theme {
        assemble_themes(&collections)
    } else {
        Vec::new()
    };

    Ok(BuildOutput {
        collections,
        themes,
    })
}

fn assemble_themes(collections: &[BuiltCollection]) -> Vec<(String, ThemeOptions)> {
    let Some(theme) = collections
        .iter()
        .find(|collection| collection.kind == CollectionKind::Theme)
    else {
        return Vec::new();
    };

    let mut context = TokenContext::new(theme.default_mode.clone());
    for collection in collections {
        context.extend(collection.mui_flat.clone());
    }

    theme
        .modes
        .iter()
        .map(|mode| {
            let selected = context.set_mode(mode).to_owned();
            (selected, assemble_theme(&mut context))
        })
        .collect()
}

/// Writes every output file of `output` into `out_dir`.
pub fn write_outputs(output: &BuildOutput, out_dir: &Path) -> Result<Vec<PathBuf>, PipelineError> {
    fs::create_dir_all(out_dir).map_err(|source| PipelineError::Io {
        path: out_dir.to_path_buf(),
        source,
    })?;

    let mut written = Vec::new();
    for collection in &output.collections {
        let slug = &collection.slug;
        write_file(out_dir, &format!("{slug}.json"), &flat_json(&collection.flat)?, &mut written)?;
        write_file(out_dir, &format!("{slug}.css"), &collection.css, &mut written)?;
        write_file(
            out_dir,
            &format!("{slug}.mui-flat.json"),
            &serde_json::to_string_pretty(&collection.mui_flat)?,
            &mut written,
        )?;
    }

    write_file(out_dir, AGGREGATE_CSS, &output.aggregate_css(), &mut written)?;

    for (mode, theme) in &output.themes {
        let stem = naming::kebab(mode).replace('/', "-");
        write_file(
            out_dir,
            &format!("theme.{stem}.json"),
            &serde_json::to_string_pretty(theme)?,
            &mut written,
        )?;
    }

    Ok(written)
}

fn write_file(
    out_dir: &Path,
    file_name: &str,
    contents: &str,
    written: &mut Vec<PathBuf>,
) -> Result<(), PipelineError> {
    let path = out_dir.join(file_name);
    fs::write(&path, contents).map_err(|source| PipelineError::Io {
        path: path.clone(),
        source,
    })?;
    debug!(path = %path.display(), bytes = contents.len(), "wrote output");
    written.push(path);
    Ok(())
}

/// Reads the configured input, builds it and writes the outputs.
///
/// The digest covers the export and `config`, so changed settings always
/// rebuild. When `skip_unchanged` is set and `force` is not, a digest that
/// matches the previous run's skips the build as long as the aggregate
/// stylesheet still exists.
pub fn run(config: &BuildConfig, force: bool) -> Result<BuildReport, PipelineError> {
    let bytes = read_input(&config.input)?;
    let digest = build_digest(&bytes, &serde_json::to_vec(config)?);
    let store = DigestStore::in_dir(&config.out_dir);

    if config.skip_unchanged
        && !force
        && store.matches(&digest)
        && config.out_dir.join(AGGREGATE_CSS).exists()
    {
        info!(input = %config.input.display(), "input and settings unchanged; skipping build");
        return Ok(BuildReport {
            skipped: true,
            digest,
            written: Vec::new(),
        });
    }

    let export = parse_export(&config.input, &bytes)?;
    let output = build(&export, config)?;
    let written = write_outputs(&output, &config.out_dir)?;
    store.save(&digest).map_err(|source| PipelineError::Io {
        path: config.out_dir.clone(),
        source,
    })?;

    info!(
        files = written.len(),
        out_dir = %config.out_dir.display(),
        "token build finished"
    );
    Ok(BuildReport {
        skipped: false,
        digest,
        written,
    })
}
