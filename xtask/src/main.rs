use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use pipeline::{
    build, config::parse_collection_filter, load_export, run, select_collections, BuildConfig,
    ConfigStore,
};
use tokens::{naming, resolve_final_value, ResolverMap};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() {
    let xtask = Xtask::parse();
    init_tracing(xtask.verbose);
    if let Err(err) = xtask.run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

#[derive(Debug, Parser)]
#[command(
    name = "xtask",
    about = "Builds CSS, JSON and MUI themes from a Figma variables export",
    version
)]
struct Xtask {
    /// Increase log verbosity (`-v` debug, `-vv` trace). `RUST_LOG` wins.
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
    /// Configuration file to read.
    #[arg(long, global = true, default_value = pipeline::config::CONFIG_FILE)]
    config: PathBuf,
    #[command(flatten)]
    overrides: Overrides,
    #[command(subcommand)]
    command: XtaskCommand,
}

/// Flags layered over the configuration file.
#[derive(Debug, clap::Args)]
struct Overrides {
    /// Figma variables export to read.
    #[arg(long, global = true)]
    input: Option<PathBuf>,
    /// Comma-separated collection name filter, e.g. `core,theme`.
    #[arg(long, global = true)]
    collections: Option<String>,
}

#[derive(Debug, Subcommand)]
enum XtaskCommand {
    /// Build every output into the output directory.
    Build {
        /// Directory receiving the generated files.
        #[arg(long)]
        out_dir: Option<PathBuf>,
        /// Emit every mode value, even when equal to the default mode.
        #[arg(long)]
        no_diff: bool,
        /// Resolve `var()` references in theme CSS instead of keeping them.
        #[arg(long)]
        literal: bool,
        /// Unit appended to numeric FLOAT values, e.g. `px`.
        #[arg(long)]
        float_unit: Option<String>,
        /// Skip `theme.{mode}.json`.
        #[arg(long)]
        no_theme: bool,
        /// Rebuild even when the input is unchanged.
        #[arg(long)]
        force: bool,
    },
    /// Write the effective settings to the configuration file.
    Init {
        /// Replace an existing configuration file.
        #[arg(long)]
        force: bool,
    },
    /// List the export's collections with their modes and variable counts.
    Inspect,
    /// Print the final value of one token.
    Resolve {
        /// Token name, with or without the leading `--`.
        name: String,
        /// Mode to resolve in; defaults to the owning collection's default.
        #[arg(long)]
        mode: Option<String>,
    },
}

impl Xtask {
    fn run(self) -> Result<()> {
        let config = self.load_config()?;
        match self.command {
            XtaskCommand::Build {
                out_dir,
                no_diff,
                literal,
                float_unit,
                no_theme,
                force,
            } => {
                let mut config = config;
                if let Some(out_dir) = out_dir {
                    config.out_dir = out_dir;
                }
                config.diff_against_default &= !no_diff;
                config.prefer_alias &= !literal;
                config.emit_theme &= !no_theme;
                if float_unit.is_some() {
                    config.float_unit = float_unit;
                }

                let report = run(&config, force)?;
                if report.skipped {
                    println!(
                        "{} and settings unchanged; nothing to do",
                        config.input.display()
                    );
                } else {
                    println!(
                        "wrote {} file(s) into {}",
                        report.written.len(),
                        config.out_dir.display()
                    );
                }
                Ok(())
            }
            XtaskCommand::Init { force } => {
                let store = ConfigStore::new(self.config);
                if store.path().exists() && !force {
                    bail!(
                        "{} already exists; pass --force to overwrite it",
                        store.path().display()
                    );
                }
                store
                    .save(&config)
                    .with_context(|| format!("failed to write {}", store.path().display()))?;
                println!("wrote {}", store.path().display());
                Ok(())
            }
            XtaskCommand::Inspect => inspect(&config),
            XtaskCommand::Resolve { name, mode } => resolve(&config, &name, mode.as_deref()),
        }
    }

    fn load_config(&self) -> Result<BuildConfig> {
        let store = ConfigStore::new(self.config.clone());
        let mut config = store
            .load()
            .with_context(|| format!("failed to read {}", store.path().display()))?;
        config.apply_env();
        if let Some(input) = &self.overrides.input {
            config.input.clone_from(input);
        }
        if let Some(filter) = &self.overrides.collections {
            config.collections = parse_collection_filter(filter);
        }
        Ok(config)
    }
}

fn inspect(config: &BuildConfig) -> Result<()> {
    let export = load_export(&config.input)?;
    let selected: Vec<String> = select_collections(&export, config.collections.as_deref())
        .map(|selected| {
            selected
                .iter()
                .map(|entry| entry.collection.id.clone())
                .collect()
        })
        .unwrap_or_default();

    for collection in export.collections() {
        let marker = if selected.contains(&collection.id) { "*" } else { " " };
        println!(
            "{marker} {name} [{slug}] {kind}: {count} variable(s), modes: {modes} (default {default})",
            name = collection.name,
            slug = naming::collection_slug(&collection.name),
            kind = tokens::CollectionKind::detect(&collection.name).as_str(),
            count = collection.variable_ids.len(),
            modes = collection.mode_names().join(", "),
            default = collection.default_mode_name(),
        );
    }
    Ok(())
}

fn resolve(config: &BuildConfig, name: &str, mode: Option<&str>) -> Result<()> {
    let export = load_export(&config.input)?;
    let output = build(&export, config)?;
    let resolver: ResolverMap = output.collections.iter().map(|c| &c.flat).collect();

    let name = naming::plain_name(name);
    let Some(token) = resolver.get(name) else {
        bail!("no token named `{name}` in the selected collections");
    };
    let default_mode = output
        .collections
        .iter()
        .find(|collection| collection.name == token.collection_name)
        .map_or("Default", |collection| collection.default_mode.as_str());
    let mode = mode.unwrap_or(default_mode);

    let value = resolve_final_value(&format!("var(--{name})"), &resolver, mode, default_mode);
    println!("{value}");
    Ok(())
}
