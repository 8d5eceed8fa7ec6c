#![doc = include_str!("../README.md")]
#![warn(clippy::pedantic, missing_docs, unreachable_pub)]

pub mod context;
pub mod css;
pub mod flatten;
pub mod json;
pub mod model;
pub mod naming;
pub mod resolve;
pub mod scope;
pub mod theme;

pub use context::{LookupError, TokenContext, TokenPath, TokenSource};
pub use css::{emit_css, render_css_file, EmitOptions};
pub use flatten::{flatten, variable_css_names, FlatMap, FlatToken};
pub use json::{flat_json, mui_flat, MuiFlat};
pub use model::{Collection, CollectionKind, Mode, RawExport, RawValue, ResolvedType, Variable};
pub use resolve::{resolve_final_value, resolve_internal_aliases, ResolveError, ResolverMap};
pub use scope::{plan_scopes, Scope, ScopePlan, ScopeRules, ScopeTarget};
pub use theme::{assemble_theme, PaletteMode, ThemeOptions};
