//! Flattens a collection's variables into [`FlatToken`]s keyed by their plain
//! CSS name.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::model::{Collection, RawExport, RawValue, ResolvedType, Variable};
use crate::naming::{collection_slug, css_var_name, plain_name};

/// Flat tokens of one collection, ordered by plain name.
pub type FlatMap = BTreeMap<String, FlatToken>;

/// Normalized representation of a single variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatToken {
    /// Figma id of the originating variable.
    pub id: String,
    /// Custom-property name including the leading `--`.
    pub css_name: String,
    /// Custom-property name without the leading `--`.
    pub name: String,
    /// Declared value type.
    #[serde(rename = "type")]
    pub resolved_type: ResolvedType,
    /// Owning collection id.
    pub collection_id: String,
    /// Owning collection display name.
    pub collection_name: String,
    /// Formatted literal or `var(--other)` per mode name.
    pub values_by_mode: IndexMap<String, String>,
    /// CSS name of the token this one aliases, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

impl FlatToken {
    /// Value stored for `mode`.
    #[must_use]
    pub fn value(&self, mode: &str) -> Option<&str> {
        self.values_by_mode.get(mode).map(String::as_str)
    }

    /// Value stored for `mode`, falling back to `default_mode`.
    #[must_use]
    pub fn value_or_default(&self, mode: &str, default_mode: &str) -> Option<&str> {
        self.value(mode).or_else(|| self.value(default_mode))
    }
}

/// Builds the global `variable id -> css name` table.
///
/// Variables whose collection is missing from the export are dropped with a
/// warning.
#[must_use]
pub fn variable_css_names(export: &RawExport) -> HashMap<String, String> {
    let mut names = HashMap::with_capacity(export.meta.variables.len());
    for variable in export.meta.variables.values() {
        let Some(collection) = owning_collection(export, variable) else {
            warn!(
                variable = %variable.name,
                collection = %variable.variable_collection_id,
                "variable references an unknown collection; dropping it"
            );
            continue;
        };
        let prefix = collection_slug(&collection.name);
        names.insert(variable.id.clone(), css_var_name(&prefix, &variable.name));
    }
    names
}

fn owning_collection<'a>(export: &'a RawExport, variable: &Variable) -> Option<&'a Collection> {
    if variable.variable_collection_id.is_empty() {
        export
            .collections()
            .find(|collection| collection.variable_ids.contains(&variable.id))
    } else {
        export.collection(&variable.variable_collection_id)
    }
}

/// Flattens one collection.
///
/// `names` is the table produced by [`variable_css_names`]; alias targets are
/// looked up there so references may cross collections.
#[must_use]
pub fn flatten(
    collection: &Collection,
    variables: &IndexMap<String, Variable>,
    names: &HashMap<String, String>,
) -> FlatMap {
    let prefix = collection_slug(&collection.name);
    let mut flat = FlatMap::new();

    for id in &collection.variable_ids {
        let Some(variable) = variables.get(id) else {
            debug!(%id, collection = %collection.name, "variable listed but not exported");
            continue;
        };

        let css_name = names
            .get(id)
            .cloned()
            .unwrap_or_else(|| css_var_name(&prefix, &variable.name));
        let name = plain_name(&css_name).to_owned();

        let mut values_by_mode = IndexMap::with_capacity(variable.values_by_mode.len());
        let mut alias_of = None;
        for (mode_id, raw) in &variable.values_by_mode {
            let mode = collection.mode_name(mode_id).unwrap_or(mode_id.as_str()).to_owned();
            match raw.alias_target() {
                Some(target) => match names.get(target) {
                    Some(target_css) => {
                        values_by_mode.insert(mode, format!("var(--{})", plain_name(target_css)));
                        alias_of = Some(target_css.clone());
                    }
                    None => warn!(
                        token = %name,
                        %mode,
                        %target,
                        "alias points at an unknown variable; leaving it unresolved"
                    ),
                },
                None => {
                    values_by_mode.insert(mode, format_literal(variable.resolved_type, raw));
                }
            }
        }

        let token = FlatToken {
            id: variable.id.clone(),
            css_name,
            name: name.clone(),
            resolved_type: variable.resolved_type,
            collection_id: collection.id.clone(),
            collection_name: collection.name.clone(),
            values_by_mode,
            alias_of,
        };
        if flat.insert(name.clone(), token).is_some() {
            warn!(token = %name, collection = %collection.name, "duplicate token name");
        }
    }

    flat
}

/// Formats a literal value the way it is emitted in CSS and JSON.
///
/// Colour objects become `rgba(r,g,b,a)` with 0–255 channels. Aliases are
/// expected to be handled by the caller and format as their raw id.
#[must_use]
pub fn format_literal(resolved_type: ResolvedType, value: &RawValue) -> String {
    match value {
        RawValue::Color { r, g, b, a } => format!(
            "rgba({},{},{},{})",
            channel(*r),
            channel(*g),
            channel(*b),
            format_number(a.unwrap_or(1.0))
        ),
        RawValue::Number(n) => format_number(*n),
        RawValue::Bool(flag) => flag.to_string(),
        RawValue::Text(text) => text.clone(),
        RawValue::Alias { id, .. } => id.clone(),
        RawValue::Other(serde_json::Value::String(text)) => text.clone(),
        RawValue::Other(other) => {
            debug!(?resolved_type, %other, "formatting unrecognised value verbatim");
            other.to_string()
        }
    }
}

fn channel(value: f64) -> u8 {
    // Clamped to 0..=255 before the cast.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let byte = (value.clamp(0.0, 1.0) * 255.0).round() as u8;
    byte
}

/// Shortest decimal rendering of a number: `8`, `1.5`, `0.5`.
#[must_use]
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_owned();
    }
    value.to_string()
}
