//! Raw variable export as produced by the Figma variables endpoint.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Top-level document written by the fetch step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RawExport {
    /// Collections and variables of the exported file.
    #[serde(default)]
    pub meta: Meta,
}

/// Collections and variables keyed by their Figma identifiers.
///
/// Both tables keep document order so that builds iterate collections in
/// the order the export lists them.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    /// Variable collections keyed by collection id.
    #[serde(default)]
    pub variable_collections: IndexMap<String, Collection>,
    /// Variables keyed by variable id.
    #[serde(default)]
    pub variables: IndexMap<String, Variable>,
}

impl RawExport {
    /// Parses an export from its JSON text.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Looks up a collection by id.
    #[must_use]
    pub fn collection(&self, id: &str) -> Option<&Collection> {
        self.meta.variable_collections.get(id)
    }

    /// Iterates collections in document order.
    pub fn collections(&self) -> impl Iterator<Item = &Collection> {
        self.meta.variable_collections.values()
    }
}

/// A single mode of a collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Mode {
    /// Figma mode identifier, e.g. `1:0`.
    pub mode_id: String,
    /// Human readable mode name, e.g. `Light`.
    pub name: String,
}

/// A Figma variable collection.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Collection {
    /// Stable collection identifier.
    pub id: String,
    /// Display name, e.g. `Lighthouse Theme`.
    pub name: String,
    /// Modes in their declared order.
    #[serde(default)]
    pub modes: Vec<Mode>,
    /// Identifier of the default mode.
    #[serde(default)]
    pub default_mode_id: String,
    /// Member variables in their declared order.
    #[serde(default)]
    pub variable_ids: Vec<String>,
}

impl Collection {
    /// Returns the name of the mode with the given id.
    #[must_use]
    pub fn mode_name(&self, mode_id: &str) -> Option<&str> {
        self.modes
            .iter()
            .find(|mode| mode.mode_id == mode_id)
            .map(|mode| mode.name.as_str())
    }

    /// Name of the default mode.
    ///
    /// Falls back to the first declared mode and finally to the raw default
    /// mode id when the collection is malformed.
    #[must_use]
    pub fn default_mode_name(&self) -> &str {
        self.mode_name(&self.default_mode_id)
            .or_else(|| self.modes.first().map(|mode| mode.name.as_str()))
            .unwrap_or(&self.default_mode_id)
    }

    /// Mode names in declared order.
    #[must_use]
    pub fn mode_names(&self) -> Vec<&str> {
        self.modes.iter().map(|mode| mode.name.as_str()).collect()
    }
}

/// Declared type of a variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResolvedType {
    /// `{r,g,b,a}` colour values.
    Color,
    /// Numeric values.
    Float,
    /// Free text values.
    String,
    /// Boolean values.
    Boolean,
    /// Any type this pipeline does not know about.
    #[serde(other)]
    Other,
}

/// A single design-token definition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Variable {
    /// Stable variable identifier.
    pub id: String,
    /// Slash-delimited hierarchical name, e.g. `colors/primary/main`.
    pub name: String,
    /// Declared value type.
    pub resolved_type: ResolvedType,
    /// Value per mode id.
    #[serde(default)]
    pub values_by_mode: IndexMap<String, RawValue>,
    /// Owning collection.
    #[serde(default)]
    pub variable_collection_id: String,
}

/// Marker for alias objects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AliasKind {
    /// The only alias kind Figma emits.
    #[serde(rename = "VARIABLE_ALIAS")]
    VariableAlias,
}

/// A per-mode value: either a literal or a reference to another variable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Reference to another variable.
    Alias {
        /// Always `VARIABLE_ALIAS`.
        #[serde(rename = "type")]
        kind: AliasKind,
        /// Referenced variable id.
        id: String,
    },
    /// Colour with 0–1 channels.
    Color {
        /// Red channel.
        r: f64,
        /// Green channel.
        g: f64,
        /// Blue channel.
        b: f64,
        /// Alpha channel; absent means opaque.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        a: Option<f64>,
    },
    /// Boolean literal.
    Bool(bool),
    /// Numeric literal.
    Number(f64),
    /// Text literal.
    Text(String),
    /// Anything else, kept verbatim.
    Other(serde_json::Value),
}

impl RawValue {
    /// Returns the referenced variable id when this value is an alias.
    #[must_use]
    pub fn alias_target(&self) -> Option<&str> {
        match self {
            RawValue::Alias { id, .. } => Some(id),
            _ => None,
        }
    }
}

/// Whether a collection holds primitives or semantic theme tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CollectionKind {
    /// Raw values that must be fully resolved (`Core`).
    Primitive,
    /// Semantic tokens that may keep `var()` references (`Theme`).
    Theme,
}

impl CollectionKind {
    /// Classifies a collection by its display name.
    #[must_use]
    pub fn detect(collection_name: &str) -> Self {
        let lower = collection_name.to_lowercase();
        if lower.contains("theme") || lower.contains("lighthouse") {
            CollectionKind::Theme
        } else {
            CollectionKind::Primitive
        }
    }

    /// Returns a short label for logs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            CollectionKind::Primitive => "primitive",
            CollectionKind::Theme => "theme",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_aliases_colors_and_literals() {
        let export: RawExport = serde_json::from_value(json!({
            "meta": {
                "variableCollections": {
                    "c1": {
                        "id": "c1",
                        "name": "Core",
                        "modes": [{ "modeId": "m1", "name": "Default" }],
                        "defaultModeId": "m1",
                        "variableIds": ["v1", "v2", "v3"]
                    }
                },
                "variables": {
                    "v1": {
                        "id": "v1",
                        "name": "colors/red",
                        "resolvedType": "COLOR",
                        "valuesByMode": { "m1": { "r": 1, "g": 0, "b": 0 } },
                        "variableCollectionId": "c1"
                    },
                    "v2": {
                        "id": "v2",
                        "name": "colors/brand",
                        "resolvedType": "COLOR",
                        "valuesByMode": { "m1": { "type": "VARIABLE_ALIAS", "id": "v1" } },
                        "variableCollectionId": "c1"
                    },
                    "v3": {
                        "id": "v3",
                        "name": "spacing/sm",
                        "resolvedType": "FLOAT",
                        "valuesByMode": { "m1": 8 },
                        "variableCollectionId": "c1"
                    }
                }
            }
        }))
        .unwrap();

        let vars = &export.meta.variables;
        assert!(matches!(
            vars["v1"].values_by_mode["m1"],
            RawValue::Color { a: None, .. }
        ));
        assert_eq!(vars["v2"].values_by_mode["m1"].alias_target(), Some("v1"));
        assert_eq!(vars["v3"].values_by_mode["m1"], RawValue::Number(8.0));
        assert_eq!(export.collection("c1").unwrap().default_mode_name(), "Default");
    }

    #[test]
    fn unknown_types_do_not_fail_parsing() {
        let variable: Variable = serde_json::from_value(json!({
            "id": "v1",
            "name": "misc/thing",
            "resolvedType": "GRADIENT",
            "valuesByMode": { "m1": { "stops": [] } }
        }))
        .unwrap();
        assert_eq!(variable.resolved_type, ResolvedType::Other);
        assert!(matches!(variable.values_by_mode["m1"], RawValue::Other(_)));
    }

    #[test]
    fn kind_detection_uses_collection_name() {
        assert_eq!(CollectionKind::detect("Core"), CollectionKind::Primitive);
        assert_eq!(CollectionKind::detect("Lighthouse Theme"), CollectionKind::Theme);
        assert_eq!(CollectionKind::detect("lighthouse"), CollectionKind::Theme);
    }
}
