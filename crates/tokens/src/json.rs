//! JSON side outputs: the flat token map and the dot-notation map read by
//! theme assembly.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use crate::flatten::FlatMap;
use crate::resolve::{resolve_final_value, ResolverMap};

/// Dot-notation map: `"{name}.valuesByMode.{Mode}" -> value`.
pub type MuiFlat = BTreeMap<String, String>;

/// Serializes a flat map as pretty JSON.
pub fn flat_json(flat: &FlatMap) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(flat)
}

/// Resolves every mode value of `flat` and flattens the result to
/// `"{name}.valuesByMode.{Mode}"` keys.
#[must_use]
pub fn mui_flat(flat: &FlatMap, resolver: &ResolverMap, default_mode: &str) -> MuiFlat {
    let mut nested = Map::with_capacity(flat.len());
    for (name, token) in flat {
        let values: Map<String, Value> = token
            .values_by_mode
            .iter()
            .map(|(mode, value)| {
                let resolved = resolve_final_value(value, resolver, mode, default_mode);
                (mode.clone(), Value::String(resolved))
            })
            .collect();

        let mut entry = Map::with_capacity(1);
        entry.insert("valuesByMode".to_owned(), Value::Object(values));
        nested.insert(name.clone(), Value::Object(entry));
    }

    let mut out = MuiFlat::new();
    flatten_value(None, &Value::Object(nested), &mut out);
    out
}

/// Flattens nested JSON into dot-separated string pairs.
///
/// Arrays are keyed by index, `null` becomes an empty string and other
/// scalars use their JSON text.
pub fn flatten_value(prefix: Option<&str>, value: &Value, out: &mut MuiFlat) {
    let key = |child: &str| match prefix {
        Some(prefix) => format!("{prefix}.{child}"),
        None => child.to_owned(),
    };

    match value {
        Value::Object(map) => {
            for (child, value) in map {
                flatten_value(Some(&key(child)), value, out);
            }
        }
        Value::Array(items) => {
            for (index, value) in items.iter().enumerate() {
                flatten_value(Some(&key(&index.to_string())), value, out);
            }
        }
        Value::String(text) => {
            out.insert(prefix.unwrap_or_default().to_owned(), text.clone());
        }
        Value::Null => {
            out.insert(prefix.unwrap_or_default().to_owned(), String::new());
        }
        Value::Bool(_) | Value::Number(_) => {
            out.insert(prefix.unwrap_or_default().to_owned(), value.to_string());
        }
    }
}
