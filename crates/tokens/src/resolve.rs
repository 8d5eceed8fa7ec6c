//! Alias resolution.
//!
//! Primitive collections are collapsed to literals with a topological pass;
//! semantic collections keep their `var()` references and are resolved on
//! demand through a [`ResolverMap`] spanning every collection in a build.

use std::collections::{BTreeMap, HashMap, HashSet};

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;
use tracing::{debug, warn};

use crate::flatten::{FlatMap, FlatToken};
use crate::model::Collection;

static VAR_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*var\(--([^,)\s]+)\s*(?:,[^)]*)?\)\s*$").expect("var() pattern is valid")
});

/// Returns the referenced plain name when `value` is a `var(--name)` string.
#[must_use]
pub fn var_reference(value: &str) -> Option<&str> {
    VAR_REFERENCE
        .captures(value)
        .and_then(|captures| captures.get(1))
        .map(|name| name.as_str())
}

/// Errors raised while collapsing a primitives collection.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    /// Two or more tokens reference each other.
    #[error("alias cycle detected: {}", .cycle.join(" -> "))]
    AliasCycle {
        /// Tokens on the cycle; the first name is repeated at the end.
        cycle: Vec<String>,
    },
}

/// Tokens of every collection in a build, keyed by plain name.
#[derive(Debug, Clone, Default)]
pub struct ResolverMap {
    tokens: HashMap<String, FlatToken>,
}

impl ResolverMap {
    /// Creates an empty resolver map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds every token of `flat`; later collections win on name clashes.
    pub fn extend(&mut self, flat: &FlatMap) {
        for (name, token) in flat {
            if let Some(previous) = self.tokens.insert(name.clone(), token.clone()) {
                if previous.collection_id != token.collection_id {
                    warn!(
                        token = %name,
                        first = %previous.collection_name,
                        second = %token.collection_name,
                        "token name used by two collections"
                    );
                }
            }
        }
    }

    /// Looks up a token by plain name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FlatToken> {
        self.tokens.get(name)
    }

    /// Number of tokens known to the map.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if no collection has been added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl<'a> FromIterator<&'a FlatMap> for ResolverMap {
    fn from_iter<I: IntoIterator<Item = &'a FlatMap>>(iter: I) -> Self {
        let mut map = Self::new();
        for flat in iter {
            map.extend(flat);
        }
        map
    }
}

/// Collapses every alias of a primitives collection into a literal.
///
/// Tokens are processed in dependency order so a referenced token is already
/// literal when its dependents read it. Every mode of the collection ends up
/// with an explicit value and `alias_of` is cleared.
pub fn resolve_internal_aliases(
    flat: &mut FlatMap,
    collection: &Collection,
) -> Result<(), ResolveError> {
    let graph: BTreeMap<String, Vec<String>> = flat
        .iter()
        .map(|(name, token)| {
            let mut deps: Vec<String> = token
                .values_by_mode
                .values()
                .filter_map(|value| var_reference(value))
                .map(str::to_owned)
                .collect();
            deps.sort();
            deps.dedup();
            (name.clone(), deps)
        })
        .collect();

    let order = topological_order(&graph)?;
    let modes: Vec<String> = collection
        .mode_names()
        .into_iter()
        .map(str::to_owned)
        .collect();
    let default_mode = collection.default_mode_name().to_owned();

    for name in &order {
        let mut resolved = Vec::with_capacity(modes.len());
        if let Some(token) = flat.get(name) {
            for mode in &modes {
                let Some(value) = token.value_or_default(mode, &default_mode) else {
                    continue;
                };
                let value = match var_reference(value) {
                    Some(dependency) => {
                        dependency_value(flat, name, dependency, mode, &default_mode)
                            .unwrap_or_else(|| value.to_owned())
                    }
                    None => value.to_owned(),
                };
                resolved.push((mode.clone(), value));
            }
        }

        if let Some(token) = flat.get_mut(name) {
            for (mode, value) in resolved {
                token.values_by_mode.insert(mode, value);
            }
            token.alias_of = None;
        }
    }

    debug!(
        collection = %collection.name,
        tokens = order.len(),
        "resolved primitive aliases"
    );
    Ok(())
}

fn dependency_value(
    flat: &FlatMap,
    token: &str,
    dependency: &str,
    mode: &str,
    default_mode: &str,
) -> Option<String> {
    let Some(target) = flat.get(dependency) else {
        warn!(%token, %dependency, "alias target is outside this collection; keeping reference");
        return None;
    };
    let value = target.value_or_default(mode, default_mode)?;
    let Some(next) = var_reference(value) else {
        return Some(value.to_owned());
    };

    // Topological order should make this unreachable; follow one more hop.
    match flat
        .get(next)
        .and_then(|hop| hop.value_or_default(mode, default_mode))
    {
        Some(literal) if var_reference(literal).is_none() => Some(literal.to_owned()),
        _ => {
            warn!(%token, %dependency, %mode, "alias did not resolve to a literal");
            Some(value.to_owned())
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    InProgress,
    Done,
}

/// Iterative depth-first topological sort; dependencies come first.
///
/// Edges to names missing from `graph` are ignored.
fn topological_order(graph: &BTreeMap<String, Vec<String>>) -> Result<Vec<String>, ResolveError> {
    let mut marks: HashMap<&str, Mark> = graph
        .keys()
        .map(|name| (name.as_str(), Mark::Unvisited))
        .collect();
    let mut order = Vec::with_capacity(graph.len());

    for root in graph.keys() {
        if marks.get(root.as_str()) != Some(&Mark::Unvisited) {
            continue;
        }
        marks.insert(root.as_str(), Mark::InProgress);
        let mut stack: Vec<(&str, usize)> = vec![(root.as_str(), 0)];

        while let Some(frame) = stack.last_mut() {
            let node = frame.0;
            let Some(child) = graph[node].get(frame.1) else {
                marks.insert(node, Mark::Done);
                order.push(node.to_owned());
                stack.pop();
                continue;
            };
            frame.1 += 1;

            match marks.get(child.as_str()).copied() {
                Some(Mark::Unvisited) => {
                    marks.insert(child.as_str(), Mark::InProgress);
                    stack.push((child.as_str(), 0));
                }
                Some(Mark::InProgress) => {
                    let start = stack
                        .iter()
                        .position(|(name, _)| *name == child.as_str())
                        .unwrap_or(0);
                    let mut cycle: Vec<String> =
                        stack[start..].iter().map(|(name, _)| (*name).to_owned()).collect();
                    cycle.push(child.clone());
                    return Err(ResolveError::AliasCycle { cycle });
                }
                Some(Mark::Done) | None => {}
            }
        }
    }

    Ok(order)
}

/// Chases `var()` references through `resolver` until a literal is reached.
///
/// Each hop selects the referenced token's value for `preferred_mode`, then
/// `fallback_mode`, then `Default`, then `Light`, then its first value. The
/// chase stops on a revisited or unknown reference and returns the last value
/// seen, which may still be a reference.
#[must_use]
pub fn resolve_final_value(
    value: &str,
    resolver: &ResolverMap,
    preferred_mode: &str,
    fallback_mode: &str,
) -> String {
    let mut current = value.to_owned();
    let mut visited = HashSet::new();

    while let Some(name) = var_reference(&current) {
        if !visited.insert(name.to_owned()) {
            debug!(reference = %name, "reference cycle while resolving; stopping");
            break;
        }
        let Some(next) = resolver
            .get(name)
            .and_then(|token| select_mode_value(token, preferred_mode, fallback_mode))
        else {
            debug!(reference = %name, "unresolvable reference; keeping it");
            break;
        };
        current = next.to_owned();
    }

    current
}

fn select_mode_value<'a>(
    token: &'a FlatToken,
    preferred_mode: &str,
    fallback_mode: &str,
) -> Option<&'a str> {
    token
        .value(preferred_mode)
        .or_else(|| token.value(fallback_mode))
        .or_else(|| token.value("Default"))
        .or_else(|| token.value("Light"))
        .or_else(|| token.values_by_mode.values().next().map(String::as_str))
}

#[cfg(test)]
mod tests {
    use indexmap::IndexMap;

    use super::*;
    use crate::model::{Mode, ResolvedType};

    fn token(name: &str, collection: &str, values: &[(&str, &str)]) -> FlatToken {
        FlatToken {
            id: format!("id-{name}"),
            css_name: format!("--{name}"),
            name: name.to_owned(),
            resolved_type: ResolvedType::Float,
            collection_id: collection.to_owned(),
            collection_name: collection.to_owned(),
            values_by_mode: values
                .iter()
                .map(|(mode, value)| ((*mode).to_owned(), (*value).to_owned()))
                .collect::<IndexMap<_, _>>(),
            alias_of: None,
        }
    }

    fn flat(tokens: Vec<FlatToken>) -> FlatMap {
        tokens
            .into_iter()
            .map(|token| (token.name.clone(), token))
            .collect()
    }

    fn core(modes: &[&str]) -> Collection {
        Collection {
            id: "core".into(),
            name: "Core".into(),
            modes: modes
                .iter()
                .enumerate()
                .map(|(index, name)| Mode {
                    mode_id: format!("m{index}"),
                    name: (*name).to_owned(),
                })
                .collect(),
            default_mode_id: "m0".into(),
            variable_ids: Vec::new(),
        }
    }

    #[test]
    fn var_reference_matches_plain_and_fallback_forms() {
        assert_eq!(var_reference("var(--core-a)"), Some("core-a"));
        assert_eq!(var_reference("var(--core-a, 4px)"), Some("core-a"));
        assert_eq!(var_reference("calc(var(--a) * 2)"), None);
        assert_eq!(var_reference("#fff"), None);
    }

    #[test]
    fn chains_collapse_to_literals_in_every_mode() {
        let mut tokens = flat(vec![
            token("core-c", "core", &[("Default", "var(--core-b)")]),
            token(
                "core-b",
                "core",
                &[("Default", "var(--core-a)"), ("Mobile", "var(--core-a)")],
            ),
            token("core-a", "core", &[("Default", "4"), ("Mobile", "2")]),
        ]);
        tokens.get_mut("core-c").unwrap().alias_of = Some("--core-b".into());

        resolve_internal_aliases(&mut tokens, &core(&["Default", "Mobile"])).unwrap();

        let c = &tokens["core-c"];
        assert_eq!(c.value("Default"), Some("4"));
        assert_eq!(c.value("Mobile"), Some("2"));
        assert!(c.alias_of.is_none());

        for token in tokens.values() {
            for value in token.values_by_mode.values() {
                assert!(!value.starts_with("var(--"), "{} kept {value}", token.name);
            }
        }
    }

    #[test]
    fn cycles_are_fatal_and_name_participants() {
        let mut tokens = flat(vec![
            token("core-a", "core", &[("Default", "var(--core-b)")]),
            token("core-b", "core", &[("Default", "var(--core-a)")]),
        ]);
        let err = resolve_internal_aliases(&mut tokens, &core(&["Default"])).unwrap_err();
        let ResolveError::AliasCycle { cycle } = &err;
        assert!(cycle.contains(&"core-a".to_owned()));
        assert!(cycle.contains(&"core-b".to_owned()));
        assert!(err.to_string().starts_with("alias cycle detected"));
    }

    #[test]
    fn self_reference_is_a_cycle() {
        let mut tokens = flat(vec![token("core-a", "core", &[("Default", "var(--core-a)")])]);
        assert!(resolve_internal_aliases(&mut tokens, &core(&["Default"])).is_err());
    }

    #[test]
    fn references_outside_the_collection_are_kept() {
        let mut tokens = flat(vec![token("core-a", "core", &[("Default", "var(--theme-x)")])]);
        resolve_internal_aliases(&mut tokens, &core(&["Default"])).unwrap();
        assert_eq!(tokens["core-a"].value("Default"), Some("var(--theme-x)"));
    }

    #[test]
    fn final_value_chases_across_collections() {
        let primitives = flat(vec![token(
            "core-blue",
            "core",
            &[("Default", "#1976d2")],
        )]);
        let theme = flat(vec![token(
            "theme-primary",
            "theme",
            &[("Light", "var(--core-blue)"), ("Dark", "#90caf9")],
        )]);
        let resolver: ResolverMap = [&primitives, &theme].into_iter().collect();

        assert_eq!(
            resolve_final_value("var(--theme-primary)", &resolver, "Light", "Light"),
            "#1976d2"
        );
        assert_eq!(
            resolve_final_value("var(--theme-primary)", &resolver, "Dark", "Light"),
            "#90caf9"
        );
        assert_eq!(resolve_final_value("12px", &resolver, "Dark", "Light"), "12px");
    }

    #[test]
    fn final_value_mode_fallback_order() {
        let tokens = flat(vec![
            token("only-light", "t", &[("Dark", "d"), ("Light", "l")]),
            token("only-first", "t", &[("Tablet", "t")]),
        ]);
        let resolver: ResolverMap = std::iter::once(&tokens).collect();
        assert_eq!(
            resolve_final_value("var(--only-light)", &resolver, "Mobile", "Desktop"),
            "l"
        );
        assert_eq!(
            resolve_final_value("var(--only-first)", &resolver, "Mobile", "Desktop"),
            "t"
        );
    }

    #[test]
    fn final_value_stops_on_cycles_and_unknown_names() {
        let tokens = flat(vec![
            token("a", "t", &[("Light", "var(--b)")]),
            token("b", "t", &[("Light", "var(--a)")]),
        ]);
        let resolver: ResolverMap = std::iter::once(&tokens).collect();
        assert_eq!(
            resolve_final_value("var(--a)", &resolver, "Light", "Light"),
            "var(--a)"
        );
        assert_eq!(
            resolve_final_value("var(--ghost)", &resolver, "Light", "Light"),
            "var(--ghost)"
        );
    }
}
