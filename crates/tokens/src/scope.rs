//! Plans the CSS selector that wraps each mode of a collection.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::model::{Collection, CollectionKind};
use crate::naming::kebab;

static LARGE_MODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)large|desktop|xl|lg").expect("large-mode pattern is valid"));
static SMALL_MODE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)mobile|small|sm").expect("small-mode pattern is valid"));

/// Where a mode's declarations are placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ScopeTarget {
    /// Plain `:root`.
    Root,
    /// `:root` inside `@media (min-width: …)`.
    MinWidth {
        /// Breakpoint in pixels.
        px: u32,
    },
    /// `:root` inside `@media (max-width: …)`.
    MaxWidth {
        /// Breakpoint in pixels.
        px: u32,
    },
    /// `[data-{name}="{mode}"]`.
    Attribute {
        /// Attribute name without the `data-` prefix.
        name: String,
    },
    /// `[data-theme="{mode}"]`.
    Theme,
    /// A literal selector.
    Selector {
        /// Selector text placed before the block.
        selector: String,
    },
}

impl ScopeTarget {
    /// Builds the scope for `mode_name`.
    #[must_use]
    pub fn scope(&self, mode_name: &str) -> Scope {
        let slug = kebab(mode_name).replace('/', "-");
        let (open, close) = match self {
            ScopeTarget::Root => (":root {".to_owned(), "}".to_owned()),
            ScopeTarget::MinWidth { px } => (
                format!("@media (min-width: {px}px) {{\n:root {{"),
                "}\n}".to_owned(),
            ),
            ScopeTarget::MaxWidth { px } => (
                format!("@media (max-width: {px}px) {{\n:root {{"),
                "}\n}".to_owned(),
            ),
            ScopeTarget::Attribute { name } => {
                (format!("[data-{name}=\"{slug}\"] {{"), "}".to_owned())
            }
            ScopeTarget::Theme => (format!("[data-theme=\"{slug}\"] {{"), "}".to_owned()),
            ScopeTarget::Selector { selector } => (format!("{selector} {{"), "}".to_owned()),
        };
        Scope {
            mode_name: mode_name.to_owned(),
            open,
            close,
        }
    }
}

/// A planned CSS block for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    /// Mode whose values fill the block.
    pub mode_name: String,
    /// Text that opens the block, without a trailing newline.
    pub open: String,
    /// Text that closes the block, without a trailing newline.
    pub close: String,
}

/// One heuristic rule for primitive collections.
#[derive(Debug, Clone)]
pub struct ScopeRule {
    /// Pattern tested against the mode name.
    pub pattern: Regex,
    /// Target used when the pattern matches.
    pub target: ScopeTarget,
}

/// Data-driven mapping from mode names to scope targets.
///
/// Explicit overrides win, then (for primitive collections) the first
/// matching rule, then the fallback. The default rules route large and
/// desktop modes to a `min-width: 1024px` media query, mobile and small
/// modes to `max-width: 640px`, and anything else to `[data-core-mode]`.
#[derive(Debug, Clone)]
pub struct ScopeRules {
    overrides: IndexMap<String, ScopeTarget>,
    rules: Vec<ScopeRule>,
    fallback: ScopeTarget,
}

impl Default for ScopeRules {
    fn default() -> Self {
        Self {
            overrides: IndexMap::new(),
            rules: vec![
                ScopeRule {
                    pattern: LARGE_MODE.clone(),
                    target: ScopeTarget::MinWidth { px: 1024 },
                },
                ScopeRule {
                    pattern: SMALL_MODE.clone(),
                    target: ScopeTarget::MaxWidth { px: 640 },
                },
            ],
            fallback: ScopeTarget::Attribute {
                name: "core-mode".to_owned(),
            },
        }
    }
}

impl ScopeRules {
    /// Default rules plus the given per-mode overrides.
    #[must_use]
    pub fn with_overrides<I, K>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (K, ScopeTarget)>,
        K: AsRef<str>,
    {
        let mut rules = Self::default();
        for (mode, target) in overrides {
            rules = rules.with_override(mode.as_ref(), target);
        }
        rules
    }

    /// Pins `mode_name` (case-insensitive) to `target`.
    #[must_use]
    pub fn with_override(mut self, mode_name: &str, target: ScopeTarget) -> Self {
        self.overrides.insert(mode_name.to_lowercase(), target);
        self
    }

    /// Replaces the heuristic rules used for primitive collections.
    #[must_use]
    pub fn with_rules(mut self, rules: Vec<ScopeRule>, fallback: ScopeTarget) -> Self {
        self.rules = rules;
        self.fallback = fallback;
        self
    }

    /// Target for a non-default mode.
    #[must_use]
    pub fn target_for(&self, mode_name: &str, kind: CollectionKind) -> ScopeTarget {
        if let Some(target) = self.overrides.get(&mode_name.to_lowercase()) {
            return target.clone();
        }
        match kind {
            CollectionKind::Theme => ScopeTarget::Theme,
            CollectionKind::Primitive => self
                .rules
                .iter()
                .find(|rule| rule.pattern.is_match(mode_name))
                .map_or_else(|| self.fallback.clone(), |rule| rule.target.clone()),
        }
    }
}

/// Scopes of one collection, default mode first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopePlan {
    /// Planned blocks in emission order.
    pub scopes: Vec<Scope>,
    /// Name of the default mode, always planned as `:root`.
    pub default_mode: String,
}

impl ScopePlan {
    /// Returns `true` when `scope` holds the default mode.
    #[must_use]
    pub fn is_default(&self, scope: &Scope) -> bool {
        scope.mode_name == self.default_mode
    }
}

/// Plans one scope per mode of `collection`.
#[must_use]
pub fn plan_scopes(collection: &Collection, kind: CollectionKind, rules: &ScopeRules) -> ScopePlan {
    let default_mode = collection.default_mode_name().to_owned();
    let mut scopes = vec![ScopeTarget::Root.scope(&default_mode)];
    scopes.extend(
        collection
            .modes
            .iter()
            .filter(|mode| mode.name != default_mode)
            .map(|mode| rules.target_for(&mode.name, kind).scope(&mode.name)),
    );
    ScopePlan {
        scopes,
        default_mode,
    }
}
