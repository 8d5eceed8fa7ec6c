//! Emits mode-scoped custom-property declarations.

use crate::flatten::{FlatMap, FlatToken};
use crate::model::ResolvedType;
use crate::resolve::{resolve_final_value, var_reference, ResolverMap};
use crate::scope::ScopePlan;

/// Knobs for [`emit_css`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmitOptions {
    /// Skip non-default declarations equal to the default-mode value.
    pub diff_against_default: bool,
    /// Emit `var()` references verbatim instead of resolving them.
    pub prefer_alias: bool,
    /// Unit appended to numeric `FLOAT` literals, e.g. `px`.
    pub float_unit: Option<String>,
}

impl Default for EmitOptions {
    fn default() -> Self {
        Self {
            diff_against_default: true,
            prefer_alias: false,
            float_unit: None,
        }
    }
}

/// Writes one block per planned scope.
///
/// Tokens are emitted in name order. The default scope always lists every
/// token that has a default value; other scopes fall back to the default
/// value when a mode is missing and, with `diff_against_default`, only list
/// declarations whose rendered value differs from the one in the default
/// scope. Override blocks left empty are omitted.
#[must_use]
pub fn emit_css(
    flat: &FlatMap,
    plan: &ScopePlan,
    resolver: &ResolverMap,
    options: &EmitOptions,
) -> String {
    let mut css = String::new();

    for scope in &plan.scopes {
        let is_default = plan.is_default(scope);
        let mut declarations = Vec::new();

        for token in flat.values() {
            let default_value = token.value(&plan.default_mode);
            let value = if is_default {
                default_value
            } else {
                token.value(&scope.mode_name).or(default_value)
            };
            let Some(value) = value else {
                continue;
            };

            let rendered = render_value(
                token,
                value,
                resolver,
                &scope.mode_name,
                &plan.default_mode,
                options,
            );
            if options.diff_against_default && !is_default {
                let emitted_default = default_value.map(|default| {
                    render_value(
                        token,
                        default,
                        resolver,
                        &plan.default_mode,
                        &plan.default_mode,
                        options,
                    )
                });
                if emitted_default.as_deref() == Some(rendered.as_str()) {
                    continue;
                }
            }
            declarations.push(format!("  {}: {};", token.css_name, rendered));
        }

        if declarations.is_empty() && !is_default {
            continue;
        }

        css.push_str(&scope.open);
        css.push('\n');
        for declaration in &declarations {
            css.push_str(declaration);
            css.push('\n');
        }
        css.push_str(&scope.close);
        css.push_str("\n\n");
    }

    css
}

fn render_value(
    token: &FlatToken,
    value: &str,
    resolver: &ResolverMap,
    mode: &str,
    default_mode: &str,
    options: &EmitOptions,
) -> String {
    if options.prefer_alias && var_reference(value).is_some() {
        return value.to_owned();
    }

    let resolved = resolve_final_value(value, resolver, mode, default_mode);
    match &options.float_unit {
        Some(unit)
            if token.resolved_type == ResolvedType::Float && resolved.parse::<f64>().is_ok() =>
        {
            format!("{resolved}{unit}")
        }
        _ => resolved,
    }
}

/// Prepends the generated-file banner to an emitted stylesheet.
#[must_use]
pub fn render_css_file(source: &str, body: &str) -> String {
    format!("/* AUTO-GENERATED from {source}. Do not edit. */\n\n{body}")
}
