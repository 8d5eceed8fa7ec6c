//! Normalizes Figma names into kebab-case identifiers and CSS custom-property
//! names.

use heck::ToKebabCase;

/// Converts free text into a kebab-case identifier.
///
/// camelCase and PascalCase boundaries are split, runs of other characters
/// collapse into a single hyphen, and `/` is kept as a hierarchy separator.
#[must_use]
pub fn kebab(text: &str) -> String {
    text.split('/')
        .map(|segment| segment.to_kebab_case())
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Kebab-cased collection name without a trailing `-collection`.
#[must_use]
pub fn collection_slug(name: &str) -> String {
    let slug = kebab(name).replace('/', "-");
    match slug.strip_suffix("-collection") {
        Some(stripped) if !stripped.is_empty() => stripped.to_owned(),
        _ => slug,
    }
}

/// Builds the `--prefix-segments` custom-property name of a variable.
///
/// The prefix is not repeated when the kebabbed path already starts with it,
/// and a leading path segment that matches the first word of a multi-word
/// prefix is folded into that prefix.
#[must_use]
pub fn css_var_name(prefix: &str, figma_name: &str) -> String {
    let segments: Vec<String> = figma_name
        .split('/')
        .map(|segment| segment.to_kebab_case())
        .filter(|segment| !segment.is_empty())
        .collect();
    let joined = segments.join("-");

    if prefix.is_empty() {
        return format!("--{joined}");
    }
    if starts_with_word(&joined, prefix) {
        return format!("--{joined}");
    }

    let rest = match segments.split_first() {
        Some((first, rest)) if prefix.starts_with(&format!("{first}-")) => rest.join("-"),
        _ => joined,
    };

    if rest.is_empty() {
        format!("--{prefix}")
    } else {
        format!("--{prefix}-{rest}")
    }
}

/// Strips the leading `--` of a custom-property name.
#[must_use]
pub fn plain_name(css_name: &str) -> &str {
    css_name.trim_start_matches('-')
}

fn starts_with_word(name: &str, prefix: &str) -> bool {
    name == prefix
        || name
            .strip_prefix(prefix)
            .is_some_and(|rest| rest.starts_with('-'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kebab_splits_case_and_punctuation() {
        assert_eq!(kebab("fontSize"), "font-size");
        assert_eq!(kebab("  Primary Color!! "), "primary-color");
        assert_eq!(kebab("Colors/Primary Main"), "colors/primary-main");
        assert_eq!(kebab("--leading"), "leading");
    }

    #[test]
    fn collection_slug_drops_suffix() {
        assert_eq!(collection_slug("Lighthouse Theme"), "lighthouse-theme");
        assert_eq!(collection_slug("Core Collection"), "core");
        assert_eq!(collection_slug("Collection"), "collection");
    }

    #[test]
    fn css_name_folds_prefix_word() {
        assert_eq!(
            css_var_name("lighthouse-theme", "Lighthouse/Status/status-arrived/default"),
            "--lighthouse-theme-status-status-arrived-default"
        );
    }

    #[test]
    fn css_name_does_not_repeat_prefix() {
        assert_eq!(css_var_name("core", "Core/spacing/sm"), "--core-spacing-sm");
        assert_eq!(css_var_name("core", "spacing/sm"), "--core-spacing-sm");
        assert_eq!(css_var_name("core", "coreless/x"), "--core-coreless-x");
        assert_eq!(css_var_name("core", "fontSize/Body"), "--core-font-size-body");
    }

    #[test]
    fn plain_name_strips_dashes() {
        assert_eq!(plain_name("--core-spacing-sm"), "core-spacing-sm");
    }
}
