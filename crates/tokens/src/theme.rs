//! Projects resolved tokens into an MUI `ThemeOptions`-shaped object.
//!
//! Every slot is filled from an explicit candidate table; slots without a
//! matching token are left out of the output.

use serde::Serialize;
use tracing::debug;

use crate::context::{TokenPath, TokenSource};

/// Light or dark palette, derived from the selected mode's name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteMode {
    /// Light surfaces.
    #[default]
    Light,
    /// Dark surfaces.
    Dark,
}

impl PaletteMode {
    /// Modes whose name mentions `dark` produce a dark palette.
    #[must_use]
    pub fn from_mode_name(mode: &str) -> Self {
        if mode.to_lowercase().contains("dark") {
            PaletteMode::Dark
        } else {
            PaletteMode::Light
        }
    }

    /// Lowercase label, as MUI expects it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            PaletteMode::Light => "light",
            PaletteMode::Dark => "dark",
        }
    }
}

/// Shades of one palette role.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaletteColor {
    /// Main shade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main: Option<String>,
    /// Lighter shade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub light: Option<String>,
    /// Darker shade.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub dark: Option<String>,
    /// Foreground rendered atop [`PaletteColor::main`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contrast_text: Option<String>,
}

impl PaletteColor {
    /// Returns `true` if no shade was found.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.main.is_none()
            && self.light.is_none()
            && self.dark.is_none()
            && self.contrast_text.is_none()
    }
}

/// Page and surface backgrounds.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Background {
    /// Page background.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Surface background for cards and sheets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paper: Option<String>,
}

/// Text colours.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TextColors {
    /// Body text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary: Option<String>,
    /// De-emphasized text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secondary: Option<String>,
    /// Disabled text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disabled: Option<String>,
}

/// Colour section of the theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Palette {
    /// Light or dark.
    pub mode: PaletteMode,
    /// Brand primary.
    #[serde(skip_serializing_if = "PaletteColor::is_empty")]
    pub primary: PaletteColor,
    /// Brand secondary.
    #[serde(skip_serializing_if = "PaletteColor::is_empty")]
    pub secondary: PaletteColor,
    /// Error states.
    #[serde(skip_serializing_if = "PaletteColor::is_empty")]
    pub error: PaletteColor,
    /// Warning states.
    #[serde(skip_serializing_if = "PaletteColor::is_empty")]
    pub warning: PaletteColor,
    /// Informational states.
    #[serde(skip_serializing_if = "PaletteColor::is_empty")]
    pub info: PaletteColor,
    /// Success states.
    #[serde(skip_serializing_if = "PaletteColor::is_empty")]
    pub success: PaletteColor,
    /// Backgrounds.
    pub background: Background,
    /// Text colours.
    pub text: TextColors,
    /// Divider lines.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub divider: Option<String>,
}

/// Type scale basics.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Typography {
    /// Font family stack.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    /// Base font size in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    /// Regular weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight_regular: Option<f64>,
    /// Medium weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight_medium: Option<f64>,
    /// Bold weight.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_weight_bold: Option<f64>,
}

/// Corner rounding.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Shape {
    /// Default border radius in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub border_radius: Option<f64>,
}

/// The assembled theme.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ThemeOptions {
    /// Colours.
    pub palette: Palette,
    /// Typography.
    pub typography: Typography,
    /// Spacing unit in pixels.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    /// Corner rounding.
    pub shape: Shape,
}

struct ColorSlots {
    main: TokenPath<'static>,
    light: TokenPath<'static>,
    dark: TokenPath<'static>,
    contrast_text: TokenPath<'static>,
}

macro_rules! color_slots {
    ($role:literal) => {
        ColorSlots {
            main: TokenPath::new(
                concat!("palette.", $role, ".main"),
                &[concat!($role, "-main"), concat!($role, "-default"), $role],
            ),
            light: TokenPath::new(
                concat!("palette.", $role, ".light"),
                &[concat!($role, "-light")],
            ),
            dark: TokenPath::new(
                concat!("palette.", $role, ".dark"),
                &[concat!($role, "-dark")],
            ),
            contrast_text: TokenPath::new(
                concat!("palette.", $role, ".contrastText"),
                &[
                    concat!($role, "-contrast-text"),
                    concat!($role, "-contrast"),
                    concat!("on-", $role),
                ],
            ),
        }
    };
}

const PRIMARY: ColorSlots = color_slots!("primary");
const SECONDARY: ColorSlots = color_slots!("secondary");
const ERROR: ColorSlots = color_slots!("error");
const WARNING: ColorSlots = color_slots!("warning");
const INFO: ColorSlots = color_slots!("info");
const SUCCESS: ColorSlots = color_slots!("success");

const BACKGROUND_DEFAULT: TokenPath<'static> = TokenPath::new(
    "palette.background.default",
    &["background-default", "background", "surface-background"],
);
const BACKGROUND_PAPER: TokenPath<'static> = TokenPath::new(
    "palette.background.paper",
    &["background-paper", "surface-paper", "surface"],
);
const TEXT_PRIMARY: TokenPath<'static> =
    TokenPath::new("palette.text.primary", &["text-primary", "on-surface", "foreground"]);
const TEXT_SECONDARY: TokenPath<'static> =
    TokenPath::new("palette.text.secondary", &["text-secondary", "on-surface-variant"]);
const TEXT_DISABLED: TokenPath<'static> =
    TokenPath::new("palette.text.disabled", &["text-disabled", "disabled"]);
const DIVIDER: TokenPath<'static> =
    TokenPath::new("palette.divider", &["divider", "border-default", "border"]);

const FONT_FAMILY: TokenPath<'static> = TokenPath::new(
    "typography.fontFamily",
    &["font-family-base", "font-family", "typography-font-family"],
);
const FONT_SIZE: TokenPath<'static> = TokenPath::new(
    "typography.fontSize",
    &["font-size-base", "font-size-md", "font-size-body", "font-size"],
);
const FONT_WEIGHT_REGULAR: TokenPath<'static> = TokenPath::new(
    "typography.fontWeightRegular",
    &["font-weight-regular", "font-weight-normal"],
);
const FONT_WEIGHT_MEDIUM: TokenPath<'static> =
    TokenPath::new("typography.fontWeightMedium", &["font-weight-medium"]);
const FONT_WEIGHT_BOLD: TokenPath<'static> =
    TokenPath::new("typography.fontWeightBold", &["font-weight-bold"]);

const SPACING: TokenPath<'static> =
    TokenPath::new("spacing", &["spacing-base", "spacing-unit", "spacing-sm", "spacing"]);
const BORDER_RADIUS: TokenPath<'static> = TokenPath::new(
    "shape.borderRadius",
    &["border-radius-base", "border-radius-md", "radius-md", "border-radius", "radius"],
);

/// Builds a theme from the source's currently selected mode.
pub fn assemble_theme<S: TokenSource + ?Sized>(source: &mut S) -> ThemeOptions {
    let mode = PaletteMode::from_mode_name(source.mode());
    debug!(mode = %source.mode(), palette = mode.as_str(), "assembling theme");

    ThemeOptions {
        palette: Palette {
            mode,
            primary: palette_color(source, &PRIMARY),
            secondary: palette_color(source, &SECONDARY),
            error: palette_color(source, &ERROR),
            warning: palette_color(source, &WARNING),
            info: palette_color(source, &INFO),
            success: palette_color(source, &SUCCESS),
            background: Background {
                default: text(source, &BACKGROUND_DEFAULT),
                paper: text(source, &BACKGROUND_PAPER),
            },
            text: TextColors {
                primary: text(source, &TEXT_PRIMARY),
                secondary: text(source, &TEXT_SECONDARY),
                disabled: text(source, &TEXT_DISABLED),
            },
            divider: text(source, &DIVIDER),
        },
        typography: Typography {
            font_family: text(source, &FONT_FAMILY),
            font_size: number(source, &FONT_SIZE),
            font_weight_regular: number(source, &FONT_WEIGHT_REGULAR),
            font_weight_medium: number(source, &FONT_WEIGHT_MEDIUM),
            font_weight_bold: number(source, &FONT_WEIGHT_BOLD),
        },
        spacing: number(source, &SPACING),
        shape: Shape {
            border_radius: number(source, &BORDER_RADIUS),
        },
    }
}

fn palette_color<S: TokenSource + ?Sized>(source: &mut S, slots: &ColorSlots) -> PaletteColor {
    PaletteColor {
        main: text(source, &slots.main),
        light: text(source, &slots.light),
        dark: text(source, &slots.dark),
        contrast_text: text(source, &slots.contrast_text),
    }
}

fn text<S: TokenSource + ?Sized>(source: &mut S, path: &TokenPath<'_>) -> Option<String> {
    source.lookup(path).ok()
}

fn number<S: TokenSource + ?Sized>(source: &mut S, path: &TokenPath<'_>) -> Option<f64> {
    let value = text(source, path)?;
    let parsed = parse_length(&value);
    if parsed.is_none() {
        debug!(slot = %path.slot, %value, "slot value is not numeric");
    }
    parsed
}

/// Parses `12`, `12px` or `0.75rem` (as `12`, assuming a 16px root).
#[must_use]
pub fn parse_length(value: &str) -> Option<f64> {
    let value = value.trim();
    if let Some(rem) = value.strip_suffix("rem") {
        return rem.trim().parse::<f64>().ok().map(|rem| rem * 16.0);
    }
    value
        .strip_suffix("px")
        .unwrap_or(value)
        .trim()
        .parse()
        .ok()
}
