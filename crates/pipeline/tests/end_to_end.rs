use std::fs;
use std::path::Path;

use pipeline::{build, run, BuildConfig, PipelineError};
use serde_json::{json, Value};
use tempfile::tempdir;
use tokens::RawExport;

fn fixture() -> Value {
    json!({
        "meta": {
            "variableCollections": {
                "VariableCollectionId:core": {
                    "id": "VariableCollectionId:core",
                    "name": "Core",
                    "modes": [{ "modeId": "1:0", "name": "Default" }],
                    "defaultModeId": "1:0",
                    "variableIds": ["VariableID:1", "VariableID:2"]
                },
                "VariableCollectionId:theme": {
                    "id": "VariableCollectionId:theme",
                    "name": "Theme",
                    "modes": [
                        { "modeId": "2:0", "name": "Light" },
                        { "modeId": "2:1", "name": "Dark" }
                    ],
                    "defaultModeId": "2:0",
                    "variableIds": ["VariableID:3"]
                }
            },
            "variables": {
                "VariableID:1": {
                    "id": "VariableID:1",
                    "name": "spacing/sm",
                    "resolvedType": "FLOAT",
                    "valuesByMode": { "1:0": 8 },
                    "variableCollectionId": "VariableCollectionId:core"
                },
                "VariableID:2": {
                    "id": "VariableID:2",
                    "name": "color/blue/700",
                    "resolvedType": "STRING",
                    "valuesByMode": { "1:0": "#1976d2" },
                    "variableCollectionId": "VariableCollectionId:core"
                },
                "VariableID:3": {
                    "id": "VariableID:3",
                    "name": "primary/main",
                    "resolvedType": "STRING",
                    "valuesByMode": {
                        "2:0": { "type": "VARIABLE_ALIAS", "id": "VariableID:2" },
                        "2:1": "#90caf9"
                    },
                    "variableCollectionId": "VariableCollectionId:theme"
                }
            }
        }
    })
}

fn export(value: &Value) -> RawExport {
    serde_json::from_value(value.clone()).unwrap()
}

fn literal_config() -> BuildConfig {
    BuildConfig {
        prefer_alias: false,
        ..BuildConfig::default()
    }
}

fn config_in(dir: &Path, fixture: &Value) -> BuildConfig {
    let input = dir.join("figma-variables.json");
    fs::write(&input, serde_json::to_vec_pretty(fixture).unwrap()).unwrap();
    BuildConfig {
        input,
        out_dir: dir.join("out"),
        ..literal_config()
    }
}

#[test]
fn core_collection_emits_root_block() {
    let output = build(&export(&fixture()), &literal_config()).unwrap();
    let core = &output.collections[0];
    assert_eq!(core.slug, "core");
    assert_eq!(
        core.css,
        "/* AUTO-GENERATED from Core. Do not edit. */\n\n\
         :root {\n  --core-color-blue-700: #1976d2;\n  --core-spacing-sm: 8;\n}\n\n"
    );
}

#[test]
fn theme_modes_resolve_across_collections() {
    let output = build(&export(&fixture()), &literal_config()).unwrap();
    let theme = &output.collections[1];
    assert_eq!(
        theme.css,
        "/* AUTO-GENERATED from Theme. Do not edit. */\n\n\
         :root {\n  --theme-primary-main: #1976d2;\n}\n\n\
         [data-theme=\"dark\"] {\n  --theme-primary-main: #90caf9;\n}\n\n"
    );
    assert_eq!(
        theme.mui_flat.get("theme-primary-main.valuesByMode.Light").map(String::as_str),
        Some("#1976d2")
    );
    assert_eq!(
        theme.mui_flat.get("theme-primary-main.valuesByMode.Dark").map(String::as_str),
        Some("#90caf9")
    );
}

#[test]
fn theme_css_keeps_aliases_when_preferred() {
    let output = build(&export(&fixture()), &BuildConfig::default()).unwrap();
    assert!(output.collections[1]
        .css
        .contains("  --theme-primary-main: var(--core-color-blue-700);\n"));
    assert!(output.collections[0].css.contains("  --core-spacing-sm: 8;\n"));
}

#[test]
fn themes_are_assembled_per_mode() {
    let output = build(&export(&fixture()), &literal_config()).unwrap();
    let modes: Vec<&str> = output.themes.iter().map(|(mode, _)| mode.as_str()).collect();
    assert_eq!(modes, ["Light", "Dark"]);

    let light = serde_json::to_value(&output.themes[0].1).unwrap();
    assert_eq!(light["palette"]["mode"], "light");
    assert_eq!(light["palette"]["primary"]["main"], "#1976d2");

    let dark = serde_json::to_value(&output.themes[1].1).unwrap();
    assert_eq!(dark["palette"]["mode"], "dark");
    assert_eq!(dark["palette"]["primary"]["main"], "#90caf9");
}

#[test]
fn alias_cycles_in_core_are_fatal() {
    let mut fixture = fixture();
    let variables = &mut fixture["meta"]["variables"];
    variables["VariableID:1"]["valuesByMode"]["1:0"] =
        json!({ "type": "VARIABLE_ALIAS", "id": "VariableID:2" });
    variables["VariableID:2"]["valuesByMode"]["1:0"] =
        json!({ "type": "VARIABLE_ALIAS", "id": "VariableID:1" });

    let err = build(&export(&fixture), &literal_config()).unwrap_err();
    assert!(matches!(&err, PipelineError::Resolve { collection, .. } if collection == "Core"));
    assert!(err.to_string().contains("alias cycle detected"));
}

#[test]
fn run_writes_every_output() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path(), &fixture());
    let report = run(&config, false).unwrap();
    assert!(!report.skipped);

    let names: Vec<String> = report
        .written
        .iter()
        .map(|path| path.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(
        names,
        [
            "core.json",
            "core.css",
            "core.mui-flat.json",
            "theme.json",
            "theme.css",
            "theme.mui-flat.json",
            "tokens.css",
            "theme.light.json",
            "theme.dark.json",
        ]
    );

    let aggregate = fs::read_to_string(config.out_dir.join("tokens.css")).unwrap();
    assert!(aggregate.starts_with("/* AUTO-GENERATED from Core. Do not edit. */"));
    assert!(aggregate.contains("/* AUTO-GENERATED from Theme. Do not edit. */"));

    let flat: Value =
        serde_json::from_str(&fs::read_to_string(config.out_dir.join("core.json")).unwrap())
            .unwrap();
    assert_eq!(flat["core-spacing-sm"]["cssName"], "--core-spacing-sm");
    assert_eq!(flat["core-spacing-sm"]["type"], "FLOAT");
    assert_eq!(flat["core-spacing-sm"]["valuesByMode"]["Default"], "8");
}

#[test]
fn rebuilds_are_byte_identical() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path(), &fixture());
    run(&config, true).unwrap();
    let first = fs::read(config.out_dir.join("tokens.css")).unwrap();
    let first_theme = fs::read(config.out_dir.join("theme.mui-flat.json")).unwrap();

    run(&config, true).unwrap();
    assert_eq!(fs::read(config.out_dir.join("tokens.css")).unwrap(), first);
    assert_eq!(
        fs::read(config.out_dir.join("theme.mui-flat.json")).unwrap(),
        first_theme
    );
}

#[test]
fn unchanged_input_is_skipped_unless_forced() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path(), &fixture());

    let first = run(&config, false).unwrap();
    let second = run(&config, false).unwrap();
    assert!(second.skipped);
    assert!(second.written.is_empty());
    assert_eq!(first.digest, second.digest);

    let forced = run(&config, true).unwrap();
    assert!(!forced.skipped);

    let mut changed = fixture();
    changed["meta"]["variables"]["VariableID:1"]["valuesByMode"]["1:0"] = json!(12);
    fs::write(&config.input, serde_json::to_vec(&changed).unwrap()).unwrap();
    let rebuilt = run(&config, false).unwrap();
    assert!(!rebuilt.skipped);
    assert_ne!(rebuilt.digest, first.digest);
    let core = fs::read_to_string(config.out_dir.join("core.css")).unwrap();
    assert!(core.contains("  --core-spacing-sm: 12;\n"));
}

#[test]
fn missing_input_is_reported() {
    let dir = tempdir().unwrap();
    let config = BuildConfig {
        input: dir.path().join("absent.json"),
        out_dir: dir.path().join("out"),
        ..BuildConfig::default()
    };
    assert!(matches!(run(&config, false), Err(PipelineError::MissingInput(_))));
}

#[test]
fn changed_settings_rebuild_an_unchanged_input() {
    let dir = tempdir().unwrap();
    let config = config_in(dir.path(), &fixture());
    let first = run(&config, false).unwrap();
    assert!(!first.skipped);

    let with_unit = BuildConfig {
        float_unit: Some("px".into()),
        ..config.clone()
    };
    let second = run(&with_unit, false).unwrap();
    assert!(!second.skipped);
    assert_ne!(second.digest, first.digest);
    let core = fs::read_to_string(config.out_dir.join("core.css")).unwrap();
    assert!(core.contains("  --core-spacing-sm: 8px;\n"));

    assert!(run(&with_unit, false).unwrap().skipped);
}
