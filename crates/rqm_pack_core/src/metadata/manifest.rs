//! `blender_manifest.toml` parsing.

use serde::Serialize;
use toml::{Table, Value};

use super::{MetadataError, MetadataResult};

/// Parsed extension manifest.
///
/// Only `id` and `version` are required; the rest is informational.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtensionManifest {
    pub id: String,
    pub version: String,
    pub name: Option<String>,
    pub tagline: Option<String>,
    pub maintainer: Option<String>,
    /// Manifest `type` (usually "add-on").
    pub kind: Option<String>,
    pub schema_version: Option<String>,
    pub blender_version_min: Option<String>,
    pub blender_version_max: Option<String>,
    pub license: Vec<String>,
}

/// Parse manifest text. `file` is used in error messages.
///
/// Required keys are looked up in the top-level table only.
pub fn parse_manifest(text: &str, file: &str) -> MetadataResult<ExtensionManifest> {
    let table: Table = toml::from_str(text).map_err(|source| MetadataError::ManifestSyntax {
        file: file.to_string(),
        source,
    })?;

    let id = required_string(&table, "id", file)?;
    let version = required_string(&table, "version", file)?;

    let license = match table.get("license") {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(|s| s.trim().to_string())
            .collect(),
        Some(Value::String(s)) => vec![s.trim().to_string()],
        _ => Vec::new(),
    };

    Ok(ExtensionManifest {
        id,
        version,
        name: optional_string(&table, "name"),
        tagline: optional_string(&table, "tagline"),
        maintainer: optional_string(&table, "maintainer"),
        kind: optional_string(&table, "type"),
        schema_version: optional_string(&table, "schema_version"),
        blender_version_min: optional_string(&table, "blender_version_min"),
        blender_version_max: optional_string(&table, "blender_version_max"),
        license,
    })
}

fn required_string(table: &Table, key: &'static str, file: &str) -> MetadataResult<String> {
    let value = table.get(key).ok_or_else(|| MetadataError::MissingKey {
        key,
        file: file.to_string(),
    })?;

    let text = value.as_str().ok_or_else(|| MetadataError::InvalidKey {
        key,
        file: file.to_string(),
        message: format!("expected a string, found {}", value.type_str()),
    })?;

    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(MetadataError::InvalidKey {
            key,
            file: file.to_string(),
            message: "value is empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

fn optional_string(table: &Table, key: &str) -> Option<String> {
    table
        .get(key)
        .and_then(Value::as_str)
        .map(|s| s.trim().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
schema_version = "1.0.0"
id = "render_queue_manager_x"
version = "1.10.6"
name = "Render Queue Manager"
tagline = "Queue renders with per-job folders"
maintainer = "Xnom3d"
type = "add-on"
blender_version_min = "4.2.0"
license = ["SPDX:GPL-3.0-or-later"]
"#;

    #[test]
    fn parses_full_manifest() {
        let manifest = parse_manifest(MANIFEST, "blender_manifest.toml").unwrap();
        assert_eq!(manifest.id, "render_queue_manager_x");
        assert_eq!(manifest.version, "1.10.6");
        assert_eq!(manifest.kind.as_deref(), Some("add-on"));
        assert_eq!(manifest.blender_version_min.as_deref(), Some("4.2.0"));
        assert_eq!(manifest.blender_version_max, None);
        assert_eq!(manifest.license, vec!["SPDX:GPL-3.0-or-later".to_string()]);
    }

    #[test]
    fn trims_values() {
        let manifest = parse_manifest("id = \" my_ext \"\nversion = \" 0.2.0\"\n", "m.toml").unwrap();
        assert_eq!(manifest.id, "my_ext");
        assert_eq!(manifest.version, "0.2.0");
    }

    #[test]
    fn missing_id_is_descriptive() {
        let err = parse_manifest("version = \"1.0.0\"\n", "blender_manifest.toml").unwrap_err();
        assert!(matches!(err, MetadataError::MissingKey { key: "id", .. }));
        assert!(err.to_string().contains("id"));
    }

    #[test]
    fn missing_version_is_descriptive() {
        let err = parse_manifest("id = \"x\"\n", "blender_manifest.toml").unwrap_err();
        assert!(matches!(err, MetadataError::MissingKey { key: "version", .. }));
    }

    #[test]
    fn nested_keys_do_not_count() {
        let text = "[build]\nid = \"x\"\nversion = \"1.0.0\"\n";
        let err = parse_manifest(text, "blender_manifest.toml").unwrap_err();
        assert!(matches!(err, MetadataError::MissingKey { key: "id", .. }));
    }

    #[test]
    fn non_string_version_rejected() {
        let err = parse_manifest("id = \"x\"\nversion = 1\n", "m.toml").unwrap_err();
        assert!(matches!(err, MetadataError::InvalidKey { key: "version", .. }));
    }

    #[test]
    fn syntax_error_reported() {
        let err = parse_manifest("id = \n", "m.toml").unwrap_err();
        assert!(matches!(err, MetadataError::ManifestSyntax { .. }));
    }
}
