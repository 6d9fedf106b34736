//! Version markers inside `__init__.py`.

use once_cell::sync::Lazy;
use regex::Regex;

use super::{MetadataError, MetadataResult};

static INIT_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"__version__\s*=\s*['"]([^'"]+)['"]"#).expect("valid __version__ pattern")
});

static BL_INFO_VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"['"]version['"]\s*:\s*\(([^)]*)\)"#).expect("valid bl_info pattern")
});

/// Maximum number of tuple segments kept from `bl_info['version']`.
const MAX_TUPLE_SEGMENTS: usize = 3;

/// Extract `__version__ = "X.Y.Z"` from `__init__.py` source.
pub fn parse_init_version(text: &str, file: &str) -> MetadataResult<String> {
    INIT_VERSION
        .captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| MetadataError::InitVersionNotFound {
            file: file.to_string(),
        })
}

/// Extract the `bl_info` version tuple, e.g. `(1, 10, 6)` -> `"1.10.6"`.
///
/// Non-numeric segments are dropped and at most three are kept.
pub fn parse_bl_info_version(text: &str, file: &str) -> MetadataResult<String> {
    let inner = BL_INFO_VERSION
        .captures(text)
        .and_then(|c| c.get(1))
        .ok_or_else(|| MetadataError::BlInfoVersionNotFound {
            file: file.to_string(),
        })?;

    let parts: Vec<&str> = inner
        .as_str()
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
        .take(MAX_TUPLE_SEGMENTS)
        .collect();

    if parts.is_empty() {
        return Err(MetadataError::EmptyVersionTuple {
            file: file.to_string(),
        });
    }
    Ok(parts.join("."))
}

#[cfg(test)]
mod tests {
    use super::*;

    const INIT_PY: &str = r#"
bl_info = {
	'name': 'Render Queue Manager',
	'version': (1, 10, 6),  # operator tooltips
	'blender': (3, 0, 0),
}

__version__ = "1.10.6"
"#;

    #[test]
    fn finds_dunder_version() {
        assert_eq!(parse_init_version(INIT_PY, "__init__.py").unwrap(), "1.10.6");
        assert_eq!(
            parse_init_version("__version__='0.1.0-beta'", "__init__.py").unwrap(),
            "0.1.0-beta"
        );
    }

    #[test]
    fn missing_dunder_version() {
        let err = parse_init_version("bl_info = {}", "__init__.py").unwrap_err();
        assert_eq!(err.to_string(), "Failed to locate __version__ in __init__.py");
    }

    #[test]
    fn bl_info_tuple_ignores_blender_key() {
        assert_eq!(parse_bl_info_version(INIT_PY, "__init__.py").unwrap(), "1.10.6");
    }

    #[test]
    fn bl_info_tuple_keeps_three_numeric_segments() {
        let text = "bl_info = {'version': (2, 3, 4, 5)}";
        assert_eq!(parse_bl_info_version(text, "__init__.py").unwrap(), "2.3.4");

        let text = "bl_info = {\"version\": (1, 'beta', 2)}";
        assert_eq!(parse_bl_info_version(text, "__init__.py").unwrap(), "1.2");
    }

    #[test]
    fn bl_info_tuple_missing_or_empty() {
        let err = parse_bl_info_version("bl_info = {}", "__init__.py").unwrap_err();
        assert!(matches!(err, MetadataError::BlInfoVersionNotFound { .. }));

        let err = parse_bl_info_version("bl_info = {'version': ('a',)}", "__init__.py").unwrap_err();
        assert!(matches!(err, MetadataError::EmptyVersionTuple { .. }));
    }
}
