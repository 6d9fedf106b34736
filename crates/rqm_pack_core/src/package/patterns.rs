//! Shell-style file name patterns for excluding build artifacts.

use std::path::Path;

use regex::Regex;

/// Set of file name patterns (`__pycache__`, `*.pyc`, `cache_?`).
///
/// Patterns match a single path component, never a full path.
#[derive(Debug, Clone, Default)]
pub struct ExcludePatterns {
    sources: Vec<String>,
    compiled: Vec<Regex>,
}

impl ExcludePatterns {
    /// Compile patterns; `*` matches any run of characters and `?` a single one.
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut sources = Vec::new();
        let mut compiled = Vec::new();
        for pattern in patterns {
            let pattern = pattern.as_ref().trim();
            if pattern.is_empty() {
                continue;
            }
            compiled.push(Regex::new(&glob_to_regex(pattern))?);
            sources.push(pattern.to_string());
        }
        Ok(Self { sources, compiled })
    }

    /// Patterns as written.
    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    /// Does this file name match any pattern?
    pub fn matches_name(&self, name: &str) -> bool {
        self.compiled.iter().any(|re| re.is_match(name))
    }

    /// Does any component of a relative path match?
    pub fn matches_path(&self, path: &Path) -> bool {
        path.components()
            .any(|c| self.matches_name(&c.as_os_str().to_string_lossy()))
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut out = String::with_capacity(pattern.len() + 2);
    out.push('^');
    for c in pattern.chars() {
        match c {
            '*' => out.push_str(".*"),
            '?' => out.push('.'),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    out
}
