//! Report file discovery.
//!
//! A search pattern holds one glob per line, in the style of the GitHub
//! Actions `path` input. Lines starting with `!` exclude matches, blank lines
//! and `#` comments are ignored. Symbolic links are never followed: a match
//! that is itself a link, or that is reached through a linked directory
//! below the pattern's literal base, is dropped.

use std::collections::BTreeSet;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result};
use glob::{MatchOptions, Pattern, glob_with};
use tracing::debug;

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// Parsed multi-line search pattern.
#[derive(Debug, Clone)]
pub struct SearchPattern {
    includes: Vec<String>,
    excludes: Vec<Pattern>,
}

impl SearchPattern {
    pub fn parse(source: &str) -> Result<Self> {
        let mut includes = Vec::new();
        let mut excludes = Vec::new();

        for line in source.lines().map(str::trim) {
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some(negated) = line.strip_prefix('!') {
                let pattern = Pattern::new(negated.trim())
                    .with_context(|| format!("Invalid exclude pattern '{}'", negated))?;
                excludes.push(pattern);
            } else {
                Pattern::new(line).with_context(|| format!("Invalid pattern '{}'", line))?;
                includes.push(line.to_string());
            }
        }

        Ok(Self { includes, excludes })
    }

    pub fn is_empty(&self) -> bool {
        self.includes.is_empty()
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.excludes
            .iter()
            .any(|pattern| pattern.matches_path_with(path, MATCH_OPTIONS))
    }
}

/// Expand `pattern` into the sorted, de-duplicated list of matching files.
pub fn discover(pattern: &str) -> Result<Vec<PathBuf>> {
    let search = SearchPattern::parse(pattern)?;
    let mut found = BTreeSet::new();

    for include in &search.includes {
        let base = literal_base(include);
        let entries = glob_with(include, MATCH_OPTIONS)
            .with_context(|| format!("Invalid pattern '{}'", include))?;

        for entry in entries {
            let path = entry.with_context(|| format!("Failed to read match of '{}'", include))?;
            if !path.is_file() || search.is_excluded(&path) {
                continue;
            }
            if crosses_symlink(&path, &base) {
                debug!(path = %path.display(), "Skipping report reached through a symlink");
                continue;
            }
            found.insert(path);
        }
    }

    debug!(pattern, files = found.len(), "Discovered report files");
    Ok(found.into_iter().collect())
}

/// Leading components of `pattern` that contain no glob metacharacters.
fn literal_base(pattern: &str) -> PathBuf {
    Path::new(pattern)
        .components()
        .take_while(|component| match component {
            Component::Normal(part) => !part.to_string_lossy().contains(['*', '?', '[']),
            _ => true,
        })
        .collect()
}

fn crosses_symlink(path: &Path, base: &Path) -> bool {
    path.ancestors()
        .take_while(|ancestor| *ancestor != base && ancestor.starts_with(base))
        .filter(|ancestor| !ancestor.as_os_str().is_empty())
        .any(|ancestor| {
            std::fs::symlink_metadata(ancestor)
                .map(|meta| meta.file_type().is_symlink())
                .unwrap_or(false)
        })
}
