//! Paths that are never taken from upstream.
//!
//! Patterns are regular expressions matched from the start of the
//! repository-relative path (`^` is implied). The same patterns are turned
//! into plain git paths when writing `.gitattributes` or restoring files
//! after a merge.

use crate::error::{Result, SyncError};
use regex::Regex;

#[derive(Debug, Clone)]
pub struct ExclusionSet {
    patterns: Vec<(String, Regex)>,
}

impl ExclusionSet {
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                let p = p.as_ref();
                Regex::new(&format!("^(?:{p})"))
                    .map(|re| (p.to_string(), re))
                    .map_err(|source| SyncError::InvalidPattern {
                        pattern: p.to_string(),
                        source,
                    })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { patterns })
    }

    pub fn is_excluded(&self, path: &str) -> bool {
        self.patterns.iter().any(|(_, re)| re.is_match(path))
    }

    /// Keep only the paths no pattern matches, preserving order.
    pub fn filter(&self, paths: Vec<String>) -> Vec<String> {
        paths.into_iter().filter(|p| !self.is_excluded(p)).collect()
    }

    /// Plain git paths for each pattern, e.g. `^\.github/` → `.github/`.
    pub fn git_paths(&self) -> Vec<String> {
        self.patterns.iter().map(|(p, _)| to_git_path(p)).collect()
    }

    /// Paths handed to `git checkout HEAD -- <path>` after a merge.
    /// Directories lose their trailing slash.
    pub fn restore_targets(&self) -> Vec<String> {
        self.git_paths()
            .into_iter()
            .map(|p| p.trim_end_matches('/').to_string())
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}

/// Strip regex anchors and unescape dots.
pub fn to_git_path(pattern: &str) -> String {
    pattern
        .trim_matches(|c| c == '^' || c == '$')
        .replace(r"\.", ".")
}
