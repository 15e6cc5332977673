//! Presentation helpers for pending upstream changes: grouping, per-extension
//! summary, diff statistics, and diff colouring.

use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::Path;

pub const ROOT_GROUP: &str = "(root)";
pub const NO_EXTENSION: &str = "(none)";

/// Group paths by their first component. Top-level files land in
/// [`ROOT_GROUP`]. Groups and their members are sorted.
pub fn group_by_top_dir(files: &[String]) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for file in files {
        let group = match file.split_once('/') {
            Some((top, _)) => top.to_string(),
            None => ROOT_GROUP.to_string(),
        };
        groups.entry(group).or_default().push(file.clone());
    }
    for members in groups.values_mut() {
        members.sort();
    }
    groups
}

// ---------------------------------------------------------------------------
// ChangeSummary
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangeSummary {
    pub total: usize,
    /// Extension (with leading dot) → file count.
    pub extensions: BTreeMap<String, usize>,
}

impl ChangeSummary {
    pub fn from_files(files: &[String]) -> Self {
        let mut extensions = BTreeMap::new();
        for file in files {
            let key = match Path::new(file).extension() {
                Some(ext) => format!(".{}", ext.to_string_lossy()),
                None => NO_EXTENSION.to_string(),
            };
            *extensions.entry(key).or_insert(0) += 1;
        }
        Self {
            total: files.len(),
            extensions,
        }
    }
}

// ---------------------------------------------------------------------------
// DiffStat
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiffStat {
    pub added: usize,
    pub removed: usize,
}

impl DiffStat {
    /// Count added/removed lines of a unified diff, ignoring file headers.
    pub fn from_diff(diff: &str) -> Self {
        let mut stat = DiffStat::default();
        for line in diff.lines() {
            if line.starts_with('+') && !line.starts_with("+++") {
                stat.added += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                stat.removed += 1;
            }
        }
        stat
    }
}

// ---------------------------------------------------------------------------
// Diff colouring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffLine {
    FileHeader,
    Meta,
    OldFile,
    NewFile,
    Hunk,
    Added,
    Removed,
    Context,
}

impl DiffLine {
    /// Order matters: `---`/`+++` headers must win over plain `-`/`+`.
    pub fn classify(line: &str) -> Self {
        if line.starts_with("diff --git") {
            DiffLine::FileHeader
        } else if line.starts_with("index") {
            DiffLine::Meta
        } else if line.starts_with("---") {
            DiffLine::OldFile
        } else if line.starts_with("+++") {
            DiffLine::NewFile
        } else if line.starts_with("@@") {
            DiffLine::Hunk
        } else if line.starts_with('+') {
            DiffLine::Added
        } else if line.starts_with('-') {
            DiffLine::Removed
        } else {
            DiffLine::Context
        }
    }
}

pub fn colorize_diff_line(line: &str) -> String {
    match DiffLine::classify(line) {
        DiffLine::FileHeader => line.cyan().to_string(),
        DiffLine::Meta => line.blue().to_string(),
        DiffLine::OldFile | DiffLine::Removed => line.red().to_string(),
        DiffLine::NewFile | DiffLine::Added => line.green().to_string(),
        DiffLine::Hunk => line.yellow().to_string(),
        DiffLine::Context => line.to_string(),
    }
}

/// Truncate to at most `max` characters, on a char boundary.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
