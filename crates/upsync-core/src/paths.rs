use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// File constants
// ---------------------------------------------------------------------------

pub const CONFIG_FILE: &str = ".upsync.yaml";
pub const GIT_DIR: &str = ".git";
pub const GITATTRIBUTES: &str = ".gitattributes";
pub const DEFAULT_SCRIPT: &str = "sync_upstream.py";

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

pub fn config_path(root: &Path) -> PathBuf {
    root.join(CONFIG_FILE)
}

pub fn gitattributes_path(root: &Path) -> PathBuf {
    root.join(GITATTRIBUTES)
}

/// `.git` is a directory in a normal clone and a file inside a submodule
/// checkout, so only existence is checked.
pub fn is_git_root(root: &Path) -> bool {
    root.join(GIT_DIR).exists()
}

/// Resolve `script` against `root` unless it is already absolute.
pub fn script_path(root: &Path, script: &Path) -> PathBuf {
    if script.is_absolute() {
        script.to_path_buf()
    } else {
        root.join(script)
    }
}
