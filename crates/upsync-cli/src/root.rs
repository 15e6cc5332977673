use std::path::{Path, PathBuf};

/// Resolve the repository root.
///
/// Priority:
/// 1. `--root` flag / `UPSYNC_ROOT` env var (passed in as `explicit`)
/// 2. Walk upward from `cwd` looking for `.git` (directory or submodule gitfile)
/// 3. Fall back to `cwd`
pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
    if let Some(p) = explicit {
        return p.to_path_buf();
    }

    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    find_git_root(&cwd).unwrap_or(cwd)
}

fn find_git_root(start: &Path) -> Option<PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        if upsync_core::paths::is_git_root(&dir) {
            return Some(dir);
        }
        dir = dir.parent()?.to_path_buf();
    }
}
