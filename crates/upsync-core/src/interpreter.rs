//! Python interpreter detection for the runner script.
//!
//! Candidates are tried in order, `python` first, then `python3`. An
//! explicit override skips detection entirely.

use std::path::{Path, PathBuf};

use crate::error::{Result, SyncError};

pub const CANDIDATES: [&str; 2] = ["python", "python3"];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpreter {
    pub name: String,
    pub path: PathBuf,
}

/// Find the first candidate on `PATH`.
pub fn detect() -> Result<Interpreter> {
    detect_with(|name| which::which(name).ok())
}

/// Detection with an injectable lookup.
pub fn detect_with<F>(lookup: F) -> Result<Interpreter>
where
    F: Fn(&str) -> Option<PathBuf>,
{
    for name in CANDIDATES {
        if let Some(path) = lookup(name) {
            tracing::debug!(name, path = %path.display(), "found interpreter");
            return Ok(Interpreter {
                name: name.to_string(),
                path,
            });
        }
    }
    Err(SyncError::InterpreterNotFound {
        tried: CANDIDATES.join(", "),
    })
}

/// Use `explicit` when given, resolving bare names through `PATH`;
/// otherwise detect.
pub fn resolve(explicit: Option<&Path>) -> Result<Interpreter> {
    let Some(explicit) = explicit else {
        return detect();
    };
    let name = explicit
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| explicit.display().to_string());
    let path = which::which(explicit).map_err(|_| SyncError::InterpreterNotFound {
        tried: explicit.display().to_string(),
    })?;
    Ok(Interpreter { name, path })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_python_over_python3() {
        let found = detect_with(|name| Some(PathBuf::from(format!("/usr/bin/{name}")))).unwrap();
        assert_eq!(found.name, "python");
    }

    #[test]
    fn falls_back_to_python3() {
        let found = detect_with(|name| {
            (name == "python3").then(|| PathBuf::from("/usr/bin/python3"))
        })
        .unwrap();
        assert_eq!(found.name, "python3");
        assert_eq!(found.path, PathBuf::from("/usr/bin/python3"));
    }

    #[test]
    fn neither_found_is_an_error() {
        let err = detect_with(|_| None).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Python interpreter not found (tried: python, python3)"
        );
    }

    #[test]
    fn explicit_missing_interpreter_errors() {
        let err = resolve(Some(Path::new("/definitely/not/here/python9"))).unwrap_err();
        assert!(matches!(err, SyncError::InterpreterNotFound { .. }));
    }
}
