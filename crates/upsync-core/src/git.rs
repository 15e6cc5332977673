//! Synchronous wrapper over the `git` binary.
//!
//! Every call runs with the repository root as working directory and
//! `core.quotePath=false`, so non-ASCII file names come back verbatim rather
//! than C-quoted. Captured output is decoded lossily so non-UTF-8 file names
//! never abort a run.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{Result, SyncError};
use crate::paths;

/// Captured result of a git invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GitOutput {
    pub stdout: String,
    pub code: i32,
}

impl GitOutput {
    pub fn success(&self) -> bool {
        self.code == 0
    }

    /// Non-empty trimmed lines of stdout.
    pub fn lines(&self) -> Vec<String> {
        self.stdout
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone)]
pub struct Git {
    root: PathBuf,
    binary: PathBuf,
}

impl Git {
    /// Open the repository at `root`, checking that it is a git checkout and
    /// that `git` is on `PATH`.
    pub fn open(root: &Path) -> Result<Self> {
        if !paths::is_git_root(root) {
            return Err(SyncError::NotARepository(root.display().to_string()));
        }
        let binary = which::which("git").map_err(|_| SyncError::GitNotFound)?;
        Ok(Self {
            root: root.to_path_buf(),
            binary,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.args(["-c", "core.quotePath=false"])
            .args(args)
            .current_dir(&self.root);
        cmd
    }

    /// Run git and capture stdout. Stderr is captured and logged, not shown.
    pub fn capture(&self, args: &[&str]) -> Result<GitOutput> {
        tracing::debug!(args = ?args, "git capture");
        let output = self
            .command(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()?;
        let code = output.status.code().unwrap_or(1);
        if code != 0 {
            tracing::debug!(
                code,
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "git exited non-zero"
            );
        }
        Ok(GitOutput {
            stdout: String::from_utf8_lossy(&output.stdout).trim().to_string(),
            code,
        })
    }

    /// Run git with the terminal attached and return its exit code.
    pub fn stream(&self, args: &[&str]) -> Result<i32> {
        tracing::debug!(args = ?args, "git stream");
        let status = self.command(args).status()?;
        Ok(status.code().unwrap_or(1))
    }

    fn check(&self, args: &[&str]) -> Result<GitOutput> {
        let out = self.capture(args)?;
        if !out.success() {
            return Err(SyncError::GitFailed {
                command: args.join(" "),
                code: out.code,
            });
        }
        Ok(out)
    }

    // -----------------------------------------------------------------------
    // Remotes
    // -----------------------------------------------------------------------

    pub fn has_remote(&self, name: &str) -> Result<bool> {
        let out = self.check(&["remote"])?;
        Ok(out.lines().iter().any(|r| r == name))
    }

    pub fn add_remote(&self, name: &str, url: &str) -> Result<()> {
        self.check(&["remote", "add", name, url])?;
        Ok(())
    }

    pub fn fetch(&self, remote: &str) -> Result<()> {
        let out = self.capture(&["fetch", remote])?;
        if !out.success() {
            return Err(SyncError::FetchFailed {
                remote: remote.to_string(),
            });
        }
        Ok(())
    }

    /// One-line description of the tip of `reference`, if it resolves.
    pub fn latest_commit(&self, reference: &str) -> Result<Option<String>> {
        let out = self.capture(&["log", "-1", "--oneline", reference])?;
        if out.success() && !out.stdout.is_empty() {
            Ok(Some(out.stdout))
        } else {
            Ok(None)
        }
    }

    // -----------------------------------------------------------------------
    // Diffs
    // -----------------------------------------------------------------------

    /// Files that differ between `HEAD` and `reference`.
    pub fn changed_files(&self, reference: &str) -> Result<Vec<String>> {
        let range = format!("HEAD..{reference}");
        let out = self.check(&["diff", "--name-only", &range])?;
        Ok(out.lines())
    }

    pub fn file_diff(&self, reference: &str, file: &str) -> Result<String> {
        let range = format!("HEAD..{reference}");
        let out = self.capture(&["diff", "--no-color", &range, "--", file])?;
        Ok(out.stdout)
    }

    /// Paths the index adds relative to `HEAD`, e.g. new files from a merge.
    pub fn staged_additions(&self) -> Result<Vec<String>> {
        let out = self.check(&["diff", "--cached", "--name-only", "--diff-filter=A", "HEAD"])?;
        Ok(out.lines())
    }

    /// Whether `path` exists in `treeish`.
    pub fn path_exists_in(&self, treeish: &str, path: &str) -> Result<bool> {
        let spec = format!("{treeish}:{path}");
        Ok(self.capture(&["cat-file", "-e", &spec])?.success())
    }

    /// Paths with unresolved merge conflicts.
    pub fn unmerged_files(&self) -> Result<Vec<String>> {
        let out = self.capture(&["diff", "--name-only", "--diff-filter=U"])?;
        Ok(out.lines())
    }

    // -----------------------------------------------------------------------
    // Working tree mutations
    // -----------------------------------------------------------------------

    /// `git merge --no-commit --no-ff <reference>`, output streamed.
    pub fn merge_no_commit(&self, reference: &str) -> Result<()> {
        let code = self.stream(&["merge", "--no-commit", "--no-ff", reference])?;
        if code != 0 {
            return Err(SyncError::MergeFailed {
                reference: reference.to_string(),
            });
        }
        Ok(())
    }

    /// `git checkout <treeish> -- <path>`; returns whether it succeeded.
    pub fn checkout_path(&self, treeish: &str, path: &str) -> Result<bool> {
        let out = self.capture(&["checkout", treeish, "--", path])?;
        Ok(out.success())
    }

    /// Drop `path` from the index and working tree. Used for excluded paths
    /// a merge introduced and for files upstream deleted.
    pub fn remove_path(&self, path: &str) -> Result<()> {
        self.check(&["rm", "-r", "-q", "-f", "--ignore-unmatch", "--", path])?;
        Ok(())
    }

    pub fn set_config(&self, key: &str, value: &str) -> Result<()> {
        self.check(&["config", key, value])?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Status
    // -----------------------------------------------------------------------

    pub fn status_text(&self) -> Result<String> {
        Ok(self.capture(&["status"])?.stdout)
    }

    pub fn status_porcelain(&self) -> Result<String> {
        Ok(self.check(&["status", "--porcelain"])?.stdout)
    }

    pub fn show_status(&self) -> Result<()> {
        self.stream(&["status"])?;
        Ok(())
    }
}
