//! Hand-off to the Python runner script.
//!
//! The wrapper resolves an interpreter, forwards at most one mode flag, waits
//! for the child, and reports its exit code unchanged.

use std::fmt;
use std::path::Path;
use std::process::Command;

use crate::config::Config;
use crate::error::Result;
use crate::interpreter::Interpreter;

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// How the runner is asked to behave for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    Interactive,
    DryRun,
    Action(String),
}

impl Mode {
    /// Dry-run takes precedence over an action.
    pub fn from_flags(dry_run: bool, action: Option<String>) -> Self {
        match (dry_run, action) {
            (true, _) => Mode::DryRun,
            (false, Some(name)) => Mode::Action(name),
            (false, None) => Mode::Interactive,
        }
    }

    /// Flags passed through to the runner.
    pub fn forwarded_args(&self) -> Vec<String> {
        match self {
            Mode::Interactive => Vec::new(),
            Mode::DryRun => vec!["--dry-run".to_string()],
            Mode::Action(name) => vec!["--action".to_string(), name.clone()],
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mode::Interactive => f.write_str("interactive"),
            Mode::DryRun => f.write_str("dry-run"),
            Mode::Action(name) => write!(f, "action:{name}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Next steps
// ---------------------------------------------------------------------------

/// The checklist shown after every run.
pub fn next_steps(config: &Config) -> [String; 4] {
    [
        "Resolve any remaining conflicts".to_string(),
        format!("Commit: git commit -m '{}'", config.commit_message),
        format!("Push: git push {} {}", config.push_remote, config.branch),
        "Update the submodule reference in the parent repository".to_string(),
    ]
}

// ---------------------------------------------------------------------------
// Launch
// ---------------------------------------------------------------------------

pub fn build_command(interpreter: &Interpreter, script: &Path, mode: &Mode, root: &Path) -> Command {
    let mut cmd = Command::new(&interpreter.path);
    cmd.arg(script);
    cmd.args(mode.forwarded_args());
    cmd.current_dir(root);
    cmd
}

/// Run the script to completion with the terminal attached. Returns the
/// child's exit code; death by signal maps to 1.
pub fn launch(interpreter: &Interpreter, script: &Path, mode: &Mode, root: &Path) -> Result<i32> {
    if !script.exists() {
        tracing::warn!(script = %script.display(), "runner script not found; the interpreter will report it");
    }
    let mut cmd = build_command(interpreter, script, mode, root);
    tracing::debug!(
        interpreter = %interpreter.path.display(),
        script = %script.display(),
        %mode,
        "launching runner"
    );
    let status = cmd.status()?;
    Ok(status.code().unwrap_or(1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn dry_run_wins_over_action() {
        let mode = Mode::from_flags(true, Some("status".to_string()));
        assert_eq!(mode, Mode::DryRun);
        assert_eq!(mode.forwarded_args(), vec!["--dry-run"]);
    }

    #[test]
    fn action_forwards_name() {
        let mode = Mode::from_flags(false, Some("status".to_string()));
        assert_eq!(mode.forwarded_args(), vec!["--action", "status"]);
        assert_eq!(mode.to_string(), "action:status");
    }

    #[test]
    fn no_flags_forwards_nothing() {
        let mode = Mode::from_flags(false, None);
        assert_eq!(mode, Mode::Interactive);
        assert!(mode.forwarded_args().is_empty());
    }

    #[test]
    fn command_line_layout() {
        let interp = Interpreter {
            name: "python3".to_string(),
            path: PathBuf::from("/usr/bin/python3"),
        };
        let cmd = build_command(
            &interp,
            Path::new("/repo/sync_upstream.py"),
            &Mode::Action("status".to_string()),
            Path::new("/repo"),
        );
        assert_eq!(cmd.get_program(), "/usr/bin/python3");
        let args: Vec<_> = cmd.get_args().map(|a| a.to_string_lossy().into_owned()).collect();
        assert_eq!(args, vec!["/repo/sync_upstream.py", "--action", "status"]);
        assert_eq!(cmd.get_current_dir(), Some(Path::new("/repo")));
    }

    #[test]
    fn checklist_uses_config() {
        let steps = next_steps(&Config::default());
        assert_eq!(steps[1], "Commit: git commit -m 'sync: upstream update'");
        assert_eq!(steps[2], "Push: git push origin main");
        assert!(steps[3].contains("submodule"));
    }
}
