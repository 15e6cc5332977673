#![allow(deprecated)]
use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

const CHECKLIST_TAIL: &str = "Update the submodule reference in the parent repository";

/// `upsync` rooted in `dir` with an empty `PATH` unless a test adds to it.
fn upsync(dir: &TempDir) -> Command {
    let mut cmd = Command::cargo_bin("upsync").unwrap();
    cmd.current_dir(dir.path())
        .env("UPSYNC_ROOT", dir.path())
        .env("NO_COLOR", "1")
        .env_remove("UPSYNC_PYTHON")
        .env_remove("RUST_LOG");
    cmd
}

// ---------------------------------------------------------------------------
// help
// ---------------------------------------------------------------------------

#[test]
fn help_flag_exits_zero_without_syncing() {
    let dir = TempDir::new().unwrap();
    for flag in ["-Help", "-help", "--help", "-h"] {
        upsync(&dir)
            .arg(flag)
            .env("PATH", dir.path())
            .assert()
            .success()
            .stdout(predicate::str::contains("Usage"))
            .stdout(predicate::str::contains(CHECKLIST_TAIL).not());
    }
}

// ---------------------------------------------------------------------------
// interpreter detection
// ---------------------------------------------------------------------------

#[test]
fn missing_interpreter_exits_one() {
    let dir = TempDir::new().unwrap();
    let empty_path = dir.path().join("empty-bin");
    std::fs::create_dir_all(&empty_path).unwrap();

    upsync(&dir)
        .env("PATH", &empty_path)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Python interpreter not found"))
        .stdout(predicate::str::contains(CHECKLIST_TAIL).not());
}

#[test]
fn explicit_missing_interpreter_exits_one() {
    let dir = TempDir::new().unwrap();
    upsync(&dir)
        .args(["--python", "/nonexistent/python"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("Python interpreter not found"));
}

// ---------------------------------------------------------------------------
// forwarding (unix: fake interpreters are shell scripts)
// ---------------------------------------------------------------------------

#[cfg(unix)]
mod forwarding {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::{Path, PathBuf};

    /// Install a fake interpreter that prints its arguments and exits `code`.
    fn fake_python(dir: &Path, name: &str, code: i32) -> PathBuf {
        let bin = dir.join("bin");
        std::fs::create_dir_all(&bin).unwrap();
        let path = bin.join(name);
        std::fs::write(
            &path,
            format!("#!/bin/sh\necho \"ARGS: $*\"\nexit {code}\n"),
        )
        .unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
        bin
    }

    fn forwarded_line(stdout: &[u8]) -> String {
        String::from_utf8_lossy(stdout)
            .lines()
            .find(|l| l.starts_with("ARGS: "))
            .expect("runner was not invoked")
            .to_string()
    }

    #[test]
    fn dry_run_forwards_only_dry_run() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 0);

        let out = upsync(&dir).arg("-DryRun").env("PATH", &bin).assert().success();
        let line = forwarded_line(&out.get_output().stdout);
        assert!(line.ends_with("sync_upstream.py --dry-run"), "{line}");
        assert!(!line.contains("--action"));
    }

    #[test]
    fn dry_run_wins_over_action() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 0);

        let out = upsync(&dir)
            .args(["-DryRun", "-Action", "status"])
            .env("PATH", &bin)
            .assert()
            .success();
        let line = forwarded_line(&out.get_output().stdout);
        assert!(line.contains("--dry-run"));
        assert!(!line.contains("--action"));
    }

    #[test]
    fn action_forwards_name_without_dry_run() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 0);

        let out = upsync(&dir)
            .args(["-Action", "status"])
            .env("PATH", &bin)
            .assert()
            .success();
        let line = forwarded_line(&out.get_output().stdout);
        assert!(line.ends_with("sync_upstream.py --action status"), "{line}");
        assert!(!line.contains("--dry-run"));
    }

    #[test]
    fn no_flags_forwards_nothing() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 0);

        let out = upsync(&dir).env("PATH", &bin).assert().success();
        let line = forwarded_line(&out.get_output().stdout);
        assert!(line.ends_with("sync_upstream.py"), "{line}");
    }

    #[test]
    fn checklist_follows_every_mode() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 0);

        for args in [vec![], vec!["--dry-run"], vec!["--action", "status"]] {
            upsync(&dir)
                .args(&args)
                .env("PATH", &bin)
                .assert()
                .success()
                .stdout(predicate::str::contains("Next steps:"))
                .stdout(predicate::str::contains("git commit -m 'sync: upstream update'"))
                .stdout(predicate::str::contains("git push origin main"))
                .stdout(predicate::str::contains(CHECKLIST_TAIL));
        }
    }

    #[test]
    fn runner_exit_code_passes_through() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 3);

        upsync(&dir)
            .env("PATH", &bin)
            .assert()
            .code(3)
            .stdout(predicate::str::contains(CHECKLIST_TAIL));
    }

    #[test]
    fn falls_back_to_python3() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python3", 0);

        upsync(&dir)
            .arg("--dry-run")
            .env("PATH", &bin)
            .assert()
            .success()
            .stdout(predicate::str::contains("ARGS: "));
    }

    #[test]
    fn script_comes_from_config() {
        let dir = TempDir::new().unwrap();
        let bin = fake_python(dir.path(), "python", 0);
        std::fs::write(
            dir.path().join(".upsync.yaml"),
            "script: tools/sync.py\npush_remote: fork\n",
        )
        .unwrap();

        let out = upsync(&dir)
            .env("PATH", &bin)
            .assert()
            .success()
            .stdout(predicate::str::contains("git push fork main"));
        let line = forwarded_line(&out.get_output().stdout);
        assert!(line.ends_with("tools/sync.py"), "{line}");
    }
}

// ---------------------------------------------------------------------------
// native runner
// ---------------------------------------------------------------------------

fn git(dir: &std::path::Path, args: &[&str]) {
    let status = std::process::Command::new("git")
        .args(args)
        .current_dir(dir)
        .env("GIT_AUTHOR_NAME", "upsync")
        .env("GIT_AUTHOR_EMAIL", "upsync@example.com")
        .env("GIT_COMMITTER_NAME", "upsync")
        .env("GIT_COMMITTER_EMAIL", "upsync@example.com")
        .env("GIT_CONFIG_NOSYSTEM", "1")
        .status()
        .unwrap();
    assert!(status.success(), "git {args:?} failed");
}

/// Upstream repo plus a fork at `<tmp>/fork` with an `upstream` remote.
/// With `ahead`, upstream gains a commit the fork lacks.
fn fork_of_upstream(tmp: &TempDir, ahead: bool) -> std::path::PathBuf {
    let upstream = tmp.path().join("upstream");
    let fork = tmp.path().join("fork");
    std::fs::create_dir_all(&upstream).unwrap();
    git(&upstream, &["init", "-q"]);
    git(&upstream, &["symbolic-ref", "HEAD", "refs/heads/main"]);
    std::fs::write(upstream.join("main.py"), "v1\n").unwrap();
    git(&upstream, &["add", "-A"]);
    git(&upstream, &["-c", "commit.gpgsign=false", "commit", "-q", "-m", "initial"]);

    git(tmp.path(), &["clone", "-q", upstream.to_str().unwrap(), fork.to_str().unwrap()]);
    git(&fork, &["config", "user.name", "upsync"]);
    git(&fork, &["config", "user.email", "upsync@example.com"]);
    git(&fork, &["remote", "add", "upstream", upstream.to_str().unwrap()]);

    if ahead {
        std::fs::write(upstream.join("main.py"), "v2\n").unwrap();
        git(&upstream, &["-c", "commit.gpgsign=false", "commit", "-q", "-am", "v2"]);
    }
    fork
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .is_ok()
}

#[test]
fn native_json_preview_without_changes_prints_empty_list() {
    if !git_available() {
        eprintln!("skipping: git not found");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let fork = fork_of_upstream(&tmp, false);

    let out = upsync(&tmp)
        .env("UPSYNC_ROOT", &fork)
        .args(["--native", "--json", "--action", "preview"])
        .assert()
        .success();
    let value: serde_json::Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(value, serde_json::json!([]));
}

#[test]
fn native_interactive_apply_prints_checklist_once() {
    if !git_available() {
        eprintln!("skipping: git not found");
        return;
    }
    let tmp = TempDir::new().unwrap();
    let fork = fork_of_upstream(&tmp, true);

    let out = upsync(&tmp)
        .env("UPSYNC_ROOT", &fork)
        .arg("--native")
        .write_stdin("2\ny\n0\n")
        .assert()
        .success();
    let stdout = String::from_utf8_lossy(&out.get_output().stdout);
    assert_eq!(stdout.matches("Next steps:").count(), 1, "{stdout}");
    assert_eq!(std::fs::read_to_string(fork.join("main.py")).unwrap(), "v2\n");
}

#[test]
fn native_outside_repository_fails_with_checklist() {
    let dir = TempDir::new().unwrap();
    upsync(&dir)
        .args(["--native", "--action", "status"])
        .assert()
        .code(1)
        .stderr(predicate::str::contains("not a git repository"))
        .stdout(predicate::str::contains(CHECKLIST_TAIL));
}

// ---------------------------------------------------------------------------
// init
// ---------------------------------------------------------------------------

#[test]
fn init_writes_default_config_once() {
    let dir = TempDir::new().unwrap();
    upsync(&dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created"));

    let content = std::fs::read_to_string(dir.path().join(".upsync.yaml")).unwrap();
    assert!(content.contains("remote: upstream"));
    assert!(content.contains("branch: main"));

    std::fs::write(dir.path().join(".upsync.yaml"), "branch: develop\n").unwrap();
    upsync(&dir)
        .arg("--init")
        .assert()
        .success()
        .stdout(predicate::str::contains("left unchanged"));
    let content = std::fs::read_to_string(dir.path().join(".upsync.yaml")).unwrap();
    assert_eq!(content, "branch: develop\n");
}

#[test]
fn init_json_reports_warnings() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(".upsync.yaml"), "excluded: ['(']\n").unwrap();

    let out = upsync(&dir).args(["--init", "--json"]).assert().success();
    let value: serde_json::Value = serde_json::from_slice(&out.get_output().stdout).unwrap();
    assert_eq!(value["created"], false);
    assert_eq!(value["warnings"][0]["level"], "error");
}
