//! In-process upstream sync runner.
//!
//! Implements the runner contract the wrapper forwards to: interactive menu,
//! `--dry-run`, and `--action <name>`. All git work goes through [`Git`];
//! questions go through a [`Prompt`] so the interactive paths can be driven
//! from tests.

pub mod action;
pub mod prompt;
pub mod selection;

use chrono::{DateTime, Utc};
use colored::Colorize;
use serde::Serialize;
use std::fmt::Display;

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::exclude::ExclusionSet;
use crate::git::Git;
use crate::launcher::Mode;
use crate::protect;
use crate::report::{self, ChangeSummary, DiffStat};

pub use action::Action;
pub use prompt::{Prompt, TerminalPrompt};
pub use selection::{parse_selection, Selection};

#[cfg(test)]
pub use prompt::ScriptedPrompt;

const HEADER_WIDTH: usize = 60;

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub remote: String,
    pub reference: String,
    pub latest_commit: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FileChange {
    pub path: String,
    #[serde(flatten)]
    pub stat: DiffStat,
}

#[derive(Debug, Clone, Serialize)]
pub struct DryRunReport {
    pub fetch: FetchReport,
    pub files: Vec<FileChange>,
    pub summary: ChangeSummary,
    pub excluded: Vec<String>,
}

/// Extra inputs for non-interactive actions.
#[derive(Debug, Clone, Default)]
pub struct ActionOptions {
    /// Skip the confirmation before `apply`.
    pub yes: bool,
    /// Files for `select`.
    pub files: Vec<String>,
}

// ---------------------------------------------------------------------------
// UpstreamSync
// ---------------------------------------------------------------------------

pub struct UpstreamSync<P: Prompt> {
    git: Git,
    config: Config,
    exclusions: ExclusionSet,
    prompt: P,
    json: bool,
}

impl<P: Prompt> UpstreamSync<P> {
    pub fn new(git: Git, config: Config, prompt: P) -> Result<Self> {
        let exclusions = ExclusionSet::new(&config.excluded)?;
        Ok(Self {
            git,
            config,
            exclusions,
            prompt,
            json: false,
        })
    }

    /// Emit JSON on stdout for reports; progress text moves to stderr.
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }

    pub fn prompt(&self) -> &P {
        &self.prompt
    }

    pub fn run(&mut self, mode: &Mode, opts: &ActionOptions) -> Result<()> {
        tracing::debug!(%mode, root = %self.git.root().display(), "native runner");
        match mode {
            Mode::Interactive => self.interactive(),
            Mode::DryRun => self.dry_run().map(|_| ()),
            Mode::Action(name) => {
                let action: Action = name.parse()?;
                self.action(action, opts)
            }
        }
    }

    // -----------------------------------------------------------------------
    // Output helpers
    // -----------------------------------------------------------------------

    fn say(&self, msg: impl Display) {
        if self.json {
            eprintln!("{msg}");
        } else {
            println!("{msg}");
        }
    }

    fn emit_json<T: Serialize>(&self, value: &T) -> Result<()> {
        println!("{}", serde_json::to_string_pretty(value)?);
        Ok(())
    }

    fn section_header(&self, text: &str) {
        let rule = "=".repeat(HEADER_WIDTH);
        self.say(format!("\n{}", rule.cyan().bold()));
        self.say(format!("{:^width$}", text, width = HEADER_WIDTH).cyan().bold());
        self.say(rule.cyan().bold());
    }

    // -----------------------------------------------------------------------
    // Sync steps
    // -----------------------------------------------------------------------

    /// Make sure the upstream remote exists. Interactive runs offer to add it.
    pub fn ensure_remote(&mut self, interactive: bool) -> Result<()> {
        let name = self.config.remote.clone();
        if self.git.has_remote(&name)? {
            return Ok(());
        }
        self.say(format!("Remote '{name}' is not configured").yellow().bold());
        if interactive && !self.config.remote_url.trim().is_empty() {
            let question = format!("Add it as {}? (Y/n): ", self.config.remote_url);
            if self.prompt.confirm(&question, true) {
                self.git.add_remote(&name, &self.config.remote_url)?;
                self.say(format!("Added remote '{name}'").green().bold());
                return Ok(());
            }
        }
        Err(SyncError::RemoteMissing { name })
    }

    pub fn fetch(&self) -> Result<FetchReport> {
        let remote = &self.config.remote;
        let reference = self.config.upstream_ref();
        self.say(format!("Fetching {remote}...").blue());
        self.git.fetch(remote)?;
        let latest_commit = self.git.latest_commit(&reference)?;

        self.say("Upstream fetched".green().bold());
        if let Some(commit) = &latest_commit {
            self.say(format!("   Latest commit: {}", report::truncate_chars(commit, 60)).blue());
        }
        tracing::info!(%reference, "fetched upstream");

        Ok(FetchReport {
            remote: remote.clone(),
            reference,
            latest_commit,
            fetched_at: Utc::now(),
        })
    }

    /// Files changed upstream, minus the excluded ones.
    pub fn changed_files(&self) -> Result<Vec<String>> {
        let all = self.git.changed_files(&self.config.upstream_ref())?;
        let total = all.len();
        let kept = self.exclusions.filter(all);
        tracing::debug!(total, kept = kept.len(), "filtered upstream changes");
        Ok(kept)
    }

    fn file_changes(&self, files: &[String]) -> Result<Vec<FileChange>> {
        let reference = self.config.upstream_ref();
        files
            .iter()
            .map(|path| {
                let diff = self.git.file_diff(&reference, path)?;
                Ok(FileChange {
                    path: path.clone(),
                    stat: DiffStat::from_diff(&diff),
                })
            })
            .collect()
    }

    fn print_groups(&self, files: &[String]) {
        self.say(format!("\n{} updatable file(s)", files.len()).blue());
        for (group, members) in report::group_by_top_dir(files) {
            self.say(format!("\n{}", format!("{group}/").cyan().bold()));
            for file in members {
                self.say(format!("  • {file}").blue());
            }
        }
    }

    pub fn show_summary(&self, files: &[String]) -> ChangeSummary {
        let summary = ChangeSummary::from_files(files);
        if summary.total > 0 {
            self.say(format!("\n{}", "Update summary:".blue()));
            self.say(format!("  Files: {}", summary.total).blue());
            self.say("  By type:".blue());
            for (ext, count) in &summary.extensions {
                self.say(format!("    {ext}: {count}").blue());
            }
        }
        summary
    }

    fn print_up_to_date(&self) {
        self.say(format!("\n{}", "Already up to date, nothing to sync".green().bold()));
        self.say(format!("Excluded: {}", self.exclusions.git_paths().join(", ")).blue());
    }

    // -----------------------------------------------------------------------
    // Operations
    // -----------------------------------------------------------------------

    /// List changes grouped by directory, then show per-file diffs.
    pub fn preview(&mut self, files: &[String], interactive: bool) -> Result<()> {
        if self.json {
            let changes = self.file_changes(files)?;
            return self.emit_json(&changes);
        }

        if files.is_empty() {
            self.say("No files to update".yellow().bold());
            return Ok(());
        }

        self.print_groups(files);
        if interactive && !self.prompt.confirm("\nShow diffs? (y/N): ", false) {
            return Ok(());
        }

        let reference = self.config.upstream_ref();
        for (idx, file) in files.iter().enumerate() {
            self.section_header(&format!("File {}/{}: {}", idx + 1, files.len(), file));
            let diff = self.git.file_diff(&reference, file)?;
            if diff.is_empty() {
                self.say("(no textual change or binary file)".yellow());
            } else {
                for line in diff.lines() {
                    self.say(report::colorize_diff_line(line));
                }
                let stat = DiffStat::from_diff(&diff);
                self.say(format!("\nChanges: +{} -{}", stat.added, stat.removed).blue());
            }

            if interactive && idx + 1 < files.len() {
                match self.prompt.ask("\nEnter for the next file, q to stop: ") {
                    Some(answer) if !answer.trim().eq_ignore_ascii_case("q") => {}
                    _ => break,
                }
            }
        }
        Ok(())
    }

    /// Merge upstream without committing, then put excluded paths back to
    /// their local versions.
    pub fn apply_all(&mut self, files: &[String], skip_confirm: bool) -> Result<bool> {
        if files.is_empty() {
            self.say("No files to update".yellow().bold());
            return Ok(false);
        }

        self.say(format!("\nAbout to apply updates to {} file(s)", files.len()).yellow().bold());
        for file in files {
            self.say(format!("  • {file}"));
        }
        if !skip_confirm && !self.prompt.confirm("\nApply all updates? (y/N): ", false) {
            self.say("Cancelled".blue());
            return Ok(false);
        }

        self.say("\nApplying updates...".blue());
        let reference = self.config.upstream_ref();
        self.git.merge_no_commit(&reference)?;
        self.restore_excluded()?;

        self.say("\nUpdates staged".green().bold());
        self.git.show_status()?;
        Ok(true)
    }

    /// Check out individual files from upstream. Interactive runs pick from a
    /// numbered list; otherwise `requested` must name changed files.
    pub fn select(
        &mut self,
        files: &[String],
        interactive: bool,
        requested: &[String],
    ) -> Result<usize> {
        if files.is_empty() {
            self.say("No files to update".yellow().bold());
            return Ok(0);
        }

        let selected: Vec<String> = if interactive {
            match self.pick_files(files) {
                Some(selected) => selected,
                None => return Ok(0),
            }
        } else {
            if requested.is_empty() {
                return Err(SyncError::InvalidSelection(
                    "pass one or more --file <path>".to_string(),
                ));
            }
            for path in requested {
                if !files.contains(path) {
                    return Err(SyncError::InvalidSelection(format!(
                        "'{path}' has no pending upstream change"
                    )));
                }
            }
            requested.to_vec()
        };

        self.say("\nChecking out selected files...".blue());
        let reference = self.config.upstream_ref();
        let mut updated = 0;
        let mut failed = Vec::new();
        for file in &selected {
            self.say(format!("  • {file}").blue());
            if self.take_upstream(&reference, file)? {
                updated += 1;
            } else {
                tracing::warn!(%file, "checkout from upstream failed");
                self.say(format!("    could not take {file} from {reference}").red());
                failed.push(file.clone());
            }
        }

        self.say(format!("\nUpdated {updated} file(s)").green().bold());
        self.git.show_status()?;
        if !interactive && !failed.is_empty() {
            return Err(SyncError::GitFailed {
                command: format!("checkout {reference} -- {}", failed.join(" ")),
                code: 1,
            });
        }
        Ok(updated)
    }

    /// Bring one file to its upstream state: check it out, or remove it when
    /// upstream deleted it.
    fn take_upstream(&self, reference: &str, file: &str) -> Result<bool> {
        if self.git.path_exists_in(reference, file)? {
            return self.git.checkout_path(reference, file);
        }
        tracing::debug!(%file, "deleted upstream, removing");
        self.git.remove_path(file)?;
        Ok(true)
    }

    /// After a merge: drop excluded files the merge added, then put the
    /// remaining excluded paths back to their `HEAD` versions.
    fn restore_excluded(&self) -> Result<()> {
        for path in self.git.staged_additions()? {
            if self.exclusions.is_excluded(&path) {
                tracing::debug!(%path, "excluded path added by merge, dropping");
                self.git.remove_path(&path)?;
            }
        }
        for target in self.exclusions.restore_targets() {
            if !self.git.checkout_path("HEAD", &target)? {
                tracing::debug!(%target, "excluded path not in HEAD, dropping merged copy");
                self.git.remove_path(&target)?;
            }
        }
        Ok(())
    }

    fn pick_files(&mut self, files: &[String]) -> Option<Vec<String>> {
        self.say(format!("\nChoose files to update ({} total):", files.len()).blue());
        for (i, file) in files.iter().enumerate() {
            self.say(format!("  [{:2}] {file}", i + 1));
        }

        loop {
            let answer = self
                .prompt
                .ask("\nFile numbers (comma separated, a = all, q = quit): ")?;
            match parse_selection(&answer, files.len()) {
                Ok(Selection::Quit) => return None,
                Ok(Selection::All) => return Some(files.to_vec()),
                Ok(Selection::Indices(indices)) => {
                    return Some(indices.into_iter().map(|i| files[i].clone()).collect())
                }
                Err(e) => self.say(e.to_string().red().bold()),
            }
        }
    }

    /// Report unresolved merge conflicts and how to resolve them.
    pub fn check_conflicts(&mut self, interactive: bool) -> Result<Vec<String>> {
        self.say("\nChecking for conflicts...".blue());
        let conflicts = self.git.unmerged_files()?;

        if conflicts.is_empty() {
            self.say("No unresolved conflicts".green().bold());
            if self.git.status_text()?.contains("All conflicts fixed") {
                self.say("All conflicts are fixed, the merge can be committed".blue());
            }
            return Ok(conflicts);
        }

        self.say(format!("{} conflicted file(s):", conflicts.len()).red().bold());
        for file in &conflicts {
            self.say(format!("  ⚡ {file}").red());
        }
        self.say(format!("\n{}", "To resolve:".yellow().bold()));
        self.say(format!("  1. Inspect: {}", "git diff".blue()));
        self.say(format!(
            "  2. Edit the files and remove the markers ({}, {}, {})",
            "<<<<<<<".red(),
            "=======".yellow(),
            ">>>>>>>".green()
        ));
        self.say(format!("  3. Mark resolved: {}", "git add <file>".blue()));
        self.say(format!("  4. Finish the merge: {}", "git commit".blue()));

        if interactive && self.prompt.confirm("\nOpen conflicted files in VS Code? (y/N): ", false) {
            self.open_in_editor(&conflicts);
        }
        Ok(conflicts)
    }

    fn open_in_editor(&self, files: &[String]) {
        let Ok(code) = which::which("code") else {
            tracing::warn!("VS Code ('code') not found on PATH");
            return;
        };
        for file in files {
            if !self.git.root().join(file).exists() {
                continue;
            }
            if let Err(e) = std::process::Command::new(&code)
                .arg(file)
                .current_dir(self.git.root())
                .status()
            {
                tracing::warn!(%file, error = %e, "failed to open editor");
            }
        }
    }

    pub fn protect(&self) -> Result<bool> {
        let written = protect::ensure_merge_protection(&self.git, &self.exclusions)?;
        if written {
            self.say("Created merge protection in .gitattributes".blue());
        } else {
            self.say(".gitattributes already present, merge driver registered".blue());
        }
        Ok(written)
    }

    // -----------------------------------------------------------------------
    // Modes
    // -----------------------------------------------------------------------

    /// Report what would change without touching the working tree.
    pub fn dry_run(&mut self) -> Result<DryRunReport> {
        self.ensure_remote(false)?;
        let fetch = self.fetch()?;
        let files = self.changed_files()?;
        let changes = self.file_changes(&files)?;
        let report = DryRunReport {
            fetch,
            summary: ChangeSummary::from_files(&files),
            files: changes,
            excluded: self.exclusions.git_paths(),
        };

        if self.json {
            self.emit_json(&report)?;
            return Ok(report);
        }

        self.section_header("Dry run");
        if files.is_empty() {
            self.print_up_to_date();
        } else {
            self.print_groups(&files);
            self.show_summary(&files);
            self.say(format!("\n{}", "Per-file changes:".blue()));
            for change in &report.files {
                self.say(format!(
                    "  {} {} {}",
                    format!("+{}", change.stat.added).green(),
                    format!("-{}", change.stat.removed).red(),
                    change.path
                ));
            }
        }
        self.say(format!("\n{}", "Dry run: nothing was merged or checked out".yellow()));
        Ok(report)
    }

    pub fn action(&mut self, action: Action, opts: &ActionOptions) -> Result<()> {
        if action.needs_fetch() {
            self.ensure_remote(false)?;
        }
        match action {
            Action::Status => self.git.show_status(),
            Action::Fetch => {
                let report = self.fetch()?;
                if self.json {
                    self.emit_json(&report)?;
                }
                Ok(())
            }
            Action::Summary => {
                self.fetch()?;
                let files = self.changed_files()?;
                if self.json {
                    return self.emit_json(&ChangeSummary::from_files(&files));
                }
                if files.is_empty() {
                    self.print_up_to_date();
                } else {
                    self.show_summary(&files);
                }
                Ok(())
            }
            Action::Preview => {
                self.fetch()?;
                let files = self.changed_files()?;
                self.preview(&files, false)
            }
            Action::Apply => {
                self.protect()?;
                self.fetch()?;
                let files = self.changed_files()?;
                self.apply_all(&files, opts.yes).map(|_| ())
            }
            Action::Select => {
                self.fetch()?;
                let files = self.changed_files()?;
                self.select(&files, false, &opts.files).map(|_| ())
            }
            Action::Conflicts => self.check_conflicts(false).map(|_| ()),
            Action::Protect => self.protect().map(|_| ()),
        }
    }

    /// Menu loop until the user quits or input ends.
    pub fn interactive(&mut self) -> Result<()> {
        if let Err(e) = self.protect() {
            tracing::warn!(error = %e, "merge protection setup failed");
        }

        loop {
            self.section_header("Upstream sync");
            self.ensure_remote(true)?;
            self.fetch()?;

            let files = self.changed_files()?;
            if files.is_empty() {
                self.print_up_to_date();
            } else {
                self.show_summary(&files);
            }

            self.say(format!("\n{}", "Choose an action:".cyan().bold()));
            for entry in [
                "1. Preview all changes (coloured diff)",
                "2. Apply all updates",
                "3. Select files interactively",
                "4. Check conflicts",
                "5. Show status",
                "6. Fetch again",
                "0. Quit",
            ] {
                self.say(format!("  {}", entry.blue()));
            }

            let Some(choice) = self.prompt.ask("\nAction (0-6): ") else {
                break;
            };
            let result = match choice.trim() {
                "0" => break,
                "1" => self.preview(&files, true),
                "2" => self.apply_all(&files, false).map(|_| ()),
                "3" => self.select(&files, true, &[]).map(|_| ()),
                "4" => self.check_conflicts(true).map(|_| ()),
                "5" => self.git.show_status(),
                "6" => continue,
                other => {
                    self.say(format!("Invalid choice '{other}', try again").red().bold());
                    Ok(())
                }
            };

            if let Err(e) = result {
                tracing::warn!(error = %e, "action failed");
                self.say(format!("error: {e}").red().bold());
            }

            match self.prompt.ask("\nEnter to return to the menu, 0 to quit: ") {
                Some(answer) if answer.trim() != "0" => {}
                _ => break,
            }
        }

        self.say("Goodbye!".green().bold());
        Ok(())
    }
}
