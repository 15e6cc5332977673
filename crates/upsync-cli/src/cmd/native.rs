use colored::Colorize;
use std::path::Path;
use upsync_core::{
    config::Config,
    git::Git,
    launcher::Mode,
    runner::{ActionOptions, TerminalPrompt, UpstreamSync},
};

/// Run the built-in runner. Failures are reported here and turned into exit
/// status 1, the same contract the Python runner has with the wrapper.
pub fn run(
    root: &Path,
    config: Config,
    mode: &Mode,
    opts: &ActionOptions,
    json: bool,
) -> anyhow::Result<i32> {
    let result = Git::open(root)
        .and_then(|git| UpstreamSync::new(git, config, TerminalPrompt))
        .and_then(|sync| sync.with_json(json).run(mode, opts));

    match result {
        Ok(()) => Ok(0),
        Err(e) => {
            tracing::debug!(error = ?e, "native runner failed");
            eprintln!("{} {e}", "error:".red().bold());
            Ok(1)
        }
    }
}
