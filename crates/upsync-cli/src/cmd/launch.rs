use anyhow::Context;
use std::path::Path;
use upsync_core::{config::Config, interpreter, launcher, launcher::Mode, paths};

/// Forward to the Python runner and return its exit code.
pub fn run(
    root: &Path,
    config: &Config,
    mode: &Mode,
    python: Option<&Path>,
    script: Option<&Path>,
) -> anyhow::Result<i32> {
    let interpreter = interpreter::resolve(python)?;
    let script = paths::script_path(root, script.unwrap_or(config.script.as_path()));

    let code = launcher::launch(&interpreter, &script, mode, root).with_context(|| {
        format!(
            "failed to run {} {}",
            interpreter.path.display(),
            script.display()
        )
    })?;
    if code != 0 {
        tracing::warn!(code, "runner exited non-zero");
    }
    Ok(code)
}
