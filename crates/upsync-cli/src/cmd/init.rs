use crate::output::{print_json, print_table};
use anyhow::Context;
use std::path::Path;
use upsync_core::{config::Config, paths};

/// Write a default `.upsync.yaml` unless one exists, then report validation
/// warnings for whatever is on disk.
pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let path = paths::config_path(root);
    let created = if path.exists() {
        false
    } else {
        Config::default()
            .save(root)
            .with_context(|| format!("failed to write {}", path.display()))?;
        true
    };

    let config = Config::load(root).context("failed to load config")?;
    let warnings = config.validate();

    if json {
        print_json(&serde_json::json!({
            "path": path.display().to_string(),
            "created": created,
            "warnings": warnings,
        }))?;
        return Ok(());
    }

    if created {
        println!("Created {}", path.display());
    } else {
        println!("{} already exists, left unchanged", path.display());
    }
    if warnings.is_empty() {
        println!("Config OK");
    } else {
        let rows: Vec<Vec<String>> = warnings
            .iter()
            .map(|w| vec![format!("{:?}", w.level).to_lowercase(), w.message.clone()])
            .collect();
        print_table(&["LEVEL", "MESSAGE"], &rows);
    }
    Ok(())
}
