//! Merge protection: excluded paths resolve to the local side during merges.

use crate::error::Result;
use crate::exclude::ExclusionSet;
use crate::git::Git;
use crate::{io, paths};

const HEADER: &str = "# merge protection (upsync)\n";

/// Render `.gitattributes` content: one `merge=ours` line per exclusion,
/// directories matched recursively.
pub fn gitattributes_content(exclusions: &ExclusionSet) -> String {
    let mut content = String::from(HEADER);
    for path in exclusions.git_paths() {
        if path.ends_with('/') {
            content.push_str(&format!("{path}* merge=ours\n"));
        } else {
            content.push_str(&format!("{path} merge=ours\n"));
        }
    }
    content
}

/// Write `.gitattributes` if absent and register the `ours` merge driver.
/// Returns true when the attributes file was created.
pub fn ensure_merge_protection(git: &Git, exclusions: &ExclusionSet) -> Result<bool> {
    let path = paths::gitattributes_path(git.root());
    let written = io::write_if_missing(&path, gitattributes_content(exclusions).as_bytes())?;
    if written {
        tracing::info!(path = %path.display(), "created merge protection attributes");
    }
    git.set_config("merge.ours.driver", "true")?;
    Ok(written)
}
