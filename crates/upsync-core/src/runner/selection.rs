use crate::error::{Result, SyncError};

/// Outcome of one answer to the file-selection prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    All,
    Quit,
    /// Zero-based indices, in the order given.
    Indices(Vec<usize>),
}

/// Parse `a`, `q`, or comma-separated 1-based numbers against a list of
/// `count` files.
pub fn parse_selection(input: &str, count: usize) -> Result<Selection> {
    let input = input.trim();
    match input.to_ascii_lowercase().as_str() {
        "q" => return Ok(Selection::Quit),
        "a" => return Ok(Selection::All),
        _ => {}
    }

    let mut indices = Vec::new();
    for part in input.split(',') {
        let part = part.trim();
        let index = part
            .parse::<usize>()
            .ok()
            .filter(|n| (1..=count).contains(n))
            .ok_or_else(|| SyncError::InvalidSelection(format!("no file numbered '{part}'")))?;
        indices.push(index - 1);
    }
    Ok(Selection::Indices(indices))
}
