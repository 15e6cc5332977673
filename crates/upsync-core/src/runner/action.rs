use std::fmt;

use crate::error::SyncError;

/// Single-purpose operations selectable with `--action <name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Status,
    Fetch,
    Summary,
    Preview,
    Apply,
    Select,
    Conflicts,
    Protect,
}

impl Action {
    pub fn all() -> &'static [Action] {
        &[
            Action::Status,
            Action::Fetch,
            Action::Summary,
            Action::Preview,
            Action::Apply,
            Action::Select,
            Action::Conflicts,
            Action::Protect,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Action::Status => "status",
            Action::Fetch => "fetch",
            Action::Summary => "summary",
            Action::Preview => "preview",
            Action::Apply => "apply",
            Action::Select => "select",
            Action::Conflicts => "conflicts",
            Action::Protect => "protect",
        }
    }

    /// Actions that compare against a freshly fetched upstream ref.
    pub fn needs_fetch(self) -> bool {
        matches!(
            self,
            Action::Fetch | Action::Summary | Action::Preview | Action::Apply | Action::Select
        )
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Action {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| SyncError::UnknownAction {
                name: s.to_string(),
                valid: Self::all()
                    .iter()
                    .map(|a| a.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }
}
