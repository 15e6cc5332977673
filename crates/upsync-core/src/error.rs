use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("not a git repository: {0} (run inside the submodule checkout)")]
    NotARepository(String),

    #[error("git not found on PATH: install git first")]
    GitNotFound,

    #[error("Python interpreter not found (tried: {tried})")]
    InterpreterNotFound { tried: String },

    #[error("remote '{name}' is not configured\nRun: git remote add {name} <url>")]
    RemoteMissing { name: String },

    #[error("failed to fetch '{remote}': check the remote configuration and network access")]
    FetchFailed { remote: String },

    #[error("merge of '{reference}' failed, conflicts are likely: run the conflicts action")]
    MergeFailed { reference: String },

    #[error("`git {command}` exited with status {code}")]
    GitFailed { command: String, code: i32 },

    #[error("unknown action '{name}'; valid actions: {valid}")]
    UnknownAction { name: String, valid: String },

    #[error("invalid selection: {0}")]
    InvalidSelection(String),

    #[error("invalid exclusion pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
