use crate::error::Result;
use crate::paths;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

// ---------------------------------------------------------------------------
// ConfigWarning / WarnLevel
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigWarning {
    pub level: WarnLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarnLevel {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Which runner the wrapper hands the invocation to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Engine {
    /// Forward to the Python runner script.
    #[default]
    Python,
    /// Run the built-in runner in-process.
    Native,
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

/// Contents of `.upsync.yaml`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_remote")]
    pub remote: String,
    #[serde(default = "default_remote_url")]
    pub remote_url: String,
    #[serde(default = "default_branch")]
    pub branch: String,
    #[serde(default = "default_push_remote")]
    pub push_remote: String,
    #[serde(default = "default_script")]
    pub script: PathBuf,
    #[serde(default)]
    pub engine: Engine,
    #[serde(default = "default_excluded")]
    pub excluded: Vec<String>,
    #[serde(default = "default_commit_message")]
    pub commit_message: String,
}

fn default_remote() -> String {
    "upstream".to_string()
}

fn default_remote_url() -> String {
    "https://github.com/Shasnow/StarRailAssistant.git".to_string()
}

fn default_branch() -> String {
    "main".to_string()
}

fn default_push_remote() -> String {
    "origin".to_string()
}

fn default_script() -> PathBuf {
    PathBuf::from(paths::DEFAULT_SCRIPT)
}

fn default_excluded() -> Vec<String> {
    [
        r"^\.github/",
        r"^SRAFrontend/",
        r"^setup/",
        r"^README\.md$",
        r"^package\.py$",
        r"^\.gitignore$",
        r"^\.gitattributes$",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_commit_message() -> String {
    "sync: upstream update".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            remote: default_remote(),
            remote_url: default_remote_url(),
            branch: default_branch(),
            push_remote: default_push_remote(),
            script: default_script(),
            engine: Engine::default(),
            excluded: default_excluded(),
            commit_message: default_commit_message(),
        }
    }
}

impl Config {
    /// Load `.upsync.yaml` from `root`, falling back to defaults when the
    /// file does not exist.
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::config_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    /// The remote-tracking ref everything is compared against, e.g. `upstream/main`.
    pub fn upstream_ref(&self) -> String {
        format!("{}/{}", self.remote, self.branch)
    }

    // -----------------------------------------------------------------------
    // Validation
    // -----------------------------------------------------------------------

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        for (field, value) in [
            ("remote", &self.remote),
            ("branch", &self.branch),
            ("push_remote", &self.push_remote),
        ] {
            if value.trim().is_empty() {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("'{field}' must not be empty"),
                });
            }
        }

        if self.remote_url.trim().is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "'remote_url' is empty; a missing '{}' remote cannot be added automatically",
                    self.remote
                ),
            });
        }

        for pattern in &self.excluded {
            if let Err(e) = Regex::new(pattern) {
                warnings.push(ConfigWarning {
                    level: WarnLevel::Error,
                    message: format!("invalid exclusion pattern '{pattern}': {e}"),
                });
            }
        }

        if self.excluded.is_empty() {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: "no exclusion patterns: every upstream file will be taken".to_string(),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
