//! Repository configuration, read from `.remark/config.toml`

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::Result;

pub const CONFIG_FILE: &str = "config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub submission: SubmissionConfig,
    pub moderation: ModerationConfig,
    pub display: DisplayConfig,
}

/// Hard ceiling on comment length; configuration may only lower it
pub const MAX_CONTENT_LENGTH: usize = 1000;
/// Hard ceiling on author name, email and website length
pub const MAX_FIELD_LENGTH: usize = 255;

/// Limits applied to public comment submissions.
///
/// Values above [`MAX_CONTENT_LENGTH`] and [`MAX_FIELD_LENGTH`] are
/// clamped to those ceilings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionConfig {
    /// Maximum comment length in characters
    pub max_content_length: usize,
    /// Maximum length of author name, email and website
    pub max_field_length: usize,
}

impl Default for SubmissionConfig {
    fn default() -> Self {
        Self {
            max_content_length: MAX_CONTENT_LENGTH,
            max_field_length: MAX_FIELD_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModerationConfig {
    /// Identities allowed to moderate every post
    pub admins: Vec<String>,
    /// Rows per page in the moderation listing
    pub page_size: usize,
}

impl Default for ModerationConfig {
    fn default() -> Self {
        Self {
            admins: vec!["admin".to_string()],
            page_size: 15,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Comments shown under "recent" in the stats view
    pub recent_limit: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { recent_limit: 5 }
    }
}

impl Config {
    /// Load `config.toml` from a `.remark/` directory, falling back to
    /// defaults when the file does not exist.
    pub fn load(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE);
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Write this configuration to `.remark/config.toml`
    pub fn save(&self, dir: &Path) -> Result<()> {
        let text = toml::to_string_pretty(self)?;
        std::fs::write(dir.join(CONFIG_FILE), text)?;
        Ok(())
    }

    pub fn is_admin(&self, name: &str) -> bool {
        self.moderation.admins.iter().any(|admin| admin == name)
    }
}
