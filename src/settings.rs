//! User settings dotfile
//!
//! `~/.ucb.yaml` (or the file named by `UCB_CONFIG`) may hold default values
//! for the global fields. They are merged into the flag set before population,
//! so they behave exactly like flags: trusted as-is and never prompted for.

use crate::form::FlagSet;
use crate::traits::FileSystem;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const CONFIG_ENV: &str = "UCB_CONFIG";
const DOT_FILE: &str = ".ucb.yaml";

const TEMPLATE: &str = "\
# UCB settings
#
# Values set here are used whenever the matching flag is not given.
#
# apiKey: 0123456789abcdef0123456789abcdef
# orgId: my-organization
";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

impl Settings {
    /// Location of the settings dotfile
    pub fn file_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        let home_dir = dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("Unable to determine home directory"))?;
        Ok(home_dir.join(DOT_FILE))
    }

    /// Load settings, treating a missing or empty file as no settings
    pub fn load(fs: &dyn FileSystem, path: &Path) -> Result<Self> {
        if !fs.exists(path) {
            tracing::debug!(?path, "no settings file");
            return Ok(Self::default());
        }

        let content = fs.read_to_string(path)?;
        let has_values = content
            .lines()
            .map(str::trim)
            .any(|line| !line.is_empty() && !line.starts_with('#'));
        if !has_values {
            return Ok(Self::default());
        }

        serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse settings file: {:?}", path))
    }

    /// Write the commented settings template
    pub fn create_dot_file(fs: &dyn FileSystem, path: &Path) -> Result<()> {
        fs.write(path, TEMPLATE)
    }

    /// Fill flags that were not given (or given empty) from settings
    pub fn apply_defaults(&self, flags: &mut FlagSet) {
        let defaults = [("apiKey", &self.api_key), ("orgId", &self.org_id)];

        for (name, value) in defaults {
            let Some(value) = value else { continue };
            let missing = flags.get(name).is_none_or(|v| v.is_empty());
            if missing {
                tracing::debug!(field = name, "using value from settings");
                flags.insert(name.to_string(), value.clone());
            }
        }
    }
}
