use anyhow::{Context as _, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use irf_common::OpenFlags;

/// Driver settings loaded from a JSON file. Command line flags override them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriverConfig {
    /// Module identifier, defaults to the sample name
    pub module_id: Option<String>,
    /// Line printed ahead of the module text
    pub banner: String,
    pub open_flags: Vec<FlagName>,
    /// Run the verifier before printing
    pub verify: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            module_id: None,
            banner: String::new(),
            open_flags: Vec::new(),
            verify: true,
        }
    }
}

/// Spelling of an `OpenFlags` bit in the config file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagName {
    Excl,
    Append,
    Text,
    Rw,
}

impl FlagName {
    pub fn flag(self) -> OpenFlags {
        match self {
            FlagName::Excl => OpenFlags::EXCL,
            FlagName::Append => OpenFlags::APPEND,
            FlagName::Text => OpenFlags::TEXT,
            FlagName::Rw => OpenFlags::RW,
        }
    }
}

impl DriverConfig {
    pub fn open_flags(&self) -> OpenFlags {
        self.open_flags
            .iter()
            .fold(OpenFlags::NONE, |flags, name| flags | name.flag())
    }
}

/// Load driver configuration from a JSON file
pub fn load_config(path: &Path) -> Result<DriverConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading config '{}'", path.display()))?;
    let config: DriverConfig = serde_json::from_str(&content)
        .with_context(|| format!("parsing config '{}'", path.display()))?;
    Ok(config)
}
