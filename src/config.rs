use std::path::Path;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::models::SortKey;

pub const DEFAULT_CONFIG_FILE: &str = "skill-halflife.toml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub dataset: DatasetConfig,

    #[serde(default)]
    pub ranking: RankingConfig,

    #[serde(default)]
    pub report: ReportConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    /// Exposure, risk and demand columns are on a 0-100 scale in the file.
    pub percent_scale: bool,
    /// When non-empty, rows with any other industry are rejected.
    pub allowed_industries: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            percent_scale: true,
            allowed_industries: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RankingConfig {
    pub default_sort: SortKey,
    pub limit: usize,
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKey::default(),
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_n: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self { top_n: 10 }
    }
}

impl Config {
    /// Explicit path, else `skill-halflife.toml` in the working directory,
    /// else defaults.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load_from(path),
            None => {
                let local = Path::new(DEFAULT_CONFIG_FILE);
                if local.exists() {
                    Self::load_from(local)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("invalid config {}", path.display()))?;
        tracing::debug!(path = %path.display(), "loaded config");
        Ok(config)
    }
}
