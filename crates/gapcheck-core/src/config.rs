use crate::error::{GapError, Result};
use crate::metrics::BudgetAssumptions;
use crate::paths;
use crate::record::is_url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

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
// StorageConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One JSON file per report under `.gapcheck/reports/`.
    #[default]
    Files,
    /// Single redb database at `.gapcheck/reports.redb`.
    Redb,
}

impl StorageBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageBackend::Files => "files",
            StorageBackend::Redb => "redb",
        }
    }
}

impl fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = GapError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "files" => Ok(StorageBackend::Files),
            "redb" => Ok(StorageBackend::Redb),
            _ => Err(GapError::InvalidValue {
                field: "storage.backend".to_string(),
                value: s.to_string(),
                reason: "expected one of: files, redb".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default)]
    pub backend: StorageBackend,
}

// ---------------------------------------------------------------------------
// ShareConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Prefix for shareable report links.
    #[serde(default = "default_base_url")]
    pub base_url: String,
}

fn default_base_url() -> String {
    format!("http://localhost:{}", default_port())
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
        }
    }
}

// ---------------------------------------------------------------------------
// BudgetConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default = "default_marketing_rate")]
    pub marketing_rate: f64,
    #[serde(default = "default_roi_multiple")]
    pub roi_multiple: f64,
}

fn default_marketing_rate() -> f64 {
    BudgetAssumptions::default().marketing_rate
}

fn default_roi_multiple() -> f64 {
    BudgetAssumptions::default().roi_multiple
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            marketing_rate: default_marketing_rate(),
            roi_multiple: default_roi_multiple(),
        }
    }
}

impl BudgetConfig {
    pub fn assumptions(&self) -> BudgetAssumptions {
        BudgetAssumptions {
            marketing_rate: self.marketing_rate,
            roi_multiple: self.roi_multiple,
        }
    }
}

// ---------------------------------------------------------------------------
// ServerConfig
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_port() -> u16 {
    3141
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
        }
    }
}

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub share: ShareConfig,
    #[serde(default)]
    pub budget: BudgetConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl Config {
    pub fn load(root: &Path) -> Result<Self> {
        let data = crate::io::read_optional(&paths::config_path(root))?
            .ok_or(GapError::NotInitialized)?;
        let cfg: Config = serde_yaml::from_str(&data)?;
        Ok(cfg)
    }

    /// Like [`Config::load`], but an uninitialized root yields the defaults.
    pub fn load_or_default(root: &Path) -> Result<Self> {
        match Self::load(root) {
            Err(GapError::NotInitialized) => Ok(Self::default()),
            other => other,
        }
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let path = paths::config_path(root);
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&path, data.as_bytes())
    }

    pub fn validate(&self) -> Vec<ConfigWarning> {
        let mut warnings = Vec::new();

        let rate = self.budget.marketing_rate;
        if !(rate > 0.0 && rate <= 1.0) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "budget.marketing_rate is {rate}; expected a fraction in (0, 1], e.g. 0.08"
                ),
            });
        }

        if self.budget.roi_multiple <= 0.0 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Error,
                message: format!(
                    "budget.roi_multiple is {}; must be positive",
                    self.budget.roi_multiple
                ),
            });
        }

        if !is_url(&self.share.base_url) {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "share.base_url '{}' is not an http(s) URL; share links will not resolve",
                    self.share.base_url
                ),
            });
        }

        if self.server.port < 1024 {
            warnings.push(ConfigWarning {
                level: WarnLevel::Warning,
                message: format!(
                    "server.port {} is privileged and may need elevated permissions",
                    self.server.port
                ),
            });
        }

        warnings
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
