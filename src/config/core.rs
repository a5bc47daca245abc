use crate::codec::MarkRegion;
use crate::error::MarkError;
use crate::reports::ReportFormat;
use figment::{
    Figment,
    providers::{Env, Format, Json, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;

// Embed the default config at compile time
const DEFAULT_CONFIG: &str = include_str!("../../default-config.toml");

pub const ENV_PREFIX: &str = "MARKFARM_";
pub const REPO_CONFIG: &str = "markfarm.toml";

/// Report and output naming settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputConfig {
    pub prefix: String,
    pub format: ReportFormat,
    pub progress: bool,
}

/// Merged configuration: defaults, then file, then environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkfarmConfig {
    pub output: OutputConfig,
    #[serde(default)]
    pub mark: MarkRegion,
}

impl MarkfarmConfig {
    pub fn load(custom_config: Option<&Path>) -> Result<Self, MarkError> {
        Self::figment(custom_config, ENV_PREFIX).extract().map_err(MarkError::from)
    }

    pub(crate) fn figment(custom_config: Option<&Path>, env_prefix: &str) -> Figment {
        tracing::trace!("CONFIG LOAD: Starting");
        let figment = Figment::new().merge(Toml::string(DEFAULT_CONFIG));

        let figment = match custom_config {
            Some(path) => {
                if !path.exists() {
                    tracing::warn!("Config file {} not found, using defaults", path.display());
                }
                if path.extension().is_some_and(|ext| ext == "json") {
                    figment.merge(Json::file(path))
                } else {
                    figment.merge(Toml::file(path))
                }
            }
            None => figment.merge(Toml::file(REPO_CONFIG)),
        };

        figment.merge(Env::prefixed(env_prefix).split("__"))
    }
}

impl Default for MarkfarmConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig {
                prefix: crate::shared::DEFAULT_OUTPUT_PREFIX.to_string(),
                format: ReportFormat::Text,
                progress: true,
            },
            mark: MarkRegion::default(),
        }
    }
}
