use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use log::{debug, error, info, warn};
use serde_yaml2 as serde_yaml;

use models::PathwayTemplate;

use crate::config::config_defaults::DEFAULT_CONFIG_PATH_RELATIVE;
use crate::config::config_structs::AppConfig;

/// Loads the application config. A missing file yields defaults; a file that
/// exists but cannot be parsed or validated is an error.
pub fn load_app_config(config_file_path: Option<&Path>) -> Result<AppConfig> {
    let path_to_use = config_file_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH_RELATIVE));

    info!("Attempting to load config from {:?}", path_to_use);

    if !path_to_use.exists() {
        warn!("Config file not found at {}. Using default config.", path_to_use.display());
        return Ok(AppConfig::default());
    }

    let config_content = fs::read_to_string(&path_to_use)
        .with_context(|| format!("Failed to read config file: {}", path_to_use.display()))?;
    debug!("Config content: {}", config_content);
    let config: AppConfig = serde_yaml::from_str(&config_content).map_err(|e| {
        error!("YAML parsing error at {:?}: {:?}", path_to_use, e);
        anyhow!("Failed to parse config YAML: {}", path_to_use.display())
    })?;
    config
        .validate()
        .with_context(|| format!("Invalid config in {}", path_to_use.display()))?;
    info!("Loaded config: {:?}", config);
    Ok(config)
}

/// Reads pathway templates from a `.json` file, or YAML for any other extension.
pub fn load_pathway_templates(path: &Path) -> Result<Vec<PathwayTemplate>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read pathway templates: {}", path.display()))?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let templates: Vec<PathwayTemplate> = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse pathway templates JSON: {}", path.display()))?
    } else {
        serde_yaml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse pathway templates YAML {}: {:?}", path.display(), e))?
    };
    info!("Loaded {} pathway templates from {}", templates.len(), path.display());
    Ok(templates)
}
