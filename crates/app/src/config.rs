use serde::Deserialize;

use crate::{cli::GlobalArgs, error::Result};

const DEFAULT_CONFIG_PATH: &str = "config/budgetwise.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Directory holding `snapshot.json` and `rates.json`.
    pub data_dir: String,
    /// Log level applied to every crate of the workspace.
    pub level: String,
    pub rates_ttl_minutes: i64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".to_string(),
            level: "warn".to_string(),
            rates_ttl_minutes: storage::DEFAULT_RATES_TTL_MINUTES,
        }
    }
}

/// Layers the optional TOML file, `BUDGETWISE_*` environment variables and
/// the command line flags, later sources winning.
pub fn load(args: &GlobalArgs) -> Result<AppConfig> {
    let config_path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
    let mut builder = config::Config::builder();
    builder = builder.add_source(config::File::with_name(config_path).required(false));
    builder = builder.add_source(config::Environment::with_prefix("BUDGETWISE"));
    let mut settings: AppConfig = builder.build()?.try_deserialize()?;

    if let Some(data_dir) = &args.data_dir {
        settings.data_dir = data_dir.clone();
    }
    if let Some(level) = &args.level {
        settings.level = level.clone();
    }
    if settings.rates_ttl_minutes <= 0 {
        settings.rates_ttl_minutes = storage::DEFAULT_RATES_TTL_MINUTES;
    }

    Ok(settings)
}
