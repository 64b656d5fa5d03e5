mod settings;

use config::{Config, ConfigError, Environment, File};

use crate::config::settings::PartialSettings;

pub use settings::{BrokerSettings, LogSettings, ServerSettings, Settings};

/// Prefix of environment overrides, e.g. `RELAYMQ__BROKER__WORKERS=8`.
pub const ENV_PREFIX: &str = "RELAYMQ";

/// Loads the configuration from `config/default` (any format `config`
/// understands, optional) and `RELAYMQ__*` environment variables, then fills
/// the gaps with default values.
pub fn load_config() -> Result<Settings, ConfigError> {
    load_config_from("config/default")
}

/// Same as [`load_config`] with an explicit file stem.
pub fn load_config_from(path: &str) -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name(path).required(false))
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    let settings = partial.merge(Settings::default());
    validate(&settings)?;
    Ok(settings)
}

/// Reject settings the pipeline cannot run with.
pub fn validate(settings: &Settings) -> Result<(), ConfigError> {
    if settings.broker.job_buffer == 0 {
        return Err(ConfigError::Message(
            "broker.job_buffer must be at least 1".to_string(),
        ));
    }
    if settings.broker.workers == 0 {
        return Err(ConfigError::Message(
            "broker.workers must be at least 1".to_string(),
        ));
    }
    if settings.broker.delivery_timeout_ms == 0 {
        return Err(ConfigError::Message(
            "broker.delivery_timeout_ms must be at least 1".to_string(),
        ));
    }
    Ok(())
}
