/// Errors raised while loading configuration at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read environment: {0}")]
    Env(#[from] envy::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Trait for loading service configuration from environment variables.
///
/// Implementors derive `serde::Deserialize` (field `foo_bar` reads `FOO_BAR`),
/// put defaults on optional fields, and override [`Config::validate`] for
/// cross-field rules. `from_env()` is called once at startup; a failure there
/// should abort the process.
pub trait Config: Sized + serde::de::DeserializeOwned {
    /// Check invariants serde cannot express. Default: accept everything.
    fn validate(&self) -> Result<(), ConfigError> {
        Ok(())
    }

    fn from_env() -> Result<Self, ConfigError> {
        Self::from_iter(std::env::vars())
    }

    /// Load from an explicit key/value iterator. Used by `from_env` and tests.
    fn from_iter<I>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }
}
