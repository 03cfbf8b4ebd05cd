use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Serialisable part of the dispatcher configuration.
///
/// ```json
/// { "log_requests": true, "not_found_status": 404, "internal_error_status": 500 }
/// ```
///
/// Every field is optional in the source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DispatcherSettings {
    /// Prepend a [`RequestLogger`](crate::interceptor::RequestLogger) to every chain.
    pub log_requests: bool,
    /// Answer for paths no route resolves, when no not-found handler is set.
    pub not_found_status: u16,
    /// Answer for requests whose handling failed or panicked.
    pub internal_error_status: u16,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            log_requests: false,
            not_found_status: 404,
            internal_error_status: 500,
        }
    }
}

pub trait ConfigProvider<C>
where
    C: Default + DeserializeOwned,
{
    fn load(&self) -> Result<C, ConfigProviderError>;
}

pub struct DefaultConfigProvider;

impl<C> ConfigProvider<C> for DefaultConfigProvider
where
    C: Default + DeserializeOwned,
{
    fn load(&self) -> Result<C, ConfigProviderError> {
        Ok(C::default())
    }
}

/// Reads `base_path/config_name` as JSON.
pub struct FileConfigProvider {
    pub base_path: String,
    pub config_name: String,
}

impl FileConfigProvider {
    pub fn new(base_path: impl Into<String>, config_name: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
            config_name: config_name.into(),
        }
    }
}

impl<C> ConfigProvider<C> for FileConfigProvider
where
    C: Default + DeserializeOwned,
{
    fn load(&self) -> Result<C, ConfigProviderError> {
        let config_path = Path::new(&self.base_path).join(&self.config_name);
        log::debug!("Loading configuration from '{}'", config_path.display());
        let file = File::open(&config_path).map_err(|e| {
            let msg = format!("Could not open config file: {}", e);
            ConfigProviderError::load_error(msg)
        })?;
        serde_json::from_reader(file).map_err(|e| {
            let msg = format!("Could not load config file from reader: {}", e);
            ConfigProviderError::load_error(msg)
        })
    }
}

pub struct ProgrammaticConfigProvider<C> {
    pub config: C,
}

impl<C> ConfigProvider<C> for ProgrammaticConfigProvider<C>
where
    C: Default + DeserializeOwned + Clone,
{
    fn load(&self) -> Result<C, ConfigProviderError> {
        Ok(self.config.clone())
    }
}

#[derive(Error, Debug)]
pub enum ConfigProviderError {
    #[error("Could not load config file. {message}")]
    Load { message: String },
}

impl ConfigProviderError {
    #[inline]
    pub(crate) fn load_error(msg: impl Into<String>) -> Self {
        Self::Load {
            message: msg.into(),
        }
    }
}
