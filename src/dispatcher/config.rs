use crate::config::{ConfigProvider, ConfigProviderError, DispatcherSettings};
use crate::dispatcher::DispatchError;
use crate::exchange::Exchange;
use crate::status::Status;
use std::sync::Arc;

/// Answers requests for paths no route resolves.
pub type NotFoundHandler = Arc<dyn Fn(&mut Exchange) -> Status + Send + Sync>;

/// Observes faults caught while dispatching, after they have been answered.
pub type RecoverCallback = Arc<dyn Fn(&DispatchError) + Send + Sync>;

/// Everything a [`Dispatcher`](crate::dispatcher::Dispatcher) needs besides
/// its routes. Built once at startup.
#[derive(Clone, Default)]
pub struct DispatcherConfig {
    settings: DispatcherSettings,
    not_found: Option<NotFoundHandler>,
    recover: Option<RecoverCallback>,
}

impl DispatcherConfig {
    pub fn builder() -> DispatcherConfigBuilder {
        DispatcherConfigBuilder::new()
    }

    /// Loads the settings through `provider`; callbacks stay unset.
    pub fn from_provider(
        provider: &impl ConfigProvider<DispatcherSettings>,
    ) -> Result<Self, ConfigProviderError> {
        Ok(Self {
            settings: provider.load()?,
            ..Default::default()
        })
    }

    pub fn settings(&self) -> &DispatcherSettings {
        &self.settings
    }

    pub fn not_found_handler(&self) -> Option<&NotFoundHandler> {
        self.not_found.as_ref()
    }

    pub fn recover_callback(&self) -> Option<&RecoverCallback> {
        self.recover.as_ref()
    }

    pub fn not_found_status(&self) -> Status {
        Status(self.settings.not_found_status)
    }

    pub fn internal_error_status(&self) -> Status {
        Status(self.settings.internal_error_status)
    }
}

#[derive(Default)]
pub struct DispatcherConfigBuilder {
    config: DispatcherConfig,
}

impl DispatcherConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn settings(mut self, settings: DispatcherSettings) -> Self {
        self.config.settings = settings;
        self
    }

    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.config.settings.log_requests = enabled;
        self
    }

    pub fn not_found<F>(mut self, handler: F) -> Self
    where
        F: Fn(&mut Exchange) -> Status + Send + Sync + 'static,
    {
        self.config.not_found = Some(Arc::new(handler));
        self
    }

    pub fn recover<F>(mut self, callback: F) -> Self
    where
        F: Fn(&DispatchError) + Send + Sync + 'static,
    {
        self.config.recover = Some(Arc::new(callback));
        self
    }

    pub fn build(self) -> DispatcherConfig {
        self.config
    }
}
