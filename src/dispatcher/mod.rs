pub mod config;

pub use config::{DispatcherConfig, DispatcherConfigBuilder, NotFoundHandler, RecoverCallback};

use crate::exchange::Exchange;
use crate::handler::{Constructor, Endpoint};
use crate::interceptor::RequestLogger;
use crate::logger::{Component, LogEntry, LogLevel};
use crate::router::{PathTrie, RouteError};
use crate::status::{HandlerExecutionError, Status};
use futures_util::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use thiserror::Error;

/// Faults caught while dispatching a request.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// A handler verb or an interceptor hook returned an error.
    #[error("Error while executing handlers.")]
    Handler {
        #[source]
        source: HandlerExecutionError,
    },

    /// A handler, interceptor, constructor or not-found handler panicked.
    #[error("Request handling panicked: {message}")]
    Panicked { message: String },
}

impl DispatchError {
    #[inline]
    pub const fn handler_failure(err: HandlerExecutionError) -> Self {
        DispatchError::Handler { source: err }
    }

    #[inline]
    pub fn panicked(message: impl Into<String>) -> Self {
        DispatchError::Panicked {
            message: message.into(),
        }
    }
}

impl From<HandlerExecutionError> for DispatchError {
    fn from(value: HandlerExecutionError) -> Self {
        DispatchError::handler_failure(value)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        String::from("non-string panic payload")
    }
}

/// Resolves requests to routes and runs their interceptor chains.
///
/// Routes are registered up front through `&mut self`; once the dispatcher is
/// shared (typically behind an `Arc`) it only serves, and any number of tasks
/// may call [`Dispatcher::dispatch`] concurrently.
///
/// ```rust,ignore
/// let mut dispatcher = Dispatcher::new();
/// dispatcher.register("/ball/{kind}", || {
///     Endpoint::new(BallHandler::default())
///         .with_chain(InterceptorChain::builder().then(Auth::new()).build())
/// })?;
///
/// let mut exchange = Exchange::new(Request::new("GET", "/ball/soccer"));
/// let status = dispatcher.dispatch(&mut exchange).await;
/// ```
#[derive(Default)]
pub struct Dispatcher {
    trie: PathTrie<Constructor>,
    config: DispatcherConfig,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: DispatcherConfig) -> Self {
        Self {
            trie: PathTrie::new(),
            config,
        }
    }

    pub fn config(&self) -> &DispatcherConfig {
        &self.config
    }

    /// Binds `constructor` to `pattern`. The constructor runs once per
    /// matching request to build the handler and its interceptors.
    pub fn register<F>(&mut self, pattern: &str, constructor: F) -> Result<(), RouteError>
    where
        F: Fn() -> Endpoint + Send + Sync + 'static,
    {
        let constructor: Constructor = Arc::new(constructor);
        if let Err(e) = self.trie.insert(pattern, constructor) {
            log::error!("Cannot register route '{pattern}': {e}");
            return Err(e);
        }
        Ok(())
    }

    /// Registered patterns, sorted.
    pub fn routes(&self) -> Vec<String> {
        self.trie.routes()
    }

    /// Handles one request and returns its final status.
    ///
    /// Never fails: a path without a route is answered by the not-found
    /// handler (or the configured not-found status), and any error or panic
    /// raised while handling is answered with the internal error status and
    /// reported to the recover callback.
    pub async fn dispatch(&self, exchange: &mut Exchange) -> Status {
        let outcome = AssertUnwindSafe(self.execute(exchange))
            .catch_unwind()
            .await;
        match outcome {
            Ok(Ok(status)) => status,
            Ok(Err(err)) => self.recover(err, exchange),
            Err(payload) => {
                let err = DispatchError::panicked(panic_message(payload.as_ref()));
                self.recover(err, exchange)
            }
        }
    }

    async fn execute(&self, exchange: &mut Exchange) -> Result<Status, DispatchError> {
        let (constructor, uri_vars) = match self.trie.find(exchange.request().path()) {
            Ok(route) => {
                log::debug!(
                    "Path '{}' resolved to route '{}'",
                    exchange.request().path(),
                    route.pattern()
                );
                (route.value.clone(), route.uri_vars)
            }
            Err(_) => return Ok(self.not_found(exchange)),
        };

        exchange.set_uri_vars(uri_vars);
        let Endpoint { mut handler, mut chain } = constructor();
        if self.config.settings().log_requests {
            chain.prepend(RequestLogger::new());
        }

        let status = chain.execute(handler.as_mut(), exchange).await?;
        log::trace!(
            "Dispatched {} {} with status {status}",
            exchange.request().method(),
            exchange.request().path()
        );
        Ok(status)
    }

    fn not_found(&self, exchange: &mut Exchange) -> Status {
        log::warn!("No route for path '{}'", exchange.request().path());
        match self.config.not_found_handler() {
            Some(handler) => handler(exchange),
            None => {
                let status = self.config.not_found_status();
                exchange.response_mut().set_status(status);
                status
            }
        }
    }

    fn recover(&self, err: DispatchError, exchange: &mut Exchange) -> Status {
        LogEntry::new(
            LogLevel::ERROR,
            Component::Dispatcher,
            Some(exchange.uuid()),
            format!(
                "Failed to handle {} {}: {err}",
                exchange.request().method(),
                exchange.request().path()
            ),
        )
        .emit();
        let status = self.config.internal_error_status();
        exchange.response_mut().set_status(status);
        if let Some(callback) = self.config.recover_callback() {
            if let Err(payload) = std::panic::catch_unwind(AssertUnwindSafe(|| callback(&err))) {
                LogEntry::new(
                    LogLevel::ERROR,
                    Component::Dispatcher,
                    Some(exchange.uuid()),
                    format!(
                        "Recover callback panicked: {}",
                        panic_message(payload.as_ref())
                    ),
                )
                .emit();
            }
        }
        status
    }
}
