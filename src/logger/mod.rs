use serde::{Deserialize, Serialize};
use std::panic::Location;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LogLevel {
    ERROR,
    WARN,
    INFO,
    DEBUG,
    TRACE,
}

impl From<LogLevel> for log::Level {
    fn from(value: LogLevel) -> Self {
        match value {
            LogLevel::ERROR => log::Level::Error,
            LogLevel::WARN => log::Level::Warn,
            LogLevel::INFO => log::Level::Info,
            LogLevel::DEBUG => log::Level::Debug,
            LogLevel::TRACE => log::Level::Trace,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Component {
    Router,
    Dispatcher,
    Interceptor,
    Handler,
    Config,
}

/// One structured log record, serialised to JSON and emitted through `log`.
#[derive(Debug, Serialize, Deserialize)]
pub struct LogEntry {
    timestamp: String,
    level: LogLevel,
    file: Option<String>,
    line: Option<u32>,
    column: Option<u32>,
    exchange_id: Option<Uuid>,
    component: Component,
    message: String,
}

impl LogEntry {
    /// Records the caller's source location alongside the message.
    #[track_caller]
    pub fn new(
        level: LogLevel,
        component: Component,
        exchange_id: Option<&Uuid>,
        message: impl Into<String>,
    ) -> Self {
        let location = Location::caller();
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            level,
            file: Some(location.file().to_string()),
            line: Some(location.line()),
            column: Some(location.column()),
            exchange_id: exchange_id.copied(),
            component,
            message: message.into(),
        }
    }

    pub fn level(&self) -> LogLevel {
        self.level
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn exchange_id(&self) -> Option<&Uuid> {
        self.exchange_id.as_ref()
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or(String::from("Error serializing log entry"))
    }

    /// Writes the entry as JSON at its own level, targeted at `idemio_mux`.
    pub fn emit(&self) {
        let level = log::Level::from(self.level);
        if log::log_enabled!(target: "idemio_mux", level) {
            log::log!(target: "idemio_mux", level, "{}", self.to_json());
        }
    }
}

/// Installs `env_logger`, honouring `RUST_LOG` and defaulting to `info`.
///
/// Returns `false` when a logger was already installed.
pub fn init() -> bool {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .try_init()
        .is_ok()
}
