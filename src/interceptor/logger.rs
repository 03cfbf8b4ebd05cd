use crate::exchange::Exchange;
use crate::interceptor::Interceptor;
use crate::logger::{Component, LogEntry, LogLevel};
use crate::status::{HandlerExecutionError, Status};
use async_trait::async_trait;
use std::time::Instant;

/// Logs the start and the outcome of every request it decorates.
///
/// Never short-circuits and never replaces the status.
#[derive(Debug, Default)]
pub struct RequestLogger {
    started: Option<Instant>,
}

impl RequestLogger {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Interceptor for RequestLogger {
    async fn before(&mut self, exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        self.started = Some(Instant::now());
        let request = exchange.request();
        LogEntry::new(
            LogLevel::INFO,
            Component::Interceptor,
            Some(exchange.uuid()),
            format!("Started {} {}", request.method(), request.path()),
        )
        .emit();
        Ok(Status::NONE)
    }

    async fn after(
        &mut self,
        exchange: &mut Exchange,
        status: Status,
    ) -> Result<Status, HandlerExecutionError> {
        let elapsed = self
            .started
            .map(|started| started.elapsed().as_micros())
            .unwrap_or_default();
        let request = exchange.request();
        let level = if status.is_server_error() {
            LogLevel::ERROR
        } else if status.is_client_error() {
            LogLevel::WARN
        } else {
            LogLevel::INFO
        };
        LogEntry::new(
            level,
            Component::Interceptor,
            Some(exchange.uuid()),
            format!(
                "Completed {} {} with {status} in {elapsed}us",
                request.method(),
                request.path()
            ),
        )
        .emit();
        Ok(Status::NONE)
    }

    fn name(&self) -> &str {
        "RequestLogger"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Request;

    #[tokio::test]
    async fn test_request_logger_is_transparent() {
        crate::logger::init();
        let mut logger = RequestLogger::new();
        let mut exchange = Exchange::new(Request::new("GET", "/ball/soccer"));

        assert_eq!(logger.before(&mut exchange).await.unwrap(), Status::NONE);
        assert!(logger.started.is_some());
        assert_eq!(
            logger.after(&mut exchange, Status::NOT_FOUND).await.unwrap(),
            Status::NONE
        );
    }
}
