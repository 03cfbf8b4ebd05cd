use std::borrow::Cow;
use std::fmt::{Display, Formatter};

/// Failure reported by a handler verb or an interceptor hook.
///
/// Returning this from any element of a chain aborts the rest of the request;
/// the dispatcher turns it into an internal error status.
#[derive(Debug, thiserror::Error)]
#[error("Fatal error: {message}")]
pub struct HandlerExecutionError {
    pub message: Cow<'static, str>,
}

impl HandlerExecutionError {
    pub fn new(message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Outcome code produced by handlers and interceptors.
///
/// The value is usually an HTTP status code, but the dispatcher only gives
/// meaning to zero: [`Status::NONE`] means "nothing to report, keep going".
/// A `before` hook returning anything else short-circuits the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Status(pub u16);

impl Status {
    pub const NONE: Self = Self(0);
    pub const OK: Self = Self(200);
    pub const CREATED: Self = Self(201);
    pub const NO_CONTENT: Self = Self(204);
    pub const BAD_REQUEST: Self = Self(400);
    pub const UNAUTHORIZED: Self = Self(401);
    pub const FORBIDDEN: Self = Self(403);
    pub const NOT_FOUND: Self = Self(404);
    pub const METHOD_NOT_ALLOWED: Self = Self(405);
    pub const INTERNAL_SERVER_ERROR: Self = Self(500);
    pub const NOT_IMPLEMENTED: Self = Self(501);

    pub const fn code(&self) -> u16 {
        self.0
    }

    pub const fn is_none(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_set(&self) -> bool {
        self.0 != 0
    }

    pub const fn is_success(&self) -> bool {
        self.0 >= 200 && self.0 < 300
    }

    pub const fn is_client_error(&self) -> bool {
        self.0 >= 400 && self.0 < 500
    }

    pub const fn is_server_error(&self) -> bool {
        self.0 >= 500 && self.0 < 600
    }

    pub const fn is_error(&self) -> bool {
        self.is_client_error() || self.is_server_error()
    }

    /// Returns `other` when it carries a status, otherwise keeps `self`.
    pub const fn or_keep(self, other: Status) -> Status {
        if other.is_set() { other } else { self }
    }
}

impl From<u16> for Status {
    fn from(value: u16) -> Self {
        Self(value)
    }
}

impl From<Status> for u16 {
    fn from(value: Status) -> Self {
        value.0
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use crate::status::{HandlerExecutionError, Status};

    #[test]
    fn test_status_classes() {
        assert!(Status::NONE.is_none());
        assert!(!Status::NONE.is_error());
        assert!(Status::OK.is_success());
        assert!(Status::NOT_FOUND.is_client_error());
        assert!(Status::INTERNAL_SERVER_ERROR.is_server_error());
        assert!(Status::METHOD_NOT_ALLOWED.is_error());
        assert!(Status::from(302).is_set());
    }

    #[test]
    fn test_or_keep_only_replaces_with_set_status() {
        assert_eq!(Status::OK.or_keep(Status::NONE), Status::OK);
        assert_eq!(Status::OK.or_keep(Status::FORBIDDEN), Status::FORBIDDEN);
        assert_eq!(Status::NONE.or_keep(Status::NONE), Status::NONE);
    }

    #[test]
    fn test_execution_error_message() {
        let err = HandlerExecutionError::new("database offline");
        assert_eq!(err.to_string(), "Fatal error: database offline");
        let owned = HandlerExecutionError::new(format!("code {}", 7));
        assert_eq!(owned.message, "code 7");
    }
}
