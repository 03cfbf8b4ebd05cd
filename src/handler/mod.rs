use crate::exchange::{Exchange, Method};
use crate::interceptor::InterceptorChain;
use crate::status::{HandlerExecutionError, Status};
use async_trait::async_trait;
use std::sync::Arc;

/// Business logic for one route, split by request method.
///
/// Every verb answers `405 Method Not Allowed` unless overridden. The returned
/// status is handed to the `after` hook of each interceptor; the dispatcher
/// does not write it to the response on its own.
///
/// ```rust,ignore
/// struct UserHandler;
///
/// #[async_trait]
/// impl Handler for UserHandler {
///     async fn get(&mut self, exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
///         let name = exchange.uri_vars().get("username").unwrap_or_default().to_string();
///         exchange.response_mut().write(name);
///         Ok(Status::OK)
///     }
/// }
/// ```
#[async_trait]
pub trait Handler: Send {
    async fn get(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::METHOD_NOT_ALLOWED)
    }

    async fn post(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::METHOD_NOT_ALLOWED)
    }

    async fn put(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::METHOD_NOT_ALLOWED)
    }

    async fn delete(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::METHOD_NOT_ALLOWED)
    }

    async fn patch(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::METHOD_NOT_ALLOWED)
    }

    async fn head(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::METHOD_NOT_ALLOWED)
    }
}

/// Calls the verb of `handler` matching the request method.
///
/// Methods without a verb get `405` and the handler is not called.
pub async fn invoke(
    handler: &mut dyn Handler,
    exchange: &mut Exchange,
) -> Result<Status, HandlerExecutionError> {
    let method = exchange.request().method().clone();
    match method {
        Method::Get => handler.get(exchange).await,
        Method::Post => handler.post(exchange).await,
        Method::Put => handler.put(exchange).await,
        Method::Delete => handler.delete(exchange).await,
        Method::Patch => handler.patch(exchange).await,
        Method::Head => handler.head(exchange).await,
        Method::Other(other) => {
            log::debug!("Method '{other}' has no handler verb");
            Ok(Status::METHOD_NOT_ALLOWED)
        }
    }
}

/// What a route constructor builds for each request: the handler and the
/// interceptors decorating it.
pub struct Endpoint {
    pub handler: Box<dyn Handler>,
    pub chain: InterceptorChain,
}

impl Endpoint {
    pub fn new(handler: impl Handler + 'static) -> Self {
        Self {
            handler: Box::new(handler),
            chain: InterceptorChain::empty(),
        }
    }

    pub fn with_chain(mut self, chain: InterceptorChain) -> Self {
        self.chain = chain;
        self
    }
}

/// Builds a fresh [`Endpoint`] per request.
pub type Constructor = Arc<dyn Fn() -> Endpoint + Send + Sync>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Request;

    #[derive(Default)]
    struct VerbRecorder {
        called: Vec<&'static str>,
    }

    #[async_trait]
    impl Handler for VerbRecorder {
        async fn get(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.called.push("GET");
            Ok(Status::OK)
        }

        async fn post(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.called.push("POST");
            Ok(Status::CREATED)
        }

        async fn put(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.called.push("PUT");
            Ok(Status::OK)
        }

        async fn delete(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.called.push("DELETE");
            Ok(Status::NO_CONTENT)
        }

        async fn patch(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.called.push("PATCH");
            Ok(Status::OK)
        }

        async fn head(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.called.push("HEAD");
            Ok(Status::OK)
        }
    }

    struct GetOnly;

    #[async_trait]
    impl Handler for GetOnly {
        async fn get(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            Ok(Status::OK)
        }
    }

    #[tokio::test]
    async fn test_invoke_maps_every_verb() {
        let mut handler = VerbRecorder::default();
        for method in ["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"] {
            let mut exchange = Exchange::new(Request::new(method, "/"));
            invoke(&mut handler, &mut exchange).await.unwrap();
        }
        assert_eq!(
            handler.called,
            vec!["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"]
        );
    }

    #[tokio::test]
    async fn test_invoke_unknown_method_skips_handler() {
        let mut handler = VerbRecorder::default();
        let mut exchange = Exchange::new(Request::new("OPTIONS", "/"));
        let status = invoke(&mut handler, &mut exchange).await.unwrap();
        assert_eq!(status, Status::METHOD_NOT_ALLOWED);
        assert!(handler.called.is_empty());
    }

    #[tokio::test]
    async fn test_default_verbs_answer_method_not_allowed() {
        let mut handler = GetOnly;
        let mut exchange = Exchange::new(Request::new("GET", "/"));
        assert_eq!(invoke(&mut handler, &mut exchange).await.unwrap(), Status::OK);
        let mut exchange = Exchange::new(Request::new("DELETE", "/"));
        assert_eq!(
            invoke(&mut handler, &mut exchange).await.unwrap(),
            Status::METHOD_NOT_ALLOWED
        );
    }
}
