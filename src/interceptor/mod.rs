pub mod logger;

pub use logger::RequestLogger;

use crate::exchange::Exchange;
use crate::handler::{self, Handler};
use crate::status::{HandlerExecutionError, Status};
use async_trait::async_trait;

/// A decorator running paired hooks around a handler.
///
/// `before` returning [`Status::NONE`] lets the chain continue. Any other
/// status short-circuits it: interceptors declared later and the handler are
/// skipped, and the status becomes the running status for the `after` phase.
///
/// `after` receives the running status. Returning [`Status::NONE`] keeps it,
/// anything else replaces it for the interceptors whose `after` runs next.
#[async_trait]
pub trait Interceptor: Send {
    async fn before(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok(Status::NONE)
    }

    async fn after(
        &mut self,
        _exchange: &mut Exchange,
        status: Status,
    ) -> Result<Status, HandlerExecutionError> {
        Ok(status)
    }

    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Interceptors around one handler, in declaration order.
///
/// The first declared interceptor is the one every later interceptor can rely
/// on having run: for `A`, `B`, `C` the call sequence is
///
/// ```text
/// A.before, B.before, C.before, handler, C.after, B.after, A.after
/// ```
///
/// If `B.before` reports a status, the sequence becomes
/// `A.before, B.before, B.after, A.after`.
#[derive(Default)]
pub struct InterceptorChain {
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl InterceptorChain {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> InterceptorChainBuilder {
        InterceptorChainBuilder::new()
    }

    pub fn len(&self) -> usize {
        self.interceptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interceptors.is_empty()
    }

    /// Names in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.interceptors.iter().map(|i| i.name()).collect()
    }

    /// Makes `interceptor` the first to run, ahead of everything declared.
    pub(crate) fn prepend(&mut self, interceptor: impl Interceptor + 'static) {
        self.interceptors.insert(0, Box::new(interceptor));
    }

    /// Runs the before phase, the handler verb unless short-circuited, and the
    /// after phase over the interceptors whose `before` ran.
    ///
    /// An error from any hook or from the handler stops execution immediately
    /// and is returned as is.
    pub async fn execute(
        &mut self,
        handler: &mut dyn Handler,
        exchange: &mut Exchange,
    ) -> Result<Status, HandlerExecutionError> {
        let mut status = Status::NONE;
        let mut invoked = 0;
        let mut short_circuited = false;

        for interceptor in self.interceptors.iter_mut() {
            invoked += 1;
            status = interceptor.before(exchange).await?;
            if status.is_set() {
                log::debug!(
                    "Interceptor '{}' short-circuited with status {status}",
                    interceptor.name()
                );
                short_circuited = true;
                break;
            }
        }

        if !short_circuited {
            status = handler::invoke(handler, exchange).await?;
        }

        for interceptor in self.interceptors[..invoked].iter_mut().rev() {
            let replaced = interceptor.after(exchange, status).await?;
            status = status.or_keep(replaced);
        }

        Ok(status)
    }
}

/// Appends interceptors in the order they must run.
///
/// ```rust,ignore
/// let chain = InterceptorChain::builder()
///     .then(Authenticate::new())
///     .then(LoadAccount::new()) // may rely on Authenticate having run
///     .build();
/// ```
#[derive(Default)]
pub struct InterceptorChainBuilder {
    interceptors: Vec<Box<dyn Interceptor>>,
}

impl InterceptorChainBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn then_boxed(mut self, interceptor: Box<dyn Interceptor>) -> Self {
        self.interceptors.push(interceptor);
        self
    }

    pub fn build(self) -> InterceptorChain {
        InterceptorChain {
            interceptors: self.interceptors,
        }
    }
}

/// An interceptor with only a `before` hook.
pub struct BeforeFn<F> {
    func: F,
}

impl<F> BeforeFn<F>
where
    F: FnMut(&mut Exchange) -> Status + Send,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Interceptor for BeforeFn<F>
where
    F: FnMut(&mut Exchange) -> Status + Send,
{
    async fn before(&mut self, exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
        Ok((self.func)(exchange))
    }

    fn name(&self) -> &str {
        "BeforeFn"
    }
}

/// An interceptor with only an `after` hook.
pub struct AfterFn<F> {
    func: F,
}

impl<F> AfterFn<F>
where
    F: FnMut(&mut Exchange, Status) -> Status + Send,
{
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<F> Interceptor for AfterFn<F>
where
    F: FnMut(&mut Exchange, Status) -> Status + Send,
{
    async fn after(
        &mut self,
        exchange: &mut Exchange,
        status: Status,
    ) -> Result<Status, HandlerExecutionError> {
        Ok((self.func)(exchange, status))
    }

    fn name(&self) -> &str {
        "AfterFn"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exchange::Request;
    use std::sync::{Arc, Mutex};

    type Trail = Arc<Mutex<Vec<String>>>;

    struct Recording {
        label: &'static str,
        trail: Trail,
        before: Status,
        after: Status,
    }

    impl Recording {
        fn new(label: &'static str, trail: &Trail) -> Self {
            Self {
                label,
                trail: trail.clone(),
                before: Status::NONE,
                after: Status::NONE,
            }
        }

        fn breaking_with(mut self, status: Status) -> Self {
            self.before = status;
            self
        }

        fn replacing_with(mut self, status: Status) -> Self {
            self.after = status;
            self
        }
    }

    #[async_trait]
    impl Interceptor for Recording {
        async fn before(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.trail.lock().unwrap().push(format!("{}.before", self.label));
            Ok(self.before)
        }

        async fn after(
            &mut self,
            _exchange: &mut Exchange,
            status: Status,
        ) -> Result<Status, HandlerExecutionError> {
            self.trail
                .lock()
                .unwrap()
                .push(format!("{}.after({status})", self.label));
            Ok(self.after)
        }

        fn name(&self) -> &str {
            self.label
        }
    }

    struct RecordingHandler {
        trail: Trail,
        status: Status,
    }

    #[async_trait]
    impl Handler for RecordingHandler {
        async fn get(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            self.trail.lock().unwrap().push("handler.get".to_string());
            Ok(self.status)
        }
    }

    struct Failing;

    #[async_trait]
    impl Interceptor for Failing {
        async fn before(&mut self, _exchange: &mut Exchange) -> Result<Status, HandlerExecutionError> {
            Err(HandlerExecutionError::new("boom"))
        }
    }

    fn handler(trail: &Trail) -> RecordingHandler {
        RecordingHandler {
            trail: trail.clone(),
            status: Status::OK,
        }
    }

    fn get() -> Exchange {
        Exchange::new(Request::new("GET", "/"))
    }

    fn recorded(trail: &Trail) -> Vec<String> {
        trail.lock().unwrap().clone()
    }

    #[tokio::test]
    async fn test_before_in_declaration_order_after_in_reverse() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(Recording::new("A", &trail))
            .then(Recording::new("B", &trail))
            .then(Recording::new("C", &trail))
            .build();
        assert_eq!(chain.names(), vec!["A", "B", "C"]);

        let status = chain
            .execute(&mut handler(&trail), &mut get())
            .await
            .unwrap();

        assert_eq!(status, Status::OK);
        assert_eq!(
            recorded(&trail),
            vec![
                "A.before",
                "B.before",
                "C.before",
                "handler.get",
                "C.after(200)",
                "B.after(200)",
                "A.after(200)",
            ]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_skips_later_interceptors_and_handler() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(Recording::new("A", &trail))
            .then(Recording::new("B", &trail).breaking_with(Status::UNAUTHORIZED))
            .then(Recording::new("C", &trail))
            .build();

        let status = chain
            .execute(&mut handler(&trail), &mut get())
            .await
            .unwrap();

        assert_eq!(status, Status::UNAUTHORIZED);
        assert_eq!(
            recorded(&trail),
            vec!["A.before", "B.before", "B.after(401)", "A.after(401)"]
        );
    }

    #[tokio::test]
    async fn test_short_circuit_at_first_interceptor() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(Recording::new("A", &trail).breaking_with(Status::FORBIDDEN))
            .then(Recording::new("B", &trail))
            .build();

        let status = chain
            .execute(&mut handler(&trail), &mut get())
            .await
            .unwrap();

        assert_eq!(status, Status::FORBIDDEN);
        assert_eq!(recorded(&trail), vec!["A.before", "A.after(403)"]);
    }

    #[tokio::test]
    async fn test_after_override_propagates_outwards() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(Recording::new("A", &trail))
            .then(Recording::new("B", &trail).replacing_with(Status::INTERNAL_SERVER_ERROR))
            .then(Recording::new("C", &trail))
            .build();

        let status = chain
            .execute(&mut handler(&trail), &mut get())
            .await
            .unwrap();

        assert_eq!(status, Status::INTERNAL_SERVER_ERROR);
        assert_eq!(
            recorded(&trail)[4..].to_vec(),
            vec!["C.after(200)", "B.after(200)", "A.after(500)"]
        );
    }

    #[tokio::test]
    async fn test_empty_chain_only_runs_handler() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::empty();
        let status = chain
            .execute(&mut handler(&trail), &mut get())
            .await
            .unwrap();
        assert_eq!(status, Status::OK);
        assert_eq!(recorded(&trail), vec!["handler.get"]);
    }

    #[tokio::test]
    async fn test_hook_error_aborts_chain() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(Recording::new("A", &trail))
            .then(Failing)
            .build();

        let result = chain.execute(&mut handler(&trail), &mut get()).await;

        assert_eq!(result.unwrap_err().message, "boom");
        assert_eq!(recorded(&trail), vec!["A.before"]);
    }

    #[tokio::test]
    async fn test_prepend_runs_first() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(Recording::new("B", &trail))
            .build();
        chain.prepend(Recording::new("A", &trail));
        assert_eq!(chain.len(), 2);

        chain
            .execute(&mut handler(&trail), &mut get())
            .await
            .unwrap();

        assert_eq!(
            recorded(&trail),
            vec!["A.before", "B.before", "handler.get", "B.after(200)", "A.after(200)"]
        );
    }

    #[tokio::test]
    async fn test_function_interceptors() {
        let trail = Trail::default();
        let mut chain = InterceptorChain::builder()
            .then(AfterFn::new(|exchange: &mut Exchange, status: Status| {
                exchange.response_mut().set_status(status);
                Status::NONE
            }))
            .then(BeforeFn::new(|exchange: &mut Exchange| {
                exchange.attachments_mut().add::<u32>("amount", 3);
                Status::NONE
            }))
            .build();
        let mut exchange = get();

        let status = chain
            .execute(&mut handler(&trail), &mut exchange)
            .await
            .unwrap();

        assert_eq!(status, Status::OK);
        assert_eq!(exchange.response().status(), Some(Status::OK));
        assert_eq!(exchange.attachments().get::<u32>("amount"), Some(&3));
    }
}
