//! Path-trie routing, interceptor chains and request dispatch.
//!
//! Routes are `/`-separated patterns whose segments are literals or
//! `{name}` wildcards. Each route is bound to a constructor producing a fresh
//! [`Handler`](handler::Handler) and [`InterceptorChain`](interceptor::InterceptorChain)
//! per request; the [`Dispatcher`](dispatcher::Dispatcher) resolves the path,
//! runs the chain and contains any fault raised along the way.

pub mod config;
pub mod dispatcher;
pub mod exchange;
pub mod handler;
#[cfg(feature = "hyper")]
pub mod hyper;
pub mod interceptor;
pub mod logger;
pub mod router;
pub mod status;

pub use dispatcher::{DispatchError, Dispatcher, DispatcherConfig};
pub use exchange::{Exchange, Request, Response, UriVars};
pub use handler::{Endpoint, Handler};
pub use interceptor::{Interceptor, InterceptorChain};
pub use router::{PathTrie, RouteError};
pub use status::{HandlerExecutionError, Status};
