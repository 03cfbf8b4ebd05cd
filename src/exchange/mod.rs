pub mod attachments;
pub mod http;

pub use attachments::Attachments;
pub use http::{Headers, Method, Request, Response};

use fnv::FnvBuildHasher;
use std::collections::HashMap;
use std::str::FromStr;
use uuid::Uuid;

/// Values captured by wildcard segments, keyed by variable name.
///
/// For a route registered as `/ball/{kind}` and a request for `/ball/soccer`,
/// `kind` maps to `soccer`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct UriVars {
    vars: HashMap<String, String, FnvBuildHasher>,
}

impl UriVars {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.vars.get(name).map(String::as_str)
    }

    /// Parses the variable `name` into `T`. `None` when the variable is absent,
    /// `Some(Err(..))` when it does not parse.
    pub fn parse<T: FromStr>(&self, name: &str) -> Option<Result<T, T::Err>> {
        self.vars.get(name).map(|value| value.parse::<T>())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.vars.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub(crate) fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }

    pub(crate) fn append(&mut self, name: &str, suffix: &str) {
        self.vars.entry(name.to_string()).or_default().push_str(suffix);
    }
}

impl<K, V> FromIterator<(K, V)> for UriVars
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut vars = UriVars::new();
        for (k, v) in iter {
            vars.insert(k, v);
        }
        vars
    }
}

/// Request-scoped context handed to every handler verb and interceptor hook.
///
/// One exchange lives for exactly one dispatch. Everything an element of the
/// chain may want to read or change about the request and its answer is
/// reachable from here.
pub struct Exchange {
    uuid: Uuid,
    request: Request,
    response: Response,
    uri_vars: UriVars,
    attachments: Attachments,
}

impl Exchange {
    pub fn new(request: Request) -> Self {
        Self::new_with_uuid(request, Uuid::new_v4())
    }

    pub fn new_with_uuid(request: Request, uuid: Uuid) -> Self {
        Self {
            uuid,
            request,
            response: Response::new(),
            uri_vars: UriVars::new(),
            attachments: Attachments::new(),
        }
    }

    pub fn uuid(&self) -> &Uuid {
        &self.uuid
    }

    pub fn request(&self) -> &Request {
        &self.request
    }

    pub fn request_mut(&mut self) -> &mut Request {
        &mut self.request
    }

    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn response_mut(&mut self) -> &mut Response {
        &mut self.response
    }

    pub fn uri_vars(&self) -> &UriVars {
        &self.uri_vars
    }

    /// Replaces the wildcard bindings. Called by the dispatcher once the route
    /// is resolved; public so handlers can be exercised in isolation.
    pub fn set_uri_vars(&mut self, uri_vars: UriVars) {
        self.uri_vars = uri_vars;
    }

    pub fn attachments(&self) -> &Attachments {
        &self.attachments
    }

    pub fn attachments_mut(&mut self) -> &mut Attachments {
        &mut self.attachments
    }

    /// Splits the exchange into its parts, e.g. to hand the response to a
    /// transport once dispatch is over.
    pub fn into_parts(self) -> (Request, Response) {
        (self.request, self.response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uri_vars_parse() {
        let vars: UriVars = [("year", "2016"), ("city", "rio")].into_iter().collect();
        assert_eq!(vars.parse::<u32>("year"), Some(Ok(2016)));
        assert!(matches!(vars.parse::<u32>("city"), Some(Err(_))));
        assert!(vars.parse::<u32>("month").is_none());
        assert_eq!(vars.get("city"), Some("rio"));
    }

    #[test]
    fn test_uri_vars_append_creates_missing_entry() {
        let mut vars = UriVars::new();
        vars.insert("path", "a");
        vars.append("path", "/b/c");
        vars.append("rest", "/x");
        assert_eq!(vars.get("path"), Some("a/b/c"));
        assert_eq!(vars.get("rest"), Some("/x"));
    }

    #[test]
    fn test_exchange_parts() {
        let mut exchange = Exchange::new(Request::new("GET", "/ping"));
        exchange.response_mut().write("pong");
        exchange.attachments_mut().add::<u8>("hits", 1);
        assert_eq!(exchange.attachments().get::<u8>("hits"), Some(&1));
        let (request, response) = exchange.into_parts();
        assert_eq!(request.path(), "/ping");
        assert_eq!(response.body(), b"pong");
    }
}
