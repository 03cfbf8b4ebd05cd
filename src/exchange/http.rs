use crate::status::Status;
use fnv::FnvBuildHasher;
use std::borrow::Cow;
use std::collections::HashMap;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Request method as seen by the dispatcher.
///
/// Only the six verbs a [`Handler`](crate::handler::Handler) exposes get their
/// own variant; anything else is carried verbatim in `Other` and answered with
/// `405 Method Not Allowed`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Head,
    Other(String),
}

impl Method {
    pub fn as_str(&self) -> &str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Patch => "PATCH",
            Method::Head => "HEAD",
            Method::Other(method) => method,
        }
    }
}

impl FromStr for Method {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "GET" => Method::Get,
            "POST" => Method::Post,
            "PUT" => Method::Put,
            "DELETE" => Method::Delete,
            "PATCH" => Method::Patch,
            "HEAD" => Method::Head,
            other => Method::Other(other.to_string()),
        })
    }
}

impl From<&str> for Method {
    fn from(value: &str) -> Self {
        match Method::from_str(value) {
            Ok(method) => method,
            Err(never) => match never {},
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Header names are stored lower-cased; lookups are case-insensitive.
#[derive(Debug, Default, Clone)]
pub struct Headers {
    entries: HashMap<String, String, FnvBuildHasher>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl AsRef<str>, value: impl Into<String>) {
        self.entries
            .insert(name.as_ref().to_ascii_lowercase(), value.into());
    }

    /// Adds `value` to any existing value of `name`, comma separated, the way
    /// repeated header fields combine.
    pub fn append(&mut self, name: impl AsRef<str>, value: impl AsRef<str>) {
        self.entries
            .entry(name.as_ref().to_ascii_lowercase())
            .and_modify(|existing| {
                existing.push_str(", ");
                existing.push_str(value.as_ref());
            })
            .or_insert_with(|| value.as_ref().to_string());
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&str> {
        self.entries
            .get(&name.as_ref().to_ascii_lowercase())
            .map(String::as_str)
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.entries
            .contains_key(&name.as_ref().to_ascii_lowercase())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The inbound side of an exchange.
#[derive(Debug, Clone)]
pub struct Request {
    method: Method,
    path: String,
    query: Option<String>,
    headers: Headers,
    body: Vec<u8>,
}

impl Request {
    /// Builds a request from a method and a request target such as
    /// `/ball/soccer?amount=3`. Everything after the first `?` is kept as the
    /// raw query string.
    pub fn new(method: impl Into<Method>, target: impl AsRef<str>) -> Self {
        let target = target.as_ref();
        match target.split_once('?') {
            Some((path, query)) => Self::from_parts(method, path, Some(query.to_string())),
            None => Self::from_parts(method, target, None),
        }
    }

    /// Builds a request from an already separated path and raw query. The
    /// path is used as given, so it may contain a decoded `?`.
    pub fn from_parts(
        method: impl Into<Method>,
        path: impl Into<String>,
        query: Option<String>,
    ) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            query,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn with_header(mut self, name: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Decodes the query string as `application/x-www-form-urlencoded` pairs.
    pub fn query_pairs(&self) -> Vec<(Cow<'_, str>, Cow<'_, str>)> {
        match &self.query {
            Some(query) => url::form_urlencoded::parse(query.as_bytes()).collect(),
            None => Vec::new(),
        }
    }

    /// First decoded value of the query parameter `name`.
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_ref()?;
        url::form_urlencoded::parse(query.as_bytes())
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.into_owned())
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }
}

/// The outbound side of an exchange.
///
/// Nothing in the dispatch core writes the final chain status here on its own;
/// handlers and interceptors decide what goes out. The exceptions are the
/// not-found and internal-error answers produced by the dispatcher itself.
#[derive(Debug, Default, Clone)]
pub struct Response {
    status: Option<Status>,
    headers: Headers,
    body: Vec<u8>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(&self) -> Option<Status> {
        self.status
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    /// True once a status has been recorded, explicitly or by a write.
    pub fn written(&self) -> bool {
        self.status.is_some()
    }

    /// Appends to the body. The first write without an explicit status
    /// records `200 OK`.
    pub fn write(&mut self, bytes: impl AsRef<[u8]>) {
        if !self.written() {
            self.status = Some(Status::OK);
        }
        self.body.extend_from_slice(bytes.as_ref());
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut Headers {
        &mut self.headers
    }

    pub fn body(&self) -> &[u8] {
        &self.body
    }

    pub fn take_body(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.body)
    }
}
