use crate::router::RouteError;
use fnv::FnvBuildHasher;
use std::collections::HashMap;
use std::fmt::{Display, Formatter};

pub(crate) type NodeId = usize;

pub(crate) const ROOT: NodeId = 0;

/// One parsed pattern segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Segment<'a> {
    /// Literal text that must match the request segment exactly.
    Static(&'a str),
    /// `{name}`: binds whatever the request carries at this position.
    Wildcard(&'a str),
}

impl<'a> Segment<'a> {
    /// A segment is a wildcard when it is fully wrapped in braces. Any other
    /// use of a brace makes the pattern malformed.
    pub(crate) fn parse(pattern: &str, raw: &'a str) -> Result<Self, RouteError> {
        if let Some(inner) = raw.strip_prefix('{').and_then(|s| s.strip_suffix('}')) {
            if inner.is_empty() {
                return Err(RouteError::malformed_pattern(
                    pattern,
                    "wildcard segment has an empty name",
                ));
            }
            if inner.contains(['{', '}']) {
                return Err(RouteError::malformed_pattern(
                    pattern,
                    format!("wildcard segment '{raw}' contains nested braces"),
                ));
            }
            return Ok(Segment::Wildcard(inner));
        }
        if raw.contains(['{', '}']) {
            return Err(RouteError::malformed_pattern(
                pattern,
                format!("segment '{raw}' is not fully enclosed in braces"),
            ));
        }
        Ok(Segment::Static(raw))
    }

    pub(crate) fn is_wildcard(&self) -> bool {
        matches!(self, Segment::Wildcard(_))
    }
}

impl Display for Segment<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Segment::Static(s) => write!(f, "{s}"),
            Segment::Wildcard(name) => write!(f, "{{{name}}}"),
        }
    }
}

/// A trie node, stored in the trie's arena and addressed by [`NodeId`].
///
/// `children` holds literal children keyed by their text. A wildcard child is
/// kept apart in `wildcard_child`; registration guarantees a node never has
/// both.
pub(crate) struct Node<T> {
    /// Literal text, or the variable name for a wildcard node. Empty for the root.
    pub(crate) name: String,
    pub(crate) is_wildcard: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: HashMap<String, NodeId, FnvBuildHasher>,
    pub(crate) wildcard_child: Option<NodeId>,
    pub(crate) value: Option<T>,
}

impl<T> Node<T> {
    pub(crate) fn root() -> Self {
        Self {
            name: String::new(),
            is_wildcard: false,
            parent: None,
            children: HashMap::with_hasher(FnvBuildHasher::default()),
            wildcard_child: None,
            value: None,
        }
    }

    pub(crate) fn new(segment: &Segment<'_>, parent: NodeId) -> Self {
        let (name, is_wildcard) = match segment {
            Segment::Static(text) => (text.to_string(), false),
            Segment::Wildcard(name) => (name.to_string(), true),
        };
        Self {
            name,
            is_wildcard,
            parent: Some(parent),
            children: HashMap::with_hasher(FnvBuildHasher::default()),
            wildcard_child: None,
            value: None,
        }
    }

    pub(crate) fn has_wildcard_child(&self) -> bool {
        self.wildcard_child.is_some()
    }

    /// Renders this node's own segment the way it was written in the pattern.
    pub(crate) fn segment_text(&self) -> String {
        if self.is_wildcard {
            format!("{{{}}}", self.name)
        } else {
            self.name.clone()
        }
    }
}
