mod node;

use crate::exchange::UriVars;
use crate::router::node::{Node, NodeId, ROOT, Segment};
use thiserror::Error;

/// Errors produced while registering or resolving routes.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RouteError {
    /// No registered route resolves the path. This is an ordinary outcome of a
    /// lookup, not a fault.
    #[error("Route '{path}' was not found.")]
    NotFound { path: String },

    #[error("Route '{pattern}' already exists.")]
    DuplicateRoute { pattern: String },

    /// Only one wildcard name is allowed per level.
    #[error(
        "Route '{pattern}' declares wildcard '{{{requested}}}' where '{{{existing}}}' is already registered."
    )]
    ConflictingWildcard {
        pattern: String,
        existing: String,
        requested: String,
    },

    #[error("Route '{pattern}' is malformed: {reason}.")]
    MalformedPattern { pattern: String, reason: String },

    /// The pattern produced no nodes, or a segment would put a literal and a
    /// wildcard side by side on the same level.
    #[error("Cannot append route '{pattern}' at segment '{segment}'.")]
    CannotAppend { pattern: String, segment: String },
}

impl RouteError {
    #[inline]
    pub fn not_found(path: impl Into<String>) -> Self {
        Self::NotFound { path: path.into() }
    }

    #[inline]
    pub(crate) fn duplicate_route(pattern: impl Into<String>) -> Self {
        Self::DuplicateRoute {
            pattern: pattern.into(),
        }
    }

    #[inline]
    pub(crate) fn conflicting_wildcard(
        pattern: impl Into<String>,
        existing: impl Into<String>,
        requested: impl Into<String>,
    ) -> Self {
        Self::ConflictingWildcard {
            pattern: pattern.into(),
            existing: existing.into(),
            requested: requested.into(),
        }
    }

    #[inline]
    pub(crate) fn malformed_pattern(pattern: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPattern {
            pattern: pattern.into(),
            reason: reason.into(),
        }
    }

    #[inline]
    pub(crate) fn cannot_append(pattern: impl Into<String>, segment: impl Into<String>) -> Self {
        Self::CannotAppend {
            pattern: pattern.into(),
            segment: segment.into(),
        }
    }
}

/// Result of a successful [`PathTrie::find`].
#[derive(Debug)]
pub struct RouteMatch<'a, T> {
    pub uri_vars: UriVars,
    pub value: &'a T,
    pattern: String,
}

impl<T> RouteMatch<'_, T> {
    /// The registered pattern that resolved the path, e.g. `/ball/{kind}`.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }
}

/// Trims surrounding whitespace and a trailing slash, except for `/` itself.
fn normalize(pattern: &str) -> &str {
    let pattern = pattern.trim();
    if pattern.len() > 1 {
        pattern.strip_suffix('/').unwrap_or(pattern)
    } else {
        pattern
    }
}

/// Prefix tree of slash-delimited path segments.
///
/// Patterns look like `/a/{var}/b`. Registration keeps every level
/// unambiguous: a node has either literal children or a single wildcard
/// child, never both, so a lookup only ever has one candidate per segment and
/// never backtracks.
///
/// The trie is built during startup and read-only afterwards. Lookups take
/// `&self`, registration takes `&mut self`, so the two cannot interleave.
pub struct PathTrie<T> {
    nodes: Vec<Node<T>>,
    routes: usize,
}

impl<T> Default for PathTrie<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> PathTrie<T> {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::root()],
            routes: 0,
        }
    }

    /// Number of bound routes.
    pub fn len(&self) -> usize {
        self.routes
    }

    pub fn is_empty(&self) -> bool {
        self.routes == 0
    }

    /// Binds `value` to `pattern`.
    ///
    /// `/test` and `/test/` name the same route. Fails when the pattern is
    /// malformed, already bound, introduces a second wildcard name on a level,
    /// mixes a literal and a wildcard on one level, or has no segments at all.
    pub fn insert(&mut self, pattern: &str, value: T) -> Result<(), RouteError> {
        let normalized = normalize(pattern);
        let segments = normalized
            .split('/')
            .filter(|s| !s.is_empty())
            .map(|raw| Segment::parse(normalized, raw))
            .collect::<Result<Vec<_>, _>>()?;

        if segments.is_empty() {
            return Err(RouteError::cannot_append(normalized, normalized));
        }

        let mut current = ROOT;
        for (depth, segment) in segments.iter().enumerate() {
            log::trace!(
                "Segment '{segment}' at depth {depth} (wild: {})",
                segment.is_wildcard()
            );
            current = self.descend_or_create(normalized, current, segment)?;
        }

        let node = &mut self.nodes[current];
        if node.value.is_some() {
            return Err(RouteError::duplicate_route(normalized));
        }
        node.value = Some(value);
        self.routes += 1;
        log::debug!("Registered route '{normalized}' ({} routes)", self.routes);
        Ok(())
    }

    fn descend_or_create(
        &mut self,
        pattern: &str,
        current: NodeId,
        segment: &Segment<'_>,
    ) -> Result<NodeId, RouteError> {
        let node = &self.nodes[current];
        match segment {
            Segment::Static(text) => {
                if node.has_wildcard_child() {
                    return Err(RouteError::cannot_append(pattern, *text));
                }
                if let Some(&child) = node.children.get(*text) {
                    return Ok(child);
                }
            }
            Segment::Wildcard(name) => {
                if let Some(child) = node.wildcard_child {
                    let existing = &self.nodes[child].name;
                    if existing != name {
                        return Err(RouteError::conflicting_wildcard(pattern, existing, *name));
                    }
                    return Ok(child);
                }
                if !node.children.is_empty() {
                    return Err(RouteError::cannot_append(pattern, segment.to_string()));
                }
            }
        }

        let child = self.nodes.len();
        self.nodes.push(Node::new(segment, current));
        let parent = &mut self.nodes[current];
        match segment {
            Segment::Static(text) => {
                parent.children.insert(text.to_string(), child);
            }
            Segment::Wildcard(_) => parent.wildcard_child = Some(child),
        }
        Ok(child)
    }

    fn find_child(&self, current: NodeId, segment: &str) -> Option<NodeId> {
        let node = &self.nodes[current];
        node.children.get(segment).copied().or(node.wildcard_child)
    }

    /// Resolves a concrete request path.
    ///
    /// Each segment takes the literal child of the same text, falling back to
    /// the level's wildcard child, whose variable then records the segment.
    /// When no child exists and the walk currently sits on a wildcard node,
    /// the rest of the path is appended to that node's variable and the walk
    /// stops there. Only this nearest wildcard absorbs the remainder.
    pub fn find(&self, path: &str) -> Result<RouteMatch<'_, T>, RouteError> {
        let path = path.trim();
        let parts: Vec<&str> = path.split('/').collect();
        let mut uri_vars = UriVars::new();
        let mut current = ROOT;

        for (i, part) in parts.iter().enumerate() {
            if i == 0 && part.is_empty() {
                continue;
            }
            match self.find_child(current, part) {
                Some(child) => {
                    let node = &self.nodes[child];
                    if node.is_wildcard {
                        uri_vars.insert(node.name.as_str(), *part);
                    }
                    current = child;
                }
                None => {
                    let node = &self.nodes[current];
                    if !node.is_wildcard {
                        return Err(RouteError::not_found(path));
                    }
                    let mut rest = String::with_capacity(path.len());
                    for remaining in &parts[i..] {
                        rest.push('/');
                        rest.push_str(remaining);
                    }
                    log::trace!("Wildcard '{}' absorbs remainder '{rest}'", node.name);
                    uri_vars.append(&node.name, &rest);
                    break;
                }
            }
        }

        match &self.nodes[current].value {
            Some(value) => Ok(RouteMatch {
                uri_vars,
                value,
                pattern: self.pattern_of(current),
            }),
            None => Err(RouteError::not_found(path)),
        }
    }

    /// Rebuilds the registered pattern of `id` by walking parent links.
    fn pattern_of(&self, id: NodeId) -> String {
        let mut segments = Vec::new();
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ROOT {
                break;
            }
            let node = &self.nodes[current];
            segments.push(node.segment_text());
            cursor = node.parent;
        }
        let mut pattern = String::new();
        for segment in segments.iter().rev() {
            pattern.push('/');
            pattern.push_str(segment);
        }
        pattern
    }

    /// Every bound pattern, sorted.
    pub fn routes(&self) -> Vec<String> {
        let mut routes: Vec<String> = self
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, node)| node.value.is_some())
            .map(|(id, _)| self.pattern_of(id))
            .collect();
        routes.sort();
        routes
    }
}
