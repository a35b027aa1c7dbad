//! Segment tree for route lookup.
//!
//! # Responsibilities
//! - Grow nodes lazily while routes are registered
//! - Store one handler per method per node
//! - Resolve (path, method) into a handler plus bound parameters
//! - Tell "no such path" (404) apart from "no such method" (405)
//!
//! # Design Decisions
//! - Literal children live in a map keyed by label; the parameter child is a
//!   separate optional field, so there is never more than one to choose from
//! - Conflicting parameter names are rejected before the tree is touched
//! - Lookup is O(segments), no backtracking

use std::collections::HashMap;

use axum::http::Method;

use super::params::PathParams;
use super::segment::{decode_label, split_path, Segment};
use super::RouteError;

#[derive(Debug)]
struct Node<H> {
    /// Label that reached this node. `None` only for the root.
    label: Option<String>,
    handlers: HashMap<Method, H>,
    children: HashMap<String, Node<H>>,
    param: Option<Box<ParamChild<H>>>,
}

#[derive(Debug)]
struct ParamChild<H> {
    name: String,
    node: Node<H>,
}

impl<H> Node<H> {
    fn new(label: Option<&str>) -> Self {
        Self {
            label: label.map(str::to_string),
            handlers: HashMap::new(),
            children: HashMap::new(),
            param: None,
        }
    }

    fn allowed_methods(&self) -> Vec<Method> {
        let mut methods: Vec<Method> = self.handlers.keys().cloned().collect();
        methods.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        methods
    }

    fn collect_routes(&self, prefix: &str, out: &mut Vec<(Method, String)>) {
        let path = if prefix.is_empty() { "/" } else { prefix };
        for method in self.allowed_methods() {
            out.push((method, path.to_string()));
        }

        let mut labels: Vec<&String> = self.children.keys().collect();
        labels.sort();
        for label in labels {
            if let Some(child) = self.children.get(label) {
                child.collect_routes(&format!("{}/{}", prefix, label), out);
            }
        }

        if let Some(param) = &self.param {
            param
                .node
                .collect_routes(&format!("{}/{{{}}}", prefix, param.name), out);
        }
    }
}

/// Outcome of [`PathTree::resolve`].
#[derive(Debug)]
pub enum Resolution<'a, H> {
    /// Path and method both matched.
    Matched { handler: &'a H, params: PathParams },
    /// The path exists, but has no handler for the method.
    MethodNotAllowed { allowed: Vec<Method> },
    /// No node chain matches the path.
    NotFound,
}

impl<H> Resolution<'_, H> {
    pub fn path_found(&self) -> bool {
        !matches!(self, Resolution::NotFound)
    }

    pub fn method_found(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }
}

/// Route table keyed by path segment.
#[derive(Debug)]
pub struct PathTree<H> {
    root: Node<H>,
}

impl<H> Default for PathTree<H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<H> PathTree<H> {
    pub fn new() -> Self {
        Self {
            root: Node::new(None),
        }
    }

    /// Register `handler` for `method` on `path`.
    ///
    /// Returns the handler previously registered for the same method and
    /// path, if one was replaced.
    pub fn insert(&mut self, method: Method, path: &str, handler: H) -> Result<Option<H>, RouteError> {
        self.check_params(path)?;

        let mut node = &mut self.root;
        for label in split_path(path) {
            node = match Segment::parse(label) {
                Segment::Literal(literal) => node
                    .children
                    .entry(literal.to_string())
                    .or_insert_with(|| Node::new(Some(literal))),
                Segment::Param(name) => {
                    let param = node.param.get_or_insert_with(|| {
                        Box::new(ParamChild {
                            name: name.to_string(),
                            node: Node::new(Some(label)),
                        })
                    });
                    &mut param.node
                }
            };
        }

        Ok(node.handlers.insert(method, handler))
    }

    /// Walks the existing part of the tree and fails if `path` would put a
    /// second, differently named parameter child on any node.
    fn check_params(&self, path: &str) -> Result<(), RouteError> {
        let mut node = Some(&self.root);
        for label in split_path(path) {
            let Some(current) = node else { break };
            node = match Segment::parse(label) {
                Segment::Literal(literal) => current.children.get(literal),
                Segment::Param(name) => match &current.param {
                    Some(param) if param.name != name => {
                        return Err(RouteError::ConflictingParameter {
                            path: path.to_string(),
                            existing: param.name.clone(),
                            attempted: name.to_string(),
                        });
                    }
                    Some(param) => Some(&param.node),
                    None => None,
                },
            };
        }
        Ok(())
    }

    /// Resolve a request path and method.
    pub fn resolve(&self, path: &str, method: &Method) -> Resolution<'_, H> {
        let mut node = &self.root;
        let mut params = PathParams::new();

        for raw in split_path(path) {
            let label = decode_label(raw);
            let label = label.as_ref();
            if let Some(child) = node.children.get(label) {
                node = child;
                continue;
            }

            // A label repeating the node's own label stops the walk here.
            if node.label.as_deref() == Some(label) {
                break;
            }

            match &node.param {
                Some(param) => {
                    params.insert(&param.name, label);
                    node = &param.node;
                }
                None => return Resolution::NotFound,
            }
        }

        match node.handlers.get(method) {
            Some(handler) => Resolution::Matched { handler, params },
            None => Resolution::MethodNotAllowed {
                allowed: node.allowed_methods(),
            },
        }
    }

    /// Every registered (method, path) pair, literal children before the
    /// parameter child, in label order.
    pub fn routes(&self) -> Vec<(Method, String)> {
        let mut out = Vec::new();
        self.root.collect_routes("", &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree(routes: &[(Method, &str, &'static str)]) -> PathTree<&'static str> {
        let mut tree = PathTree::new();
        for (method, path, handler) in routes {
            tree.insert(method.clone(), path, *handler).unwrap();
        }
        tree
    }

    fn matched(resolution: Resolution<'_, &'static str>) -> (&'static str, PathParams) {
        match resolution {
            Resolution::Matched { handler, params } => (*handler, params),
            other => panic!("expected a match, got {:?}", other),
        }
    }

    #[test]
    fn test_literal_routes_resolve() {
        let tree = tree(&[
            (Method::GET, "/", "root"),
            (Method::GET, "/users", "list"),
            (Method::POST, "/users", "create"),
            (Method::GET, "/users/active/recent", "recent"),
        ]);

        assert_eq!(matched(tree.resolve("/", &Method::GET)).0, "root");
        assert_eq!(matched(tree.resolve("/users", &Method::GET)).0, "list");
        assert_eq!(matched(tree.resolve("/users", &Method::POST)).0, "create");
        assert_eq!(matched(tree.resolve("/users/active/recent", &Method::GET)).0, "recent");
    }

    #[test]
    fn test_method_not_allowed() {
        let tree = tree(&[(Method::GET, "/users", "list"), (Method::POST, "/users", "create")]);

        let resolution = tree.resolve("/users", &Method::DELETE);
        assert!(resolution.path_found());
        assert!(!resolution.method_found());
        match resolution {
            Resolution::MethodNotAllowed { allowed } => {
                assert_eq!(allowed, vec![Method::GET, Method::POST]);
            }
            other => panic!("expected 405, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_path_not_found() {
        let tree = tree(&[(Method::GET, "/users", "list")]);

        let resolution = tree.resolve("/orders", &Method::GET);
        assert!(!resolution.path_found());
        assert!(!resolution.method_found());

        assert!(!tree.resolve("/users/42", &Method::GET).path_found());
    }

    #[test]
    fn test_parameter_extraction() {
        let tree = tree(&[
            (Method::GET, "/users/{userId}", "user"),
            (Method::GET, "/users/{userId}/posts/{postId}", "post"),
        ]);

        let (handler, params) = matched(tree.resolve("/users/42", &Method::GET));
        assert_eq!(handler, "user");
        assert_eq!(params.get("userId"), Some("42"));
        assert_eq!(params.len(), 1);

        let (handler, params) = matched(tree.resolve("/users/7/posts/99", &Method::GET));
        assert_eq!(handler, "post");
        assert_eq!(params.get("userId"), Some("7"));
        assert_eq!(params.get("postId"), Some("99"));
    }

    #[test]
    fn test_literal_beats_parameter() {
        let tree = tree(&[
            (Method::GET, "/users/{userId}", "user"),
            (Method::GET, "/users/me", "me"),
        ]);

        let (handler, params) = matched(tree.resolve("/users/me", &Method::GET));
        assert_eq!(handler, "me");
        assert!(params.get("userId").is_none());

        let (handler, params) = matched(tree.resolve("/users/you", &Method::GET));
        assert_eq!(handler, "user");
        assert_eq!(params.get("userId"), Some("you"));
    }

    #[test]
    fn test_reregistration_replaces_handler() {
        let mut tree = PathTree::new();
        assert_eq!(tree.insert(Method::GET, "/users", "first").unwrap(), None);
        assert_eq!(tree.insert(Method::GET, "/users", "second").unwrap(), Some("first"));

        assert_eq!(matched(tree.resolve("/users", &Method::GET)).0, "second");
    }

    #[test]
    fn test_conflicting_parameter_names_rejected() {
        let mut tree = PathTree::new();
        tree.insert(Method::GET, "/users/{userId}", "user").unwrap();

        let err = tree
            .insert(Method::GET, "/users/{id}/posts", "posts")
            .unwrap_err();
        assert_eq!(
            err,
            RouteError::ConflictingParameter {
                path: "/users/{id}/posts".to_string(),
                existing: "userId".to_string(),
                attempted: "id".to_string(),
            }
        );

        // The rejected route left nothing behind.
        assert!(!tree.resolve("/users/1/posts", &Method::GET).path_found());

        // Reusing the same name is fine.
        tree.insert(Method::GET, "/users/{userId}/posts", "posts").unwrap();
        assert_eq!(matched(tree.resolve("/users/1/posts", &Method::GET)).0, "posts");
    }

    #[test]
    fn test_percent_encoded_segments() {
        let tree = tree(&[
            (Method::GET, "/users/{userId}", "user"),
            (Method::GET, "/café", "cafe"),
        ]);

        let (handler, params) = matched(tree.resolve("/users/john%20doe", &Method::GET));
        assert_eq!(handler, "user");
        assert_eq!(params.get("userId"), Some("john doe"));

        let (handler, _) = matched(tree.resolve("/caf%C3%A9", &Method::GET));
        assert_eq!(handler, "cafe");

        let (_, params) = matched(tree.resolve("/users/bad%FF", &Method::GET));
        assert_eq!(params.get("userId"), Some("bad%FF"));
    }

    #[test]
    fn test_malformed_paths_resolve_to_root() {
        let tree = tree(&[(Method::GET, "/", "root")]);

        assert_eq!(matched(tree.resolve("", &Method::GET)).0, "root");
        assert_eq!(matched(tree.resolve("///", &Method::GET)).0, "root");
    }

    #[test]
    fn test_slashes_are_normalized() {
        let tree = tree(&[(Method::GET, "/users//active/", "active")]);

        assert_eq!(matched(tree.resolve("/users/active", &Method::GET)).0, "active");
        assert_eq!(matched(tree.resolve("//users/active//", &Method::GET)).0, "active");
    }

    #[test]
    fn test_repeated_label_stops_at_node() {
        let tree = tree(&[(Method::GET, "/status", "status")]);

        assert_eq!(matched(tree.resolve("/status/status", &Method::GET)).0, "status");
        assert!(!tree.resolve("/status/other", &Method::GET).path_found());
    }

    #[test]
    fn test_intermediate_node_is_path_found() {
        let tree = tree(&[(Method::GET, "/api/v1/items", "items")]);

        let resolution = tree.resolve("/api/v1", &Method::GET);
        assert!(resolution.path_found());
        assert!(!resolution.method_found());
    }

    #[test]
    fn test_arbitrary_method_token() {
        let propfind = Method::from_bytes(b"PROPFIND").unwrap();
        let tree = tree(&[(propfind.clone(), "/files", "dav")]);

        assert_eq!(matched(tree.resolve("/files", &propfind)).0, "dav");
        assert!(!tree.resolve("/files", &Method::GET).method_found());
    }

    #[test]
    fn test_routes_listing() {
        let tree = tree(&[
            (Method::GET, "/", "root"),
            (Method::GET, "/users/{userId}", "user"),
            (Method::GET, "/users/me", "me"),
            (Method::POST, "/users", "create"),
        ]);

        assert_eq!(
            tree.routes(),
            vec![
                (Method::GET, "/".to_string()),
                (Method::POST, "/users".to_string()),
                (Method::GET, "/users/me".to_string()),
                (Method::GET, "/users/{userId}".to_string()),
            ]
        );
    }
}
