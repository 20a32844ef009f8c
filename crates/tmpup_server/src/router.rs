//! Ordered regular-expression route table.
//!
//! Routes are tried in registration order and the first one whose verb and
//! whole-path pattern match wins. Capture groups become positional string
//! arguments handed to the handler.

use crate::request::Request;
use crate::response::Response;
use axum::http::StatusCode;
use regex::{Regex, RegexBuilder};
use thiserror::Error;

/// Request verbs understood by the route table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    /// Any other verb; never matches a route.
    Other,
}

impl Method {
    pub fn from_http(method: &axum::http::Method) -> Self {
        match *method {
            axum::http::Method::GET => Self::Get,
            axum::http::Method::POST => Self::Post,
            _ => Self::Other,
        }
    }
}

/// Handler signature: shared state, decoded request, captured arguments.
pub type Handler<S> = fn(&S, &Request, &[String]) -> Response;

/// Route registration failure.
#[derive(Debug, Error)]
pub enum RouteError {
    #[error("invalid pattern '{pattern}' for route '{name}': {source}")]
    Pattern {
        name: &'static str,
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("route '{0}' cannot be registered for an unsupported method")]
    Method(&'static str),
}

struct Route<S> {
    method: Method,
    name: &'static str,
    pattern: Regex,
    handler: Handler<S>,
}

/// Result of a successful [`Dispatcher::dispatch`].
pub struct RouteMatch<'d, S> {
    route: &'d Route<S>,
    args: Vec<String>,
}

impl<S> RouteMatch<'_, S> {
    /// Name the matched route was registered with.
    pub fn name(&self) -> &'static str {
        self.route.name
    }

    /// Captured path parameters, left to right.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Immutable-after-startup route table.
pub struct Dispatcher<S> {
    routes: Vec<Route<S>>,
}

impl<S> Default for Dispatcher<S> {
    fn default() -> Self {
        Self { routes: Vec::new() }
    }
}

impl<S> std::fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|route| (route.method, route.name)))
            .finish()
    }
}

impl<S> Dispatcher<S> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a route to the table.
    ///
    /// The pattern is anchored over the whole path and matched
    /// case-insensitively.
    ///
    /// # Arguments
    /// - `method`: Verb the route answers.
    /// - `name`: Static handler name used in logs.
    /// - `pattern`: Regular expression with capture groups for parameters.
    /// - `handler`: Function invoked on match.
    ///
    /// # Errors
    /// Returns [`RouteError::Pattern`] when the pattern does not compile and
    /// [`RouteError::Method`] for [`Method::Other`].
    pub fn register(
        &mut self,
        method: Method,
        name: &'static str,
        pattern: &str,
        handler: Handler<S>,
    ) -> Result<&mut Self, RouteError> {
        if method == Method::Other {
            return Err(RouteError::Method(name));
        }
        let compiled = RegexBuilder::new(&format!("^(?:{})$", pattern))
            .case_insensitive(true)
            .build()
            .map_err(|source| RouteError::Pattern {
                name,
                pattern: pattern.to_string(),
                source,
            })?;
        self.routes.push(Route {
            method,
            name,
            pattern: compiled,
            handler,
        });
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }

    /// Find the first route matching `method` and `path`.
    ///
    /// Captures stop at the first group that did not participate in the
    /// match, so trailing optional groups are omitted.
    pub fn dispatch(&self, method: Method, path: &str) -> Option<RouteMatch<'_, S>> {
        if method == Method::Other {
            return None;
        }
        self.routes
            .iter()
            .filter(|route| route.method == method)
            .find_map(|route| {
                let captures = route.pattern.captures(path)?;
                let args = captures
                    .iter()
                    .skip(1)
                    .map_while(|group| group.map(|group| group.as_str().to_string()))
                    .collect();
                Some(RouteMatch { route, args })
            })
    }

    /// Dispatch `request` and run the matched handler.
    ///
    /// # Returns
    /// The handler response, or a 404 in the representation the client
    /// prefers when nothing matches.
    pub fn process(&self, state: &S, request: &Request) -> Response {
        match self.dispatch(request.method, &request.path) {
            Some(matched) => {
                tracing::debug!(
                    route = matched.name(),
                    path = %request.path,
                    args = ?matched.args(),
                    "dispatching"
                );
                (matched.route.handler)(state, request, matched.args())
            }
            None => {
                tracing::debug!(method = ?request.method, path = %request.path, "no route");
                Response::status(StatusCode::NOT_FOUND, request.mime())
            }
        }
    }
}
