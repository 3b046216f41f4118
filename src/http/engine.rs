//! Request dispatch engine.
//!
//! # Responsibilities
//! - Own the route table and the global middleware chain
//! - Turn (method, path) into the handler chain to run
//! - Build the not-found / method-not-allowed chains
//!
//! # Design Decisions
//! - Built single-threaded at startup, then shared read-only via `Arc`
//! - Whether a path registered under another method yields 405 is an engine
//!   option; the route table only answers which methods accept a path

use axum::body::Bytes;
use axum::http::request::Parts;
use axum::http::{header, HeaderValue};
use axum::response::Response;

use crate::http::context::{Context, Handler, HandlerChain};
use crate::http::group::RouteGroup;
use crate::http::response::{method_not_allowed, not_found};
use crate::routing::{join_paths, Match, Method, Params, RouteResult, RouteTable};

/// Engine behaviour switches.
#[derive(Debug, Clone, Default)]
pub struct EngineOptions {
    /// Answer 405 instead of 404 when the path exists under another method.
    pub handle_method_not_allowed: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Matched,
    NotFound,
    MethodNotAllowed,
}

/// Resolution result handed to the handler chain runner.
pub struct Dispatch {
    pub handlers: HandlerChain,
    pub params: Params,
    pub outcome: Outcome,
    /// Methods that accept the path, filled for [`Outcome::MethodNotAllowed`].
    pub allowed: Vec<Method>,
}

pub struct Engine {
    table: RouteTable<Handler>,
    middleware: Vec<Handler>,
    no_route: Vec<Handler>,
    no_method: Vec<Handler>,
    no_route_chain: HandlerChain,
    no_method_chain: HandlerChain,
    options: EngineOptions,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineOptions::default())
    }
}

impl Engine {
    pub fn new(options: EngineOptions) -> Self {
        let mut engine = Self {
            table: RouteTable::new(),
            middleware: Vec::new(),
            no_route: Vec::new(),
            no_method: Vec::new(),
            no_route_chain: Vec::<Handler>::new().into(),
            no_method_chain: Vec::<Handler>::new().into(),
            options,
        };
        engine.rebuild_fallbacks();
        engine
    }

    /// Append global middleware. Applies to routes registered afterwards and
    /// to the not-found / method-not-allowed chains.
    pub fn use_middleware(&mut self, middleware: Handler) {
        self.middleware.push(middleware);
        self.rebuild_fallbacks();
    }

    /// Handlers to run when no route matches.
    pub fn no_route(&mut self, handlers: Vec<Handler>) {
        self.no_route = handlers;
        self.rebuild_fallbacks();
    }

    /// Handlers to run when the path only exists under other methods.
    pub fn no_method(&mut self, handlers: Vec<Handler>) {
        self.no_method = handlers;
        self.rebuild_fallbacks();
    }

    fn rebuild_fallbacks(&mut self) {
        self.no_route_chain = compose(&self.middleware, &self.no_route, not_found());
        self.no_method_chain = compose(&self.middleware, &self.no_method, method_not_allowed());
    }

    /// A route group under `prefix` whose chain starts with the global
    /// middleware followed by `handlers`.
    pub fn group(&mut self, prefix: &str, handlers: Vec<Handler>) -> RouteGroup<'_> {
        let prefix = join_paths("/", prefix);
        let chain = [self.middleware.clone(), handlers].concat();
        RouteGroup::new(self, prefix, chain)
    }

    pub fn route<F>(&mut self, method: Method, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.group("/", Vec::new()).route(method, path, f)
    }

    pub fn get<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Get, path, f)
    }

    pub fn post<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Post, path, f)
    }

    pub fn put<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Put, path, f)
    }

    pub fn delete<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Delete, path, f)
    }

    pub fn patch<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Patch, path, f)
    }

    pub fn head<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Head, path, f)
    }

    pub fn options<F>(&mut self, path: &str, f: F) -> RouteResult<()>
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.route(Method::Options, path, f)
    }

    pub(crate) fn register(&mut self, method: Method, path: &str, chain: Vec<Handler>) -> RouteResult<()> {
        self.table.register(method, path, chain)
    }

    /// Pick the chain for a request.
    pub fn dispatch(&self, method: &axum::http::Method, path: &str) -> Dispatch {
        let found = Method::try_from(method)
            .ok()
            .and_then(|m| self.table.lookup(m, path));

        if let Some(Match { handlers, params }) = found {
            return Dispatch {
                handlers,
                params,
                outcome: Outcome::Matched,
                allowed: Vec::new(),
            };
        }

        if self.options.handle_method_not_allowed {
            let allowed = self.table.allowed_methods(path);
            if !allowed.is_empty() {
                return Dispatch {
                    handlers: self.no_method_chain.clone(),
                    params: Params::new(),
                    outcome: Outcome::MethodNotAllowed,
                    allowed,
                };
            }
        }

        Dispatch {
            handlers: self.no_route_chain.clone(),
            params: Params::new(),
            outcome: Outcome::NotFound,
            allowed: Vec::new(),
        }
    }

    /// Run the chain for one request and produce its response.
    pub fn handle(&self, request: Parts, body: Bytes) -> Response {
        let dispatch = self.dispatch(&request.method, request.uri.path());
        if dispatch.outcome != Outcome::Matched {
            tracing::debug!(
                method = %request.method,
                path = %request.uri.path(),
                outcome = ?dispatch.outcome,
                "No route matched"
            );
        }

        let mut ctx = Context::new(request, body, dispatch.handlers, dispatch.params);
        ctx.next();
        let mut response = ctx.into_response();

        if dispatch.outcome == Outcome::MethodNotAllowed
            && !response.headers().contains_key(header::ALLOW)
        {
            let allow = dispatch
                .allowed
                .iter()
                .map(|m| m.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            if let Ok(value) = HeaderValue::from_str(&allow) {
                response.headers_mut().insert(header::ALLOW, value);
            }
        }
        response
    }

    /// All registered `(method, pattern)` pairs.
    pub fn routes(&self) -> Vec<(Method, String)> {
        self.table.routes()
    }
}

fn compose(middleware: &[Handler], user: &[Handler], terminal: Handler) -> HandlerChain {
    middleware
        .iter()
        .chain(user)
        .cloned()
        .chain(std::iter::once(terminal))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::context::{handler, parts};
    use crate::http::middleware::recovery;
    use axum::http::{Method as HttpMethod, StatusCode};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn call(engine: &Engine, method: HttpMethod, uri: &str) -> Response {
        engine.handle(parts(method, uri), Bytes::new())
    }

    #[test]
    fn test_dispatch_matched_with_params() {
        let mut engine = Engine::default();
        engine
            .get("/users/:id", |ctx| {
                let id = ctx.param("id").unwrap_or_default().to_string();
                ctx.string(StatusCode::OK, &id);
            })
            .unwrap();

        let dispatch = engine.dispatch(&HttpMethod::GET, "/users/42");
        assert_eq!(dispatch.outcome, Outcome::Matched);
        assert_eq!(dispatch.params.get("id"), Some("42"));

        let response = call(&engine, HttpMethod::GET, "/users/42");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[test]
    fn test_not_found_vs_method_not_allowed() {
        let mut plain = Engine::default();
        plain.get("/items", |ctx| ctx.string(StatusCode::OK, "list")).unwrap();
        assert_eq!(
            plain.dispatch(&HttpMethod::POST, "/items").outcome,
            Outcome::NotFound
        );

        let mut strict = Engine::new(EngineOptions {
            handle_method_not_allowed: true,
        });
        strict.get("/items", |ctx| ctx.string(StatusCode::OK, "list")).unwrap();
        strict.delete("/items", |ctx| ctx.string(StatusCode::OK, "gone")).unwrap();

        let response = call(&strict, HttpMethod::POST, "/items");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            response.headers().get(header::ALLOW).unwrap(),
            "GET, DELETE"
        );

        let response = call(&strict, HttpMethod::TRACE, "/items");
        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);

        let response = call(&strict, HttpMethod::POST, "/missing");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_global_middleware_wraps_routes_and_fallbacks() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let mut engine = Engine::default();
        engine.use_middleware(handler(move |ctx| {
            counter.fetch_add(1, Ordering::SeqCst);
            ctx.next();
        }));
        engine.get("/a", |ctx| ctx.string(StatusCode::OK, "a")).unwrap();

        call(&engine, HttpMethod::GET, "/a");
        call(&engine, HttpMethod::GET, "/nowhere");
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_custom_no_route_chain() {
        let mut engine = Engine::default();
        engine.no_route(vec![handler(|ctx| {
            ctx.string(StatusCode::NOT_FOUND, "nothing here");
        })]);

        let response = call(&engine, HttpMethod::GET, "/x");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }

    #[test]
    fn test_recovery_middleware_turns_panic_into_500() {
        let mut engine = Engine::default();
        engine.use_middleware(recovery());
        engine.get("/boom", |_| panic!("handler failure")).unwrap();

        let response = call(&engine, HttpMethod::GET, "/boom");
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let mut engine = Engine::default();
        engine.get("/a", |_| {}).unwrap();
        assert!(engine.get("/a", |_| {}).is_err());
        assert!(engine.post("/a", |_| {}).is_ok());
        assert_eq!(engine.routes().len(), 2);
    }
}
