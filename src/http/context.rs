//! Per-request context and the handler chain.
//!
//! # Responsibilities
//! - Carry the request, bound path parameters and the response being built
//! - Run the handler chain (onion model: `next()` runs everything downstream
//!   and returns, so a handler can act both before and after)
//! - Body binding (JSON, url-encoded forms) and JSON rendering
//!
//! # Design Decisions
//! - Handlers are synchronous; the server runs a whole chain on the blocking
//!   pool, so a chain never holds an async runtime worker while it works
//! - The response is buffered and the first status write wins

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::{header, Extensions, HeaderMap, HeaderName, HeaderValue, Method, StatusCode, Uri};
use axum::response::Response;
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::routing::Params;

/// A request handler or middleware.
pub type Handler = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Ordered handlers for one route, shared between the route table and every
/// request that hits the route.
pub type HandlerChain = Arc<[Handler]>;

/// Box a closure as a [`Handler`].
pub fn handler<F>(f: F) -> Handler
where
    F: Fn(&mut Context) + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Errors from decoding a request body.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("invalid JSON body: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid form data: {0}")]
    Form(#[from] serde_urlencoded::de::Error),
}

pub struct Context {
    request: Parts,
    body: Bytes,
    params: Params,

    handlers: HandlerChain,
    index: usize,
    aborted: bool,

    status: StatusCode,
    written: bool,
    response_headers: HeaderMap,
    response_body: Vec<u8>,
}

impl Context {
    pub fn new(request: Parts, body: Bytes, handlers: HandlerChain, params: Params) -> Self {
        Self {
            request,
            body,
            params,
            handlers,
            index: 0,
            aborted: false,
            status: StatusCode::OK,
            written: false,
            response_headers: HeaderMap::new(),
            response_body: Vec::new(),
        }
    }

    /// Run the rest of the chain.
    pub fn next(&mut self) {
        while !self.aborted && self.index < self.handlers.len() {
            let handler = Arc::clone(&self.handlers[self.index]);
            self.index += 1;
            handler(self);
        }
    }

    /// Stop the chain; handlers after the current one are skipped.
    pub fn abort(&mut self) {
        self.aborted = true;
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    // Request

    pub fn method(&self) -> &Method {
        &self.request.method
    }

    pub fn uri(&self) -> &Uri {
        &self.request.uri
    }

    pub fn path(&self) -> &str {
        self.request.uri.path()
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.request.headers.get(name)?.to_str().ok()
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Value bound to the dynamic segment `name`.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    /// First value of the query-string parameter `name`.
    pub fn query(&self, name: &str) -> Option<String> {
        let pairs: Vec<(String, String)> =
            serde_urlencoded::from_str(self.request.uri.query().unwrap_or_default()).ok()?;
        pairs.into_iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    /// Typed request-scoped values shared between handlers.
    pub fn extensions(&self) -> &Extensions {
        &self.request.extensions
    }

    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.request.extensions
    }

    // Binding

    pub fn bind_json<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        Ok(serde_json::from_slice(&self.body)?)
    }

    /// Decode an url-encoded form: the body, or the query string when the
    /// request carries no body.
    pub fn bind_form<T: DeserializeOwned>(&self) -> Result<T, BindError> {
        if self.body.is_empty() {
            let query = self.request.uri.query().unwrap_or_default();
            return Ok(serde_urlencoded::from_str(query)?);
        }
        Ok(serde_urlencoded::from_bytes(&self.body)?)
    }

    // Response

    pub fn set_header(&mut self, name: HeaderName, value: HeaderValue) {
        self.response_headers.insert(name, value);
    }

    pub fn response_header(&self, name: &str) -> Option<&str> {
        self.response_headers.get(name)?.to_str().ok()
    }

    /// Set the response status unless one was already written.
    pub fn write_status(&mut self, status: StatusCode) {
        if self.written {
            return;
        }
        self.status = status;
        self.written = true;
    }

    /// Append to the response body, committing `200 OK` if nothing was written.
    pub fn write(&mut self, bytes: &[u8]) {
        self.write_status(StatusCode::OK);
        self.response_body.extend_from_slice(bytes);
    }

    pub fn string(&mut self, status: StatusCode, text: &str) {
        self.set_header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        self.write_status(status);
        self.write(text.as_bytes());
    }

    pub fn json<T: Serialize + ?Sized>(&mut self, status: StatusCode, value: &T) -> serde_json::Result<()> {
        let rendered = serde_json::to_vec(value)?;
        self.set_header(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self.write_status(status);
        self.write(&rendered);
        Ok(())
    }

    pub fn written(&self) -> bool {
        self.written
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn into_response(self) -> Response {
        let mut response = Response::new(Body::from(self.response_body));
        *response.status_mut() = self.status;
        *response.headers_mut() = self.response_headers;
        response
    }
}

#[cfg(test)]
pub(crate) fn parts(method: Method, uri: &str) -> Parts {
    axum::http::Request::builder()
        .method(method)
        .uri(uri)
        .body(())
        .unwrap()
        .into_parts()
        .0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use std::sync::Mutex;

    fn context(handlers: Vec<Handler>) -> Context {
        Context::new(parts(Method::GET, "/x?page=2&q=rust"), Bytes::new(), handlers.into(), Params::new())
    }

    #[test]
    fn test_onion_order() {
        let trace = Arc::new(Mutex::new(Vec::new()));
        let (t1, t2, t3) = (trace.clone(), trace.clone(), trace.clone());

        let mut ctx = context(vec![
            handler(move |ctx| {
                t1.lock().unwrap().push("outer before");
                ctx.next();
                t1.lock().unwrap().push("outer after");
            }),
            handler(move |_| t2.lock().unwrap().push("middle")),
            handler(move |_| t3.lock().unwrap().push("inner")),
        ]);
        ctx.next();

        assert_eq!(
            *trace.lock().unwrap(),
            ["outer before", "middle", "inner", "outer after"]
        );
    }

    #[test]
    fn test_abort_skips_rest() {
        let mut ctx = context(vec![
            handler(|ctx| {
                ctx.string(StatusCode::UNAUTHORIZED, "denied");
                ctx.abort();
            }),
            handler(|ctx| ctx.string(StatusCode::OK, "secret")),
        ]);
        ctx.next();

        assert!(ctx.is_aborted());
        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_first_status_wins() {
        let mut ctx = context(vec![]);
        ctx.write_status(StatusCode::CREATED);
        ctx.write_status(StatusCode::BAD_REQUEST);
        ctx.write(b"a");
        ctx.write(b"b");
        assert_eq!(ctx.status(), StatusCode::CREATED);
        assert!(ctx.written());
    }

    #[test]
    fn test_query() {
        let ctx = context(vec![]);
        assert_eq!(ctx.query("page").as_deref(), Some("2"));
        assert_eq!(ctx.query("q").as_deref(), Some("rust"));
        assert_eq!(ctx.query("missing"), None);
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct Login {
        user: String,
        age: u32,
    }

    #[test]
    fn test_bind_json() {
        let ctx = Context::new(
            parts(Method::POST, "/login"),
            Bytes::from_static(br#"{"user":"ann","age":30}"#),
            Vec::<Handler>::new().into(),
            Params::new(),
        );
        let login: Login = ctx.bind_json().unwrap();
        assert_eq!(login, Login { user: "ann".into(), age: 30 });

        let bad = Context::new(
            parts(Method::POST, "/login"),
            Bytes::from_static(b"{"),
            Vec::<Handler>::new().into(),
            Params::new(),
        );
        assert!(matches!(bad.bind_json::<Login>(), Err(BindError::Json(_))));
    }

    #[test]
    fn test_bind_form_body_and_query() {
        let ctx = Context::new(
            parts(Method::POST, "/login"),
            Bytes::from_static(b"user=bob&age=41"),
            Vec::<Handler>::new().into(),
            Params::new(),
        );
        assert_eq!(ctx.bind_form::<Login>().unwrap(), Login { user: "bob".into(), age: 41 });

        let ctx = Context::new(
            parts(Method::GET, "/login?user=eve&age=22"),
            Bytes::new(),
            Vec::<Handler>::new().into(),
            Params::new(),
        );
        assert_eq!(ctx.bind_form::<Login>().unwrap(), Login { user: "eve".into(), age: 22 });

        let ctx = Context::new(
            parts(Method::GET, "/login?user=eve&age=old"),
            Bytes::new(),
            Vec::<Handler>::new().into(),
            Params::new(),
        );
        assert!(matches!(ctx.bind_form::<Login>(), Err(BindError::Form(_))));
    }

    #[test]
    fn test_json_render() {
        let mut ctx = context(vec![]);
        ctx.json(StatusCode::CREATED, &serde_json::json!({"id": 1})).unwrap();
        assert_eq!(ctx.response_header("content-type"), Some("application/json"));
        let response = ctx.into_response();
        assert_eq!(response.status(), StatusCode::CREATED);
    }
}
