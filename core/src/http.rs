//! Interceptor-chain HTTP execution layer.
//!
//! # Design
//! Requests and responses are plain owned data. `execute_request` folds the
//! context's interceptors (outermost first) around a base transport step
//! that issues exactly one underlying HTTP call per invocation. Retries are
//! something an interceptor opts into by calling its `perform` callback
//! again; the executor itself never retries and never follows redirects.
//! The transport sits behind the `Transport` trait so tests and embedders
//! can substitute fakes.

use std::fmt;

use url::{form_urlencoded, Url};

use crate::error::Error;
use crate::util::{upsert, KeyMatch, NewValue};

/// HTTP method accepted by the argv grammar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Put,
    Delete,
}

impl Method {
    /// Supported methods, in the order they are reported to the user.
    pub const ALL: [Method; 5] = [
        Method::Get,
        Method::Post,
        Method::Patch,
        Method::Put,
        Method::Delete,
    ];

    /// The exact argv spelling. Matching is case-sensitive.
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }

    /// Parse an argv token. `None` for anything but an exact match.
    pub fn from_arg(arg: &str) -> Option<Method> {
        Method::ALL.into_iter().find(|method| method.as_str() == arg)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// `path` is the pathname only; the query string lives in
/// `query_parameters`, an ordered multi-map (duplicate keys are kept, in
/// insertion order). Interceptors may mutate `headers` in place between
/// nested `perform` calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub query_parameters: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// An HTTP response described as plain data. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

/// Callback handed to an interceptor, standing for everything between it
/// and the transport: the remaining interceptors plus the base step.
pub type Perform<'a> = dyn FnMut(&mut Request) -> Result<Response, Error> + 'a;

/// Before/after hook wrapping the request pipeline.
///
/// An interceptor must resolve to a single [`Response`], either by invoking
/// `perform` (possibly after mutating the request, possibly more than once)
/// or by short-circuiting with its own response. An error aborts the whole
/// chain.
///
/// ```
/// use sling_core::http::{Interceptor, Perform, Request, Response};
/// use sling_core::util::{upsert, KeyMatch, NewValue};
/// use sling_core::Error;
///
/// /// Injects a bearer token and retries once after a 401.
/// struct AuthInterceptor {
///     token: String,
///     refreshed: String,
/// }
///
/// impl Interceptor for AuthInterceptor {
///     fn intercept(
///         &self,
///         perform: &mut Perform<'_>,
///         request: &mut Request,
///     ) -> Result<Response, Error> {
///         upsert(
///             &mut request.headers,
///             KeyMatch::Literal("Authorization"),
///             NewValue::Constant(format!("Bearer {}", self.token)),
///         );
///         let response = perform(request)?;
///         if response.status != 401 {
///             return Ok(response);
///         }
///         upsert(
///             &mut request.headers,
///             KeyMatch::Literal("Authorization"),
///             NewValue::Constant(format!("Bearer {}", self.refreshed)),
///         );
///         perform(request)
///     }
/// }
/// ```
pub trait Interceptor {
    fn intercept(&self, perform: &mut Perform<'_>, request: &mut Request)
        -> Result<Response, Error>;
}

/// Performs one raw HTTP call. Implementations must not follow redirects
/// or retry on their own; both are interceptor decisions.
pub trait Transport {
    fn perform(&self, url: &str, request: &Request) -> Result<Response, Error>;
}

/// Shared settings for one or more request executions.
///
/// Built once by the embedding application. `interceptors[0]` is the
/// outermost hook; it wraps everything after it.
pub struct RequestContext {
    pub base_url: String,
    pub interceptors: Vec<Box<dyn Interceptor>>,
    pub transport: Box<dyn Transport>,
}

impl RequestContext {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            interceptors: Vec::new(),
            transport: Box::new(UreqTransport::new()),
        }
    }

    /// Append an interceptor. Earlier additions wrap later ones.
    pub fn with_interceptor(mut self, interceptor: impl Interceptor + 'static) -> Self {
        self.interceptors.push(Box::new(interceptor));
        self
    }

    pub fn with_transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Box::new(transport);
        self
    }
}

/// Dispatch `request` through the context's interceptor chain and return
/// the single resulting response.
///
/// The base step inside the innermost interceptor builds the final URL
/// from the normalized base URL plus the request path and query, then
/// issues exactly one transport call per invocation.
pub fn execute_request(request: &mut Request, context: &RequestContext) -> Result<Response, Error> {
    let base_url = normalized_base_url(&context.base_url)?;
    perform_chained(&context.interceptors, context.transport.as_ref(), &base_url, request)
}

fn perform_chained(
    interceptors: &[Box<dyn Interceptor>],
    transport: &dyn Transport,
    base_url: &str,
    request: &mut Request,
) -> Result<Response, Error> {
    match interceptors.split_first() {
        Some((outer, inner)) => {
            let mut perform =
                |request: &mut Request| perform_chained(inner, transport, base_url, request);
            outer.intercept(&mut perform, request)
        }
        None => {
            let url = resolved_url(base_url, request)?;
            tracing::debug!(target: "sling::http", method = %request.method, url = %url, "dispatching request");
            let response = transport.perform(url.as_str(), request)?;
            tracing::debug!(target: "sling::http", status = response.status, "response received");
            Ok(response)
        }
    }
}

/// Canonicalize a base URL: no fragment, no query string, and at most one
/// trailing `/` removed from the path portion.
fn normalized_base_url(base_url: &str) -> Result<String, Error> {
    let mut url = Url::parse(base_url)?;
    url.set_fragment(None);
    url.set_query(None);
    let mut normalized = url.to_string();
    if normalized.ends_with('/') {
        normalized.pop();
    }
    Ok(normalized)
}

fn resolved_url(base_url: &str, request: &Request) -> Result<Url, Error> {
    let mut url = Url::parse(&format!("{base_url}{}", request.path))?;
    if request.query_parameters.is_empty() {
        url.set_query(None);
    } else {
        url.set_query(Some(&serialized_query(&request.query_parameters)));
    }
    Ok(url)
}

/// application/x-www-form-urlencoded rendering of the ordered pairs: `+`
/// for space, percent-encoded UTF-8, duplicates kept in order.
pub(crate) fn serialized_query(pairs: &[(String, String)]) -> String {
    let mut serializer = form_urlencoded::Serializer::new(String::new());
    for (name, value) in pairs {
        serializer.append_pair(name, value);
    }
    serializer.finish()
}

/// Default transport backed by a `ureq` agent.
///
/// Non-2xx statuses come back as data rather than errors, and redirects
/// are never followed; a 3xx response is returned to the chain as-is.
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .max_redirects(0)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn perform(&self, url: &str, request: &Request) -> Result<Response, Error> {
        let result = match (request.method, &request.body) {
            (Method::Get, _) => with_headers(self.agent.get(url), &request.headers).call(),
            (Method::Delete, _) => with_headers(self.agent.delete(url), &request.headers).call(),
            (Method::Post, Some(body)) => {
                with_headers(self.agent.post(url), &request.headers).send(&body[..])
            }
            (Method::Post, None) => {
                with_headers(self.agent.post(url), &request.headers).send_empty()
            }
            (Method::Patch, Some(body)) => {
                with_headers(self.agent.patch(url), &request.headers).send(&body[..])
            }
            (Method::Patch, None) => {
                with_headers(self.agent.patch(url), &request.headers).send_empty()
            }
            (Method::Put, Some(body)) => {
                with_headers(self.agent.put(url), &request.headers).send(&body[..])
            }
            (Method::Put, None) => with_headers(self.agent.put(url), &request.headers).send_empty(),
        };

        let mut raw = result.map_err(Error::transport)?;
        let status = raw.status().as_u16();
        let headers = raw
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();
        let body = raw.body_mut().read_to_vec().map_err(Error::transport)?;

        Ok(Response {
            status,
            headers,
            body: Some(body),
        })
    }
}

fn with_headers<Any>(
    mut builder: ureq::RequestBuilder<Any>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<Any> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Interceptor logging request dispatch and response status via `tracing`.
#[derive(Clone, Copy, Default)]
pub struct LoggingInterceptor;

impl Interceptor for LoggingInterceptor {
    fn intercept(
        &self,
        perform: &mut Perform<'_>,
        request: &mut Request,
    ) -> Result<Response, Error> {
        tracing::debug!(target: "sling::http", method = %request.method, path = %request.path, "request");
        let response = perform(request)?;
        tracing::debug!(target: "sling::http", status = response.status, "response");
        Ok(response)
    }
}

/// Interceptor ensuring JSON content-negotiation headers are present,
/// replacing existing entries rather than duplicating them.
#[derive(Clone, Copy, Default)]
pub struct JsonHeadersInterceptor;

impl Interceptor for JsonHeadersInterceptor {
    fn intercept(
        &self,
        perform: &mut Perform<'_>,
        request: &mut Request,
    ) -> Result<Response, Error> {
        upsert(
            &mut request.headers,
            KeyMatch::Literal("Content-Type"),
            NewValue::Constant("application/json".to_string()),
        );
        upsert(
            &mut request.headers,
            KeyMatch::Literal("Accept"),
            NewValue::Constant("application/json".to_string()),
        );
        perform(request)
    }
}
