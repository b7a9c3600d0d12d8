//! Scriptable HTTP invocation helper for embedding in larger CLIs.
//!
//! # Overview
//! Turns a compact argv grammar
//! (`GET /search?q=rust page=2 Authorization: Bearer token`) into a
//! structured request, then dispatches it through an ordered interceptor
//! chain wrapping a pluggable transport. The response body is handed back
//! verbatim for the embedder to print.
//!
//! # Design
//! - Requests and responses are plain owned data; nothing borrows from
//!   argv or the process environment.
//! - Parsing, body assembly, and execution are separate stages with
//!   injectable boundaries (`Environment`, `Transport`), so every stage is
//!   testable without a terminal or a network.
//! - Interceptors compose outermost-first and may re-invoke their inner
//!   `perform` callback (auth-refresh retries). The executor itself never
//!   retries and never follows redirects.

pub mod args;
pub mod cache;
pub mod cli;
pub mod env;
pub mod error;
pub mod http;
pub mod util;

pub use args::{parse_arguments, MagicParameters, ParseResult};
pub use cache::FileCache;
pub use cli::{build_request, execute_http_request};
pub use env::{Environment, ProcessEnvironment};
pub use error::Error;
pub use http::{
    execute_request, Interceptor, JsonHeadersInterceptor, LoggingInterceptor, Method, Perform,
    Request, RequestContext, Response, Transport, UreqTransport,
};
pub use util::{upsert, KeyMatch, NewValue};
