//! Error type for the argv-to-request pipeline.
//!
//! # Design
//! One enum covers the whole crate. Argument errors carry the exact
//! user-facing text the embedding CLI prints before exiting non-zero, so
//! the messages are part of the contract. Transport failures are forwarded
//! unchanged behind an opaque boxed source; the core never retries or
//! classifies them.

use thiserror::Error;

/// Errors surfaced by parsing, request building, and execution.
#[derive(Debug, Error)]
pub enum Error {
    /// argv had no first token, or it was empty.
    #[error("HTTP method is not specified")]
    MethodMissing,

    /// The first token was present but is not a supported method.
    #[error("HTTP method must be one of (GET, POST, PATCH, PUT, DELETE)")]
    MethodInvalid,

    /// argv had no second token, or it was empty.
    #[error("path is not specified")]
    PathMissing,

    /// The path token does not begin with `/`.
    #[error("path must start with '/'")]
    PathInvalid,

    /// A plain token arrived before any assignment token set an active
    /// bucket. Carries the full trailing-token slice, space-joined.
    #[error("Unable to parse args: {0}")]
    UnparsableArgs(String),

    /// A magic parameter other than `@body=` was supplied.
    #[error("Unknown key: \"@{name}={value}\"")]
    UnknownMagicKey { name: String, value: String },

    /// `@body=` and piped standard input are mutually exclusive body
    /// sources.
    #[error("@body cannot be specified when Pipe input is present")]
    BodyWithPipedInput,

    /// No home/profile directory is available for cache path resolution.
    #[error("home directory not found")]
    HomeNotFound,

    /// A base URL or path token could not be parsed as a URL.
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// Reading standard input or a `@body` file failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// The underlying HTTP call failed (DNS, connection, timeout).
    #[error(transparent)]
    Transport(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a transport failure without altering its message.
    pub fn transport(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        Error::Transport(Box::new(source))
    }
}
