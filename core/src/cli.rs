//! Argv-to-output orchestration for embedding applications.
//!
//! Glues the stages together: parse argv, assemble the body from `@body=`
//! or piped stdin, execute through the interceptor chain, and write the
//! response body to the supplied sink.

use std::io::Write;

use crate::args::{parse_arguments, ParseResult};
use crate::env::{resolve_home_path, Environment};
use crate::error::Error;
use crate::http::{execute_request, Request, RequestContext};

/// Assemble the final [`Request`] from a parse result.
///
/// Body sources are mutually exclusive: `@body=<file>` requires stdin to
/// be a terminal; otherwise piped stdin (when present) becomes the body,
/// and an interactive invocation carries none.
pub fn build_request(parsed: ParseResult, env: &dyn Environment) -> Result<Request, Error> {
    let body = match parsed.magic_parameters.body {
        Some(filepath) => {
            if !env.stdin_is_tty() {
                return Err(Error::BodyWithPipedInput);
            }
            Some(env.read_file(&resolve_home_path(&filepath, env))?)
        }
        None if !env.stdin_is_tty() => Some(env.read_stdin()?),
        None => None,
    };

    Ok(Request {
        method: parsed.method,
        path: parsed.path,
        headers: parsed.headers,
        query_parameters: parsed.query_parameters,
        body,
    })
}

/// Parse `args`, execute the request through `context`, and write the
/// response body (if any) to `out`, UTF-8 lossy-decoded then re-encoded.
///
/// Errors from any stage propagate to the embedder, which is expected to
/// report them and exit non-zero.
pub fn execute_http_request(
    args: &[String],
    context: &RequestContext,
    env: &dyn Environment,
    out: &mut dyn Write,
) -> Result<(), Error> {
    let parsed = parse_arguments(args)?;
    let mut request = build_request(parsed, env)?;
    let response = execute_request(&mut request, context)?;

    if let Some(body) = response.body {
        let text = String::from_utf8_lossy(&body);
        out.write_all(text.as_bytes())?;
        out.flush()?;
    }
    Ok(())
}
