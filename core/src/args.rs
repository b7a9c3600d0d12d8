//! Argv token grammar: method, path, then trailing assignments.
//!
//! # Design
//! The trailing tokens form a small stateful grammar. Each token is either
//! a query assignment (`key=value`), a magic assignment (`@key=value`), a
//! header assignment (`Name:value`), or a continuation of the previously
//! classified token's value. The classifier keeps one "active bucket"
//! pointer over {none, query, magic, headers}; a continuation extends the
//! last entry of the active bucket, space-joined. Assignment matching is
//! hand-rolled byte scanning: a non-empty leading run of name characters
//! directly followed by the marker.

use url::Url;

use crate::error::Error;
use crate::http::Method;

/// Origin used only to borrow the `url` crate's path/query parsing for the
/// path token. Nothing from it survives into the parse result.
const PLACEHOLDER_ORIGIN: &str = "https://placeholder.invalid";

/// `@`-prefixed parameters steering request construction rather than the
/// request itself. `body` is the only recognized key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MagicParameters {
    /// File whose contents become the request body.
    pub body: Option<String>,
}

/// Structured form of one argv invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    pub method: Method,
    /// Pathname only; any query string embedded in the path token has been
    /// split off into `query_parameters`.
    pub path: String,
    /// Ordered multi-map: embedded query pairs first, then assignment
    /// tokens in argv order. Duplicate keys are kept.
    pub query_parameters: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub magic_parameters: MagicParameters,
}

/// Which accumulator receives the next continuation token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Bucket {
    None,
    Query,
    Magic,
    Headers,
}

#[derive(Default)]
struct ClassifiedArgs {
    query_params: Vec<(String, String)>,
    magic_params: Vec<(String, String)>,
    headers: Vec<(String, String)>,
}

fn is_param_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_'
}

fn is_header_name_byte(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || byte == b'-'
}

/// Split `token` into (name, value) if it starts with a non-empty run of
/// name bytes directly followed by `marker`. The value is everything after
/// the first marker, markers and spaces included.
fn split_assignment(
    token: &str,
    marker: u8,
    is_name_byte: fn(u8) -> bool,
) -> Option<(&str, &str)> {
    let bytes = token.as_bytes();
    let name_len = bytes.iter().take_while(|byte| is_name_byte(**byte)).count();
    if name_len == 0 || bytes.get(name_len) != Some(&marker) {
        return None;
    }
    Some((&token[..name_len], &token[name_len + 1..]))
}

fn classify_rest_args(rest: &[String]) -> Result<ClassifiedArgs, Error> {
    let mut classified = ClassifiedArgs::default();
    let mut bucket = Bucket::None;

    for token in rest {
        let magic_candidate = token.strip_prefix('@');
        let unprefixed = magic_candidate.unwrap_or(token);
        if let Some((name, value)) = split_assignment(unprefixed, b'=', is_param_name_byte) {
            let target = if magic_candidate.is_some() {
                bucket = Bucket::Magic;
                &mut classified.magic_params
            } else {
                bucket = Bucket::Query;
                &mut classified.query_params
            };
            target.push((name.to_string(), value.to_string()));
            continue;
        }

        if let Some((name, value)) = split_assignment(token, b':', is_header_name_byte) {
            bucket = Bucket::Headers;
            classified.headers.push((name.to_string(), value.to_string()));
            continue;
        }

        // Continuation: extend the last entry of the active bucket.
        let target = match bucket {
            Bucket::None => return Err(Error::UnparsableArgs(rest.join(" "))),
            Bucket::Query => &mut classified.query_params,
            Bucket::Magic => &mut classified.magic_params,
            Bucket::Headers => &mut classified.headers,
        };
        match target.last_mut() {
            Some((_, value)) if value.is_empty() => *value = token.clone(),
            Some((_, value)) => {
                value.push(' ');
                value.push_str(token);
            }
            None => return Err(Error::UnparsableArgs(rest.join(" "))),
        }
    }

    Ok(classified)
}

fn validated_method(arg: Option<&String>) -> Result<Method, Error> {
    let arg = arg.filter(|arg| !arg.is_empty()).ok_or(Error::MethodMissing)?;
    Method::from_arg(arg).ok_or(Error::MethodInvalid)
}

fn validated_path(arg: Option<&String>) -> Result<&str, Error> {
    let arg = arg.filter(|arg| !arg.is_empty()).ok_or(Error::PathMissing)?;
    if !arg.starts_with('/') {
        return Err(Error::PathInvalid);
    }
    Ok(arg)
}

/// Parse one argv invocation (`<METHOD> <PATH>[?query] [assignments]...`)
/// into a [`ParseResult`].
///
/// Query pairs embedded in the path token are seeded first, in their
/// original order; assignment tokens append after them. Magic parameters
/// are validated here: only `body` is recognized, and a later `@body=`
/// overwrites an earlier one.
pub fn parse_arguments(args: &[String]) -> Result<ParseResult, Error> {
    let method = validated_method(args.first())?;
    let path_with_query = validated_path(args.get(1))?;
    let classified = classify_rest_args(args.get(2..).unwrap_or(&[]))?;

    let url = Url::parse(&format!("{PLACEHOLDER_ORIGIN}{path_with_query}"))?;
    let mut query_parameters: Vec<(String, String)> = url.query_pairs().into_owned().collect();
    query_parameters.extend(classified.query_params);

    let mut magic_parameters = MagicParameters::default();
    for (name, value) in classified.magic_params {
        if name == "body" {
            magic_parameters.body = Some(value);
        } else {
            return Err(Error::UnknownMagicKey { name, value });
        }
    }

    Ok(ParseResult {
        method,
        path: url.path().to_string(),
        query_parameters,
        headers: classified.headers,
        magic_parameters,
    })
}
