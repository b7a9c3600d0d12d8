//! Full pipeline tests against the live mock server.
//!
//! Starts the mock server on a random port, then drives the whole
//! parse → build → execute path over real HTTP with the default ureq
//! transport. Validates token-grammar output, ordered multi-map
//! pass-through, interceptor retries, and the manual redirect policy
//! end-to-end with an actual server.

use std::cell::Cell;
use std::io;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use serde::Deserialize;
use sling_core::{
    build_request, execute_http_request, execute_request, parse_arguments, upsert, Environment,
    Error, Interceptor, KeyMatch, NewValue, Perform, Request, RequestContext, Response,
};

/// Response shape of the mock server's `/echo` endpoint, defined
/// independently from the server crate so schema drift shows up here.
#[derive(Debug, Deserialize)]
struct Echo {
    method: String,
    path: String,
    query: String,
    headers: Vec<(String, String)>,
    body: String,
}

fn header_values(echo: &Echo, name: &str) -> Vec<String> {
    echo.headers
        .iter()
        .filter(|(header, _)| header == name)
        .map(|(_, value)| value.clone())
        .collect()
}

/// Environment with an interactive terminal and no files.
struct TtyEnvironment;

impl Environment for TtyEnvironment {
    fn stdin_is_tty(&self) -> bool {
        true
    }

    fn read_stdin(&self) -> io::Result<Vec<u8>> {
        Ok(Vec::new())
    }

    fn read_file(&self, path: &Path) -> io::Result<Vec<u8>> {
        Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("no such file: {}", path.display()),
        ))
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

/// Environment whose stdin is a pipe carrying `data`.
struct PipedEnvironment {
    data: Vec<u8>,
}

impl Environment for PipedEnvironment {
    fn stdin_is_tty(&self) -> bool {
        false
    }

    fn read_stdin(&self) -> io::Result<Vec<u8>> {
        Ok(self.data.clone())
    }

    fn read_file(&self, _path: &Path) -> io::Result<Vec<u8>> {
        Err(io::Error::new(io::ErrorKind::NotFound, "no files in pipe env"))
    }

    fn home_dir(&self) -> Option<PathBuf> {
        None
    }
}

fn args(tokens: &[&str]) -> Vec<String> {
    tokens.iter().map(|token| token.to_string()).collect()
}

/// Start the mock server on a random port and return its base URL.
fn start_server() -> String {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    format!("http://{addr}")
}

#[test]
fn echo_round_trip_preserves_grammar_output() {
    let context = RequestContext::new(start_server());

    let mut out = Vec::new();
    execute_http_request(
        &args(&[
            "POST",
            "/echo/items?tag=first",
            "tag=second",
            "note=hello",
            "world",
            "X-Tag:one",
            "X-Tag:two",
            "Authorization:",
            "Bearer",
            "xyz",
        ]),
        &context,
        &TtyEnvironment,
        &mut out,
    )
    .unwrap();

    let echo: Echo = serde_json::from_slice(&out).unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.path, "/echo/items");
    assert_eq!(echo.query, "tag=first&tag=second&note=hello+world");
    assert_eq!(header_values(&echo, "x-tag"), vec!["one", "two"]);
    assert_eq!(header_values(&echo, "authorization"), vec!["Bearer xyz"]);
    assert_eq!(echo.body, "");
}

#[test]
fn non_ascii_query_values_arrive_percent_encoded() {
    let context = RequestContext::new(start_server());

    let mut out = Vec::new();
    execute_http_request(
        &args(&["GET", "/echo/search?q=日本語&page=12", "hl=en"]),
        &context,
        &TtyEnvironment,
        &mut out,
    )
    .unwrap();

    let echo: Echo = serde_json::from_slice(&out).unwrap();
    assert_eq!(echo.query, "q=%E6%97%A5%E6%9C%AC%E8%AA%9E&page=12&hl=en");
}

#[test]
fn piped_stdin_travels_as_the_request_body() {
    let context = RequestContext::new(start_server());
    let env = PipedEnvironment {
        data: b"piped payload".to_vec(),
    };

    let mut out = Vec::new();
    execute_http_request(&args(&["PUT", "/echo/items"]), &context, &env, &mut out).unwrap();

    let echo: Echo = serde_json::from_slice(&out).unwrap();
    assert_eq!(echo.method, "PUT");
    assert_eq!(echo.body, "piped payload");
}

/// Swaps in a fresh token and replays the request once after a 401.
struct RefreshOn401 {
    attempts: Rc<Cell<u32>>,
}

impl Interceptor for RefreshOn401 {
    fn intercept(
        &self,
        perform: &mut Perform<'_>,
        request: &mut Request,
    ) -> Result<Response, Error> {
        self.attempts.set(self.attempts.get() + 1);
        let first = perform(request)?;
        if first.status != 401 {
            return Ok(first);
        }
        upsert(
            &mut request.headers,
            KeyMatch::Literal("Authorization"),
            NewValue::Constant("Bearer fresh-token".to_string()),
        );
        self.attempts.set(self.attempts.get() + 1);
        perform(request)
    }
}

#[test]
fn auth_interceptor_refreshes_and_retries_over_real_http() {
    let attempts = Rc::new(Cell::new(0));
    let context = RequestContext::new(start_server()).with_interceptor(RefreshOn401 {
        attempts: Rc::clone(&attempts),
    });

    let mut out = Vec::new();
    execute_http_request(
        &args(&["GET", "/protected", "Authorization:Bearer stale-token"]),
        &context,
        &TtyEnvironment,
        &mut out,
    )
    .unwrap();

    assert_eq!(attempts.get(), 2);
    assert_eq!(out, b"granted");
}

#[test]
fn redirects_are_surfaced_not_followed() {
    let context = RequestContext::new(start_server());

    let parsed = parse_arguments(&args(&["GET", "/redirect"])).unwrap();
    let mut request = build_request(parsed, &TtyEnvironment).unwrap();
    let response = execute_request(&mut request, &context).unwrap();

    assert_eq!(response.status, 302);
    let location = response
        .headers
        .iter()
        .find(|(name, _)| name == "location")
        .map(|(_, value)| value.as_str());
    assert_eq!(location, Some("/echo"));
}

#[test]
fn trailing_slash_on_base_url_does_not_double_the_separator() {
    let base = format!("{}/", start_server());
    let context = RequestContext::new(base);

    let mut out = Vec::new();
    execute_http_request(&args(&["GET", "/echo"]), &context, &TtyEnvironment, &mut out).unwrap();

    let echo: Echo = serde_json::from_slice(&out).unwrap();
    assert_eq!(echo.path, "/echo");
}

#[test]
fn connection_errors_propagate_as_transport_failures() {
    // Bind a port and drop the listener so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let context = RequestContext::new(format!("http://{addr}"));
    let parsed = parse_arguments(&args(&["GET", "/echo"])).unwrap();
    let mut request = build_request(parsed, &TtyEnvironment).unwrap();
    let err = execute_request(&mut request, &context).unwrap_err();
    assert!(matches!(err, Error::Transport(_)));
}
