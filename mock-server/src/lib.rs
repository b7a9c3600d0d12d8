use axum::{
    body::Bytes,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// What the `/echo` endpoints saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Echo {
    pub method: String,
    pub path: String,
    /// Raw query string, exactly as received (empty when absent).
    pub query: String,
    /// Ordered (name, value) pairs; names are lowercased by the HTTP
    /// layer, duplicate names keep their relative order.
    pub headers: Vec<(String, String)>,
    pub body: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/echo/{*rest}", any(echo))
        .route("/protected", any(protected))
        .route("/redirect", get(redirect))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let header_pairs = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers: header_pairs,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn protected(headers: HeaderMap) -> Response {
    let authorized = headers
        .get(header::AUTHORIZATION)
        .is_some_and(|value| value.as_bytes() == b"Bearer fresh-token");
    if authorized {
        (StatusCode::OK, "granted").into_response()
    } else {
        (StatusCode::UNAUTHORIZED, "expired").into_response()
    }
}

async fn redirect() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, "/echo")], "").into_response()
}
