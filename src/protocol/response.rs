//! Response construction helpers.
//!
//! Responses are plain `http::Response<Bytes>` values; handlers may build
//! them directly or through these constructors, which stamp the `Server`
//! header and a content type the way every synthesized response does.

use bytes::Bytes;
use http::{HeaderValue, StatusCode, header};

/// The response type flowing from handlers back to the session.
pub type Response = http::Response<Bytes>;

/// Value of the `Server` header stamped on synthesized responses.
pub const SERVER_NAME: &str = concat!("paperd/", env!("CARGO_PKG_VERSION"));

fn build(status: StatusCode, content_type: &mime::Mime, body: Bytes) -> Response {
    let mut response = http::Response::new(body);
    *response.status_mut() = status;
    response.headers_mut().insert(header::SERVER, HeaderValue::from_static(SERVER_NAME));
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_str(content_type.as_ref()).unwrap());
    response
}

/// Builds a `text/plain` response.
pub fn text(status: StatusCode, body: impl Into<Bytes>) -> Response {
    build(status, &mime::TEXT_PLAIN, body.into())
}

/// Builds an `application/json` response from an already-serialized body.
pub fn json(status: StatusCode, body: impl Into<Bytes>) -> Response {
    build(status, &mime::APPLICATION_JSON, body.into())
}

/// Builds a bodyless response carrying only the status.
pub fn empty(status: StatusCode) -> Response {
    let mut response = http::Response::new(Bytes::new());
    *response.status_mut() = status;
    response.headers_mut().insert(header::SERVER, HeaderValue::from_static(SERVER_NAME));
    response
}
