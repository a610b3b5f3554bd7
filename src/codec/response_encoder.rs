//! Serializer for outbound HTTP responses.
//!
//! Responses are written in one shot: status line, headers with an exact
//! `Content-Length`, then the body. Only HTTP/1.1 responses are produced.

use std::io;
use std::io::Write;

use bytes::{BufMut, BytesMut};
use http::{HeaderValue, Version, header};
use tokio_util::codec::Encoder;
use tracing::error;

use crate::protocol::{Response, SendError};

/// Initial buffer size reserved for header serialization
const INIT_HEADER_SIZE: usize = 4 * 1024;

/// Encoder for HTTP responses implementing the [`Encoder`] trait.
#[derive(Debug)]
pub struct ResponseEncoder;

impl ResponseEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ResponseEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl Encoder<Response> for ResponseEncoder {
    type Error = SendError;

    fn encode(&mut self, response: Response, dst: &mut BytesMut) -> Result<(), Self::Error> {
        let (parts, body) = response.into_parts();

        dst.reserve(INIT_HEADER_SIZE + body.len());
        match parts.version {
            Version::HTTP_11 => {
                write!(
                    FastWrite(dst),
                    "HTTP/1.1 {} {}\r\n",
                    parts.status.as_str(),
                    parts.status.canonical_reason().unwrap_or("Unknown")
                )?;
            }
            v => {
                error!(http_version = ?v, "unsupported http version");
                return Err(SendError::unsupported_version(format!("{v:?}")));
            }
        }

        // Content-Length always reflects the exact body size
        let mut headers = parts.headers;
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(body.len()));

        for (header_name, header_value) in headers.iter() {
            dst.put_slice(header_name.as_ref());
            dst.put_slice(b": ");
            dst.put_slice(header_value.as_ref());
            dst.put_slice(b"\r\n");
        }
        dst.put_slice(b"\r\n");

        dst.put_slice(&body);
        Ok(())
    }
}

/// Writer over `BytesMut` for formatting the status line without an
/// intermediate allocation.
struct FastWrite<'a>(&'a mut BytesMut);

impl Write for FastWrite<'_> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.put_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::response;
    use http::StatusCode;

    #[test]
    fn encodes_status_line_headers_and_body() {
        let response = response::text(StatusCode::OK, "hello");

        let mut encoder = ResponseEncoder::new();
        let mut buf = BytesMut::new();
        encoder.encode(response, &mut buf).unwrap();

        let wire = String::from_utf8(buf.to_vec()).unwrap();
        assert!(wire.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(wire.contains("content-type: text/plain\r\n"));
        assert!(wire.contains("content-length: 5\r\n"));
        assert!(wire.ends_with("\r\n\r\nhello"));
    }

    #[test]
    fn content_length_is_overwritten() {
        let mut resp = response::text(StatusCode::OK, "abc");
        resp.headers_mut().insert(header::CONTENT_LENGTH, HeaderValue::from_static("999"));

        let mut encoder = ResponseEncoder::new();
        let mut buf = BytesMut::new();
        encoder.encode(resp, &mut buf).unwrap();

        let wire = String::from_utf8(buf.to_vec()).unwrap();
        assert!(wire.contains("content-length: 3\r\n"));
        assert!(!wire.contains("999"));
    }

    #[test]
    fn empty_body_still_carries_length() {
        let response = response::empty(StatusCode::NO_CONTENT);

        let mut encoder = ResponseEncoder::new();
        let mut buf = BytesMut::new();
        encoder.encode(response, &mut buf).unwrap();

        let wire = String::from_utf8(buf.to_vec()).unwrap();
        assert!(wire.starts_with("HTTP/1.1 204 No Content\r\n"));
        assert!(wire.contains("content-length: 0\r\n"));
    }
}
