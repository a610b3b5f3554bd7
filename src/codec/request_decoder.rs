//! Streaming decoder for one inbound HTTP request.
//!
//! The decoder works in two phases: header parsing with `httparse`, then
//! accumulation of the body up to the declared `Content-Length`. It emits one
//! complete `(RequestHead, Bytes)` pair per request; the session reads exactly
//! one such pair per connection.
//!
//! # Limits
//!
//! - Maximum number of headers: 64
//! - Maximum header section size: 8KB
//! - Maximum body size: 1MB; a larger declared length is rejected before
//!   any buffer is sized from it
//! - Bodies are length-delimited only; `Transfer-Encoding` is rejected

use std::cmp;

use bytes::{Bytes, BytesMut};
use http::Request;
use httparse::{Error, Status};
use tokio_util::codec::Decoder;
use tracing::trace;

use crate::ensure;
use crate::protocol::{ParseError, RequestHead};

/// Maximum number of headers allowed in a request
const MAX_HEADER_NUM: usize = 64;

/// Maximum size in bytes allowed for the entire header section
const MAX_HEADER_BYTES: usize = 8 * 1024;

/// Maximum body size in bytes a request may declare
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Minimum bytes a request line can occupy ("GET / HTTP/1.1\r\n\r\n" prefix)
const MIN_REQUEST_BYTES: usize = 14;

/// Decoder for a complete HTTP request implementing the [`Decoder`] trait.
///
/// State is tracked through the `pending` field:
/// - `None`: still parsing the header section
/// - `Some(_)`: header parsed, accumulating the declared body length
#[derive(Debug)]
pub struct RequestDecoder {
    pending: Option<PendingBody>,
}

#[derive(Debug)]
struct PendingBody {
    head: RequestHead,
    remaining: usize,
    collected: BytesMut,
}

impl RequestDecoder {
    pub fn new() -> Self {
        Default::default()
    }
}

impl Default for RequestDecoder {
    fn default() -> Self {
        Self { pending: None }
    }
}

impl Decoder for RequestDecoder {
    type Item = (RequestHead, Bytes);
    type Error = ParseError;

    /// Attempts to decode a full request from the provided buffer.
    ///
    /// # Returns
    ///
    /// - `Ok(Some((head, body)))`: a complete request was decoded
    /// - `Ok(None)`: more data is needed
    /// - `Err(_)`: the request is malformed or exceeds a limit
    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        if self.pending.is_none() {
            match decode_head(src)? {
                Some(pending) => self.pending = Some(pending),
                None => return Ok(None),
            }
        }

        let finished = match self.pending.as_mut() {
            Some(pending) => {
                let take = cmp::min(pending.remaining, src.len());
                if take > 0 {
                    pending.collected.extend_from_slice(&src.split_to(take));
                    pending.remaining -= take;
                }
                pending.remaining == 0
            }
            None => false,
        };

        if !finished {
            return Ok(None);
        }

        Ok(self.pending.take().map(|pending| (pending.head, pending.collected.freeze())))
    }

    /// Called at stream EOF: a half-read request is an error, not a clean end.
    fn decode_eof(&mut self, src: &mut BytesMut) -> Result<Option<Self::Item>, Self::Error> {
        match self.decode(src)? {
            Some(item) => Ok(Some(item)),
            None if src.is_empty() && self.pending.is_none() => Ok(None),
            None => Err(ParseError::IncompleteRequest),
        }
    }
}

/// Parses the header section from the front of `src`, consuming it on success.
fn decode_head(src: &mut BytesMut) -> Result<Option<PendingBody>, ParseError> {
    // Fast path: too little data to hold even a minimal request line
    if src.len() < MIN_REQUEST_BYTES {
        return Ok(None);
    }

    let mut headers = [httparse::EMPTY_HEADER; MAX_HEADER_NUM];
    let mut parsed = httparse::Request::new(&mut headers);

    let parse_status = parsed.parse(src).map_err(|e| match e {
        Error::TooManyHeaders => ParseError::too_many_headers(MAX_HEADER_NUM),
        e => ParseError::invalid_header(e.to_string()),
    })?;

    let body_offset = match parse_status {
        Status::Complete(body_offset) => body_offset,
        Status::Partial => {
            ensure!(src.len() <= MAX_HEADER_BYTES, ParseError::too_large_header(src.len(), MAX_HEADER_BYTES));
            return Ok(None);
        }
    };

    trace!(header_size = body_offset, "parsed request header section");
    ensure!(body_offset <= MAX_HEADER_BYTES, ParseError::too_large_header(body_offset, MAX_HEADER_BYTES));

    let version = match parsed.version {
        Some(0) => http::Version::HTTP_10,
        Some(1) => http::Version::HTTP_11,
        // HTTP/2 and HTTP/3 not supported
        _ => return Err(ParseError::InvalidVersion(parsed.version)),
    };

    let mut builder = Request::builder()
        .method(parsed.method.ok_or(ParseError::InvalidMethod)?)
        .uri(parsed.path.ok_or(ParseError::InvalidUri)?)
        .version(version);

    for header in parsed.headers.iter() {
        builder = builder.header(header.name, header.value);
    }

    let head: RequestHead = builder.body(()).map_err(|e| ParseError::invalid_header(e.to_string()))?.into();

    // header section has been fully parsed, drop it from the buffer
    let _ = src.split_to(body_offset);

    // the declared length is peer input: bound it before sizing any buffer
    let remaining = declared_body_length(&head)?;
    ensure!(remaining <= MAX_BODY_BYTES, ParseError::too_large_body(remaining, MAX_BODY_BYTES));

    Ok(Some(PendingBody { head, remaining, collected: BytesMut::with_capacity(remaining) }))
}

/// Determines the body length from the request headers.
///
/// The baseline design reads bodies by declared length only; any
/// `Transfer-Encoding` header is rejected. An absent `Content-Length` means
/// an empty body.
fn declared_body_length(head: &RequestHead) -> Result<usize, ParseError> {
    if head.headers().get(http::header::TRANSFER_ENCODING).is_some() {
        return Err(ParseError::unsupported_transfer_encoding("only length-delimited bodies are supported"));
    }

    match head.headers().get(http::header::CONTENT_LENGTH) {
        None => Ok(0),
        Some(value) => {
            let str = value.to_str().map_err(|_| ParseError::invalid_content_length("value can't to_str"))?;
            str.trim()
                .parse::<usize>()
                .map_err(|_| ParseError::invalid_content_length(format!("value {str} is not a valid length")))
        }
    }
}
