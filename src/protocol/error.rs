use std::io;
use thiserror::Error;

/// Top-level error for one session's read-dispatch-write cycle.
///
/// A `SessionError` terminates only the session it occurred on; the accept
/// loop and other sessions never observe it.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("request error: {source}")]
    Parse {
        #[from]
        source: ParseError,
    },

    #[error("response error: {source}")]
    Send {
        #[from]
        source: SendError,
    },
}

/// Errors raised while parsing an inbound request.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("header size too large, current: {current_size} exceed the limit {max_size}")]
    TooLargeHeader { current_size: usize, max_size: usize },

    #[error("header number exceed the limit {max_num}")]
    TooManyHeaders { max_num: usize },

    #[error("declared body size too large, declared: {declared} exceed the limit {max_size}")]
    TooLargeBody { declared: usize, max_size: usize },

    #[error("invalid header: {reason}")]
    InvalidHeader { reason: String },

    #[error("invalid http version: {0:?}")]
    InvalidVersion(Option<u8>),

    #[error("invalid http method")]
    InvalidMethod,

    #[error("invalid http uri")]
    InvalidUri,

    #[error("invalid content-length header: {reason}")]
    InvalidContentLength { reason: String },

    #[error("unsupported transfer encoding: {reason}")]
    UnsupportedTransferEncoding { reason: String },

    #[error("connection closed before the request was complete")]
    IncompleteRequest,

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl ParseError {
    pub fn too_large_header(current_size: usize, max_size: usize) -> Self {
        Self::TooLargeHeader { current_size, max_size }
    }

    pub fn too_many_headers(max_num: usize) -> Self {
        Self::TooManyHeaders { max_num }
    }

    pub fn too_large_body(declared: usize, max_size: usize) -> Self {
        Self::TooLargeBody { declared, max_size }
    }

    pub fn invalid_header<S: ToString>(str: S) -> Self {
        Self::InvalidHeader { reason: str.to_string() }
    }

    pub fn invalid_content_length<S: ToString>(str: S) -> Self {
        Self::InvalidContentLength { reason: str.to_string() }
    }

    pub fn unsupported_transfer_encoding<S: ToString>(str: S) -> Self {
        Self::UnsupportedTransferEncoding { reason: str.to_string() }
    }
}

/// Errors raised while serializing or flushing a response.
#[derive(Error, Debug)]
pub enum SendError {
    #[error("unsupported http version: {reason}")]
    UnsupportedVersion { reason: String },

    #[error("io error: {source}")]
    Io {
        #[from]
        source: io::Error,
    },
}

impl SendError {
    pub fn unsupported_version<S: ToString>(str: S) -> Self {
        Self::UnsupportedVersion { reason: str.to_string() }
    }
}
