//! Per-connection state machine.
//!
//! A session owns one accepted connection end-to-end and moves through
//! reading → dispatching → writing before tearing the stream down. Exactly
//! one request is served per connection: after the response is flushed the
//! write half is shut down and the session ends.
//!
//! All handler failures are absorbed here and converted into error
//! responses; only transport and parse failures terminate the session with
//! an error, and those never propagate beyond the session's own task.

use std::sync::Arc;

use bytes::Bytes;
use futures::{SinkExt, StreamExt};
use http::StatusCode;
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};
use tokio_util::codec::{FramedRead, FramedWrite};
use tracing::{debug, error};

use crate::codec::{RequestDecoder, ResponseEncoder};
use crate::protocol::response::{self, Response};
use crate::protocol::{Request, RequestHead, SendError, SessionError};
use crate::router::Router;

/// Path served by the liveness short-circuit, bypassing the router.
pub const HEALTH_PATH: &str = "/health";

const HEALTH_BODY: &str = r#"{"status": "healthy", "message": "Server is running"}"#;

/// One accepted connection's read-dispatch-write cycle.
#[derive(Debug)]
pub struct Session<R, W> {
    framed_read: FramedRead<R, RequestDecoder>,
    framed_write: FramedWrite<W, ResponseEncoder>,
}

impl<R, W> Session<R, W>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin,
{
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            framed_read: FramedRead::with_capacity(reader, RequestDecoder::new(), 8 * 1024),
            framed_write: FramedWrite::new(writer, ResponseEncoder::new()),
        }
    }

    /// Drives the session to completion.
    ///
    /// Returns `Ok(())` when the response was flushed (or the peer went away
    /// before sending a request) and `Err` when the session was cut short by
    /// a malformed request or a transport failure.
    pub async fn process(mut self, router: Arc<Router>) -> Result<(), SessionError> {
        // Reading: accumulate one complete request
        let (head, body) = match self.framed_read.next().await {
            Some(Ok(item)) => item,
            Some(Err(e)) => {
                debug!("can't read request, cause {}", e);
                // best-effort 400 before tearing the session down
                let _ = self.framed_write.send(response::empty(StatusCode::BAD_REQUEST)).await;
                return Err(e.into());
            }
            None => {
                debug!("peer closed before sending a request");
                return Ok(());
            }
        };

        // Dispatching: handler failures become responses, never panics
        let response = dispatch(head, body, router).await;

        // Writing: flush, then half-close; one request per connection
        self.framed_write.send(response).await?;
        self.framed_write.get_mut().shutdown().await.map_err(SendError::from)?;
        Ok(())
    }
}

/// Resolves the request to a response.
///
/// The health-check path short-circuits without consulting the router. A
/// failed resolution yields 404; a handler error yields a generic 500.
async fn dispatch(head: RequestHead, body: Bytes, router: Arc<Router>) -> Response {
    if head.path() == HEALTH_PATH {
        return response::json(StatusCode::OK, HEALTH_BODY);
    }

    let Some(matched) = router.resolve(head.path(), head.method()) else {
        return response::text(StatusCode::NOT_FOUND, "404 Not Found");
    };

    let (handler, params) = matched.into_parts();
    let request = Request::new(head, body, params);

    match handler.handle(request).await {
        Ok(response) => response,
        Err(e) => {
            error!("handler error, cause: {}", e);
            response::text(StatusCode::INTERNAL_SERVER_ERROR, "500 Internal Server Error")
        }
    }
}
