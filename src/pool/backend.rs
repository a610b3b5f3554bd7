//! Backend connection traits and the TCP implementation used by the binary.

use std::io;

use async_trait::async_trait;
use tokio::net::TcpStream;

/// A live handle to a backend resource, exclusively owned by its holder.
///
/// The pool consults `is_open` before recycling or handing out a connection;
/// `close` marks the handle dead and releases its transport.
pub trait PooledConnection: Send + 'static {
    /// Reports whether the underlying transport is still usable.
    fn is_open(&self) -> bool;

    /// Closes the underlying transport. Further `is_open` calls return false.
    fn close(&mut self);
}

/// Factory for backend connections, used by the pool to fill and grow.
#[async_trait]
pub trait Connector: Send + Sync {
    type Conn: PooledConnection;

    async fn connect(&self) -> io::Result<Self::Conn>;
}

/// Connector establishing plain TCP links to a fixed backend address.
#[derive(Debug, Clone)]
pub struct TcpConnector {
    addr: String,
}

impl TcpConnector {
    pub fn new(addr: impl Into<String>) -> Self {
        Self { addr: addr.into() }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    type Conn = TcpBackend;

    async fn connect(&self) -> io::Result<TcpBackend> {
        let stream = TcpStream::connect(self.addr.as_str()).await?;
        Ok(TcpBackend { stream: Some(stream) })
    }
}

/// A pooled TCP link to the backend.
#[derive(Debug)]
pub struct TcpBackend {
    stream: Option<TcpStream>,
}

impl TcpBackend {
    /// The transport handle for the holder's own backend-access logic.
    pub fn stream(&mut self) -> Option<&mut TcpStream> {
        self.stream.as_mut()
    }
}

impl PooledConnection for TcpBackend {
    fn is_open(&self) -> bool {
        // a peer reset surfaces on the next use; the tracked state answers
        // the pool's recycle check
        self.stream.is_some()
    }

    fn close(&mut self) {
        // dropping the stream closes the socket
        self.stream.take();
    }
}
