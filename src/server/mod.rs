//! Connection acceptor and graceful shutdown.
//!
//! The server owns the listening socket and spawns one [`Session`] task per
//! accepted connection; the tasks share the runtime's worker threads, so no
//! connection ever gets a dedicated thread. Stopping is drain-based: the
//! accept loop is cancelled, in-flight sessions run to completion, and
//! [`ServerHandle::stop`] returns only once every session task has exited.

mod error;
mod session;

use std::net::{SocketAddr, ToSocketAddrs};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, info, warn};

use crate::router::Router;

pub use error::{BindError, ServerBuildError};
pub use session::{HEALTH_PATH, Session};

/// Builder collecting the pieces a server needs before it can bind.
#[derive(Debug)]
pub struct ServerBuilder {
    router: Option<Router>,
    address: Option<Vec<SocketAddr>>,
}

impl ServerBuilder {
    fn new() -> Self {
        Self { router: None, address: None }
    }

    pub fn address<A: ToSocketAddrs>(mut self, address: A) -> Result<Self, ServerBuildError> {
        let addrs = address.to_socket_addrs().map_err(ServerBuildError::from)?.collect::<Vec<_>>();
        self.address = Some(addrs);
        Ok(self)
    }

    pub fn router(mut self, router: Router) -> Self {
        self.router = Some(router);
        self
    }

    pub fn build(self) -> Result<Server, ServerBuildError> {
        let router = self.router.ok_or(ServerBuildError::MissingRouter)?;
        let address = self.address.ok_or(ServerBuildError::MissingAddress)?;
        Ok(Server { router: Arc::new(router), address })
    }
}

/// A configured but not yet listening server.
#[derive(Debug)]
pub struct Server {
    router: Arc<Router>,
    address: Vec<SocketAddr>,
}

impl Server {
    pub fn builder() -> ServerBuilder {
        ServerBuilder::new()
    }

    /// Binds the listening socket. Route registration is complete by now;
    /// the router is shared read-only with every session from here on.
    pub async fn bind(self) -> Result<BoundServer, BindError> {
        let listener = TcpListener::bind(self.address.as_slice())
            .await
            .map_err(|source| BindError { addr: self.address, source })?;

        info!(addr = ?listener.local_addr(), "listening");
        Ok(BoundServer {
            listener,
            router: self.router,
            shutdown: CancellationToken::new(),
            sessions: TaskTracker::new(),
        })
    }
}

/// A server with a live listening socket, ready to accept.
#[derive(Debug)]
pub struct BoundServer {
    listener: TcpListener,
    router: Arc<Router>,
    shutdown: CancellationToken,
    sessions: TaskTracker,
}

impl BoundServer {
    /// The actual bound address (useful when binding port 0).
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Returns a handle that can stop this server from another task.
    pub fn handle(&self) -> ServerHandle {
        ServerHandle { shutdown: self.shutdown.clone(), sessions: self.sessions.clone() }
    }

    /// Accepts connections until stopped, then drains in-flight sessions.
    ///
    /// Every accepted connection is spawned as an independent session task;
    /// a failed accept is logged and the loop keeps going. When the shutdown
    /// token fires the listener is dropped (no new accepts) and this future
    /// resolves once the already-running sessions have finished.
    pub async fn serve(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    info!("shutdown requested, stop accepting");
                    break;
                }
                accepted = self.listener.accept() => {
                    let (tcp_stream, remote_addr) = match accepted {
                        Ok(stream_and_addr) => stream_and_addr,
                        Err(e) => {
                            warn!(cause = %e, "failed to accept");
                            continue;
                        }
                    };

                    let router = Arc::clone(&self.router);
                    self.sessions.spawn(async move {
                        let (reader, writer) = tcp_stream.into_split();
                        let session = Session::new(reader, writer);
                        match session.process(router).await {
                            Ok(_) => debug!(remote = %remote_addr, "session finished"),
                            Err(e) => debug!(remote = %remote_addr, "session error, cause {}, connection shutdown", e),
                        }
                    });
                }
            }
        }

        drop(self.listener);
        self.sessions.close();
        self.sessions.wait().await;
        info!("all sessions drained");
    }
}

/// Cancels the accept loop and waits for in-flight sessions to finish.
#[derive(Debug, Clone)]
pub struct ServerHandle {
    shutdown: CancellationToken,
    sessions: TaskTracker,
}

impl ServerHandle {
    /// Stops accepting new connections and blocks until every in-flight
    /// session has reached its end. Sessions are never aborted; this is a
    /// cooperative drain. Calling it more than once is harmless.
    pub async fn stop(&self) {
        self.shutdown.cancel();
        self.sessions.wait().await;
    }
}
