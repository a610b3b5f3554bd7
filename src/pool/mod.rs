//! Shared pool of exclusive-use backend connections.
//!
//! The pool lazily grows: an `acquire` on an empty queue creates a fresh
//! connection instead of blocking, so the fill size is a hint, not a
//! ceiling. Idle connections are liveness-checked on checkout and recycled
//! on release.
//!
//! # Locking discipline
//!
//! The idle queue and the initialized flag are the only shared mutable
//! state, guarded by one mutex. Connection creation happens **outside** the
//! lock; the lock is held only for the O(1) queue operations and flag
//! checks. Under contention this can create a few more connections than
//! strictly necessary, in exchange for never holding the lock across
//! backend I/O.

pub mod backend;

use std::collections::VecDeque;
use std::fmt;
use std::io;
use std::sync::Mutex;

use thiserror::Error;
use tracing::{info, warn};

pub use backend::{Connector, PooledConnection, TcpBackend, TcpConnector};

#[derive(Debug, Error)]
pub enum PoolError {
    /// The pool was used before `initialize` or after `shutdown`.
    #[error("connection pool is not initialized")]
    NotInitialized,

    /// Eager fill failed; the pool remains uninitialized.
    #[error("failed to initialize connection pool: {source}")]
    Init { source: io::Error },

    /// On-demand connection creation failed during `acquire`.
    #[error("failed to open backend connection: {source}")]
    Connect { source: io::Error },
}

struct PoolState<T> {
    idle: VecDeque<T>,
    initialized: bool,
}

/// Thread-safe pool of exclusive-use backend connections.
pub struct Pool<C: Connector> {
    connector: C,
    state: Mutex<PoolState<C::Conn>>,
}

impl<C: Connector> Pool<C> {
    /// Creates an empty, uninitialized pool around a connector.
    pub fn new(connector: C) -> Self {
        Self { connector, state: Mutex::new(PoolState { idle: VecDeque::new(), initialized: false }) }
    }

    /// Eagerly creates `fill` connections and enqueues them.
    ///
    /// On any creation failure the partial fill is torn down and the pool
    /// stays uninitialized. Calling this on an already-initialized pool is a
    /// no-op.
    pub async fn initialize(&self, fill: usize) -> Result<(), PoolError> {
        {
            let state = self.state.lock().expect("pool lock poisoned");
            if state.initialized {
                return Ok(());
            }
        }

        let mut created = Vec::with_capacity(fill);
        for _ in 0..fill {
            match self.connector.connect().await {
                Ok(conn) => created.push(conn),
                Err(source) => {
                    for mut conn in created {
                        conn.close();
                    }
                    return Err(PoolError::Init { source });
                }
            }
        }

        let mut state = self.state.lock().expect("pool lock poisoned");
        if state.initialized {
            // another initialize won while the lock was released for the
            // fill; discard this batch instead of double-filling the queue
            drop(state);
            for mut conn in created {
                conn.close();
            }
            return Ok(());
        }
        state.idle.extend(created);
        state.initialized = true;
        info!(pool_size = fill, "connection pool initialized");
        Ok(())
    }

    /// Checks out a connection for exclusive use.
    ///
    /// An idle connection that fails the liveness check is discarded and a
    /// fresh one is created in its place; an empty queue also creates fresh.
    pub async fn acquire(&self) -> Result<C::Conn, PoolError> {
        let candidate = {
            let mut state = self.state.lock().expect("pool lock poisoned");
            if !state.initialized {
                return Err(PoolError::NotInitialized);
            }
            state.idle.pop_front()
        };

        if let Some(mut conn) = candidate {
            if conn.is_open() {
                return Ok(conn);
            }
            warn!("discarding dead pooled connection");
            conn.close();
        }

        self.connector.connect().await.map_err(|source| PoolError::Connect { source })
    }

    /// Returns a connection to the pool for reuse.
    ///
    /// A connection that no longer reports itself open is closed and dropped
    /// instead of being recycled.
    pub fn release(&self, mut conn: C::Conn) -> Result<(), PoolError> {
        let mut state = self.state.lock().expect("pool lock poisoned");
        if !state.initialized {
            // the pool will never recycle this handle; discard it closed
            drop(state);
            conn.close();
            return Err(PoolError::NotInitialized);
        }

        if conn.is_open() {
            state.idle.push_back(conn);
        } else {
            drop(state);
            conn.close();
        }
        Ok(())
    }

    /// Closes and drops every idle connection and clears the initialized
    /// flag. Idempotent. Connections currently checked out stay owned by
    /// their callers; on release they fail the open-check path.
    pub fn shutdown(&self) {
        let drained = {
            let mut state = self.state.lock().expect("pool lock poisoned");
            if !state.initialized {
                return;
            }
            state.initialized = false;
            std::mem::take(&mut state.idle)
        };

        for mut conn in drained {
            conn.close();
        }
        info!("connection pool shut down");
    }

    /// Number of idle connections currently queued.
    pub fn idle_count(&self) -> usize {
        self.state.lock().expect("pool lock poisoned").idle.len()
    }
}

impl<C: Connector> fmt::Debug for Pool<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock().expect("pool lock poisoned");
        f.debug_struct("Pool")
            .field("initialized", &state.initialized)
            .field("idle", &state.idle.len())
            .finish_non_exhaustive()
    }
}
