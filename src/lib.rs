//! The concurrent request-serving core of a small document service.
//!
//! This crate provides the three subsystems with real concurrency and
//! lifecycle obligations; everything else is business logic plugged in
//! through the [`handler::Handler`] contract:
//!
//! - [`server`]: the connection acceptor and the per-connection session
//!   state machine (read → dispatch → write, one request per connection),
//!   with drain-based graceful shutdown
//! - [`router`]: the route dispatcher, resolving (path, method) pairs by
//!   exact match first and ordered pattern match second
//! - [`pool`]: a lock-guarded pool of exclusive-use backend connections
//!   that recycles on release and liveness-checks on checkout
//!
//! # Example
//!
//! ```no_run
//! use http::{Method, StatusCode};
//! use paperd::handler::{HandlerError, handler_fn};
//! use paperd::protocol::response::{self, Response};
//! use paperd::protocol::Request;
//! use paperd::router::Router;
//! use paperd::server::Server;
//!
//! #[tokio::main]
//! async fn main() {
//!     let router = Router::builder()
//!         .route(
//!             "/api/documents/{id}",
//!             Method::GET,
//!             handler_fn(|req: Request| async move {
//!                 let id = req.param("id").unwrap_or("?").to_string();
//!                 Ok::<Response, HandlerError>(response::text(StatusCode::OK, id))
//!             }),
//!         )
//!         .build();
//!
//!     let server = Server::builder()
//!         .address("127.0.0.1:4000").expect("resolvable address")
//!         .router(router)
//!         .build()
//!         .expect("server config complete");
//!
//!     let bound = server.bind().await.expect("bind server");
//!     let handle = bound.handle();
//!
//!     tokio::spawn(async move {
//!         tokio::signal::ctrl_c().await.expect("install signal handler");
//!         handle.stop().await;
//!     });
//!
//!     bound.serve().await;
//! }
//! ```
//!
//! # Concurrency model
//!
//! Sessions are tokio tasks sharing a fixed set of runtime worker threads;
//! there is no thread per connection. The route table is write-once before
//! serving and read lock-free afterwards; the pool's idle queue is the only
//! actively mutated shared structure and is touched only under its mutex,
//! never across backend I/O.

pub mod codec;
pub mod config;
pub mod handler;
pub mod pool;
pub mod protocol;
pub mod router;
pub mod server;

mod utils;
pub(crate) use utils::ensure;
