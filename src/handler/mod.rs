//! The handler contract between the session and business logic.
//!
//! Handlers receive a fully read [`Request`] and return a [`Response`].
//! Expected conditions (bad input, missing records) should be expressed as
//! responses; an `Err` from a handler is caught at the session boundary and
//! converted into a generic server-error response.

use std::error::Error;

use async_trait::async_trait;

use crate::protocol::{Request, Response};

/// Error type a handler may surface for unexpected failures.
pub type HandlerError = Box<dyn Error + Send + Sync>;

#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, req: Request) -> Result<Response, HandlerError>;
}

/// Adapter turning an async function into a [`Handler`].
#[derive(Debug)]
pub struct HandlerFn<F> {
    f: F,
}

#[async_trait]
impl<F, Fut> Handler for HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    async fn handle(&self, req: Request) -> Result<Response, HandlerError> {
        (self.f)(req).await
    }
}

pub fn handler_fn<F, Fut>(f: F) -> HandlerFn<F>
where
    F: Fn(Request) -> Fut + Send + Sync,
    Fut: Future<Output = Result<Response, HandlerError>> + Send,
{
    HandlerFn { f }
}
