//! Protocol data shapes shared by the codec, the router and the session.

mod error;
pub mod query;
mod request;
pub mod response;

pub use error::{ParseError, SendError, SessionError};
pub use request::{PathParams, Request, RequestHead};
pub use response::Response;
