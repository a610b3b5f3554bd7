use std::io;
use std::net::SocketAddr;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ServerBuildError {
    #[error("router must be set")]
    MissingRouter,

    #[error("address must be set")]
    MissingAddress,

    #[error("invalid listen address: {source}")]
    InvalidAddress {
        #[from]
        source: io::Error,
    },
}

/// The listening socket could not be established. Fatal at startup.
#[derive(Error, Debug)]
#[error("failed to bind {addr:?}: {source}")]
pub struct BindError {
    pub addr: Vec<SocketAddr>,
    #[source]
    pub source: io::Error,
}
