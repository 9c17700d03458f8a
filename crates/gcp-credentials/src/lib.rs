//! Request credentials for Google Cloud gRPC/HTTP clients, and the transport glue that
//! attaches them to outgoing requests.

pub type Result<T> = core::result::Result<T, Error>;

pub mod credentials;
pub mod emulator;

pub use credentials::{Credentials, RequestMetadata};
pub use emulator::EmulatorCredentials;

pub mod channel;
pub use channel::{CredentialsChannel, CredentialsInterceptor, CredentialsLayer};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Transport(#[from] Box<dyn std::error::Error + Send + Sync>),
    #[error(transparent)]
    InvalidHeaderName(#[from] http::header::InvalidHeaderName),
    #[error(transparent)]
    InvalidHeaderValue(#[from] http::header::InvalidHeaderValue),
    #[error(transparent)]
    InvalidMetadataKey(#[from] tonic::metadata::errors::InvalidMetadataKey),
    #[error(transparent)]
    InvalidMetadataValue(#[from] tonic::metadata::errors::InvalidMetadataValue),
    #[error("failed to refresh credentials: {0}")]
    Refresh(String),
}

impl From<tonic::transport::Error> for Error {
    fn from(err: tonic::transport::Error) -> Self {
        Self::Transport(err.into())
    }
}

impl From<std::convert::Infallible> for Error {
    fn from(value: std::convert::Infallible) -> Self {
        match value {}
    }
}
