//! Defines error types encountered by this crate.

/// Generic error types encountered in this crate.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(
        "Please set the Firestore project id (FIRESTORE_PROJECT_ID or 'projectId') when using \
         the emulator, so that you can see your data in the emulator UI."
    )]
    MissingProjectId,
    #[error("no credentials were provided for the Firestore client")]
    MissingCredentials,
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    #[error("Credentials error: {0}")]
    Credentials(#[from] gcp_credentials::Error),
    #[error("Transport error: {0}")]
    Transport(#[from] tonic::transport::Error),
}

/// Errors loading a [`FirestoreEmulatorConfig`].
///
/// [`FirestoreEmulatorConfig`]: crate::FirestoreEmulatorConfig
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
    #[error("${var} must be 'true' or 'false', got '{value}'")]
    InvalidBool { var: &'static str, value: String },
}

impl From<std::convert::Infallible> for Error {
    fn from(value: std::convert::Infallible) -> Self {
        match value {}
    }
}
