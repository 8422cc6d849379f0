use thiserror::Error;

pub type Result<T> = std::result::Result<T, BootstrapError>;

/// Stage-indexed error taxonomy. Each pipeline stage owns exactly one exit
/// code; no stage retries.
#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("missing control plane access token")]
    MissingToken,

    #[error("control plane not found: {0}")]
    ControlPlaneNotFound(String),

    #[error("certificate error: {0}")]
    Certificate(String),

    #[error("certificate registration failed: {0}")]
    Registration(String),

    #[error("endpoints fetch failed: {0}")]
    Endpoints(String),

    #[error("node process launch failed: {0}")]
    Launch(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl BootstrapError {
    /// Process exit code for this failure. Certificate generation and
    /// registration share the certificate-stage code. Transport errors that
    /// escape without a stage classification exit 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            BootstrapError::MissingToken => 10,
            BootstrapError::ControlPlaneNotFound(_) => 11,
            BootstrapError::Certificate(_) | BootstrapError::Registration(_) => 12,
            BootstrapError::Endpoints(_) => 13,
            BootstrapError::Launch(_) => 14,
            BootstrapError::Http(_) => 1,
        }
    }
}
