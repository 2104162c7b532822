use thiserror::Error;

#[derive(Error, Debug)]
pub enum BundleError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No upload token provided")]
    NoUploadToken,

    #[error("{message}")]
    FailedFetch {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    #[error("{0}")]
    UploadLimitReached(String),

    #[error("{0}")]
    FailedUpload(String),

    #[error("Could not detect CI provider")]
    ProviderNotDetected,

    #[error("git error: {0}")]
    Git(String),

    #[error("Unable to parse slug URL: {0}")]
    SlugParse(String),

    #[error("Failed to get OIDC token: {0}")]
    Oidc(String),

    #[error("{0}")]
    Other(String),
}

impl BundleError {
    pub(crate) fn failed_fetch(message: impl Into<String>) -> Self {
        BundleError::FailedFetch {
            message: message.into(),
            source: None,
        }
    }

    pub(crate) fn failed_fetch_from(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        BundleError::FailedFetch {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

pub type Result<T> = std::result::Result<T, BundleError>;
