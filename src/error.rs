use thiserror::Error;

pub type Result<T> = std::result::Result<T, ContribError>;

#[derive(Error, Debug)]
pub enum ContribError {
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
    #[error("Data shape error at `{field}`: {message}")]
    DataShape { field: String, message: String },
    #[error("Marker not found: {0}")]
    MarkerNotFound(String),
    #[error("Configuration error: {0}")]
    Config(String),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ContribError {
    pub fn transport(message: impl Into<String>) -> Self {
        ContribError::Transport {
            message: message.into(),
            source: None,
        }
    }

    pub fn transport_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        ContribError::Transport {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    pub fn data_shape(field: impl Into<String>, message: impl Into<String>) -> Self {
        ContribError::DataShape {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Short tag used when logging a failed run.
    pub fn kind(&self) -> &'static str {
        match self {
            ContribError::Auth(_) => "auth",
            ContribError::Transport { .. } => "transport",
            ContribError::DataShape { .. } => "data_shape",
            ContribError::MarkerNotFound(_) => "marker_not_found",
            ContribError::Config(_) => "config",
            ContribError::Serde(_) => "serialization",
            ContribError::Io(_) => "io",
        }
    }
}

impl From<reqwest::Error> for ContribError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ContribError::transport_with_source("Request timed out", err)
        } else {
            ContribError::transport_with_source("Request failed", err)
        }
    }
}
