use thiserror::Error;

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("missing required setting: set {0}")]
    MissingSetting(&'static str),

    #[error("invalid repository '{0}': expected 'owner/name'")]
    InvalidRepository(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error("{context}: HTTP {status}: {body}")]
    Api {
        context: String,
        status: u16,
        body: String,
    },

    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Walk(#[from] walkdir::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SyncError>;
