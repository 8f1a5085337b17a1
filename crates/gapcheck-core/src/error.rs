use thiserror::Error;

#[derive(Debug, Error)]
pub enum GapError {
    #[error("not initialized: run 'gapcheck init'")]
    NotInitialized,

    #[error("report not found: {0}")]
    ReportNotFound(String),

    #[error("invalid slug '{0}': must be lowercase alphanumeric with hyphens")]
    InvalidSlug(String),

    #[error("unknown field '{0}': run 'gapcheck fields' to list valid paths")]
    UnknownField(String),

    #[error("invalid value '{value}' for {field}: {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("{field} must be between {min} and {max}, got {value}")]
    OutOfRange {
        field: String,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("company name is required before a report can be saved")]
    MissingCompanyName,

    #[error("invalid record update: {0}")]
    InvalidUpdate(String),

    #[error("storage error: {0}")]
    Store(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, GapError>;
