use thiserror::Error;

#[derive(Error, Debug)]
pub enum TabError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Input validation error: {0}")]
    InputValidation(String),

    #[error("Unsupported prompt template: {0}")]
    UnsupportedTemplate(String),

    #[error("Unsupported target language: {0}")]
    UnsupportedLanguage(String),

    #[error("Unsupported backend: {0}")]
    UnsupportedBackend(String),

    #[error("Backend construction error: {0}")]
    BackendConstruction(String),

    #[error("Transient request error: {0}")]
    TransientRequest(String),

    #[error("Translation error: {0}")]
    Translation(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),
}

impl TabError {
    /// Whether a request-level failure is worth retrying. Content and
    /// validation errors are not.
    pub fn is_transient(&self) -> bool {
        matches!(self, TabError::Http(_) | TabError::TransientRequest(_))
    }
}

pub type Result<T> = std::result::Result<T, TabError>;
