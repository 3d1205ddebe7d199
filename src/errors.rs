use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serde JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("Index persist error: {0}")]
    Persist(#[from] tempfile::PersistError),

    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    #[error("Logger error: {0}")]
    Logger(String),
}
