use thiserror::Error;

use crate::sink::SinkError;

#[derive(Debug, Error)]
pub enum ProdrecError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("Delivery error: {0}")]
    Sink(#[from] SinkError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}
