//! Error types for the prematch module.

use thiserror::Error;

use crate::analyzer::AnalyzerError;

#[derive(Debug, Error)]
pub enum PreMatchError {
    #[error("Failed to decode lobby file: {0}")]
    Decode(#[from] AnalyzerError),

    #[error("Lobby file could not be parsed (status: {0})")]
    NotParsed(String),

    #[error("Lobby file has no players")]
    NoPlayers,

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    #[error("Failed to open results page: {0}")]
    Browser(#[from] std::io::Error),
}
