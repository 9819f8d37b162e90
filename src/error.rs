use thiserror::Error;

/// Retrieval-stage failures. Each one ends extraction for the request.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    #[error("Could not load organization profile: {0}")]
    ProfileUnavailable(String),

    #[error("No digital XML filing found: {0}")]
    NoDigitalFiling(String),

    #[error("Failed to download XML filing: {0}")]
    FilingDownloadFailed(String),
}

#[derive(Error, Debug)]
pub enum YieldGapError {
    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid EIN: {0}")]
    InvalidEin(String),

    #[error("Search failed: {0}")]
    Search(String),

    #[error("Settings error: {0}")]
    Settings(String),
}

pub type Result<T> = std::result::Result<T, YieldGapError>;
