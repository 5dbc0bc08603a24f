use std::time::Duration;
use thiserror::Error;

/// Why a single page could not be retrieved.
///
/// The adaptive scraper only cares whether HTML came back, but the variant is
/// kept so the log line says which tier failed and how.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("render timed out after {0:?}")]
    RenderTimeout(Duration),

    #[error("render failed: {0}")]
    Render(String),
}

impl FetchError {
    /// Short category name used in log lines
    pub fn category(&self) -> &'static str {
        match self {
            FetchError::Timeout(_) => "timeout",
            FetchError::HttpStatus(_) => "http-status",
            FetchError::Transport(_) => "transport",
            FetchError::RenderTimeout(_) => "render-timeout",
            FetchError::Render(_) => "render-error",
        }
    }
}

/// Errors that abort a pipeline run or one of its persistence steps
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid seed URL {url}: {source}")]
    InvalidSeedUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("landing page {0} could not be retrieved by any method")]
    LandingUnavailable(String),

    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("invalid link filter pattern: {0}")]
    FilterPattern(#[from] regex::Error),

    #[error("company name {0:?} leaves nothing usable as a file name")]
    InvalidCompanyName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
