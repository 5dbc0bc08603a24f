use crate::error::FetchError;
use std::future::Future;

/// Cheap retrieval of a page's raw HTML, without running scripts
pub trait PageFetcher {
    /// Fetch `url` once. Any failure, including an HTTP status of 400 or
    /// above, is an error; implementations must not retry.
    fn fetch(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}

/// Expensive retrieval of a page's DOM after script execution
pub trait PageRenderer {
    /// Render `url` in a fresh browser and return the serialized DOM.
    /// The browser must be released before this returns, whatever the outcome.
    fn render(&self, url: &str) -> impl Future<Output = Result<String, FetchError>> + Send;
}
