use crate::domain::error::FetchError;
use crate::domain::model::FetchedPage;
use async_trait::async_trait;

/// Trait for anything that can turn a URL into a decoded page
///
/// The HTTP `Fetcher` is the production implementation; the demo loop is
/// written against this trait so it can be driven by a stub in tests.
#[async_trait]
pub trait PageSource {
    /// Fetch and decode a page, surfacing the failure cause
    async fn fetch_page(&self, url: &str) -> Result<FetchedPage, FetchError>;

    /// Fetch and decode a page, collapsing every failure to `None`
    async fn fetch(&self, url: &str) -> Option<String>;
}
