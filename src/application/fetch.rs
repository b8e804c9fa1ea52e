use crate::domain::error::FetchError;
use crate::domain::model::FetchedPage;
use crate::domain::traits::PageSource;
use std::time::Duration;
use tracing::{error, info};

/// Outcome counts of a repeated fetch run
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FetchSummary {
    pub attempts: usize,
    pub succeeded: usize,
    pub failed: usize,
}

/// Fetch the same URL `repeat` times, sleeping `delay` between attempts.
///
/// `on_result` sees every attempt (1-based index) as it completes. Each
/// failure other than invalid input is logged here exactly once, so callers
/// should not report it again. Nothing is retried.
pub async fn fetch_repeatedly<S, F>(
    source: &S,
    url: &str,
    repeat: usize,
    delay: Duration,
    mut on_result: F,
) -> FetchSummary
where
    S: PageSource + Sync + ?Sized,
    F: FnMut(usize, &Result<FetchedPage, FetchError>),
{
    let mut summary = FetchSummary::default();

    for attempt in 1..=repeat {
        let result = source.fetch_page(url).await;
        summary.attempts += 1;

        match &result {
            Ok(page) => {
                summary.succeeded += 1;
                info!(
                    attempt,
                    url = %page.url,
                    charset = %page.charset,
                    bytes = page.content_length,
                    "Fetched page"
                );
            }
            Err(e) => {
                summary.failed += 1;
                if !e.is_invalid_input() {
                    error!(attempt, url = %url, "{}", e);
                }
            }
        }
        on_result(attempt, &result);

        if attempt < repeat && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }

    summary
}
