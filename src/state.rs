use crate::domain::error::FetchError;
use crate::infrastructure::config::Config;
use crate::infrastructure::network::client::Fetcher;
use std::sync::Arc;

/// Everything a command needs, built once at start-up and passed by reference
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub fetcher: Fetcher,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, FetchError> {
        let fetcher = Fetcher::new(config.client.clone())?;

        Ok(Self {
            config: Arc::new(config),
            fetcher,
        })
    }
}
