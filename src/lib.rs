//! Fetch a web page through a pooled HTTP client and decode the body using the
//! charset declared by the server, a `<meta>` tag, or UTF-8.
//!
//! ```no_run
//! use pagefetch::{ClientConfig, Fetcher};
//!
//! # async fn example() -> Result<(), pagefetch::FetchError> {
//! let fetcher = Fetcher::new(ClientConfig::default())?;
//! if let Some(html) = fetcher.fetch("https://example.com").await {
//!     println!("{html}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod state;

// Re-export for convenience
pub use domain::error::FetchError;
pub use domain::model::{CharsetSource, FetchedPage};
pub use domain::traits::PageSource;
pub use infrastructure::charset::{decode_body, declared_charset, detect_charset};
pub use infrastructure::config::{ClientConfig, Config};
pub use infrastructure::network::client::Fetcher;
