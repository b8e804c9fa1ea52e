// HTTP client utilities
use crate::domain::error::FetchError;
use crate::infrastructure::config::ClientConfig;
use reqwest::{Client, Proxy};
use tracing::warn;

/// Create the pooled HTTP client described by `config`
pub fn create_client(config: &ClientConfig) -> Result<Client, FetchError> {
    config.validate()?;

    let mut builder = Client::builder()
        .pool_max_idle_per_host(config.max_connections_per_route)
        .pool_idle_timeout(config.pool_idle_timeout())
        .connect_timeout(config.connect_timeout())
        .read_timeout(config.socket_timeout())
        .gzip(true)
        .deflate(true)
        .tls_sni(config.tls_sni);

    if config.accept_self_signed {
        warn!("TLS verification is disabled: neither certificate chain nor hostname will be checked");
        builder = builder.danger_accept_invalid_certs(true);
    }

    if let Some(proxy) = config.http_proxy.as_deref().filter(|p| !p.is_empty()) {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    Ok(builder.build()?)
}
