// Connection slot accounting on top of reqwest's own pool
use crate::domain::error::FetchError;
use crate::infrastructure::config::ClientConfig;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use url::Url;

/// Bounds in-flight requests overall and per route (`scheme://host:port`).
///
/// reqwest only caps idle connections, so the active limits of the pool are
/// enforced here. A request that cannot get both slots within the acquisition
/// timeout fails with `FetchError::PoolTimeout`.
///
/// Route entries are dropped again once nothing holds or waits on them, so
/// the route table stays near `max_total` entries however many hosts are
/// visited.
#[derive(Debug)]
pub struct ConnectionLimiter {
    total: Arc<Semaphore>,
    routes: DashMap<String, Arc<Semaphore>>,
    max_total: usize,
    per_route: usize,
    acquire_timeout: Duration,
}

/// Held for the duration of one request; slots are returned on drop
#[derive(Debug)]
pub struct ConnectionPermit {
    _route: OwnedSemaphorePermit,
    _total: OwnedSemaphorePermit,
}

impl ConnectionLimiter {
    pub fn new(max_total: usize, per_route: usize, acquire_timeout: Duration) -> Self {
        Self {
            total: Arc::new(Semaphore::new(max_total)),
            routes: DashMap::new(),
            max_total,
            per_route,
            acquire_timeout,
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(
            config.max_total_connections,
            config.max_connections_per_route,
            config.connection_request_timeout(),
        )
    }

    pub fn route_key(url: &Url) -> String {
        format!(
            "{}://{}:{}",
            url.scheme(),
            url.host_str().unwrap_or_default(),
            url.port_or_known_default().unwrap_or_default()
        )
    }

    fn route_semaphore(&self, route: &str) -> Arc<Semaphore> {
        if self.routes.len() >= self.max_total && !self.routes.contains_key(route) {
            self.prune_idle_routes();
        }
        self.routes
            .entry(route.to_string())
            .or_insert_with(|| Arc::new(Semaphore::new(self.per_route)))
            .clone()
    }

    /// Wait for a route slot and a total slot, in that order.
    pub async fn acquire(&self, url: &Url) -> Result<ConnectionPermit, FetchError> {
        let route = Self::route_key(url);
        let route_slots = self.route_semaphore(&route);
        let total_slots = self.total.clone();

        let acquired = tokio::time::timeout(self.acquire_timeout, async move {
            let route_permit = route_slots.acquire_owned().await?;
            let total_permit = total_slots.acquire_owned().await?;
            Ok::<_, tokio::sync::AcquireError>(ConnectionPermit {
                _route: route_permit,
                _total: total_permit,
            })
        })
        .await;

        match acquired {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_closed)) => Err(FetchError::Config(
                "connection limiter has been closed".to_string(),
            )),
            Err(_elapsed) => Err(FetchError::PoolTimeout {
                route,
                timeout: self.acquire_timeout,
            }),
        }
    }

    /// Forget routes with no permit out and no waiter.
    ///
    /// Permits and waiters each hold a clone of their route's semaphore, so
    /// a count of one means only the table refers to it.
    fn prune_idle_routes(&self) {
        self.routes.retain(|_, slots| Arc::strong_count(slots) > 1);
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn available_total(&self) -> usize {
        self.total.available_permits()
    }

    pub fn available_for(&self, url: &Url) -> usize {
        self.routes
            .get(&Self::route_key(url))
            .map(|s| s.available_permits())
            .unwrap_or(self.per_route)
    }
}
