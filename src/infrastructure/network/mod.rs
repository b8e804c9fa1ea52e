pub mod client;
pub mod headers;
pub mod http;
pub mod pool;
