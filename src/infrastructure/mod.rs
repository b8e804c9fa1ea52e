pub mod charset;
pub mod config;
pub mod network;
