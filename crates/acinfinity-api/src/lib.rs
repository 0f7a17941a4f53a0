// acinfinity-api: Async Rust client for the AC Infinity UIS cloud API

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod keys;
pub mod models;
pub mod settings;
pub mod transport;

pub use client::AcInfinityClient;
pub use error::Error;
pub use models::{ApiResponse, JsonObject};
pub use transport::TransportConfig;

/// Production host of the AC Infinity cloud.
pub const DEFAULT_HOST: &str = "http://www.acinfinityserver.com";
