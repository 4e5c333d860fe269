// onuctl-api: Async Rust client for OLT device-control APIs

pub mod auth;
pub mod client;
pub mod devices;
pub mod error;
pub mod onu;
pub mod transport;
pub mod types;

pub use client::OltClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
