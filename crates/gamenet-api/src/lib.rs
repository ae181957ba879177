// gamenet-api: Async Rust client for the GameNet management server

pub mod auth;
pub mod client;
pub mod clients;
pub mod error;
pub mod markup;
pub mod models;
pub mod transport;
pub mod vhd;

pub use client::ConsoleClient;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
