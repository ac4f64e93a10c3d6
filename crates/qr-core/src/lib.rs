//! qr-core: shared foundation for the Qricambi MCP gateway
//!
//! Holds the pieces every other crate leans on:
//! - `GatewayConfig`: process configuration, read from the environment once
//!   at startup and passed by reference from then on.
//! - `Error` / `Result`: the gateway-wide error taxonomy.

pub mod config;
pub mod error;

pub use config::GatewayConfig;
pub use error::{Error, Result};
