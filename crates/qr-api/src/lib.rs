//! qr-api: Qricambi REST API client
//!
//! ## API Endpoints
//!
//! | Endpoint | URL | Purpose |
//! |----------|-----|---------|
//! | Base URL | `https://api.qricambi.com` | All Qricambi APIs |
//! | Vehicle | `GET /vehiclebyplate?plate=..` | Vehicle data from an IT plate |
//! | Suppliers | `GET /mysupplier` | Suppliers saved in the account |
//! | Prices | `POST /searchpriceandavailability` | Net prices and availability |
//!
//! ## Authentication
//! - Header: `Authorization: Bearer {QRICAMBI_BEARER}`
//! - The token lives in [`GatewayConfig`]; its absence fails the single call
//!   that needed it, never the process.
//!
//! Every operation is a fresh, independent call: no retries, no caching.

mod client;

pub use client::{endpoints, PriceQuery, QricambiApi, QricambiClient};
