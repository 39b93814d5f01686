//! # WorldTides Client Library
//!
//! A lean async client for the [WorldTides](https://www.worldtides.info) v3
//! API. It builds the request URL, attaches the API key, sends one GET with a
//! bounded timeout, checks the response and decodes the JSON into typed
//! models.
//!
//! ## Design Philosophy
//!
//! ### Thin and Fail-Fast
//! - **One attempt per call**: no retries, no caching, no fallback values
//! - **Typed failures**: every error is a [`WorldtidesError`] with a broad
//!   [`ErrorKind`] (connection, service, validation, configuration) and the
//!   underlying cause chained as its source
//!
//! ### Scoped Resources
//! The HTTP session (a pooled `reqwest::Client`) is either supplied by the
//! caller or created lazily by the client. Only a session the client created
//! is released by [`Worldtides::close`] or on drop.
//!
//! ### Data Flow
//! 1. **Request**: `get_stations(lat, lon, radius)` → `request("stations", params)`
//! 2. **Network**: HTTPS GET `https://www.worldtides.info/api/v3?...`
//! 3. **Decode**: JSON → [`StationResponse`] with its [`Station`] list
//! 4. **Account**: the credits reported by the server land in [`CreditUsage`]
//!
//! ## Logging
//! Requests, failures and session lifecycle are reported through `tracing`.
//! The library never installs a subscriber; the API key is never logged.

pub mod client;
pub mod config;
pub mod credit_usage;
pub mod error;
pub mod models;

pub use client::{Worldtides, API_HOST};
pub use config::{ConfigError, WorldtidesConfig};
pub use credit_usage::CreditUsage;
pub use error::{ErrorKind, WorldtidesError};
pub use models::{Station, StationResponse};

#[cfg(test)]
mod tests;
