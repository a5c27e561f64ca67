//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `HttpClient` using `reqwest`
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::ReqwestHttpClient;
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let http_client = Arc::new(ReqwestHttpClient::with_timeout(Duration::from_secs(5)));
//! let resolver = MetadataResolver::new(&config, http_client);
//! ```

mod http;

pub use http::ReqwestHttpClient;
