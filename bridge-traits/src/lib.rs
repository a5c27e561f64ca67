//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the metadata core and
//! platform-specific implementations. The resolver never talks to the network
//! directly: it is handed an [`HttpClient`](http::HttpClient) and stays
//! agnostic of the transport that backs it.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with per-request timeouts
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | ✅ Available |
//! | Tests    | `mockall` doubles   | ✅ Available |
//!
//! ## Error Handling
//!
//! Bridge operations return [`BridgeError`](error::BridgeError). Callers in
//! the metadata core treat every bridge failure as "provider found nothing";
//! the error only ever reaches the logs.

pub mod error;
pub mod http;

pub use error::{BridgeError, Result};
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
