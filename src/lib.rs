//! Workspace facade crate.
//!
//! Hosts that only need "give me the metadata for this file" can depend on
//! `track-metadata-workspace` and toggle the documented features instead of
//! wiring `core-metadata`, `core-runtime` and the bridges individually.
//!
//! - `desktop-shims`: reqwest-backed [`HttpClient`](bridge_traits::http::HttpClient)
//! - `lyrics`: Netease and LRCLib lyrics providers
//! - `artwork-remote`: iTunes cover art provider

pub use bridge_traits;
pub use core_metadata;
pub use core_runtime;

#[cfg(feature = "desktop-shims")]
pub use bridge_desktop;

pub use core_metadata::{MetadataError, MetadataRecord, MetadataResolver};
pub use core_runtime::config::ResolverConfig;
