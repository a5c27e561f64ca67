//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the metadata resolver:
//! - Logging and tracing infrastructure
//! - Configuration management
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that the other workspace crates
//! depend on. It establishes the logging conventions and the validated
//! configuration the resolver is built from.

pub mod config;
pub mod error;
pub mod logging;

pub use config::{ProviderEndpoints, ResolverConfig, ResolverConfigBuilder};
pub use error::{Error, Result};
