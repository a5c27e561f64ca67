//! # Track Metadata Module
//!
//! Resolves display metadata for audio files.
//!
//! ## Overview
//!
//! This module handles:
//! - Audio tag extraction (ID3, Vorbis comments, MP4 atoms)
//! - Repair of mis-decoded legacy text encodings
//! - A write-once, content-addressed cache for covers and lyrics
//! - Remote artwork fetching (optional, feature-gated)
//! - Lyrics fetching from external providers (optional, feature-gated)

pub mod artwork;
pub mod cache;
pub mod error;
pub mod extractor;
pub mod lyrics;
pub mod normalize;
pub mod providers;
pub mod resolver;

pub use cache::{CacheIdentity, CacheStore, CoverKind};
pub use error::{MetadataError, Result};
pub use extractor::{ContainerKind, TagBundle, TagExtractor};
pub use resolver::{MetadataRecord, MetadataResolver};
