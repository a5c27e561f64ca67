//! Two-phase metadata resolution demo
//!
//! Resolves a file once from local data only, then again with network
//! lookups enabled, printing both records as JSON.
//!
//! Run with:
//! ```bash
//! cargo run -p core-metadata --example resolve_track -- path/to/song.mp3
//!
//! # Custom cache directory and JSON logs
//! cargo run -p core-metadata --example resolve_track -- path/to/song.flac /tmp/cache json
//! ```

use anyhow::{bail, Context};
use bridge_desktop::ReqwestHttpClient;
use core_metadata::MetadataResolver;
use core_runtime::config::ResolverConfig;
use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args: Vec<String> = env::args().collect();
    let Some(track) = args.get(1).map(PathBuf::from) else {
        bail!("usage: resolve_track <audio-file> [cache-dir] [pretty|json|compact]");
    };
    let cache_dir = args.get(2).cloned().unwrap_or_else(|| "cache".to_string());
    let format = match args.get(3) {
        Some(name) => name.parse::<LogFormat>()?,
        None => LogFormat::default(),
    };

    init_logging(
        LoggingConfig::default()
            .with_format(format)
            .with_level(LogLevel::Debug),
    )?;

    let config = ResolverConfig::builder()
        .cache_dir(cache_dir)
        .build()
        .context("invalid resolver configuration")?;

    let http = Arc::new(ReqwestHttpClient::with_timeout(config.provider_timeout));
    let resolver = MetadataResolver::new(&config, http);

    let started = Instant::now();
    let quick = resolver
        .resolve(&track, false)
        .await
        .context("local resolution failed")?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Local phase done");
    println!("{}", serde_json::to_string_pretty(&quick)?);

    let started = Instant::now();
    let full = resolver
        .resolve(&track, true)
        .await
        .context("network resolution failed")?;
    info!(elapsed_ms = started.elapsed().as_millis() as u64, "Network phase done");
    println!("{}", serde_json::to_string_pretty(&full)?);

    Ok(())
}
