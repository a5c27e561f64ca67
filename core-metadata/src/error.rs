use thiserror::Error;

#[derive(Error, Debug)]
pub enum MetadataError {
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Tag parse failed: {0}")]
    TagParse(String),

    #[error("Cache write failed: {0}")]
    Cache(String),

    #[error("Provider request failed: {0}")]
    ProviderFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Bridge error: {0}")]
    Bridge(#[from] bridge_traits::error::BridgeError),
}

pub type Result<T> = std::result::Result<T, MetadataError>;
