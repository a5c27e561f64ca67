//! Audio Tag Extraction
//!
//! Reads the descriptive tags of an audio file into a [`TagBundle`]. The
//! container is identified by sniffing the file content, never the extension:
//!
//! - ID3-style (MP3, DSF) is read with the `id3` crate. DSF files keep their
//!   ID3v2 tag at the metadata pointer stored in the `DSD ` header. Files
//!   without an ID3v2 tag fall back to a trailing ID3v1 block.
//! - Vorbis-style (FLAC) and atom-style (MP4/M4A) are read with `lofty`.
//!
//! Every text value passes through [`crate::normalize`] so mis-labelled
//! legacy encodings come out readable.
//!
//! ## Usage
//!
//! ```ignore
//! use core_metadata::extractor::TagExtractor;
//! use std::path::Path;
//!
//! # async fn example() -> core_metadata::Result<()> {
//! let extractor = TagExtractor::new();
//! let bundle = extractor.extract(Path::new("song.flac")).await?;
//! println!("Title: {}", bundle.title.unwrap_or_default());
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use core_runtime::logging::strip_path;
use id3::TagLike;
use lofty::config::ParseOptions;
use lofty::file::{FileType, TaggedFileExt};
use lofty::probe::Probe;
use lofty::tag::{Accessor, ItemKey};
use std::io::{Cursor, ErrorKind};
use std::path::Path;
use tracing::{debug, warn};

use crate::error::{MetadataError, Result};
use crate::normalize::{latin1_bytes, normalize_bytes, normalize_str};

/// Byte range of the metadata pointer inside a DSF header
const DSF_POINTER: std::ops::Range<usize> = 20..28;

/// Leading NUL padding tolerated before an MPEG frame sync
const MAX_LEADING_PADDING: usize = 4096;

/// Tag values read from one file. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBundle {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    /// Raw bytes of the first embedded picture
    pub cover: Option<Bytes>,
    pub lyrics: Option<String>,
}

impl TagBundle {
    /// True when no field was found
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.artist.is_none()
            && self.album.is_none()
            && self.cover.is_none()
            && self.lyrics.is_none()
    }
}

/// Tag format family of a container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContainerKind {
    /// ID3v2 or ID3v1 (MP3, DSF)
    Id3Style,
    /// Vorbis comments (FLAC)
    VorbisStyle,
    /// iTunes-style atoms (MP4, M4A)
    AtomStyle,
}

impl ContainerKind {
    /// Identify the container from the leading bytes of a file
    pub fn sniff(data: &[u8]) -> Option<Self> {
        if data.starts_with(b"ID3") {
            // FLAC streams may carry an ID3v2 block ahead of the stream marker
            let after = id3v2_len(data)
                .and_then(|len| data.get(len..))
                .unwrap_or_default();
            return Some(if after.starts_with(b"fLaC") {
                Self::VorbisStyle
            } else {
                Self::Id3Style
            });
        }
        if data.starts_with(b"DSD ") {
            return Some(Self::Id3Style);
        }
        if data.starts_with(b"fLaC") {
            return Some(Self::VorbisStyle);
        }
        if data.get(4..8) == Some(b"ftyp".as_slice()) {
            return Some(Self::AtomStyle);
        }
        if is_frame_sync(skip_padding(data)) {
            return Some(Self::Id3Style);
        }
        None
    }
}

/// Audio tag extractor
pub struct TagExtractor {
    parse_options: ParseOptions,
}

impl TagExtractor {
    /// Create an extractor that skips audio properties
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::new().read_properties(false),
        }
    }

    /// Extract tags from the file at `path`.
    ///
    /// # Errors
    ///
    /// - [`MetadataError::FileNotFound`] if the file does not exist
    /// - [`MetadataError::Io`] if it cannot be read
    /// - [`MetadataError::UnsupportedFormat`] if the container is not recognised
    ///
    /// A tag that fails to parse is not an error; it yields an empty bundle.
    pub async fn extract(&self, path: &Path) -> Result<TagBundle> {
        let shown = path.display().to_string();
        let file = strip_path(&shown);
        debug!(file = %file, "Extracting tags");

        let data = tokio::fs::read(path).await.map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                MetadataError::FileNotFound(shown.clone())
            } else {
                MetadataError::Io(e)
            }
        })?;

        self.extract_from_bytes(&data).or_else(|e| match e {
            MetadataError::TagParse(reason) => {
                warn!(file = %file, error = %reason, "Failed to parse tags");
                Ok(TagBundle::default())
            }
            other => Err(other),
        })
    }

    /// Extract tags from an in-memory file image.
    ///
    /// Unlike [`extract`](Self::extract) this surfaces tag parse failures as
    /// [`MetadataError::TagParse`].
    pub fn extract_from_bytes(&self, data: &[u8]) -> Result<TagBundle> {
        let kind = ContainerKind::sniff(data).ok_or_else(|| {
            MetadataError::UnsupportedFormat("unrecognised container signature".to_string())
        })?;

        let bundle = match kind {
            ContainerKind::Id3Style => match locate_id3(data) {
                Some(region) => read_id3(region)?,
                None => TagBundle::default(),
            },
            ContainerKind::VorbisStyle => self.read_lofty(data, FileType::Flac)?,
            ContainerKind::AtomStyle => self.read_lofty(data, FileType::Mp4)?,
        };

        debug!(container = ?kind, empty = bundle.is_empty(), "Tags extracted");
        Ok(bundle)
    }

    fn read_lofty(&self, data: &[u8], file_type: FileType) -> Result<TagBundle> {
        let tagged_file = Probe::new(Cursor::new(data))
            .set_file_type(file_type)
            .options(self.parse_options)
            .read()
            .map_err(|e| MetadataError::TagParse(e.to_string()))?;

        let Some(tag) = tagged_file.primary_tag().or_else(|| tagged_file.first_tag()) else {
            return Ok(TagBundle::default());
        };

        Ok(TagBundle {
            title: tag.title().and_then(|s| clean_field(&s)),
            artist: tag.artist().and_then(|s| clean_field(&s)),
            album: tag.album().and_then(|s| clean_field(&s)),
            cover: tag
                .pictures()
                .first()
                .filter(|pic| !pic.data().is_empty())
                .map(|pic| Bytes::copy_from_slice(pic.data())),
            lyrics: tag.get_string(&ItemKey::Lyrics).and_then(clean_lyrics),
        })
    }
}

impl Default for TagExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Slice holding the ID3 tag, or `None` when the file declares no tag
fn locate_id3(data: &[u8]) -> Option<&[u8]> {
    if !data.starts_with(b"DSD ") {
        return Some(data);
    }

    let pointer: [u8; 8] = data.get(DSF_POINTER)?.try_into().ok()?;
    let offset = usize::try_from(u64::from_le_bytes(pointer)).ok()?;
    if offset == 0 || offset >= data.len() {
        return None;
    }
    Some(&data[offset..])
}

fn read_id3(region: &[u8]) -> Result<TagBundle> {
    let tag = match id3::Tag::read_from2(Cursor::new(region)) {
        Ok(tag) => tag,
        Err(e) if matches!(e.kind, id3::ErrorKind::NoTag) => return Ok(read_id3v1(region)),
        Err(e) => match e.partial_tag {
            Some(partial) => {
                warn!(error = %e.description, "ID3 tag partially parsed");
                partial
            }
            None => return Err(MetadataError::TagParse(e.to_string())),
        },
    };

    let bundle = TagBundle {
        title: tag.title().and_then(first_value).and_then(clean_field),
        artist: tag.artist().and_then(first_value).and_then(clean_field),
        album: tag.album().and_then(first_value).and_then(clean_field),
        cover: tag
            .pictures()
            .find(|pic| !pic.data.is_empty())
            .map(|pic| Bytes::copy_from_slice(&pic.data)),
        lyrics: tag.lyrics().next().and_then(|l| clean_lyrics(&l.text)),
    };
    Ok(bundle)
}

/// Trailing ID3v1 block. Its fields carry no charset, so the raw bytes are
/// decoded from scratch.
fn read_id3v1(region: &[u8]) -> TagBundle {
    let tag = match id3::v1::Tag::read_from(Cursor::new(region)) {
        Ok(tag) => tag,
        Err(e) => {
            if !matches!(e.kind, id3::ErrorKind::NoTag) {
                debug!(error = %e, "Unreadable ID3v1 block");
            }
            return TagBundle::default();
        }
    };

    TagBundle {
        title: clean_v1_field(&tag.title),
        artist: clean_v1_field(&tag.artist),
        album: clean_v1_field(&tag.album),
        ..TagBundle::default()
    }
}

/// Total size of the leading ID3v2 tag, footer included
fn id3v2_len(data: &[u8]) -> Option<usize> {
    let header = data.get(..10)?;
    let size = header[6..10]
        .iter()
        .try_fold(0usize, |acc, &b| (b < 0x80).then(|| (acc << 7) | usize::from(b)))?;
    let footer = if header[5] & 0x10 != 0 { 10 } else { 0 };
    Some(10 + size + footer)
}

fn skip_padding(data: &[u8]) -> &[u8] {
    let padding = data
        .iter()
        .take(MAX_LEADING_PADDING)
        .take_while(|&&b| b == 0)
        .count();
    &data[padding..]
}

fn is_frame_sync(data: &[u8]) -> bool {
    data.len() >= 2 && data[0] == 0xFF && data[1] & 0xE0 == 0xE0
}

/// First entry of a NUL-separated multi-value frame
fn first_value(value: &str) -> Option<&str> {
    value.split('\0').next()
}

/// Normalized and trimmed; blank counts as absent
fn clean_field(value: &str) -> Option<String> {
    let normalized = normalize_str(value);
    let trimmed = normalized.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// ID3v1 text, already widened one byte per char by the reader
fn clean_v1_field(value: &str) -> Option<String> {
    let decoded = match latin1_bytes(value) {
        Some(raw) => normalize_bytes(&raw),
        None => normalize_str(value),
    };
    let trimmed = decoded.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Normalized with line structure intact; blank counts as absent
fn clean_lyrics(value: &str) -> Option<String> {
    let normalized = normalize_str(value);
    (!normalized.trim().is_empty()).then_some(normalized)
}
