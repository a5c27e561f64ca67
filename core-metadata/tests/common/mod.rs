//! Fixture builders shared by the integration tests.
//!
//! Audio files are synthesised in memory: ID3v2 tags are authored with the
//! `id3` crate, while ID3v1 blocks, FLAC metadata blocks and MP4 atoms are
//! assembled by hand. Cover images are encoded with `image`.

#![allow(dead_code)]

use id3::frame::{Lyrics, Picture, PictureType};
use id3::{TagLike, Version};
use image::{DynamicImage, ImageFormat, RgbImage};
use std::io::Cursor;
use std::path::{Path, PathBuf};

/// A silent MPEG-1 Layer III frame header followed by padding
pub const MPEG_FRAME: [u8; 8] = [0xFF, 0xFB, 0x90, 0x64, 0x00, 0x00, 0x00, 0x00];

/// Tag values to author into a fixture
#[derive(Debug, Default, Clone)]
pub struct Id3Fields<'a> {
    pub title: Option<&'a str>,
    pub artist: Option<&'a str>,
    pub album: Option<&'a str>,
    pub cover: Option<Vec<u8>>,
    pub lyrics: Option<&'a str>,
}

/// Serialized ID3v2.4 tag
pub fn id3_tag(fields: &Id3Fields<'_>) -> Vec<u8> {
    let mut tag = id3::Tag::new();
    if let Some(title) = fields.title {
        tag.set_title(title);
    }
    if let Some(artist) = fields.artist {
        tag.set_artist(artist);
    }
    if let Some(album) = fields.album {
        tag.set_album(album);
    }
    if let Some(cover) = &fields.cover {
        tag.add_frame(Picture {
            mime_type: "image/jpeg".to_string(),
            picture_type: PictureType::CoverFront,
            description: String::new(),
            data: cover.clone(),
        });
    }
    if let Some(lyrics) = fields.lyrics {
        tag.add_frame(Lyrics {
            lang: "eng".to_string(),
            description: String::new(),
            text: lyrics.to_string(),
        });
    }

    let mut buf = Vec::new();
    tag.write_to(&mut buf, Version::Id3v24)
        .expect("Failed to serialize ID3 tag");
    buf
}

/// ID3 tag followed by one MPEG frame
pub fn mp3_bytes(fields: &Id3Fields<'_>) -> Vec<u8> {
    let mut data = id3_tag(fields);
    data.extend_from_slice(&MPEG_FRAME);
    data
}

/// 128-byte ID3v1 block; fields are raw bytes, NUL padded
pub fn id3v1_block(title: &[u8], artist: &[u8], album: &[u8]) -> Vec<u8> {
    fn field(value: &[u8], width: usize) -> Vec<u8> {
        let mut out = value[..value.len().min(width)].to_vec();
        out.resize(width, 0);
        out
    }

    let mut block = b"TAG".to_vec();
    block.extend(field(title, 30));
    block.extend(field(artist, 30));
    block.extend(field(album, 30));
    block.extend(field(b"2004", 4));
    block.extend(field(b"", 30));
    block.push(255);
    block
}

/// MPEG frame followed by a trailing ID3v1 block
pub fn mp3_with_id3v1(title: &[u8], artist: &[u8], album: &[u8]) -> Vec<u8> {
    let mut data = MPEG_FRAME.to_vec();
    data.extend(id3v1_block(title, artist, album));
    data
}

/// DSF file whose header points at a trailing ID3 tag
pub fn dsf_bytes(fields: Option<&Id3Fields<'_>>) -> Vec<u8> {
    let body = b"fmt \x34\x00\x00\x00\x00\x00\x00\x00data-chunk-placeholder";
    let tag = fields.map(id3_tag).unwrap_or_default();
    let tag_offset = 28 + body.len();
    let total = tag_offset + tag.len();

    let mut data = b"DSD ".to_vec();
    data.extend_from_slice(&28u64.to_le_bytes());
    data.extend_from_slice(&(total as u64).to_le_bytes());
    let pointer = if tag.is_empty() { 0 } else { tag_offset as u64 };
    data.extend_from_slice(&pointer.to_le_bytes());
    data.extend_from_slice(body);
    data.extend_from_slice(&tag);
    data
}

/// FLAC stream holding STREAMINFO and one Vorbis comment block
pub fn flac_bytes(comments: &[&str]) -> Vec<u8> {
    flac_stream(comments, None)
}

/// FLAC stream with a front cover PICTURE block after the comments
pub fn flac_with_picture(comments: &[&str], picture: &[u8]) -> Vec<u8> {
    flac_stream(comments, Some(picture))
}

fn flac_stream(comments: &[&str], picture: Option<&[u8]>) -> Vec<u8> {
    let mut data = b"fLaC".to_vec();

    // STREAMINFO: 44.1 kHz, stereo, 16 bit, unknown length
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x22]);
    data.extend_from_slice(&[0x10, 0x00, 0x10, 0x00]);
    data.extend_from_slice(&[0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(&[0x0A, 0xC4, 0x42, 0xF0, 0x00, 0x00, 0x00, 0x00]);
    data.extend_from_slice(&[0u8; 16]);

    let vendor = b"track-metadata tests";
    let mut block = Vec::new();
    block.extend_from_slice(&(vendor.len() as u32).to_le_bytes());
    block.extend_from_slice(vendor);
    block.extend_from_slice(&(comments.len() as u32).to_le_bytes());
    for comment in comments {
        block.extend_from_slice(&(comment.len() as u32).to_le_bytes());
        block.extend_from_slice(comment.as_bytes());
    }

    // VORBIS_COMMENT, flagged last unless a picture follows
    data.push(if picture.is_some() { 0x04 } else { 0x84 });
    data.extend_from_slice(&(block.len() as u32).to_be_bytes()[1..]);
    data.extend_from_slice(&block);

    if let Some(picture) = picture {
        let mime = b"image/jpeg";
        let mut block = Vec::new();
        block.extend_from_slice(&3u32.to_be_bytes());
        block.extend_from_slice(&(mime.len() as u32).to_be_bytes());
        block.extend_from_slice(mime);
        block.extend_from_slice(&0u32.to_be_bytes());
        // Width, height, depth, palette size
        block.extend_from_slice(&[0u8; 16]);
        block.extend_from_slice(&(picture.len() as u32).to_be_bytes());
        block.extend_from_slice(picture);

        // Last-metadata-block flag | PICTURE
        data.push(0x86);
        data.extend_from_slice(&(block.len() as u32).to_be_bytes()[1..]);
        data.extend_from_slice(&block);
    }
    data
}

fn atom(name: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = ((body.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(name);
    out.extend_from_slice(body);
    out
}

/// `data` atom with the given well-known type code
fn data_atom(type_code: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = type_code.to_be_bytes().to_vec();
    body.extend_from_slice(&[0u8; 4]);
    body.extend_from_slice(payload);
    atom(b"data", &body)
}

/// M4A file with an `ilst` holding the given text items and optional JPEG cover
pub fn m4a_bytes(items: &[(&[u8; 4], &str)], cover: Option<&[u8]>) -> Vec<u8> {
    let mut ilst = Vec::new();
    for (name, value) in items {
        ilst.extend(atom(name, &data_atom(1, value.as_bytes())));
    }
    if let Some(cover) = cover {
        ilst.extend(atom(b"covr", &data_atom(13, cover)));
    }

    // Full `meta` atom: version and flags precede the children
    let mut meta = vec![0u8; 4];
    meta.extend(atom(b"ilst", &ilst));

    let mut data = atom(b"ftyp", b"M4A \x00\x00\x00\x00M4A isom");
    data.extend(atom(b"moov", &atom(b"udta", &atom(b"meta", &meta))));
    data
}

/// A small, valid JPEG
pub fn jpeg_bytes() -> Vec<u8> {
    let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, image::Rgb([200, 40, 40])));
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("Failed to encode JPEG");
    buf
}

/// Latin-1 reading of `bytes`, as a careless tag writer would store them
pub fn as_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

pub fn write_file(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("Failed to write fixture");
    path
}
