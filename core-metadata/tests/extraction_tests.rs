//! Integration tests for tag extraction
//!
//! Fixtures are synthesised per test into a temporary directory.

mod common;

use common::{
    as_latin1, dsf_bytes, flac_bytes, flac_with_picture, id3_tag, jpeg_bytes, m4a_bytes,
    mp3_bytes, mp3_with_id3v1, write_file, Id3Fields,
};
use core_metadata::extractor::TagExtractor;
use core_metadata::MetadataError;
use encoding_rs::GBK;
use tempfile::tempdir;

#[tokio::test]
async fn test_extract_missing_file() {
    let dir = tempdir().unwrap();
    let missing_path = dir.path().join("nonexistent.mp3");

    let extractor = TagExtractor::new();
    let result = extractor.extract(&missing_path).await;

    assert!(
        matches!(result, Err(MetadataError::FileNotFound(_))),
        "Should fail for missing file"
    );
}

#[tokio::test]
async fn test_extract_unrecognised_file() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "notes.mp3", b"This is not a valid audio file");

    let result = TagExtractor::new().extract(&path).await;

    // The extension is ignored; content decides
    assert!(matches!(result, Err(MetadataError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_extract_mp3_fields() {
    let dir = tempdir().unwrap();
    let cover = jpeg_bytes();
    let path = write_file(
        dir.path(),
        "song.mp3",
        &mp3_bytes(&Id3Fields {
            title: Some("Sunny Day"),
            artist: Some("Jay"),
            album: Some("Ye Hui Mei"),
            cover: Some(cover.clone()),
            lyrics: Some("line one\nline two"),
        }),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("Sunny Day"));
    assert_eq!(bundle.artist.as_deref(), Some("Jay"));
    assert_eq!(bundle.album.as_deref(), Some("Ye Hui Mei"));
    assert_eq!(bundle.cover.as_deref(), Some(cover.as_slice()));
    assert_eq!(bundle.lyrics.as_deref(), Some("line one\nline two"));
}

#[tokio::test]
async fn test_extract_multi_valued_artist_takes_first() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "duet.mp3",
        &mp3_bytes(&Id3Fields {
            title: Some("Duet"),
            artist: Some("First Singer\0Second Singer"),
            ..Default::default()
        }),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();
    assert_eq!(bundle.artist.as_deref(), Some("First Singer"));
}

#[tokio::test]
async fn test_extract_repairs_gbk_mislabelled_as_latin1() {
    let dir = tempdir().unwrap();
    let (title, _, _) = GBK.encode("七里香");
    let (artist, _, _) = GBK.encode("周杰伦");
    let title = as_latin1(&title);
    let artist = as_latin1(&artist);

    let path = write_file(
        dir.path(),
        "legacy.mp3",
        &mp3_bytes(&Id3Fields {
            title: Some(&title),
            artist: Some(&artist),
            album: Some("Common Jasmine Orange"),
            ..Default::default()
        }),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("七里香"));
    assert_eq!(bundle.artist.as_deref(), Some("周杰伦"));
    assert_eq!(bundle.album.as_deref(), Some("Common Jasmine Orange"));
}

#[tokio::test]
async fn test_extract_blank_fields_are_absent() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "blank.mp3",
        &mp3_bytes(&Id3Fields {
            title: Some("   "),
            artist: Some("Someone"),
            ..Default::default()
        }),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();
    assert!(bundle.title.is_none());
    assert_eq!(bundle.artist.as_deref(), Some("Someone"));
    assert!(bundle.cover.is_none());
    assert!(bundle.lyrics.is_none());
}

#[tokio::test]
async fn test_extract_untagged_mpeg_stream() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "raw.mp3", &common::MPEG_FRAME);

    let bundle = TagExtractor::new().extract(&path).await.unwrap();
    assert!(bundle.is_empty());
}

#[tokio::test]
async fn test_extract_dsf_via_metadata_pointer() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "hires.dsf",
        &dsf_bytes(Some(&Id3Fields {
            title: Some("DSD Track"),
            artist: Some("Audiophile"),
            ..Default::default()
        })),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();
    assert_eq!(bundle.title.as_deref(), Some("DSD Track"));
    assert_eq!(bundle.artist.as_deref(), Some("Audiophile"));
}

#[tokio::test]
async fn test_extract_dsf_without_metadata() {
    let dir = tempdir().unwrap();
    let path = write_file(dir.path(), "bare.dsf", &dsf_bytes(None));

    let bundle = TagExtractor::new().extract(&path).await.unwrap();
    assert!(bundle.is_empty());
}

#[tokio::test]
async fn test_extract_flac_vorbis_comments() {
    let dir = tempdir().unwrap();
    let path = write_file(
        dir.path(),
        "track.flac",
        &flac_bytes(&[
            "TITLE=Lossless",
            "ARTIST=Encoder",
            "ALBUM=Reference",
            "LYRICS=[00:01.00]hello",
        ]),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("Lossless"));
    assert_eq!(bundle.artist.as_deref(), Some("Encoder"));
    assert_eq!(bundle.album.as_deref(), Some("Reference"));
    assert_eq!(bundle.lyrics.as_deref(), Some("[00:01.00]hello"));
    assert!(bundle.cover.is_none());
}

#[tokio::test]
async fn test_extract_id3v1_gbk_fields() {
    let dir = tempdir().unwrap();
    let (title, _, _) = GBK.encode("七里香");
    let (artist, _, _) = GBK.encode("周杰伦");
    let path = write_file(
        dir.path(),
        "old.mp3",
        &mp3_with_id3v1(&title, &artist, b"Common Jasmine Orange   "),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("七里香"));
    assert_eq!(bundle.artist.as_deref(), Some("周杰伦"));
    assert_eq!(bundle.album.as_deref(), Some("Common Jasmine Orange"));
    assert!(bundle.cover.is_none());
    assert!(bundle.lyrics.is_none());
}

#[tokio::test]
async fn test_id3v2_takes_precedence_over_id3v1() {
    let dir = tempdir().unwrap();
    let mut data = mp3_bytes(&Id3Fields {
        title: Some("Modern Title"),
        ..Default::default()
    });
    data.extend(common::id3v1_block(b"Legacy Title", b"Legacy Artist", b""));
    let path = write_file(dir.path(), "both.mp3", &data);

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("Modern Title"));
    assert!(bundle.artist.is_none());
}

#[tokio::test]
async fn test_extract_mpeg_after_leading_padding() {
    let dir = tempdir().unwrap();
    let mut data = vec![0u8; 256];
    data.extend(mp3_with_id3v1(b"Padded", b"Ripper", b""));
    let path = write_file(dir.path(), "padded.mp3", &data);

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("Padded"));
    assert_eq!(bundle.artist.as_deref(), Some("Ripper"));
    assert!(bundle.album.is_none());
}

#[tokio::test]
async fn test_extract_flac_first_picture() {
    let dir = tempdir().unwrap();
    let cover = jpeg_bytes();
    let path = write_file(
        dir.path(),
        "art.flac",
        &flac_with_picture(&["TITLE=With Art"], &cover),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("With Art"));
    assert_eq!(bundle.cover.as_deref(), Some(cover.as_slice()));
}

#[tokio::test]
async fn test_extract_flac_behind_id3v2_block() {
    let dir = tempdir().unwrap();
    let mut data = id3_tag(&Id3Fields {
        title: Some("Stray ID3 Title"),
        ..Default::default()
    });
    data.extend(flac_bytes(&["TITLE=Vorbis Title", "ARTIST=Vorbis Artist"]));
    let path = write_file(dir.path(), "prefixed.flac", &data);

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("Vorbis Title"));
    assert_eq!(bundle.artist.as_deref(), Some("Vorbis Artist"));
}

#[tokio::test]
async fn test_extract_m4a_atoms() {
    let dir = tempdir().unwrap();
    let cover = jpeg_bytes();
    let path = write_file(
        dir.path(),
        "track.m4a",
        &m4a_bytes(
            &[
                (b"\xa9nam", "Atom Title"),
                (b"\xa9ART", "Atom Artist"),
                (b"\xa9alb", "Atom Album"),
                (b"\xa9lyr", "[00:02.00]from the atoms"),
            ],
            Some(&cover),
        ),
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();

    assert_eq!(bundle.title.as_deref(), Some("Atom Title"));
    assert_eq!(bundle.artist.as_deref(), Some("Atom Artist"));
    assert_eq!(bundle.album.as_deref(), Some("Atom Album"));
    assert_eq!(bundle.lyrics.as_deref(), Some("[00:02.00]from the atoms"));
    assert_eq!(bundle.cover.as_deref(), Some(cover.as_slice()));
}

#[tokio::test]
async fn test_unparseable_mp4_yields_empty_bundle() {
    let dir = tempdir().unwrap();
    // An ftyp box and nothing else: no moov atom to read tags from
    let path = write_file(
        dir.path(),
        "broken.m4a",
        b"\x00\x00\x00\x14ftypM4A \x00\x00\x00\x00M4A ",
    );

    let bundle = TagExtractor::new().extract(&path).await.unwrap();
    assert!(bundle.is_empty());
}

#[tokio::test]
async fn test_extractor_creation() {
    let _extractor1 = TagExtractor::new();
    let _extractor2 = TagExtractor::default();
}
