//! Text encoding repair for tag values.
//!
//! Tag writers disagree about encodings. Chinese titles in particular are
//! often stored as GBK bytes but labelled Latin-1, or as UTF-8 that a reader
//! already decoded as Latin-1. This module recovers the most plausible
//! human-readable string from either raw bytes or an already-decoded string.
//!
//! The functions here are pure and never fail; the worst case is the input
//! returned unchanged (or decoded as Latin-1).

use encoding_rs::GBK;

/// Tag value as handed over by a tag reader
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawText<'a> {
    Bytes(&'a [u8]),
    Str(&'a str),
}

impl<'a> From<&'a [u8]> for RawText<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        RawText::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for RawText<'a> {
    fn from(text: &'a str) -> Self {
        RawText::Str(text)
    }
}

impl<'a> From<&'a String> for RawText<'a> {
    fn from(text: &'a String) -> Self {
        RawText::Str(text.as_str())
    }
}

/// Normalize a tag value, dispatching on its representation.
///
/// ```
/// use core_metadata::normalize::normalize;
///
/// assert_eq!(normalize("Hello"), "Hello");
/// assert_eq!(normalize(&b"Hello"[..]), "Hello");
/// ```
pub fn normalize<'a>(input: impl Into<RawText<'a>>) -> String {
    match input.into() {
        RawText::Bytes(bytes) => normalize_bytes(bytes),
        RawText::Str(text) => normalize_str(text),
    }
}

/// Decode raw bytes, trying UTF-8, then GBK, then Latin-1.
///
/// UTF-8 and GBK are decoded strictly; the first one that accepts the whole
/// input wins. Latin-1 maps every byte to a code point and always succeeds.
pub fn normalize_bytes(bytes: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    if let Some(text) = GBK.decode_without_bom_handling_and_without_replacement(bytes) {
        return text.into_owned();
    }

    decode_latin1(bytes)
}

/// Repair a string that may have been decoded with the wrong charset.
///
/// Candidates are the input itself, its Latin-1 bytes re-read as UTF-8 and
/// the same bytes re-read as GBK. The candidate with the most CJK ideographs
/// wins, fewer replacement characters breaking ties; on a full tie the
/// earlier candidate is kept, so correct text is never rewritten.
pub fn normalize_str(text: &str) -> String {
    let mut candidates = vec![text.to_string()];

    if let Some(raw) = latin1_bytes(text) {
        candidates.push(String::from_utf8_lossy(&raw).into_owned());
        let (gbk, _) = GBK.decode_without_bom_handling(&raw);
        candidates.push(gbk.into_owned());
    }

    let mut best = 0;
    let mut best_score = score(&candidates[0]);
    for (index, candidate) in candidates.iter().enumerate().skip(1) {
        let candidate_score = score(candidate);
        if candidate_score > best_score {
            best = index;
            best_score = candidate_score;
        }
    }

    candidates.swap_remove(best)
}

/// `(CJK ideographs, -replacement characters)`, compared lexicographically
fn score(text: &str) -> (usize, isize) {
    let mut cjk = 0usize;
    let mut replacements = 0isize;
    for c in text.chars() {
        match c {
            '\u{4E00}'..='\u{9FFF}' => cjk += 1,
            '\u{FFFD}' => replacements += 1,
            _ => {}
        }
    }
    (cjk, -replacements)
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// One byte per char; `None` if any char lies outside Latin-1
pub(crate) fn latin1_bytes(text: &str) -> Option<Vec<u8>> {
    text.chars().map(|c| u8::try_from(u32::from(c)).ok()).collect()
}
