//! Record codec
//!
//! A record is the on-disk form of one post:
//!
//! ```text
//! <decimal-ms-timestamp> FIELD_SEPARATOR <raw text> RECORD_SEPARATOR
//! ```
//!
//! Both separators are ASCII control characters that are reserved and may
//! never appear in post content. This module handles a single record; the
//! trailing `RECORD_SEPARATOR` is added and stripped by the record log.

use thiserror::Error;

/// Separates records in the entries file (ASCII GS)
pub const RECORD_SEPARATOR: char = '\u{1D}';

/// Separates the timestamp from the text inside a record (ASCII US)
pub const FIELD_SEPARATOR: char = '\u{1F}';

/// Errors produced while encoding or decoding a single record
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Content contains one of the reserved separator characters
    #[error("content contains reserved separator character {}", codepoint(.character))]
    ReservedCharacter { character: char },

    /// Record has no field separator, so no content field
    #[error("record has fewer than 2 fields")]
    MissingField,

    /// Record has more than one field separator
    #[error("record has more than 2 fields")]
    ExtraField,

    /// Timestamp field is not a decimal integer
    #[error("invalid timestamp field '{value}'")]
    InvalidTimestamp { value: String },

    /// Record bytes are not valid UTF-8
    #[error("record is not valid UTF-8")]
    InvalidUtf8,
}

fn codepoint(character: &char) -> String {
    format!("U+{:04X}", u32::from(*character))
}

/// Return the first reserved separator found in `content`, if any
pub fn find_reserved(content: &str) -> Option<char> {
    content
        .chars()
        .find(|c| *c == RECORD_SEPARATOR || *c == FIELD_SEPARATOR)
}

/// Encode a timestamp and raw content into record text
///
/// Fails if `content` contains either reserved separator.
pub fn encode(timestamp_ms: i64, content: &str) -> Result<String, CodecError> {
    if let Some(character) = find_reserved(content) {
        return Err(CodecError::ReservedCharacter { character });
    }

    let mut record = String::with_capacity(content.len() + 16);
    record.push_str(&timestamp_ms.to_string());
    record.push(FIELD_SEPARATOR);
    record.push_str(content);
    Ok(record)
}

/// Decode record text into its timestamp and raw content
pub fn decode(record: &str) -> Result<(i64, &str), CodecError> {
    let (timestamp, content) = record
        .split_once(FIELD_SEPARATOR)
        .ok_or(CodecError::MissingField)?;

    if content.contains(FIELD_SEPARATOR) {
        return Err(CodecError::ExtraField);
    }

    let timestamp_ms = timestamp
        .parse::<i64>()
        .map_err(|_| CodecError::InvalidTimestamp {
            value: timestamp.to_string(),
        })?;

    Ok((timestamp_ms, content))
}
