//! Data models for microblog
//!
//! Defines `Post`, the in-memory form of one record, and `PageEntry`, the
//! compact projection handed to incremental page loaders.

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

use crate::markup;
use crate::storage::codec::{self, CodecError};

/// Month names used by `Post::display_date`
pub const MONTHS: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// A published post
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Post {
    /// Position in append order, starting at 0
    pub index: usize,
    /// When the post was appended
    pub timestamp: DateTime<Utc>,
    /// The text as written
    pub raw_content: String,
    /// Escaped and linkified HTML
    pub rendered_content: String,
    /// Hashtags in order of appearance, duplicates included
    pub tags: Vec<String>,
}

impl Post {
    /// Build a post from decoded record fields
    pub fn new(index: usize, timestamp: DateTime<Utc>, raw_content: impl Into<String>) -> Self {
        let raw_content = raw_content.into();
        let rendered = markup::render(&raw_content);
        Self {
            index,
            timestamp,
            raw_content,
            rendered_content: rendered.html,
            tags: rendered.tags,
        }
    }

    /// Decode a record and build the post at `index`
    pub fn from_record(index: usize, record: &str) -> Result<Self, CodecError> {
        let (timestamp_ms, content) = codec::decode(record)?;
        let timestamp = DateTime::from_timestamp_millis(timestamp_ms).ok_or_else(|| {
            CodecError::InvalidTimestamp {
                value: timestamp_ms.to_string(),
            }
        })?;
        Ok(Self::new(index, timestamp, content))
    }

    /// Check whether the post carries a tag
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }

    /// Timestamp in milliseconds since the Unix epoch, as stored on disk
    pub fn timestamp_millis(&self) -> i64 {
        self.timestamp.timestamp_millis()
    }

    /// Human-readable date, e.g. `5 Mar 2017` (UTC)
    pub fn display_date(&self) -> String {
        format!(
            "{} {} {}",
            self.timestamp.day(),
            MONTHS[self.timestamp.month0() as usize],
            self.timestamp.year()
        )
    }
}

/// JSON projection of a post for page loaders
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PageEntry {
    pub index: usize,
    /// `D Mon YYYY`
    pub time: String,
    /// Rendered HTML content
    pub content: String,
}

impl From<&Post> for PageEntry {
    fn from(post: &Post) -> Self {
        Self {
            index: post.index,
            time: post.display_date(),
            content: post.rendered_content.clone(),
        }
    }
}
