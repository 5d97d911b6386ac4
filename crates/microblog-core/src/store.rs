//! Record store
//!
//! The `Store` owns the entries file and the in-memory post sequence
//! rebuilt from it. The file is the ground truth; the sequence is a
//! cache loaded once at open and extended by every successful append.
//!
//! ## Concurrency
//!
//! File handle and sequence sit behind one `RwLock`. `append` takes it
//! exclusively for the whole write-then-index step, so readers see the
//! store either before or after an append and never in between. Reads
//! share the lock with each other.
//!
//! ## Usage
//!
//! ```ignore
//! let store = Store::open("entries.txt")?;
//!
//! let post = store.append("hello #world https://example.com")?;
//! assert_eq!(post.tags, vec!["world"]);
//!
//! let page = store.query(&Query::latest());
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use chrono::Utc;
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::config::Config;
use crate::models::Post;
use crate::query::{self, Query, DEFAULT_PAGE_SIZE};
use crate::storage::codec::{self, CodecError};
use crate::storage::{RecordLog, StoreError, StoreResult};

/// Append-only post store
#[derive(Debug)]
pub struct Store {
    page_size: usize,
    inner: RwLock<Inner>,
}

#[derive(Debug)]
struct Inner {
    log: RecordLog,
    posts: Vec<Post>,
}

impl Store {
    /// Open the store backed by the entries file at `path`
    ///
    /// A missing file is an empty store. Every non-empty record is decoded
    /// in file order; the first record that fails to decode aborts the open
    /// with `MalformedRecord`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref().to_path_buf();
        let posts = load_posts(&path)?;
        let log = RecordLog::open(&path)?;

        info!("Opened store at {:?} with {} posts", path, posts.len());

        Ok(Self {
            page_size: DEFAULT_PAGE_SIZE,
            inner: RwLock::new(Inner { log, posts }),
        })
    }

    /// Open the store described by a configuration
    pub fn open_with_config(config: &Config) -> StoreResult<Self> {
        let mut store = Self::open(config.entries_path())?;
        store.page_size = config.page_size;
        Ok(store)
    }

    /// Path of the entries file
    pub fn path(&self) -> PathBuf {
        self.inner.read().log.path().to_path_buf()
    }

    /// Page size for queries that don't set a limit
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Append a new post
    ///
    /// Rejects blank text with `EmptyContent` and text containing a
    /// reserved separator with `InvalidContent`; neither touches the file
    /// or the sequence. On success the record is on disk and the returned
    /// post is the last one in the sequence.
    pub fn append(&self, text: &str) -> StoreResult<Post> {
        if text.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        if let Some(character) = codec::find_reserved(text) {
            return Err(StoreError::invalid_content(character));
        }

        let mut inner = self.inner.write();
        let index = inner.posts.len();
        let path = inner.log.path().to_path_buf();
        let malformed = |source: CodecError| StoreError::MalformedRecord {
            path: path.clone(),
            record: index,
            source,
        };

        // Stamped under the lock so timestamps never run backwards
        // relative to indices
        let record = codec::encode(Utc::now().timestamp_millis(), text).map_err(&malformed)?;

        // Decoded before writing so a record that cannot be read back
        // never reaches the file
        let post = Post::from_record(index, &record).map_err(&malformed)?;

        inner.log.append(&record)?;
        inner.posts.push(post.clone());

        info!(
            "Appended post {} ({} bytes) to {:?}",
            index,
            record.len(),
            path
        );

        Ok(post)
    }

    /// Get the post at `index`
    pub fn get(&self, index: usize) -> Option<Post> {
        self.inner.read().posts.get(index).cloned()
    }

    /// Number of posts
    pub fn len(&self) -> usize {
        self.inner.read().posts.len()
    }

    /// Whether the store has no posts
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Size of the entries file in bytes
    pub fn file_size(&self) -> u64 {
        self.inner.read().log.len()
    }

    /// Run a page query against a consistent snapshot of the sequence
    ///
    /// A query without a limit uses the store's page size.
    pub fn query(&self, query: &Query) -> Vec<Post> {
        let inner = self.inner.read();
        match query.limit {
            Some(_) => query::run(&inner.posts, query),
            None => query::run(&inner.posts, &query.clone().with_limit(self.page_size)),
        }
    }

    /// Most recent page
    pub fn latest(&self) -> Vec<Post> {
        self.query(&Query::latest())
    }

    /// Every distinct tag with the number of posts carrying it
    ///
    /// A post counts once per tag even if the tag appears in it twice.
    /// Sorted by count (highest first), then by name.
    pub fn tags_with_counts(&self) -> Vec<(String, usize)> {
        let inner = self.inner.read();
        let mut counts: HashMap<&str, usize> = HashMap::new();

        for post in &inner.posts {
            let mut seen: Vec<&str> = Vec::with_capacity(post.tags.len());
            for tag in &post.tags {
                if !seen.contains(&tag.as_str()) {
                    seen.push(tag.as_str());
                    *counts.entry(tag.as_str()).or_insert(0) += 1;
                }
            }
        }

        let mut tags: Vec<(String, usize)> = counts
            .into_iter()
            .map(|(name, count)| (name.to_string(), count))
            .collect();
        tags.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        tags
    }
}

/// Decode every non-empty record of the entries file
fn load_posts(path: &Path) -> StoreResult<Vec<Post>> {
    let Some(contents) = RecordLog::read_contents(path)? else {
        debug!("No entries file at {:?}, starting empty", path);
        return Ok(Vec::new());
    };

    RecordLog::segments(&contents)
        .enumerate()
        .map(|(index, record)| {
            Post::from_record(index, record).map_err(|source| StoreError::MalformedRecord {
                path: path.to_path_buf(),
                record: index,
                source,
            })
        })
        .collect()
}
