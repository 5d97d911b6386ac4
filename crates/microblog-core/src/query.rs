//! Cursor-based page queries
//!
//! A query walks the post sequence from a cursor in one direction and
//! collects up to `limit` posts, optionally keeping only posts with a
//! given tag. Results come back in visitation order: newest first for
//! `Latest` and `Older`, oldest first for `Newer`.
//!
//! A query without a limit takes the page size of whoever runs it.
//! An empty result means there is nothing more in that direction.

use tracing::debug;

use crate::models::Post;

/// Default number of posts per page
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Where a scan starts and which way it goes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cursor {
    /// Start at the newest post and walk toward index 0
    #[default]
    Latest,
    /// Start just below index `n` and walk toward index 0
    Older(usize),
    /// Start at index `n` and walk toward the newest post
    Newer(usize),
}

/// A page request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub cursor: Cursor,
    pub tag: Option<String>,
    /// Page size; `None` leaves it to the runner
    pub limit: Option<usize>,
}

impl Default for Query {
    fn default() -> Self {
        Self {
            cursor: Cursor::Latest,
            tag: None,
            limit: None,
        }
    }
}

impl Query {
    /// Most recent page
    pub fn latest() -> Self {
        Self::default()
    }

    /// Page of posts older than index `n`
    pub fn older(n: usize) -> Self {
        Self {
            cursor: Cursor::Older(n),
            ..Self::default()
        }
    }

    /// Page of posts from index `n` onward
    pub fn newer(n: usize) -> Self {
        Self {
            cursor: Cursor::Newer(n),
            ..Self::default()
        }
    }

    /// Build a query from raw request parameters
    ///
    /// `older` takes precedence over `newer`. A value that is not a
    /// non-negative integer is ignored and the query falls back to the
    /// latest page; it does not fall through to `newer`. An empty tag
    /// means no filter.
    pub fn from_params(older: Option<&str>, newer: Option<&str>, tag: Option<&str>) -> Self {
        let cursor = match (non_empty(older), non_empty(newer)) {
            (Some(older), _) => older.trim().parse().map(Cursor::Older).unwrap_or_default(),
            (None, Some(newer)) => newer.trim().parse().map(Cursor::Newer).unwrap_or_default(),
            (None, None) => Cursor::Latest,
        };

        Self {
            cursor,
            tag: non_empty(tag).map(str::to_string),
            limit: None,
        }
    }

    /// Only return posts carrying `tag`
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Override the page size
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Run a query against an ordered post sequence
///
/// A query without a limit returns at most `DEFAULT_PAGE_SIZE` posts.
pub fn run(posts: &[Post], query: &Query) -> Vec<Post> {
    let len = posts.len();
    let limit = query.limit.unwrap_or(DEFAULT_PAGE_SIZE);

    // Indices are visited lazily so a page stops as soon as it is full
    let indices: Box<dyn Iterator<Item = usize>> = match query.cursor {
        Cursor::Latest => Box::new((0..len).rev()),
        Cursor::Older(n) => Box::new((0..n.min(len)).rev()),
        Cursor::Newer(n) => Box::new(n.min(len)..len),
    };

    let results: Vec<Post> = indices
        .map(|i| &posts[i])
        .filter(|post| match &query.tag {
            Some(tag) => post.has_tag(tag),
            None => true,
        })
        .take(limit)
        .cloned()
        .collect();

    debug!(
        "Query {:?} tag={:?} limit={} returned {} of {} posts",
        query.cursor,
        query.tag,
        limit,
        results.len(),
        len
    );

    results
}
