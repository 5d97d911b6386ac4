//! Microblog Core Library
//!
//! This crate provides the storage engine for microblog, a minimal
//! publishing log: short text posts are appended to a flat file and served
//! back in pages, newest or oldest first, optionally filtered by hashtag.
//!
//! # Architecture
//!
//! - **Entries file**: source of truth, one delimited record per post
//! - **Post sequence**: in-memory index rebuilt from the file on open
//!
//! All queries are served from the in-memory sequence.
//!
//! # Quick Start
//!
//! ```text
//! let store = Store::open("entries.txt")?;
//!
//! // Publish
//! let post = store.append("hello #world")?;
//!
//! // Page through
//! let latest = store.query(&Query::latest());
//! let older = store.query(&Query::older(latest.last().unwrap().index));
//! let tagged = store.query(&Query::latest().with_tag("world"));
//! ```
//!
//! # Modules
//!
//! - `store`: the record store (main entry point)
//! - `query`: cursor-based page queries
//! - `models`: `Post` and its page projection
//! - `markup`: HTML rendering of post text
//! - `storage`: record codec and append-only file
//! - `config`: application configuration

pub mod config;
pub mod markup;
pub mod models;
pub mod query;
pub mod storage;
pub mod store;

pub use config::{BlogConfig, Config};
pub use models::{PageEntry, Post};
pub use query::{Cursor, Query, DEFAULT_PAGE_SIZE};
pub use storage::{CodecError, StoreError, StoreResult};
pub use store::Store;
