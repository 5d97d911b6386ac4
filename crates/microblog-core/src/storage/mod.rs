//! Storage layer
//!
//! Handles the flat entries file that is the durable ground truth for
//! all posts.
//!
//! ## Layout
//!
//! - **codec**: one record <-> (timestamp, text)
//! - **log**: the append-only file of records
//! - **error**: typed errors shared by the store

pub mod codec;
pub mod error;
pub mod log;

pub use codec::{CodecError, FIELD_SEPARATOR, RECORD_SEPARATOR};
pub use error::{StoreError, StoreResult};
pub use log::RecordLog;
