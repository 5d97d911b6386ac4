//! Command handlers

pub mod config;
pub mod post;
pub mod status;
pub mod tag;
