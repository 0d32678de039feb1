//! # Scour
//!
//! A minimal full-text search engine.
//!
//! ## Features
//!
//! - Append-only document segments addressed by `segment:offset` locators
//! - Inverted index sharded into a directory tree by token characters
//! - TF-IDF ranking
//! - Pluggable tokenizers and normalizers
//! - Async I/O on tokio

pub mod analysis;
pub mod cli;
pub mod document;
pub mod engine;
pub mod error;
pub mod storage;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
