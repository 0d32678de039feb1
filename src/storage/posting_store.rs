//! Directory-sharded inverted index.
//!
//! Each token owns one postings file. The file's location is derived from the
//! token itself: its characters are split into fixed-size chunks, each chunk
//! becomes a nested directory, and the file inside is named
//! [`POSTINGS_FILE`]. With the default chunk size of 2, the postings of
//! `testtoken` live in `te/st/to/ke/n/data`.
//!
//! Characters that cannot appear in a path component are percent-encoded
//! within their chunk (`%`, `/`, `\`, NUL), as are chunks made only of dots,
//! so every non-empty token gets its own postings file: `tcp/ip` lives in
//! `tc/p%2F/ip/data` and `..` in `%2E%2E/data`.
//!
//! A postings file is a comma-terminated list of `documentId||||tf` records.
//! Files only ever grow; indexing the same document twice appends a second
//! record for it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use futures::future::try_join_all;
use log::{debug, warn};

use crate::error::{Result, ScourError};
use crate::storage::document_id::DocumentId;
use crate::storage::fs;

/// Separator between the document id and the term frequency of a record.
pub const POSTING_SEPARATOR: &str = "||||";

/// Terminator of each record in a postings file.
pub const RECORD_TERMINATOR: char = ',';

/// Leaf file name holding a token's postings.
pub const POSTINGS_FILE: &str = "data";

/// Default number of characters per shard directory.
pub const DEFAULT_SHARD_CHUNK_SIZE: usize = 2;

/// Largest accepted shard chunk size.
///
/// A chunk must stay shorter than [`POSTINGS_FILE`] so that no directory
/// chunk can share a path with another token's postings file.
pub const MAX_SHARD_CHUNK_SIZE: usize = POSTINGS_FILE.len() - 1;

/// One entry of a token's postings list.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    /// The document containing the token.
    pub document: DocumentId,
    /// Occurrences of the token divided by the document's token count.
    pub tf: f64,
    /// The token this posting was looked up under.
    pub token: String,
}

/// Split `token` into the chunks that form its shard path.
///
/// Chunks are cut from the token's characters, then encoded so each one is a
/// plain path component. Returns `None` only for the empty token.
pub fn shard_chunks(token: &str, chunk_size: usize) -> Option<Vec<String>> {
    if token.is_empty() || chunk_size == 0 {
        return None;
    }

    let chars: Vec<char> = token.chars().collect();
    Some(chars.chunks(chunk_size).map(encode_chunk).collect())
}

fn encode_chunk(chunk: &[char]) -> String {
    if chunk.iter().all(|&c| c == '.') {
        return "%2E".repeat(chunk.len());
    }

    let mut encoded = String::with_capacity(chunk.len());
    for &c in chunk {
        match c {
            '%' => encoded.push_str("%25"),
            '/' => encoded.push_str("%2F"),
            '\\' => encoded.push_str("%5C"),
            '\0' => encoded.push_str("%00"),
            _ => encoded.push(c),
        }
    }
    encoded
}

/// The `/`-joined shard path of `token`, without the leaf file name.
///
/// ```
/// use scour::storage::posting_store::shard_key;
///
/// assert_eq!(shard_key("testtoken", 2).as_deref(), Some("te/st/to/ke/n"));
/// assert_eq!(shard_key("testtoken", 3).as_deref(), Some("tes/tto/ken"));
/// ```
pub fn shard_key(token: &str, chunk_size: usize) -> Option<String> {
    shard_chunks(token, chunk_size).map(|chunks| chunks.join("/"))
}

/// Term frequency of every distinct token, in first-occurrence order.
pub fn term_frequencies(tokens: &[String]) -> Vec<(&str, f64)> {
    let mut order: Vec<&str> = Vec::new();
    let mut counts: HashMap<&str, usize> = HashMap::new();

    for token in tokens {
        let count = counts.entry(token.as_str()).or_insert(0);
        if *count == 0 {
            order.push(token.as_str());
        }
        *count += 1;
    }

    let total = tokens.len() as f64;
    order
        .into_iter()
        .map(|token| (token, counts[token] as f64 / total))
        .collect()
}

/// Token-sharded postings storage.
#[derive(Debug, Clone)]
pub struct PostingStore {
    directory: PathBuf,
    shard_chunk_size: usize,
}

impl PostingStore {
    /// Open the store in `directory`, creating the directory if needed.
    pub async fn open<P: AsRef<Path>>(directory: P, shard_chunk_size: usize) -> Result<Self> {
        if !(1..=MAX_SHARD_CHUNK_SIZE).contains(&shard_chunk_size) {
            return Err(ScourError::invalid_config(format!(
                "shard chunk size must be between 1 and {MAX_SHARD_CHUNK_SIZE}, got {shard_chunk_size}"
            )));
        }

        let directory = directory.as_ref().to_path_buf();
        fs::ensure_dir(&directory).await?;

        Ok(PostingStore {
            directory,
            shard_chunk_size,
        })
    }

    /// Directory holding the shard tree.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Characters per shard directory.
    pub fn shard_chunk_size(&self) -> usize {
        self.shard_chunk_size
    }

    /// Location of `token`'s postings file; `None` for the empty token.
    pub fn postings_path(&self, token: &str) -> Option<PathBuf> {
        let chunks = shard_chunks(token, self.shard_chunk_size)?;
        let mut path = self.directory.clone();
        path.extend(chunks);
        path.push(POSTINGS_FILE);
        Some(path)
    }

    /// Record a posting for every distinct token of one document.
    ///
    /// The per-token appends are independent: if one fails the error is
    /// returned, but postings already written for other tokens stay.
    pub async fn add(&self, tokens: &[String], document: &DocumentId) -> Result<()> {
        let appends = term_frequencies(tokens)
            .into_iter()
            .filter_map(|(token, tf)| match self.postings_path(token) {
                Some(path) => Some((path, format!(
                    "{document}{POSTING_SEPARATOR}{tf}{RECORD_TERMINATOR}"
                ))),
                None => {
                    debug!("skipping empty token");
                    None
                }
            })
            .map(|(path, record)| async move {
                fs::append_bytes(&path, record.as_bytes()).await
            });

        try_join_all(appends).await?;
        debug!("indexed {} token(s) for {document}", tokens.len());
        Ok(())
    }

    /// Look up the postings of each token, in input order.
    ///
    /// A token without a postings file yields an empty list.
    pub async fn lookup(&self, tokens: &[String]) -> Result<Vec<Vec<Posting>>> {
        try_join_all(tokens.iter().map(|token| self.lookup_token(token))).await
    }

    async fn lookup_token(&self, token: &str) -> Result<Vec<Posting>> {
        let Some(path) = self.postings_path(token) else {
            return Ok(Vec::new());
        };
        let Some(bytes) = fs::read_optional(&path).await? else {
            return Ok(Vec::new());
        };

        let content = String::from_utf8_lossy(&bytes);
        let postings = content
            .split(RECORD_TERMINATOR)
            .filter(|record| !record.is_empty())
            .filter_map(|record| match parse_record(record, token) {
                Some(posting) => Some(posting),
                None => {
                    warn!("skipping malformed posting {record:?} in {}", path.display());
                    None
                }
            })
            .collect();

        Ok(postings)
    }
}

fn parse_record(record: &str, token: &str) -> Option<Posting> {
    let (document, tf) = record.split_once(POSTING_SEPARATOR)?;
    let document = document.parse::<DocumentId>().ok()?;
    let tf = tf.parse::<f64>().ok()?;
    Some(Posting {
        document,
        tf,
        token: token.to_string(),
    })
}
