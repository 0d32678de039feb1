//! Async filesystem primitives shared by the document and posting stores.
//!
//! Every function here is a suspension point: the stores never block the
//! runtime while waiting on disk.

use std::io::{self, SeekFrom};
use std::path::Path;

use tokio::fs::{self, OpenOptions};
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::error::Result;

/// Outcome of reading a delimited record that starts at a given offset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DelimitedRead {
    /// The bytes before the first delimiter.
    Found(Vec<u8>),
    /// The offset is at or beyond the end of the file.
    PastEnd,
    /// End of file was reached without seeing the delimiter.
    Unterminated,
}

/// Create `dir` and all of its missing parents.
pub async fn ensure_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).await?;
    Ok(())
}

/// Append `bytes` to `path` in a single write, creating the file and its
/// parent directories when missing.
pub async fn append_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    // tokio completes file writes in the background; flush waits for them.
    file.flush().await?;
    Ok(())
}

/// Replace the contents of `path` with `bytes`.
pub async fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }
    fs::write(path, bytes).await?;
    Ok(())
}

/// Create an empty file, failing with `AlreadyExists` if `path` is taken.
pub async fn create_new_file(path: &Path) -> io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.flush().await
}

/// Read a whole file, mapping a missing file to `None`.
pub async fn read_optional(path: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Current size of `path` in bytes.
pub async fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path).await?.len())
}

/// Read forward from `offset` in windows of `chunk_size` bytes until
/// `delimiter` shows up in the accumulated bytes.
///
/// The chunk size only affects how many reads are issued, never the result.
pub async fn read_delimited(
    path: &Path,
    offset: u64,
    delimiter: &[u8],
    chunk_size: usize,
) -> Result<DelimitedRead> {
    let mut file = fs::File::open(path).await?;
    let size = file.metadata().await?.len();
    if offset >= size {
        return Ok(DelimitedRead::PastEnd);
    }

    file.seek(SeekFrom::Start(offset)).await?;

    let mut accumulated = Vec::new();
    let mut window = vec![0u8; chunk_size.max(1)];
    loop {
        let read = file.read(&mut window).await?;
        if read == 0 {
            return Ok(DelimitedRead::Unterminated);
        }

        // A delimiter may straddle two windows.
        let search_from = accumulated
            .len()
            .saturating_sub(delimiter.len().saturating_sub(1));
        accumulated.extend_from_slice(&window[..read]);

        if let Some(pos) = find_subsequence(&accumulated[search_from..], delimiter) {
            accumulated.truncate(search_from + pos);
            return Ok(DelimitedRead::Found(accumulated));
        }
    }
}

/// Position of the first occurrence of `needle` in `haystack`.
pub fn find_subsequence(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}
