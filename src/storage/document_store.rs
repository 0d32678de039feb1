//! Append-only document store.
//!
//! Documents are concatenated into segment files, each record terminated by
//! [`DOC_DELIMITER`]. A document is addressed by the segment it landed in and
//! the byte offset where it starts (see [`DocumentId`]), so retrieval is a
//! single forward read from that offset.
//!
//! Next to every segment sits a `<segment>.count` sidecar holding the decimal
//! number of documents in it. The sidecar is rewritten after each append and
//! is not atomic with it: a failure in between leaves the document readable
//! but uncounted.
//!
//! No escaping is done, so a stored record must read back as exactly its
//! payload: [`DocumentStore::store_document`] rejects a payload that contains
//! the delimiter or ends with a `|` (either would end the record early) with
//! [`ScourError::InvalidPayload`].

use std::path::{Path, PathBuf};

use futures::future::join_all;
use log::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, ScourError};
use crate::storage::allocator::{SegmentAllocator, SegmentLease};
use crate::storage::document_id::DocumentId;
use crate::storage::fs::{self, DelimitedRead};

/// Terminator appended after every stored document.
pub const DOC_DELIMITER: &[u8] = b"||||";

/// Suffix of the per-segment document count sidecar.
pub const COUNT_SUFFIX: &str = ".count";

/// Default prefix of segment file names.
pub const DEFAULT_SEGMENT_PREFIX: &str = "data";

/// Default window size for forward reads.
pub const DEFAULT_READ_CHUNK_SIZE: usize = 4096;

/// Options for opening a [`DocumentStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentStoreOptions {
    /// Segment files are named `<prefix>-<5 hex chars>`.
    pub segment_prefix: String,

    /// Window size for reads in [`DocumentStore::get_document`].
    pub read_chunk_size: usize,
}

impl Default for DocumentStoreOptions {
    fn default() -> Self {
        DocumentStoreOptions {
            segment_prefix: DEFAULT_SEGMENT_PREFIX.to_string(),
            read_chunk_size: DEFAULT_READ_CHUNK_SIZE,
        }
    }
}

/// Segment-addressed, append-only document storage.
#[derive(Debug)]
pub struct DocumentStore {
    directory: PathBuf,
    options: DocumentStoreOptions,
    allocator: SegmentAllocator,
}

impl DocumentStore {
    /// Open the store in `directory`, creating the directory if needed and
    /// registering every segment already present as free.
    pub async fn open<P: AsRef<Path>>(directory: P, options: DocumentStoreOptions) -> Result<Self> {
        let directory = directory.as_ref().to_path_buf();
        fs::ensure_dir(&directory).await?;

        let allocator = SegmentAllocator::new();
        let mut entries = tokio::fs::read_dir(&directory).await?;
        while let Some(entry) = entries.next_entry().await? {
            if !entry.file_type().await?.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                continue;
            };
            if name.starts_with(&options.segment_prefix) && !name.ends_with(COUNT_SUFFIX) {
                allocator.register(name);
            }
        }

        info!(
            "opened document store at {} with {} segment(s)",
            directory.display(),
            allocator.len()
        );

        Ok(DocumentStore {
            directory,
            options,
            allocator,
        })
    }

    /// Directory holding the segments.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    /// Names of every known segment, sorted.
    pub fn segments(&self) -> Vec<String> {
        self.allocator.segments()
    }

    /// Append `payload` to a free segment and return its locator.
    ///
    /// The segment stays locked for the whole append-and-count sequence and is
    /// released on every exit path, including errors.
    ///
    /// Fails with [`ScourError::InvalidPayload`], before any segment is
    /// touched, when the record's first delimiter would not sit right after
    /// the payload.
    pub async fn store_document(&self, payload: &[u8]) -> Result<DocumentId> {
        let mut record = Vec::with_capacity(payload.len() + DOC_DELIMITER.len());
        record.extend_from_slice(payload);
        record.extend_from_slice(DOC_DELIMITER);

        if let Some(at) = fs::find_subsequence(&record, DOC_DELIMITER)
            && at != payload.len()
        {
            return Err(ScourError::invalid_payload(format!(
                "{} byte payload would be cut at byte {at} by the record delimiter",
                payload.len()
            )));
        }

        let lease = self.claim_segment().await?;
        let segment_path = self.segment_path(lease.segment());

        let offset = fs::file_size(&segment_path).await?;
        fs::append_bytes(&segment_path, &record).await?;

        self.increment_count(lease.segment()).await?;

        let id = DocumentId::new(lease.segment(), offset);
        if lease.is_fresh() {
            debug!("stored {} bytes as {id} in new segment", payload.len());
        } else {
            debug!("stored {} bytes as {id}", payload.len());
        }
        Ok(id)
    }

    /// Read back the payload stored at `id`.
    ///
    /// Fails with [`ScourError::DocumentNotFound`] when the offset is at or
    /// past the end of the segment, and with [`ScourError::Corrupt`] when the
    /// segment ends before a delimiter is found.
    pub async fn get_document(&self, id: &DocumentId) -> Result<Vec<u8>> {
        let segment_path = self.segment_path(id.segment());
        let read = fs::read_delimited(
            &segment_path,
            id.offset(),
            DOC_DELIMITER,
            self.options.read_chunk_size,
        )
        .await?;

        match read {
            DelimitedRead::Found(payload) => Ok(payload),
            DelimitedRead::PastEnd => Err(ScourError::document_not_found(id.to_string())),
            DelimitedRead::Unterminated => Err(ScourError::corrupt(format!(
                "document {id} is not terminated by a delimiter"
            ))),
        }
    }

    /// Total number of documents across all known segments.
    ///
    /// A segment whose count sidecar is missing or unreadable counts as zero.
    pub async fn docs_count(&self) -> Result<u64> {
        let segments = self.allocator.segments();
        let counts = join_all(segments.iter().map(|segment| self.read_count(segment))).await;

        let mut total = 0;
        for (segment, count) in segments.iter().zip(counts) {
            match count {
                Ok(count) => total += count,
                Err(e) => warn!("ignoring unreadable count for segment {segment}: {e}"),
            }
        }
        Ok(total)
    }

    fn segment_path(&self, segment: &str) -> PathBuf {
        self.directory.join(segment)
    }

    fn count_path(&self, segment: &str) -> PathBuf {
        self.directory.join(format!("{segment}{COUNT_SUFFIX}"))
    }

    fn new_segment_name(&self) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}", self.options.segment_prefix, &suffix[..5])
    }

    /// Claim a free segment, or create and claim a new one.
    async fn claim_segment(&self) -> Result<SegmentLease> {
        if let Some(lease) = self.allocator.try_claim_free() {
            return Ok(lease);
        }

        loop {
            let Some(lease) = self.allocator.reserve(self.new_segment_name()) else {
                continue;
            };

            match fs::create_new_file(&self.segment_path(lease.segment())).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                    lease.discard();
                    continue;
                }
                Err(e) => {
                    lease.discard();
                    return Err(e.into());
                }
            }

            if let Err(e) = fs::write_bytes(&self.count_path(lease.segment()), b"0").await {
                lease.discard();
                return Err(e);
            }

            info!("created segment {}", lease.segment());
            return Ok(lease);
        }
    }

    /// Read a segment's count; a missing sidecar is zero.
    async fn read_count(&self, segment: &str) -> Result<u64> {
        let Some(bytes) = fs::read_optional(&self.count_path(segment)).await? else {
            return Ok(0);
        };

        let text = String::from_utf8_lossy(&bytes);
        text.trim()
            .parse::<u64>()
            .map_err(|e| ScourError::corrupt(format!("count for segment {segment}: {e}")))
    }

    async fn increment_count(&self, segment: &str) -> Result<()> {
        let current = match self.read_count(segment).await {
            Ok(count) => count,
            Err(ScourError::Corrupt(msg)) => {
                warn!("resetting {msg}");
                0
            }
            Err(e) => return Err(e),
        };

        fs::write_bytes(
            &self.count_path(segment),
            (current + 1).to_string().as_bytes(),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::allocator::SegmentState;
    use std::collections::HashSet;
    use tempfile::TempDir;

    async fn create_test_store() -> (TempDir, DocumentStore) {
        let temp_dir = TempDir::new().unwrap();
        let store = DocumentStore::open(temp_dir.path(), DocumentStoreOptions::default())
            .await
            .unwrap();
        (temp_dir, store)
    }

    /// Every delimited record across all segment files on disk.
    fn read_all_records(dir: &Path) -> HashSet<String> {
        let mut records = HashSet::new();
        for entry in std::fs::read_dir(dir).unwrap() {
            let entry = entry.unwrap();
            let name = entry.file_name().to_string_lossy().to_string();
            if name.starts_with("data") && !name.ends_with(COUNT_SUFFIX) {
                let content = std::fs::read_to_string(entry.path()).unwrap();
                records.extend(content.split("||||").map(str::to_string));
            }
        }
        records
    }

    #[tokio::test]
    async fn test_store_creates_segment_with_document() {
        let (temp_dir, store) = create_test_store().await;

        let id = store.store_document(b"test data").await.unwrap();

        assert!(id.segment().starts_with("data-"));
        assert_eq!(id.segment().len(), "data-".len() + 5);
        assert_eq!(id.offset(), 0);
        assert!(read_all_records(temp_dir.path()).contains("test data"));
    }

    #[tokio::test]
    async fn test_sequential_stores_share_a_segment() {
        let (temp_dir, store) = create_test_store().await;

        let first = store.store_document(b"test data1").await.unwrap();
        let second = store.store_document(b"test data2").await.unwrap();

        assert_eq!(first.segment(), second.segment());
        assert_eq!(second.offset(), ("test data1".len() + DOC_DELIMITER.len()) as u64);
        assert_eq!(store.segments().len(), 1);

        let records = read_all_records(temp_dir.path());
        assert!(records.contains("test data1"));
        assert!(records.contains("test data2"));

        let count_file = temp_dir
            .path()
            .join(format!("{}{COUNT_SUFFIX}", first.segment()));
        assert_eq!(std::fs::read_to_string(count_file).unwrap(), "2");
    }

    #[tokio::test]
    async fn test_round_trip() {
        let (_temp_dir, store) = create_test_store().await;

        let docs = ["test doc1", "test doc2 is longer than a window", "", "test doc3"];
        let mut ids = Vec::new();
        for doc in docs {
            ids.push(store.store_document(doc.as_bytes()).await.unwrap());
        }

        for (doc, id) in docs.iter().zip(&ids) {
            assert_eq!(store.get_document(id).await.unwrap(), doc.as_bytes());
        }
    }

    #[tokio::test]
    async fn test_round_trip_with_tiny_read_window() {
        let temp_dir = TempDir::new().unwrap();
        let options = DocumentStoreOptions {
            read_chunk_size: 3,
            ..Default::default()
        };
        let store = DocumentStore::open(temp_dir.path(), options).await.unwrap();

        let payload = "{\"title\":\"lazy dog\",\"data\":\"A quick brown fox\"}".as_bytes();
        let id = store.store_document(payload).await.unwrap();
        store.store_document(b"next").await.unwrap();

        assert_eq!(store.get_document(&id).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_docs_count() {
        let (_temp_dir, store) = create_test_store().await;
        assert_eq!(store.docs_count().await.unwrap(), 0);

        for i in 0..5 {
            store
                .store_document(format!("doc {i}").as_bytes())
                .await
                .unwrap();
        }
        assert_eq!(store.docs_count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_docs_count_ignores_missing_and_garbled_sidecars() {
        let (temp_dir, store) = create_test_store().await;

        let id = store.store_document(b"doc").await.unwrap();
        let count_path = temp_dir
            .path()
            .join(format!("{}{COUNT_SUFFIX}", id.segment()));

        std::fs::write(&count_path, "not a number").unwrap();
        assert_eq!(store.docs_count().await.unwrap(), 0);

        std::fs::remove_file(&count_path).unwrap();
        assert_eq!(store.docs_count().await.unwrap(), 0);

        // The next store restarts the count from the missing sidecar.
        store.store_document(b"doc2").await.unwrap();
        assert_eq!(store.docs_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_stores_use_distinct_segments() {
        let (_temp_dir, store) = create_test_store().await;

        let payloads: Vec<String> = (0..8).map(|i| format!("parallel doc {i}")).collect();
        let ids = futures::future::try_join_all(
            payloads.iter().map(|p| store.store_document(p.as_bytes())),
        )
        .await
        .unwrap();

        assert_eq!(store.docs_count().await.unwrap(), 8);
        for (payload, id) in payloads.iter().zip(&ids) {
            assert_eq!(store.get_document(id).await.unwrap(), payload.as_bytes());
        }

        let unique: HashSet<_> = ids.iter().collect();
        assert_eq!(unique.len(), 8);
        assert!(store.segments().len() > 1);
    }

    #[tokio::test]
    async fn test_reopen_discovers_segments() {
        let temp_dir = TempDir::new().unwrap();
        let id = {
            let store = DocumentStore::open(temp_dir.path(), DocumentStoreOptions::default())
                .await
                .unwrap();
            store.store_document(b"persisted").await.unwrap()
        };

        let store = DocumentStore::open(temp_dir.path(), DocumentStoreOptions::default())
            .await
            .unwrap();
        assert_eq!(store.segments(), vec![id.segment().to_string()]);
        assert_eq!(store.docs_count().await.unwrap(), 1);
        assert_eq!(store.get_document(&id).await.unwrap(), b"persisted");

        // Appends continue in the discovered segment.
        let next = store.store_document(b"more").await.unwrap();
        assert_eq!(next.segment(), id.segment());
    }

    #[tokio::test]
    async fn test_get_document_errors() {
        let (_temp_dir, store) = create_test_store().await;
        let id = store.store_document(b"only").await.unwrap();

        let past_end = DocumentId::new(id.segment(), 8);
        assert!(matches!(
            store.get_document(&past_end).await,
            Err(ScourError::DocumentNotFound(_))
        ));

        let missing_segment = DocumentId::new("data-zzzzz", 0);
        let err = store.get_document(&missing_segment).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_unterminated_record_is_corrupt() {
        let (temp_dir, store) = create_test_store().await;
        let id = store.store_document(b"complete").await.unwrap();

        let segment_path = temp_dir.path().join(id.segment());
        fs::append_bytes(&segment_path, b"partial").await.unwrap();

        let partial = DocumentId::new(id.segment(), 12);
        assert!(matches!(
            store.get_document(&partial).await,
            Err(ScourError::Corrupt(_))
        ));
    }

    #[tokio::test]
    async fn test_rejects_payloads_that_cannot_round_trip() {
        let (temp_dir, store) = create_test_store().await;

        for payload in [&b"x|"[..], b"a||||b", b"||||", b"ends|||"] {
            assert!(matches!(
                store.store_document(payload).await,
                Err(ScourError::InvalidPayload(_))
            ));
        }

        // Nothing was claimed or written.
        assert!(store.segments().is_empty());
        assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);

        let id = store.store_document(b"|x").await.unwrap();
        assert_eq!(store.get_document(&id).await.unwrap(), b"|x");
    }

    #[tokio::test]
    async fn test_failed_writes_release_segment() {
        let (temp_dir, store) = create_test_store().await;
        let first = store.store_document(b"first").await.unwrap();
        let segment = first.segment().to_string();
        let segment_path = temp_dir.path().join(&segment);
        let count_path = temp_dir.path().join(format!("{segment}{COUNT_SUFFIX}"));

        // The append fails: the segment path is now a directory.
        std::fs::remove_file(&segment_path).unwrap();
        std::fs::create_dir(&segment_path).unwrap();

        assert!(store.store_document(b"second").await.is_err());
        assert_eq!(store.allocator.state(&segment), Some(SegmentState::Free));

        std::fs::remove_dir(&segment_path).unwrap();
        std::fs::write(&segment_path, b"first||||").unwrap();
        let retried = store.store_document(b"second").await.unwrap();
        assert_eq!(retried.segment(), segment);

        // The count update fails after a successful append.
        std::fs::remove_file(&count_path).unwrap();
        std::fs::create_dir(&count_path).unwrap();

        assert!(store.store_document(b"third").await.is_err());
        assert_eq!(store.allocator.state(&segment), Some(SegmentState::Free));

        std::fs::remove_dir(&count_path).unwrap();
        let after = store.store_document(b"fourth").await.unwrap();
        assert_eq!(after.segment(), segment);
        assert_eq!(store.get_document(&after).await.unwrap(), b"fourth");
        assert_eq!(store.segments(), vec![segment]);
    }
}
