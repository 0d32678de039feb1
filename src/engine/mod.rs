//! Search orchestration.
//!
//! [`Indexer`] ties the analysis pipeline to the two stores: ingest analyzes a
//! document, stores its payload and records postings for its tokens; search
//! analyzes the query, scores the postings with TF-IDF and hydrates the
//! ranked documents.
//!
//! # Examples
//!
//! ```no_run
//! use scour::document::Document;
//! use scour::engine::Indexer;
//! use scour::engine::config::IndexerConfig;
//!
//! # async fn run() -> scour::error::Result<()> {
//! let indexer = Indexer::open(IndexerConfig::new("/tmp/scour")).await?;
//! indexer.index(&Document::new("quick fox", "A fox is usually quick and brown.")).await?;
//!
//! for doc in indexer.search("fox").await? {
//!     println!("{}", doc.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod scoring;

use std::sync::Arc;

use futures::future::try_join_all;
use log::debug;

use crate::analysis::{Analyzer, Normalizer, Tokenizer};
use crate::document::Document;
use crate::error::Result;
use crate::storage::{DocumentId, DocumentStore, PostingStore};

pub use config::IndexerConfig;
pub use scoring::ScoredDocument;

/// Indexes documents and answers keyword queries over them.
#[derive(Debug)]
pub struct Indexer {
    config: IndexerConfig,
    analyzer: Analyzer,
    documents: DocumentStore,
    postings: PostingStore,
}

impl Indexer {
    /// Open (creating if needed) the stores under `config.data_dir`.
    pub async fn open(config: IndexerConfig) -> Result<Self> {
        config.validate()?;

        let documents =
            DocumentStore::open(config.documents_dir(), config.document_store_options()).await?;
        let postings = PostingStore::open(config.index_dir(), config.shard_chunk_size).await?;

        Ok(Indexer {
            config,
            analyzer: Analyzer::default(),
            documents,
            postings,
        })
    }

    /// Replace the tokenizer used at index and query time.
    pub fn with_tokenizer(mut self, tokenizer: Arc<dyn Tokenizer>) -> Self {
        self.analyzer = self.analyzer.with_tokenizer(tokenizer);
        self
    }

    /// Replace the normalizer used at index and query time.
    pub fn with_normalizer(mut self, normalizer: Arc<dyn Normalizer>) -> Self {
        self.analyzer = self.analyzer.with_normalizer(normalizer);
        self
    }

    /// Settings this indexer was opened with.
    pub fn config(&self) -> &IndexerConfig {
        &self.config
    }

    /// Analyzer applied to documents and queries.
    pub fn analyzer(&self) -> &Analyzer {
        &self.analyzer
    }

    /// Store holding the document payloads.
    pub fn document_store(&self) -> &DocumentStore {
        &self.documents
    }

    /// Store holding the token postings.
    pub fn posting_store(&self) -> &PostingStore {
        &self.postings
    }

    /// Store `doc` and record postings for its searchable text.
    ///
    /// Postings already appended are not rolled back if a later append fails.
    pub async fn index(&self, doc: &Document) -> Result<DocumentId> {
        let tokens = self.analyzer.analyze(&doc.searchable_text())?;
        let payload = doc.to_payload()?;

        let id = self.documents.store_document(&payload).await?;
        self.postings.add(&tokens, &id).await?;

        debug!("Indexed document {id} with {} tokens", tokens.len());
        Ok(id)
    }

    /// Documents matching `query`, most relevant first.
    pub async fn search(&self, query: &str) -> Result<Vec<Document>> {
        let ranked = self.rank(query).await?;
        self.hydrate(&ranked).await
    }

    /// Like [`search`](Self::search), keeping only the `limit` best documents.
    pub async fn search_with_limit(&self, query: &str, limit: usize) -> Result<Vec<Document>> {
        let mut ranked = self.rank(query).await?;
        ranked.truncate(limit);
        self.hydrate(&ranked).await
    }

    /// Score every document matching `query`.
    pub async fn rank(&self, query: &str) -> Result<Vec<ScoredDocument>> {
        let tokens = self.analyzer.analyze(query)?;
        let postings = self.postings.lookup(&tokens).await?;

        if postings.iter().all(Vec::is_empty) {
            debug!("No postings for query {query:?}");
            return Ok(Vec::new());
        }

        let total_docs = self.documents.docs_count().await?;
        let ranked = scoring::rank(&postings, total_docs);

        debug!(
            "Query {query:?} matched {} documents out of {total_docs}",
            ranked.len()
        );
        Ok(ranked)
    }

    /// Total number of stored documents.
    pub async fn docs_count(&self) -> Result<u64> {
        self.documents.docs_count().await
    }

    async fn hydrate(&self, ranked: &[ScoredDocument]) -> Result<Vec<Document>> {
        try_join_all(ranked.iter().map(|scored| async move {
            let payload = self.documents.get_document(&scored.id).await?;
            Document::from_payload(&payload)
        }))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{LowercaseNormalizer, UnicodeWordTokenizer};
    use crate::error::ScourError;
    use tempfile::TempDir;

    fn quick_fox() -> Document {
        Document::new("quick fox", "A fox is usually quick and brown.").with_field("id", "1")
    }

    fn lazy_dog() -> Document {
        Document::new(
            "lazy dog",
            "A quick brown fox jumped over lazy dog. A fox is always jumping.",
        )
        .with_field("id", "2")
    }

    async fn corpus(temp_dir: &TempDir) -> Indexer {
        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap();
        indexer.index(&quick_fox()).await.unwrap();
        indexer.index(&lazy_dog()).await.unwrap();
        indexer
    }

    #[tokio::test]
    async fn test_search_single_match() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = corpus(&temp_dir).await;

        let results = indexer.search("dog").await.unwrap();
        assert_eq!(results, vec![lazy_dog()]);
    }

    #[tokio::test]
    async fn test_search_ranks_by_accumulated_score() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = corpus(&temp_dir).await;

        let results = indexer.search("quick dog").await.unwrap();
        assert_eq!(results, vec![lazy_dog(), quick_fox()]);
    }

    #[tokio::test]
    async fn test_search_shared_terms_returns_both() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = corpus(&temp_dir).await;

        let results = indexer.search("quick fox").await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.contains(&quick_fox()));
        assert!(results.contains(&lazy_dog()));
    }

    #[tokio::test]
    async fn test_search_no_match() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = corpus(&temp_dir).await;

        assert!(indexer.search("elephant").await.unwrap().is_empty());
        assert!(indexer.search("").await.unwrap().is_empty());
        assert!(indexer.search("!!! ???").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_on_empty_index() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap();

        assert!(indexer.search("fox").await.unwrap().is_empty());
        assert_eq!(indexer.docs_count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_with_limit() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = corpus(&temp_dir).await;

        let results = indexer.search_with_limit("quick dog", 1).await.unwrap();
        assert_eq!(results, vec![lazy_dog()]);

        let results = indexer.search_with_limit("quick dog", 0).await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_rank_scores() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = corpus(&temp_dir).await;

        let ranked = indexer.rank("dog").await.unwrap();
        assert_eq!(ranked.len(), 1);

        // "dog" appears twice among the 15 tokens of the second document.
        let expected = 2.0f64.log10() * (2.0 / 15.0);
        assert!((ranked[0].score - expected).abs() < 1e-12);
    }

    #[tokio::test]
    async fn test_index_returns_retrievable_id() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap();

        let id = indexer.index(&quick_fox()).await.unwrap();
        let payload = indexer.document_store().get_document(&id).await.unwrap();
        assert_eq!(Document::from_payload(&payload).unwrap(), quick_fox());
        assert_eq!(indexer.docs_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_reopen_keeps_index() {
        let temp_dir = TempDir::new().unwrap();
        drop(corpus(&temp_dir).await);

        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap();
        assert_eq!(indexer.docs_count().await.unwrap(), 2);
        assert_eq!(indexer.search("dog").await.unwrap(), vec![lazy_dog()]);
    }

    #[tokio::test]
    async fn test_custom_capabilities() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap()
            .with_tokenizer(Arc::new(UnicodeWordTokenizer::new()))
            .with_normalizer(Arc::new(LowercaseNormalizer::new()));

        let doc = Document::new("Rust 2024", "Edition 2024 ships async closures.");
        indexer.index(&doc).await.unwrap();
        indexer
            .index(&Document::new("Other", "Nothing relevant here."))
            .await
            .unwrap();

        assert_eq!(indexer.search("2024").await.unwrap(), vec![doc]);
        assert_eq!(
            indexer.analyzer().tokenizer().name(),
            UnicodeWordTokenizer::new().name()
        );
        assert_eq!(
            indexer.analyzer().normalizer().name(),
            LowercaseNormalizer::new().name()
        );
    }

    #[tokio::test]
    async fn test_path_like_tokens_are_searchable() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap()
            .with_normalizer(Arc::new(LowercaseNormalizer::new()));

        let doc = Document::new("tcp/ip", "stack ...");
        let id = indexer.index(&doc).await.unwrap();
        indexer
            .index(&Document::new("udp", "datagrams"))
            .await
            .unwrap();

        assert_eq!(indexer.search("TCP/IP").await.unwrap(), vec![doc.clone()]);
        assert_eq!(indexer.search("...").await.unwrap(), vec![doc]);

        let postings = indexer
            .posting_store()
            .lookup(&["tcp/ip".to_string()])
            .await
            .unwrap();
        assert_eq!(postings[0][0].document, id);
        assert!(indexer.config().index_dir().join("tc/p%2F/ip").is_dir());
    }

    #[tokio::test]
    async fn test_delimiter_in_document_text() {
        let temp_dir = TempDir::new().unwrap();
        let indexer = Indexer::open(IndexerConfig::new(temp_dir.path()))
            .await
            .unwrap();

        let piped = Document::new("fox", "a||||b").with_field("note", "ends with |");
        let plain = Document::new("fox den", "ok");
        indexer.index(&piped).await.unwrap();
        indexer.index(&plain).await.unwrap();

        let results = indexer.search("fox").await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results.contains(&piped));
        assert!(results.contains(&plain));
    }

    #[tokio::test]
    async fn test_invalid_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let config = IndexerConfig::new(temp_dir.path()).with_shard_chunk_size(0);

        assert!(matches!(
            Indexer::open(config).await,
            Err(ScourError::InvalidConfig(_))
        ));
    }
}
