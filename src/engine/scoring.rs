//! TF-IDF scoring and ranking of postings.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use crate::storage::{DocumentId, Posting};

/// A document with its aggregate relevance score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredDocument {
    pub id: DocumentId,
    pub score: f64,
}

/// `log10(total_docs / doc_freq)`.
///
/// Zero when either side is zero, so an empty corpus or an empty postings
/// list contributes nothing.
pub fn inverse_document_frequency(total_docs: u64, doc_freq: usize) -> f64 {
    if total_docs == 0 || doc_freq == 0 {
        return 0.0;
    }
    (total_docs as f64 / doc_freq as f64).log10()
}

/// Score and rank the documents referenced by per-token postings lists.
///
/// Lists are expected in query-token order, as returned by
/// [`PostingStore::lookup`](crate::storage::PostingStore::lookup). A token
/// repeated in the query is scored once. Each posting contributes
/// `idf(token) * tf`, contributions are summed per document, and documents
/// are ordered by descending score, ties broken by ascending id.
pub fn rank(postings_by_token: &[Vec<Posting>], total_docs: u64) -> Vec<ScoredDocument> {
    let mut seen_tokens: HashSet<&str> = HashSet::new();
    let mut scores: HashMap<&DocumentId, f64> = HashMap::new();

    for postings in postings_by_token {
        let Some(first) = postings.first() else {
            continue;
        };
        if !seen_tokens.insert(first.token.as_str()) {
            continue;
        }

        let idf = inverse_document_frequency(total_docs, postings.len());
        for posting in postings {
            *scores.entry(&posting.document).or_insert(0.0) += idf * posting.tf;
        }
    }

    let mut ranked: Vec<ScoredDocument> = scores
        .into_iter()
        .map(|(id, score)| ScoredDocument {
            id: id.clone(),
            score,
        })
        .collect();
    ranked.sort_by(compare_scored);
    ranked
}

fn compare_scored(a: &ScoredDocument, b: &ScoredDocument) -> Ordering {
    b.score.total_cmp(&a.score).then_with(|| a.id.cmp(&b.id))
}
