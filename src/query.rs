use crate::catalog::{Catalog, Record};
use crate::constants::constants;
use crate::matcher::ratio;
use crate::protocol::{ScoreBreakdown, SearchRequest, SearchResponse, SearchResult, SearchStats};
use log::debug;
use std::sync::Arc;
use std::time::Instant;

/// Ranks catalog records against free-text queries.
///
/// Relevance is the sum of three unnormalized signals:
/// - question similarity, a sequence-match ratio in `[0, 1]`
/// - answer similarity, the same ratio at half weight
/// - the fraction of the record's keywords found in the query, scaled to `[0, 0.3]`
///
/// The engine reads its catalog only, so `search` can be called from any
/// number of threads without locking.
#[derive(Debug, Clone)]
pub struct QueryEngine {
    catalog: Arc<Catalog>,
}

impl QueryEngine {
    pub fn new(catalog: Arc<Catalog>) -> Self {
        Self { catalog }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Return at most `top_k` results scoring at least `min_score`, best first.
    ///
    /// Never fails: an empty or unmatched query just yields an empty list.
    /// Records with equal relevance keep their catalog order.
    pub fn search(&self, query: &str, top_k: usize, min_score: f64) -> Vec<SearchResult> {
        debug!("Searching {} records for: {}", self.catalog.len(), query);

        let query = query.to_lowercase();
        let mut results: Vec<SearchResult> = self
            .catalog
            .records()
            .iter()
            .map(|record| (record, score_record(&query, record)))
            .filter(|(_, score)| score.relevance >= min_score)
            .map(|(record, score)| SearchResult {
                question: record.question().to_string(),
                answer: record.answer().to_string(),
                relevance: score.relevance,
            })
            .collect();

        // sort_by is stable, which keeps catalog order among ties
        results.sort_by(|a, b| b.relevance.total_cmp(&a.relevance));
        results.truncate(top_k);

        debug!(
            "Search complete. {} results, top score: {:.4}",
            results.len(),
            results.first().map(|r| r.relevance).unwrap_or(0.0)
        );

        results
    }

    /// Per-record signal breakdown in catalog order, without filtering or sorting.
    pub fn score(&self, query: &str) -> Vec<ScoreBreakdown> {
        let query = query.to_lowercase();
        self.catalog
            .records()
            .iter()
            .map(|record| {
                let score = score_record(&query, record);
                ScoreBreakdown {
                    question: record.question().to_string(),
                    question_score: score.question,
                    answer_score: score.answer,
                    keyword_score: score.keywords,
                    matched_keywords: score.matched_keywords,
                    relevance: score.relevance,
                }
            })
            .collect()
    }

    /// Run a search request and attach timing stats.
    pub fn execute(&self, request: &SearchRequest) -> SearchResponse {
        let start = Instant::now();
        let results = self.search(&request.query, request.top_k, request.min_score);
        let num_results = results.len();

        SearchResponse {
            results,
            stats: SearchStats {
                total_time_ms: start.elapsed().as_millis() as u64,
                num_candidates: self.catalog.len(),
                num_results,
            },
        }
    }
}

struct RecordScore {
    question: f64,
    answer: f64,
    keywords: f64,
    matched_keywords: Vec<String>,
    relevance: f64,
}

/// `query` must already be lowercased.
fn score_record(query: &str, record: &Record) -> RecordScore {
    let question = ratio(query, &record.question().to_lowercase());
    let answer = ratio(query, &record.answer().to_lowercase()) * constants::ANSWER_WEIGHT;

    let matched_keywords: Vec<String> = record
        .keywords()
        .iter()
        .filter(|keyword| query.contains(keyword.as_str()))
        .cloned()
        .collect();
    let keywords = if record.keywords().is_empty() {
        0.0
    } else {
        matched_keywords.len() as f64 / record.keywords().len() as f64 * constants::KEYWORD_WEIGHT
    };

    RecordScore {
        question,
        answer,
        keywords,
        matched_keywords,
        relevance: question + answer + keywords,
    }
}
