use crate::constants::constants;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_min_score")]
    pub min_score: f64,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            top_k: constants::DEFAULT_TOP_K,
            min_score: constants::DEFAULT_MIN_SCORE,
        }
    }
}

fn default_top_k() -> usize {
    constants::DEFAULT_TOP_K
}

fn default_min_score() -> f64 {
    constants::DEFAULT_MIN_SCORE
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResult {
    pub question: String,
    pub answer: String,
    pub relevance: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
    pub stats: SearchStats,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SearchStats {
    pub total_time_ms: u64,
    pub num_candidates: usize,
    pub num_results: usize,
}

/// How each signal contributed to one record's relevance.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScoreBreakdown {
    pub question: String,
    pub question_score: f64,
    /// Already multiplied by the answer weight
    pub answer_score: f64,
    /// Already multiplied by the keyword weight
    pub keyword_score: f64,
    pub matched_keywords: Vec<String>,
    pub relevance: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_defaults() {
        let request: SearchRequest = serde_json::from_str(r#"{"query": "rice"}"#).unwrap();
        assert_eq!(request, SearchRequest::new("rice"));
        assert_eq!(request.top_k, 3);
        assert_eq!(request.min_score, 0.2);
    }

    #[test]
    fn test_request_overrides() {
        let request: SearchRequest =
            serde_json::from_str(r#"{"query": "rice", "top_k": 8, "min_score": 0.0}"#).unwrap();
        assert_eq!(request.top_k, 8);
        assert_eq!(request.min_score, 0.0);
    }

    #[test]
    fn test_response_field_names() {
        let response = SearchResponse {
            results: vec![SearchResult {
                question: "Best fertilizer for rice?".to_string(),
                answer: "Apply Urea + DAP".to_string(),
                relevance: 0.5,
            }],
            stats: SearchStats {
                total_time_ms: 0,
                num_candidates: 8,
                num_results: 1,
            },
        };
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["results"][0]["relevance"], 0.5);
        assert_eq!(value["stats"]["num_candidates"], 8);
    }
}
