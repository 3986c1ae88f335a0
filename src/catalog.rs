use thiserror::Error;

/// One stored question/answer pair with the keywords expected in matching queries.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    question: String,
    answer: String,
    keywords: Vec<String>,
}

impl Record {
    pub fn new(question: &str, answer: &str, keywords: &[&str]) -> Self {
        Self {
            question: question.to_string(),
            answer: answer.to_string(),
            keywords: keywords.iter().map(|k| k.to_lowercase()).collect(),
        }
    }

    pub fn question(&self) -> &str {
        &self.question
    }

    pub fn answer(&self) -> &str {
        &self.answer
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Keyword scoring divides by the keyword count, so it must be non-zero
    #[error("record {index} ({question:?}) has no keywords; every record needs at least one")]
    EmptyKeywords { index: usize, question: String },
}

/// Fixed, ordered collection of records. Immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<Record>,
}

impl Catalog {
    pub fn new(records: Vec<Record>) -> Result<Self, CatalogError> {
        if let Some((index, record)) = records
            .iter()
            .enumerate()
            .find(|(_, r)| r.keywords.is_empty())
        {
            return Err(CatalogError::EmptyKeywords {
                index,
                question: record.question.clone(),
            });
        }
        Ok(Self { records })
    }

    /// The built-in Kisan Call Centre dataset.
    pub fn kcc() -> Result<Self, CatalogError> {
        let records = vec![
            Record::new(
                "How to improve soil fertility?",
                "Use compost, green manure, and organic fertilizers regularly. Rotate crops to maintain soil health.",
                &["soil", "fertility", "compost", "manure", "fertilizer"],
            ),
            Record::new(
                "Best fertilizer for rice?",
                "Apply Urea + DAP based on soil test recommendations. Use NPK ratio of 4:2:1 for optimal growth.",
                &["fertilizer", "rice", "urea", "dap", "npk"],
            ),
            Record::new(
                "How to control pests in cotton?",
                "Use neem oil spray or recommended pesticides as per agriculture guidelines. Implement integrated pest management.",
                &["pest", "cotton", "neem", "pesticide", "control"],
            ),
            Record::new(
                "When to plant wheat?",
                "Optimal sowing time is mid-October to mid-November. Ensure soil temperature is around 20-25°C.",
                &["wheat", "plant", "sowing", "timing", "season"],
            ),
            Record::new(
                "How to increase crop yield?",
                "Use quality seeds, proper irrigation, balanced fertilization, and timely pest control. Follow recommended spacing.",
                &["yield", "crop", "production", "increase", "harvest"],
            ),
            Record::new(
                "What is drip irrigation?",
                "Drip irrigation delivers water directly to plant roots, saving water and increasing efficiency by 40-70%.",
                &["drip", "irrigation", "water", "efficient", "saving"],
            ),
            Record::new(
                "How to prevent crop diseases?",
                "Use disease-resistant varieties, crop rotation, proper spacing, and timely fungicide application when needed.",
                &["disease", "prevention", "fungicide", "resistant", "crop"],
            ),
            Record::new(
                "Best time for harvesting paddy?",
                "Harvest when 80-85% of grains turn golden yellow, typically 30-35 days after flowering.",
                &["harvest", "paddy", "rice", "timing", "maturity"],
            ),
        ];

        Self::new(records)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kcc_catalog() {
        let catalog = Catalog::kcc().unwrap();
        assert_eq!(catalog.len(), 8);
        assert_eq!(catalog.records()[0].question(), "How to improve soil fertility?");
        assert_eq!(catalog.records()[7].question(), "Best time for harvesting paddy?");
    }

    #[test]
    fn test_kcc_keywords_are_lowercase() {
        let catalog = Catalog::kcc().unwrap();
        for record in catalog.records() {
            assert!(record
                .keywords()
                .iter()
                .all(|k| *k == k.to_lowercase()));
        }
    }

    #[test]
    fn test_rejects_record_without_keywords() {
        let err = Catalog::new(vec![
            Record::new("Q1?", "A1", &["one"]),
            Record::new("Q2?", "A2", &[]),
        ])
        .unwrap_err();

        assert_eq!(
            err,
            CatalogError::EmptyKeywords {
                index: 1,
                question: "Q2?".to_string()
            }
        );
        assert!(err.to_string().contains("record 1"));
    }

    #[test]
    fn test_keywords_are_lowercased() {
        let record = Record::new("Q?", "A", &["NPK", "Urea"]);
        assert_eq!(record.keywords(), &["npk".to_string(), "urea".to_string()]);
    }

    #[test]
    fn test_empty_catalog_is_valid() {
        let catalog = Catalog::new(Vec::new()).unwrap();
        assert_eq!(catalog.len(), 0);
    }
}
