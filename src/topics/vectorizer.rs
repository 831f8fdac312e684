/// Bag-of-words vectorizers
///
/// Tokens are lowercase runs of two or more word characters. Vocabulary
/// columns are in alphabetical order.
use super::stop_words;
use super::{DocumentTermMatrix, Vectorizer};
use crate::error::{ChapterizerError, Result};
use ndarray::Array2;
use regex::Regex;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;
use tracing::debug;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("static token pattern"))
}

/// Split a document into lowercase tokens, optionally dropping stop words
pub fn tokenize(document: &str, remove_stop_words: bool) -> Vec<String> {
    let lowered = document.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| !remove_stop_words || !stop_words::is_stop_word(token))
        .map(str::to_string)
        .collect()
}

/// Raw term-count vectorizer with document-frequency pruning
#[derive(Debug, Clone)]
pub struct CountVectorizer {
    /// Remove English stop words
    pub stop_words: bool,
    /// Drop terms found in more than this fraction of documents
    pub max_df: f64,
    /// Drop terms found in fewer than this many documents
    pub min_df: usize,
    /// Keep only the most frequent terms across the corpus
    pub max_features: Option<usize>,
}

impl Default for CountVectorizer {
    fn default() -> Self {
        Self {
            stop_words: true,
            max_df: 1.0,
            min_df: 1,
            max_features: None,
        }
    }
}

impl CountVectorizer {
    pub fn new(max_df: f64, min_df: usize) -> Self {
        Self {
            max_df,
            min_df,
            ..Self::default()
        }
    }

    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features);
        self
    }

    fn count(&self, documents: &[&str]) -> Result<DocumentTermMatrix> {
        let tokenized: Vec<Vec<String>> = documents
            .iter()
            .map(|doc| tokenize(doc, self.stop_words))
            .collect();

        // term -> (document frequency, corpus frequency)
        let mut stats: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
        for tokens in &tokenized {
            let mut seen = HashSet::new();
            for token in tokens {
                let entry = stats.entry(token.as_str()).or_insert((0, 0));
                entry.1 += 1;
                if seen.insert(token.as_str()) {
                    entry.0 += 1;
                }
            }
        }

        if stats.is_empty() {
            return Err(ChapterizerError::EmptyVocabulary(
                "documents contain no terms after stop-word removal".to_string(),
            ));
        }

        let max_doc_count = self.max_df * documents.len() as f64;
        let mut kept: Vec<(&str, usize)> = stats
            .iter()
            .filter(|(_, (df, _))| *df as f64 <= max_doc_count && *df >= self.min_df)
            .map(|(term, (_, cf))| (*term, *cf))
            .collect();

        if let Some(limit) = self.max_features {
            // Stable sort keeps alphabetical order among equal counts
            kept.sort_by(|a, b| b.1.cmp(&a.1));
            kept.truncate(limit);
            kept.sort_by(|a, b| a.0.cmp(b.0));
        }

        if kept.is_empty() {
            return Err(ChapterizerError::EmptyVocabulary(format!(
                "no terms remain after pruning (max_df={}, min_df={}, {} documents)",
                self.max_df,
                self.min_df,
                documents.len()
            )));
        }

        let vocabulary: Vec<String> = kept.iter().map(|(term, _)| term.to_string()).collect();
        let columns: HashMap<&str, usize> = vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        let mut weights = Array2::<f64>::zeros((documents.len(), vocabulary.len()));
        for (row, tokens) in tokenized.iter().enumerate() {
            for token in tokens {
                if let Some(&col) = columns.get(token.as_str()) {
                    weights[[row, col]] += 1.0;
                }
            }
        }

        debug!(
            "Vectorized {} documents into {} terms",
            documents.len(),
            vocabulary.len()
        );
        Ok(DocumentTermMatrix { weights, vocabulary })
    }
}

impl Vectorizer for CountVectorizer {
    fn fit_transform(&mut self, documents: &[&str]) -> Result<DocumentTermMatrix> {
        self.count(documents)
    }
}

/// TF-IDF vectorizer: smoothed idf and L2-normalized rows
#[derive(Debug, Clone, Default)]
pub struct TfidfVectorizer {
    counter: CountVectorizer,
}

impl TfidfVectorizer {
    pub fn new(counter: CountVectorizer) -> Self {
        Self { counter }
    }

    /// Single-document keyword extractor keeping at most `max_features` terms
    pub fn keywords(max_features: usize) -> Self {
        Self::new(CountVectorizer::default().with_max_features(max_features))
    }
}

impl Vectorizer for TfidfVectorizer {
    fn fit_transform(&mut self, documents: &[&str]) -> Result<DocumentTermMatrix> {
        let DocumentTermMatrix { mut weights, vocabulary } = self.counter.count(documents)?;
        let n_docs = weights.nrows() as f64;

        for mut column in weights.columns_mut() {
            let df = column.iter().filter(|v| **v > 0.0).count() as f64;
            let idf = ((1.0 + n_docs) / (1.0 + df)).ln() + 1.0;
            column.mapv_inplace(|v| v * idf);
        }

        for mut row in weights.rows_mut() {
            let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                row.mapv_inplace(|v| v / norm);
            }
        }

        Ok(DocumentTermMatrix { weights, vocabulary })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_tokenize_lowercases_and_drops_stop_words() {
        assert_eq!(
            tokenize("The Quick brown fox, a dog's life!", true),
            vec!["quick", "brown", "fox", "dog", "life"]
        );
        assert_eq!(tokenize("I am here", false), vec!["am", "here"]);
    }

    #[test]
    fn test_count_vectorizer_sorted_vocabulary() {
        let mut vectorizer = CountVectorizer::default();
        let matrix = vectorizer.fit_transform(&["zebra apple apple", "mango zebra"]).unwrap();
        assert_eq!(matrix.vocabulary, vec!["apple", "mango", "zebra"]);
        assert_eq!(matrix.weights[[0, 0]], 2.0);
        assert_eq!(matrix.weights[[1, 1]], 1.0);
        assert_eq!(matrix.weights[[1, 0]], 0.0);
    }

    #[test]
    fn test_document_frequency_pruning() {
        let docs = ["rust code", "rust tests", "rust docs", "code tests"];
        let mut vectorizer = CountVectorizer::new(0.5, 2);
        let matrix = vectorizer.fit_transform(&docs).unwrap();
        // "rust" is in 3/4 documents (> 0.5), "docs" in only one
        assert_eq!(matrix.vocabulary, vec!["code", "tests"]);
        assert_eq!(matrix.weights.nrows(), 4);
    }

    #[test]
    fn test_empty_vocabulary_after_pruning() {
        let mut vectorizer = CountVectorizer::new(0.95, 2);
        let err = vectorizer.fit_transform(&["alpha beta", "gamma delta"]).unwrap_err();
        assert!(matches!(err, ChapterizerError::EmptyVocabulary(_)));
    }

    #[test]
    fn test_empty_vocabulary_only_stop_words() {
        let mut vectorizer = CountVectorizer::default();
        let err = vectorizer.fit_transform(&["the and of", ""]).unwrap_err();
        assert!(matches!(err, ChapterizerError::EmptyVocabulary(_)));
    }

    #[test]
    fn test_max_features_keeps_most_frequent() {
        let mut vectorizer = CountVectorizer::default().with_max_features(2);
        let matrix = vectorizer
            .fit_transform(&["piano piano piano violin violin drum cello"])
            .unwrap();
        assert_eq!(matrix.vocabulary, vec!["piano", "violin"]);
    }

    #[test]
    fn test_tfidf_rows_are_unit_length() {
        let mut vectorizer = TfidfVectorizer::default();
        let matrix = vectorizer.fit_transform(&["guitar guitar amp", "drums amp"]).unwrap();
        for row in matrix.weights.rows() {
            let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert_abs_diff_eq!(norm, 1.0, epsilon = 1e-9);
        }
        // "amp" appears in both documents so it weighs less than "guitar"
        let amp = matrix.vocabulary.iter().position(|t| t == "amp").unwrap();
        let guitar = matrix.vocabulary.iter().position(|t| t == "guitar").unwrap();
        assert!(matrix.weights[[0, guitar]] > matrix.weights[[0, amp]]);
    }
}
