/// Topic inference over caption segments
///
/// Vectorization and factorization sit behind the [`Vectorizer`] and
/// [`TopicModel`] traits so the segmentation logic does not depend on a
/// particular numerical implementation.

pub mod nmf;
pub mod stop_words;
pub mod vectorizer;

pub use nmf::NmfModel;
pub use vectorizer::{tokenize, CountVectorizer, TfidfVectorizer};

use crate::config::TopicConfig;
use crate::error::{ChapterizerError, Result};
use crate::transcript::SegmentTable;
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Document-term weights with their column labels
#[derive(Debug, Clone)]
pub struct DocumentTermMatrix {
    /// One row per document, one column per vocabulary term
    pub weights: Array2<f64>,
    /// Column terms in alphabetical order
    pub vocabulary: Vec<String>,
}

/// Turns a corpus into a document-term matrix
pub trait Vectorizer {
    /// Learn a vocabulary from `documents` and return their weights.
    /// Fails with `EmptyVocabulary` when filtering leaves no terms.
    fn fit_transform(&mut self, documents: &[&str]) -> Result<DocumentTermMatrix>;
}

/// Decomposes a document-term matrix into latent topics
pub trait TopicModel {
    /// Fit the model and return per-document topic weights
    /// (rows = documents, columns = topics)
    fn fit_transform(&mut self, matrix: &Array2<f64>) -> Result<Array2<f64>>;

    /// Per-topic term weights (rows = topics, columns = terms) once fitted
    fn components(&self) -> Option<&Array2<f64>>;
}

/// Handling for segments the topic model returned no weight row for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnassignedPolicy {
    /// Inherit the last assigned topic (topic 0 when none was assigned)
    #[default]
    Propagate,
    /// Leave trailing segments out of the assignment sequence
    Drop,
    /// Abort with `TopicRowMismatch`
    Error,
}

/// Dominant topic of one segment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicAssignment {
    pub segment_index: usize,
    pub topic_id: usize,
}

/// Highest-weighted terms of one topic
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopicSummary {
    pub topic_id: usize,
    pub top_words: Vec<String>,
}

impl TopicSummary {
    pub fn label(&self) -> String {
        self.top_words.join(" ")
    }
}

/// Output of topic inference
#[derive(Debug, Clone)]
pub struct TopicInference {
    /// Assignments in segment order; may be shorter than the table under `Drop`
    pub assignments: Vec<TopicAssignment>,
    pub topics: Vec<TopicSummary>,
}

/// Assigns a dominant topic to every segment of a transcript
pub struct TopicInferencer {
    vectorizer: Box<dyn Vectorizer>,
    model: Box<dyn TopicModel>,
    policy: UnassignedPolicy,
    n_top_words: usize,
}

impl TopicInferencer {
    pub fn new(
        vectorizer: Box<dyn Vectorizer>,
        model: Box<dyn TopicModel>,
        policy: UnassignedPolicy,
        n_top_words: usize,
    ) -> Self {
        Self {
            vectorizer,
            model,
            policy,
            n_top_words,
        }
    }

    /// Count vectorizer plus seeded NMF, configured from `config`
    pub fn from_config(config: &TopicConfig) -> Self {
        let vectorizer = CountVectorizer::new(config.max_df, config.min_df);
        let model = NmfModel::new(config.n_topics, config.seed).with_iterations(config.max_iter, config.tolerance);
        Self::new(
            Box::new(vectorizer),
            Box::new(model),
            config.unassigned_policy,
            config.n_top_words,
        )
    }

    pub fn infer(&mut self, table: &SegmentTable) -> Result<TopicInference> {
        let texts = table.texts();
        let matrix = self.vectorizer.fit_transform(&texts)?;
        info!(
            "🧮 Vectorized {} segments over {} terms",
            texts.len(),
            matrix.vocabulary.len()
        );

        let weights = self.model.fit_transform(&matrix.weights)?;
        let assignments = assign_topics(&weights, table.len(), self.policy)?;
        let topics = self.summarize_topics(&matrix.vocabulary);

        debug!("Assigned topics to {} of {} segments", assignments.len(), table.len());
        Ok(TopicInference { assignments, topics })
    }

    fn summarize_topics(&self, vocabulary: &[String]) -> Vec<TopicSummary> {
        let Some(components) = self.model.components() else {
            return Vec::new();
        };

        components
            .rows()
            .into_iter()
            .enumerate()
            .map(|(topic_id, row)| {
                let mut ranked: Vec<(usize, f64)> = row.iter().copied().enumerate().collect();
                ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
                TopicSummary {
                    topic_id,
                    top_words: ranked
                        .into_iter()
                        .take(self.n_top_words)
                        .filter_map(|(col, _)| vocabulary.get(col).cloned())
                        .collect(),
                }
            })
            .collect()
    }
}

/// Index of the largest weight; ties resolve to the lowest index
pub fn argmax(row: ArrayView1<f64>) -> usize {
    let mut best = 0;
    for (i, value) in row.iter().enumerate() {
        if *value > row[best] {
            best = i;
        }
    }
    best
}

/// Map topic-weight rows to one assignment per segment
pub fn assign_topics(
    weights: &Array2<f64>,
    segment_count: usize,
    policy: UnassignedPolicy,
) -> Result<Vec<TopicAssignment>> {
    let assigned = weights.nrows().min(segment_count);
    let mut assignments: Vec<TopicAssignment> = weights
        .rows()
        .into_iter()
        .take(assigned)
        .enumerate()
        .map(|(segment_index, row)| TopicAssignment {
            segment_index,
            topic_id: argmax(row),
        })
        .collect();

    if assigned < segment_count {
        match policy {
            UnassignedPolicy::Propagate => {
                let fill = assignments.last().map(|a| a.topic_id).unwrap_or(0);
                warn!(
                    "⚠️ {} segments had no topic row, inheriting topic {}",
                    segment_count - assigned,
                    fill
                );
                assignments.extend((assigned..segment_count).map(|segment_index| TopicAssignment {
                    segment_index,
                    topic_id: fill,
                }));
            }
            UnassignedPolicy::Drop => {
                warn!("⚠️ Dropping {} segments without a topic row", segment_count - assigned);
            }
            UnassignedPolicy::Error => {
                return Err(ChapterizerError::TopicRowMismatch {
                    rows: weights.nrows(),
                    segments: segment_count,
                });
            }
        }
    }

    Ok(assignments)
}
