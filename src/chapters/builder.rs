/// Chapter assembly from consolidated boundaries
use super::{Boundary, ChapterInfo};
use crate::config::ChapterConfig;
use crate::error::{ChapterizerError, Result};
use crate::topics::{TfidfVectorizer, TopicAssignment, Vectorizer};
use crate::transcript::SegmentTable;
use tracing::{debug, warn};

/// Start and topic of a merged chapter, before naming
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChapterSpan {
    pub start: f64,
    pub topic_id: usize,
}

/// Collapse consecutive breakpoints that share a topic
///
/// An equal-topic breakpoint is absorbed into the open chapter: the start
/// stays, the topic is (re)set to the incoming one. The last open chapter
/// is always emitted. Empty input gives empty output.
pub fn merge_breakpoints(breakpoints: &[Boundary]) -> Vec<ChapterSpan> {
    let Some((first, rest)) = breakpoints.split_first() else {
        return Vec::new();
    };

    let mut spans = Vec::new();
    let mut current = ChapterSpan {
        start: first.timestamp,
        topic_id: first.topic_id,
    };

    for breakpoint in rest {
        if breakpoint.topic_id == current.topic_id {
            current.topic_id = breakpoint.topic_id;
        } else {
            spans.push(current);
            current = ChapterSpan {
                start: breakpoint.timestamp,
                topic_id: breakpoint.topic_id,
            };
        }
    }
    spans.push(current);
    spans
}

/// Builds named chapters from a transcript and its topic boundaries
#[derive(Debug, Clone)]
pub struct ChapterBuilder {
    name_terms: usize,
}

impl ChapterBuilder {
    pub fn new(name_terms: usize) -> Self {
        Self { name_terms }
    }

    pub fn from_config(config: &ChapterConfig) -> Self {
        Self::new(config.name_terms)
    }

    /// Build the chapter list
    ///
    /// A leading chapter at timestamp 0 carrying the first segment's topic is
    /// always synthesized ahead of `consolidated`, so a transcript without
    /// boundaries yields one chapter. No assignments yields no chapters.
    pub fn build(
        &self,
        table: &SegmentTable,
        assignments: &[TopicAssignment],
        consolidated: &[Boundary],
    ) -> Vec<ChapterInfo> {
        let Some(first) = assignments.first() else {
            return Vec::new();
        };

        let mut breakpoints = Vec::with_capacity(consolidated.len() + 1);
        breakpoints.push(Boundary {
            timestamp: 0.0,
            segment_index: first.segment_index,
            topic_id: first.topic_id,
        });
        breakpoints.extend_from_slice(consolidated);

        let spans = merge_breakpoints(&breakpoints);
        debug!("Merged {} breakpoints into {} chapters", breakpoints.len(), spans.len());

        spans
            .iter()
            .enumerate()
            .map(|(i, span)| {
                let text = chapter_text(table, assignments, span);
                let keywords = self.keywords(&text).unwrap_or_else(|e| {
                    warn!("⚠️ Chapter {} has no usable keywords: {}", i + 1, e);
                    Vec::new()
                });
                ChapterInfo {
                    timestamp: span.start,
                    topic_id: span.topic_id,
                    title: chapter_name(i + 1, &keywords),
                    keywords,
                }
            })
            .collect()
    }

    /// Top TF-IDF terms of a single document, highest weight first
    pub fn keywords(&self, text: &str) -> Result<Vec<String>> {
        let mut vectorizer = TfidfVectorizer::keywords(self.name_terms);
        let matrix = vectorizer.fit_transform(&[text])?;
        let row = matrix
            .weights
            .rows()
            .into_iter()
            .next()
            .ok_or_else(|| ChapterizerError::EmptyVocabulary("no document to rank".into()))?;

        let mut ranked: Vec<(&String, f64)> = matrix.vocabulary.iter().zip(row.iter().copied()).collect();
        // Stable sort keeps alphabetical order among equal weights
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        Ok(ranked.into_iter().map(|(term, _)| term.clone()).collect())
    }
}

impl Default for ChapterBuilder {
    fn default() -> Self {
        Self::new(3)
    }
}

/// Texts of segments at or after the chapter start that share its topic
fn chapter_text(table: &SegmentTable, assignments: &[TopicAssignment], span: &ChapterSpan) -> String {
    let segments = table.segments();
    assignments
        .iter()
        .filter(|a| a.topic_id == span.topic_id)
        .filter_map(|a| segments.get(a.segment_index))
        .filter(|segment| segment.start >= span.start)
        .map(|segment| segment.text.as_str())
        .collect::<Vec<_>>()
        .join(" ")
}

fn chapter_name(index: usize, keywords: &[String]) -> String {
    if keywords.is_empty() {
        format!("Chapter {}", index)
    } else {
        format!("Chapter {}: {}", index, keywords.join(" "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn breakpoint(timestamp: f64, topic_id: usize) -> Boundary {
        Boundary {
            timestamp,
            segment_index: 0,
            topic_id,
        }
    }

    fn assignments(topics: &[usize]) -> Vec<TopicAssignment> {
        topics
            .iter()
            .enumerate()
            .map(|(segment_index, topic_id)| TopicAssignment {
                segment_index,
                topic_id: *topic_id,
            })
            .collect()
    }

    #[test]
    fn test_merge_empty_is_empty() {
        assert!(merge_breakpoints(&[]).is_empty());
    }

    #[test]
    fn test_merge_collapses_equal_topics() {
        let spans = merge_breakpoints(&[
            breakpoint(0.0, 1),
            breakpoint(70.0, 1),
            breakpoint(140.0, 2),
            breakpoint(210.0, 0),
            breakpoint(280.0, 0),
        ]);
        assert_eq!(
            spans,
            vec![
                ChapterSpan { start: 0.0, topic_id: 1 },
                ChapterSpan { start: 140.0, topic_id: 2 },
                ChapterSpan { start: 210.0, topic_id: 0 },
            ]
        );
    }

    #[test]
    fn test_single_topic_yields_one_chapter_at_zero() {
        let table = SegmentTable::from_pairs(&[(3.0, "bread flour"), (8.0, "bread oven"), (12.0, "bread")]);
        let chapters = ChapterBuilder::default().build(&table, &assignments(&[4, 4, 4]), &[]);
        assert_eq!(chapters.len(), 1);
        assert_eq!(chapters[0].timestamp, 0.0);
        assert_eq!(chapters[0].topic_id, 4);
        assert_eq!(chapters[0].title, "Chapter 1: bread flour oven");
    }

    #[test]
    fn test_no_assignments_yields_no_chapters() {
        let chapters = ChapterBuilder::default().build(&SegmentTable::default(), &[], &[]);
        assert!(chapters.is_empty());
    }

    #[test]
    fn test_keywords_in_descending_weight() {
        let builder = ChapterBuilder::new(3);
        let text = "violin violin violin violin piano piano piano drums drums flute";
        assert_eq!(builder.keywords(text).unwrap(), vec!["violin", "piano", "drums"]);
    }

    #[test]
    fn test_fewer_keywords_than_requested() {
        let chapters = ChapterBuilder::new(3).build(
            &SegmentTable::from_pairs(&[(0.0, "the synthesizer")]),
            &assignments(&[0]),
            &[],
        );
        assert_eq!(chapters[0].title, "Chapter 1: synthesizer");
    }

    #[test]
    fn test_chapter_without_terms_gets_plain_name() {
        let chapters = ChapterBuilder::new(3).build(
            &SegmentTable::from_pairs(&[(0.0, "and the of")]),
            &assignments(&[0]),
            &[],
        );
        assert_eq!(chapters[0].title, "Chapter 1");
        assert!(chapters[0].keywords.is_empty());
    }

    #[test]
    fn test_chapter_text_uses_later_segments_of_same_topic() {
        let table = SegmentTable::from_pairs(&[
            (0.0, "alpha"),
            (10.0, "beta"),
            (20.0, "gamma"),
            (30.0, "delta"),
        ]);
        let assignments = assignments(&[0, 1, 0, 1]);
        let span = ChapterSpan { start: 10.0, topic_id: 0 };
        assert_eq!(chapter_text(&table, &assignments, &span), "gamma");
    }
}
