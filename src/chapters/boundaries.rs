/// Topic boundary detection and gap-based consolidation
use crate::topics::TopicAssignment;
use crate::transcript::SegmentTable;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// A point where the dominant topic changes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Boundary {
    /// Start time of the first segment in the new topic
    pub timestamp: f64,
    /// Index of that segment in the table
    pub segment_index: usize,
    /// Topic at and after the boundary
    pub topic_id: usize,
}

/// Emit a boundary at every strict topic change between adjacent assignments
///
/// The first segment never produces a boundary. An empty result means the
/// whole transcript shares one topic.
pub fn detect_boundaries(table: &SegmentTable, assignments: &[TopicAssignment]) -> Vec<Boundary> {
    let segments = table.segments();

    let boundaries: Vec<Boundary> = assignments
        .windows(2)
        .filter(|pair| pair[1].topic_id != pair[0].topic_id)
        .filter_map(|pair| {
            let current = pair[1];
            segments.get(current.segment_index).map(|segment| Boundary {
                timestamp: segment.start,
                segment_index: current.segment_index,
                topic_id: current.topic_id,
            })
        })
        .collect();

    debug!("Detected {} raw topic boundaries", boundaries.len());
    boundaries
}

/// Keep boundaries at least `time_threshold` seconds after the last kept one
///
/// The first boundary is always kept.
pub fn consolidate_boundaries(boundaries: &[Boundary], time_threshold: f64) -> Vec<Boundary> {
    let mut consolidated: Vec<Boundary> = Vec::new();

    for boundary in boundaries {
        let keep = match consolidated.last() {
            None => true,
            Some(last) => boundary.timestamp - last.timestamp >= time_threshold,
        };
        if keep {
            consolidated.push(*boundary);
        }
    }

    debug!(
        "Consolidated {} boundaries into {} (threshold {}s)",
        boundaries.len(),
        consolidated.len(),
        time_threshold
    );
    consolidated
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn table(timestamps: &[f64]) -> SegmentTable {
        let pairs: Vec<(f64, String)> = timestamps.iter().map(|t| (*t, format!("text {}", t))).collect();
        SegmentTable::from_pairs(&pairs)
    }

    fn boundary(timestamp: f64) -> Boundary {
        Boundary {
            timestamp,
            segment_index: 0,
            topic_id: 0,
        }
    }

    #[test]
    fn test_detects_each_transition() {
        let table = table(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let found = detect_boundaries(&table, &assignments(&[0, 0, 1, 1, 2, 2]));
        let times: Vec<f64> = found.iter().map(|b| b.timestamp).collect();
        assert_eq!(times, vec![20.0, 40.0]);
        assert_eq!(found[0].segment_index, 2);
        assert_eq!(found[1].topic_id, 2);
    }

    #[test]
    fn test_single_topic_has_no_boundaries() {
        let table = table(&[0.0, 5.0, 9.0]);
        assert!(detect_boundaries(&table, &assignments(&[3, 3, 3])).is_empty());
        assert!(detect_boundaries(&table, &[]).is_empty());
    }

    #[test]
    fn test_never_emits_first_segment() {
        let table = table(&[0.0, 1.0, 2.0, 3.0]);
        let found = detect_boundaries(&table, &assignments(&[1, 0, 1, 0]));
        assert_eq!(found.len(), 3);
        assert!(found.iter().all(|b| b.segment_index > 0));
    }

    #[test]
    fn test_return_to_earlier_topic_is_a_transition() {
        let table = table(&[0.0, 1.0, 2.0]);
        let found = detect_boundaries(&table, &assignments(&[0, 1, 0]));
        assert_eq!(found.len(), 2);
        assert_eq!(found[1].topic_id, 0);
    }

    #[test]
    fn test_consolidation_keeps_first_and_spaced() {
        let input: Vec<Boundary> = [10.0, 30.0, 75.0, 100.0, 135.0, 136.0].into_iter().map(boundary).collect();
        let kept: Vec<f64> = consolidate_boundaries(&input, 60.0).iter().map(|b| b.timestamp).collect();
        assert_eq!(kept, vec![10.0, 75.0, 135.0]);
    }

    #[test]
    fn test_consolidation_gap_equal_to_threshold_is_kept() {
        let input: Vec<Boundary> = [20.0, 40.0].into_iter().map(boundary).collect();
        assert_eq!(consolidate_boundaries(&input, 20.0).len(), 2);
        assert_eq!(consolidate_boundaries(&input, 15.0).len(), 2);
        assert_eq!(consolidate_boundaries(&input, 21.0).len(), 1);
    }

    #[test]
    fn test_consolidation_of_nothing() {
        assert!(consolidate_boundaries(&[], 60.0).is_empty());
    }

    #[test]
    fn test_consolidated_gaps_respect_threshold() {
        // Deterministic pseudo-random boundary sequences
        let mut state: u64 = 0x2545_f491_4f6c_dd1d;
        for threshold in [0.0, 5.0, 15.0, 60.0, 240.0] {
            for _ in 0..50 {
                let mut t = 0.0;
                let mut input = Vec::new();
                for _ in 0..40 {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    t += (state % 9000) as f64 / 100.0;
                    input.push(boundary(t));
                }

                let kept = consolidate_boundaries(&input, threshold);
                assert_eq!(kept.first(), input.first());
                for pair in kept.windows(2) {
                    assert!(pair[1].timestamp - pair[0].timestamp >= threshold);
                }
            }
        }
    }
}
