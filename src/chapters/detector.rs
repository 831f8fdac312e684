/// Chapter detection coordinator running the full pipeline
use super::builder::ChapterBuilder;
use super::{consolidate_boundaries, detect_boundaries, Boundary, ChapterInfo};
use crate::config::Config;
use crate::error::Result;
use crate::topics::{TopicAssignment, TopicInferencer, TopicSummary};
use crate::transcript::SegmentTable;
use tracing::info;

/// Every intermediate result of one detection run
#[derive(Debug, Clone, Default)]
pub struct ChapterDetection {
    pub topics: Vec<TopicSummary>,
    pub assignments: Vec<TopicAssignment>,
    pub boundaries: Vec<Boundary>,
    pub consolidated: Vec<Boundary>,
    pub chapters: Vec<ChapterInfo>,
}

/// Topic inference → boundaries → consolidation → named chapters
pub struct ChapterDetector {
    inferencer: TopicInferencer,
    builder: ChapterBuilder,
    time_threshold: f64,
}

impl ChapterDetector {
    /// Create a detector from the process configuration
    pub fn new(config: &Config) -> Self {
        Self::with_parts(
            TopicInferencer::from_config(&config.topics),
            ChapterBuilder::from_config(&config.chapters),
            config.chapters.time_threshold,
        )
    }

    /// Create a detector around a custom inferencer
    pub fn with_parts(inferencer: TopicInferencer, builder: ChapterBuilder, time_threshold: f64) -> Self {
        Self {
            inferencer,
            builder,
            time_threshold,
        }
    }

    /// Run chapter detection over a transcript
    pub fn detect(&mut self, table: &SegmentTable) -> Result<ChapterDetection> {
        if table.is_empty() {
            info!("🔕 Empty transcript, no chapters to detect");
            return Ok(ChapterDetection::default());
        }

        let inference = self.inferencer.infer(table)?;
        let boundaries = detect_boundaries(table, &inference.assignments);
        let consolidated = consolidate_boundaries(&boundaries, self.time_threshold);

        if consolidated.is_empty() {
            info!("📘 No topic boundaries, transcript forms a single chapter");
        } else {
            info!(
                "✂️ {} topic boundaries, {} after {}s consolidation",
                boundaries.len(),
                consolidated.len(),
                self.time_threshold
            );
        }

        let chapters = self.builder.build(table, &inference.assignments, &consolidated);
        info!("✅ Detected {} chapters", chapters.len());

        Ok(ChapterDetection {
            topics: inference.topics,
            assignments: inference.assignments,
            boundaries,
            consolidated,
            chapters,
        })
    }
}
