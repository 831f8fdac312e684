/// YouTube transcript chapterizer
///
/// Fetches a video's caption transcript, infers topics over its segments,
/// and turns topic changes into a consolidated, keyword-named chapter list.

pub mod analysis;
pub mod chapters;
pub mod config;
pub mod error;
pub mod report;
pub mod topics;
pub mod transcript;

// Re-export main types for easy access
pub use crate::chapters::{ChapterDetection, ChapterDetector, ChapterInfo};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::error::{ChapterizerError, Result};
pub use crate::topics::{TopicInferencer, TopicModel, UnassignedPolicy, Vectorizer};
pub use crate::transcript::{Segment, SegmentTable, TranscriptSource, YouTubeTranscriptFetcher};
