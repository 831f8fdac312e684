/// Chapter detection and naming
///
/// Turns per-segment topic assignments into time boundaries, consolidates
/// boundaries that sit too close together, merges same-topic breakpoints
/// into chapters, and names each chapter from its top keywords.

pub mod boundaries;
pub mod builder;
pub mod detector;

// Re-export main types
pub use boundaries::{consolidate_boundaries, detect_boundaries, Boundary};
pub use builder::{merge_breakpoints, ChapterBuilder, ChapterSpan};
pub use detector::{ChapterDetection, ChapterDetector};

use crate::report::format_timestamp;
use serde::{Deserialize, Serialize};

/// Represents a single detected chapter
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChapterInfo {
    /// Timestamp in seconds from start of video
    pub timestamp: f64,
    /// Topic shared by the chapter's segments
    pub topic_id: usize,
    /// Generated name, e.g. `Chapter 2: bread flour oven`
    pub title: String,
    /// Keywords used in the name, highest weight first
    pub keywords: Vec<String>,
}

impl ChapterInfo {
    /// Start time as `HH:MM:SS`
    pub fn formatted_time(&self) -> String {
        format_timestamp(self.timestamp)
    }
}
