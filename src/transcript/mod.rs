/// Transcript data model and sources
///
/// A transcript is an ordered table of caption segments. It is produced by a
/// [`TranscriptSource`] (the YouTube fetcher in practice), persisted as a flat
/// CSV record table, and read back by the chapter detection pipeline.

pub mod fetcher;
pub mod store;

pub use fetcher::{extract_video_id, transcript_path, FetchedTranscript, TranscriptSource, YouTubeTranscriptFetcher};

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Title marker written as the trailing metadata row of a transcript CSV
pub const TITLE_MARKER: &str = "Title:";

/// One caption record
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Segment {
    /// Start time in seconds from the beginning of the video
    pub start: f64,
    /// Caption text, possibly empty
    pub text: String,
}

impl Segment {
    pub fn new(start: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            text: text.into(),
        }
    }
}

/// Ordered caption segments plus optional video title
///
/// Segments are expected in ascending `start` order. The table does not
/// reorder them; producers are responsible for the ordering.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentTable {
    segments: Vec<Segment>,
    title: Option<String>,
}

impl SegmentTable {
    pub fn new(segments: Vec<Segment>) -> Self {
        let table = Self {
            segments,
            title: None,
        };
        if !table.is_ordered() {
            warn!("⚠️ Segment table is not in ascending timestamp order");
        }
        table
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Build a table from parallel timestamp and text slices
    pub fn from_pairs<S: AsRef<str>>(pairs: &[(f64, S)]) -> Self {
        Self::new(
            pairs
                .iter()
                .map(|(start, text)| Segment::new(*start, text.as_ref()))
                .collect(),
        )
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Segment texts in table order
    pub fn texts(&self) -> Vec<&str> {
        self.segments.iter().map(|s| s.text.as_str()).collect()
    }

    /// Segment start times in table order
    pub fn timestamps(&self) -> Vec<f64> {
        self.segments.iter().map(|s| s.start).collect()
    }

    fn is_ordered(&self) -> bool {
        self.segments.windows(2).all(|w| w[0].start <= w[1].start)
    }
}
