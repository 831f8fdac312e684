/// Error types for the chapterizer library

/// Result type for chapterizer operations
pub type Result<T> = std::result::Result<T, ChapterizerError>;

#[derive(thiserror::Error, Debug)]
pub enum ChapterizerError {
    /// Vectorization left no terms after stop-word and document-frequency filtering
    #[error("Empty vocabulary: {0}")]
    EmptyVocabulary(String),

    /// Missing columns or non-numeric timestamps in a segment table
    #[error("Malformed segment table: {0}")]
    MalformedSegmentTable(String),

    /// Topic model returned fewer weight rows than there are segments
    #[error("Topic model produced {rows} rows for {segments} segments")]
    TopicRowMismatch { rows: usize, segments: usize },

    #[error("Invalid YouTube URL: {0}")]
    InvalidVideoUrl(String),

    #[error("No transcript available for video {0}")]
    NoTranscript(String),

    #[error("Fetch failed: {0}")]
    Fetch(String),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
