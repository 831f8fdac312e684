use async_trait::async_trait;
use ndarray::Array2;
use tempfile::TempDir;
use yt_chapterizer::chapters::ChapterBuilder;
use yt_chapterizer::report::render_text;
use yt_chapterizer::topics::{DocumentTermMatrix, TopicInferencer};
use yt_chapterizer::transcript::FetchedTranscript;
use yt_chapterizer::{
    ChapterDetector, ChapterizerError, ConfigBuilder, Result, SegmentTable, TopicModel, TranscriptSource,
    UnassignedPolicy, Vectorizer,
};

/// One column per document, weight 1 on the diagonal
struct IdentityVectorizer;

impl Vectorizer for IdentityVectorizer {
    fn fit_transform(&mut self, documents: &[&str]) -> Result<DocumentTermMatrix> {
        let n = documents.len();
        Ok(DocumentTermMatrix {
            weights: Array2::eye(n),
            vocabulary: (0..n).map(|i| format!("term{}", i)).collect(),
        })
    }
}

/// Returns predetermined topic ids as one-hot rows
struct FixedTopics {
    ids: Vec<usize>,
    n_topics: usize,
}

impl TopicModel for FixedTopics {
    fn fit_transform(&mut self, _matrix: &Array2<f64>) -> Result<Array2<f64>> {
        let mut weights = Array2::zeros((self.ids.len(), self.n_topics));
        for (row, id) in self.ids.iter().enumerate() {
            weights[[row, *id]] = 1.0;
        }
        Ok(weights)
    }

    fn components(&self) -> Option<&Array2<f64>> {
        None
    }
}

fn detector_with_topics(ids: &[usize], policy: UnassignedPolicy, threshold: f64) -> ChapterDetector {
    let n_topics = ids.iter().copied().max().unwrap_or(0) + 1;
    let inferencer = TopicInferencer::new(
        Box::new(IdentityVectorizer),
        Box::new(FixedTopics { ids: ids.to_vec(), n_topics }),
        policy,
        10,
    );
    ChapterDetector::with_parts(inferencer, ChapterBuilder::new(3), threshold)
}

fn six_segment_table() -> SegmentTable {
    SegmentTable::from_pairs(&[
        (0.0, "welcome intro welcome channel"),
        (10.0, "intro channel welcome"),
        (20.0, "bread flour bread oven"),
        (30.0, "bread oven yeast"),
        (40.0, "rocket orbit rocket launch"),
        (50.0, "rocket launch orbit"),
    ])
}

#[test]
fn test_three_topic_transcript_yields_three_chapters() {
    let mut detector = detector_with_topics(&[0, 0, 1, 1, 2, 2], UnassignedPolicy::Error, 15.0);
    let detection = detector.detect(&six_segment_table()).unwrap();

    let boundaries: Vec<f64> = detection.boundaries.iter().map(|b| b.timestamp).collect();
    let consolidated: Vec<f64> = detection.consolidated.iter().map(|b| b.timestamp).collect();
    let starts: Vec<f64> = detection.chapters.iter().map(|c| c.timestamp).collect();
    assert_eq!(boundaries, vec![20.0, 40.0]);
    assert_eq!(consolidated, vec![20.0, 40.0]);
    assert_eq!(starts, vec![0.0, 20.0, 40.0]);

    assert_eq!(detection.chapters[0].title, "Chapter 1: welcome channel intro");
    assert_eq!(detection.chapters[1].title, "Chapter 2: bread oven flour");
    assert_eq!(detection.chapters[2].title, "Chapter 3: rocket launch orbit");

    assert_eq!(
        render_text(&detection.chapters),
        "00:00:00 - Chapter 1: welcome channel intro\n\
         00:00:20 - Chapter 2: bread oven flour\n\
         00:00:40 - Chapter 3: rocket launch orbit"
    );
}

#[test]
fn test_close_boundaries_are_consolidated() {
    let mut detector = detector_with_topics(&[0, 0, 1, 1, 2, 2], UnassignedPolicy::Error, 60.0);
    let detection = detector.detect(&six_segment_table()).unwrap();

    let consolidated: Vec<f64> = detection.consolidated.iter().map(|b| b.timestamp).collect();
    assert_eq!(consolidated, vec![20.0]);
    assert_eq!(detection.chapters.len(), 2);
}

#[test]
fn test_single_topic_is_one_chapter() {
    let mut detector = detector_with_topics(&[3, 3, 3, 3, 3, 3], UnassignedPolicy::Error, 60.0);
    let detection = detector.detect(&six_segment_table()).unwrap();

    assert!(detection.boundaries.is_empty());
    assert_eq!(detection.chapters.len(), 1);
    assert_eq!(detection.chapters[0].timestamp, 0.0);
    assert_eq!(detection.chapters[0].formatted_time(), "00:00:00");
}

#[test]
fn test_kept_boundaries_with_equal_topic_merge() {
    // The 2 → 1 switch at 100s follows a dropped 1 → 2 switch at 30s
    let table = SegmentTable::from_pairs(&[(0.0, "alpha"), (20.0, "beta"), (30.0, "gamma"), (100.0, "beta again")]);
    let mut detector = detector_with_topics(&[0, 1, 2, 1], UnassignedPolicy::Error, 60.0);
    let detection = detector.detect(&table).unwrap();

    let consolidated: Vec<f64> = detection.consolidated.iter().map(|b| b.timestamp).collect();
    assert_eq!(consolidated, vec![20.0, 100.0]);
    let starts: Vec<(f64, usize)> = detection.chapters.iter().map(|c| (c.timestamp, c.topic_id)).collect();
    assert_eq!(starts, vec![(0.0, 0), (20.0, 1)]);
    assert_eq!(detection.chapters[1].title, "Chapter 2: beta");
}

#[test]
fn test_row_mismatch_policies() {
    let table = six_segment_table();

    let mut detector = detector_with_topics(&[0, 0, 1, 1], UnassignedPolicy::Propagate, 15.0);
    let detection = detector.detect(&table).unwrap();
    assert_eq!(detection.assignments.len(), 6);
    assert_eq!(detection.chapters.len(), 2);

    let mut detector = detector_with_topics(&[0, 0, 1, 1], UnassignedPolicy::Drop, 15.0);
    let detection = detector.detect(&table).unwrap();
    assert_eq!(detection.assignments.len(), 4);

    let mut detector = detector_with_topics(&[0, 0, 1, 1], UnassignedPolicy::Error, 15.0);
    assert!(matches!(
        detector.detect(&table),
        Err(ChapterizerError::TopicRowMismatch { rows: 4, segments: 6 })
    ));
}

#[test]
fn test_real_models_are_reproducible() {
    let mut pairs = Vec::new();
    for i in 0..30 {
        let text = if i < 15 {
            "guitar chords strings guitar tuning"
        } else {
            "bread flour oven bread yeast"
        };
        pairs.push((i as f64 * 10.0, text));
    }
    let table = SegmentTable::from_pairs(&pairs);
    let config = ConfigBuilder::new().with_topics(2).with_time_threshold(30.0).build();

    let first = ChapterDetector::new(&config).detect(&table).unwrap();
    let second = ChapterDetector::new(&config).detect(&table).unwrap();

    assert_eq!(first.assignments, second.assignments);
    assert_eq!(first.chapters, second.chapters);
    assert_eq!(first.chapters.len(), 2);
    assert_eq!(first.chapters[1].timestamp, 150.0);
}

#[test]
fn test_csv_file_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("nested").join("abc_transcript.csv");

    let table = six_segment_table().with_title("Baking, Rockets & Music");
    table.save_csv(&path).unwrap();

    let loaded = SegmentTable::load_csv(&path).unwrap();
    assert_eq!(loaded.segments(), table.segments());
    assert_eq!(loaded.title(), Some("Baking, Rockets & Music"));
}

#[test]
fn test_malformed_csv_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("bad.csv");
    std::fs::write(&path, "start,text\n0,fine\nlater,broken\n").unwrap();

    assert!(matches!(
        SegmentTable::load_csv(&path),
        Err(ChapterizerError::MalformedSegmentTable(_))
    ));
}

struct StaticSource;

#[async_trait]
impl TranscriptSource for StaticSource {
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript> {
        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            table: six_segment_table().with_title("Static"),
        })
    }
}

#[tokio::test]
async fn test_transcript_source_feeds_detection() {
    let source: Box<dyn TranscriptSource> = Box::new(StaticSource);
    let fetched = source.fetch("dQw4w9WgXcQ").await.unwrap();
    assert_eq!(fetched.video_id, "dQw4w9WgXcQ");

    let mut detector = detector_with_topics(&[0, 0, 1, 1, 2, 2], UnassignedPolicy::Error, 15.0);
    let detection = detector.detect(&fetched.table).unwrap();
    assert_eq!(detection.chapters.len(), 3);
}
