/// YouTube caption and metadata fetcher
use super::{Segment, SegmentTable};
use crate::config::FetchConfig;
use crate::error::{ChapterizerError, Result};
use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info, warn};

const UNKNOWN_TITLE: &str = "Unknown Title";
const CAPTION_TRACKS_KEY: &str = "\"captionTracks\":";

/// A transcript together with the id of the video it belongs to
#[derive(Debug, Clone)]
pub struct FetchedTranscript {
    pub video_id: String,
    pub table: SegmentTable,
}

/// Anything that can produce a titled transcript for a video id
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript>;
}

/// Where a fetched transcript is written: `output` if given, else `<output_dir>/<video_id>_transcript.csv`
pub fn transcript_path(video_id: &str, output: Option<&Path>, output_dir: &Path) -> PathBuf {
    match output {
        Some(path) => path.to_path_buf(),
        None => output_dir.join(format!("{}_transcript.csv", video_id)),
    }
}

/// Extract the 11-character video id from a YouTube link
pub fn extract_video_id(url: &str) -> Option<String> {
    let re = Regex::new(r"(?:v=|/)([0-9A-Za-z_-]{11})").ok()?;
    re.captures(url)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CaptionTrack {
    base_url: String,
    #[serde(default)]
    language_code: String,
    #[serde(default)]
    kind: Option<String>,
}

impl CaptionTrack {
    fn is_generated(&self) -> bool {
        self.kind.as_deref() == Some("asr")
    }
}

#[derive(Debug, Deserialize)]
struct VideoListResponse {
    #[serde(default)]
    items: Vec<VideoItem>,
}

#[derive(Debug, Deserialize)]
struct VideoItem {
    snippet: VideoSnippet,
}

#[derive(Debug, Deserialize)]
struct VideoSnippet {
    title: String,
}

/// Fetches captions from the public watch page and titles from the Data API
#[derive(Clone)]
pub struct YouTubeTranscriptFetcher {
    client: Client,
    config: FetchConfig,
}

impl YouTubeTranscriptFetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent("Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36")
            .build()?;

        Ok(Self { client, config })
    }

    /// Fetch a transcript for `url` and persist it as CSV
    ///
    /// Writes to `output` when given, otherwise to
    /// `<output_dir>/<video_id>_transcript.csv`. Returns the written path.
    pub async fn fetch_and_save(&self, url: &str, output: Option<&Path>, output_dir: &Path) -> Result<PathBuf> {
        let video_id = extract_video_id(url).ok_or_else(|| ChapterizerError::InvalidVideoUrl(url.to_string()))?;
        let fetched = self.fetch(&video_id).await?;

        let path = transcript_path(&video_id, output, output_dir);
        fetched.table.save_csv(&path)?;
        Ok(path)
    }

    /// Look up the video title through the YouTube Data API
    pub async fn fetch_title(&self, video_id: &str) -> Result<String> {
        let api_key = match &self.config.api_key {
            Some(key) if !key.is_empty() => key,
            _ => {
                warn!("⚠️ No YouTube API key configured, title lookup skipped");
                return Ok(UNKNOWN_TITLE.to_string());
            }
        };

        let response = self
            .client
            .get(&self.config.data_api_url)
            .query(&[("part", "snippet"), ("id", video_id), ("key", api_key.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ChapterizerError::Fetch(format!(
                "Data API returned {} for video {}",
                response.status(),
                video_id
            )));
        }

        let body: VideoListResponse = response.json().await?;
        Ok(body
            .items
            .into_iter()
            .next()
            .map(|item| item.snippet.title)
            .unwrap_or_else(|| UNKNOWN_TITLE.to_string()))
    }

    /// Download and parse the caption track for a video
    pub async fn fetch_transcript(&self, video_id: &str) -> Result<SegmentTable> {
        let watch_url = format!("{}?v={}", self.config.watch_url, video_id);
        info!("📄 Fetching watch page: {}", watch_url);
        let page = self.get_text(&watch_url).await?;

        let tracks = parse_caption_tracks(&page)
            .ok_or_else(|| ChapterizerError::NoTranscript(video_id.to_string()))?;
        debug!("Found {} caption tracks", tracks.len());

        let track = select_track(&tracks, &self.config.language)
            .ok_or_else(|| ChapterizerError::NoTranscript(video_id.to_string()))?;
        info!(
            "🎬 Using {} caption track '{}'",
            if track.is_generated() { "generated" } else { "manual" },
            track.language_code
        );

        let xml = self.get_text(&track.base_url).await?;
        let segments = parse_timedtext(&xml);
        if segments.is_empty() {
            return Err(ChapterizerError::NoTranscript(video_id.to_string()));
        }

        info!("✅ Parsed {} caption segments", segments.len());
        Ok(SegmentTable::new(segments))
    }

    /// GET with retries for transient failures
    async fn get_text(&self, url: &str) -> Result<String> {
        let mut attempt = 0;
        loop {
            attempt += 1;
            let outcome = match self.client.get(url).send().await {
                Ok(response) if response.status().is_success() => return Ok(response.text().await?),
                Ok(response) if response.status().is_client_error() => {
                    return Err(ChapterizerError::Fetch(format!("HTTP {} for {}", response.status(), url)));
                }
                Ok(response) => ChapterizerError::Fetch(format!("HTTP {} for {}", response.status(), url)),
                Err(e) => ChapterizerError::Http(e),
            };

            if attempt > self.config.max_retries {
                return Err(outcome);
            }
            warn!("🔁 Attempt {} failed ({}), retrying", attempt, outcome);
            tokio::time::sleep(Duration::from_millis(500 * u64::from(attempt))).await;
        }
    }
}

#[async_trait]
impl TranscriptSource for YouTubeTranscriptFetcher {
    async fn fetch(&self, video_id: &str) -> Result<FetchedTranscript> {
        let title = self.fetch_title(video_id).await?;
        info!("🎞️ Video title: {}", title);
        let table = self.fetch_transcript(video_id).await?.with_title(title);
        Ok(FetchedTranscript {
            video_id: video_id.to_string(),
            table,
        })
    }
}

/// Pull the `captionTracks` JSON array out of a watch page
fn parse_caption_tracks(page: &str) -> Option<Vec<CaptionTrack>> {
    let start = page.find(CAPTION_TRACKS_KEY)? + CAPTION_TRACKS_KEY.len();
    let array = balanced_json_array(&page[start..])?;
    serde_json::from_str(array).ok()
}

/// Slice the leading `[...]` off `input`, honouring nested brackets and strings
fn balanced_json_array(input: &str) -> Option<&str> {
    if !input.starts_with('[') {
        return None;
    }
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in input.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '[' => depth += 1,
            ']' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&input[..=i]);
                }
            }
            _ => {}
        }
    }
    None
}

/// Manual track in the preferred language, then a generated one, then anything
fn select_track<'a>(tracks: &'a [CaptionTrack], language: &str) -> Option<&'a CaptionTrack> {
    let in_language = |t: &&CaptionTrack| t.language_code == language;
    tracks
        .iter()
        .filter(in_language)
        .find(|t| !t.is_generated())
        .or_else(|| tracks.iter().find(in_language))
        .or_else(|| {
            if let Some(first) = tracks.first() {
                warn!("⚠️ No '{}' captions, falling back to '{}'", language, first.language_code);
            }
            tracks.first()
        })
}

/// Parse timed-text XML (`<text start=".." dur="..">..</text>`) into segments
fn parse_timedtext(xml: &str) -> Vec<Segment> {
    // Self-closing elements would nest under the HTML parser
    let xml = match Regex::new(r"<text([^>]*)/>") {
        Ok(re) => re.replace_all(xml, "<text$1></text>").into_owned(),
        Err(_) => xml.to_string(),
    };

    let document = Html::parse_document(&xml);
    let selector = match Selector::parse("text") {
        Ok(selector) => selector,
        Err(_) => return Vec::new(),
    };

    document
        .select(&selector)
        .filter_map(|element| {
            let start: f64 = element.value().attr("start")?.parse().ok()?;
            let raw: String = element.text().collect();
            Some(Segment::new(start, clean_caption_text(&raw)))
        })
        .collect()
}

/// Decode the second layer of entities and drop inline markup
fn clean_caption_text(raw: &str) -> String {
    let fragment = Html::parse_fragment(raw);
    let text: String = fragment.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
