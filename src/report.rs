/// Chapter list formatting
use crate::chapters::ChapterInfo;
use crate::error::Result;
use serde::Serialize;
use std::fmt;

/// Format seconds as `HH:MM:SS`
///
/// Fractional seconds are floored. Hours keep counting past 24 rather than
/// wrapping; negative and non-finite input is treated as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let total_seconds = if seconds.is_finite() && seconds > 0.0 {
        seconds.floor() as u64
    } else {
        0
    };
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;

    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// One printable chapter line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChapterLine {
    pub time: String,
    pub name: String,
}

impl fmt::Display for ChapterLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.time, self.name)
    }
}

/// Ordered `(HH:MM:SS, name)` pairs
pub fn chapter_lines(chapters: &[ChapterInfo]) -> Vec<ChapterLine> {
    chapters
        .iter()
        .map(|chapter| ChapterLine {
            time: chapter.formatted_time(),
            name: chapter.title.clone(),
        })
        .collect()
}

/// Plain-text report, one `time - name` line per chapter
pub fn render_text(chapters: &[ChapterInfo]) -> String {
    if chapters.is_empty() {
        return "No chapters found.".to_string();
    }
    chapter_lines(chapters)
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn render_json(chapters: &[ChapterInfo]) -> Result<String> {
    Ok(serde_json::to_string_pretty(&chapter_lines(chapters))?)
}

/// Chapter block for a video description (`HH:MM:SS keyword keyword`)
pub fn format_youtube_description(chapters: &[ChapterInfo]) -> String {
    chapters
        .iter()
        .enumerate()
        .map(|(i, chapter)| {
            let label = if chapter.keywords.is_empty() {
                format!("Chapter {}", i + 1)
            } else {
                chapter.keywords.join(" ")
            };
            format!("{} {}", chapter.formatted_time(), label)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
