/// Exploratory statistics over a transcript
use crate::config::AnalysisConfig;
use crate::topics::tokenize;
use crate::transcript::SegmentTable;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;

/// Summary of one numeric column
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ColumnSummary {
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation (n - 1)
    pub std: f64,
    pub min: f64,
    pub p25: f64,
    pub median: f64,
    pub p75: f64,
    pub max: f64,
}

impl ColumnSummary {
    pub fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self::default();
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

        let count = sorted.len();
        let mean = sorted.iter().sum::<f64>() / count as f64;
        let std = if count > 1 {
            (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (count - 1) as f64).sqrt()
        } else {
            f64::NAN
        };

        Self {
            count,
            mean,
            std,
            min: sorted[0],
            p25: quantile(&sorted, 0.25),
            median: quantile(&sorted, 0.5),
            p75: quantile(&sorted, 0.75),
            max: sorted[count - 1],
        }
    }
}

/// Linear-interpolated quantile over sorted values
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let position = q * (sorted.len() - 1) as f64;
    let lower = position.floor() as usize;
    let upper = position.ceil() as usize;
    let fraction = position - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

/// Equal-width histogram bin
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistogramBin {
    pub lower: f64,
    pub upper: f64,
    pub count: usize,
}

/// Dataset overview: row counts, column summaries and text-length histogram
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptStats {
    pub title: Option<String>,
    pub segments: usize,
    pub empty_segments: usize,
    pub start: ColumnSummary,
    pub text_length: ColumnSummary,
    pub text_length_histogram: Vec<HistogramBin>,
    #[serde(skip)]
    histogram_width: usize,
}

/// Compute the overview statistics
pub fn basic_analysis(table: &SegmentTable, config: &AnalysisConfig) -> TranscriptStats {
    let lengths: Vec<f64> = table
        .segments()
        .iter()
        .map(|s| s.text.chars().count() as f64)
        .collect();

    TranscriptStats {
        title: table.title().map(str::to_string),
        segments: table.len(),
        empty_segments: table.segments().iter().filter(|s| s.text.trim().is_empty()).count(),
        start: ColumnSummary::from_values(&table.timestamps()),
        text_length: ColumnSummary::from_values(&lengths),
        text_length_histogram: histogram(&lengths, config.histogram_bins),
        histogram_width: config.histogram_width,
    }
}

/// Equal-width histogram over `[min, max]`; the last bin is closed
pub fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    // A constant column gets a unit-wide range centred on the value
    let (low, high) = if max > min { (min, max) } else { (min - 0.5, max + 0.5) };
    let width = (high - low) / bins as f64;

    let mut result: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            lower: low + width * i as f64,
            upper: low + width * (i + 1) as f64,
            count: 0,
        })
        .collect();

    for value in values {
        let index = (((value - low) / width).floor() as usize).min(bins - 1);
        result[index].count += 1;
    }
    result
}

/// Most frequent non-stop-words across all segments, ties alphabetical
pub fn common_words(table: &SegmentTable, limit: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for segment in table.segments() {
        for token in tokenize(&segment.text, true) {
            *counts.entry(token).or_insert(0) += 1;
        }
    }

    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(limit);
    ranked
}

/// Render a word-frequency table with proportional bars
pub fn render_common_words(words: &[(String, usize)], width: usize) -> String {
    let max = words.iter().map(|(_, c)| *c).max().unwrap_or(0);
    let label_width = words.iter().map(|(w, _)| w.len()).max().unwrap_or(0);
    words
        .iter()
        .map(|(word, count)| {
            format!(
                "{:<label_width$} {:>6} {}",
                word,
                count,
                bar(*count, max, width),
                label_width = label_width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn bar(count: usize, max: usize, width: usize) -> String {
    if max == 0 {
        return String::new();
    }
    let len = ((count as f64 / max as f64) * width as f64).round() as usize;
    "█".repeat(len.max(usize::from(count > 0)))
}

impl fmt::Display for ColumnSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "count {:>8}  mean {:>10.2}  std {:>10.2}  min {:>9.2}  25% {:>9.2}  50% {:>9.2}  75% {:>9.2}  max {:>9.2}",
            self.count, self.mean, self.std, self.min, self.p25, self.median, self.p75, self.max
        )
    }
}

impl fmt::Display for TranscriptStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset Overview:")?;
        if let Some(title) = &self.title {
            writeln!(f, "  Title: {}", title)?;
        }
        writeln!(f, "  Segments: {} ({} empty)", self.segments, self.empty_segments)?;
        writeln!(f, "\nBasic Statistics:")?;
        writeln!(f, "  start        {}", self.start)?;
        writeln!(f, "  text_length  {}", self.text_length)?;
        writeln!(f, "\nDistribution of Text Lengths:")?;

        let max = self.text_length_histogram.iter().map(|b| b.count).max().unwrap_or(0);
        for bin in &self.text_length_histogram {
            writeln!(
                f,
                "  {:>7.1} - {:>7.1} | {:>5} {}",
                bin.lower,
                bin.upper,
                bin.count,
                bar(bin.count, max, self.histogram_width)
            )?;
        }
        Ok(())
    }
}
