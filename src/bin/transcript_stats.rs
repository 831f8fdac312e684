use anyhow::{anyhow, Result};
use std::path::PathBuf;
use tracing::info;
use yt_chapterizer::analysis::{basic_analysis, common_words, render_common_words};
use yt_chapterizer::{Config, SegmentTable};

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter("yt_chapterizer=info")
        .init();

    let path = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: transcript-stats <transcript.csv>"))?;

    let config = Config::from_env()?;
    let table = SegmentTable::load_csv(&path)?;
    info!("📊 Analyzing {} segments", table.len());

    println!("{}", basic_analysis(&table, &config.analysis));

    let words = common_words(&table, config.analysis.common_words);
    println!("Top {} Common Words:", words.len());
    println!("{}", render_common_words(&words, config.analysis.histogram_width));

    Ok(())
}
