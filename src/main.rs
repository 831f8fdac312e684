use anyhow::{anyhow, Result};
use clap::{Arg, ArgAction, Command};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

use yt_chapterizer::analysis::{basic_analysis, common_words, render_common_words};
use yt_chapterizer::report::{format_youtube_description, render_json, render_text};
use yt_chapterizer::{ChapterDetector, Config, SegmentTable, YouTubeTranscriptFetcher};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let matches = Command::new("YouTube Chapterizer")
        .version("0.1.0")
        .author("TigreRoll")
        .about("Detect topical chapters in a YouTube caption transcript")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("YouTube video link to fetch")
                .conflicts_with("transcript")
        )
        .arg(
            Arg::new("transcript")
                .short('t')
                .long("transcript")
                .value_name("CSV")
                .help("Previously saved transcript CSV (skips fetching)")
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("CSV")
                .help("Where to save the fetched transcript")
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Configuration file (TOML)")
        )
        .arg(
            Arg::new("topics")
                .short('n')
                .long("topics")
                .value_name("NUM")
                .help("Number of topics")
                .value_parser(clap::value_parser!(usize))
        )
        .arg(
            Arg::new("top-words")
                .long("top-words")
                .value_name("NUM")
                .help("Words shown per topic")
                .value_parser(clap::value_parser!(usize))
        )
        .arg(
            Arg::new("time-threshold")
                .short('g')
                .long("time-threshold")
                .value_name("SECONDS")
                .help("Minimum gap between chapter boundaries")
                .value_parser(clap::value_parser!(f64))
        )
        .arg(
            Arg::new("skip-analysis")
                .long("skip-analysis")
                .help("Skip exploratory statistics")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print chapters as JSON")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("description")
                .long("description")
                .help("Also print a chapter block for the video description")
                .action(ArgAction::SetTrue)
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Enable verbose logging")
                .action(ArgAction::SetTrue)
        )
        .get_matches();

    // Load configuration
    let mut config = match matches.get_one::<String>("config") {
        Some(path) => Config::load_from(&PathBuf::from(path))?,
        None => Config::load()?,
    };

    let level = if matches.get_flag("verbose") { "debug" } else { config.output.log_level.as_str() };
    tracing_subscriber::fmt()
        .with_env_filter(format!("yt_chapterizer={},chapterizer={},warn", level, level))
        .init();

    match &config.source {
        Some(path) => info!("📄 Loaded configuration from: {}", path.display()),
        None => info!("📄 No configuration file found, using defaults"),
    }

    if let Some(topics) = matches.get_one::<usize>("topics") {
        config.topics.n_topics = *topics;
    }
    if let Some(top_words) = matches.get_one::<usize>("top-words") {
        config.topics.n_top_words = *top_words;
    }
    if let Some(threshold) = matches.get_one::<f64>("time-threshold") {
        config.chapters.time_threshold = *threshold;
    }
    config.validate()?;
    info!("{}", config.summary());

    let transcript_path = match matches.get_one::<String>("transcript") {
        Some(path) => PathBuf::from(path),
        None => {
            let url = match matches.get_one::<String>("url") {
                Some(url) => url.clone(),
                None => prompt("Enter the YouTube video link: ")?,
            };
            let fetcher = YouTubeTranscriptFetcher::new(config.fetch.clone())?;
            let output = matches.get_one::<String>("output").map(PathBuf::from);
            let path = fetcher
                .fetch_and_save(&url, output.as_deref(), &config.output.transcript_dir)
                .await?;
            println!("Transcript saved to {}", path.display());
            path
        }
    };

    let table = SegmentTable::load_csv(&transcript_path)?;
    if table.is_empty() {
        warn!("⚠️ Transcript has no segments");
    }

    if !matches.get_flag("skip-analysis") {
        println!("\nPerforming basic analysis...");
        println!("{}", basic_analysis(&table, &config.analysis));

        println!("\nAnalyzing common words...");
        let words = common_words(&table, config.analysis.common_words);
        println!("Top {} Common Words:", words.len());
        println!("{}", render_common_words(&words, config.analysis.histogram_width));
    }

    println!("\nPerforming topic modeling...");
    let mut detector = ChapterDetector::new(&config);
    let detection = detector.detect(&table)?;

    println!("\nIdentified Topics:");
    for topic in &detection.topics {
        println!("Topic {}: {}", topic.topic_id + 1, topic.label());
    }

    println!("\nFinal Chapter Points with Names:");
    if matches.get_flag("json") {
        println!("{}", render_json(&detection.chapters)?);
    } else {
        println!("{}", render_text(&detection.chapters));
    }

    if matches.get_flag("description") && !detection.chapters.is_empty() {
        println!("\nDescription block:");
        println!("{}", format_youtube_description(&detection.chapters));
    }

    Ok(())
}

fn prompt(message: &str) -> Result<String> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let line = line.trim().to_string();
    if line.is_empty() {
        return Err(anyhow!("No video link given"));
    }
    Ok(line)
}
