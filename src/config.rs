use crate::error::{ChapterizerError, Result};
use crate::topics::UnassignedPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the transcript chapterizer
///
/// Loaded once at startup and handed to the components that need it.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Transcript and metadata fetching
    pub fetch: FetchConfig,

    /// Vectorization and topic factorization
    pub topics: TopicConfig,

    /// Boundary consolidation and chapter naming
    pub chapters: ChapterConfig,

    /// Exploratory statistics
    pub analysis: AnalysisConfig,

    /// Output and logging
    pub output: OutputConfig,

    /// File the configuration was read from, if any
    #[serde(skip)]
    pub source: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// YouTube Data API key, used for the title lookup only
    pub api_key: Option<String>,

    /// Preferred caption language code
    pub language: String,

    /// HTTP request timeout in seconds
    pub timeout_seconds: u64,

    /// Retries for transient HTTP failures
    pub max_retries: u32,

    /// Watch page base URL
    pub watch_url: String,

    /// Data API `videos` endpoint
    pub data_api_url: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConfig {
    /// Number of NMF components
    pub n_topics: usize,

    /// Words shown per topic in the topic listing
    pub n_top_words: usize,

    /// Drop terms present in more than this fraction of segments
    pub max_df: f64,

    /// Drop terms present in fewer than this many segments
    pub min_df: usize,

    /// Seed for the factorization's initial matrices
    pub seed: u64,

    /// Maximum multiplicative-update iterations
    pub max_iter: usize,

    /// Relative reconstruction-error change that stops iteration early
    pub tolerance: f64,

    /// What to do with segments the topic model returns no row for
    pub unassigned_policy: UnassignedPolicy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChapterConfig {
    /// Minimum gap in seconds between consecutive chapter boundaries
    pub time_threshold: f64,

    /// Keywords per chapter name
    pub name_terms: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Number of entries in the common-words listing
    pub common_words: usize,

    /// Bins in the text-length histogram
    pub histogram_bins: usize,

    /// Width of the longest histogram bar in characters
    pub histogram_width: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory where fetched transcripts are written
    pub transcript_dir: PathBuf,

    /// Log level
    pub log_level: String,
}

impl Config {
    /// Load configuration from the first config file that exists, then apply env overrides
    pub fn load() -> Result<Self> {
        Self::load_first(&[Path::new("chapterizer.toml"), Path::new("config/chapterizer.toml")])
    }

    /// Load the first existing file of `paths`; a file that exists but does not parse is an error
    pub fn load_first(paths: &[&Path]) -> Result<Self> {
        match paths.iter().find(|path| path.is_file()) {
            Some(path) => Self::load_from(path),
            None => Self::from_env(),
        }
    }

    /// Load configuration from an explicit TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)?;
        let mut config: Config = toml::from_str(&config_str)
            .map_err(|e| ChapterizerError::Config(format!("{}: {}", path.display(), e)))?;
        config.source = Some(path.to_path_buf());
        Ok(config.with_env_overrides())
    }

    /// Defaults with environment variable overrides
    pub fn from_env() -> Result<Self> {
        Ok(Self::default().with_env_overrides())
    }

    fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply `YOUTUBE_API_KEY` and `CHAPTERIZER_*` overrides read through `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(api_key) = lookup("YOUTUBE_API_KEY") {
            self.fetch.api_key = Some(api_key);
        }

        if let Some(threshold) = lookup("CHAPTERIZER_TIME_THRESHOLD") {
            match threshold.parse() {
                Ok(value) => self.chapters.time_threshold = value,
                Err(_) => tracing::warn!("Ignoring invalid CHAPTERIZER_TIME_THRESHOLD: {}", threshold),
            }
        }

        if let Some(topics) = lookup("CHAPTERIZER_TOPICS") {
            match topics.parse() {
                Ok(value) => self.topics.n_topics = value,
                Err(_) => tracing::warn!("Ignoring invalid CHAPTERIZER_TOPICS: {}", topics),
            }
        }

        if let Some(output_dir) = lookup("CHAPTERIZER_OUTPUT_DIR") {
            self.output.transcript_dir = PathBuf::from(output_dir);
        }

        if let Some(log_level) = lookup("CHAPTERIZER_LOG_LEVEL") {
            self.output.log_level = log_level;
        }

        self
    }

    /// Save configuration to file
    pub fn save(&self, path: &str) -> Result<()> {
        let config_str = toml::to_string_pretty(self).map_err(|e| ChapterizerError::Config(e.to_string()))?;
        std::fs::write(path, config_str)?;
        tracing::info!("💾 Configuration saved to: {}", path);
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.topics.n_topics == 0 {
            return Err(ChapterizerError::Config("n_topics must be greater than 0".into()));
        }

        if !(self.topics.max_df > 0.0 && self.topics.max_df <= 1.0) {
            return Err(ChapterizerError::Config("max_df must be in (0, 1]".into()));
        }

        if self.topics.min_df == 0 {
            return Err(ChapterizerError::Config("min_df must be at least 1".into()));
        }

        if self.topics.max_iter == 0 {
            return Err(ChapterizerError::Config("max_iter must be greater than 0".into()));
        }

        if !(self.chapters.time_threshold >= 0.0) {
            return Err(ChapterizerError::Config("time_threshold must be non-negative".into()));
        }

        if self.chapters.name_terms == 0 {
            return Err(ChapterizerError::Config("name_terms must be greater than 0".into()));
        }

        if self.analysis.histogram_bins == 0 {
            return Err(ChapterizerError::Config("histogram_bins must be greater than 0".into()));
        }

        tracing::debug!("✅ Configuration validation passed");
        Ok(())
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Chapterizer Configuration:\n\
            - Topics: {} (top words: {})\n\
            - Vectorizer: max_df={}, min_df={}\n\
            - Seed: {}\n\
            - Time Threshold: {}s\n\
            - Unassigned Policy: {:?}\n\
            - Transcript Directory: {}",
            self.topics.n_topics,
            self.topics.n_top_words,
            self.topics.max_df,
            self.topics.min_df,
            self.topics.seed,
            self.chapters.time_threshold,
            self.topics.unassigned_policy,
            self.output.transcript_dir.display(),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            topics: TopicConfig::default(),
            chapters: ChapterConfig::default(),
            analysis: AnalysisConfig::default(),
            output: OutputConfig::default(),
            source: None,
        }
    }
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            language: "en".to_string(),
            timeout_seconds: 30,
            max_retries: 3,
            watch_url: "https://www.youtube.com/watch".to_string(),
            data_api_url: "https://www.googleapis.com/youtube/v3/videos".to_string(),
        }
    }
}

impl Default for TopicConfig {
    fn default() -> Self {
        Self {
            n_topics: 10,
            n_top_words: 10,
            max_df: 0.95,
            min_df: 2,
            seed: 42,
            max_iter: 200,
            tolerance: 1e-4,
            unassigned_policy: UnassignedPolicy::default(),
        }
    }
}

impl Default for ChapterConfig {
    fn default() -> Self {
        Self {
            time_threshold: 60.0,
            name_terms: 3,
        }
    }
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            common_words: 20,
            histogram_bins: 50,
            histogram_width: 40,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            transcript_dir: PathBuf::from("./transcripts"),
            log_level: "info".to_string(),
        }
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_topics(mut self, n_topics: usize) -> Self {
        self.config.topics.n_topics = n_topics;
        self
    }

    pub fn with_top_words(mut self, n_top_words: usize) -> Self {
        self.config.topics.n_top_words = n_top_words;
        self
    }

    pub fn with_document_frequency(mut self, max_df: f64, min_df: usize) -> Self {
        self.config.topics.max_df = max_df;
        self.config.topics.min_df = min_df;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.config.topics.seed = seed;
        self
    }

    pub fn with_unassigned_policy(mut self, policy: UnassignedPolicy) -> Self {
        self.config.topics.unassigned_policy = policy;
        self
    }

    pub fn with_time_threshold(mut self, seconds: f64) -> Self {
        self.config.chapters.time_threshold = seconds;
        self
    }

    pub fn with_transcript_dir(mut self, dir: PathBuf) -> Self {
        self.config.output.transcript_dir = dir;
        self
    }

    pub fn with_api_key(mut self, api_key: String) -> Self {
        self.config.fetch.api_key = Some(api_key);
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
