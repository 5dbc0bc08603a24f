use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for one scraping pipeline run
///
/// Built once at process start and passed by reference into every component.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// User-Agent sent by both the HTTP fetcher and the headless browser
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Accept-Language header for static fetches
    #[serde(default = "default_accept_language")]
    pub accept_language: String,

    /// Hard timeout for a static fetch, in seconds
    #[serde(default = "default_fetch_timeout_secs")]
    pub fetch_timeout_secs: u64,

    /// Hard timeout for browser navigation, in milliseconds
    #[serde(default = "default_render_timeout_ms")]
    pub render_timeout_ms: u64,

    /// Extra wait after the network goes quiet, in milliseconds
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// How long the resource count must stay unchanged to count as idle
    #[serde(default = "default_network_idle_ms")]
    pub network_idle_ms: u64,

    /// Sleep before every smart scrape, in milliseconds
    #[serde(default = "default_rate_limit_delay_ms")]
    pub rate_limit_delay_ms: u64,

    /// Maximum number of selected pages to compile
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Maximum characters kept per section
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// Whether the browser runs headless
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Directory holding compiled contents caches
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Extra regex patterns for links to drop
    #[serde(default)]
    pub exclude_patterns: Vec<String>,
}

fn default_user_agent() -> String {
    "BrochureScrape/0.1 (company brochure generator; +https://example.com/bot)".to_string()
}

fn default_accept_language() -> String {
    "es-ES,es;q=0.9,en;q=0.8".to_string()
}

fn default_fetch_timeout_secs() -> u64 {
    10
}

fn default_render_timeout_ms() -> u64 {
    30_000
}

fn default_settle_delay_ms() -> u64 {
    2_000
}

fn default_network_idle_ms() -> u64 {
    500
}

fn default_rate_limit_delay_ms() -> u64 {
    1_500
}

fn default_max_pages() -> usize {
    10
}

fn default_max_chars() -> usize {
    15_000
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("data/compiled")
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            user_agent: default_user_agent(),
            accept_language: default_accept_language(),
            fetch_timeout_secs: default_fetch_timeout_secs(),
            render_timeout_ms: default_render_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            network_idle_ms: default_network_idle_ms(),
            rate_limit_delay_ms: default_rate_limit_delay_ms(),
            max_pages: default_max_pages(),
            max_chars: default_max_chars(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            output_dir: default_output_dir(),
            exclude_patterns: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, Box<dyn Error>> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, Box<dyn Error>> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override settings from `WEBDRIVER_URL` and `RATE_LIMIT_DELAY` (seconds)
    pub fn apply_env_overrides(&mut self) {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }

        if let Ok(delay) = std::env::var("RATE_LIMIT_DELAY") {
            match delay.trim().parse::<f64>() {
                Ok(secs) if secs >= 0.0 => {
                    self.rate_limit_delay_ms = (secs * 1000.0).round() as u64;
                }
                _ => ::log::warn!("Ignoring invalid RATE_LIMIT_DELAY value: {}", delay),
            }
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn render_timeout(&self) -> Duration {
        Duration::from_millis(self.render_timeout_ms)
    }

    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn network_idle(&self) -> Duration {
        Duration::from_millis(self.network_idle_ms)
    }

    pub fn rate_limit_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limit_delay_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let config = PipelineConfig::from_json("{}").unwrap();
        assert_eq!(config.fetch_timeout(), Duration::from_secs(10));
        assert_eq!(config.render_timeout(), Duration::from_millis(30_000));
        assert_eq!(config.settle_delay(), Duration::from_millis(2_000));
        assert_eq!(config.max_pages, 10);
        assert_eq!(config.max_chars, 15_000);
        assert_eq!(config.webdriver_url, "http://localhost:4444");
        assert!(config.headless);
        assert!(config.exclude_patterns.is_empty());
    }

    #[test]
    fn test_partial_json_overrides() {
        let config = PipelineConfig::from_json(
            r#"{"max_pages": 3, "rate_limit_delay_ms": 0, "exclude_patterns": ["/blog/"]}"#,
        )
        .unwrap();
        assert_eq!(config.max_pages, 3);
        assert_eq!(config.rate_limit_delay(), Duration::ZERO);
        assert_eq!(config.exclude_patterns, vec!["/blog/".to_string()]);
        assert_eq!(config.max_chars, 15_000);
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"webdriver_url": "http://localhost:9515"}"#).unwrap();

        let config = PipelineConfig::from_file(&path).unwrap();
        assert_eq!(config.webdriver_url, "http://localhost:9515");
    }

    #[test]
    fn test_invalid_json_is_an_error() {
        assert!(PipelineConfig::from_json("{not json").is_err());
    }
}
