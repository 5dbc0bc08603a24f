use crate::config::PipelineConfig;
use crate::crawlers::crawler::PageRenderer;
use crate::error::FetchError;
use fantoccini::error::CmdError;
use fantoccini::wd::TimeoutConfiguration;
use fantoccini::{Client, ClientBuilder};
use serde_json::{Map, Value, json};
use std::time::Duration;
use tokio::time::{sleep, timeout};

/// Common WebDriver endpoints tried when the default one is unreachable
const FALLBACK_WEBDRIVER_URLS: &[&str] = &[
    "http://localhost:9515", // ChromeDriver default
    "http://127.0.0.1:4444", // Try with IP instead of localhost
];

/// Reports document readiness and how many resources the page has requested
const NETWORK_PROBE: &str =
    "return [document.readyState, performance.getEntriesByType('resource').length];";

/// Dynamic renderer backed by a WebDriver server.
///
/// Every call opens a new browser session and closes it before returning,
/// so nothing leaks between pages.
#[derive(Debug, Clone)]
pub struct WebDriverRenderer {
    webdriver_url: String,
    use_fallbacks: bool,
    user_agent: String,
    headless: bool,
    timeout: Duration,
    settle_delay: Duration,
    idle_window: Duration,
}

impl WebDriverRenderer {
    pub fn new(config: &PipelineConfig) -> Self {
        let default_url = PipelineConfig::default().webdriver_url;
        Self {
            use_fallbacks: config.webdriver_url == default_url,
            webdriver_url: config.webdriver_url.clone(),
            user_agent: config.user_agent.clone(),
            headless: config.headless,
            timeout: config.render_timeout(),
            settle_delay: config.settle_delay(),
            idle_window: config.network_idle(),
        }
    }

    /// Browser capabilities for Chrome and Firefox drivers alike
    fn capabilities(&self) -> Map<String, Value> {
        let mut chrome_args = vec![
            "--disable-gpu".to_string(),
            "--no-sandbox".to_string(),
            format!("--user-agent={}", self.user_agent),
        ];
        let mut firefox_args = Vec::new();
        if self.headless {
            chrome_args.push("--headless=new".to_string());
            firefox_args.push("-headless".to_string());
        }

        let caps = json!({
            "goog:chromeOptions": { "args": chrome_args },
            "moz:firefoxOptions": {
                "args": firefox_args,
                "prefs": { "general.useragent.override": self.user_agent },
            },
        });

        match caps {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    async fn connect(&self) -> Result<BrowserSession, FetchError> {
        let caps = self.capabilities();

        let mut builder = ClientBuilder::native();
        builder.capabilities(caps.clone());
        let first_error = match builder.connect(&self.webdriver_url).await {
            Ok(client) => {
                ::log::debug!("Connected to WebDriver at {}", self.webdriver_url);
                return Ok(BrowserSession::new(client));
            }
            Err(e) => e.to_string(),
        };

        if self.use_fallbacks {
            for url in FALLBACK_WEBDRIVER_URLS {
                if *url == self.webdriver_url {
                    continue;
                }
                ::log::info!("Trying fallback WebDriver URL: {}", url);
                let mut builder = ClientBuilder::native();
                builder.capabilities(caps.clone());
                if let Ok(client) = builder.connect(url).await {
                    ::log::debug!("Connected to fallback WebDriver at {}", url);
                    return Ok(BrowserSession::new(client));
                }
            }
        }

        ::log::error!(
            "Failed to connect to WebDriver at {}: {}",
            self.webdriver_url,
            first_error
        );
        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(FetchError::Render(format!(
            "WebDriver unavailable at {}: {}",
            self.webdriver_url, first_error
        )))
    }

    /// Navigate, wait for the network to go quiet, let the DOM settle, serialize
    async fn capture(&self, client: &Client, url: &str) -> Result<String, FetchError> {
        client
            .update_timeouts(TimeoutConfiguration::new(None, Some(self.timeout), None))
            .await
            .map_err(|e| navigation_error(e, "configuring timeouts for", url))?;

        client
            .goto(url)
            .await
            .map_err(|e| navigation_error(e, "navigating to", url))?;

        self.wait_for_network_idle(client)
            .await
            .map_err(|e| navigation_error(e, "waiting for network idle on", url))?;

        sleep(self.settle_delay).await;

        client
            .source()
            .await
            .map_err(|e| navigation_error(e, "getting source for", url))
    }

    /// Returns once the document is complete and no new resources were
    /// requested for a whole idle window
    async fn wait_for_network_idle(&self, client: &Client) -> Result<(), CmdError> {
        let (_, mut previous) = network_snapshot(client).await?;
        loop {
            sleep(self.idle_window).await;
            let (ready, resources) = network_snapshot(client).await?;
            if ready && resources == previous {
                return Ok(());
            }
            previous = resources;
        }
    }
}

impl PageRenderer for WebDriverRenderer {
    async fn render(&self, url: &str) -> Result<String, FetchError> {
        ::log::info!("Rendering with headless browser: {}", url);

        let session = match timeout(self.timeout, self.connect()).await {
            Ok(session) => session?,
            Err(_) => {
                ::log::error!("Timeout starting browser session for: {}", url);
                return Err(FetchError::RenderTimeout(self.timeout));
            }
        };
        let bound = self.timeout + self.settle_delay;
        let outcome = timeout(bound, self.capture(session.client(), url)).await;
        session.release().await;

        match outcome {
            Ok(Ok(html)) => {
                ::log::info!("Rendered {} characters from {}", html.chars().count(), url);
                Ok(html)
            }
            Ok(Err(e)) => Err(e),
            Err(_) => {
                ::log::error!("Timeout rendering: {}", url);
                Err(FetchError::RenderTimeout(self.timeout))
            }
        }
    }
}

async fn network_snapshot(client: &Client) -> Result<(bool, u64), CmdError> {
    let value = client.execute(NETWORK_PROBE, Vec::new()).await?;
    let ready = value.get(0).and_then(Value::as_str) == Some("complete");
    let resources = value.get(1).and_then(Value::as_u64).unwrap_or(0);
    Ok((ready, resources))
}

fn navigation_error(error: CmdError, context: &str, url: &str) -> FetchError {
    ::log::error!("Failed {} {}: {}", context, url, error);
    FetchError::Render(format!("{} {}: {}", context, url, error))
}

/// One browser session; closed by `release`, or in the background if dropped
/// without it (for example when the caller cancels the render).
struct BrowserSession {
    client: Client,
    released: bool,
}

impl BrowserSession {
    fn new(client: Client) -> Self {
        Self {
            client,
            released: false,
        }
    }

    fn client(&self) -> &Client {
        &self.client
    }

    async fn release(mut self) {
        self.released = true;
        if let Err(e) = self.client.clone().close().await {
            ::log::warn!("Failed to close browser session: {}", e);
        }
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        let client = self.client.clone();
        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            handle.spawn(async move {
                if let Err(e) = client.close().await {
                    ::log::warn!("Failed to close abandoned browser session: {}", e);
                }
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer(webdriver_url: &str, headless: bool) -> WebDriverRenderer {
        let config = PipelineConfig {
            webdriver_url: webdriver_url.to_string(),
            headless,
            user_agent: "TestAgent/1.0".to_string(),
            ..PipelineConfig::default()
        };
        WebDriverRenderer::new(&config)
    }

    #[test]
    fn test_capabilities_carry_user_agent_and_headless_flag() {
        let caps = renderer("http://localhost:4444", true).capabilities();

        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(chrome_args.contains(&json!("--headless=new")));
        assert!(chrome_args.contains(&json!("--user-agent=TestAgent/1.0")));
        assert_eq!(
            caps["moz:firefoxOptions"]["prefs"]["general.useragent.override"],
            json!("TestAgent/1.0")
        );

        let caps = renderer("http://localhost:4444", false).capabilities();
        let chrome_args = caps["goog:chromeOptions"]["args"].as_array().unwrap();
        assert!(!chrome_args.contains(&json!("--headless=new")));
    }

    #[test]
    fn test_fallbacks_only_for_default_endpoint() {
        assert!(renderer("http://localhost:4444", true).use_fallbacks);
        assert!(!renderer("http://grid.internal:4444", true).use_fallbacks);
    }

    #[test]
    fn test_timeouts_come_from_config() {
        let config = PipelineConfig {
            render_timeout_ms: 1_000,
            settle_delay_ms: 250,
            ..PipelineConfig::default()
        };
        let renderer = WebDriverRenderer::new(&config);
        assert_eq!(renderer.timeout, Duration::from_millis(1_000));
        assert_eq!(renderer.settle_delay, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_unreachable_webdriver_is_render_error() {
        let result = renderer("http://127.0.0.1:1", true)
            .render("https://example.com")
            .await;
        assert!(matches!(result, Err(FetchError::Render(_))));
    }

    #[tokio::test]
    async fn test_silent_webdriver_times_out() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                held.push(socket);
            }
        });

        let config = PipelineConfig {
            webdriver_url: format!("http://{}", addr),
            render_timeout_ms: 300,
            settle_delay_ms: 0,
            ..PipelineConfig::default()
        };
        let renderer = WebDriverRenderer::new(&config);

        let start = std::time::Instant::now();
        let result = timeout(Duration::from_secs(5), renderer.render("https://example.com"))
            .await
            .expect("render should give up on its own");

        assert_eq!(result, Err(FetchError::RenderTimeout(Duration::from_millis(300))));
        assert!(start.elapsed() < Duration::from_secs(2));
    }
}
