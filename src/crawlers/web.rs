use crate::config::PipelineConfig;
use crate::crawlers::crawler::{PageFetcher, PageRenderer};
use crate::crawlers::fetcher::HttpFetcher;
use crate::crawlers::heuristic;
use crate::crawlers::renderer::WebDriverRenderer;
use crate::parsers;
use crate::results::{FetchMethod, ScrapeResult};
use std::time::Duration;

/// Static-first scraper that escalates to a browser render when the static
/// HTML is missing or looks like an unrendered application shell.
pub struct SmartScraper<F, R> {
    fetcher: F,
    renderer: R,
    rate_limit: Duration,
}

impl SmartScraper<HttpFetcher, WebDriverRenderer> {
    /// Scraper with the real HTTP fetcher and WebDriver renderer
    pub fn from_config(config: &PipelineConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpFetcher::new(config)?,
            WebDriverRenderer::new(config),
            config.rate_limit_delay(),
        ))
    }
}

impl<F: PageFetcher, R: PageRenderer> SmartScraper<F, R> {
    pub fn new(fetcher: F, renderer: R, rate_limit: Duration) -> Self {
        Self {
            fetcher,
            renderer,
            rate_limit,
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// Scrapes `url` with the cheapest tier that yields usable HTML.
    ///
    /// Sleeps for the rate-limit delay first, unconditionally. With
    /// `force_dynamic` the static tier is skipped. A failed or incomplete
    /// static fetch falls back to the renderer; the static HTML is discarded.
    pub async fn smart_scrape(&self, url: &str, force_dynamic: bool) -> ScrapeResult {
        if !self.rate_limit.is_zero() {
            tokio::time::sleep(self.rate_limit).await;
        }

        let (html, method) = if force_dynamic {
            ::log::info!("Dynamic rendering forced for {}", url);
            (self.render(url).await, FetchMethod::Dynamic)
        } else {
            match self.fetcher.fetch(url).await {
                Err(e) => {
                    ::log::warn!(
                        "Static fetch of {} failed ({}: {}), trying dynamic rendering",
                        url,
                        e.category(),
                        e
                    );
                    (self.render(url).await, FetchMethod::Dynamic)
                }
                Ok(html) if heuristic::is_incomplete(&html, url) => {
                    ::log::warn!("Static HTML of {} is incomplete, switching to dynamic", url);
                    (self.render(url).await, FetchMethod::Dynamic)
                }
                Ok(html) => (Some(html), FetchMethod::Static),
            }
        };

        let links = match &html {
            Some(html) => parsers::extract_links(html),
            None => Vec::new(),
        };

        match &html {
            Some(_) => ::log::info!("Scraped {} using {} method", url, method),
            None => ::log::error!("Failed to scrape {} by any method", url),
        }

        ScrapeResult {
            url: url.to_string(),
            html,
            links,
            method,
        }
    }

    async fn render(&self, url: &str) -> Option<String> {
        match self.renderer.render(url).await {
            Ok(html) => Some(html),
            Err(e) => {
                ::log::error!("Dynamic render of {} failed ({}: {})", url, e.category(), e);
                None
            }
        }
    }
}
