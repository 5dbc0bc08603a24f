use crate::crawlers::{PageFetcher, PageRenderer, SmartScraper};
use crate::filter::normalize_url;
use crate::parsers;
use crate::results::{CompiledContents, LinkRecord, SectionKey};
use serde::Serialize;

/// Page counts for the end-of-run summary
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CompileReport {
    /// Selected pages scraped (landing excluded)
    pub attempted: usize,
    /// Selected pages that produced a section
    pub succeeded: usize,
    /// Selected pages that produced nothing
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct Compilation {
    pub contents: CompiledContents,
    pub report: CompileReport,
}

/// Merges the landing page and the classifier's picks into one section map.
///
/// Pages are scraped strictly in the given order, one at a time. A page that
/// cannot be retrieved is left out and counted and never aborts the run.
pub struct ContentCompiler<'a, F, R> {
    scraper: &'a SmartScraper<F, R>,
    max_chars: usize,
}

impl<'a, F: PageFetcher, R: PageRenderer> ContentCompiler<'a, F, R> {
    pub fn new(scraper: &'a SmartScraper<F, R>, max_chars: usize) -> Self {
        Self { scraper, max_chars }
    }

    /// Scrape one selected page and return its cleaned, bounded text
    pub async fn download_page_text(&self, url: &str) -> Option<String> {
        let result = self.scraper.smart_scrape(url, false).await;
        let html = result.html?;

        let text = parsers::clean_and_truncate(&html, self.max_chars);
        ::log::info!(
            "Downloaded {} characters from {} ({} method)",
            text.chars().count(),
            url,
            result.method
        );
        Some(text)
    }

    /// Builds the section map.
    ///
    /// The landing text is always stored under `landing`. At most
    /// `max_pages` records are taken in order; each successful page is stored
    /// under its type, suffixed `_1`, `_2`, ... on collision.
    pub async fn compile(
        &self,
        selected: &[LinkRecord],
        landing_html: &str,
        base_url: &str,
        max_pages: usize,
    ) -> Compilation {
        let mut contents = CompiledContents::new();
        let mut report = CompileReport::default();

        let landing_text = parsers::clean_and_truncate(landing_html, self.max_chars);
        ::log::info!("Landing page: {} characters", landing_text.chars().count());
        contents.insert_unique(SectionKey::landing(), landing_text);

        let pages = &selected[..selected.len().min(max_pages)];
        ::log::info!("Downloading {} additional pages", pages.len());

        for (i, record) in pages.iter().enumerate() {
            let url = normalize_url(base_url, &record.url);
            ::log::info!("[{}/{}] {} ({})", i + 1, pages.len(), url, record.kind);
            report.attempted += 1;

            match self.download_page_text(&url).await {
                Some(text) if !text.trim().is_empty() => {
                    let key = contents.insert_unique(record.kind.clone(), text);
                    report.succeeded += 1;
                    ::log::info!("Stored {} as {}", url, key);
                }
                Some(_) => {
                    report.failed += 1;
                    ::log::warn!("No text extracted from {}", url);
                }
                None => {
                    report.failed += 1;
                    ::log::warn!("Failed to download {}", url);
                }
            }
        }

        ::log::info!(
            "Compiled {} sections: landing + {} additional, {} failed",
            contents.len(),
            report.succeeded,
            report.failed
        );

        Compilation { contents, report }
    }
}
