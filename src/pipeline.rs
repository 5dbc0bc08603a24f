use crate::compiler::{Compilation, ContentCompiler};
use crate::config::PipelineConfig;
use crate::crawlers::{PageFetcher, PageRenderer, SmartScraper};
use crate::error::PipelineError;
use crate::filter::LinkFilter;
use crate::results::{FetchMethod, LinkRecord};
use crate::selector::LinkClassifier;
use crate::utils::{company_name_from_url, sanitize_company_name};
use std::path::Path;
use url::Url;

/// Everything one scrape run produced
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub company_name: String,
    pub landing_method: FetchMethod,
    /// Same-site links found on the landing page, after filtering
    pub candidate_links: Vec<String>,
    pub selected: Vec<LinkRecord>,
    pub compilation: Compilation,
}

/// Builder for one content-acquisition run against a seed URL
pub struct Pipeline {
    seed_url: String,
    company_name: Option<String>,
    config: PipelineConfig,
    force_dynamic: bool,
}

impl Pipeline {
    pub fn new(seed_url: impl Into<String>) -> Self {
        Self {
            seed_url: seed_url.into(),
            company_name: None,
            config: PipelineConfig::default(),
            force_dynamic: false,
        }
    }

    pub fn with_company(mut self, name: impl Into<String>) -> Self {
        self.company_name = Some(name.into());
        self
    }

    pub fn with_config(mut self, config: PipelineConfig) -> Self {
        self.config = config;
        self
    }

    /// Load configuration from a JSON file
    pub fn with_config_file(
        self,
        path: impl AsRef<Path>,
    ) -> Result<Self, Box<dyn std::error::Error>> {
        let config = PipelineConfig::from_file(path)?;
        Ok(self.with_config(config))
    }

    pub fn with_max_pages(mut self, max_pages: usize) -> Self {
        self.config.max_pages = max_pages;
        self
    }

    /// Render the landing page in the browser without trying a static fetch
    pub fn with_force_dynamic(mut self, force_dynamic: bool) -> Self {
        self.force_dynamic = force_dynamic;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Explicit company name, or one derived from the seed URL's host when
    /// the explicit one is missing or unusable as a file name
    pub fn company_name(&self) -> String {
        self.company_name
            .clone()
            .filter(|name| !sanitize_company_name(name).is_empty())
            .or_else(|| company_name_from_url(&self.seed_url))
            .unwrap_or_else(|| self.seed_url.clone())
    }

    /// Run with the HTTP fetcher and WebDriver renderer described by the config
    pub async fn run<C: LinkClassifier>(
        &self,
        classifier: &C,
    ) -> Result<PipelineOutput, PipelineError> {
        let scraper = SmartScraper::from_config(&self.config)?;
        self.run_with(&scraper, classifier).await
    }

    /// Scrape the landing page, pick links, and compile their contents.
    ///
    /// Fails only when the seed URL is invalid or the landing page cannot be
    /// retrieved by either tier; every other page failure is absorbed.
    pub async fn run_with<F, R, C>(
        &self,
        scraper: &SmartScraper<F, R>,
        classifier: &C,
    ) -> Result<PipelineOutput, PipelineError>
    where
        F: PageFetcher,
        R: PageRenderer,
        C: LinkClassifier,
    {
        Url::parse(&self.seed_url).map_err(|source| PipelineError::InvalidSeedUrl {
            url: self.seed_url.clone(),
            source,
        })?;
        let link_filter = LinkFilter::new(&self.config.exclude_patterns)?;
        let company_name = self.company_name();

        ::log::info!("Scraping landing page of {}: {}", company_name, self.seed_url);
        let landing = scraper
            .smart_scrape(&self.seed_url, self.force_dynamic)
            .await;
        let Some(landing_html) = landing.html else {
            return Err(PipelineError::LandingUnavailable(self.seed_url.clone()));
        };
        ::log::info!(
            "Landing page: {} characters, {} links ({} method)",
            landing_html.chars().count(),
            landing.links.len(),
            landing.method
        );

        let candidate_links = link_filter.filter(&landing.links, &self.seed_url);
        let selected = classifier.classify(&candidate_links, &self.seed_url, &company_name);
        ::log::info!("{} links selected for compilation", selected.len());

        let compiler = ContentCompiler::new(scraper, self.config.max_chars);
        let compilation = compiler
            .compile(
                &selected,
                &landing_html,
                &self.seed_url,
                self.config.max_pages,
            )
            .await;

        Ok(PipelineOutput {
            company_name,
            landing_method: landing.method,
            candidate_links,
            selected,
            compilation,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawlers::web::tests::{FakeTier, complete_page, rendered_page, spa_shell};
    use crate::results::SectionKey;
    use crate::selector::KeywordClassifier;
    use std::time::Duration;

    fn landing_html() -> String {
        let links = [
            "/about",
            "/about#team",
            "/careers?utm_source=home",
            "/brochure.pdf",
            "https://docs.acme.com/guide",
            "mailto:hello@acme.com",
            "/privacy",
        ]
        .iter()
        .map(|href| format!(r#"<a href="{}">link</a>"#, href))
        .collect::<String>();
        complete_page(0, 1800).replace("</body>", &format!("{}</body>", links))
    }

    /// Classifier that returns fixed records regardless of input
    struct FixedClassifier(Vec<LinkRecord>);

    impl LinkClassifier for FixedClassifier {
        fn classify(&self, _: &[String], _: &str, _: &str) -> Vec<LinkRecord> {
            self.0.clone()
        }
    }

    #[tokio::test]
    async fn test_end_to_end_with_keyword_classifier() {
        let static_tier = FakeTier::default()
            .with_page("https://acme.com", &landing_html())
            .with_page("https://acme.com/about", &complete_page(10, 2000))
            .with_page("https://acme.com/careers", &spa_shell());
        let dynamic_tier = FakeTier::default().with_page("https://acme.com/careers", &rendered_page());
        let scraper = SmartScraper::new(static_tier, dynamic_tier, Duration::ZERO);

        let output = Pipeline::new("https://acme.com")
            .run_with(&scraper, &KeywordClassifier::default())
            .await
            .unwrap();

        assert_eq!(output.company_name, "Acme");
        assert_eq!(output.landing_method, FetchMethod::Static);
        assert_eq!(
            output.candidate_links,
            vec![
                "https://acme.com/about",
                "https://acme.com/careers",
                "https://acme.com/privacy",
            ]
        );
        assert_eq!(output.selected.len(), 2);

        let keys: Vec<&str> = output.compilation.contents.keys().map(|k| k.as_str()).collect();
        assert_eq!(keys, vec!["landing", "about", "careers"]);
        assert!(output
            .compilation
            .contents
            .get("careers")
            .unwrap()
            .contains("Rendered content."));
        assert_eq!(output.compilation.report.failed, 0);
    }

    #[tokio::test]
    async fn test_spa_landing_is_rendered() {
        let static_tier = FakeTier::default().with_page("https://acme.com", &spa_shell());
        let dynamic_tier = FakeTier::default().with_page("https://acme.com", &rendered_page());
        let scraper = SmartScraper::new(static_tier, dynamic_tier, Duration::ZERO);

        let output = Pipeline::new("https://acme.com")
            .with_company("Acme Rockets")
            .run_with(&scraper, &FixedClassifier(Vec::new()))
            .await
            .unwrap();

        assert_eq!(output.company_name, "Acme Rockets");
        assert_eq!(output.landing_method, FetchMethod::Dynamic);
        assert!(output
            .compilation
            .contents
            .get(SectionKey::LANDING)
            .unwrap()
            .contains("Rendered content."));
    }

    #[tokio::test]
    async fn test_unreachable_landing_is_fatal() {
        let scraper = SmartScraper::new(FakeTier::default(), FakeTier::default(), Duration::ZERO);
        let result = Pipeline::new("https://acme.com")
            .run_with(&scraper, &KeywordClassifier::default())
            .await;

        assert!(matches!(result, Err(PipelineError::LandingUnavailable(url)) if url == "https://acme.com"));
    }

    #[tokio::test]
    async fn test_invalid_seed_url() {
        let scraper = SmartScraper::new(FakeTier::default(), FakeTier::default(), Duration::ZERO);
        let result = Pipeline::new("acme dot com")
            .run_with(&scraper, &KeywordClassifier::default())
            .await;

        assert!(matches!(result, Err(PipelineError::InvalidSeedUrl { .. })));
        assert!(scraper.fetcher().calls().is_empty());
    }

    #[tokio::test]
    async fn test_max_pages_and_failures_flow_through() {
        let static_tier = FakeTier::default()
            .with_page("https://acme.com", &complete_page(20, 1800))
            .with_page("https://acme.com/a", &complete_page(10, 2000));
        let scraper = SmartScraper::new(static_tier, FakeTier::default(), Duration::ZERO);
        let classifier = FixedClassifier(vec![
            LinkRecord::new("https://acme.com/a", SectionKey::new("about").unwrap(), ""),
            LinkRecord::new("https://acme.com/b", SectionKey::new("team").unwrap(), ""),
            LinkRecord::new("https://acme.com/c", SectionKey::new("press").unwrap(), ""),
        ]);

        let output = Pipeline::new("https://acme.com")
            .with_max_pages(2)
            .run_with(&scraper, &classifier)
            .await
            .unwrap();

        assert_eq!(output.compilation.report.attempted, 2);
        assert_eq!(output.compilation.report.succeeded, 1);
        assert_eq!(output.compilation.report.failed, 1);
        assert_eq!(output.compilation.contents.len(), 2);
    }

    #[test]
    fn test_company_name_fallbacks() {
        assert_eq!(Pipeline::new("https://www.acme.io").company_name(), "Acme");
        assert_eq!(Pipeline::new("nonsense").company_name(), "nonsense");
        assert_eq!(
            Pipeline::new("https://acme.com").with_company("///").company_name(),
            "Acme"
        );
        assert_eq!(
            Pipeline::new("https://acme.com").with_company("Acme Rockets").company_name(),
            "Acme Rockets"
        );
    }
}
