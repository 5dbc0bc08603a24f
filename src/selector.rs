use crate::results::{LinkRecord, SectionKey};

/// Picks the links worth compiling and labels each with a section type.
///
/// Implementations may call a language model or use plain keywords; the
/// compiler accepts whatever types they produce.
pub trait LinkClassifier {
    fn classify(&self, links: &[String], base_url: &str, company_name: &str) -> Vec<LinkRecord>;
}

/// Substrings marking pages that never belong in a brochure
const EXCLUDED_FRAGMENTS: &[&str] = &[
    "privacy", "terms", "legal", "cookie", "login", "signin", "signup", "register", "cart",
    "checkout", "account", "pricing", "api", "docs", "documentation", "github",
];

/// Section types with the URL keywords that identify them, in priority order
const SECTION_KEYWORDS: &[(&str, &[&str])] = &[
    ("about", &["about", "acerca", "quienes", "who-we-are", "our-story", "company"]),
    ("careers", &["careers", "jobs", "trabajo", "empleo", "join", "hiring"]),
    ("customers", &["customers", "clientes", "case-studies", "casos", "success"]),
    ("team", &["team", "equipo", "leadership", "people", "leaders"]),
    ("products", &["products", "servicios", "services", "solutions", "platform"]),
    ("blog", &["blog", "news", "noticias", "articles"]),
    ("press", &["press", "prensa", "media", "newsroom"]),
    ("culture", &["culture", "cultura", "values", "valores", "mission", "vision"]),
];

/// Offline classifier matching URL keywords, one link per section type
#[derive(Debug, Clone)]
pub struct KeywordClassifier {
    scan_limit: usize,
    max_records: usize,
}

impl Default for KeywordClassifier {
    fn default() -> Self {
        Self {
            scan_limit: 80,
            max_records: 10,
        }
    }
}

impl KeywordClassifier {
    pub fn new(scan_limit: usize, max_records: usize) -> Self {
        Self {
            scan_limit,
            max_records,
        }
    }
}

impl LinkClassifier for KeywordClassifier {
    fn classify(&self, links: &[String], _base_url: &str, company_name: &str) -> Vec<LinkRecord> {
        let mut relevant: Vec<LinkRecord> = Vec::new();

        for link in links.iter().take(self.scan_limit) {
            if relevant.len() >= self.max_records {
                break;
            }

            let lower = link.to_lowercase();
            if EXCLUDED_FRAGMENTS.iter().any(|frag| lower.contains(frag)) {
                continue;
            }

            let matched = SECTION_KEYWORDS.iter().find(|(kind, keywords)| {
                !relevant.iter().any(|r| r.kind.as_str() == *kind)
                    && keywords.iter().any(|kw| lower.contains(kw))
            });

            if let Some((kind, _)) = matched {
                if let Ok(key) = SectionKey::new(*kind) {
                    relevant.push(LinkRecord::new(
                        link.clone(),
                        key,
                        format!("URL mentions {} content for {}", kind, company_name),
                    ));
                }
            }
        }

        ::log::info!("Keyword classifier selected {} links", relevant.len());
        relevant
    }
}
