use regex::Regex;
use std::collections::HashSet;
use url::Url;

/// Binary, document and media files that never carry brochure text
const DENIED_EXTENSIONS: &str =
    r"(?i)\.(pdf|zip|docx?|xlsx?|pptx?|jpe?g|png|gif|mp4|avi|mp3|exe|dmg|apk)$";

/// Query strings that mark tracking or session noise
const TRACKING_QUERY: &str = r"(?i)utm_|session|token";

/// Resolve `link` against `base` and reduce it to its canonical form.
///
/// Fragments are dropped, empty queries are dropped, and trailing slashes are
/// removed from any path other than `/`. Garbage input yields a best-effort
/// string rather than an error; the filter decides what survives.
pub fn normalize_url(base: &str, link: &str) -> String {
    let resolved = match Url::parse(base) {
        Ok(base_url) => base_url.join(link.trim()),
        Err(_) => Url::parse(link.trim()),
    };

    match resolved {
        Ok(url) => canonicalize(url).to_string(),
        Err(_) => {
            // Nothing to resolve against, keep the text minus any fragment
            let trimmed = link.trim();
            match trimmed.split_once('#') {
                Some((head, _)) => head.to_string(),
                None => trimmed.to_string(),
            }
        }
    }
}

fn canonicalize(mut url: Url) -> Url {
    url.set_fragment(None);

    if url.query() == Some("") {
        url.set_query(None);
    }

    if !url.cannot_be_a_base() {
        let path = url.path();
        if path.len() > 1 && path.ends_with('/') {
            let trimmed = path.trim_end_matches('/');
            let trimmed = if trimmed.is_empty() { "/" } else { trimmed }.to_string();
            url.set_path(&trimmed);
        }
    }

    url
}

/// True when both URLs share exactly the same host and port.
///
/// `docs.example.com` and `example.com` are different sites here.
pub fn same_domain(base: &str, candidate: &str) -> bool {
    match (Url::parse(base), Url::parse(candidate)) {
        (Ok(base), Ok(candidate)) => {
            base.host_str().is_some()
                && base.host_str() == candidate.host_str()
                && base.port() == candidate.port()
        }
        _ => false,
    }
}

/// Domain, extension and tracking-parameter policy for links found on a site
#[derive(Debug)]
pub struct LinkFilter {
    denied_extensions: Regex,
    tracking_query: Regex,
    exclude_regexes: Vec<Regex>,
}

impl LinkFilter {
    /// Create a filter with extra exclusion patterns (matched against the full URL)
    pub fn new(exclude_patterns: &[String]) -> Result<Self, regex::Error> {
        let mut exclude_regexes = Vec::with_capacity(exclude_patterns.len());
        for pattern in exclude_patterns {
            exclude_regexes.push(Regex::new(pattern)?);
        }

        Ok(Self {
            denied_extensions: Regex::new(DENIED_EXTENSIONS)?,
            tracking_query: Regex::new(TRACKING_QUERY)?,
            exclude_regexes,
        })
    }

    /// Normalize, scope and deduplicate `links`, keeping first occurrences in order
    pub fn filter(&self, links: &[String], base: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut valid = Vec::new();

        for link in links {
            let normalized = normalize_url(base, link);

            if !same_domain(base, &normalized) {
                continue;
            }

            let Ok(mut url) = Url::parse(&normalized) else {
                continue;
            };

            if self.denied_extensions.is_match(url.path()) {
                ::log::debug!("Ignoring file link: {}", normalized);
                continue;
            }

            if url
                .query()
                .is_some_and(|query| self.tracking_query.is_match(query))
            {
                url.set_query(None);
            }
            let candidate = url.to_string();

            if self.exclude_regexes.iter().any(|re| re.is_match(&candidate)) {
                ::log::debug!("Link excluded by pattern: {}", candidate);
                continue;
            }

            if seen.insert(candidate.clone()) {
                valid.push(candidate);
            }
        }

        ::log::info!("Kept {} valid links out of {}", valid.len(), links.len());
        valid
    }
}

impl Default for LinkFilter {
    fn default() -> Self {
        Self::new(&[]).expect("built-in link patterns are valid")
    }
}
