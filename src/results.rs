use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// How the HTML for a page was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchMethod {
    /// Plain HTTP GET, no script execution
    Static,
    /// Headless browser render
    Dynamic,
}

impl fmt::Display for FetchMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchMethod::Static => f.write_str("static"),
            FetchMethod::Dynamic => f.write_str("dynamic"),
        }
    }
}

/// Outcome of one smart scrape
#[derive(Debug, Clone)]
pub struct ScrapeResult {
    /// URL that was requested
    pub url: String,

    /// HTML of the page, `None` when neither tier produced any
    pub html: Option<String>,

    /// Raw anchor targets found in the HTML
    pub links: Vec<String>,

    /// Tier that produced (or last attempted to produce) the HTML
    pub method: FetchMethod,
}

impl ScrapeResult {
    pub fn is_success(&self) -> bool {
        self.html.is_some()
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("invalid section key {0:?}")]
pub struct InvalidSectionKey(pub String);

/// Brochure content category such as `about` or `careers`
///
/// Open-ended: any non-blank tag a classifier produces is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SectionKey(String);

impl SectionKey {
    /// Reserved key for the entry page
    pub const LANDING: &'static str = "landing";

    pub fn new(key: impl Into<String>) -> Result<Self, InvalidSectionKey> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() || trimmed.chars().any(char::is_control) {
            return Err(InvalidSectionKey(key));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn landing() -> Self {
        Self(Self::LANDING.to_string())
    }

    pub fn is_landing(&self) -> bool {
        self.0 == Self::LANDING
    }

    /// `about` -> `about_2`
    pub fn with_suffix(&self, n: usize) -> Self {
        Self(format!("{}_{}", self.0, n))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SectionKey {
    type Error = InvalidSectionKey;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<SectionKey> for String {
    fn from(key: SectionKey) -> Self {
        key.0
    }
}

impl fmt::Display for SectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A link picked by a classifier for compilation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    pub url: String,
    #[serde(rename = "type")]
    pub kind: SectionKey,
    #[serde(default)]
    pub reason: String,
}

impl LinkRecord {
    pub fn new(url: impl Into<String>, kind: SectionKey, reason: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind,
            reason: reason.into(),
        }
    }
}

/// Ordered section map handed to brochure drafting
///
/// Serializes as a JSON object whose key order is insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledContents {
    sections: Vec<(SectionKey, String)>,
}

impl CompiledContents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains_key(&self, key: &SectionKey) -> bool {
        self.sections.iter().any(|(k, _)| k == key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.sections
            .iter()
            .find(|(k, _)| k.as_str() == key)
            .map(|(_, text)| text.as_str())
    }

    /// Insert under `key`, or under the first free `key_N` if it is taken.
    /// Returns the key actually used.
    pub fn insert_unique(&mut self, key: SectionKey, text: String) -> SectionKey {
        let mut candidate = key.clone();
        let mut counter = 1;
        while self.contains_key(&candidate) {
            candidate = key.with_suffix(counter);
            counter += 1;
        }
        self.sections.push((candidate.clone(), text));
        candidate
    }

    pub fn keys(&self) -> impl Iterator<Item = &SectionKey> {
        self.sections.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SectionKey, &str)> {
        self.sections.iter().map(|(k, text)| (k, text.as_str()))
    }

    pub fn len(&self) -> usize {
        self.sections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }

    pub fn stats(&self) -> ContentStats {
        ContentStats::from_contents(self)
    }
}

impl Serialize for CompiledContents {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.sections.len()))?;
        for (key, text) in &self.sections {
            map.serialize_entry(key.as_str(), text)?;
        }
        map.end()
    }
}

struct ContentsVisitor;

impl<'de> Visitor<'de> for ContentsVisitor {
    type Value = CompiledContents;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a map of section keys to text")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
        let mut contents = CompiledContents::new();
        while let Some((key, text)) = access.next_entry::<SectionKey, String>()? {
            if contents.contains_key(&key) {
                return Err(serde::de::Error::custom(format!(
                    "duplicate section key {}",
                    key
                )));
            }
            contents.sections.push((key, text));
        }
        Ok(contents)
    }
}

impl<'de> Deserialize<'de> for CompiledContents {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(ContentsVisitor)
    }
}

/// Size figures for one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionStats {
    pub key: String,
    pub characters: usize,
    pub words: usize,
    pub lines: usize,
}

impl SectionStats {
    fn measure(key: &SectionKey, text: &str) -> Self {
        Self {
            key: key.to_string(),
            characters: text.chars().count(),
            words: text.split_whitespace().count(),
            lines: text.split('\n').count(),
        }
    }
}

/// Per-section and aggregate size figures, for reporting only
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentStats {
    pub total_sections: usize,
    pub total_characters: usize,
    pub total_words: usize,
    pub total_lines: usize,
    pub sections: Vec<SectionStats>,
}

impl ContentStats {
    pub fn from_contents(contents: &CompiledContents) -> Self {
        let sections: Vec<SectionStats> = contents
            .iter()
            .map(|(key, text)| SectionStats::measure(key, text))
            .collect();

        Self {
            total_sections: sections.len(),
            total_characters: sections.iter().map(|s| s.characters).sum(),
            total_words: sections.iter().map(|s| s.words).sum(),
            total_lines: sections.iter().map(|s| s.lines).sum(),
            sections,
        }
    }
}
