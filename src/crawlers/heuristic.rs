use crate::parsers::html::collect_text;
use scraper::{Html, Selector};
use std::fmt;
use std::sync::LazyLock;

/// Pages shorter than this are assumed to be an application shell
pub const MIN_HTML_CHARS: usize = 1500;

/// A mount point with less visible text than this is considered empty
pub const MIN_MOUNT_TEXT_CHARS: usize = 50;

/// Phrases that only appear when a page wants scripts to run
pub const SCRIPT_REQUIRED_PHRASES: &[&str] = &[
    "please enable javascript",
    "requires javascript",
    "javascript is disabled",
    "loading...",
    "cargando...",
];

const MAX_ANCHORS_FOR_SCRIPT_HEAVY: usize = 5;
const MIN_SCRIPTS_FOR_SCRIPT_HEAVY: usize = 10;

static MOUNT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#root, #app").expect("valid mount selector"));
static ANCHOR_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("a[href]").expect("valid anchor selector"));
static SCRIPT_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("script").expect("valid script selector"));

/// The first signal that flagged a page as incomplete
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncompleteSignal {
    TooShort { chars: usize },
    EmptyMountPoint { id: String, text_chars: usize },
    ScriptRequiredPhrase(&'static str),
    ScriptHeavy { anchors: usize, scripts: usize },
}

impl fmt::Display for IncompleteSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IncompleteSignal::TooShort { chars } => {
                write!(f, "HTML is only {} characters", chars)
            }
            IncompleteSignal::EmptyMountPoint { id, text_chars } => {
                write!(f, "#{} holds only {} characters of text", id, text_chars)
            }
            IncompleteSignal::ScriptRequiredPhrase(phrase) => {
                write!(f, "page text contains {:?}", phrase)
            }
            IncompleteSignal::ScriptHeavy { anchors, scripts } => {
                write!(f, "{} links but {} scripts", anchors, scripts)
            }
        }
    }
}

/// Returns the reason `html` looks like it needs script execution, if any.
///
/// The checks are cheap and eager: a false positive costs one browser
/// render, a false negative costs content.
pub fn detect_incomplete(html: &str) -> Option<IncompleteSignal> {
    let chars = html.chars().count();
    if chars < MIN_HTML_CHARS {
        return Some(IncompleteSignal::TooShort { chars });
    }

    let doc = Html::parse_document(html);

    for mount in doc.select(&MOUNT_SELECTOR) {
        let text_chars: usize = mount.text().map(|t| t.trim().chars().count()).sum();
        if text_chars < MIN_MOUNT_TEXT_CHARS {
            let id = mount.value().id().unwrap_or_default().to_string();
            return Some(IncompleteSignal::EmptyMountPoint { id, text_chars });
        }
    }

    let visible = collect_text(&doc, &["script", "style", "template"], " ").to_lowercase();
    if let Some(phrase) = SCRIPT_REQUIRED_PHRASES
        .iter()
        .copied()
        .find(|phrase| visible.contains(phrase))
    {
        return Some(IncompleteSignal::ScriptRequiredPhrase(phrase));
    }

    let anchors = doc.select(&ANCHOR_SELECTOR).count();
    let scripts = doc.select(&SCRIPT_SELECTOR).count();
    if anchors < MAX_ANCHORS_FOR_SCRIPT_HEAVY && scripts > MIN_SCRIPTS_FOR_SCRIPT_HEAVY {
        return Some(IncompleteSignal::ScriptHeavy { anchors, scripts });
    }

    None
}

/// True when a browser render is likely to show content the static HTML lacks
pub fn is_incomplete(html: &str, url: &str) -> bool {
    match detect_incomplete(html) {
        Some(signal) => {
            ::log::warn!("Incomplete HTML for {}: {}", url, signal);
            true
        }
        None => {
            ::log::debug!("Static HTML for {} looks complete", url);
            false
        }
    }
}
