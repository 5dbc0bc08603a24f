pub mod cache;
pub mod compiler;
pub mod config;
pub mod crawlers;
pub mod error;
pub mod filter;
pub mod parsers;
pub mod pipeline;
pub mod results;
pub mod selector;
pub mod utils;

// Re-export commonly used types for convenience
pub use cache::ContentsCache;
pub use compiler::{CompileReport, Compilation, ContentCompiler};
pub use config::PipelineConfig;
pub use crawlers::SmartScraper;
pub use error::{FetchError, PipelineError};
pub use pipeline::{Pipeline, PipelineOutput};
pub use results::{CompiledContents, ContentStats, FetchMethod, LinkRecord, ScrapeResult, SectionKey};
pub use selector::{KeywordClassifier, LinkClassifier};
