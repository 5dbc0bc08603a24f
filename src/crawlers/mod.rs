pub mod crawler;
pub mod fetcher;
pub mod heuristic;
pub mod renderer;
pub mod web;

pub use crawler::{PageFetcher, PageRenderer};
pub use fetcher::HttpFetcher;
pub use heuristic::{detect_incomplete, is_incomplete};
pub use renderer::WebDriverRenderer;
pub use web::SmartScraper;
