use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "brochure-scrape")]
#[command(about = "Collects the text of a company website for brochure generation")]
#[command(version)]
pub struct Args {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape a website and cache its compiled contents
    Scrape {
        /// Landing page URL of the company website
        url: String,

        /// Company name (derived from the URL when omitted)
        #[arg(short, long)]
        company: Option<String>,

        /// Maximum number of additional pages to compile
        #[arg(short, long, value_parser = clap::value_parser!(u64).range(1..))]
        max_pages: Option<u64>,

        /// JSON configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Directory for the compiled contents cache
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Render the landing page in the browser without trying a static fetch
        #[arg(long)]
        force_dynamic: bool,
    },

    /// Print statistics for previously compiled contents
    Stats {
        /// Company name used when the contents were scraped
        #[arg(short, long)]
        company: String,

        /// Directory holding the compiled contents cache
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
    },
}
