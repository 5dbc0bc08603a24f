use brochure_scrape::{
    ContentStats, ContentsCache, KeywordClassifier, Pipeline, PipelineConfig, PipelineOutput,
};
use clap::Parser;
use env_logger::Env;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

mod args;
use args::{Args, Command};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    let outcome = match args.command {
        Command::Scrape {
            url,
            company,
            max_pages,
            config,
            output_dir,
            force_dynamic,
        } => {
            scrape(
                url,
                company,
                max_pages,
                config,
                output_dir,
                force_dynamic,
            )
            .await
        }
        Command::Stats {
            company,
            output_dir,
        } => stats(&company, output_dir),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            ::log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn load_config(path: Option<PathBuf>) -> Result<PipelineConfig, Box<dyn Error>> {
    let mut config = match path {
        Some(path) => PipelineConfig::from_file(path)?,
        None => PipelineConfig::default(),
    };
    config.apply_env_overrides();
    Ok(config)
}

async fn scrape(
    url: String,
    company: Option<String>,
    max_pages: Option<u64>,
    config_path: Option<PathBuf>,
    output_dir: Option<PathBuf>,
    force_dynamic: bool,
) -> Result<(), Box<dyn Error>> {
    let mut config = load_config(config_path)?;
    if let Some(max_pages) = max_pages {
        config.max_pages = usize::try_from(max_pages)?;
    }
    if let Some(output_dir) = output_dir {
        config.output_dir = output_dir;
    }

    println!("Note: dynamic rendering requires a WebDriver server (e.g., ChromeDriver).");
    println!("Set WEBDRIVER_URL if not using {}", config.webdriver_url);

    let cache = ContentsCache::new(&config.output_dir);
    let mut pipeline = Pipeline::new(url)
        .with_config(config)
        .with_force_dynamic(force_dynamic);
    if let Some(company) = company {
        pipeline = pipeline.with_company(company);
    }

    let start_time = std::time::Instant::now();
    let output = pipeline.run(&KeywordClassifier::default()).await?;
    let path = cache.save(&output.compilation.contents, &output.company_name)?;

    print_summary(&output);
    println!("Saved to {}", path.display());
    ::log::info!(
        "Scrape complete in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}

fn stats(company: &str, output_dir: Option<PathBuf>) -> Result<(), Box<dyn Error>> {
    let config = load_config(None)?;
    let cache = ContentsCache::new(output_dir.unwrap_or(config.output_dir));

    match cache.load(company)? {
        Some(contents) => {
            print_stats(&contents.stats());
            Ok(())
        }
        None => Err(format!(
            "no compiled contents for {} at {}",
            company,
            cache.path_for(company)?.display()
        )
        .into()),
    }
}

fn print_summary(output: &PipelineOutput) {
    let report = &output.compilation.report;

    println!();
    println!("Company: {}", output.company_name);
    println!("Landing page fetched with {} method", output.landing_method);
    println!("Candidate links: {}", output.candidate_links.len());
    for record in &output.selected {
        println!("  [{}] {}", record.kind, record.url);
    }
    println!(
        "Sections: landing + {} additional ({} attempted, {} failed)",
        report.succeeded, report.attempted, report.failed
    );
    print_stats(&output.compilation.contents.stats());
}

fn print_stats(stats: &ContentStats) {
    println!();
    println!("{:<24} {:>10} {:>8} {:>6}", "section", "chars", "words", "lines");
    for section in &stats.sections {
        println!(
            "{:<24} {:>10} {:>8} {:>6}",
            section.key, section.characters, section.words, section.lines
        );
    }
    println!(
        "{:<24} {:>10} {:>8} {:>6}",
        format!("total ({})", stats.total_sections),
        stats.total_characters,
        stats.total_words,
        stats.total_lines
    );
}
