use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::warn;

use recipe_corpus::config::Settings;
use recipe_corpus::crawl;
use recipe_corpus::fetch::Fetcher;
use recipe_corpus::parser::{self, Site};
use recipe_corpus::report::CorpusStats;
use recipe_corpus::{build_recipe, load_corpus, BuildContext, CorpusWriter, RawBlock, Recipe, ValidatedRecipe};

#[derive(Parser)]
#[command(name = "recipe_corpus", about = "Regional recipe crawler and corpus builder")]
struct Cli {
    /// TOML file replacing the built-in crawl sources
    #[arg(long, global = true)]
    sources: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List configured batches
    Sources,
    /// Fetch, extract and write batches
    Crawl {
        /// Only batches of this site
        #[arg(long, value_enum)]
        site: Option<Site>,
        /// Only the batch with this name
        #[arg(long)]
        batch: Option<String>,
        /// Max recipe pages to fetch per batch
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Extract recipes from a saved HTML page and print them
    Parse {
        #[arg(long, value_enum)]
        site: Site,
        /// Saved HTML page
        #[arg(long)]
        file: PathBuf,
        /// URL the page was fetched from
        #[arg(long)]
        url: String,
        /// Province for records that don't name one
        #[arg(long, default_value = "")]
        province: String,
    },
    /// Build and write a batch from a JSON array of raw records
    Normalize {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        province: String,
        #[arg(long)]
        source_url: String,
        /// Batch name (default: input file stem)
        #[arg(long)]
        batch: Option<String>,
    },
    /// Merge every batch artifact into one numbered file
    Aggregate {
        /// Output file (default: <output_dir>/corpus.json)
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Descriptive statistics over a corpus
    Report {
        /// Corpus file or directory of batch artifacts (default: output dir)
        #[arg(long)]
        input: Option<PathBuf>,
        /// Report file (default: <output_dir>/statistical_report.txt)
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let settings = Settings::load(cli.sources.as_deref())?;

    let result = match cli.command {
        Commands::Sources => {
            if settings.batches.is_empty() {
                println!("No batches configured.");
                return Ok(());
            }
            println!("{:<10} | {:<20} | {:<20} | {:>4}", "Site", "Batch", "Province", "URLs");
            println!("{}", "-".repeat(63));
            for b in &settings.batches {
                println!(
                    "{:<10} | {:<20} | {:<20} | {:>4}",
                    b.site.as_str(),
                    b.name,
                    b.province,
                    b.urls.len()
                );
            }
            println!("\n{} batches | output: {}", settings.batches.len(), settings.output_dir.display());
            Ok(())
        }
        Commands::Crawl { site, batch, limit } => {
            let selected = settings.select(site, batch.as_deref());
            if selected.is_empty() {
                println!("No matching batches. Run 'sources' to list them.");
                return Ok(());
            }
            let fetcher = Fetcher::from_settings(&settings)?;
            let writer = CorpusWriter::new(&settings.output_dir);
            for b in selected {
                println!("[{}] crawling {} configured URLs...", b.artifact_name(), b.urls.len());
                match crawl::crawl_batch(&fetcher, &writer, b, limit).await? {
                    Some(summary) => println!(
                        "Extracted {} recipes. Saved to {}",
                        summary.records,
                        summary.path.display()
                    ),
                    None => println!("[{}] nothing written.", b.artifact_name()),
                }
            }
            Ok(())
        }
        Commands::Parse { site, file, url, province } => {
            let html = std::fs::read_to_string(&file)
                .with_context(|| format!("reading {}", file.display()))?;
            let records = parser::process_page(site, &html, &url, &province);
            for r in records.iter().filter(|r| !r.concerns.is_empty()) {
                warn!(name = %r.recipe.name, concerns = ?r.tags(), "record has concerns");
            }
            let recipes: Vec<&Recipe> = records.iter().map(|r| &r.recipe).collect();
            println!("{}", serde_json::to_string_pretty(&recipes)?);
            Ok(())
        }
        Commands::Normalize { input, province, source_url, batch } => {
            let batch = match batch {
                Some(b) => b,
                None => input
                    .file_stem()
                    .and_then(|s| s.to_str())
                    .map(str::to_string)
                    .context("cannot derive a batch name from the input path; pass --batch")?,
            };
            let raws = read_raw_records(&input)?;
            let ctx = BuildContext::new(province, source_url);
            let records: Vec<ValidatedRecipe> = raws
                .iter()
                .map(|raw| ValidatedRecipe::new(build_recipe(raw, &ctx)))
                .collect();
            let summary = CorpusWriter::new(&settings.output_dir).write_batch(&batch, &records)?;
            println!("Extracted {} recipes. Saved to {}", summary.records, summary.path.display());
            Ok(())
        }
        Commands::Aggregate { out } => {
            let out = out.unwrap_or_else(|| settings.output_dir.join("corpus.json"));
            let n = CorpusWriter::new(&settings.output_dir).aggregate(&out)?;
            println!("Aggregated {} recipes into {}", n, out.display());
            Ok(())
        }
        Commands::Report { input, out } => {
            let input = input.unwrap_or_else(|| settings.output_dir.clone());
            let out = out.unwrap_or_else(|| settings.output_dir.join("statistical_report.txt"));
            write_report(&input, &out)
        }
    };

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    result
}

fn read_raw_records(path: &Path) -> Result<Vec<RawBlock>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let value: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    let Some(items) = value.as_array() else {
        bail!("{}: expected a JSON array of raw records", path.display());
    };
    items
        .iter()
        .enumerate()
        .map(|(i, v)| RawBlock::from_json(v).with_context(|| format!("record {} of {}", i, path.display())))
        .collect()
}

fn write_report(input: &Path, out: &Path) -> Result<()> {
    let recipes = load_corpus(input)?;
    if recipes.is_empty() {
        println!("No records found in {}.", input.display());
        return Ok(());
    }
    let text = CorpusStats::collect(&recipes).render(chrono::Local::now());
    if let Some(dir) = out.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }
    std::fs::write(out, &text).with_context(|| format!("writing {}", out.display()))?;
    println!("{}", text);
    println!("Report saved to {}", out.display());
    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
