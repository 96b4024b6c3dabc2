use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ignore::WalkBuilder;
use pathdex::index::{IndexReader, IndexWriter, stats};
use pathdex::output::{OutputFormat, print_entries};
use pathdex::query::{IndexSearcher, SearchOptions};
use pathdex::utils::{AppConfig, get_config_path, resolve_index_dir};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pathdex")]
#[command(about = "Keyword index over file paths with fast AND search")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Index storage directory (overrides the config file)
    #[arg(long, global = true)]
    index_dir: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files (directories are walked recursively) to the index
    Index {
        /// Files or directories to index
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Extra keyword attached to every file (repeatable)
        #[arg(short, long = "tag")]
        tags: Vec<String>,
    },
    /// Remove files (directories are walked recursively) from the index
    Remove {
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// List entries with a keyword containing the given text
    Lookup {
        keyword: String,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Find entries matching every word of the pattern
    Search {
        #[arg(required = true)]
        pattern: Vec<String>,

        /// Drop entries with a keyword containing this text (repeatable)
        #[arg(short = 'x', long = "exclude")]
        exclude: Vec<String>,

        /// Maximum number of results (0 = unbounded)
        #[arg(short, long)]
        max_results: Option<usize>,

        #[command(flatten)]
        display: DisplayArgs,
    },
    /// Show index statistics
    Stats,
    /// Show the configuration file location and effective settings
    Config,
}

#[derive(clap::Args)]
struct DisplayArgs {
    /// Print one JSON object per entry
    #[arg(long)]
    json: bool,

    /// Colorize paths
    #[arg(long)]
    color: bool,

    /// Show each entry's keywords
    #[arg(short, long)]
    keywords: bool,
}

impl DisplayArgs {
    fn print(&self, entries: &[pathdex::IndexEntry]) -> Result<()> {
        let format = if self.json {
            OutputFormat::JsonLines
        } else {
            OutputFormat::Plain
        };
        print_entries(entries, format, self.color, self.keywords)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();

    let config = AppConfig::load().context("Failed to load config")?;
    let index_dir = resolve_index_dir(cli.index_dir.as_deref(), &config)?;

    match cli.command {
        Commands::Index { paths, tags } => {
            let mut tags = tags;
            tags.extend(config.tags.iter().cloned());

            let mut writer = IndexWriter::open(&index_dir)
                .with_context(|| format!("Failed to open index at {}", index_dir.display()))?;
            for path in &paths {
                writer.include_all(walk_files(path)?, &tags)?;
            }
            report_flush(writer.write()?);
        }
        Commands::Remove { paths } => {
            let mut writer = IndexWriter::open(&index_dir)
                .with_context(|| format!("Failed to open index at {}", index_dir.display()))?;
            for path in &paths {
                if path.is_dir() {
                    writer.exclude_all(walk_files(path)?)?;
                } else {
                    writer.exclude(path)?;
                }
            }
            report_flush(writer.write()?);
        }
        Commands::Lookup { keyword, display } => {
            let reader = open_reader(&index_dir)?;
            let entries = reader.read_by_keyword(&keyword)?;
            display.print(&entries)?;
        }
        Commands::Search {
            pattern,
            exclude,
            max_results,
            display,
        } => {
            let reader = open_reader(&index_dir)?;
            let searcher = IndexSearcher::new(&reader);
            let options = SearchOptions::new()
                .exclude(config.exclude.iter().chain(exclude.iter()))
                .max_results(max_results.unwrap_or(config.max_results));
            let entries = searcher.search_with(&pattern.join(" "), &options)?;
            display.print(&entries)?;
        }
        Commands::Stats => {
            stats::show_stats(&index_dir)
                .with_context(|| format!("Failed to read index at {}", index_dir.display()))?;
        }
        Commands::Config => {
            println!("Config file:      {}", get_config_path()?.display());
            println!("Index location:   {}", index_dir.display());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn open_reader(index_dir: &Path) -> Result<IndexReader> {
    if !IndexReader::exists(index_dir) {
        anyhow::bail!(
            "No index found at {}. Run 'pathdex index <path>' first.",
            index_dir.display()
        );
    }
    IndexReader::open(index_dir)
        .with_context(|| format!("Failed to open index at {}", index_dir.display()))
}

/// Regular files under `path` (or `path` itself if it is not a directory)
fn walk_files(path: &Path) -> Result<Vec<PathBuf>> {
    if !path.is_dir() {
        return Ok(vec![path.to_path_buf()]);
    }

    let mut files = Vec::new();
    for entry in WalkBuilder::new(path).hidden(false).build() {
        let entry = entry.with_context(|| format!("Failed to walk {}", path.display()))?;
        if entry.file_type().is_some_and(|t| t.is_file()) {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

fn report_flush(summary: Option<pathdex::index::FlushSummary>) {
    match summary {
        Some(summary) => println!(
            "Index holds {} files under {} keywords",
            summary.entries, summary.keywords
        ),
        None => println!("Nothing to write"),
    }
}
