//! docweave command line
//!
//! | Command | Description |
//! |---------|-------------|
//! | `docweave snippets <path>` | List functions and classes with their spans and test locations |
//! | `docweave needed-tests <path>` | List tests that should exist but do not |
//! | `docweave document <path>` | Generate and inject missing docstrings |

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use docweave_core::{
    DocumentOptions, Engine, EngineConfig, OpenAiGenerator, ScriptedGenerator,
};
use docweave_rewrite::ExistingDocPolicy;
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Structural analysis and safe documentation rewriting for Python projects
#[derive(Parser, Debug)]
#[command(name = "docweave")]
#[command(version)]
struct Cli {
    /// Path to configuration file (default: docweave.toml in the current directory)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Project root used for module paths (default: nearest .git, .hg or pyproject.toml)
    #[arg(long, global = true)]
    project_root: Option<PathBuf>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List functions and classes below a path
    Snippets {
        /// File or directory
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// List tests that should exist but do not
    NeededTests {
        /// File or directory
        path: PathBuf,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Generate and inject missing docstrings
    Document {
        /// File or directory
        path: PathBuf,
        /// Validate rewrites without writing files
        #[arg(long)]
        dry_run: bool,
        /// Replace existing docstrings instead of skipping them
        #[arg(long)]
        replace: bool,
        /// Also document modules
        #[arg(long)]
        modules: bool,
        /// Answer every request with a fixed text instead of calling the endpoint
        #[arg(long, value_name = "PREFIX")]
        offline: Option<String>,
        /// Output the report as JSON
        #[arg(long)]
        json: bool,
    },
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("docweave=info"));
    let registry = Registry::default().with(filter);
    if json {
        registry.with(fmt::layer().json().with_writer(std::io::stderr)).init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

fn canonical(path: &Path) -> Result<PathBuf> {
    path.canonicalize()
        .with_context(|| format!("cannot resolve {}", path.display()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let cwd = std::env::current_dir().context("cannot read current directory")?;
    let mut config = EngineConfig::discover(cli.config.as_deref(), &cwd)?;
    if let Some(root) = &cli.project_root {
        config = config.with_project_root(canonical(root)?);
    }

    match cli.command {
        Command::Snippets { path, json } => {
            let engine = Engine::new(config);
            let snippets = engine.snippets(&canonical(&path)?).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snippets)?);
            } else {
                for snippet in &snippets {
                    match snippet.test_location() {
                        Some(location) => println!("{snippet} -> {location}"),
                        None => println!("{snippet}"),
                    }
                }
            }
        }
        Command::NeededTests { path, json } => {
            let engine = Engine::new(config);
            let rows = engine.needed_tests(&canonical(&path)?).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                for row in &rows {
                    println!(
                        "{}::{}  ({}:{} {})",
                        row.module_path,
                        row.identifier,
                        row.file.display(),
                        row.line,
                        row.qualified_path
                    );
                }
            }
        }
        Command::Document {
            path,
            dry_run,
            replace,
            modules,
            offline,
            json,
        } => {
            if replace {
                config = config.with_existing_doc_policy(ExistingDocPolicy::Replace);
            }
            let options = DocumentOptions {
                dry_run,
                include_modules: modules,
            };
            let target = canonical(&path)?;
            let engine = Engine::new(config.clone());

            let report = match offline {
                Some(prefix) => {
                    let generator = ScriptedGenerator::new().with_fallback(prefix);
                    engine.document(&target, &generator, options).await?
                }
                None => {
                    let generator = OpenAiGenerator::from_env(config.generator.clone())?;
                    engine.document(&target, &generator, options).await?
                }
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                for entry in &report.documented {
                    println!("documented {}: {}", entry.key, entry.detail);
                }
                for entry in &report.failed {
                    println!("failed     {}: {}", entry.key, entry.detail);
                }
                let verb = if report.dry_run { "would rewrite" } else { "rewrote" };
                println!(
                    "{verb} {} file(s); {} documented, {} skipped, {} failed",
                    report.rewrites.len(),
                    report.documented.len(),
                    report.skipped.len(),
                    report.failed.len()
                );
            }
            if !report.is_clean() {
                std::process::exit(2);
            }
        }
    }
    Ok(())
}
