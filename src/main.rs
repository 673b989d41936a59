use chrono::Utc;
use clap::{Parser, Subcommand};
use fbs::logging::init_logging;
use fbs::metrics::{extract_metrics, MetricSet};
use fbs::migrate::migrate_num_characters;
use fbs::prelude::*;
use std::path::{Path, PathBuf};

/// Static site generator for parsed legislative bill analyses
#[derive(Parser, Debug)]
#[command(name = "fbs")]
#[command(about = "Compute bill statistics and render the bill site")]
#[command(version)]
struct Args {
    /// YAML configuration file (default: none)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Statistics file (default: $HOME/.cache/fbs/stats.json)
    #[arg(long = "stats-path", global = true)]
    stats_path: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate index pages, sitemap.xml, robots.txt and index.json
    BuildSite {
        /// Bills cache directory (default: $HOME/.cache/fbs/bills)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Template directory (default: templates)
        #[arg(long = "template-dir")]
        template_dir: Option<PathBuf>,

        /// Output directory (default: dist)
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
    },

    /// Compute corpus statistics and write the statistics file
    CalculateStats {
        /// Bills cache directory (default: $HOME/.cache/fbs/bills)
        #[arg(long)]
        path: Option<PathBuf>,
    },

    /// Render one bill file to HTML, PDF and JSON
    RenderBill {
        /// Path to the bill file (plain or gzip JSON)
        input_file: PathBuf,

        /// Template directory (default: templates)
        #[arg(long = "template-dir")]
        template_dir: Option<PathBuf>,

        /// Output directory (default: dist)
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
    },

    /// Render every bill in the cache directory
    RenderAllBills {
        /// Bills cache directory (default: $HOME/.cache/fbs/bills)
        #[arg(long)]
        path: Option<PathBuf>,

        /// Template directory (default: templates)
        #[arg(long = "template-dir")]
        template_dir: Option<PathBuf>,

        /// Output directory (default: dist)
        #[arg(long = "output-dir")]
        output_dir: Option<PathBuf>,
    },

    /// Add num_characters to bills and sections that lack it
    MigrateNumCharacters {
        /// Bills cache directory (default: $HOME/.cache/fbs/bills)
        #[arg(long)]
        path: Option<PathBuf>,
    },
}

fn print_available_commands() {
    println!("Available commands:");
    println!("  build-site              Generate index pages, sitemap.xml, robots.txt and index.json");
    println!("  calculate-stats         Compute corpus statistics");
    println!("  render-bill             Render one bill file to HTML, PDF and JSON");
    println!("  render-all-bills        Render every bill in the cache directory");
    println!("  migrate-num-characters  Add num_characters to bills that lack it");
}

/// Directory overrides shared by the subcommands
#[derive(Debug, Default)]
struct Overrides {
    path: Option<PathBuf>,
    template_dir: Option<PathBuf>,
    output_dir: Option<PathBuf>,
}

/// Resolve configuration: defaults, then the config file, then flags
fn build_config(args: &Args, overrides: Overrides) -> anyhow::Result<Config> {
    let mut builder = ConfigBuilder::from_home()?;

    if let Some(config_path) = &args.config {
        builder = builder.file(FileConfig::load(config_path)?);
    }
    if let Some(stats_path) = &args.stats_path {
        builder = builder.stats_path(stats_path);
    }
    if let Some(path) = overrides.path {
        builder = builder.bills_dir(path);
    }
    if let Some(dir) = overrides.template_dir {
        builder = builder.template_dir(dir);
    }
    if let Some(dir) = overrides.output_dir {
        builder = builder.output_dir(dir);
    }

    Ok(builder.build()?)
}

async fn run_calculate_stats(config: &Config) -> anyhow::Result<()> {
    tracing::info!("Loading bills from {}", config.bills_dir.display());
    let bills = BillCorpus::new(&config.bills_dir).load_all().await?;
    tracing::info!("Loaded {} bills", bills.len());

    let metrics: Vec<MetricSet> = bills.iter().map(extract_metrics).collect();
    let stats = BillStats::from_metrics(&metrics)?;
    stats.save(&config.stats_path)?;

    tracing::info!(
        "Wrote statistics for {} metrics over {} bills to {}",
        stats.metrics().len(),
        stats.corpus_size(),
        config.stats_path.display()
    );
    Ok(())
}

async fn run_build_site(config: &Config) -> anyhow::Result<()> {
    let templates = Templates::new(&config.template_dir)?;
    SiteBuilder::new(config, &templates).build(Utc::now()).await?;
    Ok(())
}

async fn run_render_bill(config: &Config, input_file: &Path) -> anyhow::Result<()> {
    let stats = BillStats::load(&config.stats_path)?;
    let templates = Templates::new(&config.template_dir)?;
    let renderer = BillRenderer::new(config, &stats, &templates);

    match renderer.render_file(input_file, Utc::now()).await {
        Ok(result) => {
            tracing::info!(
                "Rendered {} (html: {:?}, pdf: {:?}, json: {:?})",
                result.slug,
                result.html,
                result.pdf,
                result.json
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Error during conversion of {}: {}", input_file.display(), e);
            Err(e.into())
        }
    }
}

async fn run_render_all_bills(config: &Config) -> anyhow::Result<()> {
    let stats = BillStats::load(&config.stats_path)?;
    let templates = Templates::new(&config.template_dir)?;
    BillRenderer::new(config, &stats, &templates)
        .render_all(Utc::now())
        .await?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();
    let mut args = Args::parse();

    match args.command.take() {
        Some(Command::BuildSite {
            path,
            template_dir,
            output_dir,
        }) => {
            let config = build_config(
                &args,
                Overrides {
                    path,
                    template_dir,
                    output_dir,
                },
            )?;
            run_build_site(&config).await
        }
        Some(Command::CalculateStats { path }) => {
            let config = build_config(
                &args,
                Overrides {
                    path,
                    ..Overrides::default()
                },
            )?;
            run_calculate_stats(&config).await
        }
        Some(Command::RenderBill {
            input_file,
            template_dir,
            output_dir,
        }) => {
            let config = build_config(
                &args,
                Overrides {
                    template_dir,
                    output_dir,
                    ..Overrides::default()
                },
            )?;
            run_render_bill(&config, &input_file).await
        }
        Some(Command::RenderAllBills {
            path,
            template_dir,
            output_dir,
        }) => {
            let config = build_config(
                &args,
                Overrides {
                    path,
                    template_dir,
                    output_dir,
                },
            )?;
            run_render_all_bills(&config).await
        }
        Some(Command::MigrateNumCharacters { path }) => {
            let config = build_config(
                &args,
                Overrides {
                    path,
                    ..Overrides::default()
                },
            )?;
            migrate_num_characters(&config.bills_dir).await?;
            Ok(())
        }
        None => {
            print_available_commands();
            Ok(())
        }
    }
}
