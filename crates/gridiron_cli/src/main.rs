//! Gridiron CLI
//!
//! Game feed JSON → game results
//! Game results JSON → season report

#[cfg(feature = "cli")]
use anyhow::Result;
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use std::path::{Path, PathBuf};
#[cfg(feature = "cli")]
use tracing_subscriber::EnvFilter;

#[cfg(feature = "cli")]
#[derive(Parser)]
#[command(name = "gridiron")]
#[command(about = "Classify play feeds and aggregate season statistics", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand)]
enum Commands {
    /// Track games from a feed file
    Game {
        /// Input JSON file (one game feed or an array of them)
        #[arg(long)]
        r#in: PathBuf,

        /// Output JSON file for the finalized games
        #[arg(long)]
        out: PathBuf,

        /// Rules file (JSON or YAML); defaults to GRIDIRON_RULES_PATH / GRIDIRON_RULES_PROFILE
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,
    },

    /// Aggregate finalized games into a season report
    Season {
        /// Season year
        #[arg(long)]
        season: u16,

        /// Output JSON file for the season report
        #[arg(long)]
        out: PathBuf,

        /// Output metadata JSON file
        #[arg(long)]
        metadata: Option<PathBuf>,

        /// Game result files
        #[arg(required = true)]
        results: Vec<PathBuf>,
    },
}

#[cfg(feature = "cli")]
fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Game { r#in, out, rules, metadata } => {
            println!("🏈 Tracking games...");
            println!("   Input:  {}", r#in.display());
            println!("   Output: {}", out.display());

            let rules = gridiron_cli::load_rules(rules.as_deref())?;
            let meta = gridiron_cli::run_game_file(&r#in, &out, &rules)?;

            println!("\n✅ Games tracked");
            println!("   Games:         {}", meta.games);
            println!("   Skipped plays: {}", meta.rejected);
            print_metadata(&meta);

            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }

        Commands::Season { season, out, metadata, results } => {
            println!("📊 Aggregating season {}...", season);
            println!("   Inputs: {}", results.len());
            println!("   Output: {}", out.display());

            let meta = gridiron_cli::run_season_files(season, &results, &out)?;

            println!("\n✅ Season aggregated");
            println!("   Games:    {}", meta.games);
            println!("   Rejected: {}", meta.rejected);
            print_metadata(&meta);

            if let Some(metadata_path) = metadata {
                save_metadata(&metadata_path, &meta)?;
            }
        }
    }

    Ok(())
}

#[cfg(feature = "cli")]
fn print_metadata(meta: &gridiron_cli::ReportMetadata) {
    println!(
        "   Size:     {} bytes ({:.2} KB)",
        meta.output_size,
        meta.output_size as f64 / 1024.0
    );
    println!("   Checksum: {}", meta.checksum);
    println!("   Created:  {}", meta.created_at);
}

#[cfg(feature = "cli")]
fn save_metadata(path: &Path, meta: &gridiron_cli::ReportMetadata) -> Result<()> {
    let metadata_json = serde_json::to_string_pretty(meta)?;
    std::fs::write(path, metadata_json)?;
    println!("\n📄 Metadata saved to: {}", path.display());
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("gridiron CLI is not available. Enable the 'cli' feature to use it.");
    std::process::exit(1);
}
