//! Gridiron CLI Library
//!
//! Game feed files → finalized game results
//! Game result files → season report + SHA256 checksum metadata

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tracing::info;

use gridiron_core::{aggregate_season, process_games_parallel, GameFeed, GameResult, RulesConfig};

/// Output file metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Wire schema version of the written document
    pub schema_version: u8,
    /// SHA256 checksum of the written file (hex)
    pub checksum: String,
    /// Creation time (RFC3339)
    pub created_at: String,
    /// Games written (or aggregated)
    pub games: usize,
    /// Games or merges that were refused
    pub rejected: usize,
    /// Output size (bytes)
    pub output_size: u64,
}

/// A file may hold one document or an array of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany<T> {
    Many(Vec<T>),
    One(T),
}

impl<T> OneOrMany<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            OneOrMany::Many(items) => items,
            OneOrMany::One(item) => vec![item],
        }
    }
}

fn read_documents<T: DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let json_str = fs::read_to_string(path)
        .with_context(|| format!("Failed to read JSON file: {}", path.display()))?;
    let docs: OneOrMany<T> = serde_json::from_str(&json_str)
        .with_context(|| format!("Failed to parse JSON: {}", path.display()))?;
    Ok(docs.into_vec())
}

fn write_output(path: &Path, bytes: &[u8]) -> Result<(String, u64)> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create output directory: {}", parent.display())
            })?;
        }
    }
    fs::write(path, bytes)
        .with_context(|| format!("Failed to write output file: {}", path.display()))?;
    Ok((sha256_hex(bytes), bytes.len() as u64))
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Loads rules from a file, or from the environment when no path is given.
pub fn load_rules(path: Option<&Path>) -> Result<RulesConfig> {
    match path {
        Some(path) => RulesConfig::from_path(path)
            .with_context(|| format!("Failed to load rules: {}", path.display())),
        None => Ok(RulesConfig::from_env_or_default()),
    }
}

/// Runs every game feed in `input` and writes the finalized games to `output`.
///
/// # Arguments
///
/// * `input` - JSON file holding one game feed or an array of them
/// * `output` - JSON file receiving an array of game results
/// * `rules` - rules used for every game
pub fn run_game_file(input: &Path, output: &Path, rules: &RulesConfig) -> Result<ReportMetadata> {
    let feeds: Vec<GameFeed> = read_documents(input)?;
    let results = process_games_parallel(feeds, rules);

    let skipped: usize = results.iter().map(|r| r.skipped.len()).sum();
    let json = serde_json::to_vec_pretty(&results).context("Failed to serialize game results")?;
    let (checksum, output_size) = write_output(output, &json)?;

    info!(games = results.len(), skipped, "game results written to {}", output.display());
    Ok(ReportMetadata {
        schema_version: gridiron_core::SCHEMA_VERSION,
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        games: results.len(),
        rejected: skipped,
        output_size,
    })
}

/// Aggregates game result files into one season report.
///
/// # Arguments
///
/// * `season` - season year; games from other seasons are refused
/// * `inputs` - JSON files each holding one game result or an array of them
/// * `output` - JSON file receiving the season report
pub fn run_season_files(
    season: u16,
    inputs: &[impl AsRef<Path>],
    output: &Path,
) -> Result<ReportMetadata> {
    let mut games: Vec<GameResult> = Vec::new();
    for input in inputs {
        games.extend(read_documents::<GameResult>(input.as_ref())?);
    }

    let report = aggregate_season(season, &games);
    let json = serde_json::to_vec_pretty(&report).context("Failed to serialize season report")?;
    let (checksum, output_size) = write_output(output, &json)?;

    info!(season, teams = report.teams.len(), "season report written to {}", output.display());
    Ok(ReportMetadata {
        schema_version: gridiron_core::SCHEMA_VERSION,
        checksum,
        created_at: chrono::Utc::now().to_rfc3339(),
        games: games.len().saturating_sub(report.rejected.len()),
        rejected: report.rejected.len(),
        output_size,
    })
}

/// Checks a written file against its recorded checksum.
pub fn verify_output(path: &Path, expected_checksum: &str) -> Result<bool> {
    let bytes = fs::read(path)
        .with_context(|| format!("Failed to read output file: {}", path.display()))?;
    Ok(sha256_hex(&bytes) == expected_checksum)
}
