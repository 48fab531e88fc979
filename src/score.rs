use anyhow::{bail, Context, Result};
use log::info;
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

use crate::atom::AtomSet;
use crate::base_sweep;
use crate::coverage;
use crate::geese;
use crate::interval_match;
use crate::metrics::{write_metrics, Score};
use crate::status::write_status_tsv;

/// Default minimum overlap ratio for interval-level scoring.
pub const DEFAULT_MIN_OVERLAP_RATIO: f64 = 0.8;

// Overall score = alignment^0.7 * coverage^0.3, clamped to [0, 1].
const ALIGNMENT_WEIGHT: f64 = 0.7;
const COVERAGE_WEIGHT: f64 = 0.3;

/// Evaluation level: per-base classification or per-interval matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Base,
    Interval,
}

impl FromStr for Level {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "base" => Ok(Level::Base),
            "interval" => Ok(Level::Interval),
            other => bail!("level must be 'base' or 'interval', got '{other}'"),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Level::Base => f.write_str("base"),
            Level::Interval => f.write_str("interval"),
        }
    }
}

fn load_inputs(predicted_geese: &Path, true_geese: &Path) -> Result<(AtomSet, AtomSet)> {
    if !predicted_geese.is_file() {
        bail!(
            "predicted GEESE file not found: {}",
            predicted_geese.display()
        );
    }
    if !true_geese.is_file() {
        bail!("true GEESE file not found: {}", true_geese.display());
    }

    let predicted = AtomSet::from_records(geese::read_geese(predicted_geese)?);
    let truth = AtomSet::from_records(geese::read_geese(true_geese)?);
    info!(
        "loaded {} predicted atoms on {} sequences, {} true atoms on {} sequences",
        predicted.num_atoms(),
        predicted.num_sequences(),
        truth.num_atoms(),
        truth.num_sequences()
    );

    Ok((predicted, truth))
}

/// Base-level scoring: classify every base, persist the metrics table and
/// the fragment status exports, return the score.
pub fn compute_base_level_metrics(
    predicted_geese: &Path,
    true_geese: &Path,
    output_directory: &Path,
    per_class: bool,
) -> Result<Score> {
    let (predicted, truth) = load_inputs(predicted_geese, true_geese)?;
    fs::create_dir_all(output_directory)
        .with_context(|| format!("failed to create {}", output_directory.display()))?;

    let scan = base_sweep::scan_base_level(&predicted, &truth);

    write_status_tsv(
        &scan.predicted_status,
        &output_directory.join("base_predicted_status.tsv"),
    )?;
    write_status_tsv(
        &scan.true_status,
        &output_directory.join("base_true_status.tsv"),
    )?;

    let output_file = output_directory.join(if per_class {
        "base_metrics_per_class.tsv"
    } else {
        "base_metrics_overall.tsv"
    });
    write_metrics(&scan.counts, &output_file, per_class)
}

/// Interval-level scoring: greedily match atoms, persist the metrics table
/// and the per-interval status exports, return the score.
pub fn compute_interval_level_metrics(
    predicted_geese: &Path,
    true_geese: &Path,
    output_directory: &Path,
    per_class: bool,
    min_overlap_ratio: f64,
) -> Result<Score> {
    let (mut predicted, mut truth) = load_inputs(predicted_geese, true_geese)?;
    fs::create_dir_all(output_directory)
        .with_context(|| format!("failed to create {}", output_directory.display()))?;

    predicted.sort_by_coords();
    truth.sort_by_coords();

    let scan = interval_match::match_interval_level(&predicted, &truth, min_overlap_ratio);

    write_status_tsv(
        &scan.predicted_status,
        &output_directory.join("interval_predicted_status.tsv"),
    )?;
    write_status_tsv(
        &scan.true_status,
        &output_directory.join("interval_true_status.tsv"),
    )?;

    let output_file = output_directory.join(if per_class {
        "interval_metrics_per_class.tsv"
    } else {
        "interval_metrics_overall.tsv"
    });
    write_metrics(&scan.counts, &output_file, per_class)
}

/// Score the predicted atomization against the gold standard at the
/// requested level.
pub fn compute_alignment_score(
    predicted_geese: &Path,
    true_geese: &Path,
    output_directory: &Path,
    level: Level,
    per_class: bool,
    min_overlap_ratio: f64,
) -> Result<Score> {
    info!(
        "computing {level}-level score (per_class: {per_class}, min_overlap_ratio: {min_overlap_ratio})"
    );
    match level {
        Level::Base => {
            compute_base_level_metrics(predicted_geese, true_geese, output_directory, per_class)
        }
        Level::Interval => compute_interval_level_metrics(
            predicted_geese,
            true_geese,
            output_directory,
            per_class,
            min_overlap_ratio,
        ),
    }
}

/// Overall atomization score: weighted geometric mean of the interval-level
/// F1 (at the default threshold) and the genome coverage ratio.
pub fn compute_overall_score(
    genomes_file: &Path,
    predicted_geese: &Path,
    true_geese: &Path,
    output_directory: &Path,
) -> Result<f64> {
    let score = compute_interval_level_metrics(
        predicted_geese,
        true_geese,
        output_directory,
        false,
        DEFAULT_MIN_OVERLAP_RATIO,
    )?;
    let alignment = score
        .as_overall()
        .context("aggregate scoring yields a single F1")?;
    info!("alignment score: {alignment}");

    let coverage = coverage::compute_coverage_score(genomes_file, predicted_geese)?;
    info!("coverage score: {coverage}");

    let overall = alignment.powf(ALIGNMENT_WEIGHT) * coverage.powf(COVERAGE_WEIGHT);
    Ok(overall.clamp(0.0, 1.0))
}
