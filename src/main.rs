use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;

use atomscore::coverage;
use atomscore::metrics::Score;
use atomscore::score::{self, Level, DEFAULT_MIN_OVERLAP_RATIO};

fn parse_level(s: &str) -> Result<Level, String> {
    s.parse::<Level>().map_err(|e| e.to_string())
}

fn parse_ratio(s: &str) -> Result<f64, String> {
    let ratio: f64 = s.parse().map_err(|e| format!("invalid ratio: {e}"))?;
    if !(0.0..=1.0).contains(&ratio) {
        return Err(format!("ratio {ratio} outside [0, 1]"));
    }
    Ok(ratio)
}

/// Atomization scorer - evaluate a genome atomization against a gold standard
///
/// Compares a predicted atomization (GEESE file) to a true one and reports
/// precision/recall/F1, per-base or per-interval. With a genomes FASTA it
/// also reports genome coverage and the combined overall score.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Predicted atomization GEESE file
    #[clap(value_name = "PREDICTED")]
    predicted: PathBuf,

    /// True (gold standard) atomization GEESE file
    #[clap(value_name = "TRUE")]
    truth: PathBuf,

    /// Output directory for metrics and status tables (created if missing)
    #[clap(short = 'o', long = "output-dir", value_name = "DIR")]
    output_dir: PathBuf,

    /// Evaluation level: "base" or "interval"
    #[clap(short = 'l', long = "level", default_value = "interval", value_parser = parse_level)]
    level: Level,

    /// Report metrics per atomization class instead of overall
    #[clap(long = "per-class")]
    per_class: bool,

    /// Minimum overlap ratio for interval-level matching
    #[clap(short = 'r', long = "min-overlap-ratio", default_value_t = DEFAULT_MIN_OVERLAP_RATIO, value_parser = parse_ratio)]
    min_overlap_ratio: f64,

    /// Genomes FASTA file; enables coverage and overall scores
    #[clap(short = 'g', long = "genomes", value_name = "FASTA")]
    genomes: Option<PathBuf>,

    /// Number of threads for per-sequence parallelism (0 = all cores)
    #[clap(short = 't', long = "threads", default_value = "0")]
    threads: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    if args.threads > 0 {
        rayon::ThreadPoolBuilder::new()
            .num_threads(args.threads)
            .build_global()?;
    }

    let score = score::compute_alignment_score(
        &args.predicted,
        &args.truth,
        &args.output_dir,
        args.level,
        args.per_class,
        args.min_overlap_ratio,
    )?;

    match &score {
        Score::Overall(f1) => println!("{}-level F1-score: {f1}", args.level),
        Score::PerClass(scores) => {
            println!("Class\tF1-score");
            for entry in scores {
                println!("{}\t{}", entry.class, entry.f1);
            }
        }
    }

    if let Some(genomes) = &args.genomes {
        let coverage_score = coverage::compute_coverage_score(genomes, &args.predicted)?;
        println!("Coverage score: {coverage_score}");

        let overall = score::compute_overall_score(
            genomes,
            &args.predicted,
            &args.truth,
            &args.output_dir,
        )?;
        println!("Overall score: {overall}");
    }

    Ok(())
}
