use anyhow::{Context, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

/// Per-class TP/FP/FN accumulators.
///
/// A class absent from a map has a count of zero; classes that never score
/// never gain an entry. Keys are ordered, so per-class reports come out
/// ascending by class without a sort step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassCounts {
    pub true_positives: BTreeMap<u32, u64>,
    pub false_positives: BTreeMap<u32, u64>,
    pub false_negatives: BTreeMap<u32, u64>,
}

impl ClassCounts {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_tp(&mut self, class: u32, count: u64) {
        *self.true_positives.entry(class).or_insert(0) += count;
    }

    pub fn add_fp(&mut self, class: u32, count: u64) {
        *self.false_positives.entry(class).or_insert(0) += count;
    }

    pub fn add_fn(&mut self, class: u32, count: u64) {
        *self.false_negatives.entry(class).or_insert(0) += count;
    }

    /// Fold another tally into this one. Sums commute, so merge order across
    /// per-sequence partials is irrelevant.
    pub fn merge(&mut self, other: ClassCounts) {
        for (class, count) in other.true_positives {
            self.add_tp(class, count);
        }
        for (class, count) in other.false_positives {
            self.add_fp(class, count);
        }
        for (class, count) in other.false_negatives {
            self.add_fn(class, count);
        }
    }

    /// Ascending union of the classes appearing in any of the three maps.
    pub fn classes(&self) -> Vec<u32> {
        let classes: BTreeSet<u32> = self
            .true_positives
            .keys()
            .chain(self.false_positives.keys())
            .chain(self.false_negatives.keys())
            .copied()
            .collect();
        classes.into_iter().collect()
    }

    /// (TP, FP, FN) summed across all classes.
    pub fn totals(&self) -> (u64, u64, u64) {
        (
            self.true_positives.values().sum(),
            self.false_positives.values().sum(),
            self.false_negatives.values().sum(),
        )
    }

    /// (TP, FP, FN) for one class; missing counts default to 0.
    pub fn for_class(&self, class: u32) -> (u64, u64, u64) {
        (
            self.true_positives.get(&class).copied().unwrap_or(0),
            self.false_positives.get(&class).copied().unwrap_or(0),
            self.false_negatives.get(&class).copied().unwrap_or(0),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.true_positives.is_empty()
            && self.false_positives.is_empty()
            && self.false_negatives.is_empty()
    }
}

/// Precision / recall / F1 triple, each in [0, 1].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Metrics {
    /// A zero denominator yields 0.0, never an error.
    pub fn from_counts(tp: u64, fp: u64, fn_count: u64) -> Self {
        let precision = if tp + fp > 0 {
            tp as f64 / (tp + fp) as f64
        } else {
            0.0
        };
        let recall = if tp + fn_count > 0 {
            tp as f64 / (tp + fn_count) as f64
        } else {
            0.0
        };
        let f1 = if precision + recall > 0.0 {
            2.0 * precision * recall / (precision + recall)
        } else {
            0.0
        };

        Metrics { precision, recall, f1 }
    }
}

/// One per-class score entry, reported ascending by class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassScore {
    pub class: u32,
    pub f1: f64,
}

/// Result of a scoring run: a single aggregate F1, or one F1 per class.
#[derive(Debug, Clone, PartialEq)]
pub enum Score {
    Overall(f64),
    PerClass(Vec<ClassScore>),
}

impl Score {
    pub fn as_overall(&self) -> Option<f64> {
        match self {
            Score::Overall(f1) => Some(*f1),
            Score::PerClass(_) => None,
        }
    }
}

/// Compute metrics from the tallies and persist them as a TSV table.
///
/// Aggregate mode writes one `TP FP FN Precision Recall F1-score` row and
/// returns the F1; per-class mode prefixes a `Class` column, writes one row
/// per class in ascending order, and returns the (class, F1) list.
pub fn write_metrics(counts: &ClassCounts, output_file: &Path, per_class: bool) -> Result<Score> {
    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(output_file)
        .with_context(|| format!("failed to create {}", output_file.display()))?;
    let mut writer = BufWriter::new(file);

    if !per_class {
        let (tp, fp, fn_count) = counts.totals();
        let metrics = Metrics::from_counts(tp, fp, fn_count);

        writeln!(writer, "TP\tFP\tFN\tPrecision\tRecall\tF1-score")?;
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}",
            tp, fp, fn_count, metrics.precision, metrics.recall, metrics.f1
        )?;

        return Ok(Score::Overall(metrics.f1));
    }

    writeln!(writer, "Class\tTP\tFP\tFN\tPrecision\tRecall\tF1-score")?;
    let mut scores = Vec::new();
    for class in counts.classes() {
        let (tp, fp, fn_count) = counts.for_class(class);
        let metrics = Metrics::from_counts(tp, fp, fn_count);
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            class, tp, fp, fn_count, metrics.precision, metrics.recall, metrics.f1
        )?;
        scores.push(ClassScore {
            class,
            f1: metrics.f1,
        });
    }

    Ok(Score::PerClass(scores))
}
