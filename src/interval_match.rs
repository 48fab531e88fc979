use rayon::prelude::*;

use crate::atom::{overlap_ratio, sequence_union, AtomRecord, AtomSet};
use crate::interval_index::IntervalIndex;
use crate::metrics::ClassCounts;
use crate::status::{Status, StatusRecord};

/// Result of an interval-level scan: per-class interval counts plus the
/// per-interval status exports for both sides.
#[derive(Debug, Default)]
pub struct IntervalScan {
    pub counts: ClassCounts,
    pub predicted_status: Vec<StatusRecord>,
    pub true_status: Vec<StatusRecord>,
}

impl IntervalScan {
    fn absorb(&mut self, other: IntervalScan) {
        self.counts.merge(other.counts);
        self.predicted_status.extend(other.predicted_status);
        self.true_status.extend(other.true_status);
    }
}

/// Greedily match predicted atoms to true atoms of the same class, gated by
/// the minimum overlap ratio (intersection over union).
///
/// Each predicted atom contributes exactly one TP or FP; each unmatched true
/// atom contributes one FN. Expects both sets sorted by (start, end) within
/// each sequence (`AtomSet::sort_by_coords`). Candidates are considered in
/// ascending (start, end, original index) order and the first qualifying one
/// wins, so results do not depend on input shuffling.
pub fn match_interval_level(
    predicted: &AtomSet,
    truth: &AtomSet,
    min_overlap_ratio: f64,
) -> IntervalScan {
    let sequences = sequence_union(predicted, truth);

    let partials: Vec<IntervalScan> = sequences
        .par_iter()
        .map(|sequence| {
            match_sequence(
                predicted.get(sequence),
                truth.get(sequence),
                min_overlap_ratio,
            )
        })
        .collect();

    let mut scan = IntervalScan::default();
    for partial in partials {
        scan.absorb(partial);
    }
    scan
}

fn match_sequence(
    predicted: &[AtomRecord],
    truth: &[AtomRecord],
    min_overlap_ratio: f64,
) -> IntervalScan {
    let mut scan = IntervalScan::default();

    let index = IntervalIndex::build(truth.iter().map(|atom| (atom.start, atom.end)));
    let mut used = vec![false; truth.len()];
    let mut matched = vec![false; predicted.len()];

    for (pi, atom) in predicted.iter().enumerate() {
        for ti in index.overlapping(atom.start, atom.end) {
            let candidate = &truth[ti];
            if used[ti] || candidate.class != atom.class {
                continue;
            }
            let ratio = overlap_ratio(atom.start, atom.end, candidate.start, candidate.end);
            if ratio >= min_overlap_ratio {
                used[ti] = true;
                matched[pi] = true;
                scan.counts.add_tp(atom.class, 1);
                break;
            }
        }
        if !matched[pi] {
            scan.counts.add_fp(atom.class, 1);
        }
    }

    for (ti, atom) in truth.iter().enumerate() {
        if !used[ti] {
            scan.counts.add_fn(atom.class, 1);
        }
    }

    scan.predicted_status = predicted
        .iter()
        .zip(&matched)
        .map(|(atom, &hit)| {
            StatusRecord::from_atom(atom, if hit { Status::Tp } else { Status::Fp })
        })
        .collect();
    scan.true_status = truth
        .iter()
        .zip(&used)
        .map(|(atom, &hit)| {
            StatusRecord::from_atom(atom, if hit { Status::Tp } else { Status::Fn })
        })
        .collect();

    scan
}
