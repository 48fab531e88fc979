use rayon::prelude::*;
use std::cmp::Ordering;
use std::collections::BTreeMap;

use crate::atom::{sequence_union, AtomRecord, AtomSet};
use crate::metrics::ClassCounts;
use crate::status::{Status, StatusRecord};

/// Result of a base-level scan: per-class base counts plus the fragment
/// status exports for both sides.
#[derive(Debug, Default)]
pub struct BaseScan {
    pub counts: ClassCounts,
    pub predicted_status: Vec<StatusRecord>,
    pub true_status: Vec<StatusRecord>,
}

impl BaseScan {
    fn absorb(&mut self, other: BaseScan) {
        self.counts.merge(other.counts);
        self.predicted_status.extend(other.predicted_status);
        self.true_status.extend(other.true_status);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EventKind {
    // End sorts before Start: an atom closing at position p hands the class
    // over to one opening at p, regardless of record order in the input.
    End,
    Start,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Side {
    Predicted,
    True,
}

/// Event in the sweep line. `record` indexes into the owning side's slice.
#[derive(Debug, Clone, Copy)]
struct Event {
    position: u64,
    kind: EventKind,
    side: Side,
    class: u32,
    record: usize,
}

impl Ord for Event {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position
            .cmp(&other.position)
            .then(self.kind.cmp(&other.kind))
            .then(self.side.cmp(&other.side))
            .then(self.class.cmp(&other.class))
            .then(self.record.cmp(&other.record))
    }
}

impl PartialOrd for Event {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Eq for Event {}
impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

/// Classify every base of every sequence present in either collection as
/// TP (class active on both sides), FP (predicted only) or FN (true only).
///
/// Sequences are independent; they are scanned in parallel and the
/// per-sequence tallies merged additively.
pub fn scan_base_level(predicted: &AtomSet, truth: &AtomSet) -> BaseScan {
    let sequences = sequence_union(predicted, truth);

    let partials: Vec<BaseScan> = sequences
        .par_iter()
        .map(|sequence| scan_sequence(predicted.get(sequence), truth.get(sequence)))
        .collect();

    let mut scan = BaseScan::default();
    for partial in partials {
        scan.absorb(partial);
    }
    scan
}

/// Sweep one sequence. Every atom contributes a Start event at `start` and
/// an End event at `end + 1`; between consecutive distinct positions the
/// half-open run [prev, cur) has a fixed active-class state and its length
/// is credited to the per-class tallies.
fn scan_sequence(predicted: &[AtomRecord], truth: &[AtomRecord]) -> BaseScan {
    let mut scan = BaseScan::default();
    if predicted.is_empty() && truth.is_empty() {
        return scan;
    }

    let mut events = Vec::with_capacity(2 * (predicted.len() + truth.len()));
    for (side, atoms) in [(Side::Predicted, predicted), (Side::True, truth)] {
        for (record, atom) in atoms.iter().enumerate() {
            events.push(Event {
                position: atom.start,
                kind: EventKind::Start,
                side,
                class: atom.class,
                record,
            });
            events.push(Event {
                position: atom.end + 1,
                kind: EventKind::End,
                side,
                class: atom.class,
                record,
            });
        }
    }
    events.sort_unstable();

    // At most one active record per class and side. A same-class overlap
    // within one collection resolves last-write-wins; well-formed input
    // never has one.
    let mut active_predicted: BTreeMap<u32, usize> = BTreeMap::new();
    let mut active_true: BTreeMap<u32, usize> = BTreeMap::new();
    let mut previous: Option<u64> = None;

    for event in events {
        if let Some(prev) = previous {
            if event.position > prev {
                classify_run(
                    prev,
                    event.position,
                    &active_predicted,
                    &active_true,
                    predicted,
                    truth,
                    &mut scan,
                );
            }
        }

        let active = match event.side {
            Side::Predicted => &mut active_predicted,
            Side::True => &mut active_true,
        };
        match event.kind {
            EventKind::Start => {
                active.insert(event.class, event.record);
            }
            EventKind::End => {
                active.remove(&event.class);
            }
        }

        previous = Some(event.position);
    }

    scan
}

/// Credit the run [run_start, run_end) to TP/FP/FN per class and emit one
/// fragment status record per active atom.
fn classify_run(
    run_start: u64,
    run_end: u64,
    active_predicted: &BTreeMap<u32, usize>,
    active_true: &BTreeMap<u32, usize>,
    predicted: &[AtomRecord],
    truth: &[AtomRecord],
    scan: &mut BaseScan,
) {
    let length = run_end - run_start;
    let last = run_end - 1;

    for (&class, &record) in active_predicted {
        if let Some(&true_record) = active_true.get(&class) {
            scan.counts.add_tp(class, length);
            scan.predicted_status.push(StatusRecord::fragment(
                &predicted[record],
                run_start,
                last,
                Status::Tp,
            ));
            scan.true_status.push(StatusRecord::fragment(
                &truth[true_record],
                run_start,
                last,
                Status::Tp,
            ));
        } else {
            scan.counts.add_fp(class, length);
            scan.predicted_status.push(StatusRecord::fragment(
                &predicted[record],
                run_start,
                last,
                Status::Fp,
            ));
        }
    }

    for (&class, &record) in active_true {
        if !active_predicted.contains_key(&class) {
            scan.counts.add_fn(class, length);
            scan.true_status.push(StatusRecord::fragment(
                &truth[record],
                run_start,
                last,
                Status::Fn,
            ));
        }
    }
}
