/// Static interval index over inclusive intervals.
///
/// Entries are sorted by (start, end, original index) and paired with a
/// running maximum of interval ends. An intersection query binary-searches
/// the first entry starting past the query, then walks left while the prefix
/// maximum can still reach the query start. Candidates come back in
/// ascending (start, end, original index) order, so downstream greedy
/// decisions are reproducible across runs.
#[derive(Debug, Clone, Copy)]
struct IndexEntry {
    start: u64,
    end: u64,
    idx: usize,
}

#[derive(Debug, Default)]
pub struct IntervalIndex {
    entries: Vec<IndexEntry>,
    /// max_end[i] = max end over entries[0..=i]
    max_end: Vec<u64>,
}

impl IntervalIndex {
    /// Build the index; `idx` of each entry is its position in the input.
    pub fn build<I>(intervals: I) -> Self
    where
        I: IntoIterator<Item = (u64, u64)>,
    {
        let mut entries: Vec<IndexEntry> = intervals
            .into_iter()
            .enumerate()
            .map(|(idx, (start, end))| IndexEntry { start, end, idx })
            .collect();
        entries.sort_unstable_by_key(|e| (e.start, e.end, e.idx));

        let mut max_end = Vec::with_capacity(entries.len());
        let mut running = 0u64;
        for entry in &entries {
            running = running.max(entry.end);
            max_end.push(running);
        }

        IntervalIndex { entries, max_end }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Original indices of all intervals intersecting [start, end], in
    /// ascending (start, end, original index) order.
    pub fn overlapping(&self, start: u64, end: u64) -> Vec<usize> {
        // First entry with entry.start > end; everything at or after it
        // begins past the query.
        let upper = self.entries.partition_point(|e| e.start <= end);

        let mut hits = Vec::new();
        for i in (0..upper).rev() {
            if self.max_end[i] < start {
                // No entry at or before i reaches the query start.
                break;
            }
            if self.entries[i].end >= start {
                hits.push(self.entries[i].idx);
            }
        }
        hits.reverse();
        hits
    }
}
