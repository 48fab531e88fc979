use anyhow::{Context, Result};
use std::fmt;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::atom::AtomRecord;

/// Scoring outcome of an atom (or of one base-run fragment of it).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Tp,
    Fp,
    Fn,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Tp => "TP",
            Status::Fp => "FP",
            Status::Fn => "FN",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An atom annotated with its scoring outcome, for export only.
///
/// Base-level scanning emits one record per contiguous run per active atom,
/// with the run's sub-interval in place of the atom's own coordinates;
/// fragments of the same atom are never merged back together.
#[derive(Debug, Clone, PartialEq)]
pub struct StatusRecord {
    pub name: String,
    pub atom_nr: u32,
    pub class: u32,
    pub strand: char,
    pub start: u64,
    pub end: u64,
    pub status: Status,
}

impl StatusRecord {
    /// Annotate a whole atom (interval-level export).
    pub fn from_atom(atom: &AtomRecord, status: Status) -> Self {
        Self::fragment(atom, atom.start, atom.end, status)
    }

    /// Annotate a sub-interval of an atom (base-level export).
    pub fn fragment(atom: &AtomRecord, start: u64, end: u64, status: Status) -> Self {
        StatusRecord {
            name: atom.name.clone(),
            atom_nr: atom.atom_nr,
            class: atom.class,
            strand: atom.strand,
            start,
            end,
            status,
        }
    }
}

/// Write status records as a TSV table with a header row.
pub fn write_status_tsv(records: &[StatusRecord], output_file: &Path) -> Result<()> {
    if let Some(parent) = output_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file = File::create(output_file)
        .with_context(|| format!("failed to create {}", output_file.display()))?;
    let mut writer = BufWriter::new(file);

    writeln!(writer, "name\tatom_nr\tclass\tstrand\tstart\tend\tstatus")?;
    for record in records {
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            record.name,
            record.atom_nr,
            record.class,
            record.strand,
            record.start,
            record.end,
            record.status
        )?;
    }

    Ok(())
}
