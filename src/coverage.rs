use anyhow::{bail, Context, Result};
use bio::io::fasta;
use std::path::Path;

use crate::geese;

/// Fraction of the total genome length covered by atoms: the sum of atom
/// lengths divided by the sum of FASTA sequence lengths.
///
/// Plain length-sum division: atoms are not merged, so overlapping atoms can
/// push the raw ratio above 1.0. An empty genome set scores 0.0.
pub fn compute_coverage_score(genomes_file: &Path, atomization_file: &Path) -> Result<f64> {
    if !genomes_file.is_file() {
        bail!("genomes FASTA file not found: {}", genomes_file.display());
    }
    if !atomization_file.is_file() {
        bail!("atomization file not found: {}", atomization_file.display());
    }

    let reader = fasta::Reader::from_file(genomes_file)
        .with_context(|| format!("failed to open {}", genomes_file.display()))?;

    let mut total_genomes_length = 0u64;
    for record in reader.records() {
        let record =
            record.with_context(|| format!("failed to read {}", genomes_file.display()))?;
        total_genomes_length += record.seq().len() as u64;
    }

    if total_genomes_length == 0 {
        return Ok(0.0);
    }

    let atoms = geese::read_geese(atomization_file)?;
    let covered: u64 = atoms.iter().map(|atom| atom.length()).sum();

    Ok(covered as f64 / total_genomes_length as f64)
}
