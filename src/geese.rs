use anyhow::{bail, Context, Result};
use flate2::read::MultiGzDecoder;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::atom::AtomRecord;

/// Columns every GEESE atomization table must carry.
pub const REQUIRED_COLUMNS: [&str; 6] = ["name", "atom_nr", "class", "strand", "start", "end"];

/// Open a GEESE file, auto-detecting gzip compression by extension.
pub fn open_geese_input<P: AsRef<Path>>(path: P) -> Result<Box<dyn BufRead>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;

    let is_compressed = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext == "gz")
        .unwrap_or(false);

    if is_compressed {
        Ok(Box::new(BufReader::new(MultiGzDecoder::new(file))))
    } else {
        Ok(Box::new(BufReader::new(file)))
    }
}

/// Read a GEESE atomization file into typed records.
///
/// The header row names the columns in any order; a leading `#name` is
/// normalized to `name`. All six required columns must be present.
pub fn read_geese<P: AsRef<Path>>(path: P) -> Result<Vec<AtomRecord>> {
    let path = path.as_ref();
    if !path.is_file() {
        bail!("GEESE file not found: {}", path.display());
    }

    let reader = open_geese_input(path)?;
    parse_geese(reader).with_context(|| format!("failed to parse {}", path.display()))
}

/// Parse GEESE rows from a reader. Fails before any row is returned if the
/// header is missing a required column; malformed rows name their line.
pub fn parse_geese<R: BufRead>(reader: R) -> Result<Vec<AtomRecord>> {
    let mut lines = reader.lines();

    let header = loop {
        match lines.next() {
            Some(line) => {
                let line = line?;
                if !line.trim().is_empty() {
                    break line;
                }
            }
            None => bail!("empty GEESE file: no header row"),
        }
    };

    let mut columns: Vec<String> = header.split_whitespace().map(str::to_string).collect();
    if let Some(first) = columns.first_mut() {
        // Accept the `#name` header variant.
        if first == "#name" {
            *first = "name".to_string();
        }
    }

    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !columns.iter().any(|c| c.as_str() == **required))
        .copied()
        .collect();
    if !missing.is_empty() {
        bail!("missing required columns: {}", missing.join(", "));
    }

    let column_index = |name: &str| columns.iter().position(|c| c.as_str() == name).unwrap_or(0);
    let name_col = column_index("name");
    let atom_nr_col = column_index("atom_nr");
    let class_col = column_index("class");
    let strand_col = column_index("strand");
    let start_col = column_index("start");
    let end_col = column_index("end");

    let mut records = Vec::new();
    for (line_nr, line) in lines.enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != columns.len() {
            bail!(
                "line {}: expected {} fields, found {}",
                line_nr + 2,
                columns.len(),
                fields.len()
            );
        }

        let parse_int = |field: usize, what: &str| -> Result<u64> {
            fields[field]
                .parse::<u64>()
                .with_context(|| format!("line {}: invalid {} '{}'", line_nr + 2, what, fields[field]))
        };

        let start = parse_int(start_col, "start")?;
        let end = parse_int(end_col, "end")?;
        if end < start {
            bail!("line {}: end {} precedes start {}", line_nr + 2, end, start);
        }

        records.push(AtomRecord {
            name: fields[name_col].to_string(),
            atom_nr: parse_int(atom_nr_col, "atom_nr")? as u32,
            class: parse_int(class_col, "class")? as u32,
            strand: fields[strand_col].chars().next().unwrap_or('+'),
            start,
            end,
        });
    }

    Ok(records)
}
