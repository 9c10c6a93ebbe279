use crate::error::Error;
use log::debug;
use std::collections::HashMap;
use std::io::BufRead;

/// Largest residue whose codon still ends at or below `i64::MAX`.
pub const MAX_RESIDUE: u64 = i64::MAX as u64 / 3;

/// A named stretch of residues on one transcript's protein.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProteinInterval {
    pub label: String,
    /// 1-based position among the intervals registered for the same transcript.
    pub ordinal: usize,
    pub start: u64,
    pub end: u64,
}

impl ProteinInterval {
    pub fn bounds(&self) -> (u64, u64) {
        (self.start, self.end)
    }
}

/// Protein intervals keyed by transcript identifier.
#[derive(Debug, Default)]
pub struct IntervalTable {
    intervals: HashMap<String, Vec<ProteinInterval>>,
}

impl IntervalTable {
    /// Loads `transcript label start end` rows.
    ///
    /// Columns are split on `delimiter`, or on whitespace runs when it is `None`.
    /// Blank lines and `#` comments are skipped. A row with fewer than four
    /// columns or a coordinate that is not a positive integer fails the load.
    pub fn from_reader<R: BufRead>(reader: R, delimiter: Option<&str>) -> Result<Self, Error> {
        let mut table = IntervalTable::default();

        for (i, line) in reader.lines().enumerate() {
            let line = line?;
            let line_num = i + 1;
            if line.trim().is_empty() || line.starts_with('#') {
                continue;
            }

            let cols: Vec<&str> = match delimiter {
                Some(d) => line.split(d).map(str::trim).collect(),
                None => line.split_whitespace().collect(),
            };
            if cols.len() < 4 {
                return Err(Error::fatal(format!(
                    "interval line {line_num}: each interval line must have 4 columns, found {}",
                    cols.len()
                )));
            }
            if cols.len() > 4 {
                debug!("interval line {line_num}: ignoring {} extra columns", cols.len() - 4);
            }

            let start = parse_residue(cols[2], line_num)?;
            let end = parse_residue(cols[3], line_num)?;
            table.insert(cols[0], cols[1], start.min(end), start.max(end));
        }

        Ok(table)
    }

    fn insert(&mut self, transcript: &str, label: &str, start: u64, end: u64) {
        let entries = self.intervals.entry(transcript.to_owned()).or_default();
        entries.push(ProteinInterval { label: label.to_owned(), ordinal: entries.len() + 1, start, end });
    }

    /// Every interval registered for `transcript`, in file order.
    pub fn intervals(&self, transcript: &str) -> &[ProteinInterval] {
        self.intervals.get(transcript).map(Vec::as_slice).unwrap_or_default()
    }

    /// Bounds of the first interval registered for `transcript`, lowest first.
    pub fn bounds(&self, transcript: &str) -> Option<(u64, u64)> {
        self.intervals(transcript).first().map(ProteinInterval::bounds)
    }

    /// Label of the first interval registered for `transcript`.
    pub fn label(&self, transcript: &str) -> Option<&str> {
        self.intervals(transcript).first().map(|i| i.label.as_str())
    }

    /// Number of transcripts with at least one interval.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}

fn parse_residue(col: &str, line_num: usize) -> Result<u64, Error> {
    match col.parse::<u64>() {
        Ok(x) if x > MAX_RESIDUE => Err(Error::fatal(format!(
            "interval line {line_num}: interval coordinate {x} exceeds the largest supported residue {MAX_RESIDUE}"
        ))),
        Ok(x) if x >= 1 => Ok(x),
        _ => Err(Error::fatal(format!(
            "interval line {line_num}: interval coordinates must be integers greater than 0, found '{col}'"
        ))),
    }
}
