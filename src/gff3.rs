use crate::error::Error;
use crate::structures::Gene;
use crate::transcript_builder::build_gene;
use log::{debug, warn};
use std::io::BufRead;

/// Feature types the gene model is built from. Everything else is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureKind {
    Gene,
    Mrna,
    Exon,
    Cds,
}

impl FeatureKind {
    fn from_column(x: &str) -> Option<FeatureKind> {
        match x {
            "gene" => Some(FeatureKind::Gene),
            "mRNA" => Some(FeatureKind::Mrna),
            "exon" => Some(FeatureKind::Exon),
            "CDS" => Some(FeatureKind::Cds),
            _ => None,
        }
    }
}

/// One GFF line of a known feature type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GffRecord {
    pub line: usize,
    pub seqid: String,
    pub kind: FeatureKind,
    pub start: u64,
    pub end: u64,
    pub strand: String,
    pub id: String,
}

/// A tokenized input line.
#[derive(Debug)]
enum Line {
    /// A `gene` record, opening a new block. Carries the error if the record is malformed.
    Gene(Result<GffRecord, Error>),
    Child(Result<GffRecord, Error>),
    Skip,
}

fn split_columns(line: &str) -> Vec<&str> {
    if line.contains('\t') {
        line.split('\t').collect()
    } else {
        line.split_whitespace().collect()
    }
}

fn parse_line(line: &str, line_num: usize) -> Line {
    let trimmed = line.trim_end_matches(['\r', '\n']);
    if trimmed.starts_with('#') || trimmed.trim().is_empty() {
        return Line::Skip;
    }

    let cols = split_columns(trimmed);
    let kind = match cols.get(2) {
        Some(col) => match FeatureKind::from_column(col.trim()) {
            Some(kind) => kind,
            None => {
                debug!("line {line_num}: ignoring feature type '{}'", col.trim());
                return Line::Skip;
            }
        },
        None => {
            return Line::Child(Err(Error::warning(format!(
                "line {line_num}: expected 9 columns, found {}",
                cols.len()
            ))));
        }
    };

    let record = parse_record(&cols, kind, line_num);
    match kind {
        FeatureKind::Gene => Line::Gene(record),
        _ => Line::Child(record),
    }
}

fn parse_coordinate(col: &str, what: &str, line_num: usize) -> Result<u64, Error> {
    match col.trim().parse::<u64>() {
        Ok(x) if x >= 1 => Ok(x),
        _ => Err(Error::warning(format!("line {line_num}: invalid {what} coordinate '{col}'"))),
    }
}

fn parse_record(cols: &[&str], kind: FeatureKind, line_num: usize) -> Result<GffRecord, Error> {
    if cols.len() != 9 {
        return Err(Error::warning(format!(
            "line {line_num}: expected 9 columns, found {}",
            cols.len()
        )));
    }

    let start = parse_coordinate(cols[3], "start", line_num)?;
    let end = parse_coordinate(cols[4], "end", line_num)?;
    if start > end {
        return Err(Error::warning(format!("line {line_num}: start {start} is past end {end}")));
    }

    let id = record_id(cols[8])
        .ok_or_else(|| Error::warning(format!("line {line_num}: record has no ID attribute")))?;

    Ok(GffRecord {
        line: line_num,
        seqid: cols[0].to_owned(),
        kind,
        start,
        end,
        strand: cols[6].trim().to_owned(),
        id: id.to_owned(),
    })
}

/// Classifies a line that is not valid UTF-8 by its lossy decoding, then rejects
/// it so that only its own gene block is lost.
fn undecodable_line(bytes: &[u8], line_num: usize) -> Line {
    let err = || Error::warning(format!("line {line_num}: record is not valid UTF-8"));
    match parse_line(&String::from_utf8_lossy(bytes), line_num) {
        Line::Gene(_) => Line::Gene(Err(err())),
        Line::Child(_) => Line::Child(Err(err())),
        Line::Skip => Line::Skip,
    }
}

/// Extracts the non-empty `ID` value from a `key=value;...` attribute column.
pub fn record_id(attr_str: &str) -> Option<&str> {
    attr_str
        .trim_end_matches(';')
        .split(';')
        .filter_map(|attr| attr.split_once('='))
        .find(|(k, _)| k.trim() == "ID")
        .map(|(_, v)| v.trim())
        .filter(|v| !v.is_empty())
}

/// Streams gene blocks out of a GFF file.
///
/// A block runs from a `gene` record to the next `gene` record or the end of
/// input. Each block is built into a [`Gene`] or an error explaining why it was
/// rejected; only the open block's records are held in memory.
pub struct GeneReader<R> {
    reader: R,
    buf: Vec<u8>,
    line_num: usize,
    pending: Option<Result<GffRecord, Error>>,
    finished: bool,
}

impl<R: BufRead> GeneReader<R> {
    pub fn new(reader: R) -> Self {
        Self { reader, buf: Vec::new(), line_num: 0, pending: None, finished: false }
    }

    /// Reads and tokenizes the next line. Only a failing reader is an error here;
    /// undecodable text invalidates the record it belongs to.
    fn next_line(&mut self) -> Option<Result<Line, Error>> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => {
                self.line_num += 1;
                Some(Ok(match std::str::from_utf8(&self.buf) {
                    Ok(line) => parse_line(line, self.line_num),
                    Err(_) => undecodable_line(&self.buf, self.line_num),
                }))
            }
            Err(e) => Some(Err(e.into())),
        }
    }
}

impl<R: BufRead> Iterator for GeneReader<R> {
    type Item = Result<Gene, Error>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        let head = match self.pending.take() {
            Some(head) => head,
            None => loop {
                match self.next_line()? {
                    Ok(Line::Gene(record)) => break record,
                    Ok(Line::Child(_)) => debug!("line {}: record outside any gene", self.line_num),
                    Ok(Line::Skip) => {}
                    Err(e) => {
                        self.finished = true;
                        return Some(Err(e));
                    }
                }
            },
        };

        let mut children = Vec::new();
        while let Some(line) = self.next_line() {
            match line {
                Ok(Line::Gene(record)) => {
                    self.pending = Some(record);
                    break;
                }
                Ok(Line::Child(record)) => children.push(record),
                Ok(Line::Skip) => {}
                Err(e) => {
                    self.finished = true;
                    return Some(Err(e));
                }
            }
        }

        Some(build_gene(head, children))
    }
}

/// Yields the structurally valid genes of a GFF stream.
///
/// Rejected blocks are logged and skipped; only fatal errors reach the caller.
pub fn valid_genes<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Gene, Error>> {
    GeneReader::new(reader).filter(|block| match block {
        Err(e) if !e.is_fatal() => {
            warn!("dropping gene: {e}");
            false
        }
        _ => true,
    })
}
