use std::fmt;

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Strand {
    Plus,
    Minus,
}

impl Strand {
    /// Reads GFF column 7. Anything other than `+` or `-` has no strand.
    pub fn from_gff(x: &str) -> Option<Strand> {
        match x {
            "+" => Some(Strand::Plus),
            "-" => Some(Strand::Minus),
            _ => None,
        }
    }

    pub fn is_minus(self) -> bool {
        self == Strand::Minus
    }
}

impl fmt::Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Plus => write!(f, "+"),
            Strand::Minus => write!(f, "-"),
        }
    }
}

/// Reading-frame offset at one end of a coding segment.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Phase {
    /// 0, 1 or 2 bases carried across the splice junction.
    Offset(u8),
    /// Translation start or stop, where no neighbouring codon exists.
    Terminal,
}

impl Phase {
    pub fn from_offset(offset: u64) -> Phase {
        Phase::Offset((offset % 3) as u8)
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Offset(n) => write!(f, "{n}"),
            Phase::Terminal => write!(f, "."),
        }
    }
}

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PhasePair {
    pub start: Phase,
    pub end: Phase,
}

impl PhasePair {
    pub const NONE: PhasePair = PhasePair { start: Phase::Terminal, end: Phase::Terminal };
}

impl fmt::Display for PhasePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cds {
    pub id: String,
    pub start: u64,
    pub end: u64,
}

impl Cds {
    /// Number of coding bases in the segment.
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    pub fn bounds(&self) -> (u64, u64) {
        (self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exon {
    pub id: String,
    /// 1-based position in transcription order.
    pub ordinal: usize,
    pub start: u64,
    pub end: u64,
    pub cds: Option<Cds>,
    pub phase: PhasePair,
}

impl Exon {
    pub fn bounds(&self) -> (u64, u64) {
        (self.start, self.end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mrna {
    pub id: String,
    pub start: u64,
    pub end: u64,
    /// Exons in transcription order.
    pub exons: Vec<Exon>,
}

impl Mrna {
    pub fn bounds(&self) -> (u64, u64) {
        (self.start, self.end)
    }

    /// Computes the total coding length of the transcript.
    pub fn coding_length(&self) -> u64 {
        self.exons.iter().filter_map(|e| e.cds.as_ref()).map(Cds::length).sum()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Gene {
    pub id: String,
    pub seqid: String,
    pub start: u64,
    pub end: u64,
    pub strand: Strand,
    pub mrnas: Vec<Mrna>,
}

impl Gene {
    pub fn bounds(&self) -> (u64, u64) {
        (self.start, self.end)
    }

    /// One row per exon of every transcript, for inspecting the parsed model.
    pub fn listing(&self) -> impl Iterator<Item = ListingRow<'_>> {
        self.mrnas.iter().enumerate().flat_map(move |(i, mrna)| {
            mrna.exons.iter().map(move |exon| ListingRow { gene: self, mrna, mrna_ordinal: i + 1, exon })
        })
    }
}

/// A parsed exon together with the context needed to print it on its own line.
#[derive(Debug, Clone, Copy)]
pub struct ListingRow<'a> {
    pub gene: &'a Gene,
    pub mrna: &'a Mrna,
    pub mrna_ordinal: usize,
    pub exon: &'a Exon,
}

impl fmt::Display for ListingRow<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (cds_start, cds_end) = match &self.exon.cds {
            Some(cds) => (cds.start.to_string(), cds.end.to_string()),
            None => (".".to_string(), ".".to_string()),
        };
        write!(
            f,
            "{} {} {} {} {} {} {} {} {} {} {} {} {} {}",
            self.gene.seqid,
            self.mrna.id,
            self.mrna_ordinal,
            self.gene.start,
            self.gene.end,
            self.gene.strand,
            self.exon.ordinal,
            self.exon.id,
            self.exon.start,
            self.exon.end,
            cds_start,
            cds_end,
            self.exon.phase.start,
            self.exon.phase.end,
        )
    }
}
