use crate::error::Error;
use crate::geometry::{downstream, overlaps, within};
use crate::gff3::{FeatureKind, GffRecord};
use crate::structures::{Cds, Exon, Gene, Mrna, Phase, PhasePair, Strand};

/// Accumulates the records of one gene block, checking each as it arrives.
struct GeneBuilder {
    gene: Gene,
}

impl GeneBuilder {
    fn new(head: GffRecord) -> Result<Self, Error> {
        let strand = Strand::from_gff(&head.strand).ok_or_else(|| {
            Error::warning(format!("line {}: invalid strand '{}'", head.line, head.strand))
        })?;
        Ok(Self {
            gene: Gene {
                id: head.id,
                seqid: head.seqid,
                start: head.start,
                end: head.end,
                strand,
                mrnas: Vec::new(),
            },
        })
    }

    fn add(&mut self, record: GffRecord) -> Result<(), Error> {
        match record.kind {
            FeatureKind::Gene => Err(Error::warning(format!("line {}: nested gene record", record.line))),
            FeatureKind::Mrna => self.add_mrna(record),
            FeatureKind::Exon => self.add_exon(record),
            FeatureKind::Cds => self.add_cds(record),
        }
    }

    /// Children must carry the strand of their gene.
    fn check_strand(&self, record: &GffRecord) -> Result<(), Error> {
        if Strand::from_gff(&record.strand) != Some(self.gene.strand) {
            return reject(record, format!("strand '{}' differs from gene strand", record.strand));
        }
        Ok(())
    }

    fn add_mrna(&mut self, record: GffRecord) -> Result<(), Error> {
        self.check_strand(&record)?;
        if !within((record.start, record.end), self.gene.bounds()) {
            reject(&record, "lies outside its gene")?;
        }
        self.gene.mrnas.push(Mrna {
            id: record.id,
            start: record.start,
            end: record.end,
            exons: Vec::new(),
        });
        Ok(())
    }

    fn add_exon(&mut self, record: GffRecord) -> Result<(), Error> {
        self.check_strand(&record)?;
        let strand = self.gene.strand;
        let Some(mrna) = self.gene.mrnas.last_mut() else {
            return reject(&record, "exon precedes any mRNA");
        };
        let bounds = (record.start, record.end);
        if !within(bounds, mrna.bounds()) {
            reject(&record, format!("lies outside mRNA {}", mrna.id))?;
        }
        if let Some(prev) = mrna.exons.last() {
            if overlaps(bounds, prev.bounds()) {
                reject(&record, format!("overlaps exon {}", prev.id))?;
            }
            if !downstream(five_prime(bounds, strand), three_prime(prev.bounds(), strand), strand) {
                reject(&record, format!("is not downstream of exon {}", prev.id))?;
            }
        }
        let ordinal = mrna.exons.len() + 1;
        mrna.exons.push(Exon {
            id: record.id,
            ordinal,
            start: record.start,
            end: record.end,
            cds: None,
            phase: PhasePair::NONE,
        });
        Ok(())
    }

    fn add_cds(&mut self, record: GffRecord) -> Result<(), Error> {
        self.check_strand(&record)?;
        let Some(exon) = self.gene.mrnas.last_mut().and_then(|m| m.exons.last_mut()) else {
            return reject(&record, "CDS has no preceding exon");
        };
        if exon.cds.is_some() {
            reject(&record, format!("exon {} already has a CDS", exon.id))?;
        }
        if !within((record.start, record.end), exon.bounds()) {
            reject(&record, format!("lies outside exon {}", exon.id))?;
        }
        exon.cds = Some(Cds { id: record.id, start: record.start, end: record.end });
        Ok(())
    }

    fn finish(mut self) -> Gene {
        for mrna in &mut self.gene.mrnas {
            calculate_phases(&mut mrna.exons);
        }
        self.gene
    }
}

fn reject(record: &GffRecord, reason: impl std::fmt::Display) -> Result<(), Error> {
    Err(Error::warning(format!("line {}: {} {}", record.line, record.id, reason)))
}

/// The end of an interval that transcription reaches first.
fn five_prime((start, end): (u64, u64), strand: Strand) -> u64 {
    match strand {
        Strand::Plus => start,
        Strand::Minus => end,
    }
}

fn three_prime((start, end): (u64, u64), strand: Strand) -> u64 {
    match strand {
        Strand::Plus => end,
        Strand::Minus => start,
    }
}

/// Builds a validated gene from the records of one block.
///
/// Any malformed record or structural violation rejects the whole gene.
pub fn build_gene(
    head: Result<GffRecord, Error>,
    children: Vec<Result<GffRecord, Error>>,
) -> Result<Gene, Error> {
    let head = head?;
    let gene_id = head.id.clone();
    let in_gene = |e: Error| Error { severity: e.severity, message: format!("gene {gene_id}: {}", e.message) };

    let mut builder = GeneBuilder::new(head).map_err(in_gene)?;
    for record in children {
        builder.add(record.map_err(in_gene)?).map_err(in_gene)?;
    }
    Ok(builder.finish())
}

/// Assigns the phase pair of every exon, walking the exons in transcription order.
///
/// The start of the first coding segment and the end of the last one carry no
/// phase; every other coding edge carries the running coding length modulo 3.
/// Exons without a CDS carry no phase at either end.
pub fn calculate_phases(exons: &mut [Exon]) {
    let first = exons.iter().position(|e| e.cds.is_some());
    let last = exons.iter().rposition(|e| e.cds.is_some());
    let mut offset = 0;

    for (i, exon) in exons.iter_mut().enumerate() {
        let Some(length) = exon.cds.as_ref().map(Cds::length) else {
            exon.phase = PhasePair::NONE;
            continue;
        };
        let start = if Some(i) == first { Phase::Terminal } else { Phase::from_offset(offset) };
        offset += length;
        let end = if Some(i) == last { Phase::Terminal } else { Phase::from_offset(offset) };
        exon.phase = PhasePair { start, end };
    }
}
