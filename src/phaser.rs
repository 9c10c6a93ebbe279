//! Maps protein intervals onto the coding exons of a transcript.
//!
//! A protein interval becomes a nucleotide budget counted from the first coding
//! base. Coding exons are visited in transcription order; each one reports the
//! genomic stretch where the budget lands on its CDS and then consumes its own
//! coding length from the budget.

use crate::geometry::{clip_to_segment, to_nucleotide};
use crate::intervals::{IntervalTable, ProteinInterval};
use crate::structures::{Exon, Gene, Mrna, PhasePair, Strand};
use log::debug;
use std::fmt;

/// One exon touched by a protein interval.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    pub label: String,
    /// Ordinal of the interval among those registered for the transcript.
    pub interval: usize,
    pub transcript: String,
    pub exon: usize,
    pub strand: Strand,
    pub exon_start: u64,
    pub exon_end: u64,
    pub hit_start: u64,
    pub hit_end: u64,
    /// Hit bounds in bases counted from the first coding base.
    pub coding_start: i64,
    pub coding_end: i64,
    pub phase: PhasePair,
}

impl fmt::Display for Hit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} {} {} {} {} {} {} {}",
            self.label,
            self.transcript,
            self.exon,
            self.strand,
            self.exon_start,
            self.exon_end,
            self.hit_start,
            self.hit_end,
            self.phase
        )
    }
}

/// The part of an interval not yet placed on an exon, in bases relative to the
/// start of the coding segments still ahead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Budget {
    first: i64,
    last: i64,
    /// Coding bases already walked past.
    consumed: i64,
}

impl Budget {
    fn new(interval: &ProteinInterval) -> Self {
        let (first, last) = to_nucleotide(interval.bounds());
        Budget { first: saturating_i64(first), last: saturating_i64(last), consumed: 0 }
    }

    fn exhausted(&self) -> bool {
        self.last < 1
    }

    /// The budget left for the next coding segment once `length` bases were walked.
    fn advance(self, length: i64, hit: bool) -> Self {
        Budget {
            first: if hit { 1 } else { self.first.saturating_sub(length) },
            last: self.last.saturating_sub(length),
            consumed: self.consumed.saturating_add(length),
        }
    }
}

fn saturating_i64(x: u64) -> i64 {
    i64::try_from(x).unwrap_or(i64::MAX)
}

/// Places one protein interval on the coding exons of `mrna`.
///
/// Yields at most one hit per exon, in transcription order, and stops as soon
/// as the interval is used up.
pub fn map_interval<'a>(
    mrna: &'a Mrna,
    strand: Strand,
    interval: &'a ProteinInterval,
) -> impl Iterator<Item = Hit> + 'a {
    let coding = mrna.exons.iter().filter_map(|exon| exon.cds.as_ref().map(|cds| (exon, cds)));

    coding
        .scan(Budget::new(interval), move |budget, (exon, cds)| {
            if budget.exhausted() {
                return None;
            }
            let clipped = clip_to_segment((budget.first, budget.last), cds.bounds(), strand.is_minus());
            let hit = clipped.map(|span| to_hit(mrna, exon, strand, interval, span, cds.bounds(), budget.consumed));
            *budget = budget.advance(saturating_i64(cds.length()), hit.is_some());
            Some(hit)
        })
        .flatten()
}

fn to_hit(
    mrna: &Mrna,
    exon: &Exon,
    strand: Strand,
    interval: &ProteinInterval,
    (hit_start, hit_end): (u64, u64),
    (cds_start, cds_end): (u64, u64),
    consumed: i64,
) -> Hit {
    let (near, far) = match strand {
        Strand::Plus => (hit_start - cds_start, hit_end - cds_start),
        Strand::Minus => (cds_end - hit_end, cds_end - hit_start),
    };
    Hit {
        label: interval.label.clone(),
        interval: interval.ordinal,
        transcript: mrna.id.clone(),
        exon: exon.ordinal,
        strand,
        exon_start: exon.start,
        exon_end: exon.end,
        hit_start,
        hit_end,
        coding_start: consumed.saturating_add(saturating_i64(near)).saturating_add(1),
        coding_end: consumed.saturating_add(saturating_i64(far)).saturating_add(1),
        phase: exon.phase,
    }
}

/// Every hit of every interval registered for the transcripts of `gene`.
pub fn phase_gene<'a>(gene: &'a Gene, table: &'a IntervalTable) -> impl Iterator<Item = Hit> + 'a {
    gene.mrnas.iter().flat_map(move |mrna| {
        table
            .intervals(&mrna.id)
            .iter()
            .flat_map(move |interval| {
                if to_nucleotide(interval.bounds()).0 > mrna.coding_length() {
                    debug!("{} interval {} starts past the coding end", mrna.id, interval.label);
                }
                map_interval(mrna, gene.strand, interval)
            })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gff3::GeneReader;
    use std::io::Cursor;

    const PLUS: &str = "\
s1\t.\tgene\t1\t1000\t.\t+\t.\tID=a
s1\t.\tmRNA\t1\t1000\t.\t+\t.\tID=a.1
s1\t.\texon\t100\t109\t.\t+\t.\tID=a.1.e1
s1\t.\texon\t110\t200\t.\t+\t.\tID=a.1.e2
s1\t.\tCDS\t150\t200\t.\t+\t.\tID=a.1.c1
s1\t.\texon\t300\t400\t.\t+\t.\tID=a.1.e3
s1\t.\tCDS\t300\t400\t.\t+\t.\tID=a.1.c2
s1\t.\texon\t600\t900\t.\t+\t.\tID=a.1.e4
s1\t.\tCDS\t600\t603\t.\t+\t.\tID=a.1.c3
s1\t.\texon\t910\t930\t.\t+\t.\tID=a.1.e5
";

    const MINUS: &str = "\
s1\t.\tgene\t1\t1000\t.\t-\t.\tID=a
s1\t.\tmRNA\t1\t1000\t.\t-\t.\tID=a.1
s1\t.\texon\t800\t900\t.\t-\t.\tID=a.1.e1
s1\t.\texon\t600\t700\t.\t-\t.\tID=a.1.e2
s1\t.\tCDS\t600\t650\t.\t-\t.\tID=a.1.c1
s1\t.\texon\t400\t500\t.\t-\t.\tID=a.1.e3
s1\t.\tCDS\t400\t500\t.\t-\t.\tID=a.1.c2
s1\t.\texon\t200\t300\t.\t-\t.\tID=a.1.e4
s1\t.\tCDS\t297\t300\t.\t-\t.\tID=a.1.c3
s1\t.\texon\t10\t150\t.\t-\t.\tID=a.1.e5
";

    /// (transcript, exon, label, interval, strand, exon bounds, hit bounds, coding bounds, phase)
    type Row = (String, usize, String, usize, Strand, u64, u64, u64, u64, i64, i64, String);

    fn phaser(gff: &str, intervals: &str) -> Vec<Row> {
        let table = IntervalTable::from_reader(Cursor::new(intervals.to_owned()), None).unwrap();
        GeneReader::new(Cursor::new(gff.to_owned()))
            .map(|g| g.unwrap())
            .flat_map(|gene| phase_gene(&gene, &table).collect::<Vec<_>>())
            .map(|h| {
                (
                    h.transcript,
                    h.exon,
                    h.label,
                    h.interval,
                    h.strand,
                    h.exon_start,
                    h.exon_end,
                    h.hit_start,
                    h.hit_end,
                    h.coding_start,
                    h.coding_end,
                    h.phase.to_string(),
                )
            })
            .collect()
    }

    #[allow(clippy::too_many_arguments)]
    fn row(
        tx: &str,
        exon: usize,
        interval: usize,
        strand: Strand,
        exon_bounds: (u64, u64),
        hit_bounds: (u64, u64),
        coding: (i64, i64),
        phase: &str,
    ) -> Row {
        (
            tx.into(),
            exon,
            "z".into(),
            interval,
            strand,
            exon_bounds.0,
            exon_bounds.1,
            hit_bounds.0,
            hit_bounds.1,
            coding.0,
            coding.1,
            phase.into(),
        )
    }

    #[test]
    fn test_single_exon() {
        assert_eq!(
            phaser(PLUS, "a.1 z 1 2"),
            vec![row("a.1", 2, 1, Strand::Plus, (110, 200), (150, 155), (1, 6), ".-0")]
        );
        assert_eq!(
            phaser(PLUS, "a.1 z 1 17"),
            vec![row("a.1", 2, 1, Strand::Plus, (110, 200), (150, 200), (1, 51), ".-0")]
        );
        assert_eq!(
            phaser(PLUS, "a.1 z 18 20"),
            vec![row("a.1", 3, 1, Strand::Plus, (300, 400), (300, 308), (52, 60), "0-2")]
        );
        assert_eq!(
            phaser(PLUS, "a.1 z 19 20"),
            vec![row("a.1", 3, 1, Strand::Plus, (300, 400), (303, 308), (55, 60), "0-2")]
        );
    }

    #[test]
    fn test_multi_exon() {
        assert_eq!(
            phaser(PLUS, "a.1 z 1 18"),
            vec![
                row("a.1", 2, 1, Strand::Plus, (110, 200), (150, 200), (1, 51), ".-0"),
                row("a.1", 3, 1, Strand::Plus, (300, 400), (300, 302), (52, 54), "0-2"),
            ]
        );
    }

    #[test]
    fn test_last_coding_exon() {
        // 51 + 101 coding bases precede the final 4-base segment
        assert_eq!(
            phaser(PLUS, "a.1 z 50 51"),
            vec![
                row("a.1", 3, 1, Strand::Plus, (300, 400), (396, 400), (148, 152), "0-2"),
                row("a.1", 4, 1, Strand::Plus, (600, 900), (600, 600), (153, 153), "2-."),
            ]
        );
    }

    #[test]
    fn test_two_intervals_one_mrna() {
        assert_eq!(
            phaser(PLUS, "a.1 z 1 2\na.1 z 4 5"),
            vec![
                row("a.1", 2, 1, Strand::Plus, (110, 200), (150, 155), (1, 6), ".-0"),
                row("a.1", 2, 2, Strand::Plus, (110, 200), (159, 164), (10, 15), ".-0"),
            ]
        );
    }

    #[test]
    fn test_interval_past_coding_end() {
        assert!(phaser(PLUS, "a.1 z 60 70").is_empty());
    }

    #[test]
    fn test_largest_residue() {
        let max = crate::intervals::MAX_RESIDUE;
        assert!(phaser(PLUS, &format!("a.1 z {max} {max}")).is_empty());
        assert_eq!(
            phaser(PLUS, &format!("a.1 z 52 {max}")),
            vec![row("a.1", 4, 1, Strand::Plus, (600, 900), (601, 603), (154, 156), "2-.")]
        );
    }

    #[test]
    fn test_unregistered_transcript() {
        assert!(phaser(PLUS, "b.1 z 1 2").is_empty());
    }

    #[test]
    fn test_minus() {
        assert_eq!(
            phaser(MINUS, "a.1 z 1 2"),
            vec![row("a.1", 2, 1, Strand::Minus, (600, 700), (645, 650), (1, 6), ".-0")]
        );
    }

    #[test]
    fn test_multi_exon_minus() {
        assert_eq!(
            phaser(MINUS, "a.1 z 2 18"),
            vec![
                row("a.1", 2, 1, Strand::Minus, (600, 700), (600, 647), (4, 51), ".-0"),
                row("a.1", 3, 1, Strand::Minus, (400, 500), (498, 500), (52, 54), "0-2"),
            ]
        );
    }

    #[test]
    fn test_hit_display() {
        let table = IntervalTable::from_reader(Cursor::new("a.1 z 1 2"), None).unwrap();
        let gene = GeneReader::new(Cursor::new(PLUS)).next().unwrap().unwrap();
        let lines: Vec<String> = phase_gene(&gene, &table).map(|h| h.to_string()).collect();
        assert_eq!(lines, vec!["z a.1 2 + 110 200 150 155 .-0"]);
    }
}
