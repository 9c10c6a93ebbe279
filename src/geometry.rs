//! Strand-aware predicates and conversions over 1-based inclusive intervals.

use crate::structures::Strand;

fn ordered((a, b): (u64, u64)) -> (u64, u64) {
    if a <= b { (a, b) } else { (b, a) }
}

/// True if position `a` is at or past `b` in the direction of transcription.
pub fn downstream(a: u64, b: u64, strand: Strand) -> bool {
    match strand {
        Strand::Plus => a >= b,
        Strand::Minus => a <= b,
    }
}

/// True if position `a` is at or before `b` in the direction of transcription.
pub fn upstream(a: u64, b: u64, strand: Strand) -> bool {
    match strand {
        Strand::Plus => a <= b,
        Strand::Minus => a >= b,
    }
}

/// Inclusive containment. Bounds of either interval may be given in any order.
pub fn within(inner: (u64, u64), outer: (u64, u64)) -> bool {
    let (a1, a2) = ordered(inner);
    let (b1, b2) = ordered(outer);
    a1 >= b1 && a2 <= b2
}

/// True if the closed intervals share at least one coordinate.
pub fn overlaps(x: (u64, u64), y: (u64, u64)) -> bool {
    let (x1, x2) = ordered(x);
    let (y1, y2) = ordered(y);
    x1 <= y2 && y1 <= x2
}

/// Expands amino-acid positions to the nucleotides of their full codons.
///
/// Positions are 1-based; residue `p` starts at base `(p - 1) * 3 + 1`.
/// Results saturate at `u64::MAX` instead of wrapping.
pub fn to_nucleotide((p1, p2): (u64, u64)) -> (u64, u64) {
    let first_base = |p: u64| p.saturating_sub(1).saturating_mul(3).saturating_add(1);
    (first_base(p1), first_base(p2).saturating_add(2))
}

/// Projects `budget`, counted in bases from the start of a coding region, onto
/// the genomic `segment` that holds those bases.
///
/// Returns the genomic sub-interval, low coordinate first, or `None` when the
/// budget starts beyond the far end of the segment. On the minus strand
/// relative base 1 is the segment's high coordinate.
pub fn clip_to_segment(budget: (i64, i64), segment: (u64, u64), minus: bool) -> Option<(u64, u64)> {
    let lo = i64::try_from(segment.0).ok()?;
    let hi = i64::try_from(segment.1).ok()?;
    let (first, last) = budget;

    if minus {
        let near = hi.saturating_sub(first).saturating_add(1);
        let far = hi.saturating_sub(last).saturating_add(1);
        if near < lo {
            return None;
        }
        Some((far.max(lo) as u64, near as u64))
    } else {
        let near = first.saturating_add(lo).saturating_sub(1);
        let far = last.saturating_add(lo).saturating_sub(1);
        if near > hi {
            return None;
        }
        Some((near as u64, far.min(hi) as u64))
    }
}
