//! Maps protein-level intervals onto the exons of spliced gene models.

pub mod config;
pub mod error;
pub mod geometry;
pub mod gff3;
pub mod intervals;
pub mod phaser;
pub mod structures;
pub mod transcript_builder;

use crate::config::Config;
use crate::gff3::valid_genes;
use crate::intervals::IntervalTable;
use crate::phaser::phase_gene;
use anyhow::{Context, Result};
use log::info;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

/// Runs the whole pipeline described by `config`, writing result lines to `out`.
///
/// Without an interval table every parsed exon is listed; otherwise one line is
/// written per exon hit by a registered protein interval.
pub fn run<W: Write>(config: &Config, mut out: W) -> Result<()> {
    if config.listing_only() {
        info!("no interval table given, listing parsed gene models");
    }

    let table = match &config.intervals {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("cannot open interval table {}", path.display()))?;
            let table = IntervalTable::from_reader(BufReader::new(file), config.delimiter.as_deref())?;
            info!("loaded intervals for {} transcripts", table.len());
            Some(table)
        }
        None => None,
    };

    let gff: Box<dyn BufRead> = match &config.gff {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("cannot open gene models {}", path.display()))?,
        )),
        None => Box::new(io::stdin().lock()),
    };

    let (mut genes, mut lines) = (0usize, 0usize);
    for gene in valid_genes(gff) {
        let gene = gene?;
        genes += 1;
        match &table {
            Some(table) => {
                for hit in phase_gene(&gene, table) {
                    writeln!(out, "{hit}")?;
                    lines += 1;
                }
            }
            None => {
                for row in gene.listing() {
                    writeln!(out, "{row}")?;
                    lines += 1;
                }
            }
        }
    }
    out.flush()?;

    info!("{genes} valid genes, {lines} lines written");
    Ok(())
}
