use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use noodles::fasta;
use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::DomscanError;
use crate::motif::{MotifDatabase, MotifMatch, MotifScanner, PatternMode};
use crate::utils::sanitize_id;

/// A protein sequence with its identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProteinRecord {
    pub id: String,
    pub sequence: String,
}

/// Read protein records from a FASTA file, in file order
pub fn read_proteins(path: &PathBuf) -> Result<Vec<ProteinRecord>, DomscanError> {
    let mut reader = File::open(path).map(BufReader::new).map(fasta::Reader::new)?;

    let mut proteins = Vec::new();
    for result in reader.records() {
        let record = result?;
        proteins.push(ProteinRecord {
            id: record.name().to_string(),
            sequence: String::from_utf8_lossy(record.sequence().as_ref()).to_string(),
        });
    }

    if proteins.is_empty() {
        return Err(DomscanError::FastaFileIsEmpty(path.to_path_buf()));
    }

    Ok(proteins)
}

/// All motifs found in one protein, in motif database order; may be empty
#[derive(Debug, Clone, PartialEq)]
pub struct DomainReport {
    pub protein_id: String,
    pub matches: Vec<MotifMatch>,
}

/// One positional domain record for the layout output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DomainSpan {
    pub name: String,
    pub start: usize,
    pub end: usize,
    pub length: usize,
}

/// Scans a set of proteins against a motif database
///
/// Produces a report entry for every protein and a layout entry only
/// for proteins with at least one match, so downstream consumers can
/// distinguish "no domains found" from "domain data pending".
pub struct DomainAnnotator {
    scanner: MotifScanner,
}

impl DomainAnnotator {
    pub fn new(database: &MotifDatabase, mode: PatternMode) -> Result<Self, DomscanError> {
        let scanner = MotifScanner::compile(database, mode)?;
        log::info!(
            "Compiled {} motif patterns from {} database entries",
            scanner.compiled(),
            database.len()
        );
        Ok(Self { scanner })
    }
    pub fn annotate(
        &self,
        proteins: &[ProteinRecord],
    ) -> (
        IndexMap<String, DomainReport>,
        IndexMap<String, Vec<DomainSpan>>,
    ) {
        let mut reports = IndexMap::new();
        let mut layouts = IndexMap::new();

        for protein in proteins {
            let matches = self.scanner.scan(&protein.sequence);

            if !matches.is_empty() {
                let spans = matches
                    .iter()
                    .map(|hit| DomainSpan {
                        name: hit.name.clone(),
                        start: hit.start,
                        end: hit.end,
                        length: protein.sequence.len(),
                    })
                    .collect();
                layouts.insert(protein.id.clone(), spans);
            }

            reports.insert(
                protein.id.clone(),
                DomainReport {
                    protein_id: protein.id.clone(),
                    matches,
                },
            );
        }

        (reports, layouts)
    }
}

/// Write the human-readable domain report
///
/// Each protein gets a header, a column line and one tab-separated
/// line per matched motif, followed by a blank separator line.
pub fn write_report<W: Write>(
    reports: &IndexMap<String, DomainReport>,
    writer: &mut W,
) -> Result<(), DomscanError> {
    for report in reports.values() {
        writeln!(writer, ">{}", report.protein_id)?;
        writeln!(writer, "-------------")?;
        writeln!(writer, "Domain\tAccession\tDescription\tSequence")?;
        for hit in &report.matches {
            writeln!(
                writer,
                "{}\t{}\t{}\t{}",
                hit.name, hit.accession, hit.description, hit.matched
            )?;
        }
        writeln!(writer)?;
    }
    Ok(())
}

pub fn write_report_file(
    reports: &IndexMap<String, DomainReport>,
    path: &PathBuf,
) -> Result<(), DomscanError> {
    let mut writer = File::create(path).map(BufWriter::new)?;
    write_report(reports, &mut writer)
}

/// Write one layout file per matched protein into `outdir`
///
/// Proteins without matches have no file at all. Rows are the
/// tab-separated quadruples consumed by the layout plot.
pub fn write_layouts(
    layouts: &IndexMap<String, Vec<DomainSpan>>,
    outdir: &Path,
) -> Result<(), DomscanError> {
    create_dir_all(outdir)?;
    for (protein_id, spans) in layouts {
        let path = outdir.join(format!("{}.tsv", sanitize_id(protein_id)));
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(path)?;
        for span in spans {
            writer.serialize(span)?;
        }
        writer.flush()?;
    }
    Ok(())
}

#[derive(Debug, Clone, Tabled)]
pub struct DomainSummary {
    #[tabled(rename = "Protein")]
    protein: String,
    #[tabled(rename = "Length")]
    length: usize,
    #[tabled(rename = "Domains")]
    domains: usize,
}

/// Print a per-protein summary table to the console
pub fn print_summary_table(proteins: &[ProteinRecord], reports: &IndexMap<String, DomainReport>) {
    let rows: Vec<DomainSummary> = proteins
        .iter()
        .map(|protein| DomainSummary {
            protein: protein.id.clone(),
            length: protein.sequence.len(),
            domains: reports
                .get(&protein.id)
                .map(|report| report.matches.len())
                .unwrap_or(0),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::modern());
    println!("{}", table);
}
