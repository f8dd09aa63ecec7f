use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use gb_io::seq::Seq;
use noodles::fasta;
use noodles::fasta::record::{Definition, Sequence};

use crate::error::DomscanError;

/// Counts reported after extracting an assembly directory
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractStats {
    pub assemblies: usize,
    pub records: usize,
    pub proteins: usize,
}

/// Extracts protein sequences from a directory of GenBank assemblies
///
/// Every annotated feature carrying both a locus tag and a translation
/// becomes one FASTA record identified as `locus_tag@record_id`, so the
/// organism of origin can be recovered from the identifier table.
pub struct AssemblyExtractor {
    assembly_dir: PathBuf,
}

impl AssemblyExtractor {
    pub fn new(assembly_dir: &Path) -> Self {
        Self {
            assembly_dir: assembly_dir.to_path_buf(),
        }
    }
    /// Write the protein multi-FASTA and the record-to-organism table
    ///
    /// Files that contain no GenBank records are skipped with a warning
    /// instead of aborting the extraction.
    pub fn extract(
        &self,
        fasta_out: &PathBuf,
        table_out: &PathBuf,
    ) -> Result<ExtractStats, DomscanError> {
        let mut files: Vec<PathBuf> = std::fs::read_dir(&self.assembly_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .collect();
        files.sort();

        let mut fasta_writer = File::create(fasta_out)
            .map(BufWriter::new)
            .map(fasta::Writer::new)?;
        let mut table_writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .from_path(table_out)?;

        let mut stats = ExtractStats::default();
        for file in files {
            let records = match gb_io::reader::parse_file(&file) {
                Ok(records) => records,
                Err(err) => {
                    log::warn!(
                        "Assembly file {} could not be parsed as GenBank and was skipped: {}",
                        file.display(),
                        err
                    );
                    continue;
                }
            };
            if records.is_empty() {
                log::warn!(
                    "Assembly file {} contains no GenBank records and was skipped",
                    file.display()
                );
                continue;
            }

            stats.assemblies += 1;
            for record in records {
                let record_id = record_identifier(&record)
                    .ok_or_else(|| DomscanError::AssemblyIdentifierMissing(file.clone()))?;
                let organism = record
                    .source
                    .as_ref()
                    .and_then(|source| source.organism.clone())
                    .unwrap_or_else(|| String::from("unknown organism"));

                table_writer.write_record([record_id.as_str(), organism.as_str()])?;
                stats.records += 1;

                for feature in &record.features {
                    let locus_tag = feature.qualifier_values("locus_tag".into()).next();
                    let translation = feature.qualifier_values("translation".into()).next();

                    if let (Some(locus_tag), Some(translation)) = (locus_tag, translation) {
                        let sequence: String =
                            translation.chars().filter(|c| !c.is_whitespace()).collect();
                        let definition =
                            Definition::new(format!("{locus_tag}@{record_id}"), None);
                        fasta_writer.write_record(&fasta::Record::new(
                            definition,
                            Sequence::from(sequence.into_bytes()),
                        ))?;
                        stats.proteins += 1;
                    }
                }
            }
        }

        table_writer.flush()?;
        log::info!(
            "Extracted {} proteins from {} records across {} assemblies",
            stats.proteins,
            stats.records,
            stats.assemblies
        );

        Ok(stats)
    }
}

// LOCUS names are a last resort, versioned accessions identify the
// assembly record unambiguously
fn record_identifier(record: &Seq) -> Option<String> {
    record
        .version
        .clone()
        .or_else(|| record.accession.clone())
        .or_else(|| record.name.clone())
}
