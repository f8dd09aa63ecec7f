use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use noodles::fasta;
use serde::{Deserialize, Serialize};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::error::DomscanError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
pub enum SearchTool {
    Blastp,
}

impl std::fmt::Display for SearchTool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SearchTool::Blastp => write!(f, "blastp"),
        }
    }
}

/// Filter thresholds for homology search hits
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub tool: SearchTool,
    pub max_evalue: f64,
    pub min_coverage: f64,
    pub min_identity: f64,
    pub threads: u32,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            tool: SearchTool::Blastp,
            max_evalue: 0.01,
            min_coverage: 50.0,
            min_identity: 50.0,
            threads: 2,
        }
    }
}

/// One hit from the tabular search output
///
/// Columns follow the requested output format:
/// qseqid sseqid qcovs pident evalue bitscore sseq
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Tabled)]
pub struct SearchHit {
    #[tabled(rename = "Query")]
    pub query: String,
    #[tabled(rename = "Subject")]
    pub subject: String,
    #[tabled(rename = "Coverage")]
    pub coverage: f64,
    #[tabled(rename = "Identity")]
    pub identity: f64,
    #[tabled(rename = "E-value")]
    pub evalue: f64,
    #[tabled(rename = "Bitscore")]
    pub bitscore: f64,
    #[tabled(rename = "Aligned Sequence")]
    pub sequence: String,
}

/// Homology search against the extracted protein database
///
/// The search tool itself is an external binary invoked per query;
/// this component prepares its inputs, applies the coverage and
/// identity thresholds to its output and writes the filtered protein
/// set for the downstream alignment and scan stages.
pub struct HomologySearch {
    config: SearchConfig,
}

impl HomologySearch {
    pub fn new(config: SearchConfig) -> Result<Self, DomscanError> {
        Self::check_search_dependency(&config.tool)?;
        Ok(Self { config })
    }
    pub fn check_search_dependency(tool: &SearchTool) -> Result<(), DomscanError> {
        for binary in match tool {
            SearchTool::Blastp => ["blastp", "makeblastdb"],
        } {
            run_version_command(binary)
                .map_err(|_| DomscanError::SearchDependencyMissing(binary.to_string()))?;
        }
        Ok(())
    }
    /// Build the protein search database with `makeblastdb`
    pub fn make_database(&self, db_fasta: &PathBuf, output: &PathBuf) -> Result<(), DomscanError> {
        let args = vec![
            "-in".to_string(),
            db_fasta.display().to_string(),
            "-out".to_string(),
            output.display().to_string(),
            "-dbtype".to_string(),
            "prot".to_string(),
        ];
        log::info!("Running command: makeblastdb {}", &args.join(" "));
        run_command(args, "makeblastdb")
    }
    /// Run the search tool for one query against the prepared database
    pub fn run_search(
        &self,
        query: &PathBuf,
        database: &PathBuf,
        output: &PathBuf,
    ) -> Result<(), DomscanError> {
        let args = vec![
            "-query".to_string(),
            query.display().to_string(),
            "-db".to_string(),
            database.display().to_string(),
            "-out".to_string(),
            output.display().to_string(),
            "-outfmt".to_string(),
            "6 qseqid sseqid qcovs pident evalue bitscore sseq".to_string(),
            "-evalue".to_string(),
            self.config.max_evalue.to_string(),
            "-num_threads".to_string(),
            self.config.threads.to_string(),
        ];
        log::info!("Running command: {} {}", self.config.tool, &args.join(" "));
        run_command(args, &self.config.tool.to_string())
    }
    /// Parse the tabular search output and apply the hit thresholds
    pub fn filter_hits(&self, output: &PathBuf) -> Result<Vec<SearchHit>, DomscanError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .delimiter(b'\t')
            .from_path(output)?;

        let mut hits = Vec::new();
        for result in reader.deserialize() {
            let hit: SearchHit = result?;
            if hit.coverage >= self.config.min_coverage && hit.identity >= self.config.min_identity
            {
                hits.push(hit);
            }
        }
        Ok(hits)
    }
    /// Write the filtered hit table with a header line
    pub fn write_hit_table(&self, hits: &[SearchHit], path: &PathBuf) -> Result<(), DomscanError> {
        let mut writer = csv::WriterBuilder::new().delimiter(b'\t').from_path(path)?;
        for hit in hits {
            writer.serialize(hit)?;
        }
        writer.flush()?;
        Ok(())
    }
    pub fn print_hit_table(&self, hits: &[SearchHit]) {
        let mut table = Table::new(hits);
        table.with(Style::modern());
        println!("{}", table);
    }
    /// Write the filtered protein set for the downstream stages
    ///
    /// The query sequences come first so they take part in the
    /// alignment, tree and domain scan, followed by every database
    /// sequence hit at least once, in database order.
    pub fn write_filtered_fasta(
        &self,
        hits: &[SearchHit],
        query_fasta: &PathBuf,
        database_fasta: &PathBuf,
        output: &PathBuf,
    ) -> Result<usize, DomscanError> {
        let subjects: HashSet<String> = hits.iter().map(|hit| hit.subject.clone()).collect();

        let mut writer = File::create(output)
            .map(BufWriter::new)
            .map(fasta::Writer::new)?;

        let mut written = 0;
        let mut query_reader = File::open(query_fasta)
            .map(BufReader::new)
            .map(fasta::Reader::new)?;
        for result in query_reader.records() {
            let record = result?;
            writer.write_record(&record)?;
            written += 1;
        }

        let mut database_reader = File::open(database_fasta)
            .map(BufReader::new)
            .map(fasta::Reader::new)?;
        for result in database_reader.records() {
            let record = result?;
            if subjects.contains(record.name()) {
                writer.write_record(&record)?;
                written += 1;
            }
        }

        Ok(written)
    }
}

// Probe for an installed binary before any stage depends on it
fn run_version_command(program: &str) -> Result<Output, DomscanError> {
    let command = format!("{program} -version");
    let output = Command::new("sh")
        .arg("-c")
        .arg(&command)
        .output()
        .map_err(|e| DomscanError::CommandExecutionFailed(command.clone(), e.to_string()))?;

    if !output.status.success() {
        return Err(DomscanError::CommandFailed(
            command,
            output.status.code().unwrap_or(-1),
        ));
    }

    Ok(output)
}

// Run a command that writes its own output file
pub fn run_command(args: Vec<String>, program: &str) -> Result<(), DomscanError> {
    let output = Command::new(program)
        .args(args)
        .output()
        .map_err(|e| DomscanError::CommandExecutionFailed(program.to_string(), e.to_string()))?;

    if !output.status.success() {
        return Err(DomscanError::CommandFailed(
            format!(
                "{} ({})",
                program,
                String::from_utf8_lossy(&output.stderr).trim()
            ),
            output.status.code().unwrap_or(-1),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn search() -> HomologySearch {
        HomologySearch {
            config: SearchConfig::default(),
        }
    }

    #[test]
    fn hits_filtered_by_coverage_and_identity() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("blastp.tsv");
        let mut file = File::create(&output).unwrap();
        writeln!(file, "query1\tb0001@REC1\t90\t75.0\t1e-30\t250.0\tMKAXC").unwrap();
        writeln!(file, "query1\tb0002@REC1\t30\t80.0\t1e-10\t90.0\tMNCSD").unwrap();
        writeln!(file, "query1\tb0003@REC1\t95\t20.0\t1e-5\t40.0\tMMMMM").unwrap();

        let hits = search().filter_hits(&output).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].subject, "b0001@REC1");
        assert_eq!(hits[0].coverage, 90.0);
        assert_eq!(hits[0].identity, 75.0);
    }

    #[test]
    fn filtered_fasta_contains_query_and_unique_subjects() {
        let dir = tempfile::tempdir().unwrap();
        let query = dir.path().join("query.fasta");
        let database = dir.path().join("database.fasta");
        let output = dir.path().join("filtered.fasta");

        std::fs::write(&query, ">query1\nMKAXCQQ\n").unwrap();
        std::fs::write(
            &database,
            ">b0001@REC1\nMKAXC\n>b0002@REC1\nMNCSD\n>b0003@REC1\nMMMMM\n",
        )
        .unwrap();

        let hit = |subject: &str| SearchHit {
            query: "query1".to_string(),
            subject: subject.to_string(),
            coverage: 90.0,
            identity: 80.0,
            evalue: 1e-20,
            bitscore: 100.0,
            sequence: "MKAXC".to_string(),
        };
        // b0001 hit twice, kept once
        let hits = vec![hit("b0001@REC1"), hit("b0001@REC1"), hit("b0003@REC1")];

        let written = search()
            .write_filtered_fasta(&hits, &query, &database, &output)
            .unwrap();
        assert_eq!(written, 3);

        let fasta = std::fs::read_to_string(&output).unwrap();
        let names: Vec<&str> = fasta
            .lines()
            .filter(|line| line.starts_with('>'))
            .collect();
        assert_eq!(names, vec![">query1", ">b0001@REC1", ">b0003@REC1"]);
    }

    #[test]
    fn hit_table_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hits.tsv");

        let hits = vec![SearchHit {
            query: "query1".to_string(),
            subject: "b0001@REC1".to_string(),
            coverage: 90.0,
            identity: 75.0,
            evalue: 1e-30,
            bitscore: 250.0,
            sequence: "MKAXC".to_string(),
        }];
        search().write_hit_table(&hits, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("query\tsubject\tcoverage\tidentity\tevalue\tbitscore\tsequence\n"));
        assert!(content.contains("query1\tb0001@REC1\t90.0\t75.0\t1e-30\t250.0\tMKAXC"));
    }
}
