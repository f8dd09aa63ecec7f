use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::motif::PatternMode;
use crate::phylo::Aligner;
use crate::search::SearchTool;

/// Domscan: protein homolog identification and domain annotation for genome assemblies
#[derive(Debug, Parser)]
#[command(author, version, about)]
#[command(styles=get_styles())]
#[command(arg_required_else_help(true))]
#[clap(name = "domscan", version)]
pub struct App {
    #[clap(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Extraction, homology search, tree and domain scan pipeline
    Run(RunArgs),
    /// Protein extraction from genome assemblies
    Extract(ExtractArgs),
    /// Homology search of query proteins against extracted proteins
    Search(SearchArgs),
    /// Alignment and phylogenetic tree of filtered proteins
    Phylo(PhyloArgs),
    /// Motif database scan and domain annotation of proteins
    Scan(ScanArgs),
}

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Directory with genome assemblies in GenBank format
    #[arg(short = 'a', long, value_parser = validate_dir)]
    pub assemblies: PathBuf,
    /// Directory with query proteins, one FASTA file per query
    #[arg(short = 'q', long, value_parser = validate_dir)]
    pub queries: PathBuf,
    /// Motif database in PROSITE format
    #[arg(short = 'm', long, value_parser = validate_file)]
    pub motifs: PathBuf,
    /// Output directory for pipeline results
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,
    /// Search tool for the homology stage
    #[arg(long, default_value = "blastp", help_heading = "Search options")]
    pub search_tool: SearchTool,
    /// Maximum e-value passed to the search tool
    #[arg(short = 'e', long, default_value = "0.01", help_heading = "Search options")]
    pub evalue: f64,
    /// Minimum percent query coverage of a hit
    #[arg(short = 'c', long, default_value = "50", help_heading = "Search options")]
    pub min_cov: f64,
    /// Minimum percent identity of a hit
    #[arg(short = 'n', long, default_value = "50", help_heading = "Search options")]
    pub min_iden: f64,
    /// Threads for the search tool
    #[arg(short = 't', long, default_value = "2", help_heading = "Search options")]
    pub threads: u32,
    /// Aligner used for the alignment and tree stage
    #[arg(long, default_value = "muscle", help_heading = "Tree options")]
    pub aligner: Aligner,
    /// Behavior for motif patterns that do not translate to a valid expression
    #[arg(long, default_value = "lenient", help_heading = "Scan options")]
    pub pattern_mode: PatternMode,
    /// Print formatted hit and domain tables to the console
    #[clap(long, short = 'T', help_heading = "Output options")]
    pub table: bool,
    /// Print the phylogenetic tree to the console
    #[clap(long, help_heading = "Output options")]
    pub tree: bool,
    /// Draw the domain layout plot to the console
    #[clap(long, help_heading = "Output options")]
    pub plot: bool,
    /// Maximum width of the domain layout plot in columns
    #[clap(long, default_value = "80", help_heading = "Output options")]
    pub plot_width: usize,
}

#[derive(Debug, Args)]
pub struct ExtractArgs {
    /// Directory with genome assemblies in GenBank format
    #[arg(short = 'a', long, value_parser = validate_dir)]
    pub assemblies: PathBuf,
    /// Output protein database (.fasta)
    #[arg(short = 'f', long, default_value = "proteins.fasta")]
    pub fasta: PathBuf,
    /// Output record-to-organism table (.tsv)
    #[arg(short = 't', long, default_value = "organisms.tsv")]
    pub table: PathBuf,
}

#[derive(Debug, Args)]
pub struct SearchArgs {
    /// Query proteins in FASTA format
    #[arg(short = 'q', long, value_parser = validate_file)]
    pub query: PathBuf,
    /// Protein database to search against (.fasta)
    #[arg(short = 'd', long, value_parser = validate_file)]
    pub database: PathBuf,
    /// Output directory for search results
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,
    /// Search tool for the homology search
    #[arg(long, default_value = "blastp")]
    pub search_tool: SearchTool,
    /// Maximum e-value passed to the search tool
    #[arg(short = 'e', long, default_value = "0.01")]
    pub evalue: f64,
    /// Minimum percent query coverage of a hit
    #[arg(short = 'c', long, default_value = "50")]
    pub min_cov: f64,
    /// Minimum percent identity of a hit
    #[arg(short = 'n', long, default_value = "50")]
    pub min_iden: f64,
    /// Threads for the search tool
    #[arg(short = 't', long, default_value = "2")]
    pub threads: u32,
    /// Print formatted hit table to the console
    #[clap(long, short = 'T')]
    pub table: bool,
}

#[derive(Debug, Args)]
pub struct PhyloArgs {
    /// Filtered proteins in FASTA format
    #[arg(short = 'f', long, value_parser = validate_file)]
    pub fasta: PathBuf,
    /// Output directory for alignment and tree
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,
    /// Aligner used for alignment and tree construction
    #[arg(long, default_value = "muscle")]
    pub aligner: Aligner,
    /// Print the phylogenetic tree to the console
    #[clap(long)]
    pub tree: bool,
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Proteins to annotate in FASTA format
    #[arg(short = 'f', long, value_parser = validate_file)]
    pub fasta: PathBuf,
    /// Motif database in PROSITE format
    #[arg(short = 'm', long, value_parser = validate_file)]
    pub motifs: PathBuf,
    /// Output directory for the domain report and layouts
    #[arg(short = 'o', long, default_value = ".")]
    pub outdir: PathBuf,
    /// Behavior for motif patterns that do not translate to a valid expression
    #[arg(long, default_value = "lenient")]
    pub pattern_mode: PatternMode,
    /// Print a per-protein summary table to the console
    #[clap(long, short = 'T')]
    pub table: bool,
    /// Draw the domain layout plot to the console
    #[clap(long)]
    pub plot: bool,
    /// Maximum width of the domain layout plot in columns
    #[clap(long, default_value = "80")]
    pub plot_width: usize,
}

/// Validator function to check if a file exists and is valid
fn validate_file(file: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(file);

    if !path.exists() {
        return Err(format!("File not found: {}", file));
    }

    if !path.is_file() {
        return Err(format!("Not a valid file: {}", file));
    }

    Ok(path)
}

/// Validator function to check if a directory exists and is valid
fn validate_dir(dir: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(dir);

    if !path.exists() {
        return Err(format!("Directory not found: {}", dir));
    }

    if !path.is_dir() {
        return Err(format!("Not a valid directory: {}", dir));
    }

    Ok(path)
}

pub fn get_styles() -> clap::builder::Styles {
    clap::builder::Styles::styled()
        .header(
            anstyle::Style::new()
                .bold()
                .underline()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
        )
        .literal(
            anstyle::Style::new()
                .bold()
                .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        App::command().debug_assert();
    }

    #[test]
    fn scan_defaults() {
        let app = App::try_parse_from([
            "domscan",
            "scan",
            "--fasta",
            "tests/cases/filtered.fasta",
            "--motifs",
            "tests/cases/motifs.dat",
        ])
        .unwrap();

        match app.command {
            Commands::Scan(args) => {
                assert_eq!(args.pattern_mode, PatternMode::Lenient);
                assert!(!args.table);
                assert!(!args.plot);
            }
            _ => panic!("expected scan subcommand"),
        }
    }
}
