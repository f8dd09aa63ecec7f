use std::fs::create_dir_all;
use std::path::PathBuf;

use itertools::Itertools;

use crate::assembly::AssemblyExtractor;
use crate::domain::{
    print_summary_table, read_proteins, write_layouts, write_report_file, DomainAnnotator,
};
use crate::error::DomscanError;
use crate::motif::{MotifDatabase, PatternMode};
use crate::phylo::{print_tree, Aligner, TreeBuilder};
use crate::plot::DomainPlot;
use crate::search::{HomologySearch, SearchConfig};
use crate::utils::{get_file_component, FileComponent};

/// Pipeline configuration assembled from the command line
#[derive(Debug, Clone)]
pub struct DomscanConfig {
    pub assembly_dir: PathBuf,
    pub query_dir: PathBuf,
    pub outdir: PathBuf,
    pub motifs: PathBuf,
    pub search: SearchConfig,
    pub aligner: Aligner,
    pub pattern_mode: PatternMode,
}

/// Output toggles for the pipeline stages
#[derive(Debug, Clone, Copy)]
pub struct OutputOptions {
    pub table: bool,
    pub tree: bool,
    pub plot: bool,
    pub plot_width: usize,
}

/// Domscan application structure
///
/// Drives the full analysis: protein extraction from the assemblies,
/// homology search per query, alignment and tree construction of the
/// filtered proteins, and the motif database scan with its report and
/// layout outputs.
pub struct Domscan {
    config: DomscanConfig,
}

impl Domscan {
    pub fn from(config: DomscanConfig) -> Result<Self, DomscanError> {
        Ok(Self { config })
    }
    pub fn run(&self, options: OutputOptions) -> Result<(), DomscanError> {
        create_dir_all(&self.config.outdir)?;

        log::info!(
            "Protein extraction from assemblies in: {}",
            self.config.assembly_dir.display()
        );
        let proteins_fasta = self.config.outdir.join("proteins.fasta");
        let organisms_table = self.config.outdir.join("organisms.tsv");
        AssemblyExtractor::new(&self.config.assembly_dir)
            .extract(&proteins_fasta, &organisms_table)?;

        log::info!(
            "Homology search against extracted proteins ({})",
            self.config.search.tool
        );
        let search = HomologySearch::new(self.config.search.clone())?;
        let blast_db = self.config.outdir.join("blastdb");
        search.make_database(&proteins_fasta, &blast_db)?;

        log::info!(
            "Motif database from: {}",
            self.config.motifs.display()
        );
        let motifs = MotifDatabase::from_path(&self.config.motifs)?;
        let annotator = DomainAnnotator::new(&motifs, self.config.pattern_mode)?;

        let tree_builder = TreeBuilder::new(self.config.aligner.clone())?;

        for query in self.query_files()? {
            let query_name = get_file_component(&query, FileComponent::FileStem)?;
            log::info!("Starting analysis for query: {}", query_name);

            let result_dir = self.config.outdir.join(&query_name);
            create_dir_all(&result_dir)?;

            let search_output = result_dir.join("search.tsv");
            search.run_search(&query, &blast_db, &search_output)?;

            let hits = search.filter_hits(&search_output)?;
            if hits.is_empty() {
                log::warn!("No hits found for query {}, analysis skipped", query_name);
                continue;
            }
            log::info!("Search retained {} hits for query {}", hits.len(), query_name);
            search.write_hit_table(&hits, &result_dir.join("hits.tsv"))?;
            if options.table {
                search.print_hit_table(&hits);
            }

            let filtered_fasta = result_dir.join("filtered.fasta");
            search.write_filtered_fasta(&hits, &query, &proteins_fasta, &filtered_fasta)?;

            log::info!("Alignment and tree construction ({})", self.config.aligner);
            let aligned_fasta = result_dir.join("aligned.fasta");
            let tree_file = result_dir.join("tree.nw");
            tree_builder.align(&filtered_fasta, &aligned_fasta)?;
            tree_builder.make_tree(&aligned_fasta, &tree_file)?;
            if options.tree {
                print_tree(&tree_file)?;
            }

            log::info!("Domain scan of filtered proteins for query {}", query_name);
            let proteins = read_proteins(&filtered_fasta)?;
            let (reports, layouts) = annotator.annotate(&proteins);
            write_report_file(&reports, &result_dir.join("domains.txt"))?;
            write_layouts(&layouts, &result_dir.join("layouts"))?;
            if options.table {
                print_summary_table(&proteins, &reports);
            }
            if options.plot {
                DomainPlot::new(options.plot_width, 20).render(&layouts)?;
            }
        }

        Ok(())
    }
    // Queries are one FASTA file each, enumerated in name order so
    // repeated runs process them identically
    fn query_files(&self) -> Result<Vec<PathBuf>, DomscanError> {
        let queries: Vec<PathBuf> = std::fs::read_dir(&self.config.query_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                matches!(
                    path.extension().and_then(|ext| ext.to_str()),
                    Some("fasta" | "fa" | "faa")
                )
            })
            .sorted()
            .collect();

        if queries.is_empty() {
            return Err(DomscanError::NoQueryFiles(self.config.query_dir.clone()));
        }
        Ok(queries)
    }
}

/// Driver for the standalone `scan` subcommand
pub fn run_scan(
    fasta: &PathBuf,
    motifs: &PathBuf,
    outdir: &PathBuf,
    mode: PatternMode,
    table: bool,
    plot: Option<usize>,
) -> Result<(), DomscanError> {
    create_dir_all(outdir)?;

    let database = MotifDatabase::from_path(motifs)?;
    let annotator = DomainAnnotator::new(&database, mode)?;
    let proteins = read_proteins(fasta)?;

    let (reports, layouts) = annotator.annotate(&proteins);
    let report_file = outdir.join("domains.txt");
    write_report_file(&reports, &report_file)?;
    write_layouts(&layouts, &outdir.join("layouts"))?;
    log::info!(
        "Domain report for {} proteins ({} with at least one match) written to: {}",
        reports.len(),
        layouts.len(),
        report_file.display()
    );

    if table {
        print_summary_table(&proteins, &reports);
    }
    if let Some(width) = plot {
        DomainPlot::new(width, 20).render(&layouts)?;
    }
    Ok(())
}

/// Driver for the standalone `search` subcommand
pub fn run_search(
    query: &PathBuf,
    database_fasta: &PathBuf,
    outdir: &PathBuf,
    config: SearchConfig,
    table: bool,
) -> Result<(), DomscanError> {
    create_dir_all(outdir)?;

    let search = HomologySearch::new(config)?;
    let blast_db = outdir.join("blastdb");
    search.make_database(database_fasta, &blast_db)?;

    let search_output = outdir.join("search.tsv");
    search.run_search(query, &blast_db, &search_output)?;

    let hits = search.filter_hits(&search_output)?;
    log::info!("Search retained {} hits after filtering", hits.len());
    search.write_hit_table(&hits, &outdir.join("hits.tsv"))?;

    if !hits.is_empty() {
        let filtered = outdir.join("filtered.fasta");
        let written = search.write_filtered_fasta(&hits, query, database_fasta, &filtered)?;
        log::info!("Filtered protein set of {} sequences written to: {}", written, filtered.display());
    }
    if table {
        search.print_hit_table(&hits);
    }
    Ok(())
}

/// Driver for the standalone `phylo` subcommand
pub fn run_phylo(
    fasta: &PathBuf,
    outdir: &PathBuf,
    aligner: Aligner,
    tree: bool,
) -> Result<(), DomscanError> {
    create_dir_all(outdir)?;

    let tree_builder = TreeBuilder::new(aligner)?;
    let aligned_fasta = outdir.join("aligned.fasta");
    let tree_file = outdir.join("tree.nw");
    tree_builder.align(fasta, &aligned_fasta)?;
    tree_builder.make_tree(&aligned_fasta, &tree_file)?;
    log::info!("Phylogenetic tree written to: {}", tree_file.display());

    if tree {
        print_tree(&tree_file)?;
    }
    Ok(())
}
