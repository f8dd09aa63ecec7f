use anyhow::Result;
use clap::Parser;

use crate::domscan::{Domscan, DomscanConfig, OutputOptions};
use crate::search::SearchConfig;
use crate::terminal::{App, Commands};

mod assembly;
mod domain;
mod domscan;
mod error;
mod motif;
mod phylo;
mod plot;
mod search;
mod terminal;
mod utils;

/// Domscan application
///
/// Run the application from arguments provided
/// by the command line interface
fn main() -> Result<()> {
    utils::init_logger();

    let app = App::parse();
    match app.command {
        Commands::Run(args) => {
            let config = DomscanConfig {
                assembly_dir: args.assemblies,
                query_dir: args.queries,
                outdir: args.outdir,
                motifs: args.motifs,
                search: SearchConfig {
                    tool: args.search_tool,
                    max_evalue: args.evalue,
                    min_coverage: args.min_cov,
                    min_identity: args.min_iden,
                    threads: args.threads,
                },
                aligner: args.aligner,
                pattern_mode: args.pattern_mode,
            };
            let domscan = Domscan::from(config)?;
            domscan.run(OutputOptions {
                table: args.table,
                tree: args.tree,
                plot: args.plot,
                plot_width: args.plot_width,
            })?;
        }
        Commands::Extract(args) => {
            assembly::AssemblyExtractor::new(&args.assemblies)
                .extract(&args.fasta, &args.table)?;
        }
        Commands::Search(args) => {
            domscan::run_search(
                &args.query,
                &args.database,
                &args.outdir,
                SearchConfig {
                    tool: args.search_tool,
                    max_evalue: args.evalue,
                    min_coverage: args.min_cov,
                    min_identity: args.min_iden,
                    threads: args.threads,
                },
                args.table,
            )?;
        }
        Commands::Phylo(args) => {
            domscan::run_phylo(&args.fasta, &args.outdir, args.aligner, args.tree)?;
        }
        Commands::Scan(args) => {
            domscan::run_scan(
                &args.fasta,
                &args.motifs,
                &args.outdir,
                args.pattern_mode,
                args.table,
                args.plot.then_some(args.plot_width),
            )?;
        }
    }

    Ok(())
}
