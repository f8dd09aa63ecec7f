use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomscanError {
    /// Represents all other cases of `csv::Error`.
    #[error(transparent)]
    CsvError(#[from] csv::Error),
    /// Represents all other cases of `std::io::Error`.
    #[error(transparent)]
    IOError(#[from] std::io::Error),
    /// Represents all other cases of `gb_io::reader::GbParserError`.
    #[error(transparent)]
    GenBankError(#[from] gb_io::reader::GbParserError),
    #[error("Failed to convert OsString to String")]
    FileNameConversionError,
    /// Represents an error when a command execution fails.
    #[error("Failed to execute command '{0}': {1}")]
    CommandExecutionFailed(String, String),
    /// Represents an error when a command exits with a non-zero status code.
    #[error("Command '{0}' exited with status code: {1}")]
    CommandFailed(String, i32),
    /// Represents an error when the search tool cannot be executed, possibly due to it not being installed.
    #[error("Search tool `{0}` cannot be executed - is it installed?")]
    SearchDependencyMissing(String),
    /// Represents an error when the aligner cannot be executed, possibly due to it not being installed.
    #[error("Aligner `{0}` cannot be executed - is it installed?")]
    AlignerDependencyMissing(String),
    /// Raised in strict pattern mode when a translated motif pattern does not compile
    #[error("motif '{name}' translated to an invalid pattern: {source}")]
    PatternCompile {
        name: String,
        #[source]
        source: regex::Error,
    },
    /// Indicates failure to parse a motif database entry without an identifier line
    #[error("motif database entry ending at line {0} has no identifier line")]
    MotifEntryIncomplete(usize),
    /// Indicates failure to parse an integer from a record
    #[error("failed to parse a valid integer from record")]
    RecordIntError(#[from] std::num::ParseIntError),
    /// Indicates failure to parse a float from a record
    #[error("failed to parse a valid float from record")]
    RecordFloatError(#[from] std::num::ParseFloatError),
    /// Indicates failure attempting to read an empty sequence file
    #[error("empty sequence file: {0}")]
    FastaFileIsEmpty(PathBuf),
    /// Indicates failure to find any query sequence files in the query directory
    #[error("no query sequence files found in directory: {0}")]
    NoQueryFiles(PathBuf),
    /// Indicates failure to extract a usable record identifier from an assembly file
    #[error("assembly record without accession, version or locus name in: {0}")]
    AssemblyIdentifierMissing(PathBuf),
    /// Indicates failure to parse a phylogenetic tree in Newick format
    #[error("failed to parse Newick tree: {0}")]
    NewickParse(String),
}
