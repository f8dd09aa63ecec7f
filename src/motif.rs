use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::DomscanError;

/// Behavior for motif patterns whose translation does not compile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
pub enum PatternMode {
    /// Log and skip the offending motif for every sequence
    Lenient,
    /// Abort the scan with a diagnosable error naming the motif
    Strict,
}

impl Default for PatternMode {
    fn default() -> Self {
        PatternMode::Lenient
    }
}

/// One record from the motif database
///
/// Entries without a pattern (matrix and rule entries in PROSITE
/// flat files) carry `pattern: None` and are skipped by the scanner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotifEntry {
    pub name: String,
    pub accession: String,
    pub description: String,
    pub pattern: Option<String>,
}

/// Motif database materialized from a PROSITE flat file
///
/// All entries are held in memory so the database can be enumerated
/// once per sequence without re-opening its origin.
#[derive(Debug, Clone, Default)]
pub struct MotifDatabase {
    entries: Vec<MotifEntry>,
}

impl MotifDatabase {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, DomscanError> {
        let reader = File::open(path).map(BufReader::new)?;
        Self::from_reader(reader)
    }
    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self, DomscanError> {
        let mut entries = Vec::new();

        let mut name: Option<String> = None;
        let mut accession = String::new();
        let mut description = String::new();
        let mut pattern = String::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            if line.starts_with("//") {
                // blank separators between entries have no identifier line
                if name.is_none() && accession.is_empty() && pattern.is_empty() {
                    continue;
                }
                let name = name
                    .take()
                    .ok_or(DomscanError::MotifEntryIncomplete(line_number + 1))?;
                entries.push(MotifEntry {
                    name,
                    accession: std::mem::take(&mut accession),
                    description: std::mem::take(&mut description),
                    pattern: match pattern.is_empty() {
                        true => None,
                        false => Some(std::mem::take(&mut pattern)),
                    },
                });
                continue;
            }

            let (code, data) = match line.split_once(char::is_whitespace) {
                Some((code, data)) => (code, data.trim_start()),
                None => continue,
            };

            match code {
                "ID" => {
                    let identifier = match data.split_once(';') {
                        Some((identifier, _)) => identifier,
                        None => data,
                    };
                    name = Some(identifier.trim().to_string());
                }
                "AC" => {
                    accession = data.trim_end_matches(';').trim().to_string();
                }
                "DE" => {
                    if !description.is_empty() {
                        description.push(' ');
                    }
                    description.push_str(data.trim());
                }
                // long patterns continue over multiple PA lines and are
                // concatenated without a separator
                "PA" => pattern.push_str(data.trim()),
                _ => {}
            }
        }

        Ok(Self { entries })
    }
    pub fn entries(&self) -> &[MotifEntry] {
        &self.entries
    }
    pub fn len(&self) -> usize {
        self.entries.len()
    }
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Translates a PROSITE pattern into a regular expression
///
/// The translation is an ordered sequence of literal substitutions;
/// hyphen removal must run before parentheses become quantifier braces
/// so that position separators never survive into the output. The
/// trailing character is the end-of-pattern marker and is stripped, its
/// presence is assumed and not validated.
///
/// No semantic validation is performed: a malformed source pattern
/// yields a pattern that fails to compile or matches nothing, which the
/// scanner resolves according to its [`PatternMode`].
pub fn translate_pattern(pattern: &str) -> String {
    let mut translated = pattern
        .replace('x', ".")
        .replace('{', "[^")
        .replace('}', "]")
        .replace('-', "")
        .replace('(', "{")
        .replace(')', "}")
        .replace('<', "^")
        .replace('>', "$");
    translated.pop();
    translated
}

/// A single motif matched within one protein sequence
///
/// Offsets are 0-based with an exclusive end, so that
/// `&sequence[start..end] == matched`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotifMatch {
    pub name: String,
    pub accession: String,
    pub description: String,
    pub matched: String,
    pub start: usize,
    pub end: usize,
}

struct CompiledMotif {
    entry: MotifEntry,
    regex: Regex,
}

/// Scanner holding the translated and compiled patterns of a motif database
///
/// Compilation happens once; the same scanner is reused across every
/// sequence of a scan so database enumeration order and cost do not
/// depend on the number of sequences.
pub struct MotifScanner {
    motifs: Vec<CompiledMotif>,
}

impl MotifScanner {
    pub fn compile(database: &MotifDatabase, mode: PatternMode) -> Result<Self, DomscanError> {
        let mut motifs = Vec::new();
        for entry in database.entries() {
            let pattern = match &entry.pattern {
                Some(pattern) if !pattern.is_empty() => pattern,
                _ => continue,
            };
            let translated = translate_pattern(pattern);
            match Regex::new(&translated) {
                Ok(regex) => motifs.push(CompiledMotif {
                    entry: entry.clone(),
                    regex,
                }),
                Err(err) => match mode {
                    PatternMode::Strict => {
                        return Err(DomscanError::PatternCompile {
                            name: entry.name.clone(),
                            source: err,
                        })
                    }
                    PatternMode::Lenient => {
                        log::warn!(
                            "Motif {} has an untranslatable pattern and was skipped: {}",
                            entry.name,
                            err
                        );
                    }
                },
            }
        }
        Ok(Self { motifs })
    }
    /// Number of motifs with a usable compiled pattern
    pub fn compiled(&self) -> usize {
        self.motifs.len()
    }
    /// Scan one sequence against every compiled motif
    ///
    /// Emits at most one match per motif, the leftmost one, in
    /// database order. Sequences that match nothing yield an empty
    /// vector, not an error.
    pub fn scan(&self, sequence: &str) -> Vec<MotifMatch> {
        let mut matches = Vec::new();
        for motif in &self.motifs {
            if let Some(hit) = motif.regex.find(sequence) {
                matches.push(MotifMatch {
                    name: motif.entry.name.clone(),
                    accession: motif.entry.accession.clone(),
                    description: motif.entry.description.clone(),
                    matched: hit.as_str().to_string(),
                    start: hit.start(),
                    end: hit.end(),
                });
            }
        }
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn entry(name: &str, pattern: Option<&str>) -> MotifEntry {
        MotifEntry {
            name: name.to_string(),
            accession: format!("PS_{name}"),
            description: format!("{name} site"),
            pattern: pattern.map(String::from),
        }
    }

    fn database(entries: Vec<MotifEntry>) -> MotifDatabase {
        MotifDatabase { entries }
    }

    #[test]
    fn pattern_translation_table() {
        let cases = vec![
            ("A-x-[ST]-x(2)-D.", "A.[ST].{2}D"),
            ("N-{P}-[ST]-{P}.", "N[^P][ST][^P]"),
            ("<M-x(4)-K.", "^M.{4}K"),
            ("C-x(2,4)-C>.", "C.{2,4}C$"),
            ("[RK](2)-x-[ST].", "[RK]{2}.[ST]"),
            ("W.", "W"),
        ];
        for (prosite, expected) in cases {
            assert_eq!(translate_pattern(prosite), expected);
        }
    }

    #[test]
    fn prosite_flat_file_parsing() {
        let data = "\
CC   *************************\nCC   ** Release header text **\nCC   *************************\nCC\n//\nID   ASN_GLYCOSYLATION; PATTERN.\nAC   PS00001;\nDT   APR-1990 (CREATED); APR-1990 (DATA UPDATE).\nDE   N-glycosylation site.\nPA   N-{P}-[ST]-{P}.\nNR   /RELEASE=2024_01;\n//\nID   LONG_MOTIF; PATTERN.\nAC   PS00002;\nDE   Motif with a pattern spanning\nDE   two description lines.\nPA   A-x-\nPA   C.\n//\nID   SOME_MATRIX; MATRIX.\nAC   PS50001;\nDE   Profile entry without a pattern.\nMA   /GENERAL_SPEC: ALPHABET='ACDEFGHIKLMNPQRSTVWY';\n//\n";
        let db = MotifDatabase::from_reader(Cursor::new(data)).unwrap();

        assert_eq!(db.len(), 3);
        assert!(!db.is_empty());
        assert_eq!(db.entries()[0].name, "ASN_GLYCOSYLATION");
        assert_eq!(db.entries()[0].accession, "PS00001");
        assert_eq!(db.entries()[0].description, "N-glycosylation site.");
        assert_eq!(db.entries()[0].pattern.as_deref(), Some("N-{P}-[ST]-{P}."));

        // multi-line patterns concatenate without a separator
        assert_eq!(db.entries()[1].pattern.as_deref(), Some("A-x-C."));
        assert_eq!(
            db.entries()[1].description,
            "Motif with a pattern spanning two description lines."
        );

        // matrix entries have no PA line at all
        assert_eq!(db.entries()[2].pattern, None);
    }

    #[test]
    fn entries_without_pattern_never_match() {
        let db = database(vec![entry("NO_PATTERN", None), entry("EMPTY", Some(""))]);
        let scanner = MotifScanner::compile(&db, PatternMode::Strict).unwrap();
        assert_eq!(scanner.compiled(), 0);
        assert!(scanner.scan("ACDEFGHIKLMNPQRSTVWY").is_empty());
    }

    #[test]
    fn first_match_only() {
        let db = database(vec![entry("REPEATED", Some("A-x-C."))]);
        let scanner = MotifScanner::compile(&db, PatternMode::Strict).unwrap();

        // pattern occurs at offsets 0 and 5, only the leftmost is kept
        let matches = scanner.scan("AXCQQAXC");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].start, 0);
        assert_eq!(matches[0].end, 3);
        assert_eq!(matches[0].matched, "AXC");
    }

    #[test]
    fn match_offsets_slice_the_sequence() {
        let db = database(vec![
            entry("GLYC", Some("N-{P}-[ST]-{P}.")),
            entry("ANCHORED", Some("<M-K.")),
            entry("ABSENT", Some("W-W-W.")),
        ]);
        let scanner = MotifScanner::compile(&db, PatternMode::Strict).unwrap();

        let sequence = "MKANCSDE";
        let matches = scanner.scan(sequence);
        assert_eq!(matches.len(), 2);
        for hit in &matches {
            assert!(hit.start < hit.end && hit.end <= sequence.len());
            assert_eq!(&sequence[hit.start..hit.end], hit.matched);
        }
        // output follows database order, not match position
        assert_eq!(matches[0].name, "GLYC");
        assert_eq!(matches[1].name, "ANCHORED");
        assert_eq!(matches[1].start, 0);
    }

    #[test]
    fn anchored_end_pattern() {
        let db = database(vec![entry("TERMINAL", Some("D-E>."))]);
        let scanner = MotifScanner::compile(&db, PatternMode::Strict).unwrap();

        assert_eq!(scanner.scan("MKDE").len(), 1);
        assert!(scanner.scan("MKDEA").is_empty());
    }

    #[test]
    fn lenient_mode_skips_uncompilable_patterns() {
        // unbalanced exclusion brace translates to an unclosed class
        let db = database(vec![
            entry("BROKEN", Some("{P-x.")),
            entry("VALID", Some("A-x-C.")),
        ]);
        let scanner = MotifScanner::compile(&db, PatternMode::Lenient).unwrap();
        assert_eq!(scanner.compiled(), 1);

        let matches = scanner.scan("AXC");
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].name, "VALID");
    }

    #[test]
    fn strict_mode_surfaces_uncompilable_patterns() {
        let db = database(vec![entry("BROKEN", Some("{P-x."))]);
        let result = MotifScanner::compile(&db, PatternMode::Strict);
        assert!(matches!(
            result,
            Err(DomscanError::PatternCompile { ref name, .. }) if name == "BROKEN"
        ));
    }

    #[test]
    fn empty_sequence_yields_no_matches() {
        let db = database(vec![entry("GLYC", Some("N-{P}-[ST]-{P}."))]);
        let scanner = MotifScanner::compile(&db, PatternMode::Strict).unwrap();
        assert!(scanner.scan("").is_empty());
    }
}
