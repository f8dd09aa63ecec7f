use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};

use crate::error::DomscanError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, clap::ValueEnum)]
pub enum Aligner {
    Muscle,
}

impl std::fmt::Display for Aligner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Aligner::Muscle => write!(f, "muscle"),
        }
    }
}

/// Multiple alignment and tree construction for the filtered proteins
///
/// Both stages are the external aligner binary invoked as a
/// subprocess; the aligner writes progress to stderr even on success,
/// so stderr is silenced and only the exit status is checked.
pub struct TreeBuilder {
    aligner: Aligner,
}

impl TreeBuilder {
    pub fn new(aligner: Aligner) -> Result<Self, DomscanError> {
        Self::check_aligner_dependency(&aligner)?;
        Ok(Self { aligner })
    }
    pub fn check_aligner_dependency(aligner: &Aligner) -> Result<(), DomscanError> {
        let status = Command::new(aligner.to_string())
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|_| DomscanError::AlignerDependencyMissing(aligner.to_string()))?;
        if !status.success() {
            return Err(DomscanError::AlignerDependencyMissing(aligner.to_string()));
        }
        Ok(())
    }
    /// Align the filtered proteins
    pub fn align(&self, input: &PathBuf, output: &PathBuf) -> Result<(), DomscanError> {
        self.run_aligner(vec![
            "-in".to_string(),
            input.display().to_string(),
            "-out".to_string(),
            output.display().to_string(),
        ])
    }
    /// Build a Newick tree from the alignment
    pub fn make_tree(&self, alignment: &PathBuf, output: &PathBuf) -> Result<(), DomscanError> {
        self.run_aligner(vec![
            "-maketree".to_string(),
            "-in".to_string(),
            alignment.display().to_string(),
            "-out".to_string(),
            output.display().to_string(),
        ])
    }
    fn run_aligner(&self, args: Vec<String>) -> Result<(), DomscanError> {
        log::info!("Running command: {} {}", self.aligner, &args.join(" "));
        let status = Command::new(self.aligner.to_string())
            .args(args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| {
                DomscanError::CommandExecutionFailed(self.aligner.to_string(), e.to_string())
            })?;

        if !status.success() {
            return Err(DomscanError::CommandFailed(
                self.aligner.to_string(),
                status.code().unwrap_or(-1),
            ));
        }
        Ok(())
    }
}

/// One node of a parsed phylogenetic tree
#[derive(Debug, Clone, PartialEq)]
pub struct TreeNode {
    pub name: Option<String>,
    pub branch_length: Option<f64>,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }
    pub fn leaf_count(&self) -> usize {
        match self.is_leaf() {
            true => 1,
            false => self.children.iter().map(TreeNode::leaf_count).sum(),
        }
    }
}

/// Parse a tree in Newick format
///
/// Supports the standard grammar: nested parenthesized children with
/// optional node labels and `:length` branch lengths, terminated by a
/// semicolon.
pub fn parse_newick(input: &str) -> Result<TreeNode, DomscanError> {
    let mut parser = NewickParser {
        input: input.as_bytes(),
        pos: 0,
    };
    parser.skip_whitespace();
    let root = parser.parse_subtree()?;
    parser.skip_whitespace();
    match parser.peek() {
        Some(b';') => Ok(root),
        _ => Err(DomscanError::NewickParse(String::from(
            "expected ';' at end of tree",
        ))),
    }
}

struct NewickParser<'a> {
    input: &'a [u8],
    pos: usize,
}

impl<'a> NewickParser<'a> {
    fn peek(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }
    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(b) if b.is_ascii_whitespace()) {
            self.pos += 1;
        }
    }
    fn parse_subtree(&mut self) -> Result<TreeNode, DomscanError> {
        self.skip_whitespace();

        let mut children = Vec::new();
        if self.peek() == Some(b'(') {
            self.pos += 1;
            loop {
                children.push(self.parse_subtree()?);
                self.skip_whitespace();
                match self.peek() {
                    Some(b',') => self.pos += 1,
                    Some(b')') => {
                        self.pos += 1;
                        break;
                    }
                    _ => {
                        return Err(DomscanError::NewickParse(format!(
                            "expected ',' or ')' at position {}",
                            self.pos
                        )))
                    }
                }
            }
        }

        let name = self.parse_label();
        let branch_length = self.parse_branch_length()?;

        Ok(TreeNode {
            name,
            branch_length,
            children,
        })
    }
    fn parse_label(&mut self) -> Option<String> {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'(' | b')' | b',' | b':' | b';') || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        match self.pos > start {
            true => Some(String::from_utf8_lossy(&self.input[start..self.pos]).to_string()),
            false => None,
        }
    }
    fn parse_branch_length(&mut self) -> Result<Option<f64>, DomscanError> {
        self.skip_whitespace();
        if self.peek() != Some(b':') {
            return Ok(None);
        }
        self.pos += 1;
        let start = self.pos;
        while let Some(b) = self.peek() {
            if matches!(b, b'(' | b')' | b',' | b':' | b';') || b.is_ascii_whitespace() {
                break;
            }
            self.pos += 1;
        }
        let text = String::from_utf8_lossy(&self.input[start..self.pos]).to_string();
        let length = text
            .parse::<f64>()
            .map_err(|_| DomscanError::NewickParse(format!("invalid branch length '{text}'")))?;
        Ok(Some(length))
    }
}

/// Render the tree as an indented ASCII outline
pub fn render_tree<W: Write>(node: &TreeNode, writer: &mut W) -> Result<(), DomscanError> {
    render_node(node, writer, "", true)?;
    Ok(())
}

fn render_node<W: Write>(
    node: &TreeNode,
    writer: &mut W,
    prefix: &str,
    last: bool,
) -> Result<(), DomscanError> {
    let connector = if prefix.is_empty() {
        ""
    } else if last {
        "└── "
    } else {
        "├── "
    };
    let label = node.name.as_deref().unwrap_or("*");
    match node.branch_length {
        Some(length) => writeln!(writer, "{prefix}{connector}{label} ({length})")?,
        None => writeln!(writer, "{prefix}{connector}{label}")?,
    }

    // the root has no connector but its children do
    let child_prefix = if prefix.is_empty() {
        String::from(" ")
    } else if last {
        format!("{prefix}    ")
    } else {
        format!("{prefix}│   ")
    };

    for (index, child) in node.children.iter().enumerate() {
        render_node(child, writer, &child_prefix, index + 1 == node.children.len())?;
    }
    Ok(())
}

/// Parse a Newick tree file and print it to stdout
pub fn print_tree(path: &PathBuf) -> Result<(), DomscanError> {
    let newick = std::fs::read_to_string(path)?;
    let tree = parse_newick(&newick)?;
    log::info!("Phylogenetic tree with {} leaf sequences", tree.leaf_count());
    let mut stdout = std::io::stdout();
    render_tree(&tree, &mut stdout)?;
    Ok(())
}
