//! Command-line tool that builds a node tree from XML files and dumps it.
//!
//! By default each file's tree is printed one node per line. `--text` prints
//! the root's concatenated text instead and `--stats` prints node counts.

use std::fs;
use std::io::{self, Read};
use std::process::ExitCode;
use std::time::Instant;

use clap::Parser;

use saxtree::tree::format_tree;
use saxtree::{BuildOptions, Document, Node, NodeKind};

/// xmldump -- build a node tree from XML and print it.
#[derive(Parser, Debug)]
#[command(name = "xmldump", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// XML files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Print diagnostics and enable debug logging.
    #[arg(long)]
    verbose: bool,

    /// Print the concatenated text of the root element.
    #[arg(long, conflicts_with = "stats")]
    text: bool,

    /// Print node counts instead of the tree.
    #[arg(long)]
    stats: bool,

    /// Print timing information for reading and building.
    #[arg(long)]
    timing: bool,

    /// Keep whitespace-only text runs as text nodes.
    #[arg(long = "keep-blanks")]
    keep_blanks: bool,

    /// Maximum element nesting depth (unlimited if not given).
    #[arg(long, value_name = "N")]
    max_depth: Option<u32>,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_IO_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();
    let filter = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let mut worst_exit = EXIT_SUCCESS;
    for file in &cli.files {
        worst_exit = worst_exit.max(process_file(&cli, file));
    }
    ExitCode::from(worst_exit)
}

/// Processes a single input file and returns an exit code.
fn process_file(cli: &Cli, filename: &str) -> u8 {
    let start_read = Instant::now();
    let input = match read_input(filename) {
        Ok(data) => data,
        Err(e) => {
            eprintln!("{filename}: failed to read: {e}");
            return EXIT_IO_ERROR;
        }
    };
    if cli.timing {
        eprintln!("Reading file {filename} took {:?}", start_read.elapsed());
    }

    let mut options = BuildOptions::default().preserve_whitespace(cli.keep_blanks);
    if let Some(max) = cli.max_depth {
        options = options.max_depth(max);
    }
    let mut doc = Document::with_options(options);

    let start_build = Instant::now();
    if let Err(e) = doc.parse_str(&input) {
        eprintln!("{filename}: {e}");
        return EXIT_PARSE_ERROR;
    }
    if cli.timing {
        eprintln!("Building tree took {:?}", start_build.elapsed());
    }

    if cli.verbose {
        for diag in doc.diagnostics() {
            eprintln!("{filename}: {diag}");
        }
    }

    let Some(root) = doc.root() else {
        eprintln!("{filename}: document has no root element");
        return EXIT_PARSE_ERROR;
    };

    if cli.text {
        println!("{}", root.text());
    } else if cli.stats {
        print!("{}", TreeStats::collect(&root, doc.doctype()));
    } else {
        if let Some(doctype) = doc.doctype() {
            println!("DOCTYPE {doctype}");
        }
        print!("{}", format_tree(&root));
    }
    EXIT_SUCCESS
}

/// Reads input from a file or stdin (when filename is `-`).
fn read_input(filename: &str) -> io::Result<String> {
    if filename == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(filename)
    }
}

/// Node counts for `--stats`.
#[derive(Debug, Default)]
struct TreeStats {
    doctype: Option<String>,
    elements: usize,
    attributes: usize,
    text_nodes: usize,
    text_bytes: usize,
    comments: usize,
    instructions: usize,
    max_depth: usize,
}

impl TreeStats {
    fn collect(root: &Node, doctype: Option<&str>) -> Self {
        let mut stats = Self {
            doctype: doctype.map(str::to_string),
            ..Self::default()
        };
        for node in std::iter::once(root.clone()).chain(root.descendants()) {
            match node.kind() {
                NodeKind::Element => {
                    stats.elements += 1;
                    stats.attributes += node.attribute_count();
                    stats.max_depth = stats.max_depth.max(node.ancestors().count() + 1);
                }
                NodeKind::Text => {
                    stats.text_nodes += 1;
                    stats.text_bytes += node.data().map_or(0, |d| d.len());
                }
                NodeKind::Comment => stats.comments += 1,
                NodeKind::ProcessingInstruction => stats.instructions += 1,
                NodeKind::Other => {}
            }
        }
        stats
    }
}

impl std::fmt::Display for TreeStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(doctype) = &self.doctype {
            writeln!(f, "doctype:      {doctype}")?;
        }
        writeln!(f, "elements:     {}", self.elements)?;
        writeln!(f, "attributes:   {}", self.attributes)?;
        writeln!(f, "text nodes:   {} ({} bytes)", self.text_nodes, self.text_bytes)?;
        writeln!(f, "comments:     {}", self.comments)?;
        writeln!(f, "instructions: {}", self.instructions)?;
        writeln!(f, "max depth:    {}", self.max_depth)
    }
}
