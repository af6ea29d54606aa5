//! Command-line front end: parse XML files, evaluate chain expressions
//! against them, and print values or re-serialized trees.

use std::fs;
use std::io::{self, Read, Write};
use std::process::ExitCode;

use clap::Parser;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

use xmlnav::serial::{serialize_with_options, SerializeOptions};
use xmlnav::{Chained, Diagnostics, Document, ParseError};

/// xmlnav -- parse XML files and navigate them with chain expressions.
///
/// A chain expression is a dot-separated list of steps: tag names descend
/// to children, integers select one of several matches, and a final
/// `@name` reads an attribute. For example `product.catalog_item.1.@gender`.
///
/// Exit status: 0 on success, 1 if a file could not be read or parsed, 2 if
/// a chain found nothing, 3 if the output could not be written.
#[derive(Parser, Debug)]
#[command(name = "xmlnav", version, about, long_about = None)]
#[allow(clippy::struct_excessive_bools)]
struct Cli {
    /// XML files to process (use `-` for stdin).
    #[arg(required = true)]
    files: Vec<String>,

    /// Evaluate a chain expression from the root element and print the
    /// result instead of the document.
    #[arg(long, value_name = "EXPR")]
    chain: Option<String>,

    /// With --chain, print every matched node rather than the first.
    #[arg(long, requires = "chain")]
    list: bool,

    /// Decode input with this encoding instead of detecting it.
    #[arg(long, value_name = "ENCODING")]
    encoding: Option<String>,

    /// Indentation string used when printing trees.
    #[arg(long, value_name = "STR", default_value = "\t")]
    indent: String,

    /// Start printed documents with an XML declaration.
    #[arg(long)]
    declaration: bool,

    /// Parse only; do not print anything on success.
    #[arg(long)]
    noout: bool,

    /// Do not log navigation diagnostics.
    #[arg(long)]
    quiet: bool,

    /// Save output to a file instead of stdout.
    #[arg(long, value_name = "FILE")]
    output: Option<String>,
}

const EXIT_SUCCESS: u8 = 0;
const EXIT_PARSE_ERROR: u8 = 1;
const EXIT_NOT_FOUND: u8 = 2;
const EXIT_WRITE_ERROR: u8 = 3;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .without_time()
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let mut worst_exit = EXIT_SUCCESS;
    let mut output = String::new();

    for file in &cli.files {
        let exit = process_file(&cli, file, &mut output);
        worst_exit = worst_exit.max(exit);
    }

    if !output.is_empty() {
        worst_exit = worst_exit.max(write_output(&cli, &output));
    }
    ExitCode::from(worst_exit)
}

/// Processes a single input file, appending to `output`, and returns an
/// exit code.
fn process_file(cli: &Cli, filename: &str, output: &mut String) -> u8 {
    let mut doc = match load(cli, filename) {
        Ok(doc) => doc,
        Err(err) => {
            error!("{filename}: {err}");
            return EXIT_PARSE_ERROR;
        }
    };
    debug!(file = filename, nodes = doc.node_count(), "parsed");

    if cli.quiet {
        doc.set_diagnostics(Diagnostics::disabled());
    }
    let Some(root) = doc.root() else {
        return EXIT_PARSE_ERROR;
    };
    let options = SerializeOptions::default()
        .indent_str(&cli.indent)
        .declaration(cli.declaration);

    let Some(expr) = &cli.chain else {
        if !cli.noout {
            output.push_str(&serialize_with_options(&doc, root.id(), &options));
        }
        return EXIT_SUCCESS;
    };

    let result = root.chain(expr);
    if let Some(message) = result.error() {
        error!("{filename}: {message}");
        return EXIT_NOT_FOUND;
    }
    if cli.noout {
        return EXIT_SUCCESS;
    }

    match &result {
        Chained::Attribute(lookup) => {
            output.push_str(lookup.value().unwrap_or_default());
            output.push('\n');
        }
        Chained::Nodes(query) if cli.list => {
            for node in query {
                output.push_str(&serialize_with_options(&doc, node.id(), &options));
            }
        }
        Chained::Nodes(query) => {
            if let Some(node) = query.node() {
                match node.value() {
                    Some(text) => {
                        output.push_str(text);
                        output.push('\n');
                    }
                    None => output.push_str(&serialize_with_options(&doc, node.id(), &options)),
                }
            }
        }
    }
    EXIT_SUCCESS
}

/// Reads and parses a file, or stdin when `filename` is `-`.
fn load(cli: &Cli, filename: &str) -> Result<Document, ParseError> {
    let bytes = if filename == "-" {
        let mut buf = Vec::new();
        io::stdin().read_to_end(&mut buf)?;
        buf
    } else {
        fs::read(filename)?
    };
    match &cli.encoding {
        Some(label) => Document::parse_bytes_with_encoding(&bytes, label),
        None => Document::parse_bytes(&bytes),
    }
}

/// Writes `content` to `--output` or stdout and returns an exit code.
fn write_output(cli: &Cli, content: &str) -> u8 {
    if let Some(ref output_file) = cli.output {
        if let Err(e) = fs::write(output_file, content) {
            error!("{output_file}: failed to write: {e}");
            return EXIT_WRITE_ERROR;
        }
    } else {
        print!("{content}");
        // Flush stdout to ensure output is complete, especially when piped.
        if let Err(e) = io::stdout().flush() {
            error!("stdout: failed to write: {e}");
            return EXIT_WRITE_ERROR;
        }
    }
    EXIT_SUCCESS
}
