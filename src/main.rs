use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use mdpath::config::Config;
use mdpath::diagnostics;
use mdpath::error::Error;
use mdpath::lexer::tokenize_lossy;
use mdpath::parser::{self, ParseError};
use mdpath::resolver::{ResolutionError, ResolutionResult, qualify};
use mdpath::suggest::{Suggestion, suggest};
use mdpath::tree::Node;
use mdpath::{Document, resolve_multi, scanner};
use tracing::Level;

#[derive(Parser)]
#[command(name = "mdpath", about = "Address markdown content with path selectors")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
#[allow(clippy::arbitrary_source_item_ordering, reason = "clap takes positionals in field order")]
enum Commands {
    /// Parse a selector and print its canonical form
    Check {
        /// Selector to parse
        selector: String,
        /// Print the token stream instead
        #[arg(long)]
        tokens: bool,
    },
    /// Print every addressable selector in the given documents
    List {
        /// Markdown files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
    /// Resolve a selector and print the matches as JSON
    Select {
        /// Selector, e.g. `guide::heading:h2[1]/block:code`
        selector: String,
        /// Markdown files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,
    },
}

/// One match as printed by `select`.
#[derive(serde::Serialize)]
struct MatchOutput<'a> {
    /// Whether the node has descendants.
    has_children: bool,
    /// Canonical, fully indexed selector.
    matched_selector: &'a str,
    /// Document namespace.
    namespace: &'a str,
    /// The matched subtree.
    node: &'a Node,
    /// Node type of the match.
    node_type: &'static str,
    /// Node type at each segment.
    path: Vec<&'static str>,
    /// Words under the node.
    word_count: usize,
}

/// A selector failure as printed by `select`.
#[derive(serde::Serialize)]
struct FailureOutput<'a> {
    /// Machine-readable error code.
    kind: &'static str,
    /// Human-readable explanation.
    message: &'a str,
    /// Resolved prefixes.
    partial_results: &'a [String],
    /// The selector as given.
    selector: &'a str,
    /// Ranked corrections.
    suggestions: &'a [Suggestion],
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let result = match cli.command {
        Commands::Check { selector, tokens } => Ok(cmd_check(&selector, tokens)),
        Commands::List { paths } => cmd_list(&paths).map(|()| return ExitCode::SUCCESS),
        Commands::Select { selector, paths } => cmd_select(&selector, &paths),
    };

    return match result {
        Ok(code) => code,
        Err(e) => {
            diagnostics::print_error(&e);
            ExitCode::FAILURE
        },
    };
}

/// Parse without resolving. Exit 2 on a syntax error.
fn cmd_check(selector: &str, tokens: bool) -> ExitCode {
    if tokens {
        for token in tokenize_lossy(selector) {
            println!("{}:{}\t{:?}\t{}", token.position.line, token.position.column, token.kind, token.text);
        }
    }

    return match parser::parse(selector) {
        Ok(ast) => {
            if !tokens {
                println!("{ast}");
            }
            ExitCode::SUCCESS
        },
        Err(e) => {
            diagnostics::print_markdown(&diagnostics::render_parse_error(&e, &[]));
            ExitCode::from(2)
        },
    };
}

/// Print every known selector of every document, namespaced.
///
/// # Errors
///
/// Returns errors from config loading or scanning.
fn cmd_list(paths: &[PathBuf]) -> Result<(), Error> {
    let config = Config::load(Path::new("."))?;
    for document in scanner::load_documents(paths, &config)? {
        for selector in &document.known_selectors {
            println!("{}", qualify(&document.namespace, selector));
        }
    }
    return Ok(());
}

/// Resolve `selector` against the documents under `paths`.
///
/// # Errors
///
/// Returns errors from config loading, scanning, or JSON encoding. Selector
/// failures are reported on stdout and turn into exit code 1.
fn cmd_select(selector: &str, paths: &[PathBuf]) -> Result<ExitCode, Error> {
    let config = Config::load(Path::new("."))?;
    let documents = scanner::load_documents(paths, &config)?;

    let ast = match parser::parse(selector) {
        Ok(ast) => ast,
        Err(e) => return report_parse_error(selector, &e, &documents, &config),
    };

    return match resolve_multi(&documents, &ast, &config.resolve_options()) {
        Ok(results) => {
            let output: Vec<MatchOutput<'_>> = results.iter().map(|r| return match_output(r)).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
            Ok(ExitCode::SUCCESS)
        },
        Err(e) => report_resolution_error(&e),
    };
}

/// JSON view of one match.
fn match_output<'a>(result: &'a ResolutionResult<'a>) -> MatchOutput<'a> {
    return MatchOutput {
        has_children: result.has_children,
        matched_selector: &result.matched_selector,
        namespace: &result.namespace,
        node: result.node,
        node_type: result.node.type_name(),
        path: result.path.iter().map(|n| return n.type_name()).collect(),
        word_count: result.word_count,
    };
}

/// Report a malformed selector with corrections from every document's pool.
///
/// # Errors
///
/// Returns `Error::Json` if the report cannot be encoded.
fn report_parse_error(
    selector: &str,
    e: &ParseError,
    documents: &[Document],
    config: &Config,
) -> Result<ExitCode, Error> {
    let pool: Vec<String> = documents
        .iter()
        .flat_map(|d| return d.known_selectors.iter().map(|s| return qualify(&d.namespace, s)))
        .collect();
    let suggestions = suggest(selector, &pool, &config.suggestions);

    let failure = FailureOutput {
        kind: e.kind.code(),
        message: &e.message,
        partial_results: &[],
        selector,
        suggestions: &suggestions,
    };
    println!("{}", serde_json::to_string_pretty(&failure)?);
    diagnostics::print_markdown(&diagnostics::render_parse_error(e, &suggestions));
    return Ok(ExitCode::FAILURE);
}

/// Report a selector that parsed but matched nothing.
///
/// # Errors
///
/// Returns `Error::Json` if the report cannot be encoded.
fn report_resolution_error(e: &ResolutionError) -> Result<ExitCode, Error> {
    let failure = FailureOutput {
        kind: e.kind.code(),
        message: &e.message,
        partial_results: &e.partial_results,
        selector: &e.selector,
        suggestions: &e.suggestions,
    };
    println!("{}", serde_json::to_string_pretty(&failure)?);
    diagnostics::print_markdown(&diagnostics::render_resolution_error(e));
    return Ok(ExitCode::FAILURE);
}
