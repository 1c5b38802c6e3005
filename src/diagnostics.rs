use std::fmt::Write as _;

use crate::error::Error;
use crate::parser::ParseError;
use crate::resolver::{NotFoundCause, ResolutionError, ResolutionErrorKind};
use crate::suggest::Suggestion;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Render an error as valid markdown with bold headings and print to stderr.
pub fn print_error(e: &Error) {
    print_markdown(&render_error(e));
}

/// Print rendered markdown to stderr, bolding heading lines.
pub fn print_markdown(md: &str) {
    for line in md.lines() {
        if line.starts_with('#') {
            eprintln!("{BOLD}{line}{RESET}");
        } else {
            eprintln!("{line}");
        }
    }
}

/// Render an error as a structured markdown diagnostic.
///
/// Each variant produces a block with what happened and, where there is
/// one, how to fix it.
pub fn render_error(e: &Error) -> String {
    match e {
        Error::DuplicateNamespace { first, namespace, second } => format!("\
# Error: Duplicate Namespace

`{}` and `{}` both map to namespace `{namespace}`.

## Fix

Rename one of the files, or narrow the paths with `exclude` in `.mdpath.toml`.
", first.display(), second.display()),
        Error::NoMarkdownFiles { .. } => format!("\
# Error: No Markdown Files

{e}

## Fix

Pass `.md` files or directories containing them. Check `include`/`exclude` in `.mdpath.toml`.
"),
        Error::FileTooLarge { file, size_bytes, max_bytes } => format!("\
# Error: File Too Large

`{}` is {size_bytes} bytes (max {max_bytes}).
", file.display()),
        Error::FileNotFound { path } => format!("\
# Error: File Not Found

`{}` does not exist.
", path.display()),
        Error::MarkdownParseFailed { file, reason } => format!("\
# Error: Parse Failed

Could not parse `{}`: {reason}
", file.display()),
        Error::TomlDe(inner) => format!("\
# Error: Invalid Config

{inner}

## Fix

Check `.mdpath.toml`; known keys are `include`, `exclude`, `depth_limit`, and `[suggestions]`.
"),
        Error::Io(_) | Error::Json(_) => format!("\
# Error

{e}
"),
    }
}

/// Render a selector parse failure with a caret under the offending token.
/// `suggestions` come from ranking the malformed text against known selectors.
pub fn render_parse_error(e: &ParseError, suggestions: &[Suggestion]) -> String {
    let mut out = format!("\
# Error: Invalid Selector ({})

{}

    {}
", e.kind.code(), e.message, e.caret().replace('\n', "\n    "));

    render_suggestions(&mut out, suggestions);
    return out;
}

/// Render a resolution failure: what failed, how far the path got, and
/// the ranked suggestions.
pub fn render_resolution_error(e: &ResolutionError) -> String {
    let title = match &e.kind {
        ResolutionErrorKind::IndexOutOfRange { .. } => "Index Out Of Range",
        ResolutionErrorKind::InvalidPath => "Invalid Path",
        ResolutionErrorKind::NamespaceNotFound { .. } => "Namespace Not Found",
        ResolutionErrorKind::SelectorNotFound { cause: NotFoundCause::DepthExceeded { .. } } => "Depth Limit Exceeded",
        ResolutionErrorKind::SelectorNotFound { .. } => "Selector Not Found",
    };

    let mut out = format!("\
# Error: {title}

Selector `{}`: {}
", e.selector, e.message);

    if let Some(segment) = &e.segment {
        let _ = writeln!(out, "\nFailed at segment {} (`{}`, column {}).", segment.index, segment.segment, segment.position.column);
    }

    if !e.partial_results.is_empty() {
        out.push_str("\n## Resolved so far\n\n");
        for partial in &e.partial_results {
            let _ = writeln!(out, "- `{partial}`");
        }
    }

    render_suggestions(&mut out, &e.suggestions);
    return out;
}

/// Append a "Did you mean" section when there is anything to suggest.
fn render_suggestions(out: &mut String, suggestions: &[Suggestion]) {
    let Some(best) = suggestions.first() else {
        return;
    };

    let _ = write!(out, "\n## Did you mean `{}`?\n", best.selector);
    if suggestions.len() > 1 {
        out.push_str("\n## Other candidates\n\n");
        for s in suggestions.iter().skip(1) {
            let _ = writeln!(out, "- `{}` ({:?}, distance {})", s.selector, s.reason, s.distance);
        }
    }
}
