/// Crate-level error types for loading documents and driving resolution.
use std::path::PathBuf;

/// Errors from the file, config, and output layers around the selector core.
/// Each variant names the file, namespace, or reason for failure.
#[allow(clippy::error_impl_error, reason = "crate-level error type")]
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Two markdown files derive the same namespace.
    #[error("duplicate namespace `{namespace}`: {} and {}", first.display(), second.display())]
    DuplicateNamespace {
        /// File that claimed the namespace first.
        first: PathBuf,
        /// Namespace both files derive.
        namespace: String,
        /// File that collided with it.
        second: PathBuf,
    },

    /// A path given on the command line does not exist.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path to the missing file.
        path: PathBuf,
    },

    /// Markdown source exceeds the size limit.
    #[error("file too large ({size_bytes} bytes, max {max_bytes}): {}", file.display())]
    FileTooLarge {
        /// File that exceeded the size limit.
        file: PathBuf,
        /// Maximum allowed file size in bytes.
        max_bytes: u64,
        /// Actual file size in bytes.
        size_bytes: u64,
    },

    /// Underlying I/O error from the filesystem.
    #[error("io: {0}")]
    Io(
        /// The wrapped I/O error.
        #[from]
        std::io::Error,
    ),

    /// JSON output could not be produced.
    #[error("json: {0}")]
    Json(
        /// The wrapped serialization error.
        #[from]
        serde_json::Error,
    ),

    /// Tree-sitter failed to parse a markdown file.
    #[error("markdown parse failed: {}: {reason}", file.display())]
    MarkdownParseFailed {
        /// File that failed to parse.
        file: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// The given paths contain no markdown files.
    #[error("no markdown files found under: {}", paths.iter().map(|p| return p.display().to_string()).collect::<Vec<_>>().join(", "))]
    NoMarkdownFiles {
        /// Paths that were searched.
        paths: Vec<PathBuf>,
    },

    /// TOML deserialization failed.
    #[error("toml deserialize: {0}")]
    TomlDe(
        /// The wrapped TOML deserialization error.
        #[from]
        toml::de::Error,
    ),
}
