use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::config::Config;
use crate::error::Error;
use crate::markdown;
use crate::multi::Document;

/// Collect markdown files from `paths` and load each as a namespaced document.
/// Files are taken as given; directories are walked and filtered by the
/// config's include/exclude prefixes. Documents come back sorted by path.
///
/// # Errors
///
/// Returns `Error::FileNotFound` for a missing path, `Error::NoMarkdownFiles`
/// if nothing was found, `Error::DuplicateNamespace` if two files derive the
/// same namespace, or any read/parse error from loading a file.
pub fn load_documents(paths: &[PathBuf], config: &Config) -> Result<Vec<Document>, Error> {
    let files = markdown_files(paths, config)?;
    if files.is_empty() {
        return Err(Error::NoMarkdownFiles {
            paths: paths.to_vec(),
        });
    }

    let mut claimed: HashMap<String, PathBuf> = HashMap::new();
    let mut documents = Vec::with_capacity(files.len());

    for file in files {
        let namespace = namespace_for_path(&file);
        if let Some(first) = claimed.get(&namespace) {
            return Err(Error::DuplicateNamespace {
                first: first.clone(),
                namespace,
                second: file,
            });
        }

        let source = std::fs::read_to_string(&file)?;
        let tree = markdown::parse_markdown(&file, &source)?;
        debug!(file = %file.display(), %namespace, "loaded document");
        claimed.insert(namespace.clone(), file);
        documents.push(Document::new(namespace, tree));
    }

    info!(count = documents.len(), "documents loaded");
    return Ok(documents);
}

/// Every markdown file reachable from `paths`, sorted and deduplicated.
///
/// # Errors
///
/// Returns `Error::FileNotFound` if a path does not exist.
pub fn markdown_files(paths: &[PathBuf], config: &Config) -> Result<Vec<PathBuf>, Error> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            files.push(path.clone());
            continue;
        }
        if !path.is_dir() {
            return Err(Error::FileNotFound { path: path.clone() });
        }

        for entry in WalkDir::new(path)
            .into_iter()
            .filter_map(Result::ok)
            .filter(|e| e.file_type().is_file() && is_markdown(e.path()))
        {
            let md_path = entry.path();
            let relative = md_path.strip_prefix(path).unwrap_or(md_path);
            if !config.should_scan(&relative.to_string_lossy()) {
                debug!(file = %md_path.display(), "skipped by config");
                continue;
            }
            files.push(md_path.to_path_buf());
        }
    }

    files.sort();
    files.dedup();
    return Ok(files);
}

/// Namespace for a file: its stem with every character outside
/// `[A-Za-z0-9_-]` replaced by `-`, so it always parses as a namespace,
/// digits-only stems such as `2024` included.
pub fn namespace_for_path(path: &Path) -> String {
    let stem = path.file_stem().map(|s| s.to_string_lossy()).unwrap_or_default();
    let namespace: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' || c == '-' { c } else { '-' })
        .collect();

    if namespace.is_empty() {
        return "-".to_string();
    }
    return namespace;
}

/// `.md` or `.markdown`.
fn is_markdown(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "md" || ext == "markdown")
}
