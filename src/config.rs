use std::path::Path;

use tracing::debug;

use crate::error::Error;
use crate::resolver::{DEFAULT_DEPTH_LIMIT, ResolveOptions};
use crate::suggest::SuggestOptions;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE: &str = ".mdpath.toml";

/// Project configuration loaded from `.mdpath.toml`.
/// Include/exclude patterns are path prefixes applied to markdown files
/// found while walking directories.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Maximum selector segments walked per resolution.
    pub depth_limit: usize,
    /// Prefixes skipped while walking.
    exclude: Vec<String>,
    /// Prefixes walked; empty means everything.
    include: Vec<String>,
    /// Ranking of "did you mean" suggestions.
    pub suggestions: SuggestOptions,
}

/// Raw TOML structure for `.mdpath.toml`.
#[derive(serde::Deserialize)]
#[serde(deny_unknown_fields)]
struct MdpathTomlConfig {
    /// Overrides `DEFAULT_DEPTH_LIMIT`.
    depth_limit: Option<usize>,
    /// Path prefixes to skip.
    #[serde(default)]
    exclude: Vec<String>,
    /// Path prefixes to walk.
    #[serde(default)]
    include: Vec<String>,
    /// `[suggestions]` table; absent keys keep their defaults.
    #[serde(default)]
    suggestions: SuggestOptions,
}

impl Config {
    /// Load config from `.mdpath.toml` in the given root directory.
    /// Returns a default that scans everything if the file doesn't exist.
    /// Returns an error if the file exists but is malformed; a config the
    /// user wrote never silently falls back to defaults.
    ///
    /// # Errors
    ///
    /// Returns `Error::Io` if reading fails (other than not-found),
    /// or `Error::TomlDe` if the TOML is malformed.
    pub fn load(root: &Path) -> Result<Self, Error> {
        let path = root.join(CONFIG_FILE);
        let content = match std::fs::read_to_string(&path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => return Err(Error::Io(e)),
        };

        let raw: MdpathTomlConfig = toml::from_str(&content)?;
        debug!(path = %path.display(), "loaded config");
        Ok(Self {
            depth_limit: raw.depth_limit.unwrap_or(DEFAULT_DEPTH_LIMIT),
            exclude: raw.exclude,
            include: raw.include,
            suggestions: raw.suggestions,
        })
    }

    /// Library options for resolution.
    pub fn resolve_options(&self) -> ResolveOptions {
        ResolveOptions {
            depth_limit: self.depth_limit,
            suggestions: self.suggestions,
        }
    }

    /// Check whether a markdown file path should be scanned.
    ///
    /// A path is included if no include patterns are set (scan everything),
    /// or if the path starts with at least one include pattern.
    /// An included path is then excluded if it starts with any exclude pattern.
    pub fn should_scan(&self, relative_path: &str) -> bool {
        let included = self.include.is_empty()
            || self.include.iter().any(|p| relative_path.starts_with(p.as_str()));

        if !included {
            return false;
        }

        !self.exclude.iter().any(|p| relative_path.starts_with(p.as_str()))
    }
}

impl Default for Config {
    /// Scan everything, default limits.
    fn default() -> Self {
        Self {
            depth_limit: DEFAULT_DEPTH_LIMIT,
            exclude: Vec::new(),
            include: Vec::new(),
            suggestions: SuggestOptions::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load(content: &str) -> Result<Config, Error> {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(CONFIG_FILE), content).unwrap();
        Config::load(dir.path())
    }

    #[test]
    fn missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load(dir.path()).unwrap(), Config::default());
    }

    #[test]
    fn partial_suggestions_table_keeps_defaults() {
        let config = load("depth_limit = 8\n[suggestions]\nmax_results = 2\n").unwrap();
        let options = config.resolve_options();
        assert_eq!(options.depth_limit, 8);
        assert_eq!(options.suggestions.max_results, 2);
        assert!(options.suggestions.include_exact);
        assert!((options.suggestions.min_ratio - 0.4).abs() < f64::EPSILON);
    }

    #[test]
    fn malformed_file_is_an_error() {
        assert!(matches!(load("depth_limit = \"deep\""), Err(Error::TomlDe(_))));
        assert!(matches!(load("unknown_key = 1"), Err(Error::TomlDe(_))));
    }

    #[test]
    fn include_and_exclude_prefixes() {
        let config = load("include = [\"docs/\"]\nexclude = [\"docs/drafts/\"]\n").unwrap();
        assert!(config.should_scan("docs/guide.md"));
        assert!(!config.should_scan("docs/drafts/wip.md"));
        assert!(!config.should_scan("README.md"));
    }
}
