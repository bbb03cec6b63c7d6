//! Configuration for weave.
//!
//! Parses `weave.toml` with serde and discovers it in the current directory
//! or its parents. Command-line values are applied on top through
//! [`CliSettings`].
//!
//! ```toml
//! [document]
//! file = "hype.md"
//! context = "${BOOK}/ch1/hype.md"
//! origin = "."
//! section = 1
//!
//! [execution]
//! timeout_ms = 5000
//! parse_only = false
//! ```
//!
//! ## Environment Variable Expansion
//!
//! `document.file`, `document.context` and `document.origin` support
//! `${VAR}` (error if unset) and `${VAR:-default}`.
//!
//! ## Paths
//!
//! Relative paths in the file resolve against the directory holding it.
//! [`Config::document_paths`] turns the result into the root, filename and
//! working directory a document is processed with.

mod expand;

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "weave.toml";

/// CLI settings that override configuration file values.
///
/// Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct CliSettings {
    /// Input file, relative to the working directory.
    pub file: Option<PathBuf>,
    /// Path of the document being previewed.
    pub context: Option<PathBuf>,
    /// Working directory for commands and for opening `file`.
    pub origin: Option<PathBuf>,
    /// Section override. Zero is ignored.
    pub section: Option<usize>,
    /// Whole-run timeout.
    pub timeout: Option<Duration>,
    /// Skip execution.
    pub parse_only: Option<bool>,
}

/// Application configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Document configuration (paths are unexpanded strings from TOML).
    #[serde(rename = "document")]
    document_raw: DocumentConfigRaw,
    /// Execution configuration.
    pub execution: ExecutionConfig,

    /// Resolved document configuration (set after loading).
    #[serde(skip)]
    pub document: DocumentConfig,
    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self::default_with_base(Path::new("."))
    }
}

/// Raw document configuration as parsed from TOML.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct DocumentConfigRaw {
    file: Option<String>,
    context: Option<String>,
    origin: Option<String>,
    section: Option<usize>,
}

/// Resolved document configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DocumentConfig {
    /// Input file; `None` means stdin.
    pub file: Option<PathBuf>,
    /// Path of the document being previewed.
    pub context: Option<PathBuf>,
    /// Explicit working directory.
    pub origin: Option<PathBuf>,
    /// Section override.
    pub section: Option<usize>,
    /// Directory used when neither `origin` nor `context` is set.
    pub base_dir: PathBuf,
}

/// Execution configuration.
#[derive(Debug, Default, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ExecutionConfig {
    /// Whole-run timeout in milliseconds; unset or zero means the default.
    pub timeout_ms: Option<u64>,
    /// Stop after parsing.
    pub parse_only: bool,
}

impl ExecutionConfig {
    /// Configured timeout, if any.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

/// Paths a document is processed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentPaths {
    /// Directory `src` references resolve against.
    pub root: PathBuf,
    /// Document filename for error locations.
    pub filename: Option<String>,
    /// Directory commands run in.
    pub work_dir: PathBuf,
    /// File to read the document from; `None` means stdin.
    pub input: Option<PathBuf>,
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
    /// Environment variable error during expansion.
    #[error("Environment variable error in {field}: {message}")]
    EnvVar {
        /// Config field path (e.g., "`document.context`").
        field: String,
        /// Error message (e.g., "${`BOOK`} not set").
        message: String,
    },
}

impl Config {
    /// Load configuration from file with optional CLI settings.
    ///
    /// If `config_path` is provided, loads from that file. Otherwise searches
    /// for `weave.toml` in the current directory and parents, falling back to
    /// defaults.
    ///
    /// CLI settings are applied after loading and path resolution, so they
    /// take precedence over the file.
    pub fn load(
        config_path: Option<&Path>,
        cli_settings: Option<&CliSettings>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            tracing::debug!(path = %discovered.display(), "discovered configuration");
            Self::load_from_file(&discovered)?
        } else {
            Self::default_with_cwd()
        };

        if let Some(settings) = cli_settings {
            config.apply_cli_settings(settings);
        }

        Ok(config)
    }

    fn apply_cli_settings(&mut self, settings: &CliSettings) {
        if let Some(file) = &settings.file {
            self.document.file = Some(file.clone());
        }
        if let Some(context) = &settings.context {
            self.document.context = Some(context.clone());
        }
        if let Some(origin) = &settings.origin {
            self.document.origin = Some(origin.clone());
        }
        if let Some(section) = settings.section.filter(|&section| section > 0) {
            self.document.section = Some(section);
        }
        if let Some(timeout) = settings.timeout {
            let millis = u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX);
            self.execution.timeout_ms = Some(millis);
        }
        if let Some(parse_only) = settings.parse_only {
            self.execution.parse_only = parse_only;
        }
    }

    /// Root, filename, working directory and input file for a run.
    ///
    /// `context` supplies the root (its directory) and filename (its file
    /// name). The working directory is `origin`, else the context directory,
    /// else the base directory. `file` is opened relative to the working
    /// directory.
    #[must_use]
    pub fn document_paths(&self) -> DocumentPaths {
        let doc = &self.document;
        let context_dir = doc.context.as_deref().map(parent_dir);

        let work_dir = doc
            .origin
            .clone()
            .or_else(|| context_dir.clone())
            .unwrap_or_else(|| doc.base_dir.clone());
        let root = context_dir.unwrap_or_else(|| work_dir.clone());

        let filename = doc
            .context
            .as_deref()
            .or(doc.file.as_deref())
            .and_then(Path::file_name)
            .map(|name| name.to_string_lossy().into_owned());
        let input = doc.file.as_ref().map(|file| work_dir.join(file));

        DocumentPaths {
            root,
            filename,
            work_dir,
            input,
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let mut current = std::env::current_dir().ok()?;
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    fn default_with_cwd() -> Self {
        let cwd = std::env::current_dir().unwrap_or_default();
        Self::default_with_base(&cwd)
    }

    fn default_with_base(base: &Path) -> Self {
        Self {
            document_raw: DocumentConfigRaw::default(),
            execution: ExecutionConfig::default(),
            document: DocumentConfig {
                base_dir: base.to_path_buf(),
                ..DocumentConfig::default()
            },
            config_path: None,
        }
    }

    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;

        // Expand environment variables before path resolution
        config.expand_env_vars()?;

        let config_dir = path.parent().unwrap_or(Path::new("."));
        config.resolve_paths(config_dir);
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document.section == Some(0) {
            return Err(ConfigError::Validation(
                "document.section must be at least 1".to_owned(),
            ));
        }
        Ok(())
    }

    fn expand_env_vars(&mut self) -> Result<(), ConfigError> {
        let raw = &mut self.document_raw;
        for (value, field) in [
            (&mut raw.file, "document.file"),
            (&mut raw.context, "document.context"),
            (&mut raw.origin, "document.origin"),
        ] {
            if let Some(current) = value {
                *current = expand::expand_env(current, field)?;
            }
        }
        Ok(())
    }

    /// Resolve relative paths against the config directory.
    fn resolve_paths(&mut self, config_dir: &Path) {
        let raw = &self.document_raw;
        let resolve = |path: Option<&str>| path.map(|p| config_dir.join(p));

        self.document = DocumentConfig {
            // Input files stay relative to the working directory
            file: raw.file.as_deref().map(PathBuf::from),
            context: resolve(raw.context.as_deref()),
            origin: resolve(raw.origin.as_deref()),
            section: raw.section,
            base_dir: config_dir.to_path_buf(),
        };
    }
}

/// Directory of `path`, or `.` for a bare file name.
fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
