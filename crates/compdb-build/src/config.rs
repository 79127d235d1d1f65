//! Generator configuration (`compdb.toml` format).
//!
//! ```toml
//! directory = "/build/linux"
//! output = "compile_commands.json"
//! format = "cmd"
//! missing_metadata = "warn"
//! archiver = "llvm-ar"
//! low_count_threshold = 300
//! log_level = "INFO"
//! ```

use crate::error::{BuildError, Result};
use crate::metadata::{MetadataFormat, MissingMetadata};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// File name used when no output path is given.
pub const DEFAULT_OUTPUT: &str = "compile_commands.json";

/// A full kernel build has well over 2000 entries. Finding this many or fewer
/// usually means most objects were never built.
pub const LOW_COUNT_THRESHOLD: usize = 300;

/// Settings for a generator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Working directory recorded in entries and used to resolve sources.
    pub directory: PathBuf,

    /// Output path; defaults to [`DEFAULT_OUTPUT`] inside `directory`.
    pub output: Option<PathBuf>,

    /// Metadata format to read for each object.
    pub format: MetadataFormat,

    /// Policy for objects without a `.cmd` file.
    pub missing_metadata: MissingMetadata,

    /// Program used to list archive members.
    pub archiver: PathBuf,

    /// Warn when fewer entries than this are produced (0 disables).
    pub low_count_threshold: usize,

    /// Log verbosity.
    pub log_level: LogLevel,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
            output: None,
            format: MetadataFormat::default(),
            missing_metadata: MissingMetadata::default(),
            archiver: PathBuf::from("ar"),
            low_count_threshold: LOW_COUNT_THRESHOLD,
            log_level: LogLevel::default(),
        }
    }
}

impl GeneratorConfig {
    /// Create a configuration rooted at `directory`.
    pub fn new(directory: impl Into<PathBuf>) -> Self {
        Self {
            directory: directory.into(),
            ..Self::default()
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::read(path, e))?;
        toml::from_str(&content).map_err(|source| BuildError::ParseConfig {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Where the database will be written.
    pub fn output_path(&self) -> PathBuf {
        match &self.output {
            Some(output) => output.clone(),
            None => self.directory.join(DEFAULT_OUTPUT),
        }
    }

    pub fn with_output(mut self, output: impl Into<PathBuf>) -> Self {
        self.output = Some(output.into());
        self
    }

    pub fn with_format(mut self, format: MetadataFormat) -> Self {
        self.format = format;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.missing_metadata = if strict {
            MissingMetadata::Fail
        } else {
            MissingMetadata::Warn
        };
        self
    }
}

/// Log verbosity, named after the levels the kernel tooling uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogLevel {
    Debug,
    Info,
    #[default]
    Warning,
    Error,
    Critical,
}

impl LogLevel {
    pub const ALL: [LogLevel; 5] = [
        LogLevel::Debug,
        LogLevel::Info,
        LogLevel::Warning,
        LogLevel::Error,
        LogLevel::Critical,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Debug => "DEBUG",
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Critical => "CRITICAL",
        }
    }

    /// Maximum `tracing` level to emit. There is no level above error, so
    /// `Critical` shares it.
    pub fn tracing_level(self) -> tracing::Level {
        match self {
            Self::Debug => tracing::Level::DEBUG,
            Self::Info => tracing::Level::INFO,
            Self::Warning => tracing::Level::WARN,
            Self::Error | Self::Critical => tracing::Level::ERROR,
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| BuildError::InvalidLogLevel(s.to_string()))
    }
}

impl TryFrom<String> for LogLevel {
    type Error = BuildError;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        level.as_str().to_string()
    }
}
