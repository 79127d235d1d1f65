//! Error types for compdb-build.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for compdb-build operations.
pub type Result<T> = std::result::Result<T, BuildError>;

/// Errors that can occur while generating a compilation database.
///
/// Everything except [`BuildError::MissingSourceFile`] aborts the run.
#[derive(Error, Diagnostic, Debug)]
pub enum BuildError {
    /// Input path has a suffix other than `.o`, `.a` or `.order`.
    #[error("{}: unsupported artifact, expected a .o, .a or .order file", .path.display())]
    #[diagnostic(code(compdb::unknown_artifact))]
    UnknownArtifact { path: PathBuf },

    /// A module order file names something that is not a `.ko`.
    #[error("{}:{line_number}: module path must end with .ko: {line:?}", .order.display())]
    #[diagnostic(code(compdb::invalid_module_path))]
    InvalidModulePath {
        order: PathBuf,
        line_number: usize,
        line: String,
    },

    /// An expanded object reference does not end in `.o`.
    #[error("{}: object path must end with .o", .path.display())]
    #[diagnostic(code(compdb::invalid_object_path))]
    InvalidObjectPath { path: PathBuf },

    /// The archive tool could not be run or exited unsuccessfully.
    #[error("failed to list members of {}: {reason}", .archive.display())]
    #[diagnostic(
        code(compdb::archive_listing),
        help("check that the archiver is installed and the archive is intact")
    )]
    ArchiveListing { archive: PathBuf, reason: String },

    /// Failed to read an input or metadata file.
    #[error("failed to read {}", .path.display())]
    #[diagnostic(code(compdb::read_file))]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source file named by a command line does not exist.
    #[error("{} not found in {}", .file.display(), .directory.display())]
    #[diagnostic(code(compdb::missing_source_file))]
    MissingSourceFile { file: PathBuf, directory: PathBuf },

    /// Failed to parse a JSON fragment or database.
    #[error("failed to parse JSON from {}", .path.display())]
    #[diagnostic(code(compdb::parse_json))]
    ParseJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse a TOML configuration file.
    #[error("failed to parse config {}", .path.display())]
    #[diagnostic(code(compdb::parse_config))]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// Requested log level is not one of the known names.
    #[error("{0} is not a valid log level")]
    #[diagnostic(
        code(compdb::invalid_log_level),
        help("use one of DEBUG, INFO, WARNING, ERROR, CRITICAL")
    )]
    InvalidLogLevel(String),

    /// Failed to serialize the database.
    #[error("failed to serialize compilation database")]
    #[diagnostic(code(compdb::serialize))]
    Serialize(#[from] serde_json::Error),

    /// Failed to write the output file.
    #[error("failed to write {}", .path.display())]
    #[diagnostic(code(compdb::write))]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl BuildError {
    pub(crate) fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.into(),
            source,
        }
    }

    /// Whether the error only affects a single entry and the run may continue.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::MissingSourceFile { .. })
    }
}
