//! Location of per-object build metadata.
//!
//! Kbuild keeps what it knows about `dir/name.o` in hidden siblings:
//! `dir/.name.o.cmd` (raw command log) and, with some build setups,
//! `dir/.name.o.json` (a ready-made database fragment).

use crate::error::{BuildError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Which metadata file to read for each object.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataFormat {
    /// Raw `.cmd` Make fragment, parsed line by line.
    #[default]
    Cmd,
    /// Prebuilt JSON fragment, taken as is.
    Json,
}

impl MetadataFormat {
    /// File extension appended to the object file name.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Cmd => "cmd",
            Self::Json => "json",
        }
    }
}

impl fmt::Display for MetadataFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for MetadataFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "cmd" => Ok(Self::Cmd),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown metadata format: {other} (expected cmd or json)")),
        }
    }
}

/// What to do when a `.cmd` file is missing for an object.
///
/// JSON fragments are optional by nature and always skipped quietly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingMetadata {
    /// Skip the object and log a warning.
    #[default]
    Warn,
    /// Abort the run.
    Fail,
}

/// Compute the metadata path for an object file.
///
/// `dir/name.o` maps to `dir/.name.o.<ext>`.
pub fn metadata_path(object: &Path, format: MetadataFormat) -> Result<PathBuf> {
    let name = object
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| n.ends_with(".o"))
        .ok_or_else(|| BuildError::InvalidObjectPath {
            path: object.to_path_buf(),
        })?;

    Ok(object.with_file_name(format!(".{}.{}", name, format.extension())))
}

/// Read the metadata file for an object, if present.
///
/// Returns `Ok(None)` when the file does not exist and the format/policy
/// allows skipping it.
pub fn read_metadata(
    object: &Path,
    format: MetadataFormat,
    missing: MissingMetadata,
) -> Result<Option<(PathBuf, String)>> {
    let path = metadata_path(object, format)?;

    match std::fs::read_to_string(&path) {
        Ok(text) => Ok(Some((path, text))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => match (format, missing) {
            (MetadataFormat::Json, _) => {
                tracing::debug!(path = %path.display(), "No JSON fragment; skipping object");
                Ok(None)
            }
            (MetadataFormat::Cmd, MissingMetadata::Warn) => {
                tracing::warn!(
                    object = %object.display(),
                    "No .cmd file found for object; skipping (was it compiled?)"
                );
                Ok(None)
            }
            (MetadataFormat::Cmd, MissingMetadata::Fail) => Err(BuildError::read(path, e)),
        },
        Err(e) => Err(BuildError::read(path, e)),
    }
}
