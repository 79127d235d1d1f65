//! Expansion of build artifacts into object files.
//!
//! Inputs may be objects (`.o`), static archives (`.a`) or module order
//! lists (`.order`). Archives are listed with an external archiver; order
//! files name `.ko` modules whose `.mod` descriptors list their objects on
//! the first line.

use crate::error::{BuildError, Result};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Kind of an input artifact, decided by its suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Object file (`.o`).
    Object,
    /// Static archive (`.a`).
    Archive,
    /// Module order list (`.order`).
    ModuleOrder,
}

impl ArtifactKind {
    /// Classify a path by suffix.
    pub fn classify(path: &Path) -> Result<Self> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("o") => Ok(Self::Object),
            Some("a") => Ok(Self::Archive),
            Some("order") => Ok(Self::ModuleOrder),
            _ => Err(BuildError::UnknownArtifact {
                path: path.to_path_buf(),
            }),
        }
    }
}

/// A classified input path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub kind: ArtifactKind,
}

impl Artifact {
    pub fn new(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let kind = ArtifactKind::classify(&path)?;
        Ok(Self { path, kind })
    }
}

/// Lists the members of a static archive.
pub trait ArchiveLister {
    fn list_members(&self, archive: &Path) -> Result<Vec<String>>;
}

/// Lists archive members by running `<archiver> -t <archive>`.
#[derive(Debug, Clone)]
pub struct ArTool {
    program: PathBuf,
}

impl ArTool {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl ArchiveLister for ArTool {
    fn list_members(&self, archive: &Path) -> Result<Vec<String>> {
        tracing::debug!(
            archiver = %self.program.display(),
            archive = %archive.display(),
            "Listing archive"
        );

        let output = Command::new(&self.program)
            .arg("-t")
            .arg(archive)
            .output()
            .map_err(|e| BuildError::ArchiveListing {
                archive: archive.to_path_buf(),
                reason: format!("failed to run {}: {}", self.program.display(), e),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(BuildError::ArchiveListing {
                archive: archive.to_path_buf(),
                reason: format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .split_whitespace()
            .map(str::to_string)
            .collect())
    }
}

/// Expand input paths into a flat list of object paths, in input order.
///
/// Duplicates are kept; the first unknown suffix, bad order line or failed
/// archive listing aborts the expansion.
pub fn expand_artifacts<P: AsRef<Path>>(
    inputs: &[P],
    lister: &dyn ArchiveLister,
) -> Result<Vec<PathBuf>> {
    let mut objects = Vec::new();

    for input in inputs {
        let artifact = Artifact::new(input.as_ref())?;
        match artifact.kind {
            ArtifactKind::Object => objects.push(artifact.path),
            ArtifactKind::Archive => {
                let members = lister.list_members(&artifact.path)?;
                tracing::debug!(
                    archive = %artifact.path.display(),
                    members = members.len(),
                    "Expanded archive"
                );
                objects.extend(members.into_iter().map(PathBuf::from));
            }
            ArtifactKind::ModuleOrder => {
                for module in read_module_order(&artifact.path)? {
                    objects.extend(read_module_objects(&module)?);
                }
            }
        }
    }

    Ok(objects)
}

/// Read the `.ko` paths named by a module order file.
pub fn read_module_order(order: &Path) -> Result<Vec<PathBuf>> {
    let file = std::fs::File::open(order).map_err(|e| BuildError::read(order, e))?;
    let mut modules = Vec::new();

    for (index, line) in BufReader::new(file).lines().enumerate() {
        let line = line.map_err(|e| BuildError::read(order, e))?;
        let module = line.trim_end();
        if module.is_empty() {
            continue;
        }

        if !module.ends_with(".ko") {
            return Err(BuildError::InvalidModulePath {
                order: order.to_path_buf(),
                line_number: index + 1,
                line: module.to_string(),
            });
        }

        modules.push(PathBuf::from(module));
    }

    Ok(modules)
}

/// Read the objects making up a module from its `.mod` descriptor.
pub fn read_module_objects(module: &Path) -> Result<Vec<PathBuf>> {
    let descriptor = module.with_extension("mod");
    let file = std::fs::File::open(&descriptor).map_err(|e| BuildError::read(&descriptor, e))?;

    let mut first = String::new();
    BufReader::new(file)
        .read_line(&mut first)
        .map_err(|e| BuildError::read(&descriptor, e))?;

    Ok(first.split_whitespace().map(PathBuf::from).collect())
}
