//! The extraction pipeline: artifacts in, compilation database out.

use crate::artifact::{expand_artifacts, ArTool, ArchiveLister};
use crate::config::GeneratorConfig;
use crate::database::CompilationDatabase;
use crate::entry::{resolve_entry, CompileCommand};
use crate::error::{BuildError, Result};
use crate::extract::command_lines;
use crate::metadata::{read_metadata, MetadataFormat};
use rustc_hash::FxHashSet;
use std::path::{Path, PathBuf};

/// Outcome of a generator run.
#[derive(Debug, Clone)]
pub struct Report {
    /// Sorted, deduplicated entries.
    pub database: CompilationDatabase,
    /// Distinct object files considered.
    pub objects: usize,
    /// Objects that produced no entry.
    pub skipped: usize,
}

/// Builds a compilation database from build artifacts.
pub struct Generator {
    config: GeneratorConfig,
    lister: Box<dyn ArchiveLister>,
}

impl Generator {
    pub fn new(config: GeneratorConfig, lister: Box<dyn ArchiveLister>) -> Self {
        Self { config, lister }
    }

    /// Create a generator that lists archives with the configured archiver.
    pub fn with_archiver(config: GeneratorConfig) -> Self {
        let lister = ArTool::new(config.archiver.clone());
        Self::new(config, Box::new(lister))
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    /// Expand `inputs` and collect one entry per object with usable metadata.
    pub fn generate<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Report> {
        let objects = dedup_objects(expand_artifacts(inputs, self.lister.as_ref())?);
        tracing::debug!(objects = objects.len(), "Expanded build artifacts");

        let mut database = CompilationDatabase::new();
        let mut skipped = 0;
        for object in &objects {
            match self.process_object(object)? {
                Some(entry) => database.push(entry),
                None => skipped += 1,
            }
        }
        database.finalize();

        let threshold = self.config.low_count_threshold;
        if threshold > 0 && database.len() < threshold {
            tracing::warn!(
                "Found {} entries. Have you compiled the tree? \
                 Objects without a .{} file are not included.",
                database.len(),
                self.config.format
            );
        }

        Ok(Report {
            database,
            objects: objects.len(),
            skipped,
        })
    }

    /// Generate the database and write it to the configured output.
    ///
    /// Nothing is written if generation fails.
    pub fn run<P: AsRef<Path>>(&self, inputs: &[P]) -> Result<Report> {
        let report = self.generate(inputs)?;
        let output = self.config.output_path();
        report.database.write_to(&output)?;
        tracing::info!(
            output = %output.display(),
            entries = report.database.len(),
            skipped = report.skipped,
            "Wrote compilation database"
        );
        Ok(report)
    }

    /// Produce the entry for one object, or `None` if it has to be skipped.
    fn process_object(&self, object: &Path) -> Result<Option<CompileCommand>> {
        let metadata = read_metadata(object, self.config.format, self.config.missing_metadata)?;
        let Some((path, text)) = metadata else {
            return Ok(None);
        };

        match self.config.format {
            MetadataFormat::Json => match CompileCommand::from_fragment(&text, &path) {
                Ok(entry) => Ok(Some(entry)),
                Err(BuildError::ParseJson { source, .. }) => {
                    tracing::warn!("Could not add fragment from {}: {}", path.display(), source);
                    Ok(None)
                }
                Err(e) => Err(e),
            },
            MetadataFormat::Cmd => {
                let mut lines = command_lines(&text);
                let Some(line) = lines.next() else {
                    tracing::debug!(path = %path.display(), "No compile command in .cmd file");
                    return Ok(None);
                };
                let extra = lines.count();
                if extra > 0 {
                    tracing::debug!(
                        path = %path.display(),
                        extra,
                        "Ignoring additional command lines"
                    );
                }

                match resolve_entry(&self.config.directory, &line.prefix, &line.source) {
                    Ok(entry) => Ok(Some(entry)),
                    Err(e) if e.is_recoverable() => {
                        tracing::info!("Could not add line from {}: {}", path.display(), e);
                        Ok(None)
                    }
                    Err(e) => Err(e),
                }
            }
        }
    }
}

/// Drop repeated object paths, keeping the first occurrence.
fn dedup_objects(objects: Vec<PathBuf>) -> Vec<PathBuf> {
    let mut seen = FxHashSet::default();
    objects.into_iter().filter(|o| seen.insert(o.clone())).collect()
}
