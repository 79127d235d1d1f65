//! Compilation database generation from Kbuild build trees.
//!
//! This crate provides:
//! - Expansion of objects, archives and module order files into object paths
//! - `.cmd` command line extraction and Make unescaping
//! - compile_commands.json aggregation and output
//! - Generator configuration (`compdb.toml`)
//!
//! # Example
//!
//! ```no_run
//! use compdb_build::{Generator, GeneratorConfig};
//!
//! let config = GeneratorConfig::new("/build/linux");
//! let report = Generator::with_archiver(config).run(&["vmlinux.a", "modules.order"])?;
//! println!("{} entries", report.database.len());
//! # Ok::<(), compdb_build::BuildError>(())
//! ```

mod artifact;
mod config;
mod database;
mod entry;
mod error;
mod escape;
mod extract;
mod generator;
mod metadata;

pub use artifact::{
    expand_artifacts, read_module_objects, read_module_order, ArTool, ArchiveLister, Artifact,
    ArtifactKind,
};
pub use config::{GeneratorConfig, LogLevel, DEFAULT_OUTPUT, LOW_COUNT_THRESHOLD};
pub use database::CompilationDatabase;
pub use entry::{resolve_entry, CompileCommand};
pub use error::{BuildError, Result};
pub use escape::unescape_pound;
pub use extract::{command_lines, extract_command, match_line, CommandLine};
pub use generator::{Generator, Report};
pub use metadata::{metadata_path, read_metadata, MetadataFormat, MissingMetadata};
