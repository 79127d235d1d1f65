//! Compilation database aggregation and output.

use crate::entry::CompileCommand;
use crate::error::{BuildError, Result};
use std::io::Write;
use std::path::Path;

/// Collection of compile commands (a compile_commands.json).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompilationDatabase {
    commands: Vec<CompileCommand>,
}

impl CompilationDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load compile commands from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| BuildError::read(path, e))?;
        let commands: Vec<CompileCommand> =
            serde_json::from_str(&content).map_err(|source| BuildError::ParseJson {
                path: path.to_path_buf(),
                source,
            })?;
        Ok(Self { commands })
    }

    pub fn push(&mut self, command: CompileCommand) {
        self.commands.push(command);
    }

    /// Get all compile commands.
    pub fn commands(&self) -> &[CompileCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Sort by file, directory and command, then drop identical entries.
    ///
    /// The output no longer depends on the order artifacts were given in.
    pub fn finalize(&mut self) {
        self.commands.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
        self.commands.dedup();
    }

    /// Serialize as a pretty-printed JSON array with a trailing newline.
    pub fn to_json(&self) -> Result<String> {
        let mut json = serde_json::to_string_pretty(&self.commands)?;
        json.push('\n');
        Ok(json)
    }

    /// Write the database to `path`.
    ///
    /// The file is written next to its destination and renamed into place,
    /// so an existing database is never left half-written.
    pub fn write_to(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let write_err = |source| BuildError::Write {
            path: path.to_path_buf(),
            source,
        };

        let parent = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut file = tempfile::NamedTempFile::new_in(parent).map_err(write_err)?;
        file.write_all(json.as_bytes()).map_err(write_err)?;
        file.persist(path).map_err(|e| write_err(e.error))?;

        tracing::debug!(path = %path.display(), entries = self.len(), "Wrote compilation database");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn cmd(directory: &str, file: &str, command: &str) -> CompileCommand {
        CompileCommand {
            command: command.to_string(),
            directory: PathBuf::from(directory),
            file: PathBuf::from(file),
        }
    }

    #[test]
    fn test_finalize_sorts_and_dedups() {
        let mut db = CompilationDatabase::new();
        db.push(cmd("/build", "lib/b.c", "cc -c lib/b.c"));
        db.push(cmd("/build", "lib/a.c", "cc -c lib/a.c"));
        db.push(cmd("/build", "lib/b.c", "cc -c lib/b.c"));
        db.push(cmd("/alt", "lib/b.c", "cc -c lib/b.c"));
        db.finalize();

        let files: Vec<_> = db
            .commands()
            .iter()
            .map(|c| (c.file.to_str().unwrap(), c.directory.to_str().unwrap()))
            .collect();
        assert_eq!(files, vec![("lib/a.c", "/build"), ("lib/b.c", "/alt"), ("lib/b.c", "/build")]);
    }

    #[test]
    fn test_finalize_is_order_independent() {
        let entries = [
            cmd("/build", "z.c", "cc -c z.c"),
            cmd("/build", "a.c", "cc -c a.c"),
            cmd("/build", "m.c", "cc -DM -c m.c"),
        ];

        let mut forward = CompilationDatabase::new();
        entries.iter().cloned().for_each(|e| forward.push(e));
        let mut backward = CompilationDatabase::new();
        entries.iter().rev().cloned().for_each(|e| backward.push(e));

        forward.finalize();
        backward.finalize();
        assert_eq!(forward.to_json().unwrap(), backward.to_json().unwrap());
    }

    #[test]
    fn test_json_layout() {
        let mut db = CompilationDatabase::new();
        db.push(cmd("/build", "drivers/x.c", "gcc -Wall -c -o x.o drivers/x.c"));

        let expected = r#"[
  {
    "command": "gcc -Wall -c -o x.o drivers/x.c",
    "directory": "/build",
    "file": "drivers/x.c"
  }
]
"#;
        assert_eq!(db.to_json().unwrap(), expected);
        assert_eq!(CompilationDatabase::new().to_json().unwrap(), "[]\n");
    }

    #[test]
    fn test_write_and_read_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("compile_commands.json");

        let mut db = CompilationDatabase::new();
        db.push(cmd("/build", "init/main.c", "gcc -c init/main.c"));
        db.write_to(&path).unwrap();

        let loaded = CompilationDatabase::from_file(&path).unwrap();
        assert_eq!(loaded, db);
    }

    #[test]
    fn test_write_into_missing_directory() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nope/compile_commands.json");

        let err = CompilationDatabase::new().write_to(&path).unwrap_err();
        assert!(matches!(err, BuildError::Write { .. }));
    }
}
