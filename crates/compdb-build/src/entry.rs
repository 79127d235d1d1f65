//! Compilation database entries.

use crate::error::{BuildError, Result};
use crate::escape::unescape_pound;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// A single entry of compile_commands.json.
///
/// Fields are declared in key order so the serialized objects come out with
/// sorted keys.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CompileCommand {
    /// The full compilation command, shell-ready.
    pub command: String,

    /// The working directory for compilation.
    pub directory: PathBuf,

    /// The source file path, relative to `directory` as recorded.
    pub file: PathBuf,
}

impl CompileCommand {
    /// Parse a prebuilt `.o.json` fragment.
    ///
    /// Fragments are meant to be concatenated into an array, so a single
    /// trailing comma is tolerated. Keys other than the three we emit are
    /// ignored.
    pub fn from_fragment(text: &str, path: &Path) -> Result<Self> {
        let text = text.trim();
        let text = text.strip_suffix(',').unwrap_or(text);
        serde_json::from_str(text).map_err(|source| BuildError::ParseJson {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Sort key: file first, then directory, then command.
    pub(crate) fn sort_key(&self) -> (&Path, &Path, &str) {
        (&self.file, &self.directory, &self.command)
    }
}

/// Build an entry from an extracted command line.
///
/// `prefix` still carries Make escaping; `source` is checked relative to
/// `directory`. A missing source yields [`BuildError::MissingSourceFile`],
/// which callers treat as a skipped entry.
pub fn resolve_entry(directory: &Path, prefix: &str, source: &str) -> Result<CompileCommand> {
    let expected = directory.join(source);
    if !expected.exists() {
        return Err(BuildError::MissingSourceFile {
            file: PathBuf::from(source),
            directory: directory.to_path_buf(),
        });
    }

    let mut command = unescape_pound(prefix);
    command.push_str(source);

    Ok(CompileCommand {
        command,
        directory: directory.to_path_buf(),
        file: PathBuf::from(source),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn tree_with(files: &[&str]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "int x;\n").unwrap();
        }
        dir
    }

    #[test]
    fn test_resolve_existing_source() {
        let tree = tree_with(&["drivers/x.c"]);
        let entry = resolve_entry(tree.path(), "gcc -Wall -c -o x.o ", "drivers/x.c").unwrap();

        assert_eq!(entry.directory, tree.path());
        assert_eq!(entry.file, PathBuf::from("drivers/x.c"));
        assert_eq!(entry.command, "gcc -Wall -c -o x.o drivers/x.c");
    }

    #[test]
    fn test_resolve_unescapes_prefix() {
        let tree = tree_with(&["init/main.c"]);
        let prefix = r"gcc -DA='\#inc' -DB='$(pound)inc' -c ";
        let entry = resolve_entry(tree.path(), prefix, "init/main.c").unwrap();
        assert_eq!(entry.command, "gcc -DA='#inc' -DB='#inc' -c init/main.c");
    }

    #[test]
    fn test_resolve_keeps_recorded_path() {
        let tree = tree_with(&["lib/a.c"]);
        let entry = resolve_entry(tree.path(), "gcc -c ", "./lib/../lib/a.c").unwrap();
        assert_eq!(entry.file, PathBuf::from("./lib/../lib/a.c"));
    }

    #[test]
    fn test_resolve_missing_source() {
        let tree = tree_with(&[]);
        let err = resolve_entry(tree.path(), "gcc -c ", "drivers/gone.c").unwrap_err();

        assert!(err.is_recoverable());
        match err {
            BuildError::MissingSourceFile { file, directory } => {
                assert_eq!(file, PathBuf::from("drivers/gone.c"));
                assert_eq!(directory, tree.path());
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_parse_fragment() {
        let text = r#"{
            "directory": "/build",
            "file": "src/main.c",
            "command": "cc -c src/main.c",
            "output": "src/main.o"
        },
"#;
        let entry = CompileCommand::from_fragment(text, Path::new("src/.main.o.json")).unwrap();
        assert_eq!(entry.directory, PathBuf::from("/build"));
        assert_eq!(entry.file, PathBuf::from("src/main.c"));
        assert_eq!(entry.command, "cc -c src/main.c");
    }

    #[test]
    fn test_parse_fragment_invalid() {
        let err = CompileCommand::from_fragment("{\"file\": ", Path::new(".x.o.json")).unwrap_err();
        assert!(matches!(err, BuildError::ParseJson { .. }));
        assert!(!err.is_recoverable());
    }
}
