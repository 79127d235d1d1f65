//! Command line extraction from Kbuild `.cmd` files.
//!
//! A `.cmd` file is a Make fragment. The line we care about records the
//! command that produced the object:
//!
//! ```text
//! cmd_drivers/x.o := gcc -Wall -c -o drivers/x.o drivers/x.c
//! ```
//!
//! Everything up to and including the last space before the `.c` file is the
//! command prefix; the trailing path is the compiled source.

use regex::Regex;
use std::sync::LazyLock;

static LINE_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^cmd_[^ ]*\.o := (.* )([^ ]*\.c)$").unwrap());

/// The compiler invocation recovered from a single `.cmd` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandLine {
    /// Command up to the source file, still escaped for Make.
    pub prefix: String,
    /// Source file as written in the command.
    pub source: String,
}

/// Match a single line against the command pattern.
pub fn match_line(line: &str) -> Option<CommandLine> {
    let captures = LINE_PATTERN.captures(line)?;
    Some(CommandLine {
        prefix: captures[1].to_string(),
        source: captures[2].to_string(),
    })
}

/// Find all command lines in a `.cmd` file, in file order.
pub fn command_lines(text: &str) -> impl Iterator<Item = CommandLine> + '_ {
    text.lines().filter_map(match_line)
}

/// Extract the primary command of a `.cmd` file.
///
/// When more than one line matches, the first one wins.
pub fn extract_command(text: &str) -> Option<CommandLine> {
    command_lines(text).next()
}
