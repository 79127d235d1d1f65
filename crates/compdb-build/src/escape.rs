//! Reversal of Make-level escaping in recorded command lines.
//!
//! `.cmd` files are included by Make, which treats a bare `#` as the start of
//! a comment, so Kbuild records `#` either as `\#` or as `$(pound)` depending
//! on the kernel version. The database is not read by Make and needs the
//! literal character back.

/// Replace both escaped spellings of `#` with the literal character.
pub fn unescape_pound(prefix: &str) -> String {
    prefix.replace("\\#", "#").replace("$(pound)", "#")
}
