//! Emission dialects.
//!
//! - [`golang`]: statically typed interfaces, one handler signature per method shape.
//! - [`ruby`]: classes declaring fields and RPCs at runtime, keyed by canonical paths.

use crate::writer::IndentedWriter;

pub mod golang;
pub mod ruby;

/// Writes documentation lines after a separating blank line.
pub(crate) fn write_comments(w: &mut IndentedWriter, marker: &str, comments: &[String]) {
    w.line_break();
    write_comment_lines(w, marker, comments);
}

pub(crate) fn write_comment_lines(w: &mut IndentedWriter, marker: &str, comments: &[String]) {
    for line in comments {
        if line.is_empty() || line.starts_with(' ') {
            writeln!(w, "{marker}{line}");
        } else {
            writeln!(w, "{marker} {line}");
        }
    }
}
