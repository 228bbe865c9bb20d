//! Text buffer with indentation tracking used by every target.
//!
//! Indentation is deferred: the prefix for the current level is only written when
//! actual text follows a line break, so blank lines never carry trailing whitespace.
//!
//! ```
//! use arf_codegen::writer::IndentedWriter;
//!
//! let mut w = IndentedWriter::new();
//! w.writeln("type Foo struct {");
//! w.increase_indent();
//! w.writeln("Bar string");
//! w.decrease_indent().unwrap();
//! w.writeln("}");
//!
//! assert_eq!(w.to_string(), "type Foo struct {\n  Bar string\n}\n");
//! ```

use std::fmt;

use crate::error::{CodegenError, Result};

const DEFAULT_INDENT: &str = "  ";

#[derive(Debug, Clone)]
pub struct IndentedWriter {
    chunks: Vec<String>,
    indent_level: usize,
    indent_unit: String,
    needs_indent: bool,
}

impl Default for IndentedWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentedWriter {
    pub fn new() -> Self {
        Self::with_indent_unit(DEFAULT_INDENT)
    }

    /// Go sources are indented with tabs, Ruby with two spaces.
    pub fn with_indent_unit(unit: impl Into<String>) -> Self {
        Self {
            chunks: Vec::new(),
            indent_level: 0,
            indent_unit: unit.into(),
            needs_indent: true,
        }
    }

    /// An empty writer sharing this writer's indent level and unit.
    ///
    /// Used to render a declaration in isolation before splicing it back with
    /// [`IndentedWriter::append`].
    pub fn fork(&self) -> Self {
        Self {
            chunks: Vec::new(),
            indent_level: self.indent_level,
            indent_unit: self.indent_unit.clone(),
            needs_indent: true,
        }
    }

    pub fn indent_level(&self) -> usize {
        self.indent_level
    }

    pub fn increase_indent(&mut self) {
        self.indent_level += 1;
    }

    /// Fails with [`CodegenError::InvalidIndentState`] at level zero, leaving the level
    /// unchanged.
    pub fn decrease_indent(&mut self) -> Result<()> {
        if self.indent_level == 0 {
            return Err(CodegenError::InvalidIndentState);
        }
        self.indent_level -= 1;
        Ok(())
    }

    /// Writes `text`, indenting every line that starts after a break.
    pub fn write(&mut self, text: &str) {
        for piece in text.split_inclusive('\n') {
            self.write_piece(piece);
        }
    }

    pub fn writeln(&mut self, text: &str) {
        self.write(text);
        self.line_break();
    }

    /// Ends the current line. Called right after another line ending, it leaves an
    /// empty separator line.
    pub fn line_break(&mut self) {
        self.chunks.push("\n".to_string());
        self.needs_indent = true;
    }

    /// Makes `write!` and `writeln!` usable on the writer.
    pub fn write_fmt(&mut self, args: fmt::Arguments<'_>) {
        match args.as_str() {
            Some(text) => self.write(text),
            None => self.write(&args.to_string()),
        }
    }

    /// Moves everything written to `other` in front of this writer's content.
    pub fn merge(&mut self, other: IndentedWriter) {
        let mut chunks = other.chunks;
        chunks.append(&mut self.chunks);
        self.chunks = chunks;
    }

    /// Moves everything written to `other` after this writer's content.
    pub fn append(&mut self, other: IndentedWriter) {
        if other.chunks.is_empty() {
            return;
        }
        self.needs_indent = other.needs_indent;
        self.chunks.extend(other.chunks);
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.iter().all(|chunk| chunk.is_empty())
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.chunks.concat().into_bytes()
    }

    fn write_piece(&mut self, piece: &str) {
        if piece.is_empty() {
            return;
        }

        if self.needs_indent && !piece.starts_with('\n') {
            if self.indent_level > 0 {
                self.chunks.push(self.indent_unit.repeat(self.indent_level));
            }
            self.needs_indent = false;
        }

        self.chunks.push(piece.to_string());
        if piece.ends_with('\n') {
            self.needs_indent = true;
        }
    }
}

impl fmt::Display for IndentedWriter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for chunk in &self.chunks {
            f.write_str(chunk)?;
        }
        Ok(())
    }
}
