use crate::parser::positions::position_at;
use crate::parser::tokenizer::TokenKind;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Kind of compile error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    EmptySource,
    UnclosedConstruct,
    UnexpectedCharacter,
    UnexpectedToken,
    InvalidSyntax,
    ImportNotFound,
    CyclicImport,
    Read,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::EmptySource => "Empty source",
            ErrorKind::UnclosedConstruct => "Unclosed construct",
            ErrorKind::UnexpectedCharacter => "Unexpected character",
            ErrorKind::UnexpectedToken => "Unexpected token",
            ErrorKind::InvalidSyntax => "Invalid syntax",
            ErrorKind::ImportNotFound => "Import not found",
            ErrorKind::CyclicImport => "Cyclic import",
            ErrorKind::Read => "Read error",
        }
    }
}

/// Delimited literal that can be left open at end of input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Construct {
    Block,
    String,
}

impl fmt::Display for Construct {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Construct::Block => f.write_str("block"),
            Construct::String => f.write_str("string"),
        }
    }
}

/// Why a token sequence was rejected as invalid syntax
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntaxReason {
    ImportAfterElement,
    InvalidSet,
    TooDeep { limit: usize },
}

impl fmt::Display for SyntaxReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyntaxReason::ImportAfterElement => f.write_str("Imports must appear before elements"),
            SyntaxReason::InvalidSet => f.write_str("Invalid set or missing semicolon"),
            SyntaxReason::TooDeep { limit } => write!(f, "Elements nested deeper than {} levels", limit),
        }
    }
}

/// Error during compilation. Every variant is fatal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error("Empty source given to compile.")]
    EmptySource,

    #[error("Unclosed {construct} at position {offset}")]
    UnclosedConstruct { construct: Construct, offset: usize },

    #[error("Unexpected char '{ch}' at position {offset}")]
    UnexpectedCharacter { ch: char, offset: usize },

    #[error("Unexpected token '{text}' of type {kind} at token position {index}")]
    UnexpectedToken {
        text: String,
        kind: TokenKind,
        index: usize,
        offset: usize,
    },

    #[error("{reason} (token position {index})")]
    InvalidSyntax {
        reason: SyntaxReason,
        index: usize,
        offset: usize,
    },

    #[error("Import '{name}' not found at {}", .path.display())]
    ImportNotFound { name: String, path: PathBuf },

    #[error("Import '{name}' from {} is already being compiled (cyclic import)", .path.display())]
    CyclicImport { name: String, path: PathBuf },

    #[error("Failed to read {}: {message}", .path.display())]
    Read { path: PathBuf, message: String },

    /// An error raised while compiling an imported component
    #[error("in component '{name}' ({}): {source}", .path.display())]
    InImport {
        name: String,
        path: PathBuf,
        source: Box<CompileError>,
    },
}

impl CompileError {
    /// Kind of the underlying error, looking through import wrappers
    pub fn kind(&self) -> ErrorKind {
        match self {
            CompileError::EmptySource => ErrorKind::EmptySource,
            CompileError::UnclosedConstruct { .. } => ErrorKind::UnclosedConstruct,
            CompileError::UnexpectedCharacter { .. } => ErrorKind::UnexpectedCharacter,
            CompileError::UnexpectedToken { .. } => ErrorKind::UnexpectedToken,
            CompileError::InvalidSyntax { .. } => ErrorKind::InvalidSyntax,
            CompileError::ImportNotFound { .. } => ErrorKind::ImportNotFound,
            CompileError::CyclicImport { .. } => ErrorKind::CyclicImport,
            CompileError::Read { .. } => ErrorKind::Read,
            CompileError::InImport { source, .. } => source.kind(),
        }
    }

    /// Character offset in the failing file, for lexer and parser errors
    pub fn offset(&self) -> Option<usize> {
        match self {
            CompileError::UnclosedConstruct { offset, .. }
            | CompileError::UnexpectedCharacter { offset, .. }
            | CompileError::UnexpectedToken { offset, .. }
            | CompileError::InvalidSyntax { offset, .. } => Some(*offset),
            CompileError::InImport { source, .. } => source.offset(),
            _ => None,
        }
    }

    /// The error that actually failed, plus the imports that led to it (outermost first).
    pub fn innermost(&self) -> (&CompileError, Vec<(&str, &Path)>) {
        let mut chain = Vec::new();
        let mut current = self;
        while let CompileError::InImport { name, path, source } = current {
            chain.push((name.as_str(), path.as_path()));
            current = source;
        }
        (current, chain)
    }

    fn help(&self) -> Option<&'static str> {
        match self {
            CompileError::UnclosedConstruct { construct: Construct::Block, .. } => {
                Some("Close the block with '}'. A literal brace inside a block is written \\{ or \\}.")
            }
            CompileError::UnclosedConstruct { construct: Construct::String, .. } => {
                Some("Close the string with '\"'. A literal quote inside a string is written \\\".")
            }
            CompileError::UnexpectedCharacter { .. } => {
                Some("Tag names use ASCII letters and digits; comments start with --")
            }
            CompileError::UnexpectedToken { kind: TokenKind::Eof, .. } => {
                Some("Every element body ends with ';'")
            }
            CompileError::InvalidSyntax { reason, .. } => Some(match reason {
                SyntaxReason::ImportAfterElement => "Move all import statements to the top of the file",
                SyntaxReason::InvalidSet => {
                    "Attribute sets are props, dataset, styles, classes, ids and content; end each element with ';'"
                }
                SyntaxReason::TooDeep { .. } => "Move part of the nested markup into an imported component",
            }),
            CompileError::CyclicImport { .. } => Some("Components cannot import themselves, directly or transitively"),
            _ => None,
        }
    }

    /// Width of the caret underline
    fn underline_len(&self) -> usize {
        match self {
            CompileError::UnexpectedToken { text, kind, .. } if kind.is_word() => {
                text.chars().count().max(1)
            }
            _ => 1,
        }
    }

    /// Render the error with source context
    pub fn render(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, false)
    }

    /// Render the error with ANSI color codes
    pub fn render_color(&self, source: &str, filename: &str) -> String {
        self.render_inner(source, filename, true)
    }

    fn render_inner(&self, source: &str, filename: &str, color: bool) -> String {
        let red = if color { "\x1b[1;31m" } else { "" };
        let dim = if color { "\x1b[2m" } else { "" };
        let cyan = if color { "\x1b[1;38;5;73m" } else { "" };
        let reset = if color { "\x1b[0m" } else { "" };

        let mut output = String::new();
        output.push('\n');

        let position = self.offset().map(|offset| position_at(source, offset));

        match position {
            Some(pos) => output.push_str(&format!(
                " {}file:{} {}:{}:{}\n",
                dim,
                reset,
                filename,
                pos.line + 1,
                pos.col + 1
            )),
            None => output.push_str(&format!(" {}file:{} {}\n", dim, reset, filename)),
        }

        output.push_str(&format!("{}error:{} {}\n", red, reset, self));

        if let Some(pos) = position {
            if let Some(source_line) = source.lines().nth(pos.line) {
                let line_number = pos.line + 1;
                let width = line_number.to_string().len().max(2);
                output.push_str(&format!("{}{:>width$} |{}\n", dim, "", reset, width = width));
                output.push_str(&format!(
                    "{}{:>width$} |{} {}\n",
                    dim,
                    line_number,
                    reset,
                    source_line,
                    width = width
                ));
                output.push_str(&format!(
                    "{}{:>width$} |{} {}{}{}{}\n",
                    dim,
                    "",
                    reset,
                    " ".repeat(pos.col),
                    red,
                    "^".repeat(self.underline_len()),
                    reset,
                    width = width
                ));
            }
        }

        if let Some(help) = self.help() {
            output.push('\n');
            output.push_str(&format!(" {}help:{} {}\n", cyan, reset, help));
        }

        output.push('\n');
        output
    }
}
