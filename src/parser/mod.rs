pub mod attributes;
pub mod positions;
pub mod tokenizer;
mod tree_builder;

pub use tokenizer::{Token, TokenKind, tokenize};
pub use tree_builder::TreeBuilder;

use crate::ast::Document;
use crate::error::CompileError;

/// Tokenize and parse a source file
pub fn parse(source: &str) -> Result<Document, CompileError> {
    let tokens = tokenize(source)?;
    TreeBuilder::new(tokens).build()
}
