//! SQL Lexer/Tokenizer
//!
//! A hand-written lexer that produces a stream of tokens carrying byte
//! offsets plus 1-based line/column positions.

mod span;
mod token;
mod tokenizer;

pub use span::Span;
pub use token::{Ident, Keyword, Token, TokenKind};
pub use tokenizer::Lexer;
