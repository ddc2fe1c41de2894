use crate::error::{CompileError, Construct};
use std::fmt;

/// Kind of a token produced by the lexer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // === Structural ===
    /// Element name (any word that is not a keyword)
    Tag,
    Colon,
    Semicolon,
    /// Raw `{ ... }` text with `\{ \} \\` already unescaped
    Block,
    /// Double-quoted string with `\" \\` already unescaped
    String,

    // === Attribute keywords ===
    Props,
    Dataset,
    Classes,
    Ids,
    Content,
    /// Spelled `styles` in source
    Style,

    // === Import keywords ===
    Import,
    From,

    Eof,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Tag => "Tag",
            TokenKind::Colon => "Colon",
            TokenKind::Semicolon => "Semicolon",
            TokenKind::Block => "Block",
            TokenKind::String => "String",
            TokenKind::Props => "Props",
            TokenKind::Dataset => "Dataset",
            TokenKind::Classes => "Classes",
            TokenKind::Ids => "Ids",
            TokenKind::Content => "Content",
            TokenKind::Style => "Style",
            TokenKind::Import => "Import",
            TokenKind::From => "From",
            TokenKind::Eof => "EOF",
        }
    }

    /// Keyword lookup for a scanned word. Case-sensitive.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        match word {
            "props" => Some(TokenKind::Props),
            "dataset" => Some(TokenKind::Dataset),
            "classes" => Some(TokenKind::Classes),
            "ids" => Some(TokenKind::Ids),
            "content" => Some(TokenKind::Content),
            "styles" => Some(TokenKind::Style),
            "import" => Some(TokenKind::Import),
            "from" => Some(TokenKind::From),
            _ => None,
        }
    }

    /// Word tokens: tags and every keyword.
    pub fn is_word(&self) -> bool {
        matches!(
            self,
            TokenKind::Tag
                | TokenKind::Props
                | TokenKind::Dataset
                | TokenKind::Classes
                | TokenKind::Ids
                | TokenKind::Content
                | TokenKind::Style
                | TokenKind::Import
                | TokenKind::From
        )
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lexed token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    /// Character offset of the token's first character
    pub offset: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, offset: usize) -> Self {
        Self { kind, text: text.into(), offset }
    }

    pub fn eof(offset: usize) -> Self {
        Self::new(TokenKind::Eof, "EOF", offset)
    }
}

/// Characters that may appear in a tag name or keyword.
pub fn is_word_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric()
}

/// Tokenizer for Webflow source files
pub struct Tokenizer {
    chars: Vec<char>,
    pos: usize,
}

impl Tokenizer {
    pub fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
        }
    }

    /// Tokenize the entire source. The result always ends with exactly one EOF token.
    pub fn tokenize(mut self) -> Result<Vec<Token>, CompileError> {
        let mut tokens = Vec::new();

        while let Some(ch) = self.peek() {
            let start = self.pos;
            match ch {
                ':' => {
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::Colon, ":", start));
                }
                ';' => {
                    self.pos += 1;
                    tokens.push(Token::new(TokenKind::Semicolon, ";", start));
                }
                '{' => {
                    let text = self.read_delimited('}', &['{', '}', '\\'], Construct::Block)?;
                    tokens.push(Token::new(TokenKind::Block, text, start));
                }
                '"' => {
                    let text = self.read_delimited('"', &['"', '\\'], Construct::String)?;
                    tokens.push(Token::new(TokenKind::String, text, start));
                }
                '-' if self.peek_at(1) == Some('-') => self.skip_comment(),
                ' ' | '\t' | '\r' | '\n' => self.pos += 1,
                c if is_word_char(c) => {
                    let word = self.read_word();
                    let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Tag);
                    tokens.push(Token::new(kind, word, start));
                }
                c => {
                    return Err(CompileError::UnexpectedCharacter { ch: c, offset: start });
                }
            }
        }

        tokens.push(Token::eof(self.chars.len()));
        Ok(tokens)
    }

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, ahead: usize) -> Option<char> {
        self.chars.get(self.pos + ahead).copied()
    }

    /// Read from an opening delimiter up to `close`, unescaping `\x` for every
    /// `x` in `escapes`. Any other backslash is kept as-is.
    fn read_delimited(
        &mut self,
        close: char,
        escapes: &[char],
        construct: Construct,
    ) -> Result<String, CompileError> {
        let open = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            match self.peek() {
                None => return Err(CompileError::UnclosedConstruct { construct, offset: open }),
                Some('\\') => match self.peek_at(1) {
                    Some(next) if escapes.contains(&next) => {
                        value.push(next);
                        self.pos += 2;
                    }
                    _ => {
                        value.push('\\');
                        self.pos += 1;
                    }
                },
                Some(c) if c == close => {
                    self.pos += 1;
                    return Ok(value);
                }
                Some(c) => {
                    value.push(c);
                    self.pos += 1;
                }
            }
        }
    }

    /// `--` to end of line. The newline itself is left for the whitespace rule.
    fn skip_comment(&mut self) {
        while let Some(c) = self.peek() {
            if c == '\n' {
                break;
            }
            self.pos += 1;
        }
    }

    fn read_word(&mut self) -> String {
        let mut word = String::new();
        while let Some(c) = self.peek() {
            if !is_word_char(c) {
                break;
            }
            word.push(c);
            self.pos += 1;
        }
        word
    }
}

/// Tokenize source text. Fails on empty input.
pub fn tokenize(source: &str) -> Result<Vec<Token>, CompileError> {
    if source.is_empty() {
        return Err(CompileError::EmptySource);
    }
    Tokenizer::new(source).tokenize()
}
