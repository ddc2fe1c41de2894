use super::attributes::{parse_content, parse_key_values, parse_list};
use super::tokenizer::{Token, TokenKind};
use crate::ast::{Document, Element, Import};
use crate::error::{CompileError, SyntaxReason};

/// Deepest element nesting accepted in one file
pub const MAX_DEPTH: usize = 256;

/// Attribute categories that take a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AttributeSet {
    Props,
    Dataset,
    Style,
    Classes,
    Ids,
    Content,
}

impl AttributeSet {
    fn from_kind(kind: TokenKind) -> Option<Self> {
        match kind {
            TokenKind::Props => Some(AttributeSet::Props),
            TokenKind::Dataset => Some(AttributeSet::Dataset),
            TokenKind::Style => Some(AttributeSet::Style),
            TokenKind::Classes => Some(AttributeSet::Classes),
            TokenKind::Ids => Some(AttributeSet::Ids),
            TokenKind::Content => Some(AttributeSet::Content),
            _ => None,
        }
    }
}

/// Builds a [`Document`] from a token stream.
///
/// One token of lookahead ([`current`](Self::current)); tokens are consumed
/// strictly left to right and the cursor never moves past the EOF token.
pub struct TreeBuilder {
    tokens: Vec<Token>,
    pos: usize,
    depth: usize,
}

impl TreeBuilder {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().map(|t| t.kind) != Some(TokenKind::Eof) {
            let offset = tokens.last().map_or(0, |t| t.offset + t.text.chars().count());
            tokens.push(Token::eof(offset));
        }
        Self { tokens, pos: 0, depth: 0 }
    }

    /// program := importStmt* element*
    pub fn build(mut self) -> Result<Document, CompileError> {
        let mut document = Document::default();

        loop {
            match self.current().kind {
                TokenKind::Eof => break,
                // Empty statement between top-level elements
                TokenKind::Semicolon => {
                    self.bump();
                }
                TokenKind::Import => {
                    if !document.elements.is_empty() {
                        return Err(self.invalid(SyntaxReason::ImportAfterElement));
                    }
                    let import = self.parse_import()?;
                    document.imports.push(import);
                }
                _ => {
                    let element = self.parse_element()?;
                    document.elements.push(element);
                }
            }
        }

        Ok(document)
    }

    fn current(&self) -> &Token {
        &self.tokens[self.pos]
    }

    /// Consume the current token without checking its kind
    fn bump(&mut self) -> Token {
        let token = self.tokens[self.pos].clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    /// Consume the current token, which must be of kind `expected`
    fn eat(&mut self, expected: TokenKind) -> Result<Token, CompileError> {
        if self.current().kind != expected {
            return Err(self.unexpected());
        }
        Ok(self.bump())
    }

    fn unexpected(&self) -> CompileError {
        let token = self.current();
        CompileError::UnexpectedToken {
            text: token.text.clone(),
            kind: token.kind,
            index: self.pos,
            offset: token.offset,
        }
    }

    fn invalid(&self, reason: SyntaxReason) -> CompileError {
        CompileError::InvalidSyntax {
            reason,
            index: self.pos,
            offset: self.current().offset,
        }
    }

    /// importStmt := "import" Tag "from" String ";"
    fn parse_import(&mut self) -> Result<Import, CompileError> {
        self.eat(TokenKind::Import)?;
        let name = self.eat(TokenKind::Tag)?.text;
        self.eat(TokenKind::From)?;
        let path = self.eat(TokenKind::String)?.text;
        self.eat(TokenKind::Semicolon)?;

        Ok(Import { name, path })
    }

    /// element := Tag ":" (element | attributeSet)* ";"
    fn parse_element(&mut self) -> Result<Element, CompileError> {
        if self.depth == MAX_DEPTH {
            return Err(self.invalid(SyntaxReason::TooDeep { limit: MAX_DEPTH }));
        }
        self.depth += 1;
        let element = self.parse_element_inner();
        self.depth -= 1;
        element
    }

    fn parse_element_inner(&mut self) -> Result<Element, CompileError> {
        let tag = self.eat(TokenKind::Tag)?;
        self.eat(TokenKind::Colon)?;
        let mut element = Element::new(tag.text);

        loop {
            match self.current().kind {
                TokenKind::Semicolon => {
                    self.bump();
                    element.closed = true;
                    return Ok(element);
                }
                TokenKind::Tag => {
                    let child = self.parse_element()?;
                    element.children.push(child);
                }
                kind if AttributeSet::from_kind(kind).is_some() => self.parse_set(&mut element)?,
                _ => return Err(self.unexpected()),
            }
        }
    }

    /// attributeSet := keyword ":"? Block. A repeated keyword replaces the earlier value.
    fn parse_set(&mut self, element: &mut Element) -> Result<(), CompileError> {
        let Some(set) = AttributeSet::from_kind(self.current().kind) else {
            return Err(self.invalid(SyntaxReason::InvalidSet));
        };
        self.bump();
        if self.current().kind == TokenKind::Colon {
            self.bump();
        }
        let block = self.eat(TokenKind::Block)?;

        match set {
            AttributeSet::Props => element.props = parse_key_values(&block.text),
            AttributeSet::Dataset => element.datasets = parse_key_values(&block.text),
            AttributeSet::Style => element.style = parse_key_values(&block.text),
            AttributeSet::Classes => element.classes = parse_list(&block.text),
            AttributeSet::Ids => element.ids = parse_list(&block.text),
            AttributeSet::Content => element.content = Some(parse_content(&block.text)),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Pair;
    use crate::error::ErrorKind;
    use crate::parser::tokenizer::tokenize;

    fn build(source: &str) -> Result<Document, CompileError> {
        TreeBuilder::new(tokenize(source)?).build()
    }

    #[test]
    fn test_empty_body() {
        let doc = build("div:;").unwrap();
        assert_eq!(doc.elements.len(), 1);
        let div = &doc.elements[0];
        assert_eq!(div.tag_name, "div");
        assert!(div.closed);
        assert!(div.children.is_empty());
        assert!(div.props.is_empty() && div.classes.is_empty() && div.style.is_empty());
        assert_eq!(div.content, None);
    }

    #[test]
    fn test_nested_children_keep_order() {
        let doc = build("ul: li: content:{one}; li: content:{two}; ;").unwrap();
        let ul = &doc.elements[0];
        let items: Vec<_> = ul
            .children
            .iter()
            .map(|li| li.content.as_deref().unwrap_or_default())
            .collect();
        assert_eq!(items, vec!["one", "two"]);
    }

    #[test]
    fn test_all_attribute_sets() {
        let source = r#"a:
            props:{href: /x}
            dataset:{id: 7}
            styles:{color: red}
            classes:{"a,b", c}
            ids:{main}
            content:{a\,b}
        ;"#;
        let doc = build(source).unwrap();
        let a = &doc.elements[0];
        assert_eq!(a.props, vec![Pair::new("href", "/x")]);
        assert_eq!(a.datasets, vec![Pair::new("id", "7")]);
        assert_eq!(a.style, vec![Pair::new("color", "red")]);
        assert_eq!(a.classes, vec!["a,b", "c"]);
        assert_eq!(a.ids, vec!["main"]);
        assert_eq!(a.content.as_deref(), Some("a,b"));
    }

    #[test]
    fn test_repeated_set_last_wins() {
        let doc = build("p: classes:{a, b} classes:{c};").unwrap();
        assert_eq!(doc.elements[0].classes, vec!["c"]);
    }

    #[test]
    fn test_imports_before_elements() {
        let doc = build(r#"import Card from "card.webf"; import Nav from "../nav.webf"; Card:;"#).unwrap();
        assert_eq!(
            doc.imports,
            vec![
                Import { name: "Card".into(), path: "card.webf".into() },
                Import { name: "Nav".into(), path: "../nav.webf".into() },
            ]
        );
        assert_eq!(doc.elements[0].tag_name, "Card");
    }

    #[test]
    fn test_stray_top_level_semicolons() {
        let doc = build("div: content:{x};;").unwrap();
        assert_eq!(doc.elements.len(), 1);
    }

    #[test]
    fn test_import_after_element() {
        let err = build(r#"div:; import Card from "card.webf";"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
        assert_eq!(
            err.to_string(),
            "Imports must appear before elements (token position 3)"
        );
    }

    #[test]
    fn test_missing_colon() {
        let err = build("div content:{x};").unwrap_err();
        assert_eq!(
            err,
            CompileError::UnexpectedToken {
                text: "content".into(),
                kind: TokenKind::Content,
                index: 1,
                offset: 4,
            }
        );
        assert_eq!(
            err.to_string(),
            "Unexpected token 'content' of type Content at token position 1"
        );
    }

    #[test]
    fn test_keyword_without_block() {
        let err = build("div: props;").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
        assert_eq!(err.offset(), Some(10));
    }

    #[test]
    fn test_missing_semicolon_hits_eof() {
        let err = build("div: span:;").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token 'EOF' of type EOF at token position 5"
        );
    }

    #[test]
    fn test_string_in_body() {
        let err = build(r#"div: "text";"#).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_import_missing_from() {
        let err = build(r#"import Card "card.webf";"#).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token 'card.webf' of type String at token position 2"
        );
    }

    #[test]
    fn test_top_level_keyword_is_not_an_element() {
        let err = build("props:{a:b};").unwrap_err();
        assert_eq!(err.kind(), ErrorKind::UnexpectedToken);
    }

    #[test]
    fn test_set_colon_is_optional() {
        let with_colon = build("div: content:{x};").unwrap();
        let without_colon = build("div: content{x};").unwrap();
        assert_eq!(with_colon.elements[0].content.as_deref(), Some("x"));
        assert_eq!(with_colon, without_colon);

        let doc = build(r#"span: classes:{"a,b", c} styles{color: red};"#).unwrap();
        assert_eq!(doc.elements[0].classes, vec!["a,b", "c"]);
        assert_eq!(doc.elements[0].style, vec![Pair::new("color", "red")]);
    }

    #[test]
    fn test_set_takes_one_colon_only() {
        let err = build("div: content::{x};").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected token ':' of type Colon at token position 4"
        );
    }

    fn nested(depth: usize) -> String {
        format!("{}{}", "a: ".repeat(depth), ";".repeat(depth))
    }

    #[test]
    fn test_nesting_up_to_limit() {
        let doc = build(&nested(MAX_DEPTH)).unwrap();
        let mut depth = 1;
        let mut element = &doc.elements[0];
        while let Some(child) = element.children.first() {
            element = child;
            depth += 1;
        }
        assert_eq!(depth, MAX_DEPTH);
    }

    #[test]
    fn test_nesting_past_limit() {
        let err = build(&nested(MAX_DEPTH + 1)).unwrap_err();
        assert_eq!(
            err,
            CompileError::InvalidSyntax {
                reason: SyntaxReason::TooDeep { limit: MAX_DEPTH },
                index: 2 * MAX_DEPTH,
                offset: 3 * MAX_DEPTH,
            }
        );
    }

    #[test]
    fn test_very_deep_input_fails_cleanly() {
        let err = build(&nested(200_000)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidSyntax);
    }

    #[test]
    fn test_cursor_never_passes_eof() {
        let mut builder = TreeBuilder::new(vec![Token::eof(0)]);
        builder.bump();
        builder.bump();
        assert_eq!(builder.current().kind, TokenKind::Eof);
    }
}
