//! SQL Tokenizer implementation.

use std::collections::VecDeque;

use super::{Ident, Keyword, Span, Token, TokenKind};

/// A lexer that tokenizes SQL input.
///
/// The lexer never fails: characters it cannot classify come out as
/// [`TokenKind::Unknown`] tokens and the parser reports them.
pub struct Lexer<'a> {
    /// The input source code.
    input: &'a str,
    /// The current byte position.
    pos: usize,
    /// Current 1-based line.
    line: usize,
    /// Current 1-based column.
    column: usize,
    /// Tokens scanned ahead by `peek`/`peek_nth`.
    lookahead: VecDeque<Token>,
}

/// Where the token being scanned started.
#[derive(Clone, Copy)]
struct Mark {
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    /// Creates a new lexer for the given input.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            column: 1,
            lookahead: VecDeque::new(),
        }
    }

    /// Consumes and returns the next token.
    ///
    /// Once the input is exhausted every call returns an EOF token.
    pub fn next_token(&mut self) -> Token {
        match self.lookahead.pop_front() {
            Some(token) => token,
            None => self.scan(),
        }
    }

    /// Returns the next token without consuming it.
    pub fn peek(&mut self) -> &Token {
        self.peek_nth(0)
    }

    /// Returns the token `n` positions ahead (0 = next) without consuming.
    pub fn peek_nth(&mut self, n: usize) -> &Token {
        while self.lookahead.len() <= n {
            let token = self.scan();
            self.lookahead.push_back(token);
        }
        &self.lookahead[n]
    }

    /// Tokenizes the entire input, EOF token included.
    #[must_use]
    pub fn tokenize(&mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        loop {
            let token = self.next_token();
            let is_eof = token.is_eof();
            tokens.push(token);
            if is_eof {
                break;
            }
        }
        tokens
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn peek_char_nth(&self, n: usize) -> Option<char> {
        self.input[self.pos..].chars().nth(n)
    }

    /// Advances one character, keeping line/column current.
    ///
    /// `\r\n` and `\n` both count as a single line break.
    fn advance(&mut self) -> Option<char> {
        let c = self.peek_char()?;
        self.pos += c.len_utf8();
        match c {
            '\n' => {
                self.line += 1;
                self.column = 1;
            }
            '\r' if self.peek_char() == Some('\n') => {}
            _ => self.column += 1,
        }
        Some(c)
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.peek_char().is_some_and(char::is_whitespace) {
                self.advance();
            }

            if self.peek_char() == Some('-') && self.peek_char_nth(1) == Some('-') {
                while self.peek_char().is_some_and(|c| c != '\n') {
                    self.advance();
                }
                continue;
            }

            // An unterminated block comment runs to the end of input.
            if self.peek_char() == Some('/') && self.peek_char_nth(1) == Some('*') {
                self.advance();
                self.advance();
                loop {
                    match self.advance() {
                        Some('*') if self.peek_char() == Some('/') => {
                            self.advance();
                            break;
                        }
                        None => break,
                        _ => {}
                    }
                }
                continue;
            }

            break;
        }
    }

    fn mark(&self) -> Mark {
        Mark {
            pos: self.pos,
            line: self.line,
            column: self.column,
        }
    }

    fn make_token(&self, mark: Mark, kind: TokenKind) -> Token {
        let span = Span::new(mark.pos, self.pos, mark.line, mark.column)
            .with_end(self.line, self.column);
        Token::new(kind, span, &self.input[mark.pos..self.pos])
    }

    /// Consumes `c` if it is the next character.
    fn eat(&mut self, c: char) -> bool {
        if self.peek_char() == Some(c) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn scan(&mut self) -> Token {
        self.skip_whitespace_and_comments();
        let mark = self.mark();

        let Some(c) = self.peek_char() else {
            return self.make_token(mark, TokenKind::Eof);
        };

        match c {
            '0'..='9' => return self.scan_number(mark),
            '.' if self.peek_char_nth(1).is_some_and(|n| n.is_ascii_digit()) => {
                return self.scan_number(mark);
            }
            '\'' => return self.scan_string(mark),
            '"' | '`' => return self.scan_quoted_identifier(mark, c, c),
            '[' => return self.scan_quoted_identifier(mark, '[', ']'),
            c if c.is_alphabetic() || c == '_' => return self.scan_identifier(mark),
            _ => {}
        }

        self.advance();
        let kind = match c {
            '(' => TokenKind::LeftParen,
            ')' => TokenKind::RightParen,
            '+' => TokenKind::Plus,
            '-' => TokenKind::Minus,
            '*' => TokenKind::Star,
            '/' => TokenKind::Slash,
            '%' => TokenKind::Percent,
            '.' => TokenKind::Dot,
            ',' => TokenKind::Comma,
            ';' => TokenKind::Semicolon,
            '?' => TokenKind::Question,
            '@' => TokenKind::At,
            ':' => TokenKind::Colon,
            '|' => {
                if self.eat('|') {
                    TokenKind::Concat
                } else {
                    TokenKind::Pipe
                }
            }
            '=' => {
                self.eat('=');
                TokenKind::Eq
            }
            '!' => {
                if self.eat('=') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Unknown
                }
            }
            '<' => {
                if self.eat('=') {
                    TokenKind::LtEq
                } else if self.eat('>') {
                    TokenKind::NotEq
                } else {
                    TokenKind::Lt
                }
            }
            '>' => {
                if self.eat('=') {
                    TokenKind::GtEq
                } else {
                    TokenKind::Gt
                }
            }
            '&' => {
                if self.eat('&') {
                    TokenKind::AndAnd
                } else {
                    TokenKind::Unknown
                }
            }
            _ => TokenKind::Unknown,
        };
        self.make_token(mark, kind)
    }

    fn scan_identifier(&mut self, mark: Mark) -> Token {
        while self
            .peek_char()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == '$')
        {
            self.advance();
        }

        let text = &self.input[mark.pos..self.pos];
        match Keyword::from_str(text) {
            Some(keyword) => self.make_token(mark, TokenKind::Keyword(keyword)),
            None => self.make_token(mark, TokenKind::Identifier(Ident::bare(text))),
        }
    }

    /// Scans `"name"`, `` `name` `` or `[name]`. Doubling the closing quote
    /// escapes it, except for brackets.
    fn scan_quoted_identifier(&mut self, mark: Mark, open: char, close: char) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                Some(c) if c == close => {
                    if open != '[' && self.peek_char() == Some(close) {
                        self.advance();
                        value.push(close);
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
                None => return self.make_token(mark, TokenKind::Unknown),
            }
        }

        self.make_token(mark, TokenKind::Identifier(Ident::quoted(value)))
    }

    fn scan_string(&mut self, mark: Mark) -> Token {
        self.advance();
        let mut value = String::new();

        loop {
            match self.advance() {
                Some('\'') => {
                    if self.peek_char() == Some('\'') {
                        self.advance();
                        value.push('\'');
                    } else {
                        break;
                    }
                }
                Some(c) => value.push(c),
                None => return self.make_token(mark, TokenKind::Unknown),
            }
        }

        self.make_token(mark, TokenKind::String(value))
    }

    /// Scans one numeric literal.
    ///
    /// A literal takes at most one fractional part, so `1.2.3.` comes out as
    /// `1.2`, `.3` and a trailing `.`.
    fn scan_number(&mut self, mark: Mark) -> Token {
        let mut is_float = false;

        self.eat_digits();

        if self.peek_char() == Some('.') && self.peek_char_nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            is_float = true;
            self.advance();
            self.eat_digits();
        }

        if matches!(self.peek_char(), Some('e' | 'E')) {
            let digit_follows = match self.peek_char_nth(1) {
                Some('+' | '-') => self.peek_char_nth(2).is_some_and(|c| c.is_ascii_digit()),
                Some(c) => c.is_ascii_digit(),
                None => false,
            };
            if digit_follows {
                is_float = true;
                self.advance();
                if matches!(self.peek_char(), Some('+' | '-')) {
                    self.advance();
                }
                self.eat_digits();
            }
        }

        let text = &self.input[mark.pos..self.pos];
        let kind = if is_float {
            text.parse::<f64>()
                .map_or(TokenKind::Unknown, TokenKind::Float)
        } else {
            match text.parse::<i64>() {
                Ok(n) => TokenKind::Integer(n),
                // too large for i64
                Err(_) => text
                    .parse::<f64>()
                    .map_or(TokenKind::Unknown, TokenKind::Float),
            }
        };
        self.make_token(mark, kind)
    }

    fn eat_digits(&mut self) {
        while self.peek_char().is_some_and(|c| c.is_ascii_digit()) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize()
    }

    fn token_kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input).into_iter().map(|t| t.kind).collect()
    }

    fn float_of(input: &str) -> f64 {
        match &tokenize(input)[0].kind {
            TokenKind::Float(x) => *x,
            other => panic!("Expected float for {input}, got {other:?}"),
        }
    }

    #[test]
    fn test_empty_input() {
        let tokens = tokenize("");
        assert_eq!(tokens.len(), 1);
        assert!(tokens[0].is_eof());
    }

    #[test]
    fn test_keywords_case_insensitive() {
        let expected = vec![TokenKind::Keyword(Keyword::Create), TokenKind::Eof];
        assert_eq!(token_kinds("create"), expected);
        assert_eq!(token_kinds("CREATE"), expected);
        assert_eq!(token_kinds("CreAte"), expected);
    }

    #[test]
    fn test_identifier_keeps_both_cases() {
        let tokens = tokenize("Contacts");
        let ident = tokens[0].as_ident().expect("identifier");
        assert_eq!(ident.lower, "contacts");
        assert_eq!(ident.original, "Contacts");
        assert!(!ident.quoted);
    }

    #[test]
    fn test_quoted_identifiers_are_verbatim() {
        let tokens = tokenize("\"First Name\" [Order Date] `x`");
        let names: Vec<&str> = tokens
            .iter()
            .filter_map(|t| t.as_ident().map(|i| i.lower.as_str()))
            .collect();
        assert_eq!(names, vec!["First Name", "Order Date", "x"]);
        assert!(tokens[0].as_ident().is_some_and(|i| i.quoted));
    }

    #[test]
    fn test_quoted_identifier_shadows_keyword() {
        let tokens = tokenize("\"select\"");
        assert!(matches!(tokens[0].kind, TokenKind::Identifier(_)));
    }

    #[test]
    fn test_integer() {
        assert_eq!(
            token_kinds("100"),
            vec![TokenKind::Integer(100), TokenKind::Eof]
        );
    }

    #[test]
    fn test_floats() {
        assert!((float_of("100.023") - 100.023).abs() < 1e-9);
        assert!((float_of(".2") - 0.2).abs() < 1e-9);
        assert!((float_of("1e2") - 100.0).abs() < 1e-9);
        assert!((float_of("1.02e1") - 10.2).abs() < 1e-9);
        assert!((float_of("25e-1") - 2.5).abs() < 1e-9);
    }

    #[test]
    fn test_multiple_dots_split_greedily() {
        let kinds = token_kinds("1.2.3.");
        assert_eq!(kinds.len(), 4);
        assert!(matches!(kinds[0], TokenKind::Float(x) if (x - 1.2).abs() < 1e-9));
        assert!(matches!(kinds[1], TokenKind::Float(x) if (x - 0.3).abs() < 1e-9));
        assert_eq!(kinds[2], TokenKind::Dot);
        assert_eq!(kinds[3], TokenKind::Eof);
    }

    #[test]
    fn test_exponent_marker_without_digits_is_not_consumed() {
        assert_eq!(
            token_kinds("1end"),
            vec![
                TokenKind::Integer(1),
                TokenKind::Keyword(Keyword::End),
                TokenKind::Eof,
            ]
        );
        assert_eq!(
            token_kinds("2e+x"),
            vec![
                TokenKind::Integer(2),
                TokenKind::Identifier(Ident::bare("e")),
                TokenKind::Plus,
                TokenKind::Identifier(Ident::bare("x")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_integer_overflow_degrades_to_float() {
        assert!(matches!(
            token_kinds("99999999999999999999")[0],
            TokenKind::Float(_)
        ));
    }

    #[test]
    fn test_operators() {
        assert_eq!(
            token_kinds("( ) + - . , ; / * % | || = == != <> < > >= <= && ? @ :"),
            vec![
                TokenKind::LeftParen,
                TokenKind::RightParen,
                TokenKind::Plus,
                TokenKind::Minus,
                TokenKind::Dot,
                TokenKind::Comma,
                TokenKind::Semicolon,
                TokenKind::Slash,
                TokenKind::Star,
                TokenKind::Percent,
                TokenKind::Pipe,
                TokenKind::Concat,
                TokenKind::Eq,
                TokenKind::Eq,
                TokenKind::NotEq,
                TokenKind::NotEq,
                TokenKind::Lt,
                TokenKind::Gt,
                TokenKind::GtEq,
                TokenKind::LtEq,
                TokenKind::AndAnd,
                TokenKind::Question,
                TokenKind::At,
                TokenKind::Colon,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_comments_are_skipped() {
        assert_eq!(
            token_kinds("CREATE -- trailing\nTABLE /* inline */ t"),
            vec![
                TokenKind::Keyword(Keyword::Create),
                TokenKind::Keyword(Keyword::Table),
                TokenKind::Identifier(Ident::bare("t")),
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn test_unterminated_block_comment_ends_at_eof() {
        assert_eq!(
            token_kinds("DROP /* never closed"),
            vec![TokenKind::Keyword(Keyword::Drop), TokenKind::Eof]
        );
    }

    #[test]
    fn test_unknown_characters() {
        assert_eq!(
            token_kinds("# !"),
            vec![TokenKind::Unknown, TokenKind::Unknown, TokenKind::Eof]
        );
        assert_eq!(token_kinds("'open")[0], TokenKind::Unknown);
        assert_eq!(token_kinds("\"open")[0], TokenKind::Unknown);
    }

    #[test]
    fn test_strings() {
        assert_eq!(
            token_kinds("'it''s'"),
            vec![TokenKind::String(String::from("it's")), TokenKind::Eof]
        );
    }

    #[test]
    fn test_line_and_column_tracking() {
        let tokens = tokenize("CREATE TABLE\r\n  t (\n id int)");
        let positions: Vec<(usize, usize)> =
            tokens.iter().map(|t| (t.span.line, t.span.column)).collect();
        assert_eq!(
            positions,
            vec![(1, 1), (1, 8), (2, 3), (2, 5), (3, 2), (3, 5), (3, 8), (3, 9)]
        );
    }

    #[test]
    fn test_end_position_counts_characters() {
        let tokens = tokenize("SELECT é, \"a\nb\"");
        assert_eq!(tokens[1].span.end_position(), (1, 9));
        assert_eq!(tokens[1].span.len(), 2);
        assert_eq!((tokens[2].span.line, tokens[2].span.column), (1, 9));
        assert_eq!((tokens[3].span.line, tokens[3].span.column), (1, 11));
        assert_eq!(tokens[3].span.end_position(), (2, 3));
    }

    #[test]
    fn test_token_text_and_offsets() {
        let tokens = tokenize("SELECT Name");
        assert_eq!(tokens[1].text, "Name");
        assert_eq!(tokens[1].span.start, 7);
        assert_eq!(tokens[1].span.end, 11);
    }

    #[test]
    fn test_peek_does_not_consume() {
        let mut lexer = Lexer::new("ALTER COLUMN name RENAME");
        assert_eq!(lexer.peek().kind, TokenKind::Keyword(Keyword::Alter));
        assert_eq!(lexer.peek_nth(3).kind, TokenKind::Keyword(Keyword::Rename));
        assert_eq!(lexer.next_token().kind, TokenKind::Keyword(Keyword::Alter));
        assert_eq!(lexer.next_token().kind, TokenKind::Keyword(Keyword::Column));
        assert!(matches!(lexer.next_token().kind, TokenKind::Identifier(_)));
        assert_eq!(lexer.next_token().kind, TokenKind::Keyword(Keyword::Rename));
        assert!(lexer.next_token().is_eof());
        assert!(lexer.next_token().is_eof());
    }

    #[test]
    fn test_named_parameter_tokens() {
        assert_eq!(
            token_kinds("@id:java.lang.Integer"),
            vec![
                TokenKind::At,
                TokenKind::Identifier(Ident::bare("id")),
                TokenKind::Colon,
                TokenKind::Identifier(Ident::bare("java")),
                TokenKind::Dot,
                TokenKind::Identifier(Ident::bare("lang")),
                TokenKind::Dot,
                TokenKind::Identifier(Ident::bare("Integer")),
                TokenKind::Eof,
            ]
        );
    }
}
