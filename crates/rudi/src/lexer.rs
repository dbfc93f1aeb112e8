//! UTF-8 lexer for the surface language.
//!
//! Symbols are lexed whole: a name plus its optional `!` modifier plus any
//! attached path expression arrive as a single token, which keeps the
//! parser free of context-sensitive lookahead. `,` and `:` read as
//! whitespace, `#` starts a comment running to end of line.

use crate::ast::PathStep;
use crate::error::ParseError;

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    RBrace,
    Int(i64),
    Float(f64),
    Str(String),
    /// Function-shaped name: `set!`, `to-upper`, `+`, `foo.bar`.
    Name {
        name: String,
        bang: bool,
        path: Vec<PathStep>,
    },
    /// Document identifier: `.`, `.foo[0]`, `.[2].bar`.
    DocSymbol { path: Vec<PathStep> },
    /// Variable identifier: `$name`, `$name.foo[0]`.
    VarSymbol {
        name: String,
        path: Vec<PathStep>,
    },
    Eof,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

impl Token {
    fn new(kind: TokenKind, line: usize, column: usize) -> Self {
        Self { kind, line, column }
    }
}

fn is_name_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

fn is_name_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '!' | '-')
}

fn is_key_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || matches!(c, '_' | '-')
}

pub struct Lexer<'a> {
    script: &'a str,
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(script: &'a str, source: &str) -> Self {
        Self {
            script,
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_trivia();
            if self.is_at_end() {
                tokens.push(Token::new(TokenKind::Eof, self.line, self.column));
                return Ok(tokens);
            }
            tokens.push(self.next_token()?);
        }
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let line = self.line;
        let column = self.column;
        let c = self.advance();

        let kind = match c {
            '(' => TokenKind::LParen,
            ')' => TokenKind::RParen,
            '[' => TokenKind::LBracket,
            ']' => TokenKind::RBracket,
            '{' => TokenKind::LBrace,
            '}' => TokenKind::RBrace,
            '"' => TokenKind::Str(self.read_string(line, column)?),
            '.' => TokenKind::DocSymbol {
                path: self.read_path_after_dot(line, column)?,
            },
            '$' => {
                let name = self.read_variable_name(line, column)?;
                let path = self.read_path(line, column)?;
                TokenKind::VarSymbol { name, path }
            }
            '0'..='9' => self.read_number(c, false, line, column)?,
            '-' if self.peek().is_ascii_digit() => {
                let first = self.advance();
                self.read_number(first, true, line, column)?
            }
            '+' | '-' | '*' | '/' => {
                let bang = self.peek() == '!';
                if bang {
                    self.advance();
                }
                TokenKind::Name {
                    name: c.to_string(),
                    bang,
                    path: Vec::new(),
                }
            }
            c if is_name_start(c) => {
                let mut name = c.to_string();
                while is_name_char(self.peek()) {
                    name.push(self.advance());
                }
                let bang = name.ends_with('!');
                if bang {
                    name.pop();
                }
                let path = self.read_path(line, column)?;
                TokenKind::Name { name, bang, path }
            }
            other => {
                return Err(self.err(line, column, format!("unexpected character `{other}`")));
            }
        };

        Ok(Token::new(kind, line, column))
    }

    /// Path steps following a symbol: `(".key" | "[index]")*`.
    fn read_path(&mut self, line: usize, column: usize) -> Result<Vec<PathStep>, ParseError> {
        let mut steps = Vec::new();
        loop {
            match self.peek() {
                '.' => {
                    self.advance();
                    steps.push(self.read_key_step(line, column)?);
                }
                '[' => {
                    self.advance();
                    steps.push(self.read_index_step(line, column)?);
                }
                _ => return Ok(steps),
            }
        }
    }

    /// Same as `read_path`, but the leading `.` of a document symbol has
    /// already been consumed: a bare `.` is a valid whole-document
    /// accessor.
    fn read_path_after_dot(&mut self, line: usize, column: usize) -> Result<Vec<PathStep>, ParseError> {
        if !is_name_start(self.peek()) && self.peek() != '[' {
            return Ok(Vec::new());
        }
        let mut steps = Vec::new();
        if self.peek() == '[' {
            self.advance();
            steps.push(self.read_index_step(line, column)?);
        } else {
            steps.push(self.read_key_step(line, column)?);
        }
        steps.extend(self.read_path(line, column)?);
        Ok(steps)
    }

    fn read_key_step(&mut self, line: usize, column: usize) -> Result<PathStep, ParseError> {
        if !is_name_start(self.peek()) {
            return Err(self.err(line, column, "expected a key after `.`"));
        }
        let mut key = String::new();
        while is_key_char(self.peek()) {
            key.push(self.advance());
        }
        Ok(PathStep::Key(key))
    }

    fn read_index_step(&mut self, line: usize, column: usize) -> Result<PathStep, ParseError> {
        let mut digits = String::new();
        while self.peek().is_ascii_digit() {
            digits.push(self.advance());
        }
        if digits.is_empty() {
            return Err(self.err(line, column, "expected an index after `[`"));
        }
        if self.peek() != ']' {
            return Err(self.err(line, column, "expected `]` to close the index"));
        }
        self.advance();
        let index = digits
            .parse::<usize>()
            .map_err(|_| self.err(line, column, "index out of range"))?;
        Ok(PathStep::Index(index))
    }

    fn read_variable_name(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        if !is_name_start(self.peek()) {
            return Err(self.err(line, column, "expected a variable name after `$`"));
        }
        let mut name = String::new();
        while {
            let c = self.peek();
            c.is_ascii_alphanumeric() || matches!(c, '_' | '?' | '-')
        } {
            name.push(self.advance());
        }
        Ok(name)
    }

    fn read_number(&mut self, first: char, negative: bool, line: usize, column: usize) -> Result<TokenKind, ParseError> {
        let mut text = String::new();
        if negative {
            text.push('-');
        }
        text.push(first);
        while self.peek().is_ascii_digit() {
            text.push(self.advance());
        }

        let mut float = false;
        if self.peek() == '.' && self.peek_next().is_ascii_digit() {
            float = true;
            text.push(self.advance());
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }
        if matches!(self.peek(), 'e' | 'E') {
            float = true;
            text.push(self.advance());
            if matches!(self.peek(), '+' | '-') {
                text.push(self.advance());
            }
            if !self.peek().is_ascii_digit() {
                return Err(self.err(line, column, "expected digits in exponent"));
            }
            while self.peek().is_ascii_digit() {
                text.push(self.advance());
            }
        }

        if float {
            let value = text
                .parse::<f64>()
                .map_err(|_| self.err(line, column, format!("invalid number `{text}`")))?;
            Ok(TokenKind::Float(value))
        } else {
            let value = text
                .parse::<i64>()
                .map_err(|_| self.err(line, column, format!("integer literal out of range `{text}`")))?;
            Ok(TokenKind::Int(value))
        }
    }

    fn read_string(&mut self, line: usize, column: usize) -> Result<String, ParseError> {
        let mut out = String::new();
        loop {
            if self.is_at_end() {
                return Err(self.err(line, column, "unterminated string literal"));
            }
            let c = self.advance();
            match c {
                '"' => return Ok(out),
                '\\' => {
                    if self.is_at_end() {
                        return Err(self.err(line, column, "unterminated string literal"));
                    }
                    let escape = self.advance();
                    match escape {
                        'n' => out.push('\n'),
                        't' => out.push('\t'),
                        '\\' => out.push('\\'),
                        '"' => out.push('"'),
                        'u' => out.push(self.read_unicode_escape(line, column)?),
                        other => {
                            return Err(self.err(line, column, format!("invalid escape sequence `\\{other}`")));
                        }
                    }
                }
                c => out.push(c),
            }
        }
    }

    fn read_unicode_escape(&mut self, line: usize, column: usize) -> Result<char, ParseError> {
        let mut code = 0u32;
        for _ in 0..4 {
            let c = self.peek();
            let digit = c
                .to_digit(16)
                .ok_or_else(|| self.err(line, column, "expected 4 hex digits after `\\u`"))?;
            self.advance();
            code = code * 16 + digit;
        }
        char::from_u32(code).ok_or_else(|| self.err(line, column, format!("invalid unicode escape `\\u{code:04x}`")))
    }

    fn skip_trivia(&mut self) {
        loop {
            match self.peek() {
                c if c.is_whitespace() => {
                    self.advance();
                }
                ',' | ':' => {
                    self.advance();
                }
                '#' => {
                    while !self.is_at_end() && self.peek() != '\n' {
                        self.advance();
                    }
                }
                _ => return,
            }
        }
    }

    fn advance(&mut self) -> char {
        let c = self.chars[self.pos];
        self.pos += 1;
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        c
    }

    fn peek(&self) -> char {
        if self.is_at_end() {
            '\0'
        } else {
            self.chars[self.pos]
        }
    }

    fn peek_next(&self) -> char {
        if self.pos + 1 >= self.chars.len() {
            '\0'
        } else {
            self.chars[self.pos + 1]
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn err(&self, line: usize, column: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(self.script, line, column, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(source: &str) -> Vec<TokenKind> {
        Lexer::new("test", source)
            .tokenize()
            .expect("tokenize")
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn symbols_lex_whole() {
        let tokens = lex("(set! .foo[0].bar $v.x 42)");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LParen,
                TokenKind::Name {
                    name: "set".into(),
                    bang: true,
                    path: vec![],
                },
                TokenKind::DocSymbol {
                    path: vec![
                        PathStep::Key("foo".into()),
                        PathStep::Index(0),
                        PathStep::Key("bar".into()),
                    ],
                },
                TokenKind::VarSymbol {
                    name: "v".into(),
                    path: vec![PathStep::Key("x".into())],
                },
                TokenKind::Int(42),
                TokenKind::RParen,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn numbers_distinguish_int_and_float() {
        assert_eq!(lex("42")[0], TokenKind::Int(42));
        assert_eq!(lex("-42")[0], TokenKind::Int(-42));
        assert_eq!(lex("4.25")[0], TokenKind::Float(4.25));
        assert_eq!(lex("1e3")[0], TokenKind::Float(1000.0));
        assert_eq!(lex("-2.5e-1")[0], TokenKind::Float(-0.25));
    }

    #[test]
    fn operator_names_and_bang_aliases() {
        assert_eq!(
            lex("+")[0],
            TokenKind::Name {
                name: "+".into(),
                bang: false,
                path: vec![],
            }
        );
        assert_eq!(
            lex("+!")[0],
            TokenKind::Name {
                name: "+".into(),
                bang: true,
                path: vec![],
            }
        );
        assert_eq!(
            lex("empty?")[0],
            TokenKind::Name {
                name: "empty?".into(),
                bang: false,
                path: vec![],
            }
        );
    }

    #[test]
    fn string_escapes() {
        assert_eq!(lex(r#""a\n\t\\\"A""#)[0], TokenKind::Str("a\n\t\\\"A".into()));
        assert!(Lexer::new("test", r#""oops"#).tokenize().is_err());
        assert!(Lexer::new("test", r#""\q""#).tokenize().is_err());
    }

    #[test]
    fn comments_commas_and_colons_are_trivia() {
        let tokens = lex("# heading\n[1, 2] {\"a\": 3} # trailing");
        assert_eq!(
            tokens,
            vec![
                TokenKind::LBracket,
                TokenKind::Int(1),
                TokenKind::Int(2),
                TokenKind::RBracket,
                TokenKind::LBrace,
                TokenKind::Str("a".into()),
                TokenKind::Int(3),
                TokenKind::RBrace,
                TokenKind::Eof,
            ]
        );
    }

    #[test]
    fn bare_document_symbol() {
        assert_eq!(lex(".")[0], TokenKind::DocSymbol { path: vec![] });
        assert_eq!(
            lex(".[1]")[0],
            TokenKind::DocSymbol {
                path: vec![PathStep::Index(1)],
            }
        );
    }

    #[test]
    fn positions_track_lines_and_columns() {
        let tokens = Lexer::new("test", "1\n  foo").tokenize().expect("tokenize");
        assert_eq!((tokens[0].line, tokens[0].column), (1, 1));
        assert_eq!((tokens[1].line, tokens[1].column), (2, 3));
    }
}
