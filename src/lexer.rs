use thiserror::Error;

use crate::{ast::Token, value::Value};

/// A tokenization failure.
///
/// `position` is the character offset where the offending token starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("lex error at position {position}: {message}")]
pub struct LexError {
    pub position: usize,
    pub message: String,
}

impl LexError {
    fn new(position: usize, message: impl Into<String>) -> Self {
        LexError {
            position,
            message: message.into(),
        }
    }
}

pub struct Lexer {
    input: Vec<char>,
    position: usize,
    token_start: usize,
}

impl Lexer {
    pub fn new(input: &str) -> Self {
        Lexer {
            input: input.chars().collect(),
            position: 0,
            token_start: 0,
        }
    }

    /// Character offset of the most recently returned token.
    pub fn token_start(&self) -> usize {
        self.token_start
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.position).copied()
    }

    fn peek_char(&self, offset: usize) -> Option<char> {
        self.input.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        self.position += 1;
    }

    fn skip_whitespace(&mut self) {
        while let Some(ch) = self.current_char() {
            if ch.is_whitespace() {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn read_identifier(&mut self) -> String {
        let mut result = String::new();
        while let Some(ch) = self.current_char() {
            if ch.is_ascii_alphanumeric() || ch == '_' {
                result.push(ch);
                self.advance();
            } else {
                break;
            }
        }
        result
    }

    /// Reads a double-quoted identifier with JSON string escapes.
    fn read_quoted_identifier(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '"' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => {
                    self.advance(); // Consume backslash
                    match self.current_char() {
                        Some('"') => result.push('"'),
                        Some('\\') => result.push('\\'),
                        Some('/') => result.push('/'),
                        Some('b') => result.push('\u{08}'),
                        Some('f') => result.push('\u{0c}'),
                        Some('n') => result.push('\n'),
                        Some('r') => result.push('\r'),
                        Some('t') => result.push('\t'),
                        Some('u') => {
                            let c = self.read_unicode_escape()?;
                            result.push(c);
                            continue;
                        }
                        Some(ch) => {
                            return Err(LexError::new(
                                self.position - 1,
                                format!("invalid escape sequence: \\{}", ch),
                            ));
                        }
                        None => break,
                    }
                    self.advance();
                }
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new(start, "unterminated quoted identifier"))
    }

    /// Reads the `XXXX` of a `\uXXXX` escape (cursor on the `u`), combining
    /// surrogate pairs.
    fn read_unicode_escape(&mut self) -> Result<char, LexError> {
        let escape_start = self.position - 1;
        let high = self.read_hex4(escape_start)?;

        let code = if (0xD800..0xDC00).contains(&high) {
            if self.current_char() != Some('\\') || self.peek_char(1) != Some('u') {
                return Err(LexError::new(escape_start, "unpaired surrogate in \\u escape"));
            }
            self.advance(); // Consume backslash
            let low = self.read_hex4(escape_start)?;
            if !(0xDC00..0xE000).contains(&low) {
                return Err(LexError::new(escape_start, "invalid low surrogate in \\u escape"));
            }
            0x10000 + ((high - 0xD800) << 10) + (low - 0xDC00)
        } else {
            high
        };

        char::from_u32(code)
            .ok_or_else(|| LexError::new(escape_start, "invalid code point in \\u escape"))
    }

    fn read_hex4(&mut self, escape_start: usize) -> Result<u32, LexError> {
        self.advance(); // Consume 'u'
        let mut code = 0u32;
        for _ in 0..4 {
            let digit = self
                .current_char()
                .and_then(|c| c.to_digit(16))
                .ok_or_else(|| LexError::new(escape_start, "invalid \\u escape: expected 4 hex digits"))?;
            code = code * 16 + digit;
            self.advance();
        }
        Ok(code)
    }

    /// Reads a single-quoted raw string. Only `\'` and `\\` are escapes.
    fn read_raw_string(&mut self) -> Result<String, LexError> {
        let start = self.position;
        let mut result = String::new();
        self.advance(); // Consume opening quote

        while let Some(ch) = self.current_char() {
            match ch {
                '\'' => {
                    self.advance();
                    return Ok(result);
                }
                '\\' => match self.peek_char(1) {
                    Some(c @ ('\'' | '\\')) => {
                        result.push(c);
                        self.advance();
                        self.advance();
                    }
                    _ => {
                        result.push('\\');
                        self.advance();
                    }
                },
                _ => {
                    result.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new(start, "unterminated raw string"))
    }

    /// Reads a backtick-quoted JSON literal and parses its body.
    fn read_literal(&mut self) -> Result<Value, LexError> {
        let start = self.position;
        let mut body = String::new();
        self.advance(); // Consume opening backtick

        while let Some(ch) = self.current_char() {
            match ch {
                '`' => {
                    self.advance();
                    return Value::from_json(&body)
                        .map_err(|e| LexError::new(start, format!("invalid JSON literal: {}", e)));
                }
                '\\' if self.peek_char(1) == Some('`') => {
                    body.push('`');
                    self.advance();
                    self.advance();
                }
                _ => {
                    body.push(ch);
                    self.advance();
                }
            }
        }

        Err(LexError::new(start, "unterminated JSON literal"))
    }

    fn read_number(&mut self) -> Result<Token, LexError> {
        let start = self.position;
        let mut number = String::new();

        if self.current_char() == Some('-') {
            number.push('-');
            self.advance();
        }

        while let Some(ch) = self.current_char() {
            if ch.is_ascii_digit() {
                number.push(ch);
                self.advance();
            } else {
                break;
            }
        }

        number
            .parse::<i64>()
            .map(Token::Number)
            .map_err(|_| LexError::new(start, format!("invalid number: {}", number)))
    }

    /// Consumes `len` characters and returns `token`.
    fn single(&mut self, len: usize, token: Token) -> Token {
        self.position += len;
        token
    }

    pub fn next_token(&mut self) -> Result<Token, LexError> {
        self.skip_whitespace();
        self.token_start = self.position;

        let token = match self.current_char() {
            None => Token::Eof,
            Some('$') => {
                if self
                    .peek_char(1)
                    .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
                {
                    self.advance();
                    let name = self.read_identifier();
                    Token::Variable(name)
                } else {
                    self.single(1, Token::Dollar)
                }
            }
            Some('.') => self.single(1, Token::Dot),
            Some('*') => self.single(1, Token::Star),
            Some('@') => self.single(1, Token::At),
            Some(',') => self.single(1, Token::Comma),
            Some(':') => self.single(1, Token::Colon),
            Some('(') => self.single(1, Token::LParen),
            Some(')') => self.single(1, Token::RParen),
            Some('{') => self.single(1, Token::LBrace),
            Some('}') => self.single(1, Token::RBrace),
            Some(']') => self.single(1, Token::RBracket),
            Some('[') => match self.peek_char(1) {
                Some(']') => self.single(2, Token::Flatten),
                Some('?') => self.single(2, Token::Filter),
                _ => self.single(1, Token::LBracket),
            },
            Some('|') => match self.peek_char(1) {
                Some('|') => self.single(2, Token::Or),
                _ => self.single(1, Token::Pipe),
            },
            Some('&') => match self.peek_char(1) {
                Some('&') => self.single(2, Token::And),
                _ => self.single(1, Token::Ampersand),
            },
            Some('!') => match self.peek_char(1) {
                Some('=') => self.single(2, Token::NotEq),
                _ => self.single(1, Token::Not),
            },
            Some('=') => match self.peek_char(1) {
                Some('=') => self.single(2, Token::EqEq),
                _ => self.single(1, Token::Assign),
            },
            Some('<') => match self.peek_char(1) {
                Some('=') => self.single(2, Token::LtEq),
                _ => self.single(1, Token::Lt),
            },
            Some('>') => match self.peek_char(1) {
                Some('=') => self.single(2, Token::GtEq),
                _ => self.single(1, Token::Gt),
            },
            Some('"') => Token::QuotedIdentifier(self.read_quoted_identifier()?),
            Some('\'') => Token::RawString(self.read_raw_string()?),
            Some('`') => Token::Literal(self.read_literal()?),
            Some(ch) if ch.is_ascii_alphabetic() || ch == '_' => {
                let ident = self.read_identifier();

                match ident.as_str() {
                    "let" => Token::Let,
                    "in" => Token::In,
                    _ => Token::Identifier(ident),
                }
            }
            Some(ch) if ch.is_ascii_digit() => self.read_number()?,
            Some('-') if self.peek_char(1).is_some_and(|c| c.is_ascii_digit()) => {
                self.read_number()?
            }
            Some(ch) => {
                return Err(LexError::new(
                    self.position,
                    format!("unexpected character '{}'", ch),
                ));
            }
        };

        Ok(token)
    }
}

/// Tokenizes the whole input, ending with [`Token::Eof`].
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    let mut lexer = Lexer::new(input);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push(token);
        if done {
            return Ok(tokens);
        }
    }
}

#[test]
fn test_keywords() {
    let mut lexer = Lexer::new("let in letter");
    assert_eq!(lexer.next_token().unwrap(), Token::Let);
    assert_eq!(lexer.next_token().unwrap(), Token::In);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("letter".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}

#[test]
fn test_filter_query() {
    let mut lexer = Lexer::new("people[?age > `20`]");
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("people".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Filter);
    assert_eq!(lexer.next_token().unwrap(), Token::Identifier("age".to_string()));
    assert_eq!(lexer.next_token().unwrap(), Token::Gt);
    assert_eq!(lexer.next_token().unwrap(), Token::Literal(Value::Integer(20)));
    assert_eq!(lexer.next_token().unwrap(), Token::RBracket);
    assert_eq!(lexer.next_token().unwrap(), Token::Eof);
}
