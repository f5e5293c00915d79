use std::mem;

use thiserror::Error;

use crate::{
    ast::{Comparator, Expr, PROJECTION_STOP, Token},
    lexer::{LexError, Lexer},
    value::Value,
};

/// Default bound on nested expressions. Each level costs several stack
/// frames, so this stays well inside a 2 MiB thread stack in debug builds.
pub const DEFAULT_MAX_DEPTH: usize = 128;

/// Errors produced while turning query text into an AST.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The lexer rejected the input
    #[error(transparent)]
    Lex(#[from] LexError),

    /// The token stream does not form a valid expression
    #[error("parse error at position {position}: {message}")]
    Syntax { position: usize, message: String },
}

impl ParseError {
    /// Character offset the error refers to.
    pub fn position(&self) -> usize {
        match self {
            ParseError::Lex(e) => e.position,
            ParseError::Syntax { position, .. } => *position,
        }
    }
}

/// Pratt parser for the query language.
///
/// Each token has a binding power (see [`Token::binding_power`]); `nud`
/// handles tokens that start an expression and `led` handles tokens that
/// continue one.
///
/// A bare number that starts an expression is an integer literal, as in
/// `[?0]`. Directly after `[` a number is an index or slice bound instead,
/// unless a `,` follows it: `[0]` indexes while `[0, 1]` is a list.
pub struct Parser {
    lexer: Lexer,
    current_token: Token,
    current_position: usize,
    peeked: Option<(Token, usize)>,
    depth: usize,
    max_depth: usize,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Result<Self, ParseError> {
        let current_token = lexer.next_token()?;
        let current_position = lexer.token_start();
        Ok(Parser {
            lexer,
            current_token,
            current_position,
            peeked: None,
            depth: 0,
            max_depth: DEFAULT_MAX_DEPTH,
        })
    }

    /// Overrides the nesting bound.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    fn advance(&mut self) -> Result<(), ParseError> {
        let (token, position) = match self.peeked.take() {
            Some(next) => next,
            None => (self.lexer.next_token()?, self.lexer.token_start()),
        };
        self.current_token = token;
        self.current_position = position;
        Ok(())
    }

    /// Returns the current token and moves to the next one.
    fn take_token(&mut self) -> Result<Token, ParseError> {
        let token = mem::replace(&mut self.current_token, Token::Eof);
        self.advance()?;
        Ok(token)
    }

    /// Whether the token after the current one has the same kind as `token`.
    fn peek_is(&mut self, token: &Token) -> Result<bool, ParseError> {
        if self.peeked.is_none() {
            let next = self.lexer.next_token()?;
            self.peeked = Some((next, self.lexer.token_start()));
        }
        Ok(self
            .peeked
            .as_ref()
            .is_some_and(|(next, _)| mem::discriminant(next) == mem::discriminant(token)))
    }

    fn check(&self, token: &Token) -> bool {
        mem::discriminant(&self.current_token) == mem::discriminant(token)
    }

    fn expect(&mut self, expected: Token, what: &str) -> Result<(), ParseError> {
        if !self.check(&expected) {
            return self.error(format!("expected {}, found {}", what, describe(&self.current_token)));
        }
        self.advance()
    }

    fn error<T>(&self, message: impl Into<String>) -> Result<T, ParseError> {
        Err(ParseError::Syntax {
            position: self.current_position,
            message: message.into(),
        })
    }

    /// Parses a complete expression; trailing tokens are an error.
    pub fn parse(&mut self) -> Result<Expr, ParseError> {
        let expr = self.parse_expression(0)?;
        if !self.check(&Token::Eof) {
            return self.error(format!("unexpected {}", describe(&self.current_token)));
        }
        Ok(expr)
    }

    /// Parses an expression whose operators bind tighter than `rbp`.
    pub fn parse_expression(&mut self, rbp: u8) -> Result<Expr, ParseError> {
        self.depth += 1;
        let result = self.parse_expression_inner(rbp);
        self.depth -= 1;
        result
    }

    fn parse_expression_inner(&mut self, rbp: u8) -> Result<Expr, ParseError> {
        if self.depth > self.max_depth {
            return self.error(format!(
                "expression nesting exceeds maximum depth of {}",
                self.max_depth
            ));
        }

        let mut left = self.nud()?;
        let mut chain = 0;

        while rbp < self.current_token.binding_power() {
            chain += 1;
            if self.depth + chain > self.max_depth {
                return self.error(format!(
                    "expression nesting exceeds maximum depth of {}",
                    self.max_depth
                ));
            }
            left = self.led(left)?;
        }
        Ok(left)
    }

    /// Tokens that start an expression.
    fn nud(&mut self) -> Result<Expr, ParseError> {
        let position = self.current_position;

        match self.take_token()? {
            Token::At => Ok(Expr::CurrentNode),
            Token::Dollar => Ok(Expr::Root),
            Token::Variable(name) => Ok(Expr::VariableRef(name)),
            Token::Literal(value) => Ok(Expr::Literal(value)),
            Token::RawString(s) => Ok(Expr::RawString(s)),
            // a bare number outside brackets, as in `[?0]`
            Token::Number(n) => Ok(Expr::Literal(Value::Integer(n))),

            Token::Identifier(name) => {
                if self.check(&Token::LParen) {
                    self.advance()?;
                    let args = self.parse_function_args()?;
                    Ok(Expr::FunctionCall { name, args })
                } else {
                    Ok(Expr::Identifier(name))
                }
            }
            Token::QuotedIdentifier(name) => {
                if self.check(&Token::LParen) {
                    return Err(ParseError::Syntax {
                        position,
                        message: "quoted identifiers cannot be used as function names".into(),
                    });
                }
                Ok(Expr::Identifier(name))
            }

            // `let` and `in` are only keywords in a let expression
            Token::Let => {
                if matches!(self.current_token, Token::Variable(_)) {
                    self.parse_let()
                } else {
                    Ok(Expr::Identifier("let".into()))
                }
            }
            Token::In => Ok(Expr::Identifier("in".into())),

            Token::Star => {
                let rhs = self.parse_projection_rhs(Token::Star.binding_power())?;
                Ok(Expr::WildcardObject {
                    lhs: Expr::CurrentNode.boxed(),
                    rhs: rhs.boxed(),
                })
            }
            Token::Flatten => {
                let rhs = self.parse_projection_rhs(Token::Flatten.binding_power())?;
                Ok(Expr::Flatten {
                    lhs: Expr::CurrentNode.boxed(),
                    rhs: rhs.boxed(),
                })
            }
            Token::Filter => self.parse_filter(Expr::CurrentNode),

            Token::LBracket => {
                // `[0, 1]` is a list of literals; `[0]` and `[0:1]` index
                if matches!(self.current_token, Token::Number(_)) && self.peek_is(&Token::Comma)? {
                    self.parse_multi_select_list()
                } else if matches!(self.current_token, Token::Number(_) | Token::Colon) {
                    let access = self.parse_index_or_slice()?;
                    self.project_access(None, access)
                } else if self.check(&Token::Star) && self.peek_is(&Token::RBracket)? {
                    self.advance()?; // consume '*'
                    self.advance()?; // consume ']'
                    let rhs = self.parse_projection_rhs(Token::Star.binding_power())?;
                    Ok(Expr::WildcardArray {
                        lhs: Expr::CurrentNode.boxed(),
                        rhs: rhs.boxed(),
                    })
                } else {
                    self.parse_multi_select_list()
                }
            }
            Token::LBrace => self.parse_multi_select_hash(),

            Token::Not => {
                let operand = self.parse_expression(Token::Not.binding_power())?;
                Ok(Expr::Not(operand.boxed()))
            }
            Token::LParen => {
                let expr = self.parse_expression(0)?;
                self.expect(Token::RParen, "')'")?;
                Ok(expr)
            }
            Token::Ampersand => {
                let expr = self.parse_expression(0)?;
                Ok(Expr::ExpressionRef(expr.boxed()))
            }

            token => Err(ParseError::Syntax {
                position,
                message: format!("unexpected {}", describe(&token)),
            }),
        }
    }

    /// Tokens that continue an expression.
    fn led(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let position = self.current_position;

        match self.take_token()? {
            Token::Dot => {
                let rhs = self.parse_dot(Token::Dot.binding_power())?;
                Ok(Expr::Subexpression {
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                })
            }
            Token::LBracket => match self.current_token {
                Token::Number(_) | Token::Colon => {
                    let access = self.parse_index_or_slice()?;
                    self.project_access(Some(left), access)
                }
                Token::Star => {
                    self.advance()?;
                    self.expect(Token::RBracket, "']' after '[*'")?;
                    let rhs = self.parse_projection_rhs(Token::Star.binding_power())?;
                    Ok(Expr::WildcardArray {
                        lhs: left.boxed(),
                        rhs: rhs.boxed(),
                    })
                }
                _ => self.error(format!(
                    "expected number, ':' or '*' after '[', found {}",
                    describe(&self.current_token)
                )),
            },
            Token::Flatten => {
                let rhs = self.parse_projection_rhs(Token::Flatten.binding_power())?;
                Ok(Expr::Flatten {
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                })
            }
            Token::Filter => self.parse_filter(left),

            Token::Pipe => {
                let rhs = self.parse_expression(Token::Pipe.binding_power())?;
                Ok(Expr::Pipe {
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                })
            }
            Token::Or => {
                let rhs = self.parse_expression(Token::Or.binding_power())?;
                Ok(Expr::Or {
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                })
            }
            Token::And => {
                let rhs = self.parse_expression(Token::And.binding_power())?;
                Ok(Expr::And {
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                })
            }

            token @ (Token::EqEq
            | Token::NotEq
            | Token::Lt
            | Token::LtEq
            | Token::Gt
            | Token::GtEq) => {
                let bp = token.binding_power();
                let op = match token {
                    Token::EqEq => Comparator::Equal,
                    Token::NotEq => Comparator::NotEqual,
                    Token::Lt => Comparator::LessThan,
                    Token::LtEq => Comparator::LessEqual,
                    Token::Gt => Comparator::GreaterThan,
                    _ => Comparator::GreaterEqual,
                };
                let rhs = self.parse_expression(bp)?;
                Ok(Expr::Comparison {
                    op,
                    lhs: left.boxed(),
                    rhs: rhs.boxed(),
                })
            }

            Token::LParen => Err(ParseError::Syntax {
                position,
                message: "function name must be an unquoted identifier".into(),
            }),

            token => Err(ParseError::Syntax {
                position,
                message: format!("unexpected {}", describe(&token)),
            }),
        }
    }

    /// Right-hand side of a projection: identity when the next token binds
    /// too loosely to continue the projection.
    fn parse_projection_rhs(&mut self, bp: u8) -> Result<Expr, ParseError> {
        if self.current_token.binding_power() < PROJECTION_STOP {
            return Ok(Expr::CurrentNode);
        }

        match self.current_token {
            Token::LBracket | Token::Filter => self.parse_expression(bp),
            Token::Dot => {
                self.advance()?;
                self.parse_dot(bp)
            }
            _ => self.error(format!(
                "expected '.', '[' or '[?' after projection, found {}",
                describe(&self.current_token)
            )),
        }
    }

    /// What may follow a `.`: an identifier, a function call, `*`, or a
    /// multi-select.
    fn parse_dot(&mut self, bp: u8) -> Result<Expr, ParseError> {
        match self.current_token {
            Token::LBracket => {
                self.advance()?;
                self.parse_multi_select_list()
            }
            Token::LBrace => {
                self.advance()?;
                self.parse_multi_select_hash()
            }
            Token::Let => {
                self.advance()?;
                Ok(Expr::Identifier("let".into()))
            }
            Token::In => {
                self.advance()?;
                Ok(Expr::Identifier("in".into()))
            }
            Token::Identifier(_) | Token::QuotedIdentifier(_) | Token::Star => {
                self.parse_expression(bp)
            }
            _ => self.error(format!(
                "expected identifier, '*', '[' or '{{' after '.', found {}",
                describe(&self.current_token)
            )),
        }
    }

    /// Parses `[number]`, `[start:stop:step]` after the opening bracket.
    fn parse_index_or_slice(&mut self) -> Result<Expr, ParseError> {
        let mut parts: [Option<i64>; 3] = [None; 3];
        let mut part = 0;

        loop {
            match self.current_token {
                Token::Number(n) => {
                    if parts[part].is_some() {
                        return self.error("expected ':' or ']' after number");
                    }
                    parts[part] = Some(n);
                    self.advance()?;
                }
                Token::Colon => {
                    part += 1;
                    if part > 2 {
                        return self.error("too many ':' in slice expression");
                    }
                    self.advance()?;
                }
                Token::RBracket => {
                    self.advance()?;
                    break;
                }
                _ => {
                    return self.error(format!(
                        "expected number, ':' or ']', found {}",
                        describe(&self.current_token)
                    ));
                }
            }
        }

        match (part, parts[0]) {
            (0, Some(n)) => Ok(Expr::Index(n)),
            _ => Ok(Expr::Slice {
                start: parts[0],
                stop: parts[1],
                step: parts[2],
            }),
        }
    }

    /// An index is plain access; a slice starts an array projection.
    fn project_access(&mut self, left: Option<Expr>, access: Expr) -> Result<Expr, ParseError> {
        let is_slice = matches!(access, Expr::Slice { .. });
        let target = match left {
            Some(lhs) => Expr::Subexpression {
                lhs: lhs.boxed(),
                rhs: access.boxed(),
            },
            None => access,
        };

        if !is_slice {
            return Ok(target);
        }

        let rhs = self.parse_projection_rhs(Token::Star.binding_power())?;
        Ok(Expr::WildcardArray {
            lhs: target.boxed(),
            rhs: rhs.boxed(),
        })
    }

    /// Parses the rest of `[? predicate ]` and the projection that follows.
    fn parse_filter(&mut self, lhs: Expr) -> Result<Expr, ParseError> {
        let predicate = self.parse_expression(0)?;
        self.expect(Token::RBracket, "']' to close filter")?;
        let rhs = self.parse_projection_rhs(Token::Filter.binding_power())?;
        Ok(Expr::Filter {
            lhs: lhs.boxed(),
            predicate: predicate.boxed(),
            rhs: rhs.boxed(),
        })
    }

    fn parse_multi_select_list(&mut self) -> Result<Expr, ParseError> {
        let mut elements = vec![];

        loop {
            elements.push(self.parse_expression(0)?);

            match self.current_token {
                Token::Comma => self.advance()?,
                Token::RBracket => {
                    self.advance()?;
                    break;
                }
                _ => {
                    return self.error(format!(
                        "expected ',' or ']' in multi-select list, found {}",
                        describe(&self.current_token)
                    ));
                }
            }
        }

        Ok(Expr::MultiSelectList(elements))
    }

    fn parse_multi_select_hash(&mut self) -> Result<Expr, ParseError> {
        let mut pairs = vec![];

        loop {
            let position = self.current_position;
            let key = match self.take_token()? {
                Token::Identifier(s) | Token::QuotedIdentifier(s) => s,
                Token::Let => "let".to_string(),
                Token::In => "in".to_string(),
                token => {
                    return Err(ParseError::Syntax {
                        position,
                        message: format!(
                            "expected identifier as multi-select hash key, found {}",
                            describe(&token)
                        ),
                    });
                }
            };

            self.expect(Token::Colon, "':' after multi-select hash key")?;

            let value = self.parse_expression(0)?;
            pairs.push((key, value));

            match self.current_token {
                Token::Comma => self.advance()?,
                Token::RBrace => {
                    self.advance()?;
                    break;
                }
                _ => {
                    return self.error(format!(
                        "expected ',' or '}}' in multi-select hash, found {}",
                        describe(&self.current_token)
                    ));
                }
            }
        }

        Ok(Expr::MultiSelectHash(pairs))
    }

    fn parse_function_args(&mut self) -> Result<Vec<Expr>, ParseError> {
        let mut args = vec![];

        if self.check(&Token::RParen) {
            self.advance()?;
            return Ok(args);
        }

        loop {
            args.push(self.parse_expression(0)?);

            match self.current_token {
                Token::Comma => self.advance()?,
                Token::RParen => {
                    self.advance()?;
                    break;
                }
                _ => {
                    return self.error(format!(
                        "expected ',' or ')' in function arguments, found {}",
                        describe(&self.current_token)
                    ));
                }
            }
        }

        Ok(args)
    }

    /// Parses `$a = expr [, $b = expr]* in body` after the `let` keyword.
    fn parse_let(&mut self) -> Result<Expr, ParseError> {
        let mut bindings = vec![];

        loop {
            let position = self.current_position;
            let name = match self.take_token()? {
                Token::Variable(name) => name,
                token => {
                    return Err(ParseError::Syntax {
                        position,
                        message: format!(
                            "let binding name must be a variable starting with '$', found {}",
                            describe(&token)
                        ),
                    });
                }
            };

            self.expect(Token::Assign, "'=' after let binding name")?;
            let value = self.parse_expression(0)?;
            bindings.push((name, value));

            match self.current_token {
                Token::Comma => self.advance()?,
                Token::In => {
                    self.advance()?;
                    break;
                }
                _ => {
                    return self.error(format!(
                        "expected ',' or 'in' after let binding, found {}",
                        describe(&self.current_token)
                    ));
                }
            }
        }

        let body = self.parse_expression(0)?;
        Ok(Expr::LetExpression {
            bindings,
            body: body.boxed(),
        })
    }
}

/// Human-readable token description for error messages.
fn describe(token: &Token) -> String {
    match token {
        Token::Eof => "end of expression".to_string(),
        Token::Identifier(name) => format!("identifier '{}'", name),
        Token::QuotedIdentifier(name) => format!("quoted identifier \"{}\"", name),
        Token::Variable(name) => format!("variable '${}'", name),
        Token::Number(n) => format!("number {}", n),
        other => format!("{:?}", other),
    }
}

/// Parses query text with the default nesting bound.
///
/// # Examples
///
/// ```
/// use jsonquery::{Expr, parser::compile};
///
/// let expr = compile("foo.bar").unwrap();
/// assert!(matches!(expr, Expr::Subexpression { .. }));
/// ```
pub fn compile(query: &str) -> Result<Expr, ParseError> {
    compile_with_max_depth(query, DEFAULT_MAX_DEPTH)
}

/// Parses query text with an explicit nesting bound.
pub fn compile_with_max_depth(query: &str, max_depth: usize) -> Result<Expr, ParseError> {
    Parser::new(Lexer::new(query))?
        .with_max_depth(max_depth)
        .parse()
}
