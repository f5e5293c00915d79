use crate::value::Value;

/// Lexical tokens produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Names and literals
    /// Unquoted identifier
    ///
    /// Must start with a letter or underscore, followed by letters, digits,
    /// or underscores.
    ///
    /// # Examples
    /// ```text
    /// people
    /// home_state
    /// ```
    Identifier(String),

    /// Identifier enclosed in double quotes, JSON escapes allowed
    ///
    /// # Examples
    /// ```text
    /// "with space"
    /// "été"
    /// ```
    QuotedIdentifier(String),

    /// Raw string literal enclosed in single quotes
    ///
    /// # Examples
    /// ```text
    /// 'foo'
    /// 'it\'s'
    /// ```
    RawString(String),

    /// JSON literal enclosed in backticks, already parsed
    ///
    /// # Examples
    /// ```text
    /// `20`
    /// `{"a": [1, 2]}`
    /// ```
    Literal(Value),

    /// Signed integer, used by index and slice expressions
    Number(i64),

    /// Variable reference (`$name`)
    ///
    /// Resolved against `let` scopes and session parameters.
    Variable(String),

    /// Bare `$`: the document the query runs against
    Dollar,

    /// `@`: the current node
    At,

    /// `&`: expression reference, e.g. `sort_by(people, &age)`
    Ampersand,

    // Keywords
    /// `let`
    Let,
    /// `in`
    In,

    // Operators
    /// `.`
    Dot,
    /// `*`
    Star,
    /// `[]`
    Flatten,
    /// `[?`
    Filter,
    /// `|`
    Pipe,
    /// `||`
    Or,
    /// `&&`
    And,
    /// `!`
    Not,
    /// `=`, only valid inside `let` bindings
    Assign,

    // Comparison
    /// `==`
    EqEq,
    /// `!=`
    NotEq,
    /// `<`
    Lt,
    /// `<=`
    LtEq,
    /// `>`
    Gt,
    /// `>=`
    GtEq,

    // Delimiters
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `(`
    LParen,
    /// `)`
    RParen,
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `:`
    Colon,
    /// `,`
    Comma,

    /// End of input
    Eof,
}

impl Token {
    /// Left binding power used by the Pratt parser.
    ///
    /// Tokens below [`PROJECTION_STOP`] end the right-hand side of a
    /// projection.
    pub fn binding_power(&self) -> u8 {
        match self {
            Token::Pipe => 1,
            Token::Or => 2,
            Token::And => 3,
            Token::EqEq
            | Token::NotEq
            | Token::Lt
            | Token::LtEq
            | Token::Gt
            | Token::GtEq => 5,
            Token::Flatten => 9,
            Token::Star => 20,
            Token::Filter => 21,
            Token::Dot => 40,
            Token::Not => 45,
            Token::LBrace => 50,
            Token::LBracket => 55,
            Token::LParen => 60,
            _ => 0,
        }
    }
}

/// Binding power threshold below which a token stops a projection.
pub const PROJECTION_STOP: u8 = 10;
