// tests/lexer_tests.rs

use jsonquery::ast::Token;
use jsonquery::lexer::{Lexer, tokenize};
use jsonquery::Value;

fn single(input: &str) -> Token {
    let mut lexer = Lexer::new(input);
    let token = lexer.next_token().unwrap();
    assert_eq!(lexer.next_token().unwrap(), Token::Eof, "trailing token for {}", input);
    token
}

// ============================================================================
// Single Character Tokens
// ============================================================================

#[test]
fn test_single_char_tokens() {
    let test_cases = vec![
        ("$", Token::Dollar),
        ("@", Token::At),
        ("&", Token::Ampersand),
        ("!", Token::Not),
        ("|", Token::Pipe),
        ("*", Token::Star),
        ("=", Token::Assign),
        ("(", Token::LParen),
        (")", Token::RParen),
        ("[", Token::LBracket),
        ("]", Token::RBracket),
        ("{", Token::LBrace),
        ("}", Token::RBrace),
        (".", Token::Dot),
        (",", Token::Comma),
        (":", Token::Colon),
        ("<", Token::Lt),
        (">", Token::Gt),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

// ============================================================================
// Two Character Tokens
// ============================================================================

#[test]
fn test_two_char_tokens() {
    let test_cases = vec![
        ("==", Token::EqEq),
        ("!=", Token::NotEq),
        ("<=", Token::LtEq),
        (">=", Token::GtEq),
        ("||", Token::Or),
        ("&&", Token::And),
        ("[]", Token::Flatten),
        ("[?", Token::Filter),
    ];

    for (input, expected) in test_cases {
        assert_eq!(single(input), expected, "Failed for input: {}", input);
    }
}

#[test]
fn test_bracket_star_is_two_tokens() {
    assert_eq!(
        tokenize("[*]").unwrap(),
        vec![Token::LBracket, Token::Star, Token::RBracket, Token::Eof]
    );
}

#[test]
fn test_bracket_with_space_is_not_flatten() {
    assert_eq!(
        tokenize("[ ]").unwrap(),
        vec![Token::LBracket, Token::RBracket, Token::Eof]
    );
}

// ============================================================================
// Identifiers and Keywords
// ============================================================================

#[test]
fn test_identifiers() {
    assert_eq!(single("foo"), Token::Identifier("foo".into()));
    assert_eq!(single("_private"), Token::Identifier("_private".into()));
    assert_eq!(single("home_state2"), Token::Identifier("home_state2".into()));
}

#[test]
fn test_keywords_need_whole_word() {
    assert_eq!(single("let"), Token::Let);
    assert_eq!(single("in"), Token::In);
    assert_eq!(single("inner"), Token::Identifier("inner".into()));
    assert_eq!(single("letter"), Token::Identifier("letter".into()));
}

#[test]
fn test_variables() {
    assert_eq!(single("$home_state"), Token::Variable("home_state".into()));
    assert_eq!(single("$_x"), Token::Variable("_x".into()));
    assert_eq!(
        tokenize("$.a").unwrap(),
        vec![Token::Dollar, Token::Dot, Token::Identifier("a".into()), Token::Eof]
    );
}

#[test]
fn test_quoted_identifier_escapes() {
    assert_eq!(single(r#""with space""#), Token::QuotedIdentifier("with space".into()));
    assert_eq!(single(r#""a\"b""#), Token::QuotedIdentifier("a\"b".into()));
    assert_eq!(single(r#""tab\there""#), Token::QuotedIdentifier("tab\there".into()));
    assert_eq!(single(r#""é""#), Token::QuotedIdentifier("é".into()));
    assert_eq!(single(r#""😀""#), Token::QuotedIdentifier("😀".into()));
}

#[test]
fn test_quoted_identifier_errors() {
    assert!(Lexer::new(r#""open"#).next_token().is_err());
    assert!(Lexer::new(r#""\q""#).next_token().is_err());
    assert!(Lexer::new(r#""\ud83d""#).next_token().is_err());
}

// ============================================================================
// Literals
// ============================================================================

#[test]
fn test_raw_strings() {
    assert_eq!(single("'foo'"), Token::RawString("foo".into()));
    assert_eq!(single(r"'it\'s'"), Token::RawString("it's".into()));
    assert_eq!(single(r"'a\nb'"), Token::RawString(r"a\nb".into()));
    assert!(Lexer::new("'open").next_token().is_err());
}

#[test]
fn test_json_literals() {
    assert_eq!(single("`20`"), Token::Literal(Value::Integer(20)));
    assert_eq!(single("`2.5`"), Token::Literal(Value::Float(2.5)));
    assert_eq!(single("`\"txt\"`"), Token::Literal(Value::String("txt".into())));
    assert_eq!(single("`null`"), Token::Literal(Value::Null));
    assert_eq!(
        single("`[1, true]`"),
        Token::Literal(Value::Array(vec![Value::Integer(1), Value::Boolean(true)]))
    );
}

#[test]
fn test_invalid_json_literal() {
    let err = Lexer::new("`{bad`").next_token().unwrap_err();
    assert_eq!(err.position, 0);
    assert!(err.message.starts_with("invalid JSON literal"), "{}", err.message);
}

#[test]
fn test_numbers() {
    assert_eq!(single("0"), Token::Number(0));
    assert_eq!(single("42"), Token::Number(42));
    assert_eq!(single("-3"), Token::Number(-3));
}

// ============================================================================
// Positions and Errors
// ============================================================================

#[test]
fn test_token_start_positions() {
    let mut lexer = Lexer::new("a  . b");
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), 0);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), 3);
    lexer.next_token().unwrap();
    assert_eq!(lexer.token_start(), 5);
}

#[test]
fn test_unexpected_character() {
    let err = tokenize("a # b").unwrap_err();
    assert_eq!(err.position, 2);
    assert!(err.to_string().contains("unexpected character '#'"));
}

#[test]
fn test_let_expression_tokens() {
    assert_eq!(
        tokenize("let $x = a in $x").unwrap(),
        vec![
            Token::Let,
            Token::Variable("x".into()),
            Token::Assign,
            Token::Identifier("a".into()),
            Token::In,
            Token::Variable("x".into()),
            Token::Eof,
        ]
    );
}
