//! Lexer for alias option markup using logos

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\r]+")]
pub enum Token {
    // Delimiters
    #[token("{")]
    BraceOpen,
    #[token("}")]
    BraceClose,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,

    // Newlines separate entries in block style markup
    #[token("\n")]
    Newline,

    #[token("true", |_| true)]
    #[token("false", |_| false)]
    Bool(bool),

    #[regex(r"[+-]?[0-9]+", |lex| lex.slice().parse::<i64>().ok())]
    Integer(i64),

    #[regex(
        r"[+-]?([0-9]+\.[0-9]*|\.[0-9]+)([eE][+-]?[0-9]+)?|[+-]?[0-9]+[eE][+-]?[0-9]+",
        |lex| lex.slice().parse::<f64>().ok()
    )]
    Float(f64),

    // Bare words must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_./-]*", |lex| lex.slice().to_string(), priority = 1)]
    Word(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| unescape_double(lex.slice()))]
    #[regex(r"'([^']|'')*'", |lex| unescape_single(lex.slice()))]
    String(String),
}

/// Lex input string into tokens with spans
///
/// Unrecognised input is not skipped: the first offending slice is returned
/// as the error so a stray character surfaces instead of vanishing.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Span> {
    Token::lexer(input)
        .spanned()
        .map(|(tok, span)| tok.map(|t| (t, span.clone())).map_err(|()| span))
        .collect()
}

fn unescape_double(slice: &str) -> String {
    let inner = &slice[1..slice.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some('0') => out.push('\0'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }
    out
}

fn unescape_single(slice: &str) -> String {
    slice[1..slice.len() - 1].replace("''", "'")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(t, _)| t)
            .collect()
    }

    #[test]
    fn test_flow_map() {
        assert_eq!(
            tokens("{ b: 0, c: -1 }"),
            vec![
                Token::BraceOpen,
                Token::Word("b".to_string()),
                Token::Colon,
                Token::Integer(0),
                Token::Comma,
                Token::Word("c".to_string()),
                Token::Colon,
                Token::Integer(-1),
                Token::BraceClose,
            ]
        );
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            tokens("42 +3 -7 1.5 -0.25 2e3 .5"),
            vec![
                Token::Integer(42),
                Token::Integer(3),
                Token::Integer(-7),
                Token::Float(1.5),
                Token::Float(-0.25),
                Token::Float(2000.0),
                Token::Float(0.5),
            ]
        );
    }

    #[test]
    fn test_booleans_and_words() {
        assert_eq!(
            tokens("true false truthy"),
            vec![
                Token::Bool(true),
                Token::Bool(false),
                Token::Word("truthy".to_string()),
            ]
        );
    }

    #[test]
    fn test_words_with_punctuation() {
        assert_eq!(
            tokens("img/tex-out.svg"),
            vec![Token::Word("img/tex-out.svg".to_string())]
        );
    }

    #[test]
    fn test_quoted_strings() {
        assert_eq!(
            tokens(r#""a \"b\"\n" 'it''s'"#),
            vec![
                Token::String("a \"b\"\n".to_string()),
                Token::String("it's".to_string()),
            ]
        );
    }

    #[test]
    fn test_newlines_are_tokens() {
        assert_eq!(
            tokens("a: 1\nb: 2"),
            vec![
                Token::Word("a".to_string()),
                Token::Colon,
                Token::Integer(1),
                Token::Newline,
                Token::Word("b".to_string()),
                Token::Colon,
                Token::Integer(2),
            ]
        );
    }

    #[test]
    fn test_unknown_character_reports_span() {
        assert_eq!(lex("a: @"), Err(3..4));
    }

    #[test]
    fn test_unterminated_string_is_an_error() {
        assert!(lex(r#"a: "open"#).is_err());
    }
}
