//! Error types for option markup parsing

use ariadne::{Color, Config, IndexType, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::options::lexer::Token;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    /// The `markup` capture of an occurrence is not a scalar-valued mapping.
    ///
    /// `offset` is the byte offset of the occurrence in the document and
    /// `span` covers the offending markup token.
    #[error("malformed options in occurrence at byte {offset}: {message}")]
    MalformedOptions {
        offset: usize,
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Byte offset of the occurrence the error belongs to
    pub fn offset(&self) -> usize {
        match self {
            ParseError::MalformedOptions { offset, .. } => *offset,
        }
    }

    /// Move an error from markup-relative to document coordinates
    pub(crate) fn relocate(self, occurrence_start: usize, markup_start: usize) -> Self {
        match self {
            ParseError::MalformedOptions {
                span,
                message,
                expected,
                ..
            } => ParseError::MalformedOptions {
                offset: occurrence_start,
                span: span.start + markup_start..span.end + markup_start,
                message,
                expected,
            },
        }
    }

    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::MalformedOptions {
                offset,
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                let written = Report::build(ReportKind::Error, filename, span.start)
                    .with_config(
                        Config::default()
                            .with_color(false)
                            .with_index_type(IndexType::Byte),
                    )
                    .with_message(format!("malformed alias options: {}", message))
                    .with_label(
                        Label::new((filename, span.clone()))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .with_label(
                        Label::new((filename, *offset..*offset + 1))
                            .with_message("in the occurrence starting here")
                            .with_color(Color::Blue),
                    )
                    .finish()
                    .write((filename, Source::from(source)), &mut buf);
                if written.is_err() {
                    return self.to_string();
                }
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::RichReason;

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of options".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of options".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::MalformedOptions {
            offset: 0,
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::Word(s) => format!("word '{}'", s),
        Token::String(s) => format!("string {:?}", s),
        Token::Integer(n) => format!("integer {}", n),
        Token::Float(x) => format!("number {}", x),
        Token::Bool(b) => format!("boolean {}", b),
        Token::BraceOpen => "'{'".to_string(),
        Token::BraceClose => "'}'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Colon => "':'".to_string(),
        Token::Newline => "line break".to_string(),
    }
}
