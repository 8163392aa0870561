//! Option markup parser using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::error::ParseError;
use crate::options::lexer::{self, Token};
use crate::options::{OptionMap, OptionValue};

/// Parse the `markup` capture of an occurrence into an override map
///
/// Blank markup yields an empty map. Accepted forms are a flow map
/// (`{ a: 1, b: x }`), a bare entry list (`a: 1, b: x`) and block style
/// entries separated by newlines. A repeated key keeps its first position and
/// takes the later value.
///
/// Spans in the returned error are relative to `input`.
pub fn parse_markup(input: &str) -> Result<OptionMap, ParseError> {
    if input.trim().is_empty() {
        return Ok(OptionMap::new());
    }

    let tokens = lexer::lex(input).map_err(|span| ParseError::MalformedOptions {
        offset: 0,
        message: format!("Unexpected character '{}'", &input[span.clone()]),
        span,
        expected: Vec::new(),
    })?;

    let len = input.len();
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));
    let token_stream = Stream::from_iter(token_iter)
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    let entries = markup_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| {
            errs.into_iter()
                .next()
                .map(ParseError::from)
                .unwrap_or_else(|| ParseError::MalformedOptions {
                    offset: 0,
                    span: 0..len,
                    message: "Malformed options".to_string(),
                    expected: Vec::new(),
                })
        })?;

    let mut map = OptionMap::new();
    for (key, value) in entries {
        map.insert(key, value);
    }
    Ok(map)
}

fn markup_parser<'a, I>(
) -> impl Parser<'a, I, Vec<(String, OptionValue)>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let newlines = just(Token::Newline).repeated();

    let key = select! {
        Token::Word(s) => s,
        Token::String(s) => s,
    }
    .labelled("option name");

    let value = select! {
        Token::Integer(n) => OptionValue::Integer(n),
        Token::Float(x) => OptionValue::Float(x),
        Token::Bool(b) => OptionValue::Bool(b),
        Token::Word(s) => OptionValue::String(s),
        Token::String(s) => OptionValue::String(s),
    }
    .labelled("option value");

    let entry = key.then_ignore(just(Token::Colon)).then(value);

    // A comma may be surrounded by newlines; otherwise newlines alone separate
    let separator = newlines
        .clone()
        .ignore_then(just(Token::Comma))
        .then_ignore(newlines.clone())
        .ignored()
        .or(just(Token::Newline).repeated().at_least(1).ignored());

    let entries = entry
        .separated_by(separator)
        .allow_trailing()
        .collect::<Vec<_>>();

    let flow_map = entries
        .clone()
        .padded_by(newlines.clone())
        .delimited_by(just(Token::BraceOpen), just(Token::BraceClose));

    choice((flow_map, entries))
        .padded_by(newlines)
        .then_ignore(end())
}
