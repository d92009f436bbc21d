use nom::error::{ContextError, ParseError as NomParseError};
use std::fmt;
use thiserror::Error;

/// Internal nom error: a stack of (remaining input, context) pairs collected
/// while backtracking. Converted to [`ParseError`] at the API boundary.
#[derive(Debug, PartialEq)]
pub struct HqlParsingError<'a> {
    pub errors: Vec<(&'a str, &'static str)>,
}

impl<'a> NomParseError<&'a str> for HqlParsingError<'a> {
    fn from_error_kind(input: &'a str, _kind: nom::error::ErrorKind) -> Self {
        HqlParsingError {
            errors: vec![(input, "unexpected token")],
        }
    }

    fn append(input: &'a str, _kind: nom::error::ErrorKind, mut other: Self) -> Self {
        other.errors.push((input, "unexpected token"));
        other
    }
}

impl<'a> ContextError<&'a str> for HqlParsingError<'a> {
    fn add_context(input: &'a str, ctx: &'static str, mut other: Self) -> Self {
        other.errors.push((input, ctx));
        other
    }
}

impl fmt::Display for HqlParsingError<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (input, ctx) in &self.errors {
            writeln!(f, "{}: {}", ctx, input)?;
        }
        Ok(())
    }
}

impl<'a> From<nom::error::Error<&'a str>> for HqlParsingError<'a> {
    fn from(err: nom::error::Error<&'a str>) -> Self {
        HqlParsingError {
            errors: vec![(err.input, "unable to parse")],
        }
    }
}

/// Public parse failure with the offending position in the original text.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("parse error at line {line}, column {column}: {message} (near '{found}')")]
pub struct ParseError {
    pub message: String,
    pub line: usize,
    pub column: usize,
    /// Up to the first few tokens of unconsumed input.
    pub found: String,
}

impl ParseError {
    /// Build from the deepest context of a nom failure against the full
    /// query text.
    pub fn from_nom(query: &str, err: &HqlParsingError<'_>) -> Self {
        // The innermost error was pushed first; its remaining input is the
        // closest to the true failure point.
        let (remaining, message) = err
            .errors
            .first()
            .map(|(input, ctx)| (*input, ctx.to_string()))
            .unwrap_or((query, "unable to parse".to_string()));
        Self::at(query, remaining, message)
    }

    /// Build for trailing unparsed input after an otherwise valid statement.
    pub fn trailing_input(query: &str, remaining: &str) -> Self {
        Self::at(query, remaining, "unexpected trailing input".to_string())
    }

    fn at(query: &str, remaining: &str, message: String) -> Self {
        let consumed = query.len().saturating_sub(remaining.len());
        let consumed = consumed.min(query.len());
        let prefix = &query[..consumed];
        let line = prefix.matches('\n').count() + 1;
        let column = prefix
            .rsplit('\n')
            .next()
            .map(|l| l.chars().count())
            .unwrap_or(0)
            + 1;
        let found: String = remaining.chars().take(24).collect();
        ParseError {
            message,
            line,
            column,
            found,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_is_computed_from_remaining_input() {
        let query = "select p\nfrom Person p wh3re";
        let err = ParseError::trailing_input(query, "wh3re");
        assert_eq!(err.line, 2);
        assert_eq!(err.column, 15);
        assert_eq!(err.found, "wh3re");
    }
}
