//! Lexer/parser for the object query language, built on nom combinators.
//! Produces a borrowed AST over the input string; no partial trees survive
//! a parse failure.

use nom::branch::alt;
use nom::bytes::complete::tag;
use nom::character::complete::multispace0;
use nom::combinator::{map, opt};
use nom::{IResult, Parser};

use ast::HqlStatement;
use common::ws;
use errors::HqlParsingError;

pub mod ast;
mod common;
mod dml;
pub(crate) mod errors;
mod expression;
mod from_clause;
mod select_clause;
mod select_query;

pub use errors::ParseError;

/// Parse a complete statement: a query, an update, or a delete. Trailing
/// whitespace and an optional semicolon are accepted; anything else left
/// over is an error.
pub fn parse(query: &str) -> Result<HqlStatement<'_>, ParseError> {
    match parse_hql_statement(query) {
        Ok((remaining, statement)) => {
            if remaining.trim().is_empty() {
                Ok(statement)
            } else {
                Err(ParseError::trailing_input(query, remaining))
            }
        }
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => {
            Err(ParseError::from_nom(query, &e))
        }
        Err(nom::Err::Incomplete(_)) => Err(ParseError::trailing_input(query, "")),
    }
}

fn parse_hql_statement(
    input: &'_ str,
) -> IResult<&'_ str, HqlStatement<'_>, HqlParsingError<'_>> {
    let (input, _) = multispace0.parse(input)?;
    let (input, statement) = alt((
        map(dml::parse_update_statement, HqlStatement::Update),
        map(dml::parse_delete_statement, HqlStatement::Delete),
        map(select_query::parse_select_query, HqlStatement::Select),
    ))
    .parse(input)
    .map_err(|e| match e {
        nom::Err::Incomplete(needed) => nom::Err::Incomplete(needed),
        nom::Err::Error(err) => nom::Err::Error(HqlParsingError::from(err)),
        nom::Err::Failure(err) => nom::Err::Failure(HqlParsingError::from(err)),
    })?;
    let (input, _) = opt(ws(tag(";"))).parse(input)?;
    Ok((input, statement))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select_statement() {
        let statement = parse("select p from Person p where p.name = 'Steve'").unwrap();
        assert!(matches!(statement, HqlStatement::Select(_)));
    }

    #[test]
    fn test_parse_with_trailing_semicolon() {
        assert!(parse("from Animal;").is_ok());
    }

    #[test]
    fn test_parse_update_and_delete() {
        assert!(matches!(
            parse("update Person p set p.name = 'x'").unwrap(),
            HqlStatement::Update(_)
        ));
        assert!(matches!(
            parse("delete from Animal where id = 1").unwrap(),
            HqlStatement::Delete(_)
        ));
    }

    #[test]
    fn test_trailing_garbage_is_an_error() {
        let err = parse("from Animal a banana!").unwrap_err();
        assert!(err.found.contains("banana"));
    }

    #[test]
    fn test_malformed_statement_reports_position() {
        let err = parse("selectt p ffrom").unwrap_err();
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_no_partial_ast_on_failure() {
        assert!(parse("select from where").is_err());
        assert!(parse("").is_err());
    }
}
