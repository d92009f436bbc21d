use std::borrow::Cow;

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, digit1, multispace0, satisfy},
    combinator::{map, not, opt, peek, recognize, verify},
    error::ParseError,
    multi::many0,
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use super::ast::Literal;

pub fn ws<'a, O, E: ParseError<&'a str>, F>(inner: F) -> impl Parser<&'a str, Output = O, Error = E>
where
    F: Parser<&'a str, Output = O, Error = E>,
{
    delimited(multispace0, inner, multispace0)
}

/// Keywords that cannot be used as bare identifiers. Without this the
/// expression parser would swallow clause keywords like FROM or THEN.
const RESERVED: &[&str] = &[
    "select", "from", "where", "group", "having", "order", "by", "join", "inner", "left", "outer",
    "right", "cross", "fetch", "with", "on", "and", "or", "not", "in", "like", "between", "is",
    "null", "case", "when", "then", "else", "end", "as", "distinct", "new", "member", "of",
    "empty", "exists", "all", "any", "some", "set", "update", "delete", "asc", "desc", "escape",
    "union", "treat", "true", "false", "cast",
];

pub fn is_reserved(word: &str) -> bool {
    RESERVED.iter().any(|kw| kw.eq_ignore_ascii_case(word))
}

/// Case-insensitive keyword with a word boundary: `keyword("from")` matches
/// "FROM x" but not "fromage".
pub fn keyword<'a, E: ParseError<&'a str>>(
    kw: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = E> {
    verify(
        recognize(pair(
            take_while1(|c: char| c.is_ascii_alphabetic() || c == '_'),
            not(peek(satisfy(|c: char| c.is_ascii_alphanumeric() || c == '_'))),
        )),
        move |word: &str| word.eq_ignore_ascii_case(kw),
    )
}

fn identifier_core(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        satisfy(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '$'),
    ))
    .parse(input)
}

/// Unquoted identifier, rejecting reserved words.
pub fn parse_identifier(input: &str) -> IResult<&str, &str> {
    verify(identifier_core, |word: &str| !is_reserved(word)).parse(input)
}

/// Dot-separated identifier chain as one slice, e.g. `org.example.Name`.
/// Used for constructor classes and qualified cast targets.
pub fn parse_qualified_name(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        parse_identifier,
        many0(pair(char('.'), parse_identifier)),
    ))
    .parse(input)
}

/// Single-quoted string literal with `''` as the escape for a quote.
pub fn parse_string_literal(input: &str) -> IResult<&str, Cow<'_, str>> {
    let (input, _) = char('\'').parse(input)?;
    let mut end = 0usize;
    let bytes = input.as_bytes();
    let mut has_escape = false;
    loop {
        match bytes.get(end) {
            Some(b'\'') => {
                if bytes.get(end + 1) == Some(&b'\'') {
                    has_escape = true;
                    end += 2;
                } else {
                    break;
                }
            }
            Some(_) => end += 1,
            None => {
                return Err(nom::Err::Error(nom::error::Error::new(
                    input,
                    nom::error::ErrorKind::TakeUntil,
                )))
            }
        }
    }
    let raw = &input[..end];
    let rest = &input[end + 1..];
    let value = if has_escape {
        Cow::Owned(raw.replace("''", "'"))
    } else {
        Cow::Borrowed(raw)
    };
    Ok((rest, value))
}

/// Numeric literal: integer or decimal (no leading sign; unary minus is an
/// operator).
pub fn parse_numeric_literal(input: &str) -> IResult<&str, Literal<'_>> {
    let (rest, text) = recognize(pair(digit1, opt(preceded(char('.'), digit1)))).parse(input)?;
    if text.contains('.') {
        let value = text.parse::<f64>().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Float))
        })?;
        Ok((rest, Literal::Float(value)))
    } else {
        let value = text.parse::<i64>().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?;
        Ok((rest, Literal::Integer(value)))
    }
}

pub fn parse_literal(input: &str) -> IResult<&str, Literal<'_>> {
    alt((
        map(parse_string_literal, Literal::String),
        parse_numeric_literal,
        map(keyword("true"), |_| Literal::Boolean(true)),
        map(keyword("false"), |_| Literal::Boolean(false)),
        map(keyword("null"), |_| Literal::Null),
    ))
    .parse(input)
}

/// Consume a literal `tag` surrounded by optional whitespace.
pub fn symbol<'a, E: ParseError<&'a str>>(
    s: &'static str,
) -> impl Parser<&'a str, Output = &'a str, Error = E> {
    ws(tag(s))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_respects_word_boundary() {
        assert!(keyword::<nom::error::Error<&str>>("from").parse("from x").is_ok());
        assert!(keyword::<nom::error::Error<&str>>("from").parse("FROM x").is_ok());
        assert!(keyword::<nom::error::Error<&str>>("from").parse("fromage").is_err());
    }

    #[test]
    fn test_identifier_rejects_reserved() {
        assert_eq!(parse_identifier("mother x"), Ok((" x", "mother")));
        assert!(parse_identifier("from").is_err());
        assert!(parse_identifier("SELECT").is_err());
        assert_eq!(parse_identifier("selected"), Ok(("", "selected")));
    }

    #[test]
    fn test_qualified_name() {
        assert_eq!(
            parse_qualified_name("org.example.Animal("),
            Ok(("(", "org.example.Animal"))
        );
        assert_eq!(parse_qualified_name("Animal"), Ok(("", "Animal")));
    }

    #[test]
    fn test_string_literal_with_escape() {
        let (rest, value) = parse_string_literal("'Steve' rest").unwrap();
        assert_eq!(rest, " rest");
        assert_eq!(value, "Steve");

        let (rest, value) = parse_string_literal("'O''Brien'").unwrap();
        assert_eq!(rest, "");
        assert_eq!(value, "O'Brien");
    }

    #[test]
    fn test_unterminated_string_fails() {
        assert!(parse_string_literal("'oops").is_err());
    }

    #[test]
    fn test_numeric_literals() {
        assert_eq!(parse_numeric_literal("42 "), Ok((" ", Literal::Integer(42))));
        assert_eq!(
            parse_numeric_literal("3.14"),
            Ok(("", Literal::Float(3.14)))
        );
    }

    #[test]
    fn test_boolean_and_null_literals() {
        assert_eq!(parse_literal("TRUE"), Ok(("", Literal::Boolean(true))));
        assert_eq!(parse_literal("null"), Ok(("", Literal::Null)));
    }
}
