use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, multispace0},
    combinator::{map, opt, peek, value},
    multi::{many0, separated_list0, separated_list1},
    sequence::{delimited, pair, preceded},
    IResult, Parser,
};

use super::ast::{
    CaseExpression, CollectionFn, Expression, FunctionCall, InList, Literal, Operator,
    OperatorApplication, Parameter, PathExpression, Quantifier,
};
use super::common::{keyword, parse_identifier, parse_literal, parse_qualified_name, symbol, ws};
use super::select_query;

pub fn parse_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    parse_or_expression(input)
}

fn parse_or_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, first) = parse_and_expression(input)?;
    let (input, rest) =
        many0(preceded(ws(keyword("or")), parse_and_expression)).parse(input)?;
    Ok((input, fold_binary(Operator::Or, first, rest)))
}

fn parse_and_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, first) = parse_not_expression(input)?;
    let (input, rest) =
        many0(preceded(ws(keyword("and")), parse_not_expression)).parse(input)?;
    Ok((input, fold_binary(Operator::And, first, rest)))
}

fn parse_not_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    if let Ok((rest, _)) = keyword::<nom::error::Error<&str>>("not").parse(input) {
        // MEMBER OF may follow a bare NOT operand: parse below handles the
        // `x not member of ...` form, so only consume NOT when a predicate
        // follows directly.
        let (rest, inner) = parse_not_expression(rest)?;
        return Ok((
            rest,
            Expression::Operator(OperatorApplication {
                operator: Operator::Not,
                operands: vec![inner],
            }),
        ));
    }
    parse_predicate(input)
}

/// A comparison/membership/null-test layer over arithmetic expressions.
fn parse_predicate(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, left) = parse_additive(input)?;
    parse_predicate_suffix(input, left)
}

fn parse_predicate_suffix<'a>(
    input: &'a str,
    left: Expression<'a>,
) -> IResult<&'a str, Expression<'a>> {
    // IS [NOT] NULL / IS [NOT] EMPTY
    if let Ok((rest, _)) = ws(keyword::<nom::error::Error<&str>>("is")).parse(input) {
        let (rest, negated) = opt(ws(keyword("not"))).parse(rest)?;
        let negated = negated.is_some();
        if let Ok((rest, _)) = ws(keyword::<nom::error::Error<&str>>("empty")).parse(rest) {
            let path = require_path(input, left)?;
            return Ok((rest, Expression::IsEmpty { negated, path }));
        }
        let (rest, _) = ws(keyword("null")).parse(rest)?;
        return Ok((
            rest,
            Expression::Operator(OperatorApplication {
                operator: if negated {
                    Operator::IsNotNull
                } else {
                    Operator::IsNull
                },
                operands: vec![left],
            }),
        ));
    }

    // [NOT] BETWEEN a AND b | [NOT] LIKE p | [NOT] IN (...) | [NOT] MEMBER OF path
    let (after_not, not_kw) = opt(ws(keyword::<nom::error::Error<&str>>("not"))).parse(input)?;
    let negated = not_kw.is_some();

    if let Ok((rest, _)) = ws(keyword::<nom::error::Error<&str>>("between")).parse(after_not) {
        let (rest, low) = parse_additive(rest)?;
        let (rest, _) = ws(keyword("and")).parse(rest)?;
        let (rest, high) = parse_additive(rest)?;
        return Ok((
            rest,
            Expression::Between {
                negated,
                expr: Box::new(left),
                low: Box::new(low),
                high: Box::new(high),
            },
        ));
    }

    if let Ok((rest, _)) = ws(keyword::<nom::error::Error<&str>>("like")).parse(after_not) {
        let (rest, pattern) = parse_additive(rest)?;
        // ESCAPE character, folded into the operand list when present.
        let (rest, escape) =
            opt(preceded(ws(keyword("escape")), parse_additive)).parse(rest)?;
        let mut operands = vec![left, pattern];
        if let Some(esc) = escape {
            operands.push(esc);
        }
        return Ok((
            rest,
            Expression::Operator(OperatorApplication {
                operator: if negated {
                    Operator::NotLike
                } else {
                    Operator::Like
                },
                operands,
            }),
        ));
    }

    if let Ok((rest, _)) = ws(keyword::<nom::error::Error<&str>>("in")).parse(after_not) {
        let (rest, list) = parse_in_list(rest)?;
        return Ok((
            rest,
            Expression::In {
                negated,
                expr: Box::new(left),
                list,
            },
        ));
    }

    if let Ok((rest, _)) = ws(keyword::<nom::error::Error<&str>>("member")).parse(after_not) {
        let (rest, _) = opt(ws(keyword("of"))).parse(rest)?;
        let (rest, path) = parse_path(rest)?;
        return Ok((
            rest,
            Expression::MemberOf {
                negated,
                element: Box::new(left),
                path,
            },
        ));
    }

    // A dangling NOT belongs to the caller, not to this predicate.
    if negated {
        return Ok((input, left));
    }

    // Binary comparison, possibly against a quantified subquery.
    if let Ok((rest, op)) = parse_comparison_operator(input) {
        if let Ok((rest, quantified)) = parse_quantified_subquery(rest) {
            return Ok((
                rest,
                Expression::Operator(OperatorApplication {
                    operator: op,
                    operands: vec![left, quantified],
                }),
            ));
        }
        let (rest, right) = parse_additive(rest)?;
        return Ok((
            rest,
            Expression::Operator(OperatorApplication {
                operator: op,
                operands: vec![left, right],
            }),
        ));
    }

    Ok((input, left))
}

fn require_path<'a>(
    input: &'a str,
    expr: Expression<'a>,
) -> Result<PathExpression<'a>, nom::Err<nom::error::Error<&'a str>>> {
    match expr {
        Expression::Path(path) => Ok(path),
        _ => Err(nom::Err::Error(nom::error::Error::new(
            input,
            nom::error::ErrorKind::Verify,
        ))),
    }
}

fn parse_comparison_operator(input: &str) -> IResult<&str, Operator> {
    ws(alt((
        value(Operator::LessThanEqual, tag("<=")),
        value(Operator::GreaterThanEqual, tag(">=")),
        value(Operator::NotEqual, tag("<>")),
        value(Operator::NotEqual, tag("!=")),
        value(Operator::LessThan, tag("<")),
        value(Operator::GreaterThan, tag(">")),
        value(Operator::Equal, tag("=")),
    )))
    .parse(input)
}

fn parse_quantified_subquery(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, quantifier) = ws(alt((
        value(Quantifier::All, keyword("all")),
        value(Quantifier::Any, keyword("any")),
        value(Quantifier::Some, keyword("some")),
    )))
    .parse(input)?;
    let (input, subquery) = parse_parenthesized_subquery(input)?;
    Ok((
        input,
        Expression::Quantified {
            quantifier,
            subquery: Box::new(subquery),
        },
    ))
}

fn parse_in_list(input: &'_ str) -> IResult<&'_ str, InList<'_>> {
    // x in elements(path)
    if let Ok((rest, path)) = preceded(
        pair(ws(keyword::<nom::error::Error<&str>>("elements")), symbol("(")),
        parse_path,
    )
    .parse(input)
    {
        let (rest, _) = symbol(")").parse(rest)?;
        return Ok((rest, InList::Elements(path)));
    }

    let (input, _) = symbol("(").parse(input)?;
    if let Ok((rest, subquery)) = select_query::parse_select_query(input) {
        let (rest, _) = symbol(")").parse(rest)?;
        return Ok((rest, InList::Subquery(Box::new(subquery))));
    }
    let (input, items) = separated_list1(symbol(","), parse_expression).parse(input)?;
    let (input, _) = symbol(")").parse(input)?;
    Ok((input, InList::Items(items)))
}

fn parse_additive(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, first) = parse_multiplicative(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(Operator::Concat, tag("||")),
            value(Operator::Addition, tag("+")),
            value(Operator::Subtraction, tag("-")),
        ))),
        parse_multiplicative,
    ))
    .parse(input)?;
    Ok((input, fold_binary_pairs(first, rest)))
}

fn parse_multiplicative(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, first) = parse_unary(input)?;
    let (input, rest) = many0(pair(
        ws(alt((
            value(Operator::Multiplication, tag("*")),
            value(Operator::Division, tag("/")),
            value(Operator::Modulo, tag("%")),
        ))),
        parse_unary,
    ))
    .parse(input)?;
    Ok((input, fold_binary_pairs(first, rest)))
}

fn parse_unary(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    if let Ok((rest, _)) = char::<&str, nom::error::Error<&str>>('-').parse(input) {
        let (rest, inner) = parse_unary(rest)?;
        // Fold a negated numeric literal immediately.
        let folded = match inner {
            Expression::Literal(Literal::Integer(i)) => Expression::Literal(Literal::Integer(-i)),
            Expression::Literal(Literal::Float(x)) => Expression::Literal(Literal::Float(-x)),
            other => Expression::Operator(OperatorApplication {
                operator: Operator::Negate,
                operands: vec![other],
            }),
        };
        return Ok((rest, folded));
    }
    parse_primary(input)
}

fn parse_primary(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = multispace0.parse(input)?;
    alt((
        parse_case_expression,
        parse_cast_expression,
        parse_treat_expression,
        parse_exists_expression,
        parse_parameter,
        map(parse_literal, Expression::Literal),
        parse_collection_function,
        parse_function_call,
        map(parse_path, Expression::Path),
        parse_parenthesized,
    ))
    .parse(input)
}

/// `( expression )` or `( subquery )`.
fn parse_parenthesized(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = symbol("(").parse(input)?;
    if let Ok((rest, subquery)) = select_query::parse_select_query(input) {
        let (rest, _) = symbol(")").parse(rest)?;
        return Ok((rest, Expression::Subquery(Box::new(subquery))));
    }
    let (input, expr) = parse_expression(input)?;
    let (input, _) = symbol(")").parse(input)?;
    Ok((input, expr))
}

fn parse_parenthesized_subquery(
    input: &'_ str,
) -> IResult<&'_ str, super::ast::SelectQuery<'_>> {
    delimited(symbol("("), select_query::parse_select_query, symbol(")")).parse(input)
}

fn parse_exists_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = ws(keyword("exists")).parse(input)?;
    let (input, subquery) = parse_parenthesized_subquery(input)?;
    Ok((
        input,
        Expression::Exists {
            negated: false,
            subquery: Box::new(subquery),
        },
    ))
}

fn parse_case_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = ws(keyword("case")).parse(input)?;

    // Simple case carries a tested operand before the first WHEN.
    let (input, operand) = if peek(ws(keyword::<nom::error::Error<&str>>("when")))
        .parse(input)
        .is_ok()
    {
        (input, None)
    } else {
        let (input, operand) = parse_additive(input)?;
        (input, Some(Box::new(operand)))
    };

    let mut when_then = Vec::new();
    let mut remaining = input;
    loop {
        let result = preceded(
            ws(keyword("when")),
            pair(
                parse_expression,
                preceded(ws(keyword("then")), parse_expression),
            ),
        )
        .parse(remaining);
        match result {
            Ok((rest, (when_expr, then_expr))) => {
                when_then.push((when_expr, then_expr));
                remaining = rest;
            }
            Err(nom::Err::Error(_)) => break,
            Err(e) => return Err(e),
        }
    }
    if when_then.is_empty() {
        return Err(nom::Err::Error(nom::error::Error::new(
            remaining,
            nom::error::ErrorKind::Tag,
        )));
    }

    let (input, else_expr) =
        opt(preceded(ws(keyword("else")), parse_expression)).parse(remaining)?;
    let (input, _) = ws(keyword("end")).parse(input)?;

    Ok((
        input,
        Expression::Case(CaseExpression {
            operand,
            when_then,
            else_expr: else_expr.map(Box::new),
        }),
    ))
}

fn parse_cast_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = ws(keyword("cast")).parse(input)?;
    let (input, _) = symbol("(").parse(input)?;
    let (input, expr) = parse_expression(input)?;
    let (input, _) = ws(keyword("as")).parse(input)?;
    let (input, target) = ws(parse_qualified_name).parse(input)?;
    let (input, _) = symbol(")").parse(input)?;
    Ok((
        input,
        Expression::Cast {
            expr: Box::new(expr),
            target,
        },
    ))
}

fn parse_treat_expression(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (input, _) = ws(keyword("treat")).parse(input)?;
    let (input, _) = symbol("(").parse(input)?;
    let (input, path) = parse_path(input)?;
    let (input, _) = ws(keyword("as")).parse(input)?;
    let (input, subtype) = ws(parse_qualified_name).parse(input)?;
    let (input, _) = symbol(")").parse(input)?;
    let (input, trailing) =
        many0(preceded(char('.'), parse_identifier)).parse(input)?;
    Ok((
        input,
        Expression::Treat {
            path,
            subtype,
            trailing,
        },
    ))
}

/// size/elements/indices take a path; key/value/index take a collection
/// alias. These are plain identifiers unless followed by `(`, so property
/// names like `size` keep working.
fn parse_collection_function(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (rest, name) = parse_identifier(input)?;
    let function = match name.to_ascii_lowercase().as_str() {
        "size" => CollectionFn::Size,
        "elements" => CollectionFn::Elements,
        "indices" => CollectionFn::Indices,
        "key" => CollectionFn::Key,
        "value" => CollectionFn::Value,
        "index" => CollectionFn::Index,
        _ => {
            return Err(nom::Err::Error(nom::error::Error::new(
                input,
                nom::error::ErrorKind::Tag,
            )))
        }
    };
    let (rest, _) = symbol("(").parse(rest)?;
    let (rest, path) = parse_path(rest)?;
    let (rest, _) = symbol(")").parse(rest)?;
    Ok((rest, Expression::Collection { function, path }))
}

fn parse_function_call(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    let (rest, name) = parse_identifier(input)?;
    let (rest, _) = symbol("(").parse(rest)?;
    let (rest, distinct) = opt(ws(keyword("distinct"))).parse(rest)?;
    let (rest, args) = separated_list0(
        symbol(","),
        alt((map(symbol("*"), |_| Expression::Star), parse_expression)),
    )
    .parse(rest)?;
    let (rest, _) = symbol(")").parse(rest)?;
    Ok((
        rest,
        Expression::FunctionCall(FunctionCall {
            name,
            distinct: distinct.is_some(),
            args,
        }),
    ))
}

fn parse_parameter(input: &'_ str) -> IResult<&'_ str, Expression<'_>> {
    alt((
        map(preceded(char(':'), parse_identifier), |name| {
            Expression::Parameter(Parameter::Named(name))
        }),
        map(preceded(char('?'), opt(digit1)), |position: Option<&str>| {
            Expression::Parameter(Parameter::Positional(
                position.and_then(|p| p.parse().ok()),
            ))
        }),
    ))
    .parse(input)
}

pub fn parse_path(input: &'_ str) -> IResult<&'_ str, PathExpression<'_>> {
    let (input, segments) =
        separated_list1(char('.'), parse_identifier).parse(input)?;
    Ok((input, PathExpression { segments }))
}

fn fold_binary<'a>(
    operator: Operator,
    first: Expression<'a>,
    rest: Vec<Expression<'a>>,
) -> Expression<'a> {
    rest.into_iter().fold(first, |acc, next| {
        Expression::Operator(OperatorApplication {
            operator,
            operands: vec![acc, next],
        })
    })
}

fn fold_binary_pairs<'a>(
    first: Expression<'a>,
    rest: Vec<(Operator, Expression<'a>)>,
) -> Expression<'a> {
    rest.into_iter().fold(first, |acc, (operator, next)| {
        Expression::Operator(OperatorApplication {
            operator,
            operands: vec![acc, next],
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::borrow::Cow;

    fn path(segments: &[&'static str]) -> Expression<'static> {
        Expression::Path(PathExpression {
            segments: segments.to_vec(),
        })
    }

    #[test]
    fn test_parse_comparison() {
        let (rem, expr) = parse_expression("p.name = 'Steve'").unwrap();
        assert_eq!(rem, "");
        assert_eq!(
            expr,
            Expression::Operator(OperatorApplication {
                operator: Operator::Equal,
                operands: vec![
                    path(&["p", "name"]),
                    Expression::Literal(Literal::String(Cow::Borrowed("Steve"))),
                ],
            })
        );
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let (rem, expr) = parse_expression("a = 1 or b = 2 and c = 3").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::Operator(op) => {
                assert_eq!(op.operator, Operator::Or);
                match &op.operands[1] {
                    Expression::Operator(inner) => assert_eq!(inner.operator, Operator::And),
                    other => panic!("expected AND on the right, got {:?}", other),
                }
            }
            other => panic!("expected OR at top, got {:?}", other),
        }
    }

    #[test]
    fn test_is_null_postfix() {
        let (rem, expr) = parse_expression("p.mother is null").unwrap();
        assert_eq!(rem, "");
        assert_eq!(
            expr,
            Expression::Operator(OperatorApplication {
                operator: Operator::IsNull,
                operands: vec![path(&["p", "mother"])],
            })
        );
    }

    #[test]
    fn test_is_not_empty() {
        let (rem, expr) = parse_expression("z.animals is not empty").unwrap();
        assert_eq!(rem, "");
        assert_eq!(
            expr,
            Expression::IsEmpty {
                negated: true,
                path: PathExpression {
                    segments: vec!["z", "animals"]
                },
            }
        );
    }

    #[test]
    fn test_named_and_positional_parameters() {
        let (_, expr) = parse_expression(":name").unwrap();
        assert_eq!(expr, Expression::Parameter(Parameter::Named("name")));
        let (_, expr) = parse_expression("?").unwrap();
        assert_eq!(expr, Expression::Parameter(Parameter::Positional(None)));
        let (_, expr) = parse_expression("?2").unwrap();
        assert_eq!(expr, Expression::Parameter(Parameter::Positional(Some(2))));
    }

    #[test]
    fn test_simple_case() {
        let (rem, expr) =
            parse_expression("case p.name when 'Steve' then 'x' else 'y' end").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::Case(case) => {
                assert_eq!(*case.operand.unwrap(), path(&["p", "name"]));
                assert_eq!(case.when_then.len(), 1);
                assert!(case.else_expr.is_some());
            }
            other => panic!("expected case, got {:?}", other),
        }
    }

    #[test]
    fn test_searched_case() {
        let (rem, expr) =
            parse_expression("case when a.bodyWeight > 100 then 1 else 0 end").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::Case(case) => {
                assert!(case.operand.is_none());
                assert_eq!(case.when_then.len(), 1);
            }
            other => panic!("expected case, got {:?}", other),
        }
    }

    #[test]
    fn test_cast_with_qualified_target() {
        let (rem, expr) = parse_expression("cast(:x as java.lang.String)").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::Cast { target, .. } => assert_eq!(target, "java.lang.String"),
            other => panic!("expected cast, got {:?}", other),
        }
    }

    #[test]
    fn test_member_of() {
        let (rem, expr) = parse_expression("a member of z.animals").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::MemberOf { negated, path, .. } => {
                assert!(!negated);
                assert_eq!(path.segments, vec!["z", "animals"]);
            }
            other => panic!("expected member of, got {:?}", other),
        }
        let (_, expr) = parse_expression("a not member of z.animals").unwrap();
        assert!(matches!(expr, Expression::MemberOf { negated: true, .. }));
    }

    #[test]
    fn test_between_and_like() {
        let (rem, expr) = parse_expression("a.bodyWeight between 1 and 10").unwrap();
        assert_eq!(rem, "");
        assert!(matches!(expr, Expression::Between { negated: false, .. }));

        let (rem, expr) = parse_expression("p.name not like 'S%' escape '\\'").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::Operator(op) => {
                assert_eq!(op.operator, Operator::NotLike);
                assert_eq!(op.operands.len(), 3);
            }
            other => panic!("expected not-like, got {:?}", other),
        }
    }

    #[test]
    fn test_in_item_list() {
        let (rem, expr) = parse_expression("p.name in ('a', 'b')").unwrap();
        assert_eq!(rem, "");
        match expr {
            Expression::In { list: InList::Items(items), .. } => assert_eq!(items.len(), 2),
            other => panic!("expected in-list, got {:?}", other),
        }
    }

    #[test]
    fn test_collection_functions() {
        let (_, expr) = parse_expression("size(z.animals)").unwrap();
        assert!(matches!(
            expr,
            Expression::Collection {
                function: CollectionFn::Size,
                ..
            }
        ));
        let (_, expr) = parse_expression("key(m)").unwrap();
        assert!(matches!(
            expr,
            Expression::Collection {
                function: CollectionFn::Key,
                ..
            }
        ));
        // Not followed by '(': plain property path.
        let (_, expr) = parse_expression("p.size").unwrap();
        assert_eq!(expr, path(&["p", "size"]));
    }

    #[test]
    fn test_count_star_and_distinct() {
        let (_, expr) = parse_expression("count(*)").unwrap();
        match expr {
            Expression::FunctionCall(f) => {
                assert_eq!(f.name, "count");
                assert_eq!(f.args, vec![Expression::Star]);
            }
            other => panic!("expected function, got {:?}", other),
        }
        let (_, expr) = parse_expression("count(distinct p.name)").unwrap();
        assert!(matches!(
            expr,
            Expression::FunctionCall(FunctionCall { distinct: true, .. })
        ));
    }

    #[test]
    fn test_arithmetic_precedence() {
        let (_, expr) = parse_expression("1 + 2 * 3").unwrap();
        match expr {
            Expression::Operator(op) => {
                assert_eq!(op.operator, Operator::Addition);
                assert!(matches!(
                    &op.operands[1],
                    Expression::Operator(inner) if inner.operator == Operator::Multiplication
                ));
            }
            other => panic!("expected addition at top, got {:?}", other),
        }
    }

    #[test]
    fn test_concat_operator() {
        let (_, expr) = parse_expression("p.first || p.last").unwrap();
        assert!(matches!(
            expr,
            Expression::Operator(OperatorApplication {
                operator: Operator::Concat,
                ..
            })
        ));
    }

    #[test]
    fn test_unary_minus_folds_literals() {
        let (_, expr) = parse_expression("-3").unwrap();
        assert_eq!(expr, Expression::Literal(Literal::Integer(-3)));
        let (_, expr) = parse_expression("-p.age").unwrap();
        assert!(matches!(
            expr,
            Expression::Operator(OperatorApplication {
                operator: Operator::Negate,
                ..
            })
        ));
    }

    #[test]
    fn test_treat_with_trailing_path() {
        let (_, expr) = parse_expression("treat(a as Human).nickName").unwrap();
        match expr {
            Expression::Treat {
                path,
                subtype,
                trailing,
            } => {
                assert_eq!(path.segments, vec!["a"]);
                assert_eq!(subtype, "Human");
                assert_eq!(trailing, vec!["nickName"]);
            }
            other => panic!("expected treat, got {:?}", other),
        }
    }
}
