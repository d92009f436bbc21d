use nom::{
    branch::alt,
    combinator::{map, opt},
    multi::separated_list1,
    sequence::{delimited, preceded},
    IResult, Parser,
};

use super::ast::{ConstructorKind, Expression, SelectClause, SelectItem};
use super::common::{keyword, parse_identifier, parse_qualified_name, symbol, ws};
use super::expression::parse_expression;

/// `select [distinct] item (, item)*`. Absent select clauses (the
/// `from Entity` shorthand) are handled by the caller.
pub fn parse_select_clause(input: &'_ str) -> IResult<&'_ str, SelectClause<'_>> {
    let (input, _) = ws(keyword("select")).parse(input)?;
    let (input, distinct) = opt(ws(keyword("distinct"))).parse(input)?;
    let (input, items) = separated_list1(symbol(","), parse_select_item).parse(input)?;
    Ok((
        input,
        SelectClause {
            distinct: distinct.is_some(),
            items,
        },
    ))
}

fn parse_select_item(input: &'_ str) -> IResult<&'_ str, SelectItem<'_>> {
    alt((parse_constructor_item, parse_expression_item)).parse(input)
}

/// `new a.b.C(args)`, `new list(args)`, `new map(args)`.
fn parse_constructor_item(input: &'_ str) -> IResult<&'_ str, SelectItem<'_>> {
    let (input, _) = ws(keyword("new")).parse(input)?;
    let (input, kind) = ws(alt((
        map(keyword("list"), |_| ConstructorKind::List),
        map(keyword("map"), |_| ConstructorKind::Map),
        map(parse_qualified_name, ConstructorKind::Class),
    )))
    .parse(input)?;
    let (input, args) = delimited(
        symbol("("),
        separated_list1(symbol(","), parse_expression),
        symbol(")"),
    )
    .parse(input)?;
    Ok((input, SelectItem::Constructor { kind, args }))
}

fn parse_expression_item(input: &'_ str) -> IResult<&'_ str, SelectItem<'_>> {
    let (input, expr) = parse_expression(input)?;
    let (input, alias) = opt(preceded(ws(keyword("as")), ws(parse_identifier))).parse(input)?;
    Ok((input, SelectItem::Expression { expr, alias }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hql_parser::ast::PathExpression;

    #[test]
    fn test_select_tuple() {
        let (rem, clause) = parse_select_clause("select p.name, p.nickName").unwrap();
        assert_eq!(rem, "");
        assert!(!clause.distinct);
        assert_eq!(clause.items.len(), 2);
    }

    #[test]
    fn test_select_distinct() {
        let (_, clause) = parse_select_clause("select distinct p.name").unwrap();
        assert!(clause.distinct);
    }

    #[test]
    fn test_select_new_constructor() {
        let (rem, clause) =
            parse_select_clause("select new org.example.Summary(p.name, p.nickName)").unwrap();
        assert_eq!(rem, "");
        match &clause.items[0] {
            SelectItem::Constructor { kind, args } => {
                assert_eq!(kind, &ConstructorKind::Class("org.example.Summary"));
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected constructor, got {:?}", other),
        }
    }

    #[test]
    fn test_select_new_list() {
        let (_, clause) = parse_select_clause("select new list(p.name, p.id)").unwrap();
        assert!(matches!(
            &clause.items[0],
            SelectItem::Constructor {
                kind: ConstructorKind::List,
                ..
            }
        ));
    }

    #[test]
    fn test_select_alias() {
        let (_, clause) = parse_select_clause("select p.name as n").unwrap();
        match &clause.items[0] {
            SelectItem::Expression { expr, alias } => {
                assert_eq!(alias, &Some("n"));
                assert_eq!(
                    expr,
                    &Expression::Path(PathExpression {
                        segments: vec!["p", "name"]
                    })
                );
            }
            other => panic!("expected expression item, got {:?}", other),
        }
    }
}
