use nom::{
    combinator::opt,
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};

use super::ast::{OrderByItem, SelectQuery};
use super::common::{keyword, symbol, ws};
use super::expression::parse_expression;
use super::from_clause::parse_from_clause;
use super::select_clause::parse_select_clause;

/// One query level, used for the top-level statement and for subqueries:
/// `[select ...] from ... [where ...] [group by ... [having ...]]
/// [order by ...]`.
pub fn parse_select_query(input: &'_ str) -> IResult<&'_ str, SelectQuery<'_>> {
    let (input, select) = opt(parse_select_clause).parse(input)?;
    let (input, from) = parse_from_clause(input)?;
    let (input, where_clause) =
        opt(preceded(ws(keyword("where")), parse_expression)).parse(input)?;
    let (input, group_by) = parse_group_by(input)?;
    let (input, having) = if group_by.is_empty() {
        (input, None)
    } else {
        opt(preceded(ws(keyword("having")), parse_expression)).parse(input)?
    };
    let (input, order_by) = parse_order_by(input)?;
    Ok((
        input,
        SelectQuery {
            select,
            from,
            where_clause,
            group_by,
            having,
            order_by,
        },
    ))
}

fn parse_group_by(input: &'_ str) -> IResult<&'_ str, Vec<super::ast::Expression<'_>>> {
    let parsed = preceded(
        (ws(keyword("group")), ws(keyword("by"))),
        separated_list1(symbol(","), parse_expression),
    )
    .parse(input);
    match parsed {
        Ok((rest, exprs)) => Ok((rest, exprs)),
        Err(nom::Err::Error(_)) => Ok((input, Vec::new())),
        Err(e) => Err(e),
    }
}

fn parse_order_by(input: &'_ str) -> IResult<&'_ str, Vec<OrderByItem<'_>>> {
    let parsed = preceded(
        (ws(keyword("order")), ws(keyword("by"))),
        separated_list1(symbol(","), parse_order_by_item),
    )
    .parse(input);
    match parsed {
        Ok((rest, items)) => Ok((rest, items)),
        Err(nom::Err::Error(_)) => Ok((input, Vec::new())),
        Err(e) => Err(e),
    }
}

fn parse_order_by_item(input: &'_ str) -> IResult<&'_ str, OrderByItem<'_>> {
    let (input, expr) = parse_expression(input)?;
    let (input, desc) = opt(ws(nom::branch::alt((keyword("asc"), keyword("desc"))))).parse(input)?;
    Ok((
        input,
        OrderByItem {
            expr,
            descending: desc.map(|d| d.eq_ignore_ascii_case("desc")).unwrap_or(false),
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hql_parser::ast::{Expression, PathExpression, SelectItem};

    #[test]
    fn test_from_shorthand_without_select() {
        let (rem, query) = parse_select_query("from Animal a where a.bodyWeight > 10").unwrap();
        assert_eq!(rem, "");
        assert!(query.select.is_none());
        assert!(query.where_clause.is_some());
    }

    #[test]
    fn test_full_query_shape() {
        let (rem, query) = parse_select_query(
            "select p.name, count(*) from Person p where p.name like 'S%' \
             group by p.name having count(*) > 1 order by p.name desc",
        )
        .unwrap();
        assert_eq!(rem, "");
        let select = query.select.unwrap();
        assert_eq!(select.items.len(), 2);
        assert_eq!(query.group_by.len(), 1);
        assert!(query.having.is_some());
        assert_eq!(query.order_by.len(), 1);
        assert!(query.order_by[0].descending);
    }

    #[test]
    fn test_order_by_defaults_to_ascending() {
        let (_, query) = parse_select_query("from Person p order by p.name").unwrap();
        assert!(!query.order_by[0].descending);
    }

    #[test]
    fn test_subquery_in_where() {
        let (rem, query) = parse_select_query(
            "select z from Zoo z where exists (select a from Animal a where a.bodyWeight > 100)",
        )
        .unwrap();
        assert_eq!(rem, "");
        assert!(matches!(
            query.where_clause,
            Some(Expression::Exists { .. })
        ));
        let select = query.select.unwrap();
        assert_eq!(
            select.items[0],
            SelectItem::Expression {
                expr: Expression::Path(PathExpression {
                    segments: vec!["z"]
                }),
                alias: None,
            }
        );
    }
}
