use nom::{
    branch::alt,
    combinator::{map, opt, value},
    multi::{many0, separated_list1},
    sequence::{pair, preceded},
    IResult, Parser,
};

use super::ast::{FromClause, FromRoot, JoinClause, JoinTarget, JoinType};
use super::common::{keyword, parse_identifier, parse_qualified_name, symbol, ws};
use super::expression::{parse_expression, parse_path};

/// `from Root [as] r (join ...)* (, Root2 [as] r2 (join ...)*)*`
///
/// Comma-separated roots form a cross join; explicit joins bind to the
/// preceding root.
pub fn parse_from_clause(input: &'_ str) -> IResult<&'_ str, FromClause<'_>> {
    let (input, _) = ws(keyword("from")).parse(input)?;
    let (input, roots) = separated_list1(symbol(","), parse_from_root).parse(input)?;
    Ok((input, FromClause { roots }))
}

fn parse_from_root(input: &'_ str) -> IResult<&'_ str, FromRoot<'_>> {
    let (input, entity) = ws(parse_qualified_name).parse(input)?;
    let (input, alias) = parse_optional_alias(input)?;
    let (input, joins) = many0(parse_join_clause).parse(input)?;
    Ok((
        input,
        FromRoot {
            entity,
            alias,
            joins,
        },
    ))
}

fn parse_optional_alias(input: &'_ str) -> IResult<&'_ str, Option<&'_ str>> {
    opt(preceded(opt(ws(keyword("as"))), ws(parse_identifier))).parse(input)
}

fn parse_join_clause(input: &'_ str) -> IResult<&'_ str, JoinClause<'_>> {
    let (input, join_type) = parse_join_type(input)?;
    let (input, fetch) = opt(ws(keyword("fetch"))).parse(input)?;
    let (input, path) = parse_join_target(input)?;
    let (input, alias) = parse_optional_alias(input)?;
    let (input, with_predicate) =
        opt(preceded(ws(keyword("with")), parse_expression)).parse(input)?;
    Ok((
        input,
        JoinClause {
            join_type,
            fetch: fetch.is_some(),
            path,
            alias,
            with_predicate,
        },
    ))
}

fn parse_join_type(input: &'_ str) -> IResult<&'_ str, JoinType> {
    alt((
        value(
            JoinType::Left,
            (
                ws(keyword("left")),
                opt(ws(keyword("outer"))),
                ws(keyword("join")),
            ),
        ),
        value(
            JoinType::Inner,
            pair(opt(ws(keyword("inner"))), ws(keyword("join"))),
        ),
    ))
    .parse(input)
}

fn parse_join_target(input: &'_ str) -> IResult<&'_ str, JoinTarget<'_>> {
    alt((
        map(
            (
                ws(keyword("treat")),
                symbol("("),
                parse_path,
                ws(keyword("as")),
                ws(parse_qualified_name),
                symbol(")"),
            ),
            |(_, _, path, _, subtype, _)| JoinTarget::Treat { path, subtype },
        ),
        map(ws(parse_path), JoinTarget::Path),
    ))
    .parse(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_root_with_alias() {
        let (rem, clause) = parse_from_clause("from Animal a").unwrap();
        assert_eq!(rem, "");
        assert_eq!(clause.roots.len(), 1);
        assert_eq!(clause.roots[0].entity, "Animal");
        assert_eq!(clause.roots[0].alias, Some("a"));
    }

    #[test]
    fn test_as_alias() {
        let (_, clause) = parse_from_clause("from Animal as an").unwrap();
        assert_eq!(clause.roots[0].alias, Some("an"));
    }

    #[test]
    fn test_root_without_alias_stops_at_keyword() {
        let (rem, clause) = parse_from_clause("from Animal where").unwrap();
        assert_eq!(rem.trim_start(), "where");
        assert_eq!(clause.roots[0].alias, None);
    }

    #[test]
    fn test_cross_join_roots() {
        let (rem, clause) = parse_from_clause("from Animal a, Zoo z").unwrap();
        assert_eq!(rem, "");
        assert_eq!(clause.roots.len(), 2);
        assert_eq!(clause.roots[1].entity, "Zoo");
    }

    #[test]
    fn test_inner_and_left_joins() {
        let (rem, clause) =
            parse_from_clause("from Animal a join a.mother m left outer join a.father f")
                .unwrap();
        assert_eq!(rem, "");
        let joins = &clause.roots[0].joins;
        assert_eq!(joins.len(), 2);
        assert_eq!(joins[0].join_type, JoinType::Inner);
        assert_eq!(joins[0].alias, Some("m"));
        assert_eq!(joins[1].join_type, JoinType::Left);
        assert_eq!(joins[1].alias, Some("f"));
    }

    #[test]
    fn test_join_fetch_and_with() {
        let (rem, clause) =
            parse_from_clause("from Zoo z left join z.animals a with a.bodyWeight > 10").unwrap();
        assert_eq!(rem, "");
        let join = &clause.roots[0].joins[0];
        assert!(!join.fetch);
        assert!(join.with_predicate.is_some());

        let (_, clause) = parse_from_clause("from Zoo z join fetch z.animals").unwrap();
        assert!(clause.roots[0].joins[0].fetch);
    }

    #[test]
    fn test_join_treat() {
        let (rem, clause) = parse_from_clause("from Animal a join treat(a.mother as Human) m")
            .unwrap();
        assert_eq!(rem, "");
        match &clause.roots[0].joins[0].path {
            JoinTarget::Treat { path, subtype } => {
                assert_eq!(path.segments, vec!["a", "mother"]);
                assert_eq!(subtype, &"Human");
            }
            other => panic!("expected treat join target, got {:?}", other),
        }
    }
}
