use nom::{
    combinator::opt,
    multi::separated_list1,
    sequence::preceded,
    IResult, Parser,
};

use super::ast::{DeleteStatement, Expression, PathExpression, UpdateStatement};
use super::common::{keyword, parse_identifier, parse_qualified_name, symbol, ws};
use super::expression::{parse_expression, parse_path};

/// `update Entity [as] e set e.a = ?, e.b = :v [where ...]`
pub fn parse_update_statement(input: &'_ str) -> IResult<&'_ str, UpdateStatement<'_>> {
    let (input, _) = ws(keyword("update")).parse(input)?;
    let (input, entity) = ws(parse_qualified_name).parse(input)?;
    let (input, alias) =
        opt(preceded(opt(ws(keyword("as"))), ws(parse_identifier))).parse(input)?;
    let (input, _) = ws(keyword("set")).parse(input)?;
    let (input, assignments) =
        separated_list1(symbol(","), parse_assignment).parse(input)?;
    let (input, where_clause) =
        opt(preceded(ws(keyword("where")), parse_expression)).parse(input)?;
    Ok((
        input,
        UpdateStatement {
            entity,
            alias,
            assignments,
            where_clause,
        },
    ))
}

fn parse_assignment(input: &'_ str) -> IResult<&'_ str, (PathExpression<'_>, Expression<'_>)> {
    let (input, target) = ws(parse_path).parse(input)?;
    let (input, _) = symbol("=").parse(input)?;
    let (input, value) = parse_expression(input)?;
    Ok((input, (target, value)))
}

/// `delete [from] Entity [alias] [where ...]`
pub fn parse_delete_statement(input: &'_ str) -> IResult<&'_ str, DeleteStatement<'_>> {
    let (input, _) = ws(keyword("delete")).parse(input)?;
    let (input, _) = opt(ws(keyword("from"))).parse(input)?;
    let (input, entity) = ws(parse_qualified_name).parse(input)?;
    let (input, alias) =
        opt(preceded(opt(ws(keyword("as"))), ws(parse_identifier))).parse(input)?;
    let (input, where_clause) =
        opt(preceded(ws(keyword("where")), parse_expression)).parse(input)?;
    Ok((
        input,
        DeleteStatement {
            entity,
            alias,
            where_clause,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hql_parser::ast::Parameter;

    #[test]
    fn test_update_with_assignments() {
        let (rem, update) =
            parse_update_statement("update Person p set p.name = :name, p.nickName = ?")
                .unwrap();
        assert_eq!(rem, "");
        assert_eq!(update.entity, "Person");
        assert_eq!(update.alias, Some("p"));
        assert_eq!(update.assignments.len(), 2);
        assert_eq!(
            update.assignments[0].1,
            Expression::Parameter(Parameter::Named("name"))
        );
    }

    #[test]
    fn test_update_without_alias() {
        let (rem, update) =
            parse_update_statement("update Person set name = 'x' where name = 'y'").unwrap();
        assert_eq!(rem, "");
        assert_eq!(update.alias, None);
        assert!(update.where_clause.is_some());
    }

    #[test]
    fn test_delete_with_and_without_from() {
        let (rem, delete) = parse_delete_statement("delete from Animal where id = 1").unwrap();
        assert_eq!(rem, "");
        assert_eq!(delete.entity, "Animal");
        assert_eq!(delete.alias, None);

        let (_, delete) = parse_delete_statement("delete Animal a where a.mother is null").unwrap();
        assert_eq!(delete.alias, Some("a"));
    }
}
