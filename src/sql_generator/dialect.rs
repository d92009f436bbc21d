//! Dialect differences: cast target spellings, placeholder syntax,
//! and string concatenation.

use crate::config::SqlDialectKind;
use crate::entity_catalog::SqlType;

pub trait Dialect: Sync {
    /// Placeholder for the `index`-th bound parameter, 1-based.
    fn placeholder(&self, index: usize) -> String;

    /// Spelling of a SQL type inside `cast(x as ...)`. `None` when the
    /// dialect has no valid cast target for the type.
    fn cast_type_name(&self, sql_type: SqlType) -> Option<&'static str>;

    /// String concatenation over already-rendered operands.
    fn concat(&self, args: &[String]) -> String {
        args.join(" || ")
    }
}

pub struct GenericDialect;

impl Dialect for GenericDialect {
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn cast_type_name(&self, sql_type: SqlType) -> Option<&'static str> {
        Some(match sql_type {
            SqlType::String => "varchar",
            SqlType::Integer => "integer",
            SqlType::Long => "bigint",
            SqlType::Float => "real",
            SqlType::Double => "double precision",
            SqlType::BigDecimal => "numeric",
            SqlType::BigInteger => "numeric(38,0)",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
            SqlType::Timestamp => "timestamp",
            SqlType::Binary => "varbinary",
        })
    }
}

pub struct PostgresDialect;

impl Dialect for PostgresDialect {
    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn cast_type_name(&self, sql_type: SqlType) -> Option<&'static str> {
        Some(match sql_type {
            SqlType::String => "varchar",
            SqlType::Integer => "integer",
            SqlType::Long => "bigint",
            SqlType::Float => "real",
            SqlType::Double => "double precision",
            SqlType::BigDecimal => "numeric",
            SqlType::BigInteger => "numeric(38,0)",
            SqlType::Boolean => "boolean",
            SqlType::Date => "date",
            SqlType::Timestamp => "timestamp",
            SqlType::Binary => "bytea",
        })
    }
}

pub struct MySqlDialect;

impl Dialect for MySqlDialect {
    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn cast_type_name(&self, sql_type: SqlType) -> Option<&'static str> {
        match sql_type {
            SqlType::String => Some("char"),
            SqlType::Integer | SqlType::Long => Some("signed"),
            SqlType::Float => Some("float"),
            SqlType::Double => Some("double"),
            SqlType::BigDecimal => Some("decimal(38,19)"),
            SqlType::BigInteger => Some("decimal(38,0)"),
            // CAST(x AS BOOLEAN) is not valid MySQL syntax.
            SqlType::Boolean => None,
            SqlType::Date => Some("date"),
            SqlType::Timestamp => Some("datetime"),
            SqlType::Binary => Some("binary"),
        }
    }

    // MySQL's || is logical or unless PIPES_AS_CONCAT is set.
    fn concat(&self, args: &[String]) -> String {
        format!("concat({})", args.join(", "))
    }
}

static GENERIC: GenericDialect = GenericDialect;
static POSTGRES: PostgresDialect = PostgresDialect;
static MYSQL: MySqlDialect = MySqlDialect;

pub fn dialect_for(kind: SqlDialectKind) -> &'static dyn Dialect {
    match kind {
        SqlDialectKind::Generic => &GENERIC,
        SqlDialectKind::Postgres => &POSTGRES,
        SqlDialectKind::MySql => &MYSQL,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cast_spellings_differ_by_dialect() {
        assert_eq!(
            dialect_for(SqlDialectKind::Generic).cast_type_name(SqlType::Long),
            Some("bigint")
        );
        assert_eq!(
            dialect_for(SqlDialectKind::MySql).cast_type_name(SqlType::Long),
            Some("signed")
        );
        assert_eq!(
            dialect_for(SqlDialectKind::MySql).cast_type_name(SqlType::Boolean),
            None
        );
    }

    #[test]
    fn postgres_numbers_placeholders() {
        assert_eq!(dialect_for(SqlDialectKind::Postgres).placeholder(3), "$3");
        assert_eq!(dialect_for(SqlDialectKind::Generic).placeholder(3), "?");
    }

    #[test]
    fn mysql_concat_is_a_function() {
        let d = dialect_for(SqlDialectKind::MySql);
        assert_eq!(
            d.concat(&["a".to_string(), "b".to_string()]),
            "concat(a, b)"
        );
    }
}
