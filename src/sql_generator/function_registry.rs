/// HQL to SQL function registry
///
/// Maps HQL function names to dialect SQL equivalents with optional
/// argument transformations. A name absent from both the dialect override
/// table and the shared table is a generation error.
use std::collections::HashMap;

use crate::config::SqlDialectKind;

/// Function mapping entry
#[derive(Clone)]
pub struct FunctionMapping {
    /// HQL function name (lowercase for lookup)
    #[allow(dead_code)]
    pub hql_name: &'static str,
    /// SQL function name
    pub sql_name: &'static str,
    /// Optional argument transformation
    /// Takes rendered SQL arg strings, returns transformed arg strings
    pub arg_transform: Option<fn(&[String]) -> Vec<String>>,
    /// Rendered without parentheses (current_date and friends)
    pub no_parens: bool,
    /// Fewest arguments the mapping can render. Checked before
    /// `arg_transform` runs, since transforms index into the slice.
    pub min_args: usize,
}

impl FunctionMapping {
    const fn plain(hql_name: &'static str, sql_name: &'static str) -> Self {
        FunctionMapping {
            hql_name,
            sql_name,
            arg_transform: None,
            no_parens: false,
            min_args: 0,
        }
    }

    const fn bare(hql_name: &'static str, sql_name: &'static str) -> Self {
        FunctionMapping {
            hql_name,
            sql_name,
            arg_transform: None,
            no_parens: true,
            min_args: 0,
        }
    }
}

/// Look up a function for a dialect: dialect overrides first, then the
/// shared table.
pub fn get_function_mapping(dialect: SqlDialectKind, hql_fn: &str) -> Option<FunctionMapping> {
    let fn_lower = hql_fn.to_lowercase();
    let overrides = match dialect {
        SqlDialectKind::Generic => None,
        SqlDialectKind::Postgres => Some(&*POSTGRES_OVERRIDES),
        SqlDialectKind::MySql => Some(&*MYSQL_OVERRIDES),
    };
    if let Some(map) = overrides {
        if let Some(mapping) = map.get(fn_lower.as_str()) {
            return Some(mapping.clone());
        }
    }
    COMMON_MAPPINGS.get(fn_lower.as_str()).cloned()
}

lazy_static::lazy_static! {
    static ref COMMON_MAPPINGS: HashMap<&'static str, FunctionMapping> = {
        let mut m = HashMap::new();

        // ===== AGGREGATES =====
        for name in ["count", "sum", "min", "max", "avg"] {
            m.insert(name, FunctionMapping::plain(name, name));
        }

        // ===== STRING FUNCTIONS =====
        m.insert("upper", FunctionMapping::plain("upper", "upper"));
        m.insert("lower", FunctionMapping::plain("lower", "lower"));
        m.insert("trim", FunctionMapping::plain("trim", "trim"));
        m.insert("length", FunctionMapping::plain("length", "length"));
        m.insert("substring", FunctionMapping::plain("substring", "substring"));
        m.insert("concat", FunctionMapping::plain("concat", "concat"));
        m.insert("locate", FunctionMapping::plain("locate", "locate"));
        m.insert("bit_length", FunctionMapping::plain("bit_length", "bit_length"));

        // ===== NUMERIC FUNCTIONS =====
        m.insert("abs", FunctionMapping::plain("abs", "abs"));
        m.insert("sqrt", FunctionMapping::plain("sqrt", "sqrt"));
        m.insert("mod", FunctionMapping::plain("mod", "mod"));
        m.insert("bitand", FunctionMapping::plain("bitand", "bitand"));
        m.insert("bitor", FunctionMapping::plain("bitor", "bitor"));

        // ===== CONDITIONALS =====
        m.insert("coalesce", FunctionMapping::plain("coalesce", "coalesce"));
        m.insert("nullif", FunctionMapping::plain("nullif", "nullif"));

        // ===== TEMPORAL PSEUDO-FUNCTIONS =====
        m.insert("current_date", FunctionMapping::bare("current_date", "current_date"));
        m.insert("current_time", FunctionMapping::bare("current_time", "current_time"));
        m.insert("current_timestamp", FunctionMapping::bare("current_timestamp", "current_timestamp"));

        // str(x) -> cast(x as varchar)
        m.insert("str", FunctionMapping {
            hql_name: "str",
            sql_name: "cast",
            arg_transform: Some(|args| {
                vec![format!("{} as varchar", args[0])]
            }),
            no_parens: false,
            min_args: 1,
        });

        m
    };

    static ref POSTGRES_OVERRIDES: HashMap<&'static str, FunctionMapping> = {
        let mut m = HashMap::new();

        // locate(pattern, string) -> position(pattern in string)
        m.insert("locate", FunctionMapping {
            hql_name: "locate",
            sql_name: "position",
            arg_transform: Some(|args| {
                vec![format!("{} in {}", args[0], args[1])]
            }),
            no_parens: false,
            min_args: 2,
        });

        m
    };

    static ref MYSQL_OVERRIDES: HashMap<&'static str, FunctionMapping> = {
        let mut m = HashMap::new();

        m.insert("length", FunctionMapping::plain("length", "character_length"));

        // bitand(a, b) -> (a & b), bitor(a, b) -> (a | b)
        m.insert("bitand", FunctionMapping {
            hql_name: "bitand",
            sql_name: "",
            arg_transform: Some(|args| {
                vec![format!("({} & {})", args[0], args[1])]
            }),
            no_parens: true,
            min_args: 2,
        });
        m.insert("bitor", FunctionMapping {
            hql_name: "bitor",
            sql_name: "",
            arg_transform: Some(|args| {
                vec![format!("({} | {})", args[0], args[1])]
            }),
            no_parens: true,
            min_args: 2,
        });

        // str(x) -> cast(x as char)
        m.insert("str", FunctionMapping {
            hql_name: "str",
            sql_name: "cast",
            arg_transform: Some(|args| {
                vec![format!("{} as char", args[0])]
            }),
            no_parens: false,
            min_args: 1,
        });

        m
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dialect_override_beats_common() {
        let pg = get_function_mapping(SqlDialectKind::Postgres, "LOCATE").unwrap();
        assert_eq!(pg.sql_name, "position");
        let generic = get_function_mapping(SqlDialectKind::Generic, "locate").unwrap();
        assert_eq!(generic.sql_name, "locate");
    }

    #[test]
    fn unknown_function_is_unmapped() {
        assert!(get_function_mapping(SqlDialectKind::Generic, "soundex").is_none());
    }

    #[test]
    fn mysql_bitand_rewrites_to_operator() {
        let mapping = get_function_mapping(SqlDialectKind::MySql, "bitand").unwrap();
        let args = ["a".to_string(), "b".to_string()];
        let out = (mapping.arg_transform.unwrap())(&args);
        assert_eq!(out, vec!["(a & b)".to_string()]);
        assert!(mapping.no_parens);
    }

    #[test]
    fn temporal_functions_render_bare() {
        let mapping = get_function_mapping(SqlDialectKind::Generic, "current_date").unwrap();
        assert!(mapping.no_parens);
    }
}
