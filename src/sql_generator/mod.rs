//! SQL generation: renders a resolved plan into dialect-specific SQL text
//! with an ordered parameter list.

pub mod dialect;
pub mod errors;
pub mod function_registry;
mod to_sql;

pub use dialect::{dialect_for, Dialect, GenericDialect, MySqlDialect, PostgresDialect};
pub use errors::SqlGeneratorError;
pub use function_registry::{get_function_mapping, FunctionMapping};
pub use to_sql::{generate, generate_with, SqlStatement};
