use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum SqlGeneratorError {
    #[error("Select clause is empty (must project at least one column)")]
    EmptySelect,
    #[error("Update statement has no assignments")]
    EmptyAssignments,
    #[error("Unsupported expression in {clause} clause: {detail}")]
    UnsupportedExpression { clause: String, detail: String },
    #[error("Function '{name}' is not registered for dialect {dialect}")]
    FunctionNotRegistered { name: String, dialect: String },
    #[error("Function '{name}' requires at least {min} argument(s), got {actual}")]
    FunctionArity {
        name: String,
        min: usize,
        actual: usize,
    },
    #[error("Cannot cast to {target} on dialect {dialect}")]
    UnsupportedCast { target: String, dialect: String },
    #[error("Parameter index {0} is out of range for the plan's parameter list")]
    ParameterOutOfRange(usize),
}
