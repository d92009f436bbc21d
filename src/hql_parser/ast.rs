use std::borrow::Cow;

/// A complete parsed statement: a query or a bulk update/delete.
#[derive(Debug, PartialEq, Clone)]
pub enum HqlStatement<'a> {
    Select(SelectQuery<'a>),
    Update(UpdateStatement<'a>),
    Delete(DeleteStatement<'a>),
}

/// One query level: the outer statement or a subquery.
#[derive(Debug, PartialEq, Clone)]
pub struct SelectQuery<'a> {
    /// None for the `from Entity` shorthand (select the root entity).
    pub select: Option<SelectClause<'a>>,
    pub from: FromClause<'a>,
    pub where_clause: Option<Expression<'a>>,
    pub group_by: Vec<Expression<'a>>,
    pub having: Option<Expression<'a>>,
    pub order_by: Vec<OrderByItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct SelectClause<'a> {
    pub distinct: bool,
    pub items: Vec<SelectItem<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum SelectItem<'a> {
    Expression {
        expr: Expression<'a>,
        alias: Option<&'a str>,
    },
    /// `select new a.b.C(args...)`, `new list(...)`, `new map(...)`.
    Constructor {
        kind: ConstructorKind<'a>,
        args: Vec<Expression<'a>>,
    },
}

#[derive(Debug, PartialEq, Clone)]
pub enum ConstructorKind<'a> {
    Class(&'a str),
    List,
    Map,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FromClause<'a> {
    /// Comma-separated roots; more than one means a cross join.
    pub roots: Vec<FromRoot<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FromRoot<'a> {
    pub entity: &'a str,
    pub alias: Option<&'a str>,
    pub joins: Vec<JoinClause<'a>>,
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum JoinType {
    Inner,
    Left,
}

#[derive(Debug, PartialEq, Clone)]
pub struct JoinClause<'a> {
    pub join_type: JoinType,
    /// `join fetch` is accepted and recorded; generation treats it as a
    /// plain join (fetch semantics belong to the execution layer).
    pub fetch: bool,
    pub path: JoinTarget<'a>,
    pub alias: Option<&'a str>,
    pub with_predicate: Option<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub enum JoinTarget<'a> {
    Path(PathExpression<'a>),
    Treat {
        path: PathExpression<'a>,
        subtype: &'a str,
    },
}

/// Dotted navigation. The first segment may be an alias or (when the query
/// has a single unambiguous root) a property of that root; the resolver
/// decides.
#[derive(Debug, PartialEq, Clone)]
pub struct PathExpression<'a> {
    pub segments: Vec<&'a str>,
}

impl<'a> PathExpression<'a> {
    pub fn single(name: &'a str) -> Self {
        PathExpression {
            segments: vec![name],
        }
    }

    pub fn dotted(&self) -> String {
        self.segments.join(".")
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct OrderByItem<'a> {
    pub expr: Expression<'a>,
    pub descending: bool,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Literal<'a> {
    String(Cow<'a, str>),
    Integer(i64),
    Float(f64),
    Boolean(bool),
    Null,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Parameter<'a> {
    Named(&'a str),
    /// `?` (JPA-style `?1` keeps the explicit position).
    Positional(Option<u32>),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Operator {
    Or,
    And,
    Not,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Addition,
    Subtraction,
    Multiplication,
    Division,
    Modulo,
    Concat,
    Negate,
    IsNull,
    IsNotNull,
    Like,
    NotLike,
}

#[derive(Debug, PartialEq, Clone)]
pub struct OperatorApplication<'a> {
    pub operator: Operator,
    pub operands: Vec<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct FunctionCall<'a> {
    pub name: &'a str,
    pub distinct: bool,
    pub args: Vec<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct CaseExpression<'a> {
    /// Simple case carries the tested operand; searched case has none.
    pub operand: Option<Box<Expression<'a>>>,
    pub when_then: Vec<(Expression<'a>, Expression<'a>)>,
    pub else_expr: Option<Box<Expression<'a>>>,
}

/// Collection-valued-path functions taking a path argument.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum CollectionFn {
    Size,
    Elements,
    Indices,
    Key,
    Value,
    Index,
}

#[derive(Debug, PartialEq, Clone)]
pub enum InList<'a> {
    Items(Vec<Expression<'a>>),
    Subquery(Box<SelectQuery<'a>>),
    /// `x in elements(path)`
    Elements(PathExpression<'a>),
}

#[derive(Debug, PartialEq, Clone, Copy)]
pub enum Quantifier {
    All,
    Any,
    Some,
}

#[derive(Debug, PartialEq, Clone)]
pub enum Expression<'a> {
    Path(PathExpression<'a>),
    Literal(Literal<'a>),
    Parameter(Parameter<'a>),
    Operator(OperatorApplication<'a>),
    FunctionCall(FunctionCall<'a>),
    Case(CaseExpression<'a>),
    Cast {
        expr: Box<Expression<'a>>,
        /// Short type name, qualified class name, or entity name; resolved
        /// later against the catalog/dialect.
        target: &'a str,
    },
    Collection {
        function: CollectionFn,
        path: PathExpression<'a>,
    },
    Treat {
        path: PathExpression<'a>,
        subtype: &'a str,
        /// Property navigation after the downcast:
        /// `treat(a as Human).nickName`.
        trailing: Vec<&'a str>,
    },
    MemberOf {
        negated: bool,
        element: Box<Expression<'a>>,
        path: PathExpression<'a>,
    },
    IsEmpty {
        negated: bool,
        path: PathExpression<'a>,
    },
    Between {
        negated: bool,
        expr: Box<Expression<'a>>,
        low: Box<Expression<'a>>,
        high: Box<Expression<'a>>,
    },
    In {
        negated: bool,
        expr: Box<Expression<'a>>,
        list: InList<'a>,
    },
    Exists {
        negated: bool,
        subquery: Box<SelectQuery<'a>>,
    },
    Quantified {
        quantifier: Quantifier,
        subquery: Box<SelectQuery<'a>>,
    },
    Subquery(Box<SelectQuery<'a>>),
    Star,
}

#[derive(Debug, PartialEq, Clone)]
pub struct UpdateStatement<'a> {
    pub entity: &'a str,
    pub alias: Option<&'a str>,
    pub assignments: Vec<(PathExpression<'a>, Expression<'a>)>,
    pub where_clause: Option<Expression<'a>>,
}

#[derive(Debug, PartialEq, Clone)]
pub struct DeleteStatement<'a> {
    pub entity: &'a str,
    pub alias: Option<&'a str>,
    pub where_clause: Option<Expression<'a>>,
}
