//! Filter expression trees and sort specifications.
//!
//! An [`Expression`] is an immutable tree of nullary (symbol or literal),
//! unary, binary and ternary nodes. [`Expression::Void`] means "no filter".
//! Trees are translated to SQL by [`SqlExpressionVisitor`], which binds every
//! literal as a parameter.
//!
//! # Example
//! ```ignore
//! use sqltactic::expr::{Expression, Query};
//!
//! let query = Query::new()
//!     .filter(Expression::symbol("Price").between(1i32, 10i32)
//!         .and(Expression::symbol("Name").like("B%")))
//!     .desc("Price");
//! ```

mod visitor;

pub use visitor::SqlExpressionVisitor;

use crate::value::Value;

/// Leaf node.
#[derive(Debug, Clone, PartialEq)]
pub enum NullaryExpression {
    /// A column reference, by column or property name.
    Symbol(String),
    /// A literal; always bound as a parameter.
    Value(Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Not,
    IsNull,
    IsNotNull,
    Neg,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    And,
    Or,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Like,
    NotLike,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl BinaryOperator {
    /// ANSI token for the operator.
    pub const fn token(self) -> &'static str {
        match self {
            Self::And => "AND",
            Self::Or => "OR",
            Self::Eq => "=",
            Self::Ne => "<>",
            Self::Lt => "<",
            Self::Le => "<=",
            Self::Gt => ">",
            Self::Ge => ">=",
            Self::Like => "LIKE",
            Self::NotLike => "NOT LIKE",
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
        }
    }

    /// `AND` / `OR`.
    pub const fn is_logical(self) -> bool {
        matches!(self, Self::And | Self::Or)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TernaryOperator {
    Between,
    NotBetween,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UnaryExpression {
    pub operator: UnaryOperator,
    pub operand: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpression {
    pub operator: BinaryOperator,
    pub left: Box<Expression>,
    pub right: Box<Expression>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TernaryExpression {
    pub operator: TernaryOperator,
    pub first: Box<Expression>,
    pub second: Box<Expression>,
    pub third: Box<Expression>,
}

/// Filter expression node.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Expression {
    /// No filter.
    #[default]
    Void,
    Nullary(NullaryExpression),
    Unary(UnaryExpression),
    Binary(BinaryExpression),
    Ternary(TernaryExpression),
}

impl Expression {
    pub const fn void() -> Self {
        Expression::Void
    }

    pub const fn is_void(&self) -> bool {
        matches!(self, Expression::Void)
    }

    /// Reference a mapped column.
    pub fn symbol(name: impl Into<String>) -> Self {
        Expression::Nullary(NullaryExpression::Symbol(name.into()))
    }

    /// A literal value.
    pub fn value(value: impl Into<Value>) -> Self {
        Expression::Nullary(NullaryExpression::Value(value.into()))
    }

    pub fn unary(operator: UnaryOperator, operand: Expression) -> Self {
        Expression::Unary(UnaryExpression {
            operator,
            operand: Box::new(operand),
        })
    }

    pub fn binary(operator: BinaryOperator, left: Expression, right: Expression) -> Self {
        Expression::Binary(BinaryExpression {
            operator,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn ternary(
        operator: TernaryOperator,
        first: Expression,
        second: Expression,
        third: Expression,
    ) -> Self {
        Expression::Ternary(TernaryExpression {
            operator,
            first: Box::new(first),
            second: Box::new(second),
            third: Box::new(third),
        })
    }

    /// `self AND other`
    pub fn and(self, other: Expression) -> Self {
        Self::binary(BinaryOperator::And, self, other)
    }

    /// `self OR other`
    pub fn or(self, other: Expression) -> Self {
        Self::binary(BinaryOperator::Or, self, other)
    }

    /// `self = value`
    pub fn eq(self, value: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Eq, self, value.into())
    }

    /// `self <> value`
    pub fn ne(self, value: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Ne, self, value.into())
    }

    /// `self < value`
    pub fn lt(self, value: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Lt, self, value.into())
    }

    /// `self <= value`
    pub fn le(self, value: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Le, self, value.into())
    }

    /// `self > value`
    pub fn gt(self, value: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Gt, self, value.into())
    }

    /// `self >= value`
    pub fn ge(self, value: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Ge, self, value.into())
    }

    /// `self LIKE pattern`
    pub fn like(self, pattern: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::Like, self, pattern.into())
    }

    /// `self NOT LIKE pattern`
    pub fn not_like(self, pattern: impl Into<Expression>) -> Self {
        Self::binary(BinaryOperator::NotLike, self, pattern.into())
    }

    /// `NOT self`
    pub fn not(self) -> Self {
        Self::unary(UnaryOperator::Not, self)
    }

    /// `self IS NULL`
    pub fn is_null(self) -> Self {
        Self::unary(UnaryOperator::IsNull, self)
    }

    /// `self IS NOT NULL`
    pub fn is_not_null(self) -> Self {
        Self::unary(UnaryOperator::IsNotNull, self)
    }

    /// `self BETWEEN low AND high`
    pub fn between(self, low: impl Into<Expression>, high: impl Into<Expression>) -> Self {
        Self::ternary(TernaryOperator::Between, self, low.into(), high.into())
    }

    /// `self NOT BETWEEN low AND high`
    pub fn not_between(self, low: impl Into<Expression>, high: impl Into<Expression>) -> Self {
        Self::ternary(TernaryOperator::NotBetween, self, low.into(), high.into())
    }

    /// AND together all expressions, skipping voids.
    ///
    /// Returns [`Expression::Void`] when nothing remains.
    pub fn all(exprs: impl IntoIterator<Item = Expression>) -> Self {
        exprs
            .into_iter()
            .filter(|e| !e.is_void())
            .reduce(Expression::and)
            .unwrap_or_default()
    }
}

macro_rules! literal_from {
    ($($ty:ty),* $(,)?) => {
        $(
            impl From<$ty> for Expression {
                fn from(value: $ty) -> Self {
                    Expression::value(value)
                }
            }
        )*
    };
}

literal_from! {
    Value,
    bool,
    i32,
    i64,
    f64,
    &str,
    String,
    rust_decimal::Decimal,
    uuid::Uuid,
    chrono::DateTime<chrono::Utc>,
}

/// Sort direction. `Undefined` entries are not emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Undefined,
    Ascending,
    Descending,
}

impl SortDirection {
    pub const fn keyword(self) -> Option<&'static str> {
        match self {
            Self::Undefined => None,
            Self::Ascending => Some("ASC"),
            Self::Descending => Some("DESC"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    pub symbol: String,
    pub direction: SortDirection,
}

impl SortOrder {
    pub fn new(symbol: impl Into<String>, direction: SortDirection) -> Self {
        Self {
            symbol: symbol.into(),
            direction,
        }
    }

    pub fn asc(symbol: impl Into<String>) -> Self {
        Self::new(symbol, SortDirection::Ascending)
    }

    pub fn desc(symbol: impl Into<String>) -> Self {
        Self::new(symbol, SortDirection::Descending)
    }
}

/// A structured query: filter plus sort specification.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Query {
    pub filter: Expression,
    pub sort: Vec<SortOrder>,
}

impl Query {
    /// Unfiltered, unsorted.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter.
    pub fn filter(mut self, filter: Expression) -> Self {
        self.filter = filter;
        self
    }

    pub fn order_by(mut self, order: SortOrder) -> Self {
        self.sort.push(order);
        self
    }

    /// Sort ascending by a symbol.
    pub fn asc(self, symbol: impl Into<String>) -> Self {
        self.order_by(SortOrder::asc(symbol))
    }

    /// Sort descending by a symbol.
    pub fn desc(self, symbol: impl Into<String>) -> Self {
        self.order_by(SortOrder::desc(symbol))
    }
}
