//! Translation of filter trees into SQL fragments.

use super::{
    BinaryExpression, Expression, NullaryExpression, SortOrder, TernaryExpression,
    TernaryOperator, UnaryExpression, UnaryOperator,
};
use crate::dialect::{Dialect, UnitOfWork};
use crate::error::{TacticError, TacticResult};
use crate::mapping::{ColumnMapping, TableMapping};
use crate::param::{TacticParameter, TacticParameters};

/// Recursive-descent translator from [`Expression`] to a WHERE fragment.
///
/// Each literal is bound as a parameter in the command's parameter set under a
/// freshly generated key, so literal text never reaches the command. Symbols
/// must resolve to a mapped column. The tree itself is never modified.
pub struct SqlExpressionVisitor<'a> {
    dialect: &'a dyn Dialect,
    unit_of_work: &'a dyn UnitOfWork,
    mapping: &'a TableMapping,
    alias: &'a str,
    parameters: &'a mut TacticParameters,
}

impl<'a> SqlExpressionVisitor<'a> {
    pub fn new(
        dialect: &'a dyn Dialect,
        unit_of_work: &'a dyn UnitOfWork,
        mapping: &'a TableMapping,
        alias: &'a str,
        parameters: &'a mut TacticParameters,
    ) -> Self {
        Self {
            dialect,
            unit_of_work,
            mapping,
            alias,
            parameters,
        }
    }

    /// Translate `expr`. `None` means no predicate (a void filter).
    pub fn visit(&mut self, expr: &Expression) -> TacticResult<Option<String>> {
        self.visit_node(expr, None)
    }

    /// Build the contents of an ORDER BY clause.
    ///
    /// Entries with an undefined direction are skipped; `None` when nothing
    /// remains.
    pub fn visit_sort(&self, sort: &[SortOrder]) -> TacticResult<Option<String>> {
        let mut parts = Vec::with_capacity(sort.len());
        for order in sort {
            let Some(keyword) = order.direction.keyword() else {
                continue;
            };
            let column = self.resolve(&order.symbol)?;
            parts.push(format!(
                "{} {}",
                self.dialect.aliased_column_name(self.alias, &column.name),
                keyword
            ));
        }
        Ok((!parts.is_empty()).then(|| parts.join(", ")))
    }

    /// `hint` is the column a sibling symbol refers to; literals compared
    /// against it are typed after it.
    fn visit_node(
        &mut self,
        expr: &Expression,
        hint: Option<&'a ColumnMapping>,
    ) -> TacticResult<Option<String>> {
        match expr {
            Expression::Void => Ok(None),
            Expression::Nullary(NullaryExpression::Symbol(symbol)) => {
                let column = self.resolve(symbol)?;
                Ok(Some(
                    self.dialect.aliased_column_name(self.alias, &column.name),
                ))
            }
            Expression::Nullary(NullaryExpression::Value(value)) => {
                let name = self.parameters.next_name();
                let mut parameter = match hint {
                    Some(column) => TacticParameter::for_column(&name, column, value.clone()),
                    None => TacticParameter::new(&name, value.clone()),
                };
                self.dialect.fixup_parameter(
                    self.unit_of_work,
                    &mut parameter,
                    hint.and_then(|c| c.db_type.as_deref()),
                );
                let marker = self.dialect.parameter_name(&name);
                self.parameters.push(parameter)?;
                Ok(Some(marker))
            }
            Expression::Unary(unary) => self.visit_unary(unary, hint),
            Expression::Binary(binary) => self.visit_binary(binary, hint),
            Expression::Ternary(ternary) => self.visit_ternary(ternary),
        }
    }

    fn visit_unary(
        &mut self,
        unary: &UnaryExpression,
        hint: Option<&'a ColumnMapping>,
    ) -> TacticResult<Option<String>> {
        let operand = self.required(&unary.operand, hint, "unary operand is empty")?;
        let sql = match unary.operator {
            UnaryOperator::Not => format!("(NOT {operand})"),
            UnaryOperator::IsNull => format!("({operand} IS NULL)"),
            UnaryOperator::IsNotNull => format!("({operand} IS NOT NULL)"),
            UnaryOperator::Neg => format!("(-{operand})"),
        };
        Ok(Some(sql))
    }

    fn visit_binary(
        &mut self,
        binary: &BinaryExpression,
        hint: Option<&'a ColumnMapping>,
    ) -> TacticResult<Option<String>> {
        let op = binary.operator;
        if op.is_logical() {
            let left = self.visit_node(&binary.left, None)?;
            let right = self.visit_node(&binary.right, None)?;
            return Ok(match (left, right) {
                (Some(l), Some(r)) => Some(format!("({l} {} {r})", op.token())),
                (side, None) | (None, side) => side,
            });
        }

        let hint = self
            .symbol_column(&binary.left)
            .or_else(|| self.symbol_column(&binary.right))
            .or(hint);
        let left = self.required(&binary.left, hint, "left operand is empty")?;
        let right = self.required(&binary.right, hint, "right operand is empty")?;
        Ok(Some(format!("({left} {} {right})", op.token())))
    }

    fn visit_ternary(&mut self, ternary: &TernaryExpression) -> TacticResult<Option<String>> {
        let hint = self.symbol_column(&ternary.first);
        let first = self.required(&ternary.first, hint, "tested operand is empty")?;
        let second = self.required(&ternary.second, hint, "lower bound is empty")?;
        let third = self.required(&ternary.third, hint, "upper bound is empty")?;
        let keyword = match ternary.operator {
            TernaryOperator::Between => "BETWEEN",
            TernaryOperator::NotBetween => "NOT BETWEEN",
        };
        Ok(Some(format!("({first} {keyword} {second} AND {third})")))
    }

    fn required(
        &mut self,
        expr: &Expression,
        hint: Option<&'a ColumnMapping>,
        reason: &str,
    ) -> TacticResult<String> {
        self.visit_node(expr, hint)?
            .ok_or_else(|| TacticError::InvalidExpression(reason.to_string()))
    }

    fn symbol_column(&self, expr: &Expression) -> Option<&'a ColumnMapping> {
        match expr {
            Expression::Nullary(NullaryExpression::Symbol(symbol)) => {
                self.mapping.find_column(symbol)
            }
            _ => None,
        }
    }

    fn resolve(&self, symbol: &str) -> TacticResult<&'a ColumnMapping> {
        self.mapping
            .find_column(symbol)
            .ok_or_else(|| TacticError::UnknownSymbol {
                table: self.mapping.table.clone(),
                symbol: symbol.to_string(),
            })
    }
}
