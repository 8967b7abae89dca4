//! Expression Compiler
//!
//! Compiles the translatable part of the expression graph into Flux
//! expression text:
//!
//! ```text
//! Member access     → r["column"]
//! Constant          → pN (registered parameter)
//! a == b, a < b ... → <a> == <b>
//! a && b, a || b    → (<a>) and (<b>)
//! ```
//!
//! Operands are compiled left to right, depth first, so parameter numbers
//! follow the reading order of the predicate.

use crate::query::error::{TranslateError, TranslateResult};
use crate::query::model::{BinaryOp, Expr};
use crate::query::variables::VariableRegistry;
use crate::schema::SchemaResolver;

/// Compiles expressions against one entity schema
pub struct ExpressionCompiler<'a> {
    resolver: SchemaResolver<'a>,
    variables: &'a mut VariableRegistry,
}

impl<'a> ExpressionCompiler<'a> {
    pub fn new(resolver: SchemaResolver<'a>, variables: &'a mut VariableRegistry) -> Self {
        Self {
            resolver,
            variables,
        }
    }

    /// Compile an expression to a Flux fragment
    pub fn compile(&mut self, expr: &Expr) -> TranslateResult<String> {
        match expr {
            Expr::Member { name } => Ok(self.resolver.resolve(name)?.record_accessor()),
            Expr::Constant { value } => Ok(self.variables.add_named(value.clone())),
            Expr::Binary { op, left, right } => self.compile_binary(*op, left, right),
            other => Err(TranslateError::UnsupportedExpression(
                other.kind().to_string(),
            )),
        }
    }

    fn compile_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> TranslateResult<String> {
        match FluxOperator::from_binary(op) {
            Some(FluxOperator::Comparison(symbol)) => {
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                Ok(format!("{} {} {}", left, symbol, right))
            }
            Some(FluxOperator::Logical(keyword)) => {
                let left = self.compile(left)?;
                let right = self.compile(right)?;
                Ok(format!("({}) {} ({})", left, keyword, right))
            }
            None => Err(TranslateError::UnsupportedExpression(op.kind().to_string())),
        }
    }
}

/// Flux spelling of a binary operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FluxOperator {
    Comparison(&'static str),
    Logical(&'static str),
}

impl FluxOperator {
    fn from_binary(op: BinaryOp) -> Option<Self> {
        match op {
            BinaryOp::Equal => Some(Self::Comparison("==")),
            BinaryOp::NotEqual => Some(Self::Comparison("!=")),
            BinaryOp::LessThan => Some(Self::Comparison("<")),
            BinaryOp::LessThanOrEqual => Some(Self::Comparison("<=")),
            BinaryOp::GreaterThan => Some(Self::Comparison(">")),
            BinaryOp::GreaterThanOrEqual => Some(Self::Comparison(">=")),
            BinaryOp::AndAlso => Some(Self::Logical("and")),
            BinaryOp::OrElse => Some(Self::Logical("or")),
            BinaryOp::Add
            | BinaryOp::Subtract
            | BinaryOp::Multiply
            | BinaryOp::Divide
            | BinaryOp::Modulo => None,
        }
    }
}
