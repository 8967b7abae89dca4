//! Query Parameters
//!
//! Every literal met during translation becomes a named parameter. The Flux
//! source only references parameters by name (`p1`, `p2`, ...); their values
//! travel separately as `option` statements of the `extern` AST.
//!
//! Names are handed out in first-use order and never reused, even when the
//! same value occurs twice.

use crate::flux::ast::{duration_parts, format_duration, Expression, Statement};
use crate::query::model::Literal;
use chrono::SecondsFormat;
use tracing::debug;

/// A named parameter bound to a literal
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: Literal,
}

impl Variable {
    /// Parameter name (`p<N>`)
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &Literal {
        &self.value
    }

    /// Literal node for the `extern` AST
    pub fn literal_node(&self) -> Expression {
        literal_node(&self.value)
    }

    /// `option <name> = <literal>`
    pub fn statement(&self) -> Statement {
        Statement::option(self.name.clone(), self.literal_node())
    }
}

/// Allocates parameters for one translation
#[derive(Debug, Default)]
pub struct VariableRegistry {
    variables: Vec<Variable>,
}

impl VariableRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a literal under the next free name
    pub fn add_literal(&mut self, value: impl Into<Literal>) -> &Variable {
        let value = value.into();
        let name = format!("p{}", self.variables.len() + 1);

        debug!(
            name = %name,
            kind = value.kind(),
            value = %inline(&value),
            "Registered query parameter"
        );

        self.variables.push(Variable { name, value });
        &self.variables[self.variables.len() - 1]
    }

    /// Register a literal and return only its name
    pub fn add_named(&mut self, value: impl Into<Literal>) -> String {
        self.add_literal(value).name.clone()
    }

    /// All parameters in registration order
    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Option statements in registration order
    pub fn statements(&self) -> Vec<Statement> {
        self.variables.iter().map(Variable::statement).collect()
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}

/// Typed AST node for a literal
pub fn literal_node(value: &Literal) -> Expression {
    match value {
        Literal::String(s) => Expression::StringLiteral { value: s.clone() },
        Literal::Integer(i) => Expression::IntegerLiteral {
            value: i.to_string(),
        },
        Literal::Float(f) => Expression::FloatLiteral { value: *f },
        Literal::Duration(d) => Expression::DurationLiteral {
            values: duration_parts(*d),
        },
        Literal::Boolean(b) => Expression::BooleanLiteral { value: *b },
        Literal::DateTime(dt) => Expression::DateTimeLiteral {
            value: dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
        },
    }
}

/// Inline text of a literal
///
/// Strings are left unquoted, numbers and durations are bare, booleans are
/// `true`/`false`.
pub fn inline(value: &Literal) -> String {
    match value {
        Literal::String(s) => s.clone(),
        Literal::Integer(i) => i.to_string(),
        Literal::Float(f) => f.to_string(),
        Literal::Duration(d) => format_duration(*d),
        Literal::Boolean(b) => b.to_string(),
        Literal::DateTime(dt) => dt.to_rfc3339_opts(SecondsFormat::AutoSi, true),
    }
}
