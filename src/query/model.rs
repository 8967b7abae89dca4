//! Parsed Query Model
//!
//! The clause-level representation of a typed entity query, as produced by
//! a query-parsing front end:
//!
//! ```text
//! from s in Sensor              → MainFromClause
//! where s.SensorId == "id-1"    → BodyClause::Where
//! orderby s.Timestamp desc      → BodyClause::OrderBy
//! select s                      → SelectClause
//! .Take(10).Skip(5)             → ResultOperator::Take / ResultOperator::Skip
//! ```
//!
//! Every node derives serde so models can be handed over as JSON.

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// A parsed query over one entity type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryModel {
    /// Source of the query
    pub from: MainFromClause,
    /// Filter and ordering clauses, in source order
    #[serde(default)]
    pub body: Vec<BodyClause>,
    /// Projection
    #[serde(default)]
    pub select: SelectClause,
    /// Paging and aggregate operators, in application order
    #[serde(default)]
    pub result_operators: Vec<ResultOperator>,
}

impl QueryModel {
    /// Start building a query over an entity type
    pub fn entity(name: impl Into<String>) -> QueryModelBuilder {
        QueryModelBuilder::new(name)
    }
}

/// `from <item> in <Entity>`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MainFromClause {
    /// Entity type name, resolved against the schema registry
    pub entity: String,
}

/// A clause in the query body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "clause", rename_all = "snake_case")]
pub enum BodyClause {
    /// `where <predicate>`
    Where { predicate: Expr },
    /// `orderby <key> [descending], ...`
    OrderBy { orderings: Vec<Ordering> },
}

/// A single ordering key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ordering {
    pub expr: Expr,
    #[serde(default)]
    pub direction: OrderDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    #[default]
    Ascending,
    Descending,
}

impl OrderDirection {
    pub fn is_descending(&self) -> bool {
        matches!(self, Self::Descending)
    }
}

/// Projection of the query
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "projection", rename_all = "snake_case")]
pub enum SelectClause {
    /// `select s`
    #[default]
    Entity,
    /// `select new { s.A, s.B }`
    Members { members: Vec<String> },
}

/// Expression graph handed over by the front end
///
/// Only member access, constants, comparisons and `and`/`or` translate; the
/// remaining kinds are representable so that they can be rejected with a
/// precise error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// `s.Member`
    Member { name: String },
    /// A literal value
    Constant { value: Literal },
    /// `left <op> right`
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    /// `!operand`
    Not { operand: Box<Expr> },
    /// `-operand`
    Negate { operand: Box<Expr> },
    /// `target.method(args)` or a static call
    Call { method: String, args: Vec<Expr> },
    /// `test ? if_true : if_false`
    Conditional {
        test: Box<Expr>,
        if_true: Box<Expr>,
        if_false: Box<Expr>,
    },
}

impl Expr {
    /// Member access
    pub fn member(name: impl Into<String>) -> Self {
        Self::Member { name: name.into() }
    }

    /// Constant literal
    pub fn constant(value: impl Into<Literal>) -> Self {
        Self::Constant {
            value: value.into(),
        }
    }

    /// Binary node
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Self::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    pub fn equals(self, right: Expr) -> Self {
        Self::binary(BinaryOp::Equal, self, right)
    }

    pub fn not_equals(self, right: Expr) -> Self {
        Self::binary(BinaryOp::NotEqual, self, right)
    }

    pub fn lt(self, right: Expr) -> Self {
        Self::binary(BinaryOp::LessThan, self, right)
    }

    pub fn le(self, right: Expr) -> Self {
        Self::binary(BinaryOp::LessThanOrEqual, self, right)
    }

    pub fn gt(self, right: Expr) -> Self {
        Self::binary(BinaryOp::GreaterThan, self, right)
    }

    pub fn ge(self, right: Expr) -> Self {
        Self::binary(BinaryOp::GreaterThanOrEqual, self, right)
    }

    pub fn and(self, right: Expr) -> Self {
        Self::binary(BinaryOp::AndAlso, self, right)
    }

    pub fn or(self, right: Expr) -> Self {
        Self::binary(BinaryOp::OrElse, self, right)
    }

    /// Name of the node kind, used in diagnostics
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Member { .. } => "MemberAccess",
            Self::Constant { .. } => "Constant",
            Self::Binary { op, .. } => op.kind(),
            Self::Not { .. } => "Not",
            Self::Negate { .. } => "Negate",
            Self::Call { .. } => "Call",
            Self::Conditional { .. } => "Conditional",
        }
    }
}

/// Binary operators of the expression graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    AndAlso,
    OrElse,
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    /// Node kind name
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Equal => "Equal",
            Self::NotEqual => "NotEqual",
            Self::LessThan => "LessThan",
            Self::LessThanOrEqual => "LessThanOrEqual",
            Self::GreaterThan => "GreaterThan",
            Self::GreaterThanOrEqual => "GreaterThanOrEqual",
            Self::AndAlso => "AndAlso",
            Self::OrElse => "OrElse",
            Self::Add => "Add",
            Self::Subtract => "Subtract",
            Self::Multiply => "Multiply",
            Self::Divide => "Divide",
            Self::Modulo => "Modulo",
        }
    }
}

/// Literal values appearing in queries
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    /// Nanosecond precision; serialized as a nanosecond count
    Duration(#[serde(with = "duration_nanos")] TimeDelta),
    Boolean(bool),
    DateTime(DateTime<Utc>),
}

impl Literal {
    /// Kind name, used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::String(_) => "string",
            Self::Integer(_) => "integer",
            Self::Float(_) => "float",
            Self::Duration(_) => "duration",
            Self::Boolean(_) => "boolean",
            Self::DateTime(_) => "datetime",
        }
    }
}

impl From<&str> for Literal {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for Literal {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for Literal {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for Literal {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for Literal {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for Literal {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<TimeDelta> for Literal {
    fn from(value: TimeDelta) -> Self {
        Self::Duration(value)
    }
}

impl From<DateTime<Utc>> for Literal {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

mod duration_nanos {
    use chrono::TimeDelta;
    use serde::{ser::Error as _, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(delta: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
        let nanos = delta
            .num_nanoseconds()
            .ok_or_else(|| S::Error::custom("duration does not fit in i64 nanoseconds"))?;
        serializer.serialize_i64(nanos)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<TimeDelta, D::Error> {
        i64::deserialize(deserializer).map(TimeDelta::nanoseconds)
    }
}

/// Operators applied after the body clauses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "operator", rename_all = "snake_case")]
pub enum ResultOperator {
    Take { count: Expr },
    Skip { count: Expr },
    Count,
    LongCount,
    First,
    Last,
    Single,
    Min,
    Max,
    Sum,
    Average,
    Any,
    All { predicate: Expr },
    Distinct,
}

impl ResultOperator {
    /// Operator type name, as reported in errors
    pub fn name(&self) -> &'static str {
        match self {
            Self::Take { .. } => "TakeResultOperator",
            Self::Skip { .. } => "SkipResultOperator",
            Self::Count => "CountResultOperator",
            Self::LongCount => "LongCountResultOperator",
            Self::First => "FirstResultOperator",
            Self::Last => "LastResultOperator",
            Self::Single => "SingleResultOperator",
            Self::Min => "MinResultOperator",
            Self::Max => "MaxResultOperator",
            Self::Sum => "SumResultOperator",
            Self::Average => "AverageResultOperator",
            Self::Any => "AnyResultOperator",
            Self::All { .. } => "AllResultOperator",
            Self::Distinct => "DistinctResultOperator",
        }
    }
}

/// Builder for constructing query models programmatically
#[derive(Debug, Clone)]
pub struct QueryModelBuilder {
    entity: String,
    body: Vec<BodyClause>,
    select: SelectClause,
    result_operators: Vec<ResultOperator>,
}

impl QueryModelBuilder {
    pub fn new(entity: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            body: Vec::new(),
            select: SelectClause::Entity,
            result_operators: Vec::new(),
        }
    }

    /// Add a `where` clause
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.body.push(BodyClause::Where { predicate });
        self
    }

    /// Add an `orderby` clause with one ascending key
    pub fn order_by(self, expr: Expr) -> Self {
        self.order(expr, OrderDirection::Ascending)
    }

    /// Add an `orderby` clause with one descending key
    pub fn order_by_descending(self, expr: Expr) -> Self {
        self.order(expr, OrderDirection::Descending)
    }

    /// Add a key to the last `orderby` clause, or start one
    pub fn then_by(mut self, expr: Expr, direction: OrderDirection) -> Self {
        let ordering = Ordering { expr, direction };
        match self.body.last_mut() {
            Some(BodyClause::OrderBy { orderings }) => orderings.push(ordering),
            _ => self.body.push(BodyClause::OrderBy {
                orderings: vec![ordering],
            }),
        }
        self
    }

    fn order(mut self, expr: Expr, direction: OrderDirection) -> Self {
        self.body.push(BodyClause::OrderBy {
            orderings: vec![Ordering { expr, direction }],
        });
        self
    }

    /// Project selected members
    pub fn select_members(mut self, members: &[&str]) -> Self {
        self.select = SelectClause::Members {
            members: members.iter().map(|m| m.to_string()).collect(),
        };
        self
    }

    /// Append `Take(n)`
    pub fn take(self, n: i64) -> Self {
        self.result_operator(ResultOperator::Take {
            count: Expr::constant(n),
        })
    }

    /// Append `Skip(n)`
    pub fn skip(self, n: i64) -> Self {
        self.result_operator(ResultOperator::Skip {
            count: Expr::constant(n),
        })
    }

    /// Append `Count()`
    pub fn count(self) -> Self {
        self.result_operator(ResultOperator::Count)
    }

    /// Append any result operator
    pub fn result_operator(mut self, operator: ResultOperator) -> Self {
        self.result_operators.push(operator);
        self
    }

    pub fn build(self) -> QueryModel {
        QueryModel {
            from: MainFromClause {
                entity: self.entity,
            },
            body: self.body,
            select: self.select,
            result_operators: self.result_operators,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_clause_order() {
        let model = QueryModel::entity("Sensor")
            .filter(Expr::member("SensorId").equals(Expr::constant("id-1")))
            .order_by(Expr::member("Timestamp"))
            .then_by(Expr::member("Value"), OrderDirection::Descending)
            .take(10)
            .skip(5)
            .build();

        assert_eq!(model.from.entity, "Sensor");
        assert_eq!(model.body.len(), 2);
        match &model.body[1] {
            BodyClause::OrderBy { orderings } => {
                assert_eq!(orderings.len(), 2);
                assert!(orderings[1].direction.is_descending());
            }
            other => panic!("unexpected clause: {other:?}"),
        }
        assert_eq!(model.result_operators.len(), 2);
        assert_eq!(model.select, SelectClause::Entity);
    }

    #[test]
    fn test_expr_kind_names() {
        assert_eq!(Expr::member("A").kind(), "MemberAccess");
        assert_eq!(Expr::constant(1).kind(), "Constant");
        assert_eq!(
            Expr::binary(BinaryOp::Add, Expr::member("A"), Expr::constant(1)).kind(),
            "Add"
        );
        assert_eq!(
            Expr::Not {
                operand: Box::new(Expr::member("A"))
            }
            .kind(),
            "Not"
        );
    }

    #[test]
    fn test_operator_names() {
        assert_eq!(ResultOperator::Count.name(), "CountResultOperator");
        assert_eq!(
            ResultOperator::Take {
                count: Expr::constant(1)
            }
            .name(),
            "TakeResultOperator"
        );
    }

    #[test]
    fn test_model_from_json() {
        let json = r#"{
            "from": { "entity": "Sensor" },
            "body": [
                {
                    "clause": "where",
                    "predicate": {
                        "kind": "binary",
                        "op": "equal",
                        "left": { "kind": "member", "name": "SensorId" },
                        "right": { "kind": "constant", "value": { "type": "string", "value": "id-1" } }
                    }
                },
                {
                    "clause": "order_by",
                    "orderings": [ { "expr": { "kind": "member", "name": "Timestamp" }, "direction": "descending" } ]
                }
            ],
            "result_operators": [
                { "operator": "take", "count": { "kind": "constant", "value": { "type": "integer", "value": 10 } } }
            ]
        }"#;

        let model: QueryModel = serde_json::from_str(json).unwrap();
        let expected = QueryModel::entity("Sensor")
            .filter(Expr::member("SensorId").equals(Expr::constant("id-1")))
            .order_by_descending(Expr::member("Timestamp"))
            .take(10)
            .build();

        assert_eq!(model, expected);
    }

    #[test]
    fn test_duration_literal_json() {
        let literal = Literal::Duration(TimeDelta::seconds(2));
        let json = serde_json::to_value(&literal).unwrap();
        assert_eq!(json, serde_json::json!({ "type": "duration", "value": 2_000_000_000_i64 }));

        let back: Literal = serde_json::from_value(json).unwrap();
        assert_eq!(back, literal);
    }
}
