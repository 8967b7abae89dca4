//! Flux Query Translation
//!
//! Compiles a parsed, strongly-typed entity query into a Flux pipeline plus
//! the parameter bindings it references:
//!
//! - **model**: Parsed query clauses and the expression graph
//! - **variables**: Parameter allocation (`p1`, `p2`, ...)
//! - **expression**: Predicate compilation
//! - **aggregator**: Pipeline stage ordering and rendering
//! - **visitor**: Clause walk and error policy (entry point)
//! - **executor**: Hand-off to a `FluxTransport`
//!
//! # Example
//!
//! ```rust
//! use fluxlinq::query::{translate, Expr, QueryModel};
//! use fluxlinq::schema::{EntitySchema, SchemaRegistry};
//!
//! let schemas = SchemaRegistry::new().with(
//!     EntitySchema::new("Sensor")
//!         .tag("SensorId", "sensor_id")
//!         .timestamp("Timestamp"),
//! );
//!
//! let model = QueryModel::entity("Sensor")
//!     .filter(Expr::member("SensorId").equals(Expr::constant("id-1")))
//!     .take(10)
//!     .build();
//!
//! let translation = translate(&model, &schemas, "my-bucket").unwrap();
//! assert!(translation.query.ends_with("|> limit(n: p4)"));
//! assert_eq!(translation.ast.to_string().lines().count(), 4);
//! ```

mod aggregator;
mod error;
mod executor;
mod expression;
mod model;
mod variables;
mod visitor;

pub use aggregator::{PipelineAggregator, ResultFunction, DEFAULT_DROP_COLUMNS, RESULT_COLUMN};
pub use error::{QueryError, QueryResult, TransportError, TranslateError, TranslateResult};
pub use executor::{FluxRecord, FluxTransport, QueryExecutor};
pub use expression::ExpressionCompiler;
pub use model::{
    BinaryOp, BodyClause, Expr, Literal, MainFromClause, OrderDirection, Ordering, QueryModel,
    QueryModelBuilder, ResultOperator, SelectClause,
};
pub use variables::{inline, literal_node, Variable, VariableRegistry};
pub use visitor::{translate, QueryVisitor, TranslateOptions, Translation};
