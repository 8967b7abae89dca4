//! # fluxlinq
//!
//! Typed query translation for time-series data. A parsed query over a
//! mapped entity type is compiled into a Flux pipeline and the Flux AST of
//! the parameters it references.
//!
//! ## Features
//!
//! - **Schema mapping**: Entity members mapped to timestamp, tag, field and
//!   measurement columns
//! - **Parameterized output**: Every literal becomes an `option pN = ...`
//!   binding, never inline Flux text
//! - **Pipeline rendering**: `from |> range |> pivot |> filter |> sort |> limit`
//! - **Strict diagnostics**: Unsupported expressions and operators are
//!   rejected by name
//!
//! ## Modules
//!
//! - [`schema`]: Entity schema metadata and member resolution
//! - [`query`]: Query model, translator and executor
//! - [`flux`]: Flux AST and request payload
//! - [`config`]: Configuration loading
//!
//! ## Quick Start
//!
//! ```rust
//! use fluxlinq::query::{translate, Expr, QueryModel};
//! use fluxlinq::schema::{EntitySchema, SchemaRegistry};
//!
//! let schemas = SchemaRegistry::new().with(
//!     EntitySchema::new("Sensor")
//!         .tag("SensorId", "sensor_id")
//!         .field("Value", "data")
//!         .timestamp("Timestamp"),
//! );
//!
//! let model = QueryModel::entity("Sensor")
//!     .filter(Expr::member("SensorId").equals(Expr::constant("id-1")))
//!     .build();
//!
//! let translation = translate(&model, &schemas, "my-bucket").unwrap();
//! assert_eq!(
//!     translation.query,
//!     r#"from(bucket: p1) |> range(start: p2) |> pivot(rowKey:["_time"], columnKey: ["_field"], valueColumn: "_value") |> filter(fn: (r) => (r["sensor_id"] == p3))"#
//! );
//! ```

pub mod config;
pub mod flux;
pub mod query;
pub mod schema;

// Re-export top-level types for convenience
pub use query::{
    translate, Expr, FluxRecord, FluxTransport, Literal, QueryError, QueryExecutor, QueryModel,
    QueryVisitor, ResultOperator, TranslateError, TranslateOptions, Translation,
};

pub use schema::{ColumnRole, EntitySchema, SchemaRegistry};

pub use flux::{Dialect, FluxQuery};

pub use config::{ClientConfig, Config, ConfigError, LoggingConfig};
