//! Entity Schema Metadata
//!
//! Maps the members of a typed entity onto the columns of the pivoted
//! Flux table:
//!
//! - **types**: `ColumnRole`, `EntitySchema`, `SchemaRegistry`
//! - **resolver**: Resolve a member to a `ColumnReference`
//!
//! # Example
//!
//! ```rust
//! use fluxlinq::schema::{EntitySchema, SchemaRegistry, SchemaResolver};
//!
//! let registry = SchemaRegistry::new().with(
//!     EntitySchema::new("Sensor")
//!         .tag("SensorId", "sensor_id")
//!         .field("Value", "data")
//!         .timestamp("Timestamp"),
//! );
//!
//! let schema = registry.get("Sensor").unwrap();
//! let column = SchemaResolver::new(schema).resolve("SensorId").unwrap();
//! assert_eq!(column.record_accessor(), r#"r["sensor_id"]"#);
//! ```

pub mod resolver;
pub mod types;

pub use resolver::{ColumnReference, SchemaResolver};
pub use types::{ColumnRole, EntitySchema, SchemaRegistry, MEASUREMENT_COLUMN, TIME_COLUMN};
