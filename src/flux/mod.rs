//! Flux output types
//!
//! - **ast**: Parameter bindings as Flux AST (`File`, `OptionStatement`, literals)
//! - **query**: Request payload (`FluxQuery`, `Dialect`)

pub mod ast;
pub mod query;

pub use ast::{duration_parts, format_duration, Expression, File, Identifier, Statement, VariableAssignment};
pub use query::{Annotation, Dialect, FluxQuery};
