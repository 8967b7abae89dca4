//! Query request payload
//!
//! The body sent to the query endpoint: the Flux source, the parameter
//! bindings as an `extern` AST, and the annotated CSV dialect used for the
//! response.

use crate::flux::ast::File;
use serde::{Deserialize, Serialize};

/// A complete query request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FluxQuery {
    /// Flux source referencing parameters by name
    pub query: String,
    /// Parameter bindings
    #[serde(rename = "extern")]
    pub extern_: File,
    /// Response format
    pub dialect: Dialect,
}

impl FluxQuery {
    /// Create a request with the default annotated CSV dialect
    pub fn new(query: impl Into<String>, extern_: File) -> Self {
        Self {
            query: query.into(),
            extern_,
            dialect: Dialect::default(),
        }
    }
}

/// CSV dialect of the query response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Dialect {
    pub header: bool,
    pub delimiter: String,
    pub comment_prefix: String,
    pub annotations: Vec<Annotation>,
}

impl Default for Dialect {
    fn default() -> Self {
        Self {
            header: true,
            delimiter: ",".to_string(),
            comment_prefix: "#".to_string(),
            annotations: vec![Annotation::Datatype, Annotation::Group, Annotation::Default],
        }
    }
}

/// Annotation rows requested in the CSV response
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Annotation {
    Datatype,
    Group,
    Default,
}
