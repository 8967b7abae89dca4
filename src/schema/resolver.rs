//! Member-to-column resolution

use crate::query::{TranslateError, TranslateResult};
use crate::schema::types::EntitySchema;

/// A resolved column of the pivoted table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnReference {
    name: String,
}

impl ColumnReference {
    /// Create a reference to a named column
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Bare column name, used as a string argument (e.g. sort columns)
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Record accessor form used inside `fn: (r) => ...` bodies
    pub fn record_accessor(&self) -> String {
        format!("r[\"{}\"]", self.name)
    }
}

impl std::fmt::Display for ColumnReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Resolves member identifiers against one entity schema
#[derive(Debug, Clone, Copy)]
pub struct SchemaResolver<'a> {
    schema: &'a EntitySchema,
}

impl<'a> SchemaResolver<'a> {
    pub fn new(schema: &'a EntitySchema) -> Self {
        Self { schema }
    }

    /// Resolve a member to the column it is stored in
    pub fn resolve(&self, member: &str) -> TranslateResult<ColumnReference> {
        self.schema
            .role(member)
            .map(|role| ColumnReference::new(role.column_name()))
            .ok_or_else(|| TranslateError::UnmappedMember {
                entity: self.schema.name.clone(),
                member: member.to_string(),
            })
    }

    /// Entity type this resolver works against
    pub fn entity(&self) -> &str {
        &self.schema.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor() -> EntitySchema {
        EntitySchema::new("Sensor")
            .tag("SensorId", "sensor_id")
            .field("Value", "data")
            .timestamp("Timestamp")
    }

    #[test]
    fn test_resolve_tag_uses_column_name() {
        let schema = sensor();
        let column = SchemaResolver::new(&schema).resolve("SensorId").unwrap();

        assert_eq!(column.name(), "sensor_id");
        assert_eq!(column.record_accessor(), r#"r["sensor_id"]"#);
    }

    #[test]
    fn test_resolve_timestamp() {
        let schema = sensor();
        let column = SchemaResolver::new(&schema).resolve("Timestamp").unwrap();

        assert_eq!(column.name(), "_time");
        assert_eq!(column.record_accessor(), r#"r["_time"]"#);
    }

    #[test]
    fn test_resolve_unmapped_member() {
        let schema = sensor();
        let err = SchemaResolver::new(&schema).resolve("Location").unwrap_err();

        match err {
            TranslateError::UnmappedMember { entity, member } => {
                assert_eq!(entity, "Sensor");
                assert_eq!(member, "Location");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
