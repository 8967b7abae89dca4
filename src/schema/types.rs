//! Entity schema metadata
//!
//! Describes how the members of a mapped entity type correspond to columns of
//! a pivoted Flux table:
//! - `ColumnRole`: What a member represents (timestamp, tag, field, measurement)
//! - `EntitySchema`: Member-to-role map for one entity type
//! - `SchemaRegistry`: Read-only collection of schemas keyed by entity name

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

/// Column holding the point timestamp
pub const TIME_COLUMN: &str = "_time";

/// Column holding the measurement name
pub const MEASUREMENT_COLUMN: &str = "_measurement";

/// Semantic role of an entity member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "column", rename_all = "lowercase")]
pub enum ColumnRole {
    /// The point timestamp (`_time`)
    Timestamp,
    /// A tag (dimension) column
    Tag(String),
    /// A field (value) column
    Field(String),
    /// The measurement name (`_measurement`)
    Measurement,
}

impl ColumnRole {
    /// Column name this role maps to
    pub fn column_name(&self) -> &str {
        match self {
            Self::Timestamp => TIME_COLUMN,
            Self::Tag(name) | Self::Field(name) => name,
            Self::Measurement => MEASUREMENT_COLUMN,
        }
    }
}

impl std::fmt::Display for ColumnRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timestamp => write!(f, "timestamp"),
            Self::Tag(name) => write!(f, "tag({})", name),
            Self::Field(name) => write!(f, "field({})", name),
            Self::Measurement => write!(f, "measurement"),
        }
    }
}

/// Schema of a single entity type
///
/// Built once per type and never mutated after it is registered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySchema {
    /// Entity type name, as referenced by the source clause
    pub name: String,
    /// Roles keyed by member identifier
    #[serde(default)]
    pub members: HashMap<String, ColumnRole>,
}

impl EntitySchema {
    /// Create an empty schema for an entity type
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: HashMap::new(),
        }
    }

    /// Builder method: map a member to a role
    pub fn member(mut self, member: impl Into<String>, role: ColumnRole) -> Self {
        self.members.insert(member.into(), role);
        self
    }

    /// Builder method: map the timestamp member
    pub fn timestamp(self, member: impl Into<String>) -> Self {
        self.member(member, ColumnRole::Timestamp)
    }

    /// Builder method: map a tag member to its column
    pub fn tag(self, member: impl Into<String>, column: impl Into<String>) -> Self {
        self.member(member, ColumnRole::Tag(column.into()))
    }

    /// Builder method: map a field member to its column
    pub fn field(self, member: impl Into<String>, column: impl Into<String>) -> Self {
        self.member(member, ColumnRole::Field(column.into()))
    }

    /// Builder method: map the measurement member
    pub fn measurement(self, member: impl Into<String>) -> Self {
        self.member(member, ColumnRole::Measurement)
    }

    /// Look up the role of a member
    pub fn role(&self, member: &str) -> Option<&ColumnRole> {
        self.members.get(member)
    }
}

/// Registry of entity schemas
///
/// Populated up front, then shared (usually behind an `Arc`) by any number of
/// concurrent translations. There is no interior mutability.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entities: HashMap<String, Arc<EntitySchema>>,
}

impl SchemaRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema, replacing any previous schema with the same name
    pub fn register(&mut self, schema: EntitySchema) {
        self.entities.insert(schema.name.clone(), Arc::new(schema));
    }

    /// Builder method: register a schema
    pub fn with(mut self, schema: EntitySchema) -> Self {
        self.register(schema);
        self
    }

    /// Get the schema of an entity type
    pub fn get(&self, entity: &str) -> Option<&EntitySchema> {
        self.entities.get(entity).map(|s| s.as_ref())
    }

    /// Number of registered entity types
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl FromIterator<EntitySchema> for SchemaRegistry {
    fn from_iter<I: IntoIterator<Item = EntitySchema>>(iter: I) -> Self {
        let mut registry = Self::new();
        for schema in iter {
            registry.register(schema);
        }
        registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sensor() -> EntitySchema {
        EntitySchema::new("Sensor")
            .tag("SensorId", "sensor_id")
            .tag("Deployment", "deployment")
            .field("Value", "data")
            .timestamp("Timestamp")
            .measurement("Measurement")
    }

    #[test]
    fn test_role_column_names() {
        let schema = sensor();

        assert_eq!(schema.role("SensorId").map(|r| r.column_name()), Some("sensor_id"));
        assert_eq!(schema.role("Value").map(|r| r.column_name()), Some("data"));
        assert_eq!(schema.role("Timestamp").map(|r| r.column_name()), Some("_time"));
        assert_eq!(
            schema.role("Measurement").map(|r| r.column_name()),
            Some("_measurement")
        );
        assert!(schema.role("Unknown").is_none());
    }

    #[test]
    fn test_registry_lookup() {
        let registry: SchemaRegistry = vec![sensor(), EntitySchema::new("Empty")]
            .into_iter()
            .collect();

        assert_eq!(registry.len(), 2);
        assert!(registry.get("Sensor").is_some());
        assert!(registry.get("Missing").is_none());
    }

    #[test]
    fn test_schema_deserialize() {
        let json = r#"{
            "name": "Sensor",
            "members": {
                "SensorId": { "role": "tag", "column": "sensor_id" },
                "Timestamp": { "role": "timestamp" }
            }
        }"#;

        let schema: EntitySchema = serde_json::from_str(json).unwrap();
        assert_eq!(schema.role("SensorId"), Some(&ColumnRole::Tag("sensor_id".to_string())));
        assert_eq!(schema.role("Timestamp"), Some(&ColumnRole::Timestamp));
    }

    #[test]
    fn test_registry_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SchemaRegistry>();
    }
}
