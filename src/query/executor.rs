//! Query Executor
//!
//! Runs a translated query through a `FluxTransport`:
//!
//! ```text
//! QueryModel → QueryVisitor → FluxQuery → FluxTransport → Vec<FluxRecord>
//! ```
//!
//! The transport (HTTP client, CSV decoding) lives outside this crate; the
//! executor only fixes the contract and the cardinality rules of single and
//! scalar results.

use crate::flux::FluxQuery;
use crate::query::error::{QueryError, QueryResult, TransportError};
use crate::query::model::QueryModel;
use crate::query::visitor::{QueryVisitor, TranslateOptions};
use crate::schema::SchemaRegistry;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Instant;
use tracing::info;

/// One result row, keyed by column name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FluxRecord {
    pub values: BTreeMap<String, serde_json::Value>,
}

impl FluxRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method: set a column value
    pub fn value(mut self, column: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.values.insert(column.into(), value.into());
        self
    }

    /// Get a value by column name
    pub fn get(&self, column: &str) -> Option<&serde_json::Value> {
        self.values.get(column)
    }
}

/// Executes Flux requests against a server
#[async_trait]
pub trait FluxTransport: Send + Sync {
    async fn query(&self, query: &FluxQuery, org: &str) -> Result<Vec<FluxRecord>, TransportError>;
}

/// Query executor bound to one bucket and organization
pub struct QueryExecutor<T: FluxTransport> {
    bucket: String,
    org: String,
    transport: Arc<T>,
    schemas: Arc<SchemaRegistry>,
    options: TranslateOptions,
}

impl<T: FluxTransport> QueryExecutor<T> {
    /// Create a new query executor
    pub fn new(
        bucket: impl Into<String>,
        org: impl Into<String>,
        transport: Arc<T>,
        schemas: Arc<SchemaRegistry>,
    ) -> Self {
        Self {
            bucket: bucket.into(),
            org: org.into(),
            transport,
            schemas,
            options: TranslateOptions::default(),
        }
    }

    /// Builder method: set translation options
    pub fn with_options(mut self, options: TranslateOptions) -> Self {
        self.options = options;
        self
    }

    /// Translate a model without executing it
    pub fn prepare(&self, model: &QueryModel) -> QueryResult<FluxQuery> {
        let translation =
            QueryVisitor::with_options(&self.bucket, &self.schemas, &self.options).translate(model)?;
        Ok(translation.into_flux_query())
    }

    /// Execute a query with a collection result
    pub async fn execute_collection(&self, model: &QueryModel) -> QueryResult<Vec<FluxRecord>> {
        let start = Instant::now();
        let query = self.prepare(model)?;

        let records = self.transport.query(&query, &self.org).await?;

        info!(
            entity = %model.from.entity,
            rows = records.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Executed Flux query"
        );
        Ok(records)
    }

    /// Execute a query that must produce at most one row
    ///
    /// With `return_default_when_empty`, an empty result yields `None`
    /// instead of an error.
    pub async fn execute_single(
        &self,
        model: &QueryModel,
        return_default_when_empty: bool,
    ) -> QueryResult<Option<FluxRecord>> {
        let mut records = self.execute_collection(model).await?;

        match records.len() {
            0 if return_default_when_empty => Ok(None),
            0 => Err(QueryError::NoElements),
            1 => Ok(records.pop()),
            _ => Err(QueryError::MoreThanOneElement),
        }
    }

    /// Execute a query ending in an aggregate, which yields exactly one row
    pub async fn execute_scalar(&self, model: &QueryModel) -> QueryResult<FluxRecord> {
        self.execute_single(model, false)
            .await?
            .ok_or(QueryError::NoElements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::error::TranslateError;
    use crate::query::model::Expr;
    use crate::schema::EntitySchema;
    use std::sync::Mutex;

    /// Returns canned rows and records every request
    struct MemoryTransport {
        rows: Vec<FluxRecord>,
        requests: Mutex<Vec<(FluxQuery, String)>>,
    }

    impl MemoryTransport {
        fn new(rows: Vec<FluxRecord>) -> Arc<Self> {
            Arc::new(Self {
                rows,
                requests: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl FluxTransport for MemoryTransport {
        async fn query(&self, query: &FluxQuery, org: &str) -> Result<Vec<FluxRecord>, TransportError> {
            self.requests
                .lock()
                .unwrap()
                .push((query.clone(), org.to_string()));
            Ok(self.rows.clone())
        }
    }

    struct FailingTransport;

    #[async_trait]
    impl FluxTransport for FailingTransport {
        async fn query(&self, _query: &FluxQuery, _org: &str) -> Result<Vec<FluxRecord>, TransportError> {
            Err(TransportError::new("connection refused"))
        }
    }

    fn schemas() -> Arc<SchemaRegistry> {
        Arc::new(SchemaRegistry::new().with(
            EntitySchema::new("Sensor")
                .tag("SensorId", "sensor_id")
                .field("Value", "data")
                .timestamp("Timestamp"),
        ))
    }

    fn row(sensor: &str, value: i64) -> FluxRecord {
        FluxRecord::new().value("sensor_id", sensor).value("data", value)
    }

    #[tokio::test]
    async fn test_execute_collection_sends_translation() {
        let transport = MemoryTransport::new(vec![row("id-1", 15), row("id-1", 28)]);
        let executor = QueryExecutor::new("my-bucket", "my-org", Arc::clone(&transport), schemas());

        let model = QueryModel::entity("Sensor")
            .filter(Expr::member("SensorId").equals(Expr::constant("id-1")))
            .build();
        let rows = executor.execute_collection(&model).await.unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].get("data"), Some(&serde_json::json!(28)));

        let requests = transport.requests.lock().unwrap();
        assert_eq!(requests.len(), 1);
        let (query, org) = &requests[0];
        assert_eq!(org, "my-org");
        assert!(query.query.ends_with(r#"|> filter(fn: (r) => (r["sensor_id"] == p3))"#));
        assert_eq!(query.extern_.body.len(), 3);
    }

    #[tokio::test]
    async fn test_translation_error_skips_transport() {
        let transport = MemoryTransport::new(Vec::new());
        let executor = QueryExecutor::new("my-bucket", "my-org", Arc::clone(&transport), schemas());

        let model = QueryModel::entity("Sensor").count().build();
        let result = executor.execute_collection(&model).await;

        assert!(matches!(
            result,
            Err(QueryError::Translate(TranslateError::UnsupportedOperator(_)))
        ));
        assert!(transport.requests.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_execute_single() {
        let model = QueryModel::entity("Sensor").take(1).build();

        let executor = QueryExecutor::new("b", "o", MemoryTransport::new(Vec::new()), schemas());
        assert!(executor.execute_single(&model, true).await.unwrap().is_none());
        assert!(matches!(
            executor.execute_single(&model, false).await,
            Err(QueryError::NoElements)
        ));

        let executor = QueryExecutor::new("b", "o", MemoryTransport::new(vec![row("id-1", 1)]), schemas());
        assert_eq!(
            executor.execute_single(&model, false).await.unwrap(),
            Some(row("id-1", 1))
        );

        let executor = QueryExecutor::new(
            "b",
            "o",
            MemoryTransport::new(vec![row("id-1", 1), row("id-2", 2)]),
            schemas(),
        );
        assert!(matches!(
            executor.execute_single(&model, true).await,
            Err(QueryError::MoreThanOneElement)
        ));
    }

    #[tokio::test]
    async fn test_execute_scalar_count() {
        let transport = MemoryTransport::new(vec![FluxRecord::new().value("linq_result_column", 8)]);
        let executor = QueryExecutor::new("my-bucket", "my-org", Arc::clone(&transport), schemas())
            .with_options(TranslateOptions {
                count_result_function: true,
                ..Default::default()
            });

        let model = QueryModel::entity("Sensor").count().build();
        let result = executor.execute_scalar(&model).await.unwrap();

        assert_eq!(result.get("linq_result_column"), Some(&serde_json::json!(8)));
        let requests = transport.requests.lock().unwrap();
        assert!(requests[0].0.query.contains("stateCount("));
    }

    #[tokio::test]
    async fn test_transport_error() {
        let executor = QueryExecutor::new("b", "o", Arc::new(FailingTransport), schemas());
        let model = QueryModel::entity("Sensor").build();

        let err = executor.execute_collection(&model).await.unwrap_err();
        assert_eq!(err.to_string(), "Transport error: connection refused");
    }
}
