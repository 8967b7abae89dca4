//! Pipeline Aggregator
//!
//! Collects the translated pieces of a query and renders them as a Flux
//! pipeline. Stage order is fixed:
//!
//! ```text
//! from → range → drop → pivot → filter → sort* → limit → result function
//! ```
//!
//! A stage without arguments is left out entirely, together with its
//! `|>` separator.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Columns dropped before pivoting when dropping is enabled
pub const DEFAULT_DROP_COLUMNS: [&str; 3] = ["_start", "_stop", "_measurement"];

/// Column that receives the result of a result function
pub const RESULT_COLUMN: &str = "linq_result_column";

const PIVOT_STAGE: &str =
    r#"pivot(rowKey:["_time"], columnKey: ["_field"], valueColumn: "_value")"#;

/// Terminal aggregate applied to the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultFunction {
    /// Return the matching rows
    #[default]
    None,
    /// Return the number of matching rows
    Count,
}

/// Accumulated pipeline state of one translation
#[derive(Debug, Default)]
pub struct PipelineAggregator {
    bucket: Option<String>,
    range_start: Option<String>,
    range_stop: Option<String>,
    drop_columns: Vec<String>,
    filters: Vec<String>,
    orders: Vec<(String, String)>,
    limit_count: Option<String>,
    limit_offset: Option<String>,
    result_function: ResultFunction,
}

impl PipelineAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_bucket(&mut self, bucket: impl Into<String>) {
        self.bucket = Some(bucket.into());
    }

    pub fn set_range_start(&mut self, start: impl Into<String>) {
        self.range_start = Some(start.into());
    }

    pub fn set_range_stop(&mut self, stop: impl Into<String>) {
        self.range_stop = Some(stop.into());
    }

    /// Columns removed ahead of the pivot; none by default
    pub fn set_drop_columns<I, S>(&mut self, columns: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.drop_columns = columns.into_iter().map(Into::into).collect();
    }

    /// Add a filter fragment; fragments are AND-joined
    pub fn add_filter(&mut self, filter: impl Into<String>) {
        self.filters.push(filter.into());
    }

    /// Add a sort key given its column and descending-flag parameters
    pub fn add_order(&mut self, column: impl Into<String>, descending: impl Into<String>) {
        self.orders.push((column.into(), descending.into()));
    }

    pub fn set_limit_count(&mut self, count: impl Into<String>) {
        self.limit_count = Some(count.into());
    }

    pub fn set_limit_offset(&mut self, offset: impl Into<String>) {
        self.limit_offset = Some(offset.into());
    }

    pub fn set_result_function(&mut self, function: ResultFunction) {
        self.result_function = function;
    }

    /// Render the Flux pipeline
    pub fn render(&self) -> String {
        let mut stages: Vec<String> = Vec::new();

        stages.extend(build_operator(
            "from",
            &[("bucket", self.bucket.as_deref().map(Argument::Value))],
        ));
        stages.extend(build_operator(
            "range",
            &[
                ("start", self.range_start.as_deref().map(Argument::Value)),
                ("stop", self.range_stop.as_deref().map(Argument::Value)),
            ],
        ));

        if !self.drop_columns.is_empty() {
            let columns: Vec<String> = self
                .drop_columns
                .iter()
                .map(|c| format!("{:?}", c))
                .collect();
            stages.extend(build_operator(
                "drop",
                &[("columns", Some(Argument::List(&columns)))],
            ));
        }

        stages.push(PIVOT_STAGE.to_string());
        stages.extend(self.build_filter());

        for (column, descending) in &self.orders {
            stages.extend(build_operator(
                "sort",
                &[
                    ("columns", Some(Argument::List(std::slice::from_ref(column)))),
                    ("desc", Some(Argument::Value(descending))),
                ],
            ));
        }

        match (&self.limit_count, &self.limit_offset) {
            (Some(count), offset) => stages.extend(build_operator(
                "limit",
                &[
                    ("n", Some(Argument::Value(count))),
                    ("offset", offset.as_deref().map(Argument::Value)),
                ],
            )),
            (None, Some(offset)) => {
                // Flux has no offset-only limit; the offset is not applied.
                warn!(offset = %offset, "Skip without Take: offset is dropped from the pipeline");
            }
            (None, None) => {}
        }

        if self.result_function == ResultFunction::Count {
            stages.push(format!(
                r#"stateCount(fn: (r) => true, column: "{}")"#,
                RESULT_COLUMN
            ));
            stages.push(format!(r#"last(column: "{}")"#, RESULT_COLUMN));
            stages.push(format!(r#"keep(columns: ["{}"])"#, RESULT_COLUMN));
        }

        let query = stages.join(" |> ");
        debug!(stages = stages.len(), query = %query, "Rendered Flux pipeline");
        query
    }

    /// `filter(fn: (r) => (<f1>) and (<f2>) ...)`, or nothing
    fn build_filter(&self) -> Option<String> {
        let fragments: Vec<String> = self
            .filters
            .iter()
            .filter(|f| !f.is_empty())
            .map(|f| format!("({})", f))
            .collect();

        if fragments.is_empty() {
            return None;
        }

        Some(format!("filter(fn: (r) => {})", fragments.join(" and ")))
    }
}

/// Argument value of a pipeline stage
#[derive(Debug, Clone, Copy)]
enum Argument<'a> {
    Value(&'a str),
    List(&'a [String]),
}

/// `name(arg1: v1, arg2: [a, b])`, skipping absent arguments
///
/// Returns `None` when every argument is absent.
fn build_operator(name: &str, arguments: &[(&str, Option<Argument<'_>>)]) -> Option<String> {
    let rendered: Vec<String> = arguments
        .iter()
        .filter_map(|(key, value)| {
            value.map(|value| match value {
                Argument::Value(v) => format!("{}: {}", key, v),
                Argument::List(items) => format!("{}: [{}]", key, items.join(", ")),
            })
        })
        .collect();

    if rendered.is_empty() {
        return None;
    }

    Some(format!("{}({})", name, rendered.join(", ")))
}
