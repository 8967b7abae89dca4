//! Query Visitor
//!
//! Walks a `QueryModel` in a single pass and drives translation:
//!
//! ```text
//! init        → p1 = bucket, p2 = range start (0)
//! from        → pick the entity schema
//! where       → ExpressionCompiler → add_filter
//! orderby     → column name + descending flag → add_order
//! select      → projected members must resolve
//! Take / Skip → limit count / offset
//! ```
//!
//! The first error aborts the walk; no output is produced for a query that
//! did not translate completely.

use crate::flux::{File, FluxQuery};
use crate::query::aggregator::{PipelineAggregator, ResultFunction};
use crate::query::error::{TranslateError, TranslateResult};
use crate::query::expression::ExpressionCompiler;
use crate::query::model::{BodyClause, Expr, Ordering, QueryModel, ResultOperator, SelectClause};
use crate::query::variables::VariableRegistry;
use crate::schema::{EntitySchema, SchemaRegistry, SchemaResolver};
use serde::Deserialize;
use tracing::{debug, instrument};

/// Knobs that change the shape of the generated pipeline
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslateOptions {
    /// Columns to drop ahead of the pivot (empty: no `drop` stage)
    #[serde(default)]
    pub drop_columns: Vec<String>,

    /// Translate `Count()` into a counting result function instead of
    /// rejecting it
    #[serde(default)]
    pub count_result_function: bool,

    /// Upper bound of the range, in seconds since the epoch
    #[serde(default)]
    pub range_stop: Option<i64>,
}

/// Output of a successful translation
#[derive(Debug, Clone, PartialEq)]
pub struct Translation {
    /// Flux source
    pub query: String,
    /// Parameter bindings
    pub ast: File,
}

impl Translation {
    /// Request payload for the query endpoint
    pub fn into_flux_query(self) -> FluxQuery {
        FluxQuery::new(self.query, self.ast)
    }
}

/// Translate a query model against registered schemas
pub fn translate(
    model: &QueryModel,
    schemas: &SchemaRegistry,
    bucket: &str,
) -> TranslateResult<Translation> {
    QueryVisitor::new(bucket, schemas).translate(model)
}

/// Translator state for one query
pub struct QueryVisitor<'s> {
    schemas: &'s SchemaRegistry,
    entity: Option<&'s EntitySchema>,
    variables: VariableRegistry,
    pipeline: PipelineAggregator,
    count_result_function: bool,
}

impl<'s> QueryVisitor<'s> {
    /// Create a visitor with default options
    pub fn new(bucket: &str, schemas: &'s SchemaRegistry) -> Self {
        Self::with_options(bucket, schemas, &TranslateOptions::default())
    }

    /// Create a visitor; registers the bucket and range parameters
    pub fn with_options(bucket: &str, schemas: &'s SchemaRegistry, options: &TranslateOptions) -> Self {
        let mut variables = VariableRegistry::new();
        let mut pipeline = PipelineAggregator::new();

        pipeline.set_bucket(variables.add_named(bucket));
        pipeline.set_range_start(variables.add_named(0));
        if let Some(stop) = options.range_stop {
            pipeline.set_range_stop(variables.add_named(stop));
        }
        pipeline.set_drop_columns(options.drop_columns.iter().cloned());

        Self {
            schemas,
            entity: None,
            variables,
            pipeline,
            count_result_function: options.count_result_function,
        }
    }

    /// Visit every clause of the model and render the result
    #[instrument(level = "debug", skip_all, fields(entity = %model.from.entity))]
    pub fn translate(mut self, model: &QueryModel) -> TranslateResult<Translation> {
        self.visit_main_from_clause(&model.from.entity)?;

        for clause in &model.body {
            match clause {
                BodyClause::Where { predicate } => self.visit_where_clause(predicate)?,
                BodyClause::OrderBy { orderings } => self.visit_order_by_clause(orderings)?,
            }
        }

        self.visit_select_clause(&model.select)?;

        for operator in &model.result_operators {
            self.visit_result_operator(operator)?;
        }

        let translation = Translation {
            query: self.pipeline.render(),
            ast: File::new(self.variables.statements()),
        };
        debug!(parameters = self.variables.len(), "Translated query");
        Ok(translation)
    }

    fn visit_main_from_clause(&mut self, entity: &str) -> TranslateResult<()> {
        let schema = self
            .schemas
            .get(entity)
            .ok_or_else(|| TranslateError::UnknownEntity(entity.to_string()))?;
        self.entity = Some(schema);
        Ok(())
    }

    fn visit_where_clause(&mut self, predicate: &Expr) -> TranslateResult<()> {
        let filter = self.compile(predicate)?;
        debug!(filter = %filter, "Compiled where clause");
        self.pipeline.add_filter(filter);
        Ok(())
    }

    fn visit_order_by_clause(&mut self, orderings: &[Ordering]) -> TranslateResult<()> {
        for ordering in orderings {
            let member = match &ordering.expr {
                Expr::Member { name } => name,
                other => {
                    return Err(TranslateError::UnsupportedExpression(
                        other.kind().to_string(),
                    ))
                }
            };

            let column = self.resolver()?.resolve(member)?;
            let column_param = self.variables.add_named(column.name());
            let desc_param = self
                .variables
                .add_named(ordering.direction.is_descending());
            self.pipeline.add_order(column_param, desc_param);
        }
        Ok(())
    }

    fn visit_select_clause(&mut self, select: &SelectClause) -> TranslateResult<()> {
        if let SelectClause::Members { members } = select {
            let resolver = self.resolver()?;
            for member in members {
                resolver.resolve(member)?;
            }
        }
        Ok(())
    }

    fn visit_result_operator(&mut self, operator: &ResultOperator) -> TranslateResult<()> {
        match operator {
            ResultOperator::Take { count } => {
                let count = self.compile(count)?;
                self.pipeline.set_limit_count(count);
            }
            ResultOperator::Skip { count } => {
                let offset = self.compile(count)?;
                self.pipeline.set_limit_offset(offset);
            }
            ResultOperator::Count if self.count_result_function => {
                self.pipeline.set_result_function(ResultFunction::Count);
            }
            other => {
                return Err(TranslateError::UnsupportedOperator(
                    other.name().to_string(),
                ))
            }
        }
        Ok(())
    }

    fn resolver(&self) -> TranslateResult<SchemaResolver<'s>> {
        // The from clause is always visited first.
        self.entity
            .map(SchemaResolver::new)
            .ok_or_else(|| TranslateError::UnknownEntity(String::new()))
    }

    fn compile(&mut self, expr: &Expr) -> TranslateResult<String> {
        let resolver = self.resolver()?;
        ExpressionCompiler::new(resolver, &mut self.variables).compile(expr)
    }
}
