//! Stored query service
//!
//! Request flow (strict order):
//! 1. Resolve the template by name
//! 2. Validate parameters against its schema
//! 3. Bind parameters onto the pipeline
//! 4. Execute under a deadline
//!
//! Steps 1-3 never touch the store; any failure there is a rejection.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::errors::{ServiceError, ServiceResult};
use crate::binder::{BoundQuery, ParamBinder};
use crate::executor::{DocumentStore, QueryExecutor, ResultSet};
use crate::observability::{MetricsSnapshot, QueryMetrics, QueryScope};
use crate::registry::{RegistryResult, RegistrySnapshot, TemplateRegistry};
use crate::schema::ParamValidator;

/// Default execution deadline
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_millis(30_000);

/// Listing entry for a registered stored query
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemplateSummary {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: Vec<String>,
}

/// Lists the templates of a snapshot in name order
pub fn summarize(snapshot: &RegistrySnapshot) -> Vec<TemplateSummary> {
    snapshot
        .names()
        .into_iter()
        .filter_map(|name| snapshot.get(&name))
        .map(|template| TemplateSummary {
            name: template.name().to_string(),
            description: template.description().map(str::to_string),
            required: template.params().required.clone(),
        })
        .collect()
}

/// Facade over registry, validator, binder and executor
pub struct QueryService {
    registry: Arc<TemplateRegistry>,
    executor: QueryExecutor,
    metrics: Arc<QueryMetrics>,
    timeout: Duration,
}

impl QueryService {
    pub fn new(registry: Arc<TemplateRegistry>, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            registry,
            executor: QueryExecutor::new(store),
            metrics: Arc::new(QueryMetrics::new()),
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn registry(&self) -> &Arc<TemplateRegistry> {
        &self.registry
    }

    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Executes a stored query under the service deadline
    pub async fn execute(&self, name: &str, params: &Value) -> ServiceResult<ResultSet> {
        self.execute_with_timeout(name, params, self.timeout).await
    }

    /// Executes a stored query under an explicit deadline
    pub async fn execute_with_timeout(
        &self,
        name: &str,
        params: &Value,
        timeout: Duration,
    ) -> ServiceResult<ResultSet> {
        let scope = QueryScope::start(name);

        let bound = match self.prepare(name, params) {
            Ok(bound) => bound,
            Err(err) => {
                self.record_prepare_failure(scope, &err);
                return Err(err);
            }
        };

        match self.executor.run_with_timeout(&bound, timeout).await {
            Ok(result) => {
                self.metrics
                    .record_executed(result.stats.returned, result.stats.scanned);
                scope.complete(result.stats.returned, result.stats.scanned);
                Ok(result)
            }
            Err(err) => {
                let timed_out = err.is_timeout();
                if timed_out {
                    self.metrics.increment_timed_out();
                } else {
                    self.metrics.increment_failed();
                }
                let err = ServiceError::from(err);
                scope.fail(err.code(), err.message(), timed_out);
                Err(err)
            }
        }
    }

    /// Caller errors count as rejected; internal faults count as failed
    fn record_prepare_failure(&self, scope: QueryScope, err: &ServiceError) {
        if err.kind().is_rejection() {
            self.metrics.increment_rejected();
            scope.reject(err.code(), err.message());
        } else {
            self.metrics.increment_failed();
            scope.fail(err.code(), err.message(), false);
        }
    }

    /// Resolves, validates and binds without executing
    pub fn prepare(&self, name: &str, params: &Value) -> ServiceResult<BoundQuery> {
        let template = self.registry.resolve(name)?;
        let validated = ParamValidator::validate(params, template.params())?;
        Ok(ParamBinder::bind(validated, &template)?)
    }

    /// Registered stored queries in name order
    pub fn list(&self) -> ServiceResult<Vec<TemplateSummary>> {
        Ok(summarize(&*self.registry.snapshot()?))
    }

    /// Replaces every registered template at once
    pub fn reload(&self, snapshot: RegistrySnapshot) -> RegistryResult<()> {
        self.registry.reload(snapshot)
    }
}
