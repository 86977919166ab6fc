//! Bound query types

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Serialize;

use crate::registry::{FilterStage, QueryTemplate};
use crate::schema::ParamValue;

/// A pipeline stage with concrete values
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum BoundStage {
    Search {
        collection: String,
        field: String,
        text: String,
    },
    /// `None` disables the versioning filter
    Temporal { ts: Option<i64> },
    Filter(FilterStage),
    Paginate { offset: u64, limit: u64 },
    /// `None` returns whole documents
    Project { select: Option<Vec<String>> },
}

/// A stored query ready to run, built per request
#[derive(Debug, Clone)]
pub struct BoundQuery {
    pub template: Arc<QueryTemplate>,
    pub bind_vars: BTreeMap<String, ParamValue>,
    pub stages: Vec<BoundStage>,
}

impl BoundQuery {
    pub fn name(&self) -> &str {
        self.template.name()
    }

    /// The search stage, always first
    pub fn search(&self) -> Option<(&str, &str, &str)> {
        self.stages.iter().find_map(|stage| match stage {
            BoundStage::Search {
                collection,
                field,
                text,
            } => Some((collection.as_str(), field.as_str(), text.as_str())),
            _ => None,
        })
    }

    /// Offset and limit, if the query paginates
    pub fn page(&self) -> Option<(u64, u64)> {
        self.stages.iter().find_map(|stage| match stage {
            BoundStage::Paginate { offset, limit } => Some((*offset, *limit)),
            _ => None,
        })
    }

    /// Bind vars as a JSON object
    pub fn bind_vars_json(&self) -> serde_json::Value {
        serde_json::Value::Object(
            self.bind_vars
                .iter()
                .map(|(k, v)| (k.clone(), v.to_json()))
                .collect(),
        )
    }
}
