//! Execution pipeline declared by a stored query
//!
//! Stages run in a fixed order:
//! 1. search   (exactly one, always first)
//! 2. temporal (at most one)
//! 3. filter   (any number)
//! 4. paginate (at most one)
//! 5. project  (at most one)
//!
//! Stage fields name the parameters that feed them; values are bound per
//! request. There is no sort stage: results keep the store's relevance order.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Fulltext search over a collection field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchStage {
    /// Collection-reference parameter (e.g. "@taxon_coll")
    pub collection: String,
    /// Parameter holding the indexed field name
    pub field: String,
    /// Parameter holding the caller's search text
    pub text: String,
}

/// Versioning timestamp filter: `created <= ts AND expired >= ts`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalStage {
    pub ts: String,
}

/// A single document condition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Condition {
    /// Attribute equals one of the listed values
    In {
        field: String,
        #[serde(rename = "in")]
        values: Vec<Value>,
    },
    /// Attribute is truthy (or falsy when `truthy: false`)
    Truthy { field: String, truthy: bool },
}

impl Condition {
    pub fn one_of(field: impl Into<String>, values: Vec<Value>) -> Self {
        Condition::In {
            field: field.into(),
            values,
        }
    }

    pub fn truthy(field: impl Into<String>) -> Self {
        Condition::Truthy {
            field: field.into(),
            truthy: true,
        }
    }
}

/// Fixed document predicate: passes when any condition holds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterStage {
    pub any_of: Vec<Condition>,
}

fn default_limit_fallback() -> u64 {
    20
}

/// Skip/take window. Falsy parameter values use the fallbacks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginateStage {
    pub offset: String,
    pub limit: String,
    #[serde(default)]
    pub offset_fallback: u64,
    #[serde(default = "default_limit_fallback")]
    pub limit_fallback: u64,
}

/// Attribute projection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectStage {
    pub select: String,
}

/// One pipeline stage, tagged by its `stage` key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "stage", rename_all = "snake_case")]
pub enum StageDef {
    Search(SearchStage),
    Temporal(TemporalStage),
    Filter(FilterStage),
    Paginate(PaginateStage),
    Project(ProjectStage),
}

impl StageDef {
    /// Position in the fixed stage order
    fn rank(&self) -> u8 {
        match self {
            StageDef::Search(_) => 0,
            StageDef::Temporal(_) => 1,
            StageDef::Filter(_) => 2,
            StageDef::Paginate(_) => 3,
            StageDef::Project(_) => 4,
        }
    }

    pub fn stage_name(&self) -> &'static str {
        match self {
            StageDef::Search(_) => "search",
            StageDef::Temporal(_) => "temporal",
            StageDef::Filter(_) => "filter",
            StageDef::Paginate(_) => "paginate",
            StageDef::Project(_) => "project",
        }
    }

    /// Parameters this stage reads
    pub fn param_refs(&self) -> Vec<&str> {
        match self {
            StageDef::Search(s) => vec![s.collection.as_str(), s.field.as_str(), s.text.as_str()],
            StageDef::Temporal(t) => vec![t.ts.as_str()],
            StageDef::Filter(_) => Vec::new(),
            StageDef::Paginate(p) => vec![p.offset.as_str(), p.limit.as_str()],
            StageDef::Project(p) => vec![p.select.as_str()],
        }
    }
}

/// Ordered stage list of a stored query
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct QueryPipeline {
    stages: Vec<StageDef>,
}

impl QueryPipeline {
    pub fn new(stages: Vec<StageDef>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[StageDef] {
        &self.stages
    }

    pub fn search(&self) -> Option<&SearchStage> {
        self.stages.iter().find_map(|stage| match stage {
            StageDef::Search(s) => Some(s),
            _ => None,
        })
    }

    /// Checks stage order and multiplicity.
    pub fn validate_structure(&self) -> Result<(), String> {
        match self.stages.first() {
            None => return Err("pipeline has no stages".into()),
            Some(StageDef::Search(_)) => {}
            Some(other) => {
                return Err(format!(
                    "pipeline must start with a search stage, found '{}'",
                    other.stage_name()
                ))
            }
        }

        for pair in self.stages.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            if next.rank() < prev.rank() {
                return Err(format!(
                    "stage '{}' cannot follow '{}'",
                    next.stage_name(),
                    prev.stage_name()
                ));
            }
            if next.rank() == prev.rank() && !matches!(next, StageDef::Filter(_)) {
                return Err(format!("stage '{}' declared twice", next.stage_name()));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn search() -> StageDef {
        StageDef::Search(SearchStage {
            collection: "@taxon_coll".into(),
            field: "sciname_field".into(),
            text: "search_text".into(),
        })
    }

    fn paginate() -> StageDef {
        StageDef::Paginate(PaginateStage {
            offset: "offset".into(),
            limit: "limit".into(),
            offset_fallback: 0,
            limit_fallback: 20,
        })
    }

    #[test]
    fn test_parse_yaml_pipeline() {
        let yaml = r#"
- stage: search
  collection: "@taxon_coll"
  field: sciname_field
  text: search_text
- stage: temporal
  ts: ts
- stage: filter
  any_of:
    - {field: rank, in: [species, strain]}
    - {field: strain, truthy: true}
- stage: paginate
  offset: offset
  limit: limit
- stage: project
  select: select
"#;
        let pipeline: QueryPipeline = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(pipeline.stages().len(), 5);
        assert!(pipeline.validate_structure().is_ok());

        match &pipeline.stages()[2] {
            StageDef::Filter(f) => {
                assert_eq!(
                    f.any_of[0],
                    Condition::one_of("rank", vec![json!("species"), json!("strain")])
                );
                assert_eq!(f.any_of[1], Condition::truthy("strain"));
            }
            other => panic!("expected filter, got {:?}", other),
        }
        match &pipeline.stages()[3] {
            StageDef::Paginate(p) => {
                assert_eq!(p.offset_fallback, 0);
                assert_eq!(p.limit_fallback, 20);
            }
            other => panic!("expected paginate, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_pipeline_rejected() {
        assert!(QueryPipeline::default().validate_structure().is_err());
    }

    #[test]
    fn test_search_must_come_first() {
        let pipeline = QueryPipeline::new(vec![paginate(), search()]);
        let err = pipeline.validate_structure().unwrap_err();
        assert!(err.contains("search"));
    }

    #[test]
    fn test_duplicate_paginate_rejected() {
        let pipeline = QueryPipeline::new(vec![search(), paginate(), paginate()]);
        assert!(pipeline.validate_structure().unwrap_err().contains("twice"));
    }

    #[test]
    fn test_multiple_filters_allowed() {
        let filter = StageDef::Filter(FilterStage {
            any_of: vec![Condition::truthy("strain")],
        });
        let pipeline = QueryPipeline::new(vec![search(), filter.clone(), filter, paginate()]);
        assert!(pipeline.validate_structure().is_ok());
    }
}
