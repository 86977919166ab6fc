//! Stored query templates
//!
//! A template couples a parameter schema, a query body with named
//! placeholders, and the pipeline that executes it.
//!
//! Placeholders:
//! - `@name`  binds a value, declared in the schema as `name`
//! - `@@name` binds a collection reference, keyed `@name`
//!
//! Collection references missing from the schema are added as required
//! string parameters. Value placeholders must be declared.

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use super::errors::{RegistryError, RegistryResult};
use super::pipeline::QueryPipeline;
use crate::schema::{ParamDef, ParamSchema};

/// Placeholder kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderKind {
    Value,
    Collection,
}

/// A placeholder found in a query body
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Placeholder {
    pub kind: PlaceholderKind,
    /// Name as written after the marker
    pub name: String,
}

impl Placeholder {
    /// Parameter key the placeholder binds to
    pub fn param_key(&self) -> String {
        match self.kind {
            PlaceholderKind::Value => self.name.clone(),
            PlaceholderKind::Collection => format!("@{}", self.name),
        }
    }
}

fn placeholder_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:^|[^A-Za-z0-9_@])(@@?)([A-Za-z_][A-Za-z0-9_]*)")
            .expect("placeholder pattern is valid")
    })
}

/// Extracts the distinct placeholders of a query body.
pub fn extract_placeholders(query: &str) -> BTreeSet<Placeholder> {
    placeholder_regex()
        .captures_iter(query)
        .map(|caps| Placeholder {
            kind: if &caps[1] == "@@" {
                PlaceholderKind::Collection
            } else {
                PlaceholderKind::Value
            },
            name: caps[2].to_string(),
        })
        .collect()
}

/// Template definition file format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub params: ParamSchema,
    pub query: String,
    #[serde(default)]
    pub pipeline: QueryPipeline,
}

/// An immutable, registered stored query
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTemplate {
    name: String,
    description: Option<String>,
    params: ParamSchema,
    query: String,
    pipeline: QueryPipeline,
    placeholders: BTreeSet<Placeholder>,
}

impl QueryTemplate {
    /// Builds a template, checking that every placeholder and stage
    /// parameter is declared.
    pub fn new(
        name: impl Into<String>,
        params: ParamSchema,
        query: impl Into<String>,
        pipeline: QueryPipeline,
    ) -> RegistryResult<Self> {
        let name = name.into();
        let query = query.into();
        let mut params = params;

        if name.trim().is_empty() {
            return Err(RegistryError::invalid("<unnamed>", "template name is empty"));
        }

        let placeholders = extract_placeholders(&query);

        for placeholder in &placeholders {
            let key = placeholder.param_key();
            match placeholder.kind {
                PlaceholderKind::Collection => {
                    if !params.declares(&key) {
                        params = params.required_property(key, ParamDef::string());
                    }
                }
                PlaceholderKind::Value => {
                    if !params.declares(&key) {
                        return Err(RegistryError::invalid(
                            &name,
                            format!("placeholder '@{}' has no parameter declaration", key),
                        ));
                    }
                }
            }
        }

        for required in &params.required {
            if !params.declares(required) && !params.additional_properties {
                return Err(RegistryError::invalid(
                    &name,
                    format!("required parameter '{}' is not declared", required),
                ));
            }
        }

        pipeline
            .validate_structure()
            .map_err(|reason| RegistryError::invalid(&name, reason))?;

        for stage in pipeline.stages() {
            for param in stage.param_refs() {
                if !params.declares(param) {
                    return Err(RegistryError::invalid(
                        &name,
                        format!(
                            "{} stage reads undeclared parameter '{}'",
                            stage.stage_name(),
                            param
                        ),
                    ));
                }
            }
        }

        if let Some(search) = pipeline.search() {
            if !search.collection.starts_with('@') {
                return Err(RegistryError::invalid(
                    &name,
                    format!(
                        "search collection '{}' must be a collection reference",
                        search.collection
                    ),
                ));
            }
        }

        Ok(Self {
            name,
            description: None,
            params,
            query,
            pipeline,
            placeholders,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn params(&self) -> &ParamSchema {
        &self.params
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn pipeline(&self) -> &QueryPipeline {
        &self.pipeline
    }

    pub fn placeholders(&self) -> &BTreeSet<Placeholder> {
        &self.placeholders
    }

    /// Returns true if `key` binds a collection reference
    pub fn is_collection_param(&self, key: &str) -> bool {
        self.placeholders
            .iter()
            .any(|p| p.kind == PlaceholderKind::Collection && p.param_key() == key)
            || self
                .pipeline
                .search()
                .map_or(false, |search| search.collection == key)
    }
}

impl TryFrom<TemplateDefinition> for QueryTemplate {
    type Error = RegistryError;

    fn try_from(def: TemplateDefinition) -> RegistryResult<Self> {
        let template = QueryTemplate::new(def.name, def.params, def.query, def.pipeline)?;
        Ok(match def.description {
            Some(description) => template.with_description(description),
            None => template,
        })
    }
}
