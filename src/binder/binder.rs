//! Binds validated parameters onto a template's pipeline

use std::collections::BTreeMap;
use std::sync::{Arc, OnceLock};

use regex::Regex;

use super::bound::{BoundQuery, BoundStage};
use crate::registry::{QueryTemplate, StageDef};
use crate::schema::{ParamValue, SchemaResult, ValidatedParams, ValidationError};

const COLLECTION_NAME: &str = "collection name ([A-Za-z_][A-Za-z0-9_-]{0,255})";

fn collection_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_-]{0,255}$").expect("collection pattern is valid")
    })
}

/// Binds validated parameters to a stored query.
pub struct ParamBinder;

impl ParamBinder {
    /// Builds the per-request bound query.
    ///
    /// Values are carried as bind vars only; nothing is spliced into the
    /// query text.
    pub fn bind(validated: ValidatedParams, template: &Arc<QueryTemplate>) -> SchemaResult<BoundQuery> {
        for (key, value) in validated.iter() {
            if template.is_collection_param(key) {
                Self::check_collection(key, value)?;
            }
        }

        let stages = template
            .pipeline()
            .stages()
            .iter()
            .map(|stage| Self::bind_stage(stage, &validated))
            .collect::<SchemaResult<Vec<_>>>()?;

        let bind_vars: BTreeMap<String, ParamValue> = validated.into_inner();

        Ok(BoundQuery {
            template: Arc::clone(template),
            bind_vars,
            stages,
        })
    }

    fn bind_stage(stage: &StageDef, params: &ValidatedParams) -> SchemaResult<BoundStage> {
        Ok(match stage {
            StageDef::Search(s) => BoundStage::Search {
                collection: Self::string(params, &s.collection)?,
                field: Self::string(params, &s.field)?,
                text: Self::string(params, &s.text)?,
            },
            StageDef::Temporal(t) => BoundStage::Temporal {
                ts: match params.get(&t.ts) {
                    None | Some(ParamValue::Null) => None,
                    Some(value) => Some(value.as_i64().ok_or_else(|| {
                        ValidationError::type_mismatch(&t.ts, "integer | null", value.type_name())
                    })?),
                },
            },
            StageDef::Filter(f) => BoundStage::Filter(f.clone()),
            StageDef::Paginate(p) => BoundStage::Paginate {
                offset: Self::count_or(params, &p.offset, p.offset_fallback)?,
                limit: Self::count_or(params, &p.limit, p.limit_fallback)?,
            },
            StageDef::Project(p) => BoundStage::Project {
                select: Self::selection(params, &p.select)?,
            },
        })
    }

    fn check_collection(key: &str, value: &ParamValue) -> SchemaResult<()> {
        match value.as_str() {
            Some(name) if collection_regex().is_match(name) => Ok(()),
            Some(name) => Err(ValidationError::type_mismatch(key, COLLECTION_NAME, name)),
            None => Err(ValidationError::type_mismatch(
                key,
                COLLECTION_NAME,
                value.type_name(),
            )),
        }
    }

    fn string(params: &ValidatedParams, key: &str) -> SchemaResult<String> {
        match params.get(key) {
            Some(ParamValue::String(s)) => Ok(s.clone()),
            Some(other) => Err(ValidationError::type_mismatch(key, "string", other.type_name())),
            None => Err(ValidationError::missing_parameter(key)),
        }
    }

    /// Falsy values (absent, null, 0) take the fallback.
    fn count_or(params: &ValidatedParams, key: &str, fallback: u64) -> SchemaResult<u64> {
        match params.get(key) {
            Some(value) if value.is_truthy() => match value.as_i64() {
                Some(n) if n > 0 => Ok(n as u64),
                Some(n) => Err(ValidationError::out_of_range(key, ">= 0", n.to_string())),
                None => Err(ValidationError::type_mismatch(
                    key,
                    "integer | null",
                    value.type_name(),
                )),
            },
            _ => Ok(fallback),
        }
    }

    fn selection(params: &ValidatedParams, key: &str) -> SchemaResult<Option<Vec<String>>> {
        match params.get(key) {
            None | Some(ParamValue::Null) => Ok(None),
            Some(ParamValue::String(s)) => Ok(Some(vec![s.clone()])),
            Some(ParamValue::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(i, item)| {
                    item.as_str().map(str::to_string).ok_or_else(|| {
                        ValidationError::type_mismatch(
                            format!("{}[{}]", key, i),
                            "string",
                            item.type_name(),
                        )
                    })
                })
                .collect::<SchemaResult<Vec<_>>>()
                .map(Some),
            Some(other) => Err(ValidationError::type_mismatch(
                key,
                "string | array | null",
                other.type_name(),
            )),
        }
    }
}
