//! Parameter validator for stored queries
//!
//! Validation semantics:
//! - Params must be an object
//! - Undeclared params rejected when additionalProperties is false
//! - Required params must be present
//! - Absent optional params take the declared default (null when none)
//! - Values must match the declared type union
//! - Array-typed params accept a single scalar, normalized to a one-element array
//! - maximum / minimum / enum are enforced on non-null values
//!
//! The validator never touches the store and never mutates its input.

use serde_json::Value;

use super::errors::{SchemaResult, ValidationError};
use super::types::{ParamDef, ParamSchema, ParamType, ParamValue, ValidatedParams};

/// Validates caller parameters against a stored query's parameter schema.
pub struct ParamValidator;

impl ParamValidator {
    /// Validates a parameter object against a schema.
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` with one of:
    /// - SQ_UNKNOWN_PARAMETER for undeclared keys (when disallowed)
    /// - SQ_MISSING_PARAMETER for absent required keys
    /// - SQ_TYPE_MISMATCH for values outside the declared type union
    /// - SQ_OUT_OF_RANGE for maximum, minimum and enum violations
    pub fn validate(params: &Value, schema: &ParamSchema) -> SchemaResult<ValidatedParams> {
        let obj = params.as_object().ok_or_else(|| {
            ValidationError::type_mismatch("$root", "object", json_type_name(params))
        })?;

        if !schema.additional_properties {
            if let Some(key) = obj.keys().find(|key| !schema.declares(key)) {
                return Err(ValidationError::unknown_parameter(key.as_str()));
            }
        }

        for name in &schema.required {
            if !obj.contains_key(name) {
                return Err(ValidationError::missing_parameter(name.as_str()));
            }
        }

        let mut validated = ValidatedParams::new();

        for (name, value) in obj {
            let checked = match schema.properties.get(name) {
                Some(def) => Self::check_value(name, value, def)?,
                None => ParamValue::from(value),
            };
            validated.insert(name.as_str(), checked);
        }

        for (name, def) in &schema.properties {
            if !validated.contains(name) {
                validated.insert(name.as_str(), ParamValue::from(&def.default_value()));
            }
        }

        Ok(validated)
    }

    /// Validates a single value against its definition.
    fn check_value(path: &str, value: &Value, def: &ParamDef) -> SchemaResult<ParamValue> {
        if def.types.is_any() {
            Self::check_constraints(path, value, def)?;
            return Ok(ParamValue::from(value));
        }

        if def.types.contains(ParamType::Array) {
            match value {
                Value::Array(items) => return Self::check_items(path, items, def),
                Value::Null | Value::Object(_) => {}
                scalar => {
                    let item_ok = def
                        .items
                        .as_deref()
                        .map_or(true, |item| item.types.is_any() || item.types.matching(scalar).is_some());
                    if item_ok {
                        return Self::check_items(path, std::slice::from_ref(scalar), def);
                    }
                }
            }
        }

        if def.types.matching(value).is_none() {
            return Err(ValidationError::type_mismatch(
                path,
                def.types.describe(),
                json_type_name(value),
            ));
        }

        Self::check_constraints(path, value, def)?;
        Ok(ParamValue::from(value))
    }

    /// Validates array elements against the `items` definition.
    fn check_items(path: &str, items: &[Value], def: &ParamDef) -> SchemaResult<ParamValue> {
        let checked = items
            .iter()
            .enumerate()
            .map(|(i, elem)| {
                let elem_path = format!("{}[{}]", path, i);
                match def.items.as_deref() {
                    Some(item_def) => Self::check_value(&elem_path, elem, item_def),
                    None => Ok(ParamValue::from(elem)),
                }
            })
            .collect::<SchemaResult<Vec<_>>>()?;
        Ok(ParamValue::Array(checked))
    }

    /// Enforces maximum, minimum and enum on non-null values.
    fn check_constraints(path: &str, value: &Value, def: &ParamDef) -> SchemaResult<()> {
        if value.is_null() {
            return Ok(());
        }

        if value.is_u64() && !value.is_i64() {
            return Err(ValidationError::out_of_range(
                path,
                format!("<= {}", i64::MAX),
                value.to_string(),
            ));
        }

        if let Some(n) = value.as_f64() {
            if let Some(max) = def.maximum {
                if n > max {
                    return Err(ValidationError::out_of_range(
                        path,
                        format!("<= {}", format_bound(max)),
                        value.to_string(),
                    ));
                }
            }
            if let Some(min) = def.minimum {
                if n < min {
                    return Err(ValidationError::out_of_range(
                        path,
                        format!(">= {}", format_bound(min)),
                        value.to_string(),
                    ));
                }
            }
        }

        if let Some(allowed) = &def.allowed {
            if !allowed.contains(value) {
                let expected = allowed
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                return Err(ValidationError::out_of_range(
                    path,
                    format!("one of [{}]", expected),
                    value.to_string(),
                ));
            }
        }

        Ok(())
    }
}

/// Returns the JSON type name for error messages.
pub(crate) fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) => {
            if n.is_i64() || n.is_u64() {
                "integer"
            } else {
                "number"
            }
        }
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Prints integral bounds without a trailing ".0"
fn format_bound(bound: f64) -> String {
    if bound.fract() == 0.0 && bound.abs() < 1e15 {
        format!("{}", bound as i64)
    } else {
        format!("{}", bound)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationErrorCode;
    use serde_json::json;

    fn taxonomy_schema() -> ParamSchema {
        ParamSchema::new()
            .required_property("@taxon_coll", ParamDef::string())
            .required_property("sciname_field", ParamDef::string())
            .required_property("search_text", ParamDef::string())
            .property("ts", ParamDef::nullable_integer())
            .property(
                "offset",
                ParamDef::nullable_integer()
                    .with_default(json!(0))
                    .with_maximum(100000.0),
            )
            .property(
                "limit",
                ParamDef::nullable_integer()
                    .with_default(json!(20))
                    .with_maximum(1000.0),
            )
            .property("select", ParamDef::string_or_list())
            .deny_additional()
    }

    fn base_params() -> Value {
        json!({
            "@taxon_coll": "ncbi_taxon",
            "sciname_field": "scientific_name",
            "search_text": "escherichia"
        })
    }

    #[test]
    fn test_valid_params_pass_with_defaults() {
        let validated = ParamValidator::validate(&base_params(), &taxonomy_schema()).unwrap();

        assert_eq!(validated.get("offset"), Some(&ParamValue::Integer(0)));
        assert_eq!(validated.get("limit"), Some(&ParamValue::Integer(20)));
        assert_eq!(validated.get("ts"), Some(&ParamValue::Null));
        assert_eq!(validated.get("select"), Some(&ParamValue::Null));
    }

    #[test]
    fn test_missing_required_param_fails() {
        let params = json!({"@taxon_coll": "ncbi_taxon", "sciname_field": "scientific_name"});

        let err = ParamValidator::validate(&params, &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::MissingParameter);
        assert_eq!(err.details().param, "search_text");
    }

    #[test]
    fn test_unknown_param_fails() {
        let mut params = base_params();
        params["foo"] = json!("bar");

        let err = ParamValidator::validate(&params, &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::UnknownParameter);
        assert_eq!(err.details().param, "foo");
    }

    #[test]
    fn test_unknown_param_allowed_when_additional_properties() {
        let schema = ParamSchema::new().property("a", ParamDef::string());
        let validated = ParamValidator::validate(&json!({"b": 1}), &schema).unwrap();
        assert_eq!(validated.get("b"), Some(&ParamValue::Integer(1)));
    }

    #[test]
    fn test_offset_above_maximum_fails() {
        let mut params = base_params();
        params["offset"] = json!(100001);

        let err = ParamValidator::validate(&params, &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::OutOfRange);
        assert_eq!(err.details().param, "offset");
        assert_eq!(err.details().expected, "<= 100000");
        assert_eq!(err.details().actual, "100001");
    }

    #[test]
    fn test_offset_at_maximum_passes() {
        let mut params = base_params();
        params["offset"] = json!(100000);
        assert!(ParamValidator::validate(&params, &taxonomy_schema()).is_ok());
    }

    #[test]
    fn test_type_mismatch_reports_union() {
        let mut params = base_params();
        params["limit"] = json!("ten");

        let err = ParamValidator::validate(&params, &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::TypeMismatch);
        assert_eq!(err.details().expected, "integer | null");
        assert_eq!(err.details().actual, "string");
    }

    #[test]
    fn test_float_rejected_for_integer() {
        let mut params = base_params();
        params["ts"] = json!(1.5);

        let err = ParamValidator::validate(&params, &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::TypeMismatch);
        assert_eq!(err.details().actual, "number");
    }

    #[test]
    fn test_explicit_null_kept() {
        let mut params = base_params();
        params["limit"] = Value::Null;

        let validated = ParamValidator::validate(&params, &taxonomy_schema()).unwrap();
        assert_eq!(validated.get("limit"), Some(&ParamValue::Null));
    }

    #[test]
    fn test_scalar_select_normalized_to_array() {
        let mut params = base_params();
        params["select"] = json!("scientific_name");

        let validated = ParamValidator::validate(&params, &taxonomy_schema()).unwrap();
        assert_eq!(
            validated.get("select"),
            Some(&ParamValue::Array(vec![ParamValue::String(
                "scientific_name".into()
            )]))
        );
    }

    #[test]
    fn test_list_select_items_checked() {
        let mut params = base_params();
        params["select"] = json!(["scientific_name", 7]);

        let err = ParamValidator::validate(&params, &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::TypeMismatch);
        assert_eq!(err.details().param, "select[1]");
    }

    #[test]
    fn test_non_object_params_rejected() {
        let err = ParamValidator::validate(&json!([1, 2]), &taxonomy_schema()).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::TypeMismatch);
        assert_eq!(err.details().param, "$root");
    }

    #[test]
    fn test_enum_constraint() {
        let schema = ParamSchema::new().property(
            "rank",
            ParamDef::string().with_enum(vec![json!("species"), json!("strain")]),
        );

        assert!(ParamValidator::validate(&json!({"rank": "species"}), &schema).is_ok());
        let err = ParamValidator::validate(&json!({"rank": "genus"}), &schema).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::OutOfRange);
    }

    #[test]
    fn test_minimum_constraint() {
        let schema =
            ParamSchema::new().property("offset", ParamDef::nullable_integer().with_minimum(0.0));
        let err = ParamValidator::validate(&json!({"offset": -1}), &schema).unwrap_err();
        assert_eq!(err.code(), ValidationErrorCode::OutOfRange);
        assert_eq!(err.details().expected, ">= 0");
    }

    #[test]
    fn test_validation_is_deterministic() {
        let params = base_params();
        let schema = taxonomy_schema();
        let first = ParamValidator::validate(&params, &schema).unwrap();
        for _ in 0..50 {
            assert_eq!(ParamValidator::validate(&params, &schema).unwrap(), first);
        }
    }
}
