//! Document filters for stored query execution
//!
//! Comparisons follow the store's ordering across types:
//! null < boolean < number < string < array < object.
//! A missing attribute reads as null.

use std::cmp::Ordering;

use serde_json::Value;

use crate::registry::{Condition, FilterStage};

use super::store::Document;

/// Evaluates pipeline filters against documents
pub struct DocumentFilter;

impl DocumentFilter {
    /// Versioning filter: `created <= ts AND expired >= ts`
    pub fn is_current(doc: &Document, ts: i64) -> bool {
        let ts = Value::from(ts);
        let created = doc.get("created").unwrap_or(&Value::Null);
        let expired = doc.get("expired").unwrap_or(&Value::Null);

        compare(created, &ts) != Ordering::Greater && compare(expired, &ts) != Ordering::Less
    }

    /// Passes when any condition of the stage holds
    pub fn matches(doc: &Document, stage: &FilterStage) -> bool {
        stage.any_of.iter().any(|cond| Self::matches_condition(doc, cond))
    }

    fn matches_condition(doc: &Document, condition: &Condition) -> bool {
        match condition {
            Condition::In { field, values } => {
                let actual = doc.get(field).unwrap_or(&Value::Null);
                values
                    .iter()
                    .any(|v| compare(actual, v) == Ordering::Equal)
            }
            Condition::Truthy { field, truthy } => {
                is_truthy(doc.get(field).unwrap_or(&Value::Null)) == *truthy
            }
        }
    }

    /// Keeps only the selected attributes that the document has
    pub fn project(doc: Document, select: &[String]) -> Document {
        doc.into_iter()
            .filter(|(key, _)| select.iter().any(|s| s == key))
            .collect()
    }
}

/// null, false, 0 and "" are falsy; everything else is truthy
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map_or(true, |f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Bool(_) => 1,
        Value::Number(_) => 2,
        Value::String(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

/// Total order over JSON values
fn compare(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(xi), Some(yi)) => xi.cmp(&yi),
            _ => {
                let (xf, yf) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
                xf.partial_cmp(&yf).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        (Value::Array(x), Value::Array(y)) => {
            for (xa, ya) in x.iter().zip(y.iter()) {
                match compare(xa, ya) {
                    Ordering::Equal => continue,
                    other => return other,
                }
            }
            x.len().cmp(&y.len())
        }
        (Value::Object(x), Value::Object(y)) => {
            if x == y {
                Ordering::Equal
            } else {
                a.to_string().cmp(&b.to_string())
            }
        }
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}
