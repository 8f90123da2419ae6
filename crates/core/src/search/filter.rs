//! Payload filtering engine for the in-process store.
//!
//! Evaluates [`FilterClause`] predicates against point payloads with the same
//! semantics Qdrant applies server-side: `must` conditions are AND-ed,
//! `must_not` conditions are AND-NOT-ed, dotted keys address nested objects,
//! and an array-valued field matches if any of its elements matches.

use crate::document::Payload;
use crate::filter_types::{FieldCondition, FilterClause, Match};
use serde_json::Value;

/// Check if a payload matches the given filter clause.
pub fn matches_filter(payload: &Payload, filter: &FilterClause) -> bool {
    for cond in &filter.must {
        if !evaluate_condition(payload, cond) {
            return false;
        }
    }
    for cond in &filter.must_not {
        if evaluate_condition(payload, cond) {
            return false;
        }
    }
    true
}

fn evaluate_condition(payload: &Payload, cond: &FieldCondition) -> bool {
    let field_value = match lookup(payload, &cond.key) {
        Some(v) => v,
        None => return false,
    };

    let candidates: Vec<&Value> = match field_value {
        Value::Array(items) => items.iter().collect(),
        single => vec![single],
    };

    match &cond.r#match {
        Match::Value { value } => candidates.iter().any(|c| json_eq(c, value)),
        Match::Any { any } => candidates
            .iter()
            .any(|c| any.iter().any(|v| json_eq(c, v))),
    }
}

/// Resolves `a.b.c` against nested objects.
fn lookup<'a>(payload: &'a Payload, key: &str) -> Option<&'a Value> {
    let mut parts = key.split('.');
    let mut current = payload.get(parts.next()?)?;
    for part in parts {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}

/// JSON equality with integer/float normalization.
fn json_eq(field: &Value, expected: &Value) -> bool {
    match (field, expected) {
        (Value::Number(a), Value::Number(b)) => match (a.as_i64(), b.as_i64()) {
            (Some(x), Some(y)) => x == y,
            _ => match (a.as_f64(), b.as_f64()) {
                (Some(x), Some(y)) => (x - y).abs() < f64::EPSILON,
                _ => false,
            },
        },
        (a, b) => a == b,
    }
}
