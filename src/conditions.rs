// Workflow Conditions - Trigger conditions and their evaluation

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Comparison operators available to trigger conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConditionOperator {
    Equals,
    NotEquals,
    Contains,
    GreaterThan,
    LessThan,
    IsEmpty,
    IsNotEmpty,
}

/// A single condition tested against the event context.
///
/// `field` is a dot path into the context object; a missing segment resolves
/// to an absent value rather than an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub field: String,
    pub operator: ConditionOperator,
    pub value: Value,
}

impl Condition {
    pub fn new(field: &str, operator: ConditionOperator, value: Value) -> Self {
        Self {
            field: field.to_string(),
            operator,
            value,
        }
    }

    pub fn equals(field: &str, value: Value) -> Self {
        Self::new(field, ConditionOperator::Equals, value)
    }

    pub fn not_equals(field: &str, value: Value) -> Self {
        Self::new(field, ConditionOperator::NotEquals, value)
    }

    pub fn contains(field: &str, value: &str) -> Self {
        Self::new(field, ConditionOperator::Contains, Value::String(value.to_string()))
    }

    pub fn greater_than(field: &str, value: f64) -> Self {
        Self::new(field, ConditionOperator::GreaterThan, serde_json::json!(value))
    }

    pub fn less_than(field: &str, value: f64) -> Self {
        Self::new(field, ConditionOperator::LessThan, serde_json::json!(value))
    }

    pub fn is_empty(field: &str) -> Self {
        Self::new(field, ConditionOperator::IsEmpty, Value::Null)
    }

    pub fn is_not_empty(field: &str) -> Self {
        Self::new(field, ConditionOperator::IsNotEmpty, Value::Null)
    }
}

/// Resolve a dot-separated path through a context object.
///
/// Any missing intermediate key yields `None`, never an error.
pub fn lookup_path<'a>(context: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(context, |current, key| current.get(key))
}

/// Evaluates condition sequences against an event context.
///
/// All conditions must hold (logical AND) and evaluation stops at the first
/// failure. An empty sequence always matches. Equality and containment are
/// case-sensitive at the raw-value level.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConditionEvaluator {
    strict_absent_contains: bool,
}

impl ConditionEvaluator {
    pub fn new(strict_absent_contains: bool) -> Self {
        Self {
            strict_absent_contains,
        }
    }

    pub fn evaluate(&self, conditions: &[Condition], context: &Value) -> bool {
        conditions.iter().all(|c| self.matches(c, context))
    }

    fn matches(&self, condition: &Condition, context: &Value) -> bool {
        let field_value = lookup_path(context, &condition.field);

        match condition.operator {
            ConditionOperator::Equals => {
                field_value.is_some_and(|v| values_equal(v, &condition.value))
            }
            ConditionOperator::NotEquals => {
                !field_value.is_some_and(|v| values_equal(v, &condition.value))
            }
            ConditionOperator::Contains => {
                if field_value.is_none() && self.strict_absent_contains {
                    return false;
                }
                // An absent field coerces to the literal string "undefined",
                // preserved for compatibility with existing exported rules.
                coerce_string(field_value).contains(&coerce_string(Some(&condition.value)))
            }
            ConditionOperator::GreaterThan => {
                match (field_value.and_then(coerce_number), coerce_number(&condition.value)) {
                    (Some(lhs), Some(rhs)) => lhs > rhs,
                    _ => false,
                }
            }
            ConditionOperator::LessThan => {
                match (field_value.and_then(coerce_number), coerce_number(&condition.value)) {
                    (Some(lhs), Some(rhs)) => lhs < rhs,
                    _ => false,
                }
            }
            ConditionOperator::IsEmpty => is_empty_value(field_value),
            ConditionOperator::IsNotEmpty => !is_empty_value(field_value),
        }
    }
}

/// Numbers compare numerically regardless of integer/float representation;
/// everything else compares by raw value.
fn values_equal(lhs: &Value, rhs: &Value) -> bool {
    match (lhs, rhs) {
        (Value::Number(a), Value::Number(b)) => a.as_f64() == b.as_f64(),
        _ => lhs == rhs,
    }
}

fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(Value::Bool(b)) => b.to_string(),
        Some(Value::Number(n)) => n.to_string(),
        Some(other) => other.to_string(),
    }
}

/// Lenient numeric coercion: numbers as f64, numeric strings parse,
/// booleans map to 0/1, null to 0, anything else is non-numeric.
fn coerce_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Null => Some(0.0),
        _ => None,
    }
}

fn is_empty_value(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}
