use serde_json::{Number, Value};

/// Display text for any value held by a field.
pub fn value_to_string(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(text) => text.clone(),
        Value::Number(num) => num.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Array(items) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

/// Value for a number buffer: empty is `null`, a canonical number is a
/// number, anything else stays text so the validator can reject it.
pub(super) fn number_value(text: &str) -> Value {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match parse_number(trimmed) {
        Some(number) if number.to_string() == trimmed => Value::Number(number),
        _ => Value::String(text.to_string()),
    }
}

fn parse_number(text: &str) -> Option<Number> {
    if let Ok(int) = text.parse::<i64>() {
        return Some(Number::from(int));
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

pub(super) fn number_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(num) => num.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

/// Steps a number and clamps it into `[min, max]`.
pub(super) fn step_number(
    current: Option<f64>,
    delta: f64,
    min: Option<f64>,
    max: Option<f64>,
) -> Value {
    let base = current.or(min).unwrap_or(0.0);
    let mut next = base + delta;
    if let Some(min) = min {
        next = next.max(min);
    }
    if let Some(max) = max {
        next = next.min(max);
    }
    float_value(next)
}

fn float_value(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Value::from(value as i64);
    }
    // Trim binary noise such as 0.30000000000000004.
    let rounded = (value * 1e9).round() / 1e9;
    Number::from_f64(rounded)
        .map(Value::Number)
        .unwrap_or(Value::Null)
}
