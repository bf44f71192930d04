use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Accepts `3.22`, `"3.22"` or `null`. Anything else, including `"NaN"` and `"inf"`, becomes `None`.
pub fn flexible_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(value.filter(|v| v.is_finite()))
}

/// Stock counts arrive as numbers or strings and are sometimes negative; those clamp to zero.
pub fn flexible_u32<'de, D>(deserializer: D) -> Result<Option<u32>, D::Error>
where
    D: Deserializer<'de>,
{
    let count = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    Ok(count.map(|c| c.clamp(0, u32::MAX as i64) as u32))
}
