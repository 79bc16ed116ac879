use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Number, Value};

use crate::error::FormError;

/// Request body for `POST /predict`: the eight form values as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthInput {
    pub age: String,
    pub gender: String,
    pub systolic: String,
    pub diastolic: String,
    pub cholesterol: String,
    pub glucose: String,
    pub bmi: String,
    pub smoking: String,
}

/// Response body of `POST /predict`. Values are taken as the server sent them;
/// `None` means the key was absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct HealthPrediction {
    #[serde(default, deserialize_with = "present")]
    pub heart_risk: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub diabetes: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub stroke_risk: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub bp_category: Option<Value>,
}

impl HealthPrediction {
    /// Decodes a response body. Any JSON document is accepted; only `null`
    /// has no fields to read.
    pub fn from_body(body: &[u8]) -> Result<Self, FormError> {
        match serde_json::from_slice::<Value>(body)? {
            Value::Null => Err(FormError::NullResponse),
            object @ Value::Object(_) => Ok(serde_json::from_value(object)?),
            _ => Ok(HealthPrediction::default()),
        }
    }
}

// Keeps an explicit `null` distinct from a missing key.
fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

/// Renders a response value the way string concatenation on the page would.
pub fn display_value(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(value) => concat_text(value),
    }
}

fn concat_text(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => number_text(n),
        Value::String(s) => s.clone(),
        // Array elements that are null render as empty strings.
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => concat_text(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Number to text with the page's rules: shortest round-trip digits, no
/// trailing `.0`, `-0` as `0`, exponent form outside `[1e-6, 1e21)`.
fn number_text(n: &Number) -> String {
    if n.is_i64() || n.is_u64() {
        return n.to_string();
    }
    let Some(x) = n.as_f64() else {
        return n.to_string();
    };
    if x == 0.0 {
        return "0".to_string();
    }
    let magnitude = x.abs();
    if (1e-6..1e21).contains(&magnitude) {
        return x.to_string();
    }
    let exp = format!("{:e}", x);
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{}e+{}", mantissa, power),
        _ => exp,
    }
}
