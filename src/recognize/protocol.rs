use crate::recognize::error::RecognitionError;
use crate::session::symbols::SymbolTable;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body POSTed to the recognition service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionRequest {
    /// Base64 PNG, no `data:` prefix.
    pub image: String,
    #[serde(rename = "dictOfVars")]
    pub dict_of_vars: SymbolTable,
}

/// One recognized expression from a response array.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ResultRecord {
    #[serde(rename = "expr", default)]
    pub expression: String,
    #[serde(default)]
    pub result: Value,
    #[serde(rename = "assign", default, deserialize_with = "lenient_bool")]
    pub is_assignment: bool,
    #[serde(default, deserialize_with = "lenient_bool")]
    pub error: bool,
}

// Services emit `null` as often as they omit the flag.
fn lenient_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<bool>::deserialize(deserializer)?.unwrap_or(false))
}

impl ResultRecord {
    pub fn new(expression: impl Into<String>, result: impl Into<Value>) -> Self {
        Self {
            expression: expression.into(),
            result: result.into(),
            is_assignment: false,
            error: false,
        }
    }

    pub fn assignment(mut self) -> Self {
        self.is_assignment = true;
        self
    }

    pub fn failed(mut self) -> Self {
        self.error = true;
        self
    }

    /// Text shown for the record: `expression = result`.
    pub fn annotation_text(&self) -> String {
        format!("{} = {}", self.expression, display_value(&self.result))
    }

    /// Variable name on the left of the first `=`, trimmed. `None` if empty.
    pub fn assignment_target(&self) -> Option<&str> {
        let lhs = self.expression.split('=').next().unwrap_or_default().trim();
        (!lhs.is_empty()).then_some(lhs)
    }
}

/// Strings render bare and numbers the way a browser prints them (`4.0`
/// shows as `4`); everything else as compact JSON.
pub fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.is_f64() => n.as_f64().map(format_float).unwrap_or_default(),
        other => other.to_string(),
    }
}

fn format_float(value: f64) -> String {
    if value == 0.0 {
        return "0".into();
    }
    let magnitude = value.abs();
    if !(1e-6..1e21).contains(&magnitude) {
        // Exponent form always carries a sign, e.g. `1e+21`.
        let text = format!("{value:e}");
        return match text.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => text,
        };
    }
    value.to_string()
}

pub fn parse_response(body: &[u8]) -> Result<Vec<ResultRecord>, RecognitionError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|e| RecognitionError::MalformedResponse(format!("invalid json: {e}")))?;
    let Value::Array(items) = value else {
        return Err(RecognitionError::MalformedResponse(format!(
            "expected a json array, got {}",
            json_kind(&value)
        )));
    };
    items
        .into_iter()
        .enumerate()
        .map(|(idx, item)| {
            serde_json::from_value(item).map_err(|e| {
                RecognitionError::MalformedResponse(format!("record {idx}: {e}"))
            })
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
