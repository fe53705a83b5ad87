use crate::error::GseaError;
use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One gene set row as reported by the analysis module.
///
/// The module emits more fields than these (running scores, hit indices,
/// null distribution); they are not shown and are dropped on decode.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct TermSummary {
    pub term: String,
    #[serde(deserialize_with = "score")]
    pub es: f64,
    #[serde(deserialize_with = "score")]
    pub nes: f64,
    #[serde(deserialize_with = "score")]
    pub pval: f64,
    #[serde(deserialize_with = "score")]
    pub fdr: f64,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Score {
    Number(f64),
    Label(String),
}

/// A finite number, or one of the labels non-finite scores travel as.
fn score<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
    match Score::deserialize(deserializer)? {
        Score::Number(value) => Ok(value),
        Score::Label(label) => match label.as_str() {
            "NaN" => Ok(f64::NAN),
            "Infinity" => Ok(f64::INFINITY),
            "-Infinity" => Ok(f64::NEG_INFINITY),
            other => Err(de::Error::custom(format!("'{other}' is not a number"))),
        },
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct AnalysisResult {
    pub summaries: Vec<TermSummary>,
}

impl AnalysisResult {
    /// Validates a raw `success` payload.
    pub fn from_payload(payload: &Value) -> Result<Self, GseaError> {
        let Some(root) = payload.as_object() else {
            return Err(GseaError::InvalidResult("Invalid result structure".to_string()));
        };
        let Some(rows) = root.get("summaries").and_then(Value::as_array) else {
            return Err(GseaError::InvalidResult(
                "Invalid summaries structure".to_string(),
            ));
        };
        let summaries = rows
            .iter()
            .enumerate()
            .map(|(index, row)| {
                TermSummary::deserialize(row).map_err(|error| {
                    GseaError::InvalidResult(format!(
                        "Invalid summary at row {}: {}",
                        index + 1,
                        error
                    ))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(AnalysisResult { summaries })
    }
}

// ===== NUMBER FORMATTING =====
// Output matches the browser's Number.prototype.toFixed / toExponential so
// tables look the same as they always did.

pub(crate) fn non_finite(value: f64) -> Option<String> {
    if value.is_nan() {
        Some("NaN".to_string())
    } else if value.is_infinite() {
        Some(if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string())
    } else {
        None
    }
}

/// Fixed-point with `digits` fraction digits, e.g. `1.23456` → `"1.2346"`.
pub fn format_fixed(value: f64, digits: usize) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }
    // Negative zero prints without a sign in the browser.
    let value = if value == 0.0 { 0.0 } else { value };
    format!("{value:.digits$}")
}

/// Exponential with `digits` fraction digits and a signed exponent,
/// e.g. `0.00012` → `"1.20e-4"`, `3.4` → `"3.40e+0"`.
pub fn format_exponential(value: f64, digits: usize) -> String {
    if let Some(text) = non_finite(value) {
        return text;
    }
    let value = if value == 0.0 { 0.0 } else { value };
    let formatted = format!("{value:.digits$e}");
    match formatted.split_once('e') {
        Some((mantissa, exponent)) if !exponent.starts_with('-') => {
            format!("{mantissa}e+{exponent}")
        }
        _ => formatted,
    }
}
