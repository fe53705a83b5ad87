use crate::error::GseaError;
use crate::summary::non_finite;
use indexmap::IndexMap;
use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Gene set name → member gene identifiers, in the order the user wrote them.
pub type GeneSets = IndexMap<String, Vec<String>>;

/// Page → worker. Field names match what the analysis module expects.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub genes: Vec<String>,
    pub metric: Vec<f64>,
    pub gene_sets: GeneSets,
    pub weight: f64,
    pub min_size: u32,
    pub max_size: u32,
    pub nperm: u32,
    pub seed: u64,
}

/// Worker → page.
///
/// The `success` payload is deliberately left as raw JSON: the worker does
/// not vouch for the module's output, the presenter validates it.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum WorkerStatus {
    Ready,
    Success {
        #[serde(deserialize_with = "deserialize_lossless")]
        result: Value,
    },
    Error { error: String },
}

impl WorkerStatus {
    pub fn error(message: impl Into<String>) -> Self {
        WorkerStatus::Error {
            error: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, WorkerStatus::Ready)
    }
}

/// Everything the page can observe from its worker handle.
#[derive(Debug, Clone, PartialEq)]
pub enum UnitEvent {
    /// A well-formed status message.
    Status(WorkerStatus),
    /// A message arrived but did not decode as a status.
    Malformed(String),
    /// The worker raised an error event outside the message protocol.
    Fault(String),
}

impl UnitEvent {
    /// The error carried by events that end a request unsuccessfully.
    pub fn failure(&self) -> Option<GseaError> {
        match self {
            UnitEvent::Status(WorkerStatus::Error { error }) => {
                Some(GseaError::Computation(error.clone()))
            }
            UnitEvent::Status(_) => None,
            UnitEvent::Malformed(detail) => Some(GseaError::Computation(format!(
                "Malformed worker message: {detail}"
            ))),
            UnitEvent::Fault(detail) => Some(GseaError::WorkerFault(detail.clone())),
        }
    }

    /// Text shown to the user for events that end a request or the handshake
    /// unsuccessfully.
    pub fn failure_message(&self) -> Option<String> {
        self.failure().map(|error| error.to_string())
    }
}

// ===== LOSSLESS RESULT DECODING =====

/// Decodes any self-describing value into JSON, keeping NaN and the
/// infinities as the strings the browser prints for them. A plain
/// `Value` turns them into `null`.
pub fn deserialize_lossless<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Value, D::Error> {
    deserializer.deserialize_any(LosslessVisitor)
}

struct Lossless(Value);

impl<'de> Deserialize<'de> for Lossless {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserialize_lossless(deserializer).map(Lossless)
    }
}

struct LosslessVisitor;

impl<'de> Visitor<'de> for LosslessVisitor {
    type Value = Value;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a JSON-like value")
    }

    fn visit_bool<E: de::Error>(self, value: bool) -> Result<Value, E> {
        Ok(Value::Bool(value))
    }

    fn visit_i64<E: de::Error>(self, value: i64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_u64<E: de::Error>(self, value: u64) -> Result<Value, E> {
        Ok(Value::from(value))
    }

    fn visit_f64<E: de::Error>(self, value: f64) -> Result<Value, E> {
        Ok(match Number::from_f64(value) {
            Some(number) => Value::Number(number),
            None => Value::String(non_finite(value).unwrap_or_default()),
        })
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Value, E> {
        Ok(Value::String(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Value, E> {
        Ok(Value::String(value))
    }

    fn visit_none<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_some<D: Deserializer<'de>>(self, deserializer: D) -> Result<Value, D::Error> {
        deserialize_lossless(deserializer)
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
        let mut items = Vec::new();
        while let Some(Lossless(item)) = seq.next_element()? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Value, A::Error> {
        let mut entries = Map::new();
        while let Some((key, Lossless(value))) = map.next_entry::<String, Lossless>()? {
            entries.insert(key, value);
        }
        Ok(Value::Object(entries))
    }
}
