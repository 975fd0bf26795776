use burnbox_core::{ConsumedPaste, NewPaste, PasteError};
use jiff::Timestamp;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Body of `POST /pastes`.
///
/// Fields are kept as raw JSON so that wrong types are reported as
/// validation errors on the offending field rather than as parse failures.
/// A key that is present but `null` is kept as `Some(Value::Null)`.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePasteRequest {
    #[serde(default, deserialize_with = "present")]
    pub content: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub ttl_seconds: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub max_views: Option<Value>,
}

fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Value>, D::Error> {
    Value::deserialize(deserializer).map(Some)
}

impl TryFrom<CreatePasteRequest> for NewPaste {
    type Error = PasteError;

    fn try_from(request: CreatePasteRequest) -> Result<Self, Self::Error> {
        let content = match request.content {
            Some(Value::String(content)) => content,
            _ => {
                return Err(PasteError::validation(
                    "content",
                    "content is required and must be a non-empty string",
                ))
            }
        };

        Ok(NewPaste {
            content,
            ttl_seconds: positive_integer("ttl_seconds", request.ttl_seconds)?,
            max_views: positive_integer("max_views", request.max_views)?,
        })
    }
}

/// Only a missing key is absent; an explicit `null` is rejected.
/// Integral floats such as `5.0` are accepted.
fn positive_integer(field: &'static str, value: Option<Value>) -> Result<Option<u64>, PasteError> {
    let number = match value {
        None => return Ok(None),
        Some(Value::Number(number)) => number,
        Some(_) => return Err(not_a_positive_integer(field)),
    };

    let parsed = number.as_u64().or_else(|| {
        number
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= 1.0 && *f < u64::MAX as f64)
            .map(|f| f as u64)
    });

    match parsed {
        Some(n) if n >= 1 => Ok(Some(n)),
        _ => Err(not_a_positive_integer(field)),
    }
}

fn not_a_positive_integer(field: &'static str) -> PasteError {
    PasteError::validation(field, format!("{field} must be an integer >= 1"))
}

#[derive(Debug, Serialize)]
pub struct CreatePasteResponse {
    pub id: String,
    pub url: String,
}

#[derive(Debug, Serialize)]
pub struct PasteResponse {
    pub content: String,
    pub remaining_views: Option<u64>,
    pub expires_at: Option<String>,
}

impl From<ConsumedPaste> for PasteResponse {
    fn from(paste: ConsumedPaste) -> Self {
        Self {
            content: paste.content,
            remaining_views: paste.remaining_views,
            expires_at: paste.expires_at.map(format_timestamp),
        }
    }
}

/// ISO-8601 in UTC with exactly three fractional digits,
/// e.g. `2024-01-01T00:00:05.000Z`.
pub fn format_timestamp(timestamp: Timestamp) -> String {
    let millis = timestamp.as_millisecond().rem_euclid(1_000);
    format!("{}.{millis:03}Z", timestamp.strftime("%Y-%m-%dT%H:%M:%S"))
}
