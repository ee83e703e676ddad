//! Message types for the request event stream.
//!
//! Every text frame on the stream is a JSON object with a `"type"`
//! discriminant:
//!
//! ```json
//! {"type":"request","task":"t1","data":{"status":200,"url":"/a","duration":50,"timestamp":{"iso":"2024-01-01T00:00:00.000Z"}}}
//! {"type":"exception","name":"ValueError","data":"<html>...</html>"}
//! ```
//!
//! Producers also emit bookkeeping types (`task_start`, `task_end`,
//! `progress`, ...). Those decode into [`StreamEvent::Unknown`] so that new
//! message types never break an older dashboard.

use compact_str::{CompactString, ToCompactString};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Errors produced while decoding a raw text message.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// The message is not valid JSON, or a known message type has fields
    /// of the wrong shape.
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// The message is valid JSON but not an object.
    #[error("message is not a json object")]
    NotAnObject,

    /// The message has no `"type"` field.
    #[error("message has no \"type\" field")]
    MissingType,

    /// The `"type"` field is present but not a string.
    #[error("message \"type\" field is not a string")]
    InvalidType,
}

/// A decoded stream message.
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// An HTTP request issued by a scraping task.
    Request(RequestEvent),
    /// An exception raised inside a scraping task.
    Exception(ExceptionEvent),
    /// Any other message type. Carries the raw type name for logging.
    Unknown { kind: String },
}

impl StreamEvent {
    /// Decode a single text message.
    ///
    /// Unknown message types are not an error; only messages that are not
    /// JSON objects, lack a string `"type"`, or carry a known type with
    /// malformed fields are rejected.
    pub fn decode(text: &str) -> Result<Self, DecodeError> {
        Self::from_json(serde_json::from_str(text)?)
    }

    /// Decode a single binary message.
    ///
    /// Same rules as [`decode`](Self::decode); bytes that are not valid
    /// UTF-8 JSON are a [`DecodeError::Json`].
    pub fn decode_bytes(bytes: &[u8]) -> Result<Self, DecodeError> {
        Self::from_json(serde_json::from_slice(bytes)?)
    }

    fn from_json(value: Value) -> Result<Self, DecodeError> {
        let Value::Object(mut object) = value else {
            return Err(DecodeError::NotAnObject);
        };

        let kind = match object.remove("type") {
            Some(Value::String(kind)) => kind,
            Some(_) => return Err(DecodeError::InvalidType),
            None => return Err(DecodeError::MissingType),
        };

        let body = Value::Object(object);
        match kind.as_str() {
            "request" => Ok(Self::Request(serde_json::from_value(body)?)),
            "exception" => Ok(Self::Exception(serde_json::from_value(body)?)),
            _ => Ok(Self::Unknown { kind }),
        }
    }

    /// The wire name of this event's type.
    pub fn kind(&self) -> &str {
        match self {
            Self::Request(_) => "request",
            Self::Exception(_) => "exception",
            Self::Unknown { kind } => kind,
        }
    }
}

/// Identifier of the scraping task that produced an event.
///
/// Producers send either a string or an integer; both are normalised to
/// their string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct TaskId(CompactString);

impl TaskId {
    pub fn new(id: impl Into<CompactString>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for TaskId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_integer(deserializer).map(Self)
    }
}

/// HTTP status code as reported by the producer.
///
/// Kept as text: producers send integers, strings, or nothing at all, and
/// the dashboard only ever uses the code as a label and a lookup key.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct StatusCode(CompactString);

impl StatusCode {
    pub fn new(code: impl Into<CompactString>) -> Self {
        Self(code.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for StatusCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for StatusCode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        string_or_integer(deserializer).map(Self)
    }
}

/// Start time of a request.
///
/// Serialized as `{"iso": "..."}`; a bare ISO string is accepted as well.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Timestamp {
    pub iso: String,
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawTimestamp {
            Wrapped { iso: String },
            Bare(String),
        }

        Ok(match RawTimestamp::deserialize(deserializer)? {
            RawTimestamp::Wrapped { iso } | RawTimestamp::Bare(iso) => Self { iso },
        })
    }
}

/// `{"type":"request", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEvent {
    /// Producing task. Missing ids are rejected later, during
    /// classification, not while decoding.
    #[serde(default)]
    pub task: Option<TaskId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub data: RequestData,
}

/// Payload of a request event.
///
/// Only `status`, `url`, `duration` and `timestamp` drive the chart; the
/// remaining fields are kept as item metadata. Metadata of an unexpected
/// shape reads as `None` instead of failing the whole event.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    #[serde(default)]
    pub status: Option<StatusCode>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// Request duration in milliseconds.
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub timestamp: Option<Timestamp>,
    #[serde(default, deserialize_with = "lenient")]
    pub method: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub retry: Option<u32>,
    /// Error text for requests that failed at the transport level.
    #[serde(default, deserialize_with = "lenient")]
    pub message: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub req_uuid: Option<Uuid>,
}

/// `{"type":"exception", ...}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExceptionEvent {
    /// Exception class name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    /// Rendered HTML traceback. `None` means there is nothing to show.
    #[serde(default)]
    pub data: Option<String>,
    #[serde(default)]
    pub task: Option<TaskId>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInteger {
    Text(CompactString),
    Signed(i64),
    Unsigned(u64),
}

fn string_or_integer<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<CompactString, D::Error> {
    Ok(match StringOrInteger::deserialize(deserializer)? {
        StringOrInteger::Text(text) => text,
        StringOrInteger::Signed(n) => n.to_compact_string(),
        StringOrInteger::Unsigned(n) => n.to_compact_string(),
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Any value that does not deserialize as `T` becomes `None`.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_request() {
        let text = r#"{"type":"request","task":"t1","data":{"status":200,"url":"/a","duration":50,"timestamp":{"iso":"2024-01-01T00:00:00.000Z"}}}"#;
        let StreamEvent::Request(event) = StreamEvent::decode(text).unwrap() else {
            panic!("expected a request event");
        };
        assert_eq!(event.task, Some(TaskId::new("t1")));
        assert_eq!(event.data.status, Some(StatusCode::new("200")));
        assert_eq!(event.data.url, "/a");
        assert_eq!(event.data.duration, Some(50.0));
        assert_eq!(
            event.data.timestamp,
            Some(Timestamp {
                iso: "2024-01-01T00:00:00.000Z".to_string()
            })
        );
    }

    #[test]
    fn test_decode_producer_shaped_request() {
        let text = r#"{
            "scraper": "example",
            "task": 140234,
            "type": "request",
            "time": "2024-01-01T00:00:01",
            "data": {
                "req_uuid": "67e55044-10b1-426f-9247-bb680e5fe0c8",
                "method": "GET",
                "kwargs": {},
                "session_id": 1,
                "url": "http://example.com/",
                "status": null,
                "retry": 2,
                "message": "Request timed out",
                "timestamp": "2024-01-01T00:00:00.250000",
                "data": null,
                "duration": 750
            }
        }"#;
        let StreamEvent::Request(event) = StreamEvent::decode(text).unwrap() else {
            panic!("expected a request event");
        };
        assert_eq!(event.task.unwrap().as_str(), "140234");
        assert_eq!(event.data.status, None);
        assert_eq!(event.data.method.as_deref(), Some("GET"));
        assert_eq!(event.data.retry, Some(2));
        assert_eq!(event.data.message.as_deref(), Some("Request timed out"));
        assert_eq!(
            event.data.timestamp.unwrap().iso,
            "2024-01-01T00:00:00.250000"
        );
        assert!(event.data.req_uuid.is_some());
    }

    #[test]
    fn test_decode_string_status_and_missing_fields() {
        let text = r#"{"type":"request","task":"t1","data":{"status":"404"}}"#;
        let StreamEvent::Request(event) = StreamEvent::decode(text).unwrap() else {
            panic!("expected a request event");
        };
        assert_eq!(event.data.status.unwrap().as_str(), "404");
        assert_eq!(event.data.url, "");
        assert_eq!(event.data.duration, None);
        assert_eq!(event.data.timestamp, None);

        let text = r#"{"type":"request","data":null}"#;
        let StreamEvent::Request(event) = StreamEvent::decode(text).unwrap() else {
            panic!("expected a request event");
        };
        assert_eq!(event.task, None);
        assert_eq!(event.data, RequestData::default());
    }

    #[test]
    fn test_malformed_metadata_is_dropped() {
        let text = r#"{"type":"request","task":"t1","data":{"status":200,"url":"/a","duration":5,"timestamp":"2024-01-01T00:00:00Z","req_uuid":"req-17","retry":"twice","method":7,"message":{"k":1}}}"#;
        let StreamEvent::Request(event) = StreamEvent::decode(text).unwrap() else {
            panic!("expected a request event");
        };
        assert_eq!(event.data.req_uuid, None);
        assert_eq!(event.data.retry, None);
        assert_eq!(event.data.method, None);
        assert_eq!(event.data.message, None);
        assert_eq!(event.data.url, "/a");
        assert_eq!(event.data.duration, Some(5.0));
    }

    #[test]
    fn test_decode_bytes() {
        let event = StreamEvent::decode_bytes(br#"{"type":"task_end"}"#).unwrap();
        assert_eq!(event.kind(), "task_end");

        assert!(matches!(
            StreamEvent::decode_bytes(b"{\"type\":\"request\",\"task\":\"\xff\"}"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            StreamEvent::decode_bytes(&[0xff, 0xfe]),
            Err(DecodeError::Json(_))
        ));
    }

    #[test]
    fn test_decode_exception() {
        let text = r#"{"type":"exception","name":"ValueError","data":"<p>boom</p>"}"#;
        let event = StreamEvent::decode(text).unwrap();
        assert_eq!(
            event,
            StreamEvent::Exception(ExceptionEvent {
                name: "ValueError".to_string(),
                data: Some("<p>boom</p>".to_string()),
                task: None,
            })
        );

        let text = r#"{"type":"exception","name":"ValueError","data":null}"#;
        let StreamEvent::Exception(event) = StreamEvent::decode(text).unwrap() else {
            panic!("expected an exception event");
        };
        assert_eq!(event.data, None);
    }

    #[test]
    fn test_decode_unknown_type() {
        let event = StreamEvent::decode(r#"{"type":"task_start","data":{}}"#).unwrap();
        assert_eq!(
            event,
            StreamEvent::Unknown {
                kind: "task_start".to_string()
            }
        );
        assert_eq!(event.kind(), "task_start");
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            StreamEvent::decode("not json"),
            Err(DecodeError::Json(_))
        ));
        assert!(matches!(
            StreamEvent::decode("[1,2,3]"),
            Err(DecodeError::NotAnObject)
        ));
        assert!(matches!(
            StreamEvent::decode(r#"{"task":"t1"}"#),
            Err(DecodeError::MissingType)
        ));
        assert!(matches!(
            StreamEvent::decode(r#"{"type":7}"#),
            Err(DecodeError::InvalidType)
        ));
        assert!(matches!(
            StreamEvent::decode(r#"{"type":"request","data":{"duration":"slow"}}"#),
            Err(DecodeError::Json(_))
        ));
    }
}
