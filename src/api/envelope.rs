//! The `{status, message | data}` JSON body shared by every JSON endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};

const SUCCESS: &str = "success";
const FAIL: &str = "fail";

/// What a success envelope carries: text goes under `message`, a mapping
/// under `data`.
#[derive(Debug, Clone, PartialEq)]
pub enum Message {
    Text(String),
    Data(Map<String, Value>),
    /// Neither text nor a mapping; only `status` is emitted.
    Empty,
}

impl From<&str> for Message {
    fn from(text: &str) -> Self {
        Message::Text(text.to_string())
    }
}

impl From<String> for Message {
    fn from(text: String) -> Self {
        Message::Text(text)
    }
}

impl From<Map<String, Value>> for Message {
    fn from(data: Map<String, Value>) -> Self {
        Message::Data(data)
    }
}

impl From<Value> for Message {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Message::Text(text),
            Value::Object(data) => Message::Data(data),
            _ => Message::Empty,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Envelope {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Map<String, Value>>,
}

impl Envelope {
    pub fn success(message: impl Into<Message>) -> Self {
        let (message, data) = match message.into() {
            Message::Text(text) => (Some(text), None),
            Message::Data(data) => (None, Some(data)),
            Message::Empty => (None, None),
        };
        Self {
            status: SUCCESS,
            message,
            data,
        }
    }

    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: FAIL,
            message: Some(message.into()),
            data: None,
        }
    }
}

/// Success envelope. Handlers pass `StatusCode::OK` unless they created
/// something.
pub fn success(message: impl Into<Message>, code: StatusCode) -> Response {
    (code, Json(Envelope::success(message))).into_response()
}

/// Fail envelope. The usual code is `StatusCode::BAD_REQUEST`.
pub fn error(message: impl Into<String>, code: StatusCode) -> Response {
    (code, Json(Envelope::fail(message))).into_response()
}
