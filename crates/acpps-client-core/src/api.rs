//! Request and response bodies exchanged with the portal's JSON endpoints,
//! plus the status-aware decoders the shell runs on raw response text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToggleResponse {
    Success {
        new_state: bool,
    },
    Error {
        #[serde(default)]
        message: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CapacityUpdateRequest {
    pub capacity: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CapacityResponse {
    pub status: String,
    #[serde(default)]
    pub new_capacity: Option<TextOrNumber>,
}

impl CapacityResponse {
    /// The confirmed capacity, only when the server reported success.
    #[must_use]
    pub fn confirmed_capacity(&self) -> Option<String> {
        if self.status != "success" {
            return None;
        }
        self.new_capacity.as_ref().map(TextOrNumber::to_text)
    }
}

/// Django views hand back either a string or a bare integer for numeric fields.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum TextOrNumber {
    Text(String),
    Number(serde_json::Number),
}

impl TextOrNumber {
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(text) => text.clone(),
            Self::Number(number) => number.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct MessageBody {
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TaskStartAccepted {
    pub task_id: String,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TaskStartErrorBody {
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl TaskStartErrorBody {
    #[must_use]
    pub fn preferred_message(&self) -> Option<String> {
        non_blank(self.detail.as_deref()).or_else(|| non_blank(self.error.as_deref()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskStatus {
    Success,
    Failure,
    Pending(String),
}

impl From<String> for TaskStatus {
    fn from(raw: String) -> Self {
        match raw.as_str() {
            "SUCCESS" => Self::Success,
            "FAILURE" => Self::Failure,
            _ => Self::Pending(raw),
        }
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        String::deserialize(deserializer).map(Self::from)
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TaskStatusResponse {
    #[serde(default)]
    pub task_id: Option<String>,
    pub status: TaskStatus,
    #[serde(default)]
    pub result: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalStatus {
    Succeeded { message: Option<String> },
    Failed { detail: String },
}

impl TaskStatusResponse {
    #[must_use]
    pub fn terminal(&self) -> Option<TerminalStatus> {
        match self.status {
            TaskStatus::Success => Some(TerminalStatus::Succeeded {
                message: self
                    .result
                    .as_ref()
                    .and_then(|result| result.get("result"))
                    .and_then(value_text),
            }),
            TaskStatus::Failure => Some(TerminalStatus::Failed {
                detail: self
                    .result
                    .as_ref()
                    .and_then(value_text)
                    .unwrap_or_else(|| "unknown error".to_string()),
            }),
            TaskStatus::Pending(_) => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StartFailure {
    Rejected { status: u16, message: String },
    Network(String),
}

pub fn decode_toggle_response(status: u16, raw: &str) -> Result<ToggleResponse, ClientError> {
    match serde_json::from_str::<ToggleResponse>(raw) {
        Ok(response) => Ok(response),
        Err(_) if !is_success(status) => {
            let body: MessageBody = serde_json::from_str(raw).unwrap_or_default();
            Err(ClientError::server(status, body.message))
        }
        Err(error) => Err(ClientError::Decode(error.to_string())),
    }
}

pub fn decode_capacity_response(status: u16, raw: &str) -> Result<CapacityResponse, ClientError> {
    if !is_success(status) {
        let body: MessageBody = serde_json::from_str(raw).unwrap_or_default();
        return Err(ClientError::server(status, body.message));
    }
    serde_json::from_str(raw).map_err(|error| ClientError::Decode(error.to_string()))
}

pub fn decode_task_start(status: u16, raw: &str) -> Result<TaskStartAccepted, StartFailure> {
    if !is_success(status) {
        let body: TaskStartErrorBody = serde_json::from_str(raw).unwrap_or_default();
        let message = body
            .preferred_message()
            .unwrap_or_else(|| format!("request failed with status {status}"));
        return Err(StartFailure::Rejected { status, message });
    }
    serde_json::from_str(raw)
        .map_err(|error| StartFailure::Network(format!("failed to decode task start: {error}")))
}

pub fn decode_task_status(status: u16, raw: &str) -> Result<TaskStatusResponse, ClientError> {
    if !is_success(status) {
        let body: MessageBody = serde_json::from_str(raw).unwrap_or_default();
        return Err(ClientError::server(status, body.message));
    }
    serde_json::from_str(raw).map_err(|error| ClientError::Decode(error.to_string()))
}

fn is_success(status: u16) -> bool {
    (200..=299).contains(&status)
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(text) => non_blank(Some(text)),
        Value::Bool(_) | Value::Number(_) => Some(value.to_string()),
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}
