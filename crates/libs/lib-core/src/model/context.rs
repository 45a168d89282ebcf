//! # Hook Context
//!
//! The mutable object handed from hook to hook for one request.
//!
//! `data` is the record being written. It is optional so that a context
//! without a record can be represented and rejected by hooks instead of
//! being unrepresentable at the call site.

use crate::error::{HookError, Result};
use chrono::{DateTime, Utc};
use lib_utils::parse_utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Service method a context was created for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    Find,
    Get,
    Create,
    Update,
    Patch,
    Remove,
}

impl Method {
    /// Whether the method writes a record.
    pub fn is_write(&self) -> bool {
        matches!(self, Method::Create | Method::Update | Method::Patch)
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Find => write!(f, "find"),
            Method::Get => write!(f, "get"),
            Method::Create => write!(f, "create"),
            Method::Update => write!(f, "update"),
            Method::Patch => write!(f, "patch"),
            Method::Remove => write!(f, "remove"),
        }
    }
}

impl std::str::FromStr for Method {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "find" => Ok(Method::Find),
            "get" => Ok(Method::Get),
            "create" => Ok(Method::Create),
            "update" => Ok(Method::Update),
            "patch" => Ok(Method::Patch),
            "remove" => Ok(Method::Remove),
            _ => Err(format!("Invalid method: {}", s)),
        }
    }
}

/// Per-request hook context.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Context {
    pub method: Method,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Context {
    /// Create a context with no record attached.
    pub fn new(method: Method) -> Self {
        Self {
            method,
            id: None,
            data: None,
        }
    }

    /// Shorthand for a `create` context carrying `data`.
    pub fn create(data: Value) -> Self {
        Self::new(Method::Create).with_data(data)
    }

    /// Attach the record.
    pub fn with_data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Attach the target record id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Whether the record is being created rather than modified.
    pub fn is_new(&self) -> bool {
        self.method == Method::Create
    }

    /// Mutable access to the record as a JSON object.
    ///
    /// # Errors
    ///
    /// - [`HookError::MissingData`] when no record is attached
    /// - [`HookError::MalformedData`] when the record is not an object
    pub fn data_object_mut(&mut self) -> Result<&mut Map<String, Value>> {
        match self.data.as_mut() {
            None => Err(HookError::MissingData),
            Some(Value::Object(map)) => Ok(map),
            Some(other) => Err(HookError::MalformedData(format!(
                "expected an object, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Read a timestamp field back from the record.
    ///
    /// Returns `None` if the field is absent or not an RFC3339 string.
    pub fn timestamp(&self, field: &str) -> Option<DateTime<Utc>> {
        self.data
            .as_ref()?
            .get(field)?
            .as_str()
            .and_then(|s| parse_utc(s).ok())
    }

    /// Consume the context, keeping only the record.
    pub fn into_data(self) -> Option<Value> {
        self.data
    }
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
