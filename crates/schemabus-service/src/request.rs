use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ServiceError;

pub const ACTION_VALIDATE: &str = "validate";
pub const ACTION_GET_SCHEMA_KEYS: &str = "getSchemaKeys";
pub const ACTION_ADD_SCHEMA: &str = "addSchema";

/// A decoded request body.
///
/// Field values are kept loose here: the registry decides whether a missing
/// key or schema is an error, so the check order stays in one place.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "action")]
pub enum Request {
    #[serde(rename = "validate")]
    Validate {
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        json: Option<Value>,
    },

    #[serde(rename = "getSchemaKeys")]
    GetSchemaKeys,

    #[serde(rename = "addSchema")]
    AddSchema {
        #[serde(skip_serializing_if = "Option::is_none")]
        key: Option<String>,
        #[serde(rename = "jsonSchema", skip_serializing_if = "Option::is_none")]
        json_schema: Option<Value>,
        overwrite: bool,
    },
}

impl Request {
    /// Decode a request body.
    ///
    /// Anything that is not an object, or whose `action` is absent, empty,
    /// non-string or unknown, is [`ServiceError::InvalidAction`]. A
    /// non-string `key` reads as absent and a non-boolean `overwrite` reads
    /// as `false`.
    pub fn from_value(body: Value) -> Result<Self, ServiceError> {
        let Value::Object(mut fields) = body else {
            return Err(ServiceError::InvalidAction);
        };

        let action = fields
            .get("action")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        match action.as_str() {
            ACTION_VALIDATE => Ok(Request::Validate {
                key: string_field(&fields, "key"),
                json: fields.remove("json"),
            }),
            ACTION_GET_SCHEMA_KEYS => Ok(Request::GetSchemaKeys),
            ACTION_ADD_SCHEMA => Ok(Request::AddSchema {
                key: string_field(&fields, "key"),
                overwrite: fields
                    .get("overwrite")
                    .and_then(Value::as_bool)
                    .unwrap_or(false),
                json_schema: fields.remove("jsonSchema"),
            }),
            _ => Err(ServiceError::InvalidAction),
        }
    }

    pub fn action(&self) -> &'static str {
        match self {
            Request::Validate { .. } => ACTION_VALIDATE,
            Request::GetSchemaKeys => ACTION_GET_SCHEMA_KEYS,
            Request::AddSchema { .. } => ACTION_ADD_SCHEMA,
        }
    }

    pub fn validate(key: impl Into<String>, json: Value) -> Self {
        Request::Validate {
            key: Some(key.into()),
            json: Some(json),
        }
    }

    pub fn add_schema(key: impl Into<String>, json_schema: Value, overwrite: bool) -> Self {
        Request::AddSchema {
            key: Some(key.into()),
            json_schema: Some(json_schema),
            overwrite,
        }
    }
}

fn string_field(fields: &Map<String, Value>, name: &str) -> Option<String> {
    fields.get(name).and_then(Value::as_str).map(str::to_string)
}
