use schemabus_registry::{ConformanceReport, Violation};
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Error,
}

/// The single response sent for every request.
///
/// Error replies carry a code in `message`. A document that fails its
/// schema is also an error reply, but its `message` is the rendered report
/// and `violations` lists each failure, which is how callers tell the two
/// apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reply {
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub violations: Option<Vec<Violation>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schemas: Option<Vec<String>>,
}

impl Reply {
    /// Bare acknowledgement.
    pub fn ok() -> Self {
        Self {
            status: Status::Ok,
            message: None,
            cause: None,
            violations: None,
            schemas: None,
        }
    }

    pub fn schemas(keys: Vec<String>) -> Self {
        Self {
            schemas: Some(keys),
            ..Self::ok()
        }
    }

    pub fn error(code: impl Into<String>) -> Self {
        Self {
            status: Status::Error,
            message: Some(code.into()),
            ..Self::ok()
        }
    }

    pub fn from_error(err: &ServiceError) -> Self {
        Self {
            cause: err.cause().map(str::to_string),
            ..Self::error(err.code())
        }
    }

    pub fn non_conforming(report: &ConformanceReport) -> Self {
        Self {
            violations: Some(report.violations().to_vec()),
            ..Self::error(report.to_string())
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    /// True for a document that was evaluated and failed its schema.
    pub fn is_non_conforming(&self) -> bool {
        self.status == Status::Error && self.violations.is_some()
    }
}

#[cfg(test)]
mod tests {
    use schemabus_registry::RegistryError;
    use serde_json::json;

    use super::*;

    #[test]
    fn ok_reply_is_just_a_status() {
        assert_eq!(
            serde_json::to_value(Reply::ok()).unwrap(),
            json!({ "status": "ok" })
        );
    }

    #[test]
    fn schema_keys_reply_carries_schemas() {
        let reply = Reply::schemas(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(
            serde_json::to_value(reply).unwrap(),
            json!({ "status": "ok", "schemas": ["a", "b"] })
        );
    }

    #[test]
    fn error_reply_carries_code_and_cause() {
        let reply = Reply::from_error(&ServiceError::Registry(RegistryError::Schema(
            "bad regex".to_string(),
        )));
        assert_eq!(
            serde_json::to_value(&reply).unwrap(),
            json!({ "status": "error", "message": "schema.error", "cause": "bad regex" })
        );
        assert!(!reply.is_ok());
        assert!(!reply.is_non_conforming());

        assert_eq!(
            serde_json::to_value(Reply::from_error(&ServiceError::InvalidAction)).unwrap(),
            json!({ "status": "error", "message": "invalid.action" })
        );
    }

    #[test]
    fn non_conforming_reply_renders_report_and_lists_violations() {
        let report = ConformanceReport::from_messages(["\"name\" is a required property"]);
        let reply = Reply::non_conforming(&report);

        assert_eq!(reply.message.as_deref(), Some(report.to_string().as_str()));
        assert!(reply.is_non_conforming());
        assert_eq!(
            serde_json::to_value(&reply).unwrap()["violations"],
            json!([{ "message": "\"name\" is a required property" }])
        );
    }

    #[test]
    fn decodes_replies_with_missing_optionals() {
        let reply: Reply = serde_json::from_str(r#"{"status":"ok"}"#).unwrap();
        assert_eq!(reply, Reply::ok());

        let reply: Reply =
            serde_json::from_str(r#"{"status":"error","message":"missing.json"}"#).unwrap();
        assert_eq!(reply, Reply::error("missing.json"));
    }
}
