use serde_json::Value;

use crate::report::ConformanceReport;

/// Meta-schema URIs the syntax check knows how to verify.
pub const KNOWN_META_SCHEMAS: [&str; 5] = [
    "http://json-schema.org/draft-04/schema",
    "http://json-schema.org/draft-06/schema",
    "http://json-schema.org/draft-07/schema",
    "https://json-schema.org/draft/2019-09/schema",
    "https://json-schema.org/draft/2020-12/schema",
];

/// Failure raised by a [`SchemaEngine`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The schema does not satisfy its meta-schema.
    #[error("{0}")]
    Syntax(String),

    /// The schema could not be turned into a validator.
    #[error("{0}")]
    Compile(String),

    /// A document could not be evaluated.
    #[error("{0}")]
    Evaluate(String),
}

/// Compiles schema documents and checks JSON documents against them.
pub trait SchemaEngine: Send + Sync {
    /// Compiled, reusable form of a schema.
    type Compiled: Send + Sync + 'static;

    /// Check a schema document against its meta-schema.
    fn check_syntax(&self, schema: &Value) -> Result<(), EngineError>;

    fn compile(&self, schema: &Value) -> Result<Self::Compiled, EngineError>;

    /// Evaluate `document`; an empty report means it conforms.
    fn validate(
        &self,
        compiled: &Self::Compiled,
        document: &Value,
    ) -> Result<ConformanceReport, EngineError>;
}

/// [`SchemaEngine`] backed by the `jsonschema` crate.
///
/// Schemas without `$schema` are treated as Draft 2020-12; older drafts
/// must be declared. A `$ref` can only point inside the schema document
/// itself, so compiling never does network or file I/O.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSchemaEngine;

impl SchemaEngine for JsonSchemaEngine {
    type Compiled = jsonschema::Validator;

    fn check_syntax(&self, schema: &Value) -> Result<(), EngineError> {
        if let Some(declared) = schema.get("$schema") {
            let uri = declared
                .as_str()
                .ok_or_else(|| EngineError::Syntax("\"$schema\" must be a string".to_string()))?;
            if !is_known_meta_schema(uri) {
                return Err(EngineError::Syntax(format!(
                    "unsupported meta-schema {uri:?}"
                )));
            }
        }

        jsonschema::meta::validate(schema).map_err(|err| EngineError::Syntax(err.to_string()))
    }

    fn compile(&self, schema: &Value) -> Result<Self::Compiled, EngineError> {
        jsonschema::validator_for(schema).map_err(|err| EngineError::Compile(err.to_string()))
    }

    fn validate(
        &self,
        compiled: &Self::Compiled,
        document: &Value,
    ) -> Result<ConformanceReport, EngineError> {
        Ok(ConformanceReport::from_messages(
            compiled.iter_errors(document).map(|err| err.to_string()),
        ))
    }
}

fn is_known_meta_schema(uri: &str) -> bool {
    let uri = uri.trim_end_matches('#');
    KNOWN_META_SCHEMAS.contains(&uri)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn well_formed_schema_passes_syntax_check() {
        let engine = JsonSchemaEngine;
        let schema = json!({
            "type": "object",
            "required": ["name"],
            "properties": { "name": { "type": "string" } }
        });
        assert!(engine.check_syntax(&schema).is_ok());
    }

    #[test]
    fn unknown_type_keyword_value_fails_syntax_check() {
        let engine = JsonSchemaEngine;
        let schema = json!({ "type": "definitely-not-a-type" });
        assert!(matches!(
            engine.check_syntax(&schema),
            Err(EngineError::Syntax(_))
        ));
    }

    #[test]
    fn declared_meta_schema_must_be_known() {
        let engine = JsonSchemaEngine;

        let draft4 = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "type": "string"
        });
        assert!(engine.check_syntax(&draft4).is_ok());

        let unknown = json!({
            "$schema": "https://example.com/my-meta-schema",
            "type": "string"
        });
        assert!(matches!(
            engine.check_syntax(&unknown),
            Err(EngineError::Syntax(message)) if message.contains("unsupported meta-schema")
        ));

        let not_a_string = json!({ "$schema": 7, "type": "string" });
        assert!(matches!(
            engine.check_syntax(&not_a_string),
            Err(EngineError::Syntax(_))
        ));
    }

    #[test]
    fn compiled_schema_reports_each_violation() {
        let engine = JsonSchemaEngine;
        let compiled = engine
            .compile(&json!({
                "type": "object",
                "required": ["id", "name"],
                "properties": {
                    "id": { "type": "integer" },
                    "name": { "type": "string" }
                }
            }))
            .unwrap();

        let ok = engine
            .validate(&compiled, &json!({ "id": 1, "name": "a" }))
            .unwrap();
        assert!(ok.is_conforming());

        let bad = engine
            .validate(&compiled, &json!({ "id": "one" }))
            .unwrap();
        assert_eq!(bad.violations().len(), 2);
    }

    #[test]
    fn scalar_documents_are_validated() {
        let engine = JsonSchemaEngine;
        let compiled = engine
            .compile(&json!({ "type": "integer", "minimum": 10 }))
            .unwrap();

        assert!(engine
            .validate(&compiled, &json!(12))
            .unwrap()
            .is_conforming());
        assert!(!engine
            .validate(&compiled, &json!(3))
            .unwrap()
            .is_conforming());
        assert!(!engine
            .validate(&compiled, &json!("12"))
            .unwrap()
            .is_conforming());
    }

    #[test]
    fn undeclared_draft_is_2020_12() {
        let engine = JsonSchemaEngine;
        let boolean_exclusive = json!({ "minimum": 0, "exclusiveMinimum": true });
        assert!(matches!(
            engine.check_syntax(&boolean_exclusive),
            Err(EngineError::Syntax(_))
        ));

        let declared = json!({
            "$schema": "http://json-schema.org/draft-04/schema#",
            "minimum": 0,
            "exclusiveMinimum": true
        });
        engine.check_syntax(&declared).unwrap();
        let compiled = engine.compile(&declared).unwrap();
        assert!(engine.validate(&compiled, &json!(1)).unwrap().is_conforming());
        assert!(!engine.validate(&compiled, &json!(0)).unwrap().is_conforming());
    }
}
