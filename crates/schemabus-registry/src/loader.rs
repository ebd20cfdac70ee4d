use std::io::Read;
use std::path::Path;

use serde_json::Value;
use tracing::info;

use crate::engine::SchemaEngine;
use crate::error::{RegistryError, Result};
use crate::registry::SchemaRegistry;

const SCHEMA_SUFFIX: &str = ".schema.json";

impl<E: SchemaEngine> SchemaRegistry<E> {
    /// Register every `<key>.schema.json` file found directly in `dir`.
    ///
    /// Files go through [`SchemaRegistry::add_schema`] without overwrite, in
    /// file-name order, so a key that is already registered fails the load.
    /// Files without the suffix and non-file entries are skipped; symlinked
    /// schema files are refused. Returns the keys that were registered.
    pub fn load_directory(&mut self, dir: &Path) -> Result<Vec<String>> {
        let mut candidates = Vec::new();
        let entries = std::fs::read_dir(dir)
            .map_err(|err| RegistryError::LoadFailed(format!("{}: {err}", dir.display())))?;
        for entry in entries {
            let entry = entry.map_err(|err| RegistryError::LoadFailed(err.to_string()))?;
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(key) = key_from_file_name(&file_name) {
                candidates.push((key.to_string(), file_name.clone(), entry.path()));
            }
        }
        candidates.sort_by(|a, b| a.1.cmp(&b.1));

        let mut loaded = Vec::new();
        for (key, file_name, path) in candidates {
            let path_metadata = std::fs::symlink_metadata(&path)
                .map_err(|err| RegistryError::LoadFailed(format!("{file_name}: {err}")))?;
            let file_type = path_metadata.file_type();
            if file_type.is_symlink() {
                return Err(RegistryError::LoadFailed(format!(
                    "refusing to load schema symlink: {file_name}"
                )));
            }
            if !file_type.is_file() {
                continue;
            }

            if loaded.len() >= self.config().max_schemas_from_directory {
                return Err(RegistryError::LoadFailed(format!(
                    "schema count exceeds configured max ({})",
                    self.config().max_schemas_from_directory
                )));
            }

            let document = self.read_schema_file(&path, &file_name, &path_metadata)?;
            self.add_schema(&key, Some(&document), false)
                .map_err(|err| RegistryError::LoadFailed(format!("{file_name}: {err}")))?;
            loaded.push(key);
        }

        info!(dir = %dir.display(), count = loaded.len(), "preloaded schemas");
        Ok(loaded)
    }

    fn read_schema_file(
        &self,
        path: &Path,
        file_name: &str,
        path_metadata: &std::fs::Metadata,
    ) -> Result<Value> {
        let max_bytes = self.config().max_schema_file_size;
        let load_err = |detail: String| RegistryError::LoadFailed(format!("{file_name}: {detail}"));

        let file = std::fs::File::open(path).map_err(|err| load_err(err.to_string()))?;
        let opened_metadata = file.metadata().map_err(|err| load_err(err.to_string()))?;

        #[cfg(unix)]
        {
            if !same_file_identity(path_metadata, &opened_metadata) {
                return Err(load_err("file changed during load".to_string()));
            }
        }
        #[cfg(not(unix))]
        let _ = path_metadata;

        if opened_metadata.len() > max_bytes as u64 {
            return Err(load_err(format!(
                "file too large ({} bytes, max {max_bytes})",
                opened_metadata.len()
            )));
        }

        let read_limit = u64::try_from(max_bytes.saturating_add(1)).unwrap_or(u64::MAX);
        let mut content = String::new();
        file.take(read_limit)
            .read_to_string(&mut content)
            .map_err(|err| load_err(err.to_string()))?;
        if content.len() > max_bytes {
            return Err(load_err("file grew past size limit while reading".to_string()));
        }

        serde_json::from_str(&content).map_err(|err| load_err(format!("invalid JSON: {err}")))
    }
}

/// `person.schema.json` → `person`. The suffix match ignores ASCII case.
fn key_from_file_name(file_name: &str) -> Option<&str> {
    let split = file_name.len().checked_sub(SCHEMA_SUFFIX.len())?;
    if !file_name.is_char_boundary(split) {
        return None;
    }
    let (key, suffix) = file_name.split_at(split);
    if suffix.eq_ignore_ascii_case(SCHEMA_SUFFIX) {
        Some(key)
    } else {
        None
    }
}

#[cfg(unix)]
fn same_file_identity(path_metadata: &std::fs::Metadata, opened: &std::fs::Metadata) -> bool {
    use std::os::unix::fs::MetadataExt;
    path_metadata.dev() == opened.dev() && path_metadata.ino() == opened.ino()
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use serde_json::json;

    use super::*;
    use crate::config::RegistryConfig;
    use crate::registry::Conformance;

    const PERSON: &str = r#"{
        "type": "object",
        "required": ["name"],
        "properties": { "name": { "type": "string" } }
    }"#;

    fn make_temp_schema_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "schemabus-registry-{tag}-{}-{}",
            std::process::id(),
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap()
                .as_nanos()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_file(dir: &Path, file_name: &str, contents: &str) {
        std::fs::write(dir.join(file_name), contents.as_bytes()).unwrap();
    }

    #[test]
    fn key_is_file_name_without_suffix() {
        assert_eq!(key_from_file_name("person.schema.json"), Some("person"));
        assert_eq!(key_from_file_name("Order.v2.SCHEMA.JSON"), Some("Order.v2"));
        assert_eq!(key_from_file_name(".schema.json"), Some(""));
        assert_eq!(key_from_file_name("person.json"), None);
        assert_eq!(key_from_file_name("json"), None);
    }

    #[test]
    fn loads_schema_files_and_skips_others() {
        let dir = make_temp_schema_dir("load");
        write_file(&dir, "person.schema.json", PERSON);
        write_file(
            &dir,
            "tags.schema.json",
            r#"{"type":"array","items":{"type":"string"}}"#,
        );
        write_file(&dir, "notes.txt", "not a schema");
        write_file(&dir, "person.json", PERSON);
        std::fs::create_dir_all(dir.join("nested.schema.json")).unwrap();

        let mut registry = SchemaRegistry::new();
        let loaded = registry.load_directory(&dir).unwrap();

        assert_eq!(loaded, vec!["person".to_string(), "tags".to_string()]);
        assert_eq!(registry.schema_keys(), loaded);
        assert_eq!(
            registry
                .validate("person", Some(&json!({ "name": "Ann" })))
                .unwrap(),
            Conformance::Conforms
        );

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn blank_key_file_fails_like_add_schema() {
        let dir = make_temp_schema_dir("blank-key");
        write_file(&dir, ".schema.json", PERSON);

        let mut registry = SchemaRegistry::new();
        let err = registry.load_directory(&dir).unwrap_err();
        assert!(matches!(&err, RegistryError::LoadFailed(detail) if detail.contains("must not be empty")));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn preexisting_key_is_not_overwritten() {
        let dir = make_temp_schema_dir("dup");
        write_file(&dir, "person.schema.json", r#"{"type":"string"}"#);

        let mut registry = SchemaRegistry::new();
        registry
            .add_schema("person", Some(&serde_json::from_str(PERSON).unwrap()), false)
            .unwrap();

        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(_))
        ));
        assert!(registry
            .validate("person", Some(&json!({ "name": "Ann" })))
            .unwrap()
            .is_conforming());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn malformed_json_and_bad_syntax_fail() {
        let dir = make_temp_schema_dir("malformed");
        write_file(&dir, "broken.schema.json", "{ not json");
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(detail)) if detail.contains("invalid JSON")
        ));
        let _ = std::fs::remove_dir_all(&dir);

        let dir = make_temp_schema_dir("bad-syntax");
        write_file(&dir, "odd.schema.json", r#"{"type":"definitely-not-a-type"}"#);
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(detail)) if detail.contains("not a valid JSON Schema")
        ));
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn count_limit_is_enforced() {
        let dir = make_temp_schema_dir("count");
        write_file(&dir, "a.schema.json", PERSON);
        write_file(&dir, "b.schema.json", PERSON);

        let mut registry = SchemaRegistry::with_config(RegistryConfig {
            max_schemas_from_directory: 1,
            ..RegistryConfig::default()
        });
        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(_))
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn size_limit_is_enforced() {
        let dir = make_temp_schema_dir("size");
        write_file(&dir, "person.schema.json", PERSON);

        let mut registry = SchemaRegistry::with_config(RegistryConfig {
            max_schema_file_size: 8,
            ..RegistryConfig::default()
        });
        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(detail)) if detail.contains("too large")
        ));
        assert!(registry.is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn missing_directory_fails() {
        let dir = make_temp_schema_dir("missing").join("absent");
        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_schema_is_refused() {
        let dir = make_temp_schema_dir("symlink");
        let target = dir.join("target.json");
        std::fs::write(&target, PERSON).unwrap();
        std::os::unix::fs::symlink(&target, dir.join("person.schema.json")).unwrap();

        let mut registry = SchemaRegistry::new();
        assert!(matches!(
            registry.load_directory(&dir),
            Err(RegistryError::LoadFailed(detail)) if detail.contains("symlink")
        ));

        let _ = std::fs::remove_dir_all(&dir);
    }
}
