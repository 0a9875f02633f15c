//! YAML settings, checked against a built-in JSON Schema before use.

use std::fs;
use std::path::{Path, PathBuf};

use jsonschema::validator_for;
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use yaml_rust2::{Yaml, YamlLoader};

use crate::token::Extensions;
use crate::{MindmapError, Result};

pub const BUILTIN_SCHEMA: &str = include_str!("../data/config_schema.yml");

pub const DEFAULT_VIEWER: &str = "freeplane";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Executable used to open finished maps.
    pub viewer: String,
    /// Directory for map artifacts; the system temp dir when unset.
    pub output_dir: Option<PathBuf>,
    pub extensions: Extensions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            viewer: DEFAULT_VIEWER.to_string(),
            output_dir: None,
            extensions: Extensions::default(),
        }
    }
}

impl Config {
    pub fn artifact_dir(&self) -> PathBuf {
        self.output_dir.clone().unwrap_or_else(std::env::temp_dir)
    }
}

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let path = path.as_ref();
    let source = fs::read_to_string(path)
        .map_err(|err| MindmapError::Config(format!("{}: {err}", path.display())))?;
    let config = parse_config(&source)?;
    tracing::debug!(path = %path.display(), viewer = %config.viewer, "configuration loaded");
    Ok(config)
}

pub fn parse_config(yaml: &str) -> Result<Config> {
    let docs = load_yaml(yaml)?;
    let Some(document) = docs.first() else {
        return Ok(Config::default());
    };
    if matches!(document, Yaml::Null) {
        return Ok(Config::default());
    }
    validate_document(document, BUILTIN_SCHEMA)?;

    let mut config = Config::default();
    if let Some(viewer) = document["viewer"].as_str() {
        config.viewer = viewer.to_string();
    }
    if let Some(dir) = document["output_dir"].as_str() {
        config.output_dir = Some(PathBuf::from(dir));
    }
    let markdown = &document["markdown"];
    config.extensions = Extensions {
        tables: flag(markdown, "tables"),
        strikethrough: flag(markdown, "strikethrough"),
        tasklists: flag(markdown, "tasklists"),
        footnotes: flag(markdown, "footnotes"),
    };
    Ok(config)
}

pub fn validate_config_with_schema<P: AsRef<Path>>(yaml: &str, schema_path: P) -> Result<()> {
    let schema_source = fs::read_to_string(schema_path.as_ref())
        .map_err(|err| MindmapError::Schema(err.to_string()))?;
    validate_config_with_schema_str(yaml, &schema_source)
}

pub fn validate_config_with_schema_str(yaml: &str, schema_source: &str) -> Result<()> {
    let docs = load_yaml(yaml)?;
    let document = docs
        .first()
        .ok_or_else(|| MindmapError::Yaml("empty yaml document".to_string()))?;
    validate_document(document, schema_source)
}

fn validate_document(document: &Yaml, schema_source: &str) -> Result<()> {
    let schema_docs = YamlLoader::load_from_str(schema_source)
        .map_err(|err| MindmapError::Schema(err.to_string()))?;
    let schema_yaml = schema_docs
        .first()
        .ok_or_else(|| MindmapError::Schema("empty schema document".to_string()))?;
    let schema_json = yaml_to_json(schema_yaml);
    let instance_json = yaml_to_json(document);
    let validator =
        validator_for(&schema_json).map_err(|err| MindmapError::Schema(err.to_string()))?;
    if let Err(error) = validator.validate(&instance_json) {
        return Err(MindmapError::Schema(error.to_string()));
    }
    Ok(())
}

fn load_yaml(yaml: &str) -> Result<Vec<Yaml>> {
    YamlLoader::load_from_str(yaml).map_err(|err| MindmapError::Yaml(err.to_string()))
}

fn flag(section: &Yaml, key: &str) -> bool {
    section[key].as_bool().unwrap_or(false)
}

fn yaml_key_to_string(value: &Yaml) -> String {
    match value {
        Yaml::String(value) | Yaml::Real(value) => value.clone(),
        Yaml::Integer(value) => value.to_string(),
        Yaml::Boolean(value) => value.to_string(),
        Yaml::Null => "null".to_string(),
        other => format!("{other:?}"),
    }
}

fn yaml_to_json(value: &Yaml) -> JsonValue {
    match value {
        Yaml::Null => JsonValue::Null,
        Yaml::Boolean(value) => JsonValue::Bool(*value),
        Yaml::Integer(value) => JsonValue::Number(JsonNumber::from(*value)),
        Yaml::Real(value) => value
            .parse::<f64>()
            .ok()
            .and_then(JsonNumber::from_f64)
            .map(JsonValue::Number)
            .unwrap_or_else(|| JsonValue::String(value.clone())),
        Yaml::String(value) => JsonValue::String(value.clone()),
        Yaml::Array(values) => JsonValue::Array(values.iter().map(yaml_to_json).collect()),
        Yaml::Hash(map) => {
            let mut out = JsonMap::new();
            for (key, value) in map.iter() {
                out.insert(yaml_key_to_string(key), yaml_to_json(value));
            }
            JsonValue::Object(out)
        }
        other => JsonValue::String(format!("{other:?}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_source_gives_defaults() {
        assert_eq!(parse_config("").expect("parse"), Config::default());
        assert_eq!(parse_config("# only a comment\n").expect("parse"), Config::default());
    }

    #[test]
    fn reads_every_key() {
        let config = parse_config(
            "viewer: /opt/freeplane/freeplane.sh\noutput_dir: /tmp/maps\nmarkdown:\n  tables: true\n  tasklists: true\n",
        )
        .expect("parse");
        assert_eq!(config.viewer, "/opt/freeplane/freeplane.sh");
        assert_eq!(config.artifact_dir(), PathBuf::from("/tmp/maps"));
        assert!(config.extensions.tables);
        assert!(config.extensions.tasklists);
        assert!(!config.extensions.strikethrough);
        assert!(!config.extensions.footnotes);
    }

    #[test]
    fn unknown_key_fails_schema() {
        let err = parse_config("viewr: freeplane").expect_err("expected error");
        assert!(matches!(err, MindmapError::Schema(_)));
    }

    #[test]
    fn broken_yaml_is_a_yaml_error() {
        let err = parse_config("viewer: [").expect_err("expected error");
        assert!(matches!(err, MindmapError::Yaml(_)));
    }

    #[test]
    fn yaml_to_json_converts_nested_values() {
        let docs = YamlLoader::load_from_str("a: [1, 2.5, true, ~]\n3: x").expect("yaml");
        let json = yaml_to_json(&docs[0]);
        assert_eq!(
            json,
            serde_json::json!({ "a": [1, 2.5, true, null], "3": "x" })
        );
    }
}
