//! Transformers: document → rendered bytes for the target file.
//!
//! # Design Decisions
//! - Transformers are a closed registry looked up by name at startup;
//!   an unknown name is fatal before the first store pull
//! - `json` is the identity rendering (pretty, two-space indent)
//! - `env` flattens nested objects into KEY=value lines for services
//!   configured through environment files

use serde_json::Value;

use crate::error::ConfigError;

/// A named rendering of the managed document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transformer {
    /// Pretty-printed JSON, two-space indent.
    Json,
    /// Single-line JSON.
    JsonCompact,
    /// Flattened `KEY=value` lines, keys uppercased and joined with `_`.
    Env,
}

impl Transformer {
    pub fn by_name(name: &str) -> Option<Self> {
        match name {
            "json" => Some(Self::Json),
            "json-compact" => Some(Self::JsonCompact),
            "env" => Some(Self::Env),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::JsonCompact => "json-compact",
            Self::Env => "env",
        }
    }

    pub fn render(&self, doc: &Value) -> Result<Vec<u8>, ConfigError> {
        match self {
            Self::Json => Ok(serde_json::to_vec_pretty(doc)?),
            Self::JsonCompact => Ok(serde_json::to_vec(doc)?),
            Self::Env => {
                let mut lines = Vec::new();
                flatten_env(doc, String::new(), &mut lines);
                lines.sort();
                let mut text = lines.join("\n");
                text.push('\n');
                Ok(text.into_bytes())
            }
        }
    }
}

fn flatten_env(node: &Value, prefix: String, out: &mut Vec<String>) {
    match node {
        Value::Object(map) => {
            for (key, value) in map {
                let key = key.to_uppercase().replace(['-', '.'], "_");
                let prefix = if prefix.is_empty() {
                    key
                } else {
                    format!("{prefix}_{key}")
                };
                flatten_env(value, prefix, out);
            }
        }
        Value::Array(seq) => {
            let joined: Vec<String> = seq.iter().map(env_scalar).collect();
            out.push(format!("{prefix}={}", joined.join(",")));
        }
        scalar => out.push(format!("{prefix}={}", env_scalar(scalar))),
    }
}

fn env_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_by_name() {
        assert_eq!(Transformer::by_name("json"), Some(Transformer::Json));
        assert_eq!(Transformer::by_name("env"), Some(Transformer::Env));
        assert_eq!(Transformer::by_name("yaml"), None);
    }

    #[test]
    fn test_json_round_trip() {
        let doc = json!({"a": 1, "b": ["x"]});
        let rendered = Transformer::Json.render(&doc).unwrap();
        let back: Value = serde_json::from_slice(&rendered).unwrap();
        assert_eq!(back, doc);
    }

    #[test]
    fn test_env_flattening() {
        let doc = json!({"db": {"host": "localhost", "port": 5432}, "debug": true, "tags": ["a", "b"]});
        let rendered = Transformer::Env.render(&doc).unwrap();
        assert_eq!(
            String::from_utf8(rendered).unwrap(),
            "DB_HOST=localhost\nDB_PORT=5432\nDEBUG=true\nTAGS=a,b\n"
        );
    }
}
