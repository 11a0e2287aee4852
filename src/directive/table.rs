//! Front-end for the TOML syntax
//!
//! Directives live under a `[General]` table. Repeatable directives are packed
//! into one string separated by `;` and are split back into one directive per
//! entry here, so the readers see the same records as for the native syntax.

use serde::Deserialize;

use crate::directive::ast::{Directive, Schema};
use crate::error::{CursorError, CursorResult};

#[derive(Debug, Default, Deserialize)]
struct TomlDocument {
    #[serde(rename = "General", default)]
    general: toml::Table,
}

/// Parse TOML source into directives. Keys outside the schema are ignored.
pub fn parse(source: &str, schema: &Schema) -> CursorResult<Vec<Directive>> {
    let document: TomlDocument = toml::from_str(source)
        .map_err(|e| CursorError::Parse(format!("Failed parsing toml: {}", e)))?;

    let mut directives = Vec::new();

    for (key, value) in &document.general {
        if !schema.knows(key) {
            continue;
        }

        let text = scalar_to_string(key, value)?;

        if schema.is_repeatable(key) {
            directives.extend(
                split_list(&text)
                    .into_iter()
                    .map(|entry| Directive::new(key.as_str(), entry)),
            );
        } else {
            directives.push(Directive::new(key.as_str(), text));
        }
    }

    Ok(directives)
}

/// Split a `;` separated list, trimming entries and dropping empty ones
pub fn split_list(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_string)
        .collect()
}

fn scalar_to_string(key: &str, value: &toml::Value) -> CursorResult<String> {
    match value {
        toml::Value::String(s) => Ok(s.clone()),
        toml::Value::Integer(i) => Ok(i.to_string()),
        toml::Value::Float(f) => Ok(f.to_string()),
        toml::Value::Boolean(b) => Ok(b.to_string()),
        other => Err(CursorError::Parse(format!(
            "unsupported {} value for key {}",
            other.type_str(),
            key
        ))),
    }
}
