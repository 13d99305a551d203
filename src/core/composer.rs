//! Payload templating.
//!
//! A template is a JSON structure in which any mapping value equal to
//! [`PLACEHOLDER`] marks where the loaded data is injected. Only mappings are
//! walked; sequences and other scalars are copied as they are.

use crate::utils::error::{PushError, Result};
use serde_json::{Map, Value};

/// Reserved token replaced by the loaded data.
pub const PLACEHOLDER: &str = "${data_files}";

#[derive(Debug, Clone, PartialEq)]
pub enum Template {
    Mapping(Vec<(String, Template)>),
    Placeholder,
    Literal(Value),
}

impl Template {
    /// The root must be a mapping or the placeholder itself.
    pub fn parse(value: &Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self::parse_mapping(map)),
            Value::String(s) if s == PLACEHOLDER => Ok(Template::Placeholder),
            other => Err(PushError::InvalidTemplateError {
                message: format!(
                    "expected an object or \"{}\", found {}",
                    PLACEHOLDER,
                    describe(other)
                ),
            }),
        }
    }

    fn parse_mapping(map: &Map<String, Value>) -> Self {
        let entries = map
            .iter()
            .map(|(key, value)| {
                let node = match value {
                    Value::Object(inner) => Self::parse_mapping(inner),
                    Value::String(s) if s == PLACEHOLDER => Template::Placeholder,
                    other => Template::Literal(other.clone()),
                };
                (key.clone(), node)
            })
            .collect();
        Template::Mapping(entries)
    }

    pub fn compose(&self, data: &Value) -> Value {
        compose(self, data)
    }

    /// Number of injection points in the tree.
    pub fn placeholder_count(&self) -> usize {
        match self {
            Template::Mapping(entries) => entries.iter().map(|(_, t)| t.placeholder_count()).sum(),
            Template::Placeholder => 1,
            Template::Literal(_) => 0,
        }
    }

    /// The template as plain JSON, placeholders written back as the token.
    pub fn to_value(&self) -> Value {
        match self {
            Template::Mapping(entries) => Value::Object(
                entries
                    .iter()
                    .map(|(key, node)| (key.clone(), node.to_value()))
                    .collect(),
            ),
            Template::Placeholder => Value::String(PLACEHOLDER.to_string()),
            Template::Literal(value) => value.clone(),
        }
    }
}

impl Default for Template {
    fn default() -> Self {
        Template::Placeholder
    }
}

/// Builds a new payload from `template`, substituting `data` at every placeholder.
pub fn compose(template: &Template, data: &Value) -> Value {
    match template {
        Template::Mapping(entries) => Value::Object(
            entries
                .iter()
                .map(|(key, node)| (key.clone(), compose(node, data)))
                .collect(),
        ),
        Template::Placeholder => data.clone(),
        Template::Literal(value) => value.clone(),
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
