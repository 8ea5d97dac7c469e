//! Block type registry and block validation.
//!
//! The converter itself is tolerant of any payload shape; validation is
//! for callers that want to surface problems (an admin form rejecting a
//! malformed submission) instead of silently degrading. `validate_block`
//! returns human-readable problem messages and never mutates or panics.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sanitize::sanitize_html;

/// Definition of a single block type in the editor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockTypeDefinition {
    /// Machine name of the block type (e.g. "paragraph", "header").
    pub type_name: String,
    /// Human-readable label (e.g. "Paragraph", "Header").
    pub label: String,
    /// JSON Schema describing the expected data shape.
    pub schema: Value,
}

/// Registry of block type definitions, keyed by type name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BlockTypeRegistry {
    types: HashMap<String, BlockTypeDefinition>,
}

impl BlockTypeRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with the 9 standard block types.
    pub fn with_standard_types() -> Self {
        let mut registry = Self::new();
        registry.register_standard_types();
        registry
    }

    /// Register a single block type definition.
    pub fn register(&mut self, definition: BlockTypeDefinition) {
        self.types.insert(definition.type_name.clone(), definition);
    }

    /// Look up a block type by name.
    pub fn get(&self, type_name: &str) -> Option<&BlockTypeDefinition> {
        self.types.get(type_name)
    }

    /// Check whether a block type is registered.
    pub fn contains(&self, type_name: &str) -> bool {
        self.types.contains_key(type_name)
    }

    /// Return the number of registered block types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// List all registered type names.
    pub fn type_names(&self) -> Vec<String> {
        self.types.keys().cloned().collect()
    }

    /// Register the 9 standard block types: header, paragraph, list,
    /// image, quote, delimiter, table, code, linkTool.
    pub fn register_standard_types(&mut self) {
        self.register(BlockTypeDefinition {
            type_name: "header".to_string(),
            label: "Header".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" },
                    "level": { "type": "integer", "minimum": 1, "maximum": 6 }
                },
                "required": ["text"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "paragraph".to_string(),
            label: "Paragraph".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" }
                },
                "required": ["text"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "list".to_string(),
            label: "List".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "style": { "type": "string", "enum": ["ordered", "unordered"] },
                    "items": { "type": "array" }
                },
                "required": ["style", "items"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "image".to_string(),
            label: "Image".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "file": {
                        "type": "object",
                        "properties": {
                            "url": { "type": "string", "minLength": 1 }
                        },
                        "required": ["url"]
                    },
                    "caption": { "type": "string" }
                },
                "required": ["file"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "quote".to_string(),
            label: "Quote".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "text": { "type": "string" },
                    "caption": { "type": "string" }
                },
                "required": ["text"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "delimiter".to_string(),
            label: "Delimiter".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {}
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "table".to_string(),
            label: "Table".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "withHeadings": { "type": "boolean" },
                    "content": {
                        "type": "array",
                        "items": {
                            "type": "array",
                            "items": { "type": "string" }
                        }
                    }
                },
                "required": ["content"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "code".to_string(),
            label: "Code".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "code": { "type": "string" }
                },
                "required": ["code"]
            }),
        });

        self.register(BlockTypeDefinition {
            type_name: "linkTool".to_string(),
            label: "Link".to_string(),
            schema: serde_json::json!({
                "type": "object",
                "properties": {
                    "link": { "type": "string", "minLength": 1 },
                    "meta": {
                        "type": "object",
                        "properties": {
                            "title": { "type": "string" }
                        }
                    }
                },
                "required": ["link"]
            }),
        });
    }

    /// Validate block data against the registered block type.
    ///
    /// Returns a list of validation error messages. An empty list means
    /// the block is valid.
    ///
    /// Validation rules per block type:
    /// - header / paragraph / quote: flag text fields ammonia would alter
    /// - header: `level` must be an integer in 1..=6 when present
    /// - list: `items` must be an array
    /// - image: `file.url` must be present and non-empty
    /// - table: `content` must be an array
    /// - code: `code` field must exist
    /// - linkTool: `link` must be present and non-empty
    pub fn validate_block(&self, type_name: &str, data: &Value) -> Vec<String> {
        let mut errors = Vec::new();

        if !self.contains(type_name) {
            errors.push(format!("unknown block type '{type_name}'"));
            return errors;
        }

        match type_name {
            "paragraph" => {
                validate_text_field(data, "text", "paragraph", &mut errors);
            }
            "header" => {
                validate_text_field(data, "text", "header", &mut errors);
                if let Some(level) = data.get("level") {
                    if let Some(n) = level.as_i64() {
                        if !(1..=6).contains(&n) {
                            errors.push(format!("header: level must be between 1 and 6, got {n}"));
                        }
                    } else {
                        errors.push("header: level must be an integer".to_string());
                    }
                }
            }
            "quote" => {
                validate_text_field(data, "text", "quote", &mut errors);
                if data.get("caption").and_then(Value::as_str).is_some() {
                    validate_text_field(data, "caption", "quote", &mut errors);
                }
            }
            "list" => match data.get("items") {
                Some(Value::Array(items)) => {
                    for (i, item) in items.iter().enumerate() {
                        if let Some(text) = item.as_str()
                            && sanitize_html(text) != text
                        {
                            errors.push(format!(
                                "list: item {i} contains disallowed HTML that was sanitized"
                            ));
                        }
                    }
                }
                Some(_) => {
                    errors.push("list: 'items' must be an array".to_string());
                }
                None => {
                    errors.push("list: missing required field 'items'".to_string());
                }
            },
            "image" => {
                let url = data
                    .get("file")
                    .and_then(|f| f.get("url"))
                    .and_then(Value::as_str);
                match url {
                    Some("") => {
                        errors.push("image: file.url must not be empty".to_string());
                    }
                    Some(_) => {}
                    None => {
                        errors.push("image: missing required field file.url".to_string());
                    }
                }
            }
            "table" => {
                if !data.get("content").is_some_and(Value::is_array) {
                    errors.push("table: 'content' must be an array of rows".to_string());
                }
            }
            "code" => {
                if data.get("code").is_none() {
                    errors.push("code: missing required field 'code'".to_string());
                }
            }
            "linkTool" => match data.get("link").and_then(Value::as_str) {
                Some("") => {
                    errors.push("linkTool: link must not be empty".to_string());
                }
                Some(_) => {}
                None => {
                    errors.push("linkTool: missing required field 'link'".to_string());
                }
            },
            // delimiter and any other registered types pass without extra validation
            _ => {}
        }

        errors
    }
}

/// Validate that a text field, when present, passes sanitization without
/// changes (i.e. contains no disallowed HTML). Missing fields are left
/// to the schema to flag.
fn validate_text_field(data: &Value, field: &str, block_type: &str, errors: &mut Vec<String>) {
    if let Some(text) = data.get(field).and_then(Value::as_str)
        && sanitize_html(text) != text
    {
        errors.push(format!(
            "{block_type}: '{field}' contains disallowed HTML that was sanitized"
        ));
    }
}
