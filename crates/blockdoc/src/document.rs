//! Block document model.
//!
//! A `BlockDocument` is an ordered sequence of typed blocks plus format
//! metadata (creation time and format version, both informational only).
//! Block payloads are carried as raw `serde_json::Value` objects: the
//! block-editor ecosystem is inconsistent about payload shapes across
//! versions, so the converter must tolerate any shape without panicking
//! rather than enforce a rigid schema at the type level.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DocumentError;

/// Format version tag stamped on documents produced by `from_html`.
pub const FORMAT_VERSION: &str = "2.30.7";

/// One content block: a type discriminator plus a free-form data payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    /// Synthetic block ID. Cosmetic; unique within a document but not
    /// stable across conversions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    /// Block type name, e.g. "paragraph", "header", "table".
    #[serde(rename = "type")]
    pub block_type: String,
    /// Type-dependent payload. Missing or mistyped fields are tolerated
    /// everywhere; consumers fall back to empty defaults.
    #[serde(default)]
    pub data: Value,
}

impl Block {
    /// Create a block with no ID assigned.
    pub fn new(block_type: impl Into<String>, data: Value) -> Self {
        Self {
            id: None,
            block_type: block_type.into(),
            data,
        }
    }
}

/// Ordered sequence of blocks plus format metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    /// Creation timestamp in milliseconds since the epoch.
    #[serde(default)]
    pub time: i64,
    #[serde(default)]
    pub blocks: Vec<Block>,
    #[serde(default = "default_version")]
    pub version: String,
}

fn default_version() -> String {
    FORMAT_VERSION.to_string()
}

impl BlockDocument {
    /// Create a document with no blocks and a fresh timestamp.
    pub fn empty() -> Self {
        Self::with_blocks(Vec::new())
    }

    /// Create a document from a block sequence, stamping the current time
    /// and format version.
    pub fn with_blocks(blocks: Vec<Block>) -> Self {
        Self {
            time: Utc::now().timestamp_millis(),
            blocks,
            version: FORMAT_VERSION.to_string(),
        }
    }

    /// Deserialize a document from its stored JSON form.
    pub fn from_json(json: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the document to its stored JSON form.
    pub fn to_json(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Extract the display text of a list item.
///
/// Items arrive either as plain strings or as objects carrying the text
/// under one of several alternate field names depending on the editor
/// version that produced them. The probe order `content`, `text`,
/// `value`, `data` is a legacy compatibility contract and must not be
/// reordered.
pub(crate) fn list_item_text(item: &Value) -> &str {
    item.as_str()
        .or_else(|| item.get("content").and_then(Value::as_str))
        .or_else(|| item.get("text").and_then(Value::as_str))
        .or_else(|| item.get("value").and_then(Value::as_str))
        .or_else(|| item.get("data").and_then(Value::as_str))
        .unwrap_or("")
}
