//! Block document ↔ HTML conversion.
//!
//! Bidirectional mapping between a structured block document (an ordered
//! sequence of typed content blocks as produced by a block editor) and
//! the HTML string form used for storage and display:
//!
//! - [`to_html`]: render a [`BlockDocument`] to an HTML string
//! - [`from_html`]: parse an HTML string into a [`BlockDocument`]
//!
//! Both directions are pure, synchronous, and total: malformed payloads
//! and unparseable HTML degrade to safe fallbacks rather than errors.
//! Sanitization ([`sanitize_blocks`]) and validation
//! ([`BlockTypeRegistry::validate_block`]) are separate, opt-in steps.

pub mod document;
pub mod error;
pub mod parse;
pub mod registry;
pub mod render;
pub mod sanitize;

pub use document::{Block, BlockDocument, FORMAT_VERSION};
pub use error::DocumentError;
pub use parse::from_html;
pub use registry::{BlockTypeDefinition, BlockTypeRegistry};
pub use render::to_html;
pub use sanitize::{sanitize_blocks, sanitize_html};
