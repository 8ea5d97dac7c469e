//! Block → HTML rendering.
//!
//! Converts a block document into a single HTML string by concatenating
//! per-type renderings in block order. Text-bearing fields are emitted
//! verbatim (inline markup in paragraph or quote text passes through
//! unchanged); only attribute values are escaped. Callers that need the
//! content cleaned run [`crate::sanitize::sanitize_blocks`] first.
//!
//! Rendering is total: missing or mistyped payload fields degrade to
//! empty strings and no input can make it panic.

use serde_json::Value;

use crate::document::{Block, BlockDocument, list_item_text};

/// Render a block document to its HTML string form.
///
/// An empty block sequence yields the empty string. Unknown block types
/// render as a paragraph when their payload carries a `text` field and
/// as nothing otherwise.
pub fn to_html(doc: &BlockDocument) -> String {
    let mut html = String::new();
    for block in &doc.blocks {
        html.push_str(&render_block(block));
    }
    html
}

fn render_block(block: &Block) -> String {
    let data = &block.data;
    match block.block_type.as_str() {
        "header" | "heading" => render_header(data),
        "paragraph" => render_paragraph(data),
        "list" => render_list(data),
        "image" => render_image(data),
        "quote" => render_quote(data),
        "delimiter" => render_delimiter(),
        "table" => render_table(data),
        "code" => render_code(data),
        "linkTool" => render_link_tool(data),
        _ => render_unknown(data),
    }
}

/// Escape a string for use in an attribute value or text position.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn text_field<'a>(data: &'a Value, field: &str) -> &'a str {
    data.get(field).and_then(Value::as_str).unwrap_or("")
}

/// Data: `{ "text": "...", "level": 1..=6 }`. Absent or zero level
/// defaults to 2; out-of-range levels clamp into 1..=6.
fn render_header(data: &Value) -> String {
    let text = text_field(data, "text");
    let level = match data.get("level").and_then(Value::as_u64) {
        None | Some(0) => 2,
        Some(n) => n.clamp(1, 6),
    };
    format!("<h{level}>{text}</h{level}>")
}

/// Data: `{ "text": "..." }`. Inline markup passes through verbatim.
fn render_paragraph(data: &Value) -> String {
    format!("<p>{}</p>", text_field(data, "text"))
}

/// Data: `{ "style": "ordered"|"unordered", "items": [...] }`.
///
/// Items may be plain strings or objects; see
/// [`crate::document::list_item_text`] for the probe order. A non-array
/// `items` field renders the bare list wrapper.
fn render_list(data: &Value) -> String {
    let style = data
        .get("style")
        .and_then(Value::as_str)
        .unwrap_or("unordered");
    let tag = if style == "ordered" { "ol" } else { "ul" };

    let mut html = format!("<{tag}>");
    match data.get("items").and_then(Value::as_array) {
        Some(items) => {
            for item in items {
                html.push_str(&format!("<li>{}</li>", list_item_text(item)));
            }
        }
        None => {
            tracing::warn!("list block items field is not an array; rendering empty list");
        }
    }
    html.push_str(&format!("</{tag}>"));
    html
}

/// Data: `{ "file": { "url": "..." }, "caption": "..." }`.
/// The figcaption is emitted only for a non-empty caption.
fn render_image(data: &Value) -> String {
    let url = data
        .get("file")
        .and_then(|f| f.get("url"))
        .and_then(Value::as_str)
        .unwrap_or("");
    let caption = text_field(data, "caption");
    let mut html = format!(
        "<figure><img src=\"{}\" alt=\"{}\" />",
        html_escape(url),
        html_escape(caption)
    );
    if !caption.is_empty() {
        html.push_str(&format!("<figcaption>{caption}</figcaption>"));
    }
    html.push_str("</figure>");
    html
}

/// Data: `{ "text": "...", "caption": "..." }`. No caption, no `<cite>`.
fn render_quote(data: &Value) -> String {
    let text = text_field(data, "text");
    let caption = text_field(data, "caption");
    if caption.is_empty() {
        format!("<blockquote>{text}</blockquote>")
    } else {
        format!("<blockquote>{text}<cite>{caption}</cite></blockquote>")
    }
}

fn render_delimiter() -> String {
    "<hr />".to_string()
}

/// Data: `{ "content": [[cell, ...], ...], "withHeadings": bool }`.
/// Row 0 uses `<th>` cells when `withHeadings` is set.
fn render_table(data: &Value) -> String {
    let with_headings = data
        .get("withHeadings")
        .and_then(Value::as_bool)
        .unwrap_or(false);
    let rows = data.get("content").and_then(Value::as_array);

    let mut html = String::from("<table><tbody>");
    if let Some(rows) = rows {
        for (row_index, row) in rows.iter().enumerate() {
            let cell_tag = if with_headings && row_index == 0 {
                "th"
            } else {
                "td"
            };
            html.push_str("<tr>");
            if let Some(cells) = row.as_array() {
                for cell in cells {
                    let text = cell.as_str().unwrap_or("");
                    html.push_str(&format!("<{cell_tag}>{text}</{cell_tag}>"));
                }
            }
            html.push_str("</tr>");
        }
    }
    html.push_str("</tbody></table>");
    html
}

/// Data: `{ "code": "..." }`. The code text is emitted as-is.
fn render_code(data: &Value) -> String {
    format!("<pre><code>{}</code></pre>", text_field(data, "code"))
}

/// Data: `{ "link": "...", "meta": { "title": "..." } }`.
fn render_link_tool(data: &Value) -> String {
    let link = text_field(data, "link");
    let title = data
        .get("meta")
        .and_then(|m| m.get("title"))
        .and_then(Value::as_str)
        .filter(|t| !t.is_empty())
        .unwrap_or(link);
    format!(
        "<a href=\"{}\" target=\"_blank\">{title}</a>",
        html_escape(link)
    )
}

/// Unknown block types fall back to a paragraph when the payload carries
/// a string `text` field, and render nothing otherwise.
fn render_unknown(data: &Value) -> String {
    match data.get("text").and_then(Value::as_str) {
        Some(text) => format!("<p>{text}</p>"),
        None => String::new(),
    }
}
