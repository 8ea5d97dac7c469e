//! Text content sanitization for block documents.
//!
//! Rendering is deliberately verbatim, so cleaning user-authored content
//! happens here as an explicit pre-storage step. `sanitize_blocks` walks
//! the text-bearing fields of header, paragraph, and quote blocks and
//! the items of list blocks and applies `ammonia::clean` in place.

use serde_json::Value;

use crate::document::Block;

/// Sanitize HTML input using ammonia with default settings.
///
/// Strips dangerous elements like `<script>`, event handlers, and other
/// XSS vectors while preserving safe formatting tags.
pub fn sanitize_html(input: &str) -> String {
    ammonia::clean(input)
}

/// Sanitize all text content in a block sequence in-place.
pub fn sanitize_blocks(blocks: &mut [Block]) {
    for block in blocks.iter_mut() {
        match block.block_type.as_str() {
            "paragraph" | "header" | "heading" => {
                sanitize_value_field(&mut block.data, "text");
            }
            "quote" => {
                sanitize_value_field(&mut block.data, "text");
                sanitize_value_field(&mut block.data, "caption");
            }
            "list" => {
                if let Some(items) = block.data.get_mut("items").and_then(Value::as_array_mut) {
                    for item in items.iter_mut() {
                        if let Some(text) = item.as_str().map(sanitize_html) {
                            *item = Value::String(text);
                        }
                    }
                }
            }
            _ => {}
        }
    }
}

/// Sanitize a string field inside a JSON object in-place.
fn sanitize_value_field(data: &mut Value, field: &str) {
    if let Some(text) = data.get(field).and_then(Value::as_str).map(sanitize_html)
        && let Some(v) = data.as_object_mut().and_then(|obj| obj.get_mut(field))
    {
        *v = Value::String(text);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn sanitize_html_strips_script() {
        let output = sanitize_html("<p>Hello</p><script>alert('xss')</script>");
        assert!(!output.contains("<script>"));
        assert!(output.contains("<p>Hello</p>"));
    }

    #[test]
    fn sanitize_html_preserves_safe_tags() {
        let input = "<p>Hello <strong>world</strong></p>";
        assert_eq!(sanitize_html(input), input);
    }

    #[test]
    fn sanitize_html_strips_event_handlers() {
        let output = sanitize_html(r#"<a href="/page" onclick="alert('xss')">Link</a>"#);
        assert!(!output.contains("onclick"));
    }

    #[test]
    fn cleans_paragraph_text() {
        let mut blocks = vec![Block::new(
            "paragraph",
            json!({ "text": "Hello<script>alert('xss')</script>" }),
        )];
        sanitize_blocks(&mut blocks);
        let text = blocks[0].data["text"].as_str().unwrap();
        assert!(!text.contains("<script>"));
        assert!(text.contains("Hello"));
    }

    #[test]
    fn cleans_quote_text_and_caption() {
        let mut blocks = vec![Block::new(
            "quote",
            json!({ "text": "Quote<script>x</script>", "caption": "Author<script>y</script>" }),
        )];
        sanitize_blocks(&mut blocks);
        assert!(!blocks[0].data["text"].as_str().unwrap().contains("<script>"));
        assert!(
            !blocks[0].data["caption"]
                .as_str()
                .unwrap()
                .contains("<script>")
        );
    }

    #[test]
    fn cleans_list_items_keeping_safe_markup() {
        let mut blocks = vec![Block::new(
            "list",
            json!({ "style": "unordered", "items": ["Safe", "<b>Bold</b><script>bad</script>"] }),
        )];
        sanitize_blocks(&mut blocks);
        let items = blocks[0].data["items"].as_array().unwrap();
        assert_eq!(items[0], "Safe");
        assert!(!items[1].as_str().unwrap().contains("<script>"));
        assert!(items[1].as_str().unwrap().contains("<b>Bold</b>"));
    }

    #[test]
    fn leaves_non_text_blocks_unchanged() {
        let mut blocks = vec![
            Block::new(
                "image",
                json!({ "file": { "url": "https://example.com/a.png" }, "caption": "Cap" }),
            ),
            Block::new("delimiter", json!({})),
        ];
        let before = blocks.clone();
        sanitize_blocks(&mut blocks);
        assert_eq!(blocks, before);
    }

    #[test]
    fn tolerates_malformed_payloads() {
        let mut blocks = vec![
            Block::new("paragraph", json!({ "text": 42 })),
            Block::new("list", json!({ "items": "not an array" })),
            Block::new("quote", serde_json::Value::Null),
        ];
        sanitize_blocks(&mut blocks);
    }
}
