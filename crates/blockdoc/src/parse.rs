//! HTML → block conversion.
//!
//! Parses an HTML string into a block document by walking the top-level
//! elements of the parsed fragment in order and classifying each one via
//! tag dispatch. Inputs that yield no recognized blocks degrade through
//! two fallbacks: a line-based split on newlines and `<br>` tags, and
//! finally a single paragraph holding the tag-stripped input. The
//! function is total; no input makes it fail or panic.

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Html};
use serde_json::json;

use crate::document::{Block, BlockDocument};

#[allow(clippy::expect_used)]
static LINE_SPLIT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\r?\n|<br\s*/?>").expect("line split pattern is valid"));

#[allow(clippy::expect_used)]
static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));

/// Convert an HTML string into a block document.
///
/// Empty or whitespace-only input yields a document with no blocks.
/// Produced blocks get dense sequential IDs (`block_0`, `block_1`, ...);
/// elements that yield no block do not consume an ID slot.
pub fn from_html(html: &str) -> BlockDocument {
    if html.trim().is_empty() {
        return BlockDocument::empty();
    }

    let fragment = Html::parse_fragment(html);
    let mut blocks: Vec<Block> = fragment
        .root_element()
        .children()
        .filter_map(ElementRef::wrap)
        .filter_map(classify_element)
        .collect();

    if blocks.is_empty() {
        tracing::debug!("no recognized top-level elements; using line-split fallback");
        blocks = line_split_fallback(html);
    }

    if blocks.is_empty() {
        let text = TAG_RE.replace_all(html, "").trim().to_string();
        if !text.is_empty() {
            blocks.push(Block::new("paragraph", json!({ "text": text })));
        }
    }

    for (index, block) in blocks.iter_mut().enumerate() {
        block.id = Some(format!("block_{index}"));
    }

    BlockDocument::with_blocks(blocks)
}

/// Iterate the element descendants of `el`, excluding `el` itself.
fn descendant_elements<'a>(el: ElementRef<'a>) -> impl Iterator<Item = ElementRef<'a>> {
    el.descendants().skip(1).filter_map(ElementRef::wrap)
}

fn first_descendant<'a>(el: ElementRef<'a>, tag: &str) -> Option<ElementRef<'a>> {
    descendant_elements(el).find(|e| e.value().name() == tag)
}

fn text_content(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Classify one top-level element into at most one block.
fn classify_element(el: ElementRef<'_>) -> Option<Block> {
    let name = el.value().name();
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let text = text_content(el).trim().to_string();
            if text.is_empty() {
                return None;
            }
            let level: u8 = name[1..].parse().unwrap_or(2);
            Some(Block::new("header", json!({ "text": text, "level": level })))
        }
        "p" => {
            if text_content(el).trim().is_empty() {
                return None;
            }
            // Inner markup, not text content: nested inline formatting
            // tags survive the round trip.
            let markup = el.inner_html().trim().to_string();
            Some(Block::new("paragraph", json!({ "text": markup })))
        }
        "ul" | "ol" => {
            let style = if name == "ol" { "ordered" } else { "unordered" };
            let items: Vec<String> = descendant_elements(el)
                .filter(|e| e.value().name() == "li")
                .map(|li| text_content(li).trim().to_string())
                .filter(|text| !text.is_empty())
                .collect();
            if items.is_empty() {
                return None;
            }
            Some(Block::new("list", json!({ "style": style, "items": items })))
        }
        "blockquote" => {
            let full = text_content(el);
            if full.trim().is_empty() {
                return None;
            }
            let caption = first_descendant(el, "cite")
                .map(text_content)
                .unwrap_or_default();
            let text = if caption.is_empty() {
                full
            } else {
                full.replacen(&caption, "", 1)
            };
            Some(Block::new(
                "quote",
                json!({ "text": text.trim(), "caption": caption.trim() }),
            ))
        }
        "img" => image_block(el, None),
        "figure" => {
            let img = first_descendant(el, "img")?;
            let figcaption = first_descendant(el, "figcaption")
                .map(|c| text_content(c).trim().to_string())
                .filter(|c| !c.is_empty());
            image_block(img, figcaption)
        }
        "pre" => {
            let code = first_descendant(el, "code")
                .map(text_content)
                .unwrap_or_else(|| text_content(el));
            if code.trim().is_empty() {
                return None;
            }
            Some(Block::new("code", json!({ "code": code })))
        }
        "hr" => Some(Block::new("delimiter", json!({}))),
        "table" => {
            let rows: Vec<Vec<String>> = descendant_elements(el)
                .filter(|e| e.value().name() == "tr")
                .map(|tr| {
                    descendant_elements(tr)
                        .filter(|c| matches!(c.value().name(), "td" | "th"))
                        .map(|c| text_content(c).trim().to_string())
                        .collect::<Vec<String>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect();
            if rows.is_empty() {
                return None;
            }
            let with_headings = descendant_elements(el).any(|e| e.value().name() == "th");
            Some(Block::new(
                "table",
                json!({ "withHeadings": with_headings, "content": rows }),
            ))
        }
        "script" | "style" | "meta" | "title" => None,
        _ => {
            let text = text_content(el).trim().to_string();
            if text.is_empty() {
                return None;
            }
            let markup = el.inner_html().trim().to_string();
            let body = if markup.is_empty() { text } else { markup };
            Some(Block::new("paragraph", json!({ "text": body })))
        }
    }
}

/// Build an image block from an `<img>` element, preferring an explicit
/// caption over the `alt` attribute. No `src`, no block.
fn image_block(img: ElementRef<'_>, caption: Option<String>) -> Option<Block> {
    let src = img.value().attr("src").filter(|s| !s.is_empty())?;
    let caption = caption
        .or_else(|| img.value().attr("alt").map(str::to_string))
        .unwrap_or_default();
    Some(Block::new(
        "image",
        json!({ "file": { "url": src }, "caption": caption }),
    ))
}

/// Split raw input on newlines and `<br>` tags, strip remaining tags,
/// and emit one paragraph per non-empty line.
fn line_split_fallback(html: &str) -> Vec<Block> {
    LINE_SPLIT_RE
        .split(html)
        .map(|line| TAG_RE.replace_all(line, "").trim().to_string())
        .filter(|line| !line.is_empty())
        .map(|line| Block::new("paragraph", json!({ "text": line })))
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::document::FORMAT_VERSION;

    #[test]
    fn empty_input_yields_empty_document() {
        let doc = from_html("");
        assert!(doc.blocks.is_empty());
        assert_eq!(doc.version, FORMAT_VERSION);
        assert!(doc.time > 0);
    }

    #[test]
    fn whitespace_input_yields_empty_document() {
        assert!(from_html("   ").blocks.is_empty());
        assert!(from_html("\n\t ").blocks.is_empty());
    }

    #[test]
    fn heading_levels() {
        let doc = from_html("<h1>One</h1><h4>Four</h4>");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].block_type, "header");
        assert_eq!(doc.blocks[0].data["level"], 1);
        assert_eq!(doc.blocks[0].data["text"], "One");
        assert_eq!(doc.blocks[1].data["level"], 4);
    }

    #[test]
    fn empty_heading_is_skipped() {
        let doc = from_html("<h2>  </h2><p>kept</p>");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].block_type, "paragraph");
    }

    #[test]
    fn paragraph_preserves_inline_markup() {
        let doc = from_html("<p>a <em>b</em> c</p>");
        assert_eq!(doc.blocks[0].data["text"], "a <em>b</em> c");
    }

    #[test]
    fn unordered_list() {
        let doc = from_html("<ul><li>a</li><li>b</li></ul>");
        assert_eq!(doc.blocks.len(), 1);
        let block = &doc.blocks[0];
        assert_eq!(block.block_type, "list");
        assert_eq!(block.data["style"], "unordered");
        assert_eq!(block.data["items"], json!(["a", "b"]));
    }

    #[test]
    fn ordered_list_and_empty_items_filtered() {
        let doc = from_html("<ol><li>one</li><li>  </li><li>two</li></ol>");
        let block = &doc.blocks[0];
        assert_eq!(block.data["style"], "ordered");
        assert_eq!(block.data["items"], json!(["one", "two"]));
    }

    #[test]
    fn list_with_only_empty_items_is_skipped() {
        let doc = from_html("<ul><li> </li></ul>");
        assert!(doc.blocks.is_empty());
    }

    #[test]
    fn quote_with_cite() {
        let doc = from_html("<blockquote>Words<cite>Someone</cite></blockquote>");
        let block = &doc.blocks[0];
        assert_eq!(block.block_type, "quote");
        assert_eq!(block.data["text"], "Words");
        assert_eq!(block.data["caption"], "Someone");
    }

    #[test]
    fn quote_without_cite_has_empty_caption() {
        let doc = from_html("<blockquote>Just words</blockquote>");
        assert_eq!(doc.blocks[0].data["caption"], "");
        assert_eq!(doc.blocks[0].data["text"], "Just words");
    }

    #[test]
    fn standalone_img() {
        let doc = from_html(r#"<img src="https://example.com/a.png" alt="Cap">"#);
        let block = &doc.blocks[0];
        assert_eq!(block.block_type, "image");
        assert_eq!(block.data["file"]["url"], "https://example.com/a.png");
        assert_eq!(block.data["caption"], "Cap");
    }

    #[test]
    fn img_without_src_yields_no_block() {
        let doc = from_html(r#"<img alt="nothing">"#);
        assert!(doc.blocks.iter().all(|b| b.block_type != "image"));
    }

    #[test]
    fn figure_prefers_figcaption_over_alt() {
        let doc = from_html(
            r#"<figure><img src="/a.png" alt="alt text"><figcaption>Figure cap</figcaption></figure>"#,
        );
        let block = &doc.blocks[0];
        assert_eq!(block.data["file"]["url"], "/a.png");
        assert_eq!(block.data["caption"], "Figure cap");
    }

    #[test]
    fn figure_falls_back_to_alt() {
        let doc = from_html(r#"<figure><img src="/a.png" alt="alt text"></figure>"#);
        assert_eq!(doc.blocks[0].data["caption"], "alt text");
    }

    #[test]
    fn figure_without_img_src_yields_no_block() {
        let doc = from_html("<figure><img alt=\"x\"><figcaption>cap</figcaption></figure>");
        assert!(doc.blocks.iter().all(|b| b.block_type != "image"));
    }

    #[test]
    fn pre_with_nested_code() {
        let doc = from_html("<pre><code>let x = 1;</code></pre>");
        let block = &doc.blocks[0];
        assert_eq!(block.block_type, "code");
        assert_eq!(block.data["code"], "let x = 1;");
    }

    #[test]
    fn pre_without_code_uses_own_text() {
        let doc = from_html("<pre>raw text</pre>");
        assert_eq!(doc.blocks[0].data["code"], "raw text");
    }

    #[test]
    fn hr_always_produces_delimiter() {
        let doc = from_html("<hr>");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].block_type, "delimiter");
    }

    #[test]
    fn table_with_heading_row() {
        let doc = from_html("<table><tr><th>A</th></tr><tr><td>1</td></tr></table>");
        let block = &doc.blocks[0];
        assert_eq!(block.block_type, "table");
        assert_eq!(block.data["withHeadings"], true);
        assert_eq!(block.data["content"], json!([["A"], ["1"]]));
    }

    #[test]
    fn table_without_th() {
        let doc = from_html("<table><tr><td>x</td><td>y</td></tr></table>");
        let block = &doc.blocks[0];
        assert_eq!(block.data["withHeadings"], false);
        assert_eq!(block.data["content"], json!([["x", "y"]]));
    }

    #[test]
    fn empty_table_is_skipped() {
        let doc = from_html("<table></table>");
        assert!(doc.blocks.iter().all(|b| b.block_type != "table"));
    }

    #[test]
    fn generic_element_with_text_becomes_paragraph() {
        let doc = from_html("<div>some <b>rich</b> text</div>");
        let block = &doc.blocks[0];
        assert_eq!(block.block_type, "paragraph");
        assert_eq!(block.data["text"], "some <b>rich</b> text");
    }

    #[test]
    fn script_and_style_elements_are_ignored() {
        let doc = from_html("<p>keep</p><style>.a{color:red}</style>");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].data["text"], "keep");
    }

    #[test]
    fn plain_text_falls_back_to_line_split() {
        let doc = from_html("first line\nsecond line");
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].block_type, "paragraph");
        assert_eq!(doc.blocks[0].data["text"], "first line");
        assert_eq!(doc.blocks[1].data["text"], "second line");
    }

    #[test]
    fn br_separated_text_splits_into_paragraphs() {
        let doc = from_html("alpha<br>beta<br/>gamma<BR />delta");
        let texts: Vec<&str> = doc
            .blocks
            .iter()
            .map(|b| b.data["text"].as_str().unwrap())
            .collect();
        assert_eq!(texts, ["alpha", "beta", "gamma", "delta"]);
    }

    #[test]
    fn single_line_plain_text_becomes_one_paragraph() {
        let doc = from_html("just some text");
        assert_eq!(doc.blocks.len(), 1);
        assert_eq!(doc.blocks[0].data["text"], "just some text");
    }

    #[test]
    fn ids_are_dense_and_ordered() {
        let doc = from_html("<h2>A</h2><p></p><p>B</p>");
        // The empty <p> yields no block and consumes no ID slot.
        assert_eq!(doc.blocks.len(), 2);
        assert_eq!(doc.blocks[0].id.as_deref(), Some("block_0"));
        assert_eq!(doc.blocks[1].id.as_deref(), Some("block_1"));
    }

    #[test]
    fn blocks_keep_source_order() {
        let doc = from_html("<h1>T</h1><p>body</p><hr><ul><li>i</li></ul>");
        let types: Vec<&str> = doc.blocks.iter().map(|b| b.block_type.as_str()).collect();
        assert_eq!(types, ["header", "paragraph", "delimiter", "list"]);
    }
}
