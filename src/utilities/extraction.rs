//! Structured-tag extraction from free-form model output.
//!
//! Models answer with XML-like markers (`<thought>`, `<tool_call>`,
//! `<response>`). Extraction is a pure function of the input text: malformed
//! or unclosed markers are skipped, never raised.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

/// The result of extracting one tag name from a text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagContent {
    /// Whether at least one well-formed pair was found.
    pub found: bool,
    /// Raw text between each innermost open/close pair, in document order.
    pub content: Vec<String>,
}

impl TagContent {
    /// First extracted block, if any.
    pub fn first(&self) -> Option<&str> {
        self.content.first().map(String::as_str)
    }
}

static TAG_MARKER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<(/?)([A-Za-z_][A-Za-z0-9_\-]*)>").unwrap());

/// Extract the contents of every innermost `<tag>...</tag>` pair in `text`.
///
/// A pair is innermost when no other complete pair of the same tag lies
/// inside it. Close markers without a matching open marker and open markers
/// that are never closed are ignored. Markers of other tags are plain text.
pub fn extract_tag_content(text: &str, tag: &str) -> TagContent {
    // (byte offset just past the open marker, whether a nested pair closed inside)
    let mut open: Vec<(usize, bool)> = Vec::new();
    let mut content = Vec::new();

    for caps in TAG_MARKER.captures_iter(text) {
        let (Some(whole), Some(slash), Some(name)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if name.as_str() != tag {
            continue;
        }
        if slash.as_str().is_empty() {
            open.push((whole.end(), false));
            continue;
        }
        let Some((start, has_nested)) = open.pop() else {
            continue;
        };
        if !has_nested {
            content.push(text[start..whole.start()].to_string());
        }
        if let Some(parent) = open.last_mut() {
            parent.1 = true;
        }
    }

    TagContent {
        found: !content.is_empty(),
        content,
    }
}

/// Extract several tags at once, keyed by tag name.
pub fn extract_tags(text: &str, tags: &[&str]) -> HashMap<String, TagContent> {
    tags.iter()
        .map(|tag| (tag.to_string(), extract_tag_content(text, tag)))
        .collect()
}
