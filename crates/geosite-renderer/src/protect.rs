//! Protected `<script>` and `<style>` blocks.
//!
//! Raw blocks are swapped for opaque markers before any rewriting and put back
//! byte-for-byte afterwards. JSON-LD blocks are split into opening tag, inner
//! text and closing tag; only the inner text is later eligible for placeholder
//! replacement.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static BLOCK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?is)<script(?:[\s/][^>]*)?>.*?</script\s*>|<style(?:[\s/][^>]*)?>.*?</style\s*>",
    )
    .expect("invalid protected block regex")
});

static MARKER_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new("\u{1}(raw|ld):([0-9]+)\u{1}").expect("invalid block marker regex")
});

const STRUCTURED_DATA_TYPE: &str = "application/ld+json";

/// A JSON-LD script element split into its parts.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StructuredBlock {
    /// Opening `<script ...>` tag.
    pub open: String,
    /// Text between the tags.
    pub inner: String,
    /// Closing `</script>` tag.
    pub close: String,
}

/// Blocks taken out of a template, addressed by index.
#[derive(Debug, Default)]
pub struct ProtectedBlocks {
    raw: Vec<String>,
    structured: Vec<StructuredBlock>,
}

impl ProtectedBlocks {
    /// Replace every script/style element in `text` with a marker.
    ///
    /// Returns the rewritten text together with the captured blocks.
    #[must_use]
    pub fn extract(text: &str) -> (String, Self) {
        let mut blocks = Self::default();

        let masked = BLOCK_PATTERN
            .replace_all(text, |caps: &Captures<'_>| {
                let element = &caps[0];
                match split_structured(element) {
                    Some(block) => {
                        blocks.structured.push(block);
                        format!("\u{1}ld:{}\u{1}", blocks.structured.len() - 1)
                    }
                    None => {
                        blocks.raw.push(element.to_owned());
                        format!("\u{1}raw:{}\u{1}", blocks.raw.len() - 1)
                    }
                }
            })
            .into_owned();

        (masked, blocks)
    }

    /// Put every block back into `text`.
    ///
    /// `rewrite` is applied to the inner text of each JSON-LD block; raw blocks
    /// are restored verbatim. Markers with no matching block are left in place.
    #[must_use]
    pub fn restore(&self, text: &str, rewrite: impl Fn(&str) -> String) -> String {
        if self.is_empty() {
            return text.to_owned();
        }

        MARKER_PATTERN
            .replace_all(text, |caps: &Captures<'_>| {
                let index: Option<usize> = caps[2].parse().ok();
                let restored = match (&caps[1], index) {
                    ("ld", Some(i)) => self.structured.get(i).map(|block| {
                        format!("{}{}{}", block.open, rewrite(&block.inner), block.close)
                    }),
                    ("raw", Some(i)) => self.raw.get(i).cloned(),
                    _ => None,
                };
                restored.unwrap_or_else(|| caps[0].to_owned())
            })
            .into_owned()
    }

    /// Number of raw (fully protected) blocks.
    #[must_use]
    pub fn raw_count(&self) -> usize {
        self.raw.len()
    }

    /// Number of JSON-LD blocks.
    #[must_use]
    pub fn structured_count(&self) -> usize {
        self.structured.len()
    }

    /// Whether nothing was extracted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.raw.is_empty() && self.structured.is_empty()
    }
}

/// Split a `<script type="application/ld+json">` element into its parts.
///
/// Returns `None` for any other element.
fn split_structured(element: &str) -> Option<StructuredBlock> {
    let open_end = element.find('>')? + 1;
    let open = &element[..open_end];
    if !open.to_ascii_lowercase().contains(STRUCTURED_DATA_TYPE) {
        return None;
    }

    let close_start = element.rfind("</")?;
    if close_start < open_end {
        return None;
    }

    Some(StructuredBlock {
        open: open.to_owned(),
        inner: element[open_end..close_start].to_owned(),
        close: element[close_start..].to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_extract_and_restore_roundtrip() {
        let html = "<p>{a|b}</p><script>var x = {y|z};</script><style>p { color: red }</style>";

        let (masked, blocks) = ProtectedBlocks::extract(html);

        assert_eq!(blocks.raw_count(), 2);
        assert!(!masked.contains("<script>"));
        assert!(!masked.contains("<style>"));
        assert_eq!(blocks.restore(&masked, str::to_owned), html);
    }

    #[test]
    fn test_extract_is_case_insensitive_and_multiline() {
        let html = "<SCRIPT src=\"a.js\">\nline1\nline2\n</Script >";

        let (masked, blocks) = ProtectedBlocks::extract(html);

        assert_eq!(masked, "\u{1}raw:0\u{1}");
        assert_eq!(blocks.raw_count(), 1);
    }

    #[test]
    fn test_custom_elements_are_not_protected() {
        let html = "<script-card>[City]</script-card><style-guide>{a|b}</style-guide>\
                    <script>x</script><style>p {}</style>";

        let (masked, blocks) = ProtectedBlocks::extract(html);

        assert_eq!(
            masked,
            "<script-card>[City]</script-card><style-guide>{a|b}</style-guide>\
             \u{1}raw:0\u{1}\u{1}raw:1\u{1}"
        );
        assert_eq!(blocks.raw_count(), 2);
    }

    #[test]
    fn test_structured_block_split() {
        let html = r#"<script type="application/ld+json">{"name": "[City]"}</script>"#;

        let (masked, blocks) = ProtectedBlocks::extract(html);

        assert_eq!(masked, "\u{1}ld:0\u{1}");
        assert_eq!(blocks.structured_count(), 1);
        assert_eq!(
            blocks.structured[0],
            StructuredBlock {
                open: r#"<script type="application/ld+json">"#.to_owned(),
                inner: r#"{"name": "[City]"}"#.to_owned(),
                close: "</script>".to_owned(),
            }
        );
    }

    #[test]
    fn test_restore_rewrites_structured_inner_only() {
        let html = r#"<script type="application/ld+json">[City]</script><script>[City]</script>"#;

        let (masked, blocks) = ProtectedBlocks::extract(html);
        let restored = blocks.restore(&masked, |inner| inner.replace("[City]", "Austin"));

        assert_eq!(
            restored,
            r#"<script type="application/ld+json">Austin</script><script>[City]</script>"#
        );
    }

    #[test]
    fn test_unknown_marker_left_in_place() {
        let (_, blocks) = ProtectedBlocks::extract("<style>x</style>");

        let restored = blocks.restore("\u{1}raw:5\u{1}", str::to_owned);

        assert_eq!(restored, "\u{1}raw:5\u{1}");
    }

    #[test]
    fn test_no_blocks() {
        let (masked, blocks) = ProtectedBlocks::extract("<p>plain</p>");

        assert_eq!(masked, "<p>plain</p>");
        assert!(blocks.is_empty());
    }
}
