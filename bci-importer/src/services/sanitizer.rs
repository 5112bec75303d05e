//! Text sanitization
//!
//! Every field name and value goes through here before it reaches a store.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::store::Sanitizer;

static SCRIPT_OR_STYLE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script\s*>|<style\b[^>]*>.*?</style\s*>")
        .expect("valid script/style pattern")
});

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<[^>]*>").expect("valid tag pattern"));

/// Characters never allowed in a stored file name
const FILE_NAME_SPECIAL: &[char] = &[
    '?', '[', ']', '/', '\\', '=', '<', '>', ':', ';', ',', '\'', '"', '&', '$', '#', '*', '(',
    ')', '|', '~', '`', '!', '{', '}', '%', '+',
];

/// Default [`Sanitizer`]
#[derive(Debug, Clone, Copy, Default)]
pub struct TextSanitizer;

impl TextSanitizer {
    pub fn new() -> Self {
        Self
    }
}

/// Collapse runs of whitespace to one space and trim
fn collapse_whitespace(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

impl Sanitizer for TextSanitizer {
    fn key(&self, raw: &str) -> String {
        raw.chars()
            .map(|c| c.to_ascii_lowercase())
            .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
            .collect()
    }

    fn text(&self, raw: &str) -> String {
        let without_blocks = SCRIPT_OR_STYLE.replace_all(raw, "");
        let without_tags = TAG.replace_all(&without_blocks, "");
        let printable: String = without_tags
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect();
        collapse_whitespace(&printable)
    }

    fn slug(&self, raw: &str) -> String {
        let mut slug = String::with_capacity(raw.len());
        let mut pending_dash = false;

        for c in raw.chars().flat_map(char::to_lowercase) {
            if c.is_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }

        slug
    }

    fn file_name(&self, raw: &str) -> String {
        let cleaned: String = raw
            .chars()
            .filter(|c| !c.is_control() && !FILE_NAME_SPECIAL.contains(c))
            .collect();
        let dashed = cleaned.split_whitespace().collect::<Vec<_>>().join("-");

        dashed.trim_matches(|c| c == '.' || c == '-' || c == '_').to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_strips_everything_but_safe_ascii() {
        let s = TextSanitizer::new();
        assert_eq!(s.key("Student-First-Name"), "student-first-name");
        assert_eq!(s.key(" group_course; DROP"), "group_coursedrop");
        assert_eq!(s.key("名前"), "");
    }

    #[test]
    fn test_text_removes_markup_and_controls() {
        let s = TextSanitizer::new();
        assert_eq!(s.text("  Ana\t<b>Lee</b>\n"), "Ana Lee");
        assert_eq!(s.text("x<script>alert(1)</script>y"), "xy");
        assert_eq!(s.text("a\u{0007}b"), "a b");
        assert_eq!(s.text("http://x/doc.pdf"), "http://x/doc.pdf");
    }

    #[test]
    fn test_slug() {
        let s = TextSanitizer::new();
        assert_eq!(s.slug("doc.pdf"), "doc-pdf");
        assert_eq!(s.slug("My  Report (v2).PDF"), "my-report-v2-pdf");
        assert_eq!(s.slug("..."), "");
    }

    #[test]
    fn test_file_name() {
        let s = TextSanitizer::new();
        assert_eq!(s.file_name("doc.pdf"), "doc.pdf");
        assert_eq!(s.file_name("my report?.pdf"), "my-report.pdf");
        assert_eq!(s.file_name(".."), "");
        assert_eq!(s.file_name("a/../b.txt"), "a..b.txt");
    }
}
