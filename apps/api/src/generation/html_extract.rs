//! HTML Extraction — pulls one complete HTML document out of noisy model output.
//!
//! The model is told to return a bare document but frequently adds prose or
//! wraps the markup in a code fence. Patterns are tried in a fixed priority
//! order and the first match wins. Bare documents rank above fenced ones:
//! a fenced pattern could otherwise swallow a bare document that appears
//! later in the same output.

use std::sync::OnceLock;

use regex::{Regex, RegexBuilder};

pub const DOCTYPE: &str = "<!DOCTYPE html>";

// ────────────────────────────────────────────────────────────────────────────
// Strategy interface
// ────────────────────────────────────────────────────────────────────────────

/// One way of locating a document inside model output.
pub trait HtmlPattern: Send + Sync {
    fn name(&self) -> &'static str;

    /// Returns the extracted document, or `None` when this strategy does not apply.
    fn attempt(&self, raw: &str) -> Option<String>;
}

/// A case-insensitive, dot-matches-newline regex. When the regex has a
/// capture group the first group is the document, otherwise the whole match.
pub struct RegexPattern {
    name: &'static str,
    regex: Regex,
}

impl RegexPattern {
    fn new(name: &'static str, pattern: &str) -> Self {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .dot_matches_new_line(true)
            .build()
            .unwrap_or_else(|e| panic!("invalid built-in pattern {name}: {e}"));
        Self { name, regex }
    }
}

impl HtmlPattern for RegexPattern {
    fn name(&self) -> &'static str {
        self.name
    }

    fn attempt(&self, raw: &str) -> Option<String> {
        let caps = self.regex.captures(raw)?;
        let m = caps.get(1).or_else(|| caps.get(0))?;
        Some(m.as_str().to_string())
    }
}

/// Built-in patterns in priority order.
pub fn default_patterns() -> &'static [RegexPattern] {
    static PATTERNS: OnceLock<Vec<RegexPattern>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        vec![
            RegexPattern::new("bare-doctype", r"<!DOCTYPE html>.*?</html>"),
            RegexPattern::new("bare-html", r"<html.*?</html>"),
            RegexPattern::new(
                "fenced-html-doctype",
                r"```html\s*(<!DOCTYPE html>.*?</html>)\s*```",
            ),
            RegexPattern::new("fenced-html-html", r"```html\s*(<html.*?</html>)\s*```"),
            RegexPattern::new("fenced-doctype", r"```\s*(<!DOCTYPE html>.*?</html>)\s*```"),
            RegexPattern::new("fenced-html", r"```\s*(<html.*?</html>)\s*```"),
        ]
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Extraction
// ────────────────────────────────────────────────────────────────────────────

/// Result of running the pattern chain.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted {
    pub html: String,
    pub pattern: &'static str,
}

/// Tries each pattern in order and returns the first hit, unnormalized.
pub fn find_document<P: HtmlPattern>(raw: &str, patterns: &[P]) -> Option<Extracted> {
    patterns.iter().find_map(|p| {
        p.attempt(raw).map(|html| Extracted {
            html,
            pattern: p.name(),
        })
    })
}

/// Ensures the document starts with the doctype declaration (ignoring
/// leading whitespace). Documents that already do are returned untouched.
pub fn normalize_doctype(html: &str) -> String {
    if html.trim_start().starts_with(DOCTYPE) {
        html.to_string()
    } else {
        format!("{DOCTYPE}\n{html}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "<!DOCTYPE html>\n<html><head></head><body><h1>Jane</h1></body></html>";

    fn extract(raw: &str) -> Option<Extracted> {
        find_document(raw, default_patterns())
    }

    #[test]
    fn test_bare_document_returned_unchanged() {
        let found = extract(DOC).unwrap();
        assert_eq!(found.html, DOC);
        assert_eq!(found.pattern, "bare-doctype");
    }

    #[test]
    fn test_bare_document_surrounded_by_prose() {
        let raw = format!("Here is your resume:\n\n{DOC}\n\nLet me know if you need changes.");
        assert_eq!(extract(&raw).unwrap().html, DOC);
    }

    #[test]
    fn test_html_tagged_fence_yields_fenced_content_without_markers() {
        let raw = format!("```html\n{DOC}\n```");
        let found = extract(&raw).unwrap();
        assert_eq!(found.html, DOC);
        assert!(!found.html.contains("```"));
    }

    #[test]
    fn test_html_without_doctype_matches_second_pattern() {
        let raw = "Sure! <html><body><p>x</p></body></html> done";
        let found = extract(raw).unwrap();
        assert_eq!(found.html, "<html><body><p>x</p></body></html>");
        assert_eq!(found.pattern, "bare-html");
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        let raw = "<!doctype HTML><HTML><body></body></HTML>";
        assert_eq!(extract(raw).unwrap().html, raw);
    }

    #[test]
    fn test_lazy_match_stops_at_first_closing_tag() {
        let raw = format!("{DOC}\n{DOC}");
        assert_eq!(extract(&raw).unwrap().html, DOC);
    }

    #[test]
    fn test_no_html_yields_none() {
        assert!(extract("I cannot help with that request.").is_none());
    }

    #[test]
    fn test_bare_pattern_outranks_fenced_pattern() {
        let fenced = "```html\n<html><body>fenced</body></html>\n```";
        let raw = format!("{fenced}\n{DOC}");
        let found = extract(&raw).unwrap();
        assert_eq!(found.pattern, "bare-doctype");
        assert_eq!(found.html, DOC);
    }

    #[test]
    fn test_fenced_patterns_capture_group_when_reached() {
        // Bare patterns are skipped so the fenced ones are exercised directly.
        let fenced_only = &default_patterns()[2..];
        let raw = format!("```HTML\n{DOC}\n```");
        let found = find_document(&raw, fenced_only).unwrap();
        assert_eq!(found.pattern, "fenced-html-doctype");
        assert_eq!(found.html, DOC);

        let raw = "```\n<html><p>x</p></html>\n```";
        let found = find_document(raw, &default_patterns()[4..]).unwrap();
        assert_eq!(found.pattern, "fenced-html");
        assert_eq!(found.html, "<html><p>x</p></html>");
    }

    #[test]
    fn test_normalize_prepends_missing_doctype() {
        let html = "<html><body></body></html>";
        assert_eq!(
            normalize_doctype(html),
            "<!DOCTYPE html>\n<html><body></body></html>"
        );
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let once = normalize_doctype("<html></html>");
        assert_eq!(normalize_doctype(&once), once);
        assert_eq!(normalize_doctype(DOC), DOC);
    }

    #[test]
    fn test_normalize_ignores_leading_whitespace() {
        let html = "\n   <!DOCTYPE html><html></html>";
        assert_eq!(normalize_doctype(html), html);
    }
}
