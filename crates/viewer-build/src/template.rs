//! The single-file document template and its placeholder substitution.

/// HTML shell with `{{name}}` placeholders.
const VIEWER_TEMPLATE: &str = include_str!("../assets/viewer.html");

/// Everything interpolated into the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentParts<'a> {
    /// Page title (HTML-escaped on insertion).
    pub title: &'a str,
    /// Meta description (HTML-escaped on insertion).
    pub description: &'a str,
    /// Stylesheet text, inserted verbatim.
    pub stylesheet: &'a str,
    /// Concatenated modules, inserted verbatim.
    pub modules: &'a str,
    /// Validated default configuration JSON.
    pub default_config: &'a str,
    /// Global name of the rendering engine class.
    pub engine: &'a str,
}

/// Render the viewer document.
pub fn render_document(parts: &DocumentParts<'_>) -> String {
    let title = escape_html(parts.title);
    let description = escape_html(parts.description);
    let config = embed_json_literal(parts.default_config);
    render(VIEWER_TEMPLATE, |name| match name {
        "title" => Some(title.as_str()),
        "description" => Some(description.as_str()),
        "stylesheet" => Some(parts.stylesheet),
        "modules" => Some(parts.modules),
        "default_config" => Some(config.as_str()),
        "engine" => Some(parts.engine),
        _ => None,
    })
}

/// Substitute `{{name}}` placeholders in one pass over `template`.
///
/// Substituted text is never rescanned, so inserted content may contain `{{` freely.
/// Unknown placeholders are left as written.
fn render<'v>(template: &str, lookup: impl Fn(&str) -> Option<&'v str>) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            out.push_str(&rest[start..]);
            return out;
        };
        let name = &after[..end];
        match lookup(name) {
            Some(value) => out.push_str(value),
            None => {
                out.push_str("{{");
                out.push_str(name);
                out.push_str("}}");
            }
        }
        rest = &after[end + 2..];
    }
    out.push_str(rest);
    out
}

/// Prepare validated JSON for an inline `<script>`.
///
/// `<`, `>` and `&` only occur inside JSON strings, where their `\uXXXX` escapes parse to the
/// same value. With no literal `<` left, no string can close the script element or switch the
/// HTML parser into a script comment state (`<!--<script>`).
pub fn embed_json_literal(raw: &str) -> String {
    let raw = raw.trim();
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '<' => out.push_str("\\u003c"),
            '>' => out.push_str("\\u003e"),
            '&' => out.push_str("\\u0026"),
            _ => out.push(ch),
        }
    }
    out
}

/// Escape text for HTML element content and attribute values.
fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parts<'a>(stylesheet: &'a str, modules: &'a str, config: &'a str) -> DocumentParts<'a> {
        DocumentParts {
            title: "GenomeData Table Viewer",
            description: "Viewer",
            stylesheet,
            modules,
            default_config: config,
            engine: "TableRenderer",
        }
    }

    #[test]
    fn all_placeholders_are_filled() {
        let html = render_document(&parts(".a { color: red; }", "/* m */", "{\"a\":1}"));
        for name in [
            "title",
            "description",
            "stylesheet",
            "modules",
            "default_config",
            "engine",
        ] {
            assert!(!html.contains(&format!("{{{{{name}}}}}")), "{name} left over");
        }
        assert!(html.contains("const DEFAULT_CONFIG = {\"a\":1};"));
        assert!(html.contains("const Engine = TableRenderer;"));
        assert!(html.contains(".a { color: red; }"));
        assert!(html.contains("<title>GenomeData Table Viewer</title>"));
    }

    #[test]
    fn inserted_text_is_not_rescanned() {
        let html = render_document(&parts("/* {{modules}} */", "MODULES", "{}"));
        assert!(html.contains("/* {{modules}} */"));
        assert_eq!(html.matches("MODULES").count(), 1);
    }

    #[test]
    fn unknown_and_unterminated_placeholders_are_kept() {
        let out = render("a {{x}} b {{y", |n| (n == "z").then_some("Z"));
        assert_eq!(out, "a {{x}} b {{y");
    }

    #[test]
    fn script_close_in_config_is_escaped() {
        let literal = embed_json_literal("  {\"html\":\"</script><b>\"}\n");
        assert_eq!(
            literal,
            r#"{"html":"\u003c/script\u003e\u003cb\u003e"}"#
        );
        let value: serde_json::Value = serde_json::from_str(&literal).unwrap();
        assert_eq!(value["html"], "</script><b>");
    }

    #[test]
    fn script_comment_opener_in_config_is_escaped() {
        let raw = r#"{"n":"<!--<script>","q":"a && b"}"#;
        let literal = embed_json_literal(raw);
        assert!(!literal.contains('<'));
        assert!(!literal.contains('>'));
        assert!(!literal.contains("<!--"));
        let value: serde_json::Value = serde_json::from_str(&literal).unwrap();
        let original: serde_json::Value = serde_json::from_str(raw).unwrap();
        assert_eq!(value, original);

        let html = render_document(&parts("", "", raw));
        assert!(!html.contains("<!--<script>"));
        assert_eq!(html.matches("</script>").count(), 1);
    }

    #[test]
    fn title_is_escaped() {
        let mut p = parts("", "", "{}");
        p.title = "A & B <viewer>";
        let html = render_document(&p);
        assert!(html.contains("<title>A &amp; B &lt;viewer&gt;</title>"));
    }
}
