//! Markdown to HTML rendering for policy documents.

use pulldown_cmark::{html, Event, Options, Parser};

/// Renders Markdown to an HTML fragment.
///
/// Tables and strikethrough are enabled, single newlines become `<br />`
/// and raw HTML in the source is emitted as escaped text.
pub fn render(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);

    let parser = Parser::new_ext(markdown, options).map(|event| match event {
        Event::SoftBreak => Event::HardBreak,
        Event::Html(raw) | Event::InlineHtml(raw) => Event::Text(raw),
        other => other,
    });

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

/// Escapes text for inclusion in HTML element content or quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_heading_and_list() {
        let html = render("# Access Control Policy\n\n- MFA required\n- Quarterly review\n");
        assert!(html.contains("<h1>Access Control Policy</h1>"));
        assert!(html.contains("<li>MFA required</li>"));
    }

    #[test]
    fn test_render_table() {
        let html = render("| Level | Meaning |\n|---|---|\n| Internal | Staff only |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>Internal</td>"));
    }

    #[test]
    fn test_render_fenced_code() {
        let html = render("```\nchmod 600 key.pem\n```\n");
        assert!(html.contains("<pre><code>chmod 600 key.pem"));
    }

    #[test]
    fn test_render_newline_becomes_break() {
        let html = render("line one\nline two");
        assert!(html.contains("line one<br />"));
    }

    #[test]
    fn test_render_escapes_raw_html() {
        let html = render("<script>alert(1)</script>\n");
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(""), "");
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">Tom & Jerry's</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Tom &amp; Jerry&#39;s&lt;/a&gt;"
        );
        assert_eq!(escape_html("plain"), "plain");
    }
}
