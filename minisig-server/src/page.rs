//! 首頁渲染

const INDEX_TEMPLATE: &str = include_str!("../templates/index.html");

/// Render the index page. Both values are HTML-escaped.
pub fn render_index(name: &str, base_url: &str) -> String {
    let name = escape_html(name);
    let base_url = escape_html(base_url);

    // Single pass: substituted values are never rescanned for placeholders.
    let mut out = String::with_capacity(INDEX_TEMPLATE.len() + 4 * base_url.len());
    let mut rest = INDEX_TEMPLATE;
    while let Some(start) = rest.find("{{") {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        if let Some(after) = tail.strip_prefix("{{name}}") {
            out.push_str(&name);
            rest = after;
        } else if let Some(after) = tail.strip_prefix("{{base_url}}") {
            out.push_str(&base_url);
            rest = after;
        } else {
            out.push_str("{{");
            rest = &tail[2..];
        }
    }
    out.push_str(rest);
    out
}

fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&#34;"),
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
    fn test_render_substitutes_all() {
        let page = render_index("minisig.me", "https://minisig.me");
        assert!(page.contains("<title>minisig.me</title>"));
        assert!(page.contains("https://minisig.me/sign"));
        assert!(!page.contains("{{"));
    }

    #[test]
    fn test_render_escapes() {
        let page = render_index("<script>", "https://x.test/?a=1&b=\"2\"");
        assert!(!page.contains("<script>"));
        assert!(page.contains("&lt;script&gt;"));
        assert!(page.contains("https://x.test/?a=1&amp;b=&#34;2&#34;"));
    }

    #[test]
    fn test_render_does_not_expand_values() {
        let page = render_index("{{base_url}}", "https://x.test/{{name}}");
        assert!(page.contains("<title>{{base_url}}</title>"));
        assert!(page.contains("https://x.test/{{name}}/sign"));
        assert!(!page.contains("<title>https://x.test"));
    }
}
