//! # Social Preview Meta Tags
//!
//! Link-preview crawlers do not run the client app, so `/card/<id>` pages get
//! card-specific title, description and image tags written into `index.html`
//! before it is served. Other paths get the file untouched.

/// Fixed preview content for card links
#[derive(Debug, Clone)]
pub struct MetaRewriter {
    public_url: String,
    title: String,
    description: String,
    image: String,
}

impl MetaRewriter {
    pub fn new(public_url: &str) -> Self {
        Self {
            public_url: public_url.trim_end_matches('/').to_string(),
            title: "เธอได้รับการ์ดวาเลนไทน์นะ 💖".to_string(),
            description: "มีคนส่งเซอร์ไพรส์มาให้เธอด้วยแหละ... ลองเปิดดูนะ".to_string(),
            image: "https://images.unsplash.com/photo-1518199266791-5375a83190b7?w=1200&h=630&fit=crop".to_string(),
        }
    }

    /// Rewrite `html` for `request_uri` (path plus query). Non-card URIs pass through.
    pub fn render(&self, html: &str, request_uri: &str) -> String {
        if !is_card_path(request_uri) {
            return html.to_string();
        }

        let url = format!("{}{}", self.public_url, request_uri);
        let mut out = replace_title(html, &self.title);
        for (attr, key, value) in [
            ("property", "og:title", &self.title),
            ("property", "og:description", &self.description),
            ("property", "og:url", &url),
            ("property", "og:image", &self.image),
            ("name", "twitter:image", &self.image),
            ("name", "twitter:title", &self.title),
            ("name", "twitter:description", &self.description),
            ("name", "description", &self.description),
        ] {
            out = replace_meta(&out, attr, key, value);
        }
        set_html_lang(&out, "th")
    }
}

/// True when the path contains `/card/` followed by at least one id character
pub fn is_card_path(request_uri: &str) -> bool {
    let path = request_uri.split(['?', '#']).next().unwrap_or("");
    path.match_indices("/card/").any(|(i, m)| {
        path[i + m.len()..]
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}

fn replace_title(html: &str, title: &str) -> String {
    let tag = format!("<title>{}</title>", escape_html(title));
    match (html.find("<title>"), html.find("</title>")) {
        (Some(start), Some(end)) if end > start => {
            format!("{}{}{}", &html[..start], tag, &html[end + "</title>".len()..])
        }
        _ => insert_into_head(html, &tag),
    }
}

/// Replace the whole `<meta attr="key" ...>` tag, or add one to `<head>`
fn replace_meta(html: &str, attr: &str, key: &str, value: &str) -> String {
    let tag = format!(r#"<meta {}="{}" content="{}" />"#, attr, key, escape_html(value));
    let marker = format!(r#"{}="{}""#, attr, key);

    let mut search_from = 0;
    while let Some(offset) = html[search_from..].find(&marker) {
        let at = search_from + offset;
        let start = html[..at].rfind('<');
        let end = html[at..].find('>').map(|e| at + e + 1);
        if let (Some(start), Some(end)) = (start, end) {
            if html[start..].starts_with("<meta") {
                return format!("{}{}{}", &html[..start], tag, &html[end..]);
            }
        }
        search_from = at + marker.len();
    }
    insert_into_head(html, &tag)
}

fn insert_into_head(html: &str, tag: &str) -> String {
    match html.find("</head>") {
        Some(i) => format!("{}  {}\n  {}", &html[..i], tag, &html[i..]),
        None => html.to_string(),
    }
}

fn set_html_lang(html: &str, lang: &str) -> String {
    let Some(start) = html.find("<html") else {
        return html.to_string();
    };
    let Some(len) = html[start..].find('>') else {
        return html.to_string();
    };
    let open_tag = &html[start..start + len];

    let new_tag = match open_tag.find(" lang=\"") {
        Some(i) => {
            let value_start = i + " lang=\"".len();
            let value_end = open_tag[value_start..].find('"').map_or(open_tag.len(), |e| value_start + e);
            format!("{}{}{}", &open_tag[..value_start], lang, &open_tag[value_end..])
        }
        None => format!("<html lang=\"{}\"{}", lang, &open_tag["<html".len()..]),
    };
    format!("{}{}{}", &html[..start], new_tag, &html[start + len..])
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <title>Valentine Card Maker</title>
  <meta name="description" content="Make a card" />
  <meta property="og:title" content="Valentine Card Maker" />
  <meta property="og:url" content="https://example.com/" />
  <meta name="twitter:title" content="Valentine Card Maker" />
</head>
<body></body>
</html>"#;

    fn rewriter() -> MetaRewriter {
        MetaRewriter::new("https://cards.example.com/")
    }

    #[test]
    fn test_card_path_detection() {
        assert!(is_card_path("/card/abc123"));
        assert!(is_card_path("/card/abc123/summary?x=1"));
        assert!(!is_card_path("/card/"));
        assert!(!is_card_path("/create"));
        assert!(!is_card_path("/?next=/card"));
    }

    #[test]
    fn test_non_card_path_untouched() {
        assert_eq!(rewriter().render(INDEX, "/create"), INDEX);
    }

    #[test]
    fn test_card_path_rewrites_tags() {
        let html = rewriter().render(INDEX, "/card/abc123");

        assert!(html.contains("<html lang=\"th\">"));
        assert!(html.contains("<title>เธอได้รับการ์ดวาเลนไทน์นะ 💖</title>"));
        assert!(!html.contains("Valentine Card Maker"));
        assert!(html.contains(r#"<meta property="og:url" content="https://cards.example.com/card/abc123" />"#));
        assert!(html.contains(r#"<meta name="description" content="มีคนส่งเซอร์ไพรส์มาให้เธอด้วยแหละ... ลองเปิดดูนะ" />"#));
        // og:image was absent and gets added, with the query string escaped
        assert!(html.contains(
            r#"<meta property="og:image" content="https://images.unsplash.com/photo-1518199266791-5375a83190b7?w=1200&amp;h=630&amp;fit=crop" />"#
        ));
        assert_eq!(html.matches("og:title").count(), 1);
    }

    #[test]
    fn test_lang_added_when_missing() {
        assert_eq!(set_html_lang("<html><head></head></html>", "th"), "<html lang=\"th\"><head></head></html>");
        assert_eq!(
            set_html_lang("<html class=\"x\" lang=\"en-US\">", "th"),
            "<html class=\"x\" lang=\"th\">"
        );
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html(r#"<a href="x">'&'</a>"#), "&lt;a href=&quot;x&quot;&gt;&#039;&amp;&#039;&lt;/a&gt;");
    }
}
