use std::fmt::Write;

/// Minimal HTML page with one relative link per child directory
pub fn render_listing(caption: &str, children: &[String]) -> String {
    let caption = escape(caption);
    let mut page = format!("<html><head><title>{caption}</title></head><body><h1>{caption}</h1>");
    for child in children {
        let name = escape(child);
        let _ = write!(page, "<a href='{name}/'>{name}</a><br>");
    }
    page.push_str("</body></html>");
    page
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
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
