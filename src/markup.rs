use pulldown_cmark::{html, Options, Parser};

/// Render a markdown fragment to HTML
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH);
    let mut output = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut output, parser);
    output
}

/// Demote `<h1>`..`<h4>` by one level so embedded commentary nests under the
/// page's own headings
///
/// Levels are shifted from the deepest up so no heading moves twice.
pub fn shift_headings(html: &str) -> String {
    let mut shifted = html.to_string();
    for level in (1..=4).rev() {
        shifted = shifted
            .replace(&format!("<h{}>", level), &format!("<h{}>", level + 1))
            .replace(&format!("</h{}>", level), &format!("</h{}>", level + 1));
    }
    shifted
}

/// Escape HTML special characters
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
