//! Textual HTML rewriting applied before documents are staged.

/// Insert `<base href="…">` right after the first literal `<head>`.
///
/// This is a plain substring match, not an HTML parse: a document without
/// `<head>` (including `<head lang=…>` or `<HEAD>`) is returned unchanged,
/// and a `<head>` inside a comment or attribute value still matches.
pub fn inject_base_tag(html: &str, base_url: &str) -> String {
    const HEAD: &str = "<head>";

    match html.find(HEAD) {
        Some(pos) => {
            let split = pos + HEAD.len();
            let mut out = String::with_capacity(html.len() + base_url.len() + 16);
            out.push_str(&html[..split]);
            out.push_str("<base href=\"");
            out.push_str(base_url);
            out.push_str("\">");
            out.push_str(&html[split..]);
            out
        }
        None => html.to_owned(),
    }
}
