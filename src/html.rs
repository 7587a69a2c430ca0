//! HTML document shell for the DOCX → PDF path.

pub const STYLESHEET: &str = "\
    body { font-family: Arial, Helvetica, sans-serif; margin: 1cm; color: #000; }
    img { max-width: 100%; height: auto; }";

/// Wrap a converted fragment in a standalone UTF-8 document. The fragment is
/// inserted verbatim.
pub fn wrap_document(fragment: &str) -> String {
    format!(
        "<html>\n<head>\n<meta charset=\"utf-8\" />\n<style>\n{}\n</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        STYLESHEET, fragment
    )
}

/// Escape text for use in element content and double-quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_document_keeps_fragment_verbatim() {
        let fragment = "<p>Hello <strong>world</strong></p>";
        let doc = wrap_document(fragment);
        assert!(doc.contains("<meta charset=\"utf-8\" />"));
        assert!(doc.contains(&format!("<body>\n{}\n</body>", fragment)));
    }

    #[test]
    fn test_stylesheet_rules() {
        let doc = wrap_document("");
        assert!(doc.contains("margin: 1cm"));
        assert!(doc.contains("font-family: Arial, Helvetica, sans-serif"));
        assert!(doc.contains("img { max-width: 100%; height: auto; }"));
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("a < b & \"c\" > d"), "a &lt; b &amp; &quot;c&quot; &gt; d");
    }
}
