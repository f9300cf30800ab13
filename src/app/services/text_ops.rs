/// Extract filename from a file path
///
/// Splits on both `/` and `\` so paths forwarded from another platform's
/// shell still get a sensible title. Returns "Unknown" if nothing usable
/// remains.
pub fn extract_filename(path: &str) -> String {
    path.rsplit(['/', '\\'])
        .find(|s| !s.is_empty())
        .filter(|s| *s != "." && *s != "..")
        .map(|s| s.to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

/// Append `.md` unless the path already ends in it (case-insensitive).
pub fn ensure_markdown_extension(path: &str) -> String {
    if path.to_lowercase().ends_with(".md") {
        path.to_string()
    } else {
        format!("{}.md", path)
    }
}

/// Byte offset of the first `chars` characters of `text`.
///
/// Returns `text.len()` when the text is shorter than `chars`.
pub fn char_boundary(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map_or(text.len(), |(idx, _)| idx)
}

/// Strip tags from an HTML fragment, keeping text content and block breaks.
///
/// Used for the plain-text alternative of a rich-text export; entities other
/// than the five XML ones are left as-is.
pub fn html_to_plain_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;
    while let Some(start) = rest.find('<') {
        out.push_str(&rest[..start]);
        let Some(end) = rest[start..].find('>') else {
            rest = "";
            break;
        };
        let tag = &rest[start + 1..start + end];
        let name = tag
            .trim_start_matches('/')
            .split(|c: char| c.is_whitespace() || c == '/')
            .next()
            .unwrap_or("")
            .to_lowercase();
        if tag.starts_with('/') && is_block_tag(&name) && !out.ends_with('\n') {
            out.push('\n');
        } else if name == "br" {
            out.push('\n');
        }
        rest = &rest[start + end + 1..];
    }
    out.push_str(rest);
    out.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
        .trim_end()
        .to_string()
}

fn is_block_tag(name: &str) -> bool {
    matches!(
        name,
        "p" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" | "li" | "pre" | "blockquote" | "tr" | "table"
            | "ul" | "ol" | "div"
    )
}
