use pulldown_cmark::{Options, Parser, html};

/// Inline styles applied per tag when exporting for word processors, which
/// ignore `<style>` blocks on paste.
const EXPORT_STYLES: &[(&str, &str)] = &[
    ("div", "font-family: 'Times New Roman', serif; font-size: 12pt; line-height: 1.5; color: #000000; text-align: justify;"),
    ("h1", "font-size: 22pt; font-weight: bold; margin-top: 24pt; margin-bottom: 12pt; text-align: center;"),
    ("h2", "font-size: 16pt; font-weight: bold; margin-top: 18pt; margin-bottom: 12pt; border-bottom: 1px solid #eee;"),
    ("h3", "font-size: 14pt; font-weight: bold; margin-top: 12pt; margin-bottom: 6pt;"),
    ("h4", "font-size: 12pt; font-weight: bold; margin-top: 10pt; margin-bottom: 6pt;"),
    ("p", "margin-bottom: 10pt;"),
    ("ul", "margin-bottom: 10pt; padding-left: 2em;"),
    ("ol", "margin-bottom: 10pt; padding-left: 2em;"),
    ("li", "margin-bottom: 4pt;"),
    ("pre", "background-color: #f5f5f5; border: 1px solid #ddd; padding: 10pt; font-family: Consolas, Monaco, monospace; font-size: 10.5pt; margin-bottom: 10pt; white-space: pre-wrap;"),
    ("code", "background-color: #f5f5f5; font-family: Consolas, Monaco, monospace; padding: 2px 4px; font-size: 10.5pt;"),
    ("blockquote", "border-left: 4px solid #ccc; padding-left: 10pt; color: #666; margin: 10pt 0; font-style: italic;"),
    ("table", "border-collapse: collapse; width: 100%; margin-bottom: 12pt;"),
    ("th", "border: 1px solid #000; padding: 6pt; text-align: left; background-color: #f2f2f2; font-weight: bold;"),
    ("td", "border: 1px solid #000; padding: 6pt; text-align: left;"),
    ("img", "max-width: 100%; height: auto; margin: 12pt auto; display: block;"),
    ("a", "color: #0563c1; text-decoration: underline;"),
];

/// Render markdown text to an HTML fragment.
pub fn convert_to_presentation(text: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let parser = Parser::new_ext(text, options);
    let mut html_output = String::new();
    html::push_html(&mut html_output, parser);

    html_output
}

/// Wrap a rendered fragment in a complete, self-styled HTML document that
/// word processors accept from the clipboard.
pub fn build_export_document(fragment: &str) -> String {
    let wrapped = format!("<div class=\"word-export\">{}</div>", fragment);
    let styled = inline_export_styles(&wrapped);
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n<title>Document</title>\n</head>\n<body>\n{}\n</body>\n</html>",
        styled
    )
}

/// Add a `style` attribute to every opening tag listed in `EXPORT_STYLES`.
/// Tags that already carry a style are left alone.
pub fn inline_export_styles(html: &str) -> String {
    let mut out = String::with_capacity(html.len() * 2);
    let mut rest = html;

    while let Some(lt) = rest.find('<') {
        out.push_str(&rest[..lt]);
        let tag_content = &rest[lt..];
        let tag_end = match tag_content.find('>') {
            Some(i) => i + 1,
            None => {
                out.push_str(tag_content);
                return out;
            }
        };
        let tag = &tag_content[..tag_end];
        let name_len = tag[1..]
            .find(|c: char| !c.is_ascii_alphanumeric())
            .unwrap_or(tag.len() - 1);
        let name = tag[1..1 + name_len].to_ascii_lowercase();

        match EXPORT_STYLES.iter().find(|(n, _)| *n == name) {
            Some((_, style)) if !tag.contains("style=") => {
                out.push_str(&tag[..1 + name_len]);
                out.push_str(&format!(" style=\"{}\"", style));
                out.push_str(&tag[1 + name_len..]);
            }
            _ => out.push_str(tag),
        }

        rest = &rest[lt + tag_end..];
    }

    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_headings_and_tables() {
        let html = convert_to_presentation("# Title\n\n| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<h1>Title</h1>"));
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>1</td>"));
    }

    #[test]
    fn test_convert_partial_prefix_is_valid() {
        let text = "```rust\nfn main() {}\n```\n";
        let html = convert_to_presentation(&text[..10]);
        assert!(html.contains("<pre>"));
    }

    #[test]
    fn test_inline_styles_skip_closing_tags() {
        let html = inline_export_styles("<p>Hi <a href=\"x\">x</a></p>");
        assert!(html.starts_with("<p style=\"margin-bottom: 10pt;\">Hi "));
        assert!(html.contains("<a style=\"color: #0563c1; text-decoration: underline;\" href=\"x\">"));
        assert!(html.ends_with("</a></p>"));
    }

    #[test]
    fn test_inline_styles_leave_unknown_tags() {
        let html = inline_export_styles("<em>x</em><strong>y</strong>");
        assert_eq!(html, "<em>x</em><strong>y</strong>");
    }

    #[test]
    fn test_export_document_is_complete() {
        let doc = build_export_document("<h2>Intro</h2>");
        assert!(doc.starts_with("<!DOCTYPE html>"));
        assert!(doc.contains("<meta charset=\"utf-8\">"));
        assert!(doc.contains("<div style="));
        assert!(doc.contains("<h2 style=\"font-size: 16pt;"));
        assert!(doc.trim_end().ends_with("</html>"));
    }
}
