use scraper::{Html, Selector};

/// Picks the article headline out of a page.
///
/// First `<h1>` wins. Without one, the `<title>` is used up to the first `|`
/// (sites append their own name after it).
pub fn extract_headline(html: &str) -> Option<String> {
    let doc = Html::parse_document(html);
    first_text(&doc, "h1").or_else(|| {
        first_text(&doc, "title")
            .and_then(|t| t.split('|').next().map(|s| s.trim().to_string()))
            .filter(|t| !t.is_empty())
    })
}

fn first_text(doc: &Html, css: &str) -> Option<String> {
    let selector = Selector::parse(css).ok()?;
    let node = doc.select(&selector).next()?;
    let text = node.text().collect::<Vec<_>>().join(" ");
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_h1_wins() {
        let html = r#"<html><head><title>Ignored | Site</title></head>
            <body><h1>  Main <em>story</em>
            </h1><h1>Second</h1></body></html>"#;
        assert_eq!(extract_headline(html).as_deref(), Some("Main story"));
    }

    #[test]
    fn falls_back_to_title_before_separator() {
        let html = "<html><head><title> Budget approved | News Site </title></head><body></body></html>";
        assert_eq!(extract_headline(html).as_deref(), Some("Budget approved"));
    }

    #[test]
    fn empty_h1_uses_title() {
        let html = "<html><head><title>Only title</title></head><body><h1>   </h1></body></html>";
        assert_eq!(extract_headline(html).as_deref(), Some("Only title"));
    }

    #[test]
    fn nothing_usable() {
        assert_eq!(extract_headline("<html><body><p>text</p></body></html>"), None);
        assert_eq!(extract_headline("<title>| Site</title>"), None);
    }
}
