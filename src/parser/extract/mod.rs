pub mod ghazaland;
pub mod roostanet;
pub mod wikibooks;

use scraper::{ElementRef, Html, Node, Selector};

/// Elements whose text never reaches the reader.
const HIDDEN: &[&str] = &["script", "style", "noscript", "template"];

pub(crate) fn selector(css: &str) -> Selector {
    Selector::parse(css).unwrap()
}

/// Concatenated text of an element, as written in the markup.
pub(crate) fn element_text(el: ElementRef) -> String {
    el.text().collect()
}

/// Text of the first match, or `None` when nothing matches or it is blank.
pub(crate) fn first_text(root: ElementRef, sel: &Selector) -> Option<String> {
    root.select(sel)
        .next()
        .map(element_text)
        .filter(|t| !t.trim().is_empty())
}

/// Non-blank text of every match, in document order.
pub(crate) fn many_text(root: ElementRef, sel: &Selector) -> Vec<String> {
    root.select(sel)
        .map(element_text)
        .filter(|t| !t.trim().is_empty())
        .collect()
}

/// Text nodes of an element, one per line, blank ones dropped.
pub(crate) fn text_lines(el: ElementRef) -> Vec<String> {
    el.text()
        .collect::<Vec<_>>()
        .join("\n")
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Elements that start a new line of visible text.
const BLOCK: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "head", "header", "hr", "li",
    "main", "nav", "ol", "p", "pre", "section", "table", "td", "th", "title", "tr", "ul",
];

/// Visible page text, one line per block element or `<br>`. Inline markup
/// stays on its line and whitespace inside text collapses to single spaces.
pub(crate) fn visible_text(doc: &Html) -> String {
    let mut lines = vec![String::new()];
    push_visible(doc.root_element(), &mut lines);
    lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn push_visible(el: ElementRef, lines: &mut Vec<String>) {
    for child in el.children() {
        match child.value() {
            Node::Text(text) => {
                let Some(line) = lines.last_mut() else { continue };
                for ch in text.chars() {
                    if !ch.is_whitespace() {
                        line.push(ch);
                    } else if !line.is_empty() && !line.ends_with(' ') {
                        line.push(' ');
                    }
                }
            }
            Node::Element(e) => {
                let name = e.name();
                if HIDDEN.contains(&name) {
                    continue;
                }
                if name == "br" {
                    lines.push(String::new());
                    continue;
                }
                let Some(child) = ElementRef::wrap(child) else { continue };
                let block = BLOCK.contains(&name);
                if block {
                    lines.push(String::new());
                }
                push_visible(child, lines);
                if block {
                    lines.push(String::new());
                }
            }
            _ => {}
        }
    }
}

/// Resolve `href` against the page it was found on.
pub(crate) fn resolve_url(base: &str, href: &str) -> Option<String> {
    let href = href.trim();
    if href.is_empty() {
        return None;
    }
    match reqwest::Url::parse(base) {
        Ok(base) => base.join(href).ok().map(|u| u.to_string()),
        Err(_) => reqwest::Url::parse(href).ok().map(|u| u.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_text_skips_scripts() {
        let doc = Html::parse_document(
            "<html><head><style>p{}</style></head><body><p>یک</p><script>var x;</script><p>دو</p></body></html>",
        );
        assert_eq!(visible_text(&doc), "یک\nدو");
    }

    #[test]
    fn visible_text_keeps_inline_markup_on_its_line() {
        let doc = Html::parse_document(
            "<html><body><p><strong>شهر</strong> رشت</p><p>سیر را\n   <em>تفت</em> دهید<br>سرو کنید</p></body></html>",
        );
        assert_eq!(visible_text(&doc), "شهر رشت\nسیر را تفت دهید\nسرو کنید");
    }

    #[test]
    fn text_lines_split_nodes() {
        let doc = Html::parse_fragment("<div>الف<br>ب\n\n<span> ج </span></div>");
        let div = doc.select(&selector("div")).next().unwrap();
        assert_eq!(text_lines(div), vec!["الف", "ب", "ج"]);
    }

    #[test]
    fn urls_resolve_against_page() {
        assert_eq!(
            resolve_url("https://ghazaland.com/recipe-cuisine/gilan/", "/recipe/kookoo/").as_deref(),
            Some("https://ghazaland.com/recipe/kookoo/")
        );
        assert_eq!(resolve_url("https://a.org/", "  "), None);
        assert_eq!(
            resolve_url("not a url", "https://b.org/x").as_deref(),
            Some("https://b.org/x")
        );
    }
}
