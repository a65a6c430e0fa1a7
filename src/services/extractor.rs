// src/services/extractor.rs

//! Turns an HTML document into a [`RenderedPage`].
//!
//! Approximates what a browser would show: script and style contents are
//! dropped, whitespace is collapsed, and block elements start new lines.
//! Main content is picked by a selector fallback chain: semantic containers,
//! then paragraphs, then the whole body.

use scraper::{ElementRef, Html, Node, Selector};

use crate::error::{AppError, Result};
use crate::models::{RenderedPage, RendererConfig};
use crate::utils::text::{char_len, collapse_whitespace};

/// Content containers must hold more text than this to count.
const MIN_CONTAINER_CHARS: usize = 100;
/// Paragraphs must hold more text than this to count.
const MIN_PARAGRAPH_CHARS: usize = 20;
/// Bodies shorter than this are checked for error phrases.
const SHORT_BODY_CHARS: usize = 100;

/// Elements whose text is never visible.
const INVISIBLE_TAGS: [&str; 6] = ["script", "style", "noscript", "template", "head", "title"];

/// Elements that break the text flow onto a new line.
const BLOCK_TAGS: [&str; 32] = [
    "address", "article", "aside", "blockquote", "dd", "details", "div", "dl", "dt",
    "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6",
    "header", "hr", "li", "main", "nav", "ol", "p", "pre", "section", "table", "tr", "ul",
];

/// Extracts title, text and links from HTML using precompiled selectors.
#[derive(Debug)]
pub struct PageExtractor {
    body: Selector,
    title: Selector,
    paragraph: Selector,
    anchor: Selector,
    content: Vec<Selector>,
    excluded: Vec<Selector>,
    error_phrases: Vec<String>,
}

impl PageExtractor {
    /// Compile the selectors named in `config`.
    pub fn new(config: &RendererConfig) -> Result<Self> {
        Ok(Self {
            body: parse_selector("body")?,
            title: parse_selector("title")?,
            paragraph: parse_selector("p")?,
            anchor: parse_selector("a[href]")?,
            content: parse_selectors(&config.content_selectors)?,
            excluded: parse_selectors(&config.excluded_selectors)?,
            error_phrases: config
                .error_phrases
                .iter()
                .map(|p| p.to_lowercase())
                .collect(),
        })
    }

    /// Extract everything the crawler needs from an HTML document.
    pub fn extract(&self, html: &str) -> RenderedPage {
        let document = Html::parse_document(html);

        let Some(body) = document.select(&self.body).next() else {
            return RenderedPage::default();
        };

        let body_text = self.visible_text(body, false);
        if !self.is_valid_body(&body_text) {
            return RenderedPage {
                body_text,
                ..RenderedPage::default()
            };
        }

        RenderedPage {
            title: self.title(&document),
            content: self.main_content(&document, body),
            links: self.links(&document),
            body_text,
            is_valid: true,
        }
    }

    /// A short body mentioning an error phrase is treated as an error page.
    pub fn is_valid_body(&self, body_text: &str) -> bool {
        if body_text.is_empty() || char_len(body_text) >= SHORT_BODY_CHARS {
            return true;
        }
        let lowered = body_text.to_lowercase();
        !self
            .error_phrases
            .iter()
            .any(|phrase| lowered.contains(phrase.as_str()))
    }

    fn title(&self, document: &Html) -> String {
        document
            .select(&self.title)
            .next()
            .map(|el| collapse_whitespace(&el.text().collect::<String>()))
            .unwrap_or_default()
    }

    fn links(&self, document: &Html) -> Vec<String> {
        document
            .select(&self.anchor)
            .filter_map(|a| a.value().attr("href"))
            .map(String::from)
            .collect()
    }

    fn main_content(&self, document: &Html, body: ElementRef<'_>) -> String {
        for selector in &self.content {
            let texts = self.texts_longer_than(document, selector, MIN_CONTAINER_CHARS);
            if !texts.is_empty() {
                return texts.join("\n\n");
            }
        }

        let paragraphs = self.texts_longer_than(document, &self.paragraph, MIN_PARAGRAPH_CHARS);
        if !paragraphs.is_empty() {
            return paragraphs.join("\n\n");
        }

        self.visible_text(body, true)
    }

    fn texts_longer_than(&self, document: &Html, selector: &Selector, min: usize) -> Vec<String> {
        document
            .select(selector)
            .filter(|el| !self.has_hidden_ancestor(*el))
            .map(|el| self.visible_text(el, true))
            .filter(|text| char_len(text) > min)
            .collect()
    }

    /// Rendered-looking text of `root`, one line per block.
    ///
    /// With `hide_chrome`, navigation, footers and similar page furniture
    /// are left out.
    fn visible_text(&self, root: ElementRef<'_>, hide_chrome: bool) -> String {
        let mut raw = String::new();
        self.collect_text(root, hide_chrome, &mut raw);
        raw.lines()
            .map(collapse_whitespace)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn collect_text(&self, element: ElementRef<'_>, hide_chrome: bool, out: &mut String) {
        for child in element.children() {
            match child.value() {
                Node::Text(text) => push_inline(out, text),
                Node::Element(el) => {
                    let Some(child_ref) = ElementRef::wrap(child) else {
                        continue;
                    };
                    if INVISIBLE_TAGS.contains(&el.name())
                        || (hide_chrome && self.is_chrome(child_ref))
                    {
                        continue;
                    }
                    if el.name() == "br" {
                        out.push('\n');
                        continue;
                    }

                    let block = BLOCK_TAGS.contains(&el.name());
                    if block {
                        out.push('\n');
                    }
                    self.collect_text(child_ref, hide_chrome, out);
                    if block {
                        out.push('\n');
                    }
                }
                _ => {}
            }
        }
    }

    fn is_chrome(&self, element: ElementRef<'_>) -> bool {
        self.excluded.iter().any(|sel| sel.matches(&element))
    }

    fn has_hidden_ancestor(&self, element: ElementRef<'_>) -> bool {
        element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .any(|ancestor| self.is_chrome(ancestor))
    }
}

/// Append a text node with its internal whitespace collapsed.
fn push_inline(out: &mut String, text: &str) {
    let collapsed = collapse_whitespace(text);
    if collapsed.is_empty() {
        if !text.is_empty() {
            out.push(' ');
        }
        return;
    }
    if text.starts_with(char::is_whitespace) {
        out.push(' ');
    }
    out.push_str(&collapsed);
    if text.ends_with(char::is_whitespace) {
        out.push(' ');
    }
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

fn parse_selectors(list: &[String]) -> Result<Vec<Selector>> {
    list.iter().map(|s| parse_selector(s)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> PageExtractor {
        PageExtractor::new(&RendererConfig::default()).unwrap()
    }

    fn long_text(word: &str) -> String {
        format!("{word} ").repeat(30)
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(parse_selector("[[invalid").is_err());
        let config = RendererConfig {
            content_selectors: vec!["main".into(), "[[".into()],
            ..RendererConfig::default()
        };
        assert!(PageExtractor::new(&config).is_err());
    }

    #[test]
    fn test_extracts_title_links_and_main_content() {
        let html = format!(
            r#"<html><head><title> Burger   Menu </title><script>var x = 1;</script></head>
            <body>
              <nav><a href="/home">Home</a></nav>
              <main><h1>Burgers</h1><p>{}</p></main>
              <a href="https://ext.org/x">elsewhere</a>
            </body></html>"#,
            long_text("beef")
        );
        let page = extractor().extract(&html);

        assert!(page.is_valid);
        assert_eq!(page.title, "Burger Menu");
        assert_eq!(page.links, vec!["/home", "https://ext.org/x"]);
        assert!(page.content.starts_with("Burgers\nbeef beef"));
        assert!(!page.content.contains("Home"));
        assert!(page.body_text.contains("Home"));
        assert!(!page.body_text.contains("var x"));
    }

    #[test]
    fn test_falls_back_to_paragraphs() {
        let html = r#"<html><body>
            <div><p>short</p><p>This paragraph is long enough to keep.</p></div>
            <div><p>Another paragraph that also passes the bar.</p></div>
        </body></html>"#;
        let page = extractor().extract(html);

        assert_eq!(
            page.content,
            "This paragraph is long enough to keep.\n\nAnother paragraph that also passes the bar."
        );
    }

    #[test]
    fn test_falls_back_to_body_without_chrome() {
        let html = r#"<html><body><header>Site</header><div>Just a div</div><footer>(c)</footer></body></html>"#;
        let page = extractor().extract(html);
        assert_eq!(page.content, "Just a div");
    }

    #[test]
    fn test_short_container_text_is_skipped() {
        let html = format!(
            r#"<html><body><main>tiny</main><article>{}</article></body></html>"#,
            long_text("fries")
        );
        let page = extractor().extract(&html);
        assert!(page.content.starts_with("fries fries"));
        assert!(!page.content.contains("tiny"));
    }

    #[test]
    fn test_short_error_page_is_invalid() {
        let page = extractor().extract("<html><body><h1>404 Not Found</h1></body></html>");
        assert!(!page.is_valid);
        assert!(page.links.is_empty());

        let page = extractor().extract("<html><body>Sorry, this page is unavailable.</body></html>");
        assert!(!page.is_valid);
    }

    #[test]
    fn test_long_page_mentioning_error_is_valid() {
        let html = format!(
            "<html><body><p>Error handling guide. {}</p></body></html>",
            long_text("retry")
        );
        assert!(extractor().extract(&html).is_valid);
    }

    #[test]
    fn test_empty_body_is_valid() {
        let page = extractor().extract("<html><body></body></html>");
        assert!(page.is_valid);
        assert_eq!(page.content, "");
    }

    #[test]
    fn test_inline_whitespace_collapsed() {
        let html = "<html><body><div>Hello,\n   <b>big</b>\n world<br>next line</div></body></html>";
        let page = extractor().extract(html);
        assert_eq!(page.body_text, "Hello, big world\nnext line");
    }
}
