//! Narrow parsed-document interface over `scraper`.
//!
//! Parsers only ever need to find elements by tag + attribute or by tag +
//! text pattern, then walk to a parent or a descendant. Keeping that surface
//! small keeps the extraction logic independent of the HTML library.

use regex::Regex;
use ::scraper::{ElementRef, Html, Selector};
use tracing::warn;

use super::cleaner::clean_text;

pub struct Document {
    html: Html,
}

impl Document {
    pub fn parse(body: &str) -> Self {
        Self {
            html: Html::parse_document(body),
        }
    }

    fn elements(&self, tag: &str) -> Vec<Element<'_>> {
        match Selector::parse(tag) {
            Ok(sel) => self.html.select(&sel).map(Element).collect(),
            Err(e) => {
                warn!("Bad tag selector {:?}: {:?}", tag, e);
                Vec::new()
            }
        }
    }

    /// First `tag` element whose `attr` equals `value`.
    pub fn find_by_attr(&self, tag: &str, attr: &str, value: &str) -> Option<Element<'_>> {
        self.elements(tag)
            .into_iter()
            .find(|el| el.attr(attr) == Some(value))
    }

    /// `tag` elements whose whitespace-collapsed text matches `pattern`.
    pub fn find_by_text(&self, tag: &str, pattern: &Regex) -> Vec<Element<'_>> {
        self.elements(tag)
            .into_iter()
            .filter(|el| pattern.is_match(&el.text()))
            .collect()
    }

}

#[derive(Debug, Clone, Copy)]
pub struct Element<'a>(ElementRef<'a>);

impl<'a> Element<'a> {
    /// Text of the element and its descendants, whitespace collapsed.
    pub fn text(&self) -> String {
        clean_text(&self.0.text().collect::<String>())
    }

    pub fn attr(&self, attr: &str) -> Option<&'a str> {
        self.0.value().attr(attr)
    }

    pub fn parent(&self) -> Option<Element<'a>> {
        self.0.parent().and_then(ElementRef::wrap).map(Element)
    }

    fn descendants(&self, tag: &str) -> Vec<Element<'a>> {
        match Selector::parse(tag) {
            Ok(sel) => self.0.select(&sel).map(Element).collect(),
            Err(e) => {
                warn!("Bad tag selector {:?}: {:?}", tag, e);
                Vec::new()
            }
        }
    }

    /// First descendant `tag` element.
    pub fn find(&self, tag: &str) -> Option<Element<'a>> {
        self.descendants(tag).into_iter().next()
    }

    pub fn find_all(&self, tag: &str) -> Vec<Element<'a>> {
        self.descendants(tag)
    }

    /// Descendants of `tag` whose `attr` matches `pattern`.
    pub fn find_all_by_attr_pattern(&self, tag: &str, attr: &str, pattern: &Regex) -> Vec<Element<'a>> {
        self.descendants(tag)
            .into_iter()
            .filter(|el| el.attr(attr).is_some_and(|v| pattern.is_match(v)))
            .collect()
    }

    /// True when the element has any child node, whitespace text included.
    pub fn has_content(&self) -> bool {
        self.0.has_children()
    }
}
