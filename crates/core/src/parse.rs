//! HTML parsing and DOM navigation.
//!
//! This module provides the [`Document`] and [`Element`] types for parsing
//! HTML and navigating the DOM tree using CSS selectors. Text read through
//! these types is normalized with [`clean_text`](crate::text::clean_text),
//! which approximates what a browser reports as an element's rendered text.
//!
//! # Example
//!
//! ```rust
//! use wolstudy_core::parse::Document;
//!
//! let html = r#"
//!     <html>
//!         <body>
//!             <h1 id="p2">Title</h1>
//!             <p class="sb">Paragraph</p>
//!         </body>
//!     </html>
//! "#;
//!
//! let doc = Document::parse(html).unwrap();
//! assert_eq!(doc.text_of("#p2").unwrap(), "Title");
//! let paragraphs = doc.select("p.sb").unwrap();
//! assert_eq!(paragraphs.len(), 1);
//! ```

use std::collections::HashSet;

use scraper::{Html, Selector};

use crate::text::clean_text;
use crate::{Result, WolError};

fn compile(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| WolError::HtmlParseError(format!("Invalid selector: {}", e)))
}

/// Represents a parsed HTML document.
///
/// A Document wraps an HTML page and provides methods for querying elements
/// using CSS selectors and reading their normalized text.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses a full HTML page.
    pub fn parse(html: &str) -> Result<Self> {
        let html = Html::parse_document(html);
        Ok(Self { html })
    }

    /// Parses an HTML fragment, such as the content returned by the
    /// reference lookup endpoint.
    pub fn parse_fragment(html: &str) -> Self {
        Self { html: Html::parse_fragment(html) }
    }

    /// Selects elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`WolError::HtmlParseError`] if the selector is invalid.
    ///
    /// # Example
    ///
    /// ```rust
    /// use wolstudy_core::parse::Document;
    ///
    /// let html = r#"<p class="qu">First</p><p class="qu">Second</p>"#;
    /// let doc = Document::parse(html).unwrap();
    /// let elements = doc.select("p.qu").unwrap();
    /// assert_eq!(elements.len(), 2);
    /// ```
    pub fn select(&'_ self, selector: &str) -> Result<Vec<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first element matching a CSS selector, if any.
    pub fn select_first(&'_ self, selector: &str) -> Result<Option<Element<'_>>> {
        let sel = compile(selector)?;
        Ok(self.html.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Finds an element by its `id` attribute.
    pub fn by_id(&'_ self, id: &str) -> Result<Option<Element<'_>>> {
        self.select_first(&format!("[id=\"{}\"]", id))
    }

    /// Reads the cleaned text of the first element matching `selector`.
    ///
    /// # Errors
    ///
    /// Returns [`WolError::MissingElement`] when nothing matches.
    pub fn text_of(&self, selector: &str) -> Result<String> {
        self.select_first(selector)?
            .map(|el| el.clean_text())
            .ok_or_else(|| WolError::MissingElement(selector.to_string()))
    }

    /// Reads the cleaned text of every element matching `selector`.
    pub fn texts_of(&self, selector: &str) -> Result<Vec<String>> {
        Ok(self.select(selector)?.iter().map(Element::clean_text).collect())
    }

    /// The first element at the top level, which for a fragment is its root.
    pub fn first_element(&'_ self) -> Option<Element<'_>> {
        self.html
            .root_element()
            .children()
            .find_map(scraper::ElementRef::wrap)
            .map(|element| Element { element })
    }

    /// Gets all text content from the document.
    pub fn text_content(&self) -> String {
        clean_text(&self.html.root_element().text().collect::<String>())
    }
}

/// A wrapper around scraper's ElementRef for easier DOM navigation.
///
/// # Example
///
/// ```rust
/// use wolstudy_core::parse::Document;
///
/// let html = r#"<a class="b" href="/es/wol/bc/r4/lp-s/1">Juan 3:16</a>"#;
/// let doc = Document::parse(html).unwrap();
/// let link = &doc.select("a.b").unwrap()[0];
///
/// assert_eq!(link.text(), "Juan 3:16");
/// assert_eq!(link.attr("href"), Some("/es/wol/bc/r4/lp-s/1"));
/// assert!(link.has_class("b"));
/// ```
#[derive(Clone, Debug)]
pub struct Element<'a> {
    element: scraper::ElementRef<'a>,
}

impl<'a> Element<'a> {
    /// Gets the raw text content of this element.
    ///
    /// Returns the concatenation of all text nodes within this element.
    pub fn text(&self) -> String {
        self.element.text().collect()
    }

    /// Gets the text content with whitespace normalized.
    pub fn clean_text(&self) -> String {
        clean_text(&self.text())
    }

    /// Gets the cleaned text, skipping every descendant matching `selector`.
    pub fn clean_text_excluding(&self, selector: &str) -> Result<String> {
        let sel = compile(selector)?;
        let excluded: HashSet<_> = self.element.select(&sel).map(|el| el.id()).collect();

        let mut text = String::new();
        for node in self.element.descendants() {
            if let Some(chunk) = node.value().as_text()
                && !node.ancestors().any(|ancestor| excluded.contains(&ancestor.id()))
            {
                text.push_str(chunk);
            }
        }

        Ok(clean_text(&text))
    }

    /// Gets the value of an attribute.
    ///
    /// Returns `None` if the attribute is not present.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.element.value().attr(name)
    }

    /// Checks whether the element carries a class.
    pub fn has_class(&self, class: &str) -> bool {
        self.element.value().classes().any(|c| c == class)
    }

    /// Selects descendant elements using a CSS selector.
    ///
    /// # Errors
    ///
    /// Returns [`WolError::HtmlParseError`] if the selector is invalid.
    pub fn select(&self, selector: &str) -> Result<Vec<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).map(|el| Element { element: el }).collect())
    }

    /// Selects the first descendant matching a CSS selector, if any.
    pub fn select_first(&self, selector: &str) -> Result<Option<Element<'a>>> {
        let sel = compile(selector)?;
        Ok(self.element.select(&sel).next().map(|el| Element { element: el }))
    }

    /// Reads the cleaned text of the first descendant matching `selector`,
    /// or an empty string when there is none.
    pub fn text_of_or_empty(&self, selector: &str) -> Result<String> {
        Ok(self.select_first(selector)?.map(|el| el.clean_text()).unwrap_or_default())
    }
}
