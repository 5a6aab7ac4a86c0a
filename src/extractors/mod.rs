//! Content extractors: turn a fetched article page into [`ArticleFields`].
//!
//! # Supported Extractors
//!
//! | Extractor | Module | Used for |
//! |-----------|--------|----------|
//! | Generic | [`generic`] | Any source without a dedicated extractor |
//! | Selector set | [`selectors`] | Sites with stable markup (NOS, Telegraaf) |
//!
//! Extractors never treat missing markup as an error: a selector that matches
//! nothing leaves its field empty. Which extractor handles which source is
//! decided in [`crate::fetch::SourceProfiles`].

use crate::error::FetchError;
use crate::models::ArticleFields;
use scraper::ElementRef;
use std::fmt;

pub mod generic;
pub mod selectors;

pub use generic::GenericExtractor;
pub use selectors::SelectorExtractor;

/// A strategy that extracts article fields from page markup.
pub trait Extractor: fmt::Debug + Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Extract fields from a complete HTML document.
    ///
    /// # Errors
    ///
    /// Only for failures of the extractor itself; absent elements yield
    /// default field values.
    fn extract(&self, html: &str) -> Result<ArticleFields, FetchError>;
}

/// Text content of an element with every text node trimmed, empty nodes
/// dropped and the remainder concatenated.
pub fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_element_text_strips_fragments() {
        let doc = Html::parse_fragment("<p>  Hello <b> big </b>\n world  </p>");
        let p = doc.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(element_text(p), "Hellobigworld");
    }

    #[test]
    fn test_element_text_empty() {
        let doc = Html::parse_fragment("<p>   </p>");
        let p = doc.select(&Selector::parse("p").unwrap()).next().unwrap();
        assert_eq!(element_text(p), "");
    }
}
