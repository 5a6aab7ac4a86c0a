//! Fallback extractor for sources without tuned selectors.
//!
//! Only the page `<title>` and the paragraph text are recovered; lead,
//! author and tags stay empty.

use super::{Extractor, element_text};
use crate::error::FetchError;
use crate::models::ArticleFields;
use itertools::Itertools;
use once_cell::sync::Lazy;
use scraper::{Html, Selector};

static TITLE: Lazy<Selector> = Lazy::new(|| Selector::parse("title").unwrap());
static PARAGRAPH: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());

#[derive(Debug, Default, Clone, Copy)]
pub struct GenericExtractor;

impl Extractor for GenericExtractor {
    fn name(&self) -> &str {
        "generic"
    }

    fn extract(&self, html: &str) -> Result<ArticleFields, FetchError> {
        let document = Html::parse_document(html);

        let title = document
            .select(&TITLE)
            .next()
            .map(element_text)
            .unwrap_or_default();

        let body = document.select(&PARAGRAPH).map(element_text).join(" ");

        Ok(ArticleFields {
            title,
            body,
            ..Default::default()
        })
    }
}
