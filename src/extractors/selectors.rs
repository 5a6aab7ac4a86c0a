//! Dedicated extractors built from a set of CSS selectors.
//!
//! Structured news sites expose each article part in a predictable element:
//!
//! | Field  | Taken from |
//! |--------|------------|
//! | title  | first match of `title` |
//! | lead   | first match of `lead` |
//! | body   | every `p` inside a `body` container, newline-joined |
//! | author | first match of `author` |
//! | tags   | every match of `tag` |

use super::{Extractor, element_text};
use crate::error::FetchError;
use crate::models::ArticleFields;
use itertools::Itertools;
use scraper::{Html, Selector};

/// An extractor configured with one selector per article field.
#[derive(Debug, Clone)]
pub struct SelectorExtractor {
    name: String,
    title: String,
    lead: String,
    body: String,
    author: String,
    tag: String,
}

impl SelectorExtractor {
    pub fn new(
        name: &str,
        title: &str,
        lead: &str,
        body: &str,
        author: &str,
        tag: &str,
    ) -> Self {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            lead: lead.to_string(),
            body: body.to_string(),
            author: author.to_string(),
            tag: tag.to_string(),
        }
    }

    /// NOS (nos.nl) article pages.
    pub fn nos() -> Self {
        Self::new(
            "nos",
            "h1",
            ".article__intro",
            ".article__body",
            ".article__meta-author",
            ".article__tag",
        )
    }

    /// De Telegraaf (telegraaf.nl) news articles.
    pub fn telegraaf() -> Self {
        Self::new(
            "telegraaf",
            "h1",
            ".ArticleIntro",
            ".ArticleBody",
            ".ArticleByline__author",
            ".ArticleTags__tag",
        )
    }
}

fn parse(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::Extract(format!("invalid selector {selector:?}: {e:?}")))
}

fn first_text(document: &Html, selector: &Selector) -> String {
    document
        .select(selector)
        .next()
        .map(element_text)
        .unwrap_or_default()
}

impl Extractor for SelectorExtractor {
    fn name(&self) -> &str {
        &self.name
    }

    fn extract(&self, html: &str) -> Result<ArticleFields, FetchError> {
        let title = parse(&self.title)?;
        let lead = parse(&self.lead)?;
        let body = parse(&format!("{} p", self.body))?;
        let author = parse(&self.author)?;
        let tag = parse(&self.tag)?;

        let document = Html::parse_document(html);
        let body_text = document.select(&body).map(element_text).join("\n");

        Ok(ArticleFields {
            title: first_text(&document, &title),
            lead: first_text(&document, &lead),
            body: body_text,
            author: first_text(&document, &author),
            tags: document.select(&tag).map(element_text).collect(),
        })
    }
}
