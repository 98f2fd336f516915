// src/checker/html.rs
// =============================================================================
// This module pulls the raw material for a report out of an HTML page.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// What we extract:
// - Every non-empty <a href="..."> value, exactly as written in the markup
//   (not resolved, not filtered, duplicates kept, in document order)
// - Every <meta> tag as a (name, content) pair
//
// Resolving the hrefs is the job of resolve.rs; keeping them raw here means
// a broken href still shows up in the report instead of vanishing.
// =============================================================================

use crate::checker::report::MetaEntry;
use scraper::{Html, Selector};
use std::sync::LazyLock;

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("Failed to parse anchor selector - this is a bug")
});

static META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("meta").expect("Failed to parse meta selector - this is a bug")
});

// What one page gives us to work with
#[derive(Debug, Clone, Default)]
pub struct PageExtract {
    pub hrefs: Vec<String>,
    pub meta_tags: Vec<MetaEntry>,
}

// Extracts hrefs and meta tags from HTML content
//
// Example:
//   html = "<meta name='description' content='Hi'><a href='/docs'>Docs</a>"
//   result.hrefs = ["/docs"]
//   result.meta_tags = [{ name: "description", content: "Hi" }]
pub fn extract_page(html: &str) -> PageExtract {
    let document = Html::parse_document(html);

    let hrefs = document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect();

    let meta_tags = document
        .select(&META_SELECTOR)
        .map(|element| {
            let el = element.value();
            // Open Graph tags use `property` instead of `name`
            let name = el
                .attr("name")
                .filter(|n| !n.is_empty())
                .or_else(|| el.attr("property"));
            MetaEntry {
                name: name.map(str::to_string),
                content: el.attr("content").map(str::to_string),
            }
        })
        .collect();

    PageExtract { hrefs, meta_tags }
}
