//! Discovery of trackable sections and CTAs in rendered markup.

use std::sync::LazyLock;

use scraper::{Html, Selector};

use crate::config::{CTA_ATTR, SECTION_ATTR};
use crate::utils::parse_selector_unsafe;

static SECTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    parse_selector_unsafe(
        &format!("h1, h2, h3, h4, h5, h6, [{SECTION_ATTR}]"),
        "section discovery",
    )
});

static CTA_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| parse_selector_unsafe(&format!("[{CTA_ATTR}]"), "cta discovery"));

/// Targets found in one scan, in document order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Discovered {
    pub sections: Vec<String>,
    pub ctas: Vec<String>,
}

/// Scans rendered markup for headings, marked sections and CTAs.
///
/// A section is named by its `data-heatmap-section` value, else its `id`,
/// else `section-{n}` by position. CTAs without a non-empty
/// `data-heatmap-cta` value cannot be reported and are skipped.
pub fn discover_targets(html: &str) -> Discovered {
    let document = Html::parse_fragment(html);

    let sections = document
        .select(&SECTION_SELECTOR)
        .enumerate()
        .map(|(index, element)| {
            let el = element.value();
            non_empty(el.attr(SECTION_ATTR))
                .or_else(|| non_empty(el.id()))
                .map(str::to_string)
                .unwrap_or_else(|| format!("section-{index}"))
        })
        .collect();

    let ctas = document
        .select(&CTA_SELECTOR)
        .filter_map(|element| non_empty(element.value().attr(CTA_ATTR)).map(str::to_string))
        .collect();

    Discovered { sections, ctas }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}
