use anyhow::Result;
use scraper::{ElementRef, Html, Selector};

use super::writer::{AssetRewrite, render_element};
use super::{PageLayout, parse_selector};

const CONTENT_CLASS: &str = "question-content";

/// Pulls the question body out of a fragment page as a serialized
/// `div.question-content`. `None` when the page has no recognizable content.
pub fn extract_fragment(
    document: &Html,
    layout: PageLayout,
    rewrite: &AssetRewrite,
) -> Result<Option<String>> {
    match layout {
        PageLayout::Rows => extract_panel(document, rewrite),
        PageLayout::Modules => extract_question_section(document, rewrite),
    }
}

fn extract_panel(document: &Html, rewrite: &AssetRewrite) -> Result<Option<String>> {
    let selector = parse_selector("div.p-3.bg-white.rounded")?;
    Ok(document
        .select(&selector)
        .next()
        .map(|panel| render_element(panel, Some(CONTENT_CLASS), rewrite)))
}

// Content runs from the "Question" heading up to, not including, the
// "Syllabus sections" heading; both must be present.
fn extract_question_section(document: &Html, rewrite: &AssetRewrite) -> Result<Option<String>> {
    let selector = parse_selector("h2")?;
    let start = find_heading(document, &selector, "Question");
    let end = find_heading(document, &selector, "Syllabus sections");

    let (Some(start), Some(end)) = (start, end) else {
        return Ok(None);
    };

    let mut out = format!(r#"<div class="{CONTENT_CLASS}">"#);
    out.push_str(&render_element(start, None, rewrite));
    for sibling in start.next_siblings().filter_map(ElementRef::wrap) {
        if sibling.id() == end.id() {
            break;
        }
        out.push_str(&render_element(sibling, None, rewrite));
    }
    out.push_str("</div>");

    Ok(Some(out))
}

fn find_heading<'a>(document: &'a Html, selector: &Selector, title: &str) -> Option<ElementRef<'a>> {
    document
        .select(selector)
        .find(|heading| heading.text().collect::<String>().trim() == title)
}
