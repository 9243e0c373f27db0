use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use regex::Regex;
use scraper::Html;
use serde::Serialize;

use super::{PageLayout, parse_selector};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub code: String,
    pub href: String,
}

/// Collects `(code, href)` pairs from the question lists of a seed page, in
/// document order. Only blocks whose first `h3` mentions "questions" count;
/// "Sub sections" blocks are read only when asked for.
pub fn extract_index_entries(
    document: &Html,
    layout: PageLayout,
    include_subsections: bool,
) -> Result<Vec<IndexEntry>> {
    let block_selector = parse_selector(&format!(".{}", layout.block_class()))?;
    let heading_selector = parse_selector("h3")?;
    let item_selector = parse_selector("li")?;
    let link_selector = parse_selector("a")?;
    let href_pattern = Regex::new(r"\.\./(?:question_node_trees|questions)/\d+\.html")
        .context("failed to compile question link regex")?;

    let mut entries = Vec::new();

    for block in document.select(&block_selector) {
        let Some(heading) = block.select(&heading_selector).next() else {
            continue;
        };
        let heading = heading.text().collect::<String>();
        if !heading.contains("questions") {
            continue;
        }
        if heading.contains("Sub sections") && !include_subsections {
            continue;
        }

        for item in block.select(&item_selector) {
            let Some(href) = item
                .select(&link_selector)
                .next()
                .and_then(|link| link.value().attr("href"))
            else {
                continue;
            };
            if !href_pattern.is_match(href) {
                continue;
            }

            let text = item.text().collect::<String>();
            let code = text.split(':').next().unwrap_or_default().trim();
            if code.is_empty() {
                continue;
            }

            entries.push(IndexEntry {
                code: code.to_string(),
                href: href.to_string(),
            });
        }
    }

    Ok(entries)
}

/// Location of the fragment a seed link points at: the link resolved against
/// the seed page's directory, or its file name inside `fragment_dir`.
pub fn fragment_path(seed_dir: &Path, fragment_dir: Option<&Path>, href: &str) -> PathBuf {
    match fragment_dir {
        Some(dir) => dir.join(href.rsplit('/').next().unwrap_or(href)),
        None => seed_dir.join(href),
    }
}
