use anyhow::Result;
use scraper::{ElementRef, Html};

use super::{has_class, parse_selector};

/// Reads the "Reference code" value from a fragment's info table.
pub fn extract_reference_code(document: &Html) -> Result<Option<String>> {
    let label_selector = parse_selector("td.info_label")?;

    let Some(label) = document
        .select(&label_selector)
        .find(|label| label.text().collect::<String>().trim() == "Reference code")
    else {
        return Ok(None);
    };

    let code = label
        .next_siblings()
        .filter_map(ElementRef::wrap)
        .find(|cell| cell.value().name() == "td" && has_class(cell.value(), "info_value"))
        .map(|cell| cell.text().collect::<String>().trim().to_string())
        .filter(|code| !code.is_empty());

    Ok(code)
}
