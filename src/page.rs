//! HTML side of the pipeline: reading the seed index, pulling question content
//! out of fragment pages and serializing the compiled document.

use anyhow::{Result, anyhow};
use clap::ValueEnum;
use scraper::Selector;
use serde::Serialize;

mod fragments;
mod reference;
mod seed_index;
#[cfg(test)]
mod tests;
mod writer;

pub use fragments::extract_fragment;
pub use reference::extract_reference_code;
pub use seed_index::{IndexEntry, extract_index_entries, fragment_path};
pub use writer::{AssetRewrite, DocumentEdits, render_document, render_question_container};

pub const DEFAULT_ASSET_PREFIX: &str = "../../../../../../";

/// Structure of the exported pages. The two layouts differ in how index
/// blocks are marked, where question content lives in a fragment, and where
/// compiled questions are placed.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PageLayout {
    /// Index blocks are `.row`; fragments hold a `div.p-3.bg-white.rounded`.
    Rows,
    /// Index blocks are `.module`; fragments hold an `h2` delimited section.
    Modules,
}

impl PageLayout {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rows => "rows",
            Self::Modules => "modules",
        }
    }

    fn block_class(self) -> &'static str {
        match self {
            Self::Rows => "row",
            Self::Modules => "module",
        }
    }
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|err| anyhow!("invalid selector {selector}: {err:?}"))
}

fn has_class(element: &scraper::node::Element, class: &str) -> bool {
    element.classes().any(|value| value == class)
}
