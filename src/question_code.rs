//! Question-code normalization: sort keys, base identifiers, validity rules
//! and representative selection.
//!
//! A question code looks like `21M.1.AHL.TZ2.11a`: session, paper, level,
//! timezone and question segments separated by dots. Codes are only ever
//! compared against siblings from the same seed page.

use std::path::PathBuf;

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;
use tracing::debug;

mod base;
mod grouping;
mod sort_key;
mod validity;

pub use base::{base_of, last_segment};
pub use grouping::{QuestionIndex, Representative, group_and_select, select_authoritative};
pub use sort_key::{Level, ParsedKey, SortKey, SortKeyParser, pad_digit_runs};
pub use validity::is_valid;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum GroupingMode {
    /// Drop a single sub-part letter from the last segment.
    TrailingLetter,
    /// Reduce the question segment to its leading number, keeping a topic prefix.
    LeadingDigit,
    /// Group reference codes scanned from the fragment corpus by root number.
    AuthoritativeRoot,
}

impl GroupingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TrailingLetter => "trailing-letter",
            Self::LeadingDigit => "leading-digit",
            Self::AuthoritativeRoot => "authoritative-root",
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ValidityRule {
    /// Five or more segments and a question segment that starts with a number.
    QuestionNumber,
    /// Only the first sub-part of a question (`4`, `4a`, `a`).
    FirstSubpart,
}

impl ValidityRule {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuestionNumber => "question-number",
            Self::FirstSubpart => "first-subpart",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct NormalizeOptions {
    pub strict_parsing: bool,
    pub grouping_mode: GroupingMode,
    pub validity: ValidityRule,
    pub substring_filters: Vec<String>,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            strict_parsing: false,
            grouping_mode: GroupingMode::TrailingLetter,
            validity: ValidityRule::QuestionNumber,
            substring_filters: Vec::new(),
        }
    }
}

/// A code scanned from a fragment file's own "Reference code" field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CorpusEntry {
    pub path: PathBuf,
    pub reference_code: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct Selection {
    pub candidate_count: usize,
    pub filtered_count: usize,
    pub representatives: Vec<Representative>,
    pub unresolved: Vec<String>,
}

impl Selection {
    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }
}

/// Retains codes containing at least one filter as a case-sensitive substring.
/// An empty filter list keeps everything.
pub fn matches_filters(code: &str, filters: &[String]) -> bool {
    filters.is_empty() || filters.iter().any(|filter| code.contains(filter.as_str()))
}

pub fn normalize_and_group(
    raw_codes: &[String],
    index: &QuestionIndex,
    corpus: &[CorpusEntry],
    options: &NormalizeOptions,
) -> Result<Selection> {
    let parser = SortKeyParser::new(options.strict_parsing)?;
    let index = &index.filtered(|code| matches_filters(code, &options.substring_filters));

    if options.grouping_mode == GroupingMode::AuthoritativeRoot {
        let filtered = corpus
            .iter()
            .filter(|entry| matches_filters(&entry.reference_code, &options.substring_filters))
            .cloned()
            .collect::<Vec<CorpusEntry>>();
        let (representatives, unresolved) = select_authoritative(&filtered, index, &parser);

        return Ok(Selection {
            candidate_count: corpus.len(),
            filtered_count: filtered.len(),
            representatives,
            unresolved,
        });
    }

    let mut candidates = raw_codes
        .iter()
        .map(String::as_str)
        .filter(|code| matches_filters(code, &options.substring_filters))
        .collect::<Vec<&str>>();
    let filtered_count = candidates.len();

    if candidates.is_empty() {
        return Ok(Selection {
            candidate_count: raw_codes.len(),
            ..Selection::default()
        });
    }

    candidates.sort_by_cached_key(|code| parser.sort_key(code));

    let before = candidates.len();
    candidates.retain(|code| is_valid(code, options.validity));
    if candidates.len() < before {
        debug!(
            dropped = before - candidates.len(),
            rule = options.validity.as_str(),
            "dropped codes failing validity rule"
        );
    }

    let (representatives, unresolved) =
        group_and_select(&candidates, index, options.grouping_mode, &parser);

    Ok(Selection {
        candidate_count: raw_codes.len(),
        filtered_count,
        representatives,
        unresolved,
    })
}
