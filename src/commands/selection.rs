use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use scraper::Html;
use serde_json::Value;
use tracing::{info, warn};
use url::Url;

use crate::cli::SelectionArgs;
use crate::commands::inventory;
use crate::page::{IndexEntry, extract_index_entries, fragment_path};
use crate::question_code::{
    CorpusEntry, GroupingMode, NormalizeOptions, QuestionIndex, Selection, normalize_and_group,
};
use crate::util::read_html;

pub(crate) struct PreparedSelection {
    pub seed_path: PathBuf,
    pub document: Html,
    pub indexed_count: usize,
    pub options: NormalizeOptions,
    pub selection: Selection,
}

/// Accepts a plain path or a `file://` URL with percent-encoded segments.
pub(crate) fn resolve_source(source: &str) -> Result<PathBuf> {
    let trimmed = source.trim();
    if !trimmed.starts_with("file:") {
        return Ok(PathBuf::from(trimmed));
    }

    let url = Url::parse(trimmed).with_context(|| format!("invalid source url: {trimmed}"))?;
    url.to_file_path()
        .map_err(|()| anyhow!("source url does not name a local file: {trimmed}"))
}

/// Flattens `--filter` values. Each value may be a JSON array or scalar, a
/// bracketed list with single quotes, or a comma-separated list.
pub(crate) fn parse_filter_args(values: &[String]) -> Vec<String> {
    values
        .iter()
        .flat_map(|value| parse_filter_value(value))
        .map(|filter| filter.trim().to_string())
        .filter(|filter| !filter.is_empty())
        .collect()
}

fn parse_filter_value(raw: &str) -> Vec<String> {
    let trimmed = raw.trim();
    if let Ok(parsed) = serde_json::from_str::<Value>(trimmed) {
        return match parsed {
            Value::Array(items) => items.into_iter().map(json_filter_text).collect(),
            other => vec![json_filter_text(other)],
        };
    }

    let unquoted = strip_quotes(trimmed);
    let listed = unquoted
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
        .unwrap_or(unquoted);

    listed
        .split(',')
        .map(|item| strip_quotes(item).to_string())
        .collect()
}

fn json_filter_text(value: Value) -> String {
    match value {
        Value::String(text) => text,
        other => other.to_string(),
    }
}

fn strip_quotes(value: &str) -> &str {
    let value = value.trim();
    for quote in ['\'', '"'] {
        if value.len() >= 2 && value.starts_with(quote) && value.ends_with(quote) {
            return &value[1..value.len() - 1];
        }
    }
    value
}

pub(crate) fn prepare(args: &SelectionArgs, seed_path: &Path) -> Result<PreparedSelection> {
    let document = Html::parse_document(&read_html(seed_path)?);
    let entries = extract_index_entries(&document, args.layout, args.include_subsections)?;

    let seed_dir = seed_path.parent().unwrap_or_else(|| Path::new("."));
    let fragment_dir = args.fragment_dir.as_deref();
    let index = entries
        .iter()
        .map(|entry| {
            (
                entry.code.clone(),
                fragment_path(seed_dir, fragment_dir, &entry.href),
            )
        })
        .collect::<QuestionIndex>();

    let mut seen = HashSet::new();
    let raw_codes = entries
        .iter()
        .filter(|entry| seen.insert(entry.code.as_str()))
        .map(|entry| entry.code.clone())
        .collect::<Vec<String>>();

    info!(
        seed = %seed_path.display(),
        layout = args.layout.as_str(),
        links = entries.len(),
        indexed = index.len(),
        "read seed index"
    );

    let options = NormalizeOptions {
        strict_parsing: args.strict_parsing,
        grouping_mode: args.grouping,
        validity: args.validity,
        substring_filters: parse_filter_args(&args.filters),
    };
    if !options.substring_filters.is_empty() {
        info!(filters = ?options.substring_filters, "filtering question codes");
    }

    let corpus = if options.grouping_mode == GroupingMode::AuthoritativeRoot {
        load_corpus(args, seed_dir, &entries)?
    } else {
        Vec::new()
    };

    let selection = normalize_and_group(&raw_codes, &index, &corpus, &options)?;
    info!(
        grouping = options.grouping_mode.as_str(),
        validity = options.validity.as_str(),
        strict = options.strict_parsing,
        candidates = selection.candidate_count,
        filtered = selection.filtered_count,
        representatives = selection.representatives.len(),
        "selected representative questions"
    );
    for code in &selection.unresolved {
        warn!(code = %code, "no fragment link for representative, skipping");
    }

    Ok(PreparedSelection {
        seed_path: seed_path.to_path_buf(),
        document,
        indexed_count: index.len(),
        options,
        selection,
    })
}

fn load_corpus(
    args: &SelectionArgs,
    seed_dir: &Path,
    entries: &[IndexEntry],
) -> Result<Vec<CorpusEntry>> {
    if let Some(manifest_path) = &args.corpus_manifest {
        return inventory::load_corpus_manifest(manifest_path);
    }

    let directory = match &args.fragment_dir {
        Some(directory) => directory.clone(),
        None => entries
            .first()
            .map(|entry| fragment_path(seed_dir, None, &entry.href))
            .and_then(|path| path.parent().map(Path::to_path_buf))
            .with_context(|| {
                format!(
                    "{} grouping needs --fragment-dir or --corpus-manifest when the seed page has no question links",
                    GroupingMode::AuthoritativeRoot.as_str()
                )
            })?,
    };

    if !directory.is_dir() {
        bail!("fragment directory not found: {}", directory.display());
    }

    inventory::collect_corpus_entries(&directory)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn filters_accept_json_lists_and_plain_values() {
        assert_eq!(
            parse_filter_args(&strings(&[r#"["TZ1", "21M.2"]"#])),
            strings(&["TZ1", "21M.2"])
        );
        assert_eq!(parse_filter_args(&strings(&["TZ2"])), strings(&["TZ2"]));
        assert_eq!(parse_filter_args(&strings(&["2021"])), strings(&["2021"]));
    }

    #[test]
    fn filters_accept_single_quoted_and_comma_separated_lists() {
        assert_eq!(
            parse_filter_args(&strings(&["['TZ1', 'TZ2']"])),
            strings(&["TZ1", "TZ2"])
        );
        assert_eq!(
            parse_filter_args(&strings(&["'HL, SL'"])),
            strings(&["HL", "SL"])
        );
        assert_eq!(
            parse_filter_args(&strings(&["a, ,b", "c"])),
            strings(&["a", "b", "c"])
        );
    }

    #[test]
    fn source_accepts_paths_and_file_urls() {
        assert_eq!(
            resolve_source(" /tmp/seed.html ").expect("path"),
            PathBuf::from("/tmp/seed.html")
        );
        assert_eq!(
            resolve_source("file:///tmp/Sixth%20Edition/seed.html").expect("url"),
            PathBuf::from("/tmp/Sixth Edition/seed.html")
        );
        assert!(resolve_source("file://remote-host/seed.html").is_err());
    }
}
