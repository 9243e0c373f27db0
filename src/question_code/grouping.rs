use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};

use serde::Serialize;

use super::base::{base_of, last_segment, root_of};
use super::sort_key::SortKeyParser;
use super::{CorpusEntry, GroupingMode};

/// Question code to fragment file. Later inserts of the same code win.
#[derive(Debug, Clone, Default)]
pub struct QuestionIndex {
    entries: BTreeMap<String, PathBuf>,
}

impl QuestionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, code: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.insert(code.into(), path.into());
    }

    pub fn resolve(&self, code: &str) -> Option<&Path> {
        self.entries.get(code).map(PathBuf::as_path)
    }

    /// Copy holding only the codes `keep` accepts.
    pub fn filtered(&self, keep: impl Fn(&str) -> bool) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .filter(|(code, _)| keep(code))
                .map(|(code, path)| (code.clone(), path.clone()))
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Into<String>, P: Into<PathBuf>> FromIterator<(C, P)> for QuestionIndex {
    fn from_iter<I: IntoIterator<Item = (C, P)>>(iter: I) -> Self {
        let mut index = Self::new();
        for (code, path) in iter {
            index.insert(code, path);
        }
        index
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Representative {
    pub code: String,
    pub path: PathBuf,
}

/// Buckets `codes` by base identifier and picks one resolvable representative
/// per bucket. Returns the representatives in sort-key order plus the codes
/// chosen for buckets where no member could be resolved.
pub fn group_and_select(
    codes: &[&str],
    index: &QuestionIndex,
    mode: GroupingMode,
    parser: &SortKeyParser,
) -> (Vec<Representative>, Vec<String>) {
    let mut buckets = Vec::<(String, Vec<&str>)>::new();
    let mut positions = HashMap::<String, usize>::new();

    for &code in codes {
        let base = base_of(code, mode);
        match positions.get(&base) {
            Some(&position) => buckets[position].1.push(code),
            None => {
                positions.insert(base.clone(), buckets.len());
                buckets.push((base, vec![code]));
            }
        }
    }

    let mut representatives = Vec::with_capacity(buckets.len());
    let mut unresolved = Vec::new();

    for (base, members) in buckets {
        if let Some(path) = index.resolve(&base) {
            representatives.push(Representative {
                code: base,
                path: path.to_path_buf(),
            });
            continue;
        }

        let Some(chosen) = members
            .iter()
            .copied()
            .min_by(|left, right| last_segment(left).cmp(last_segment(right)))
        else {
            continue;
        };

        let path = index
            .resolve(chosen)
            .or_else(|| members.iter().find_map(|member| index.resolve(member)));

        match path {
            Some(path) => representatives.push(Representative {
                code: chosen.to_string(),
                path: path.to_path_buf(),
            }),
            None => unresolved.push(chosen.to_string()),
        }
    }

    representatives.sort_by_cached_key(|representative| parser.sort_key(&representative.code));
    (representatives, unresolved)
}

/// Groups corpus reference codes by root number. A root that exists as a code
/// of its own replaces its sub-parts; otherwise every sub-part is kept.
pub fn select_authoritative(
    corpus: &[CorpusEntry],
    index: &QuestionIndex,
    parser: &SortKeyParser,
) -> (Vec<Representative>, Vec<String>) {
    let mut corpus_paths = HashMap::<&str, &Path>::new();
    for entry in corpus {
        corpus_paths
            .entry(entry.reference_code.as_str())
            .or_insert(entry.path.as_path());
    }

    let codes = corpus
        .iter()
        .map(|entry| entry.reference_code.as_str())
        .collect::<BTreeSet<&str>>();

    let mut roots = BTreeMap::<String, Vec<&str>>::new();
    for &code in &codes {
        if let Some(root) = root_of(code) {
            roots.entry(root).or_default().push(code);
        }
    }

    let mut selected = Vec::<&str>::new();
    for (root, members) in &roots {
        match codes.get(root.as_str()) {
            Some(&standalone) => selected.push(standalone),
            None => selected.extend(members.iter().copied()),
        }
    }

    let mut representatives = Vec::with_capacity(selected.len());
    let mut unresolved = Vec::new();
    for code in selected {
        let path = index
            .resolve(code)
            .or_else(|| corpus_paths.get(code).copied());
        match path {
            Some(path) => representatives.push(Representative {
                code: code.to_string(),
                path: path.to_path_buf(),
            }),
            None => unresolved.push(code.to_string()),
        }
    }

    representatives.sort_by_cached_key(|representative| parser.sort_key(&representative.code));
    (representatives, unresolved)
}
