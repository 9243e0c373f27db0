use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use scraper::Html;
use tracing::{debug, info};

use crate::cli::InventoryArgs;
use crate::model::{CorpusFileEntry, CorpusManifest};
use crate::page::extract_reference_code;
use crate::question_code::CorpusEntry;
use crate::util::{now_utc_string, read_html, sha256_file, write_json_pretty};

const MANIFEST_FILENAME: &str = "reference_codes.json";

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.fragment_dir)?;

    if args.dry_run {
        info!(
            html_count = manifest.html_count,
            coded = manifest.files.len(),
            missing_code = manifest.missing_code_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| args.fragment_dir.join(MANIFEST_FILENAME));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote reference code manifest");
    info!(
        coded = manifest.files.len(),
        missing_code = manifest.missing_code_count,
        "inventory completed"
    );

    Ok(())
}

pub fn build_manifest(fragment_dir: &Path) -> Result<CorpusManifest> {
    let html_paths = discover_html_files(fragment_dir)?;
    if html_paths.is_empty() {
        bail!("no HTML files found in {}", fragment_dir.display());
    }

    let mut files = Vec::with_capacity(html_paths.len());
    let mut missing_code_count = 0;

    for path in &html_paths {
        let Some(reference_code) = read_reference_code(path)? else {
            missing_code_count += 1;
            continue;
        };

        let filename = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(ToOwned::to_owned)
            .with_context(|| format!("invalid UTF-8 filename: {}", path.display()))?;

        files.push(CorpusFileEntry {
            filename,
            reference_code,
            sha256: sha256_file(path)?,
        });
    }

    Ok(CorpusManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: fragment_dir.display().to_string(),
        html_count: html_paths.len(),
        missing_code_count,
        files,
    })
}

/// Reference codes of every fragment in `fragment_dir`, in file-name order.
pub fn collect_corpus_entries(fragment_dir: &Path) -> Result<Vec<CorpusEntry>> {
    let mut entries = Vec::new();
    for path in discover_html_files(fragment_dir)? {
        if let Some(reference_code) = read_reference_code(&path)? {
            entries.push(CorpusEntry {
                path,
                reference_code,
            });
        }
    }

    info!(
        directory = %fragment_dir.display(),
        coded = entries.len(),
        "scanned fragment corpus"
    );
    Ok(entries)
}

pub fn load_corpus_manifest(path: &Path) -> Result<Vec<CorpusEntry>> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    let manifest: CorpusManifest = serde_json::from_slice(&raw)
        .with_context(|| format!("failed to parse {}", path.display()))?;

    info!(
        path = %path.display(),
        generated_at = %manifest.generated_at,
        coded = manifest.files.len(),
        "loaded reference code manifest"
    );

    let source_directory = PathBuf::from(&manifest.source_directory);
    Ok(manifest
        .files
        .into_iter()
        .map(|file| CorpusEntry {
            path: source_directory.join(&file.filename),
            reference_code: file.reference_code,
        })
        .collect())
}

fn read_reference_code(path: &Path) -> Result<Option<String>> {
    let document = Html::parse_document(&read_html(path)?);
    let code = extract_reference_code(&document)?;
    if code.is_none() {
        debug!(path = %path.display(), "fragment has no reference code");
    }
    Ok(code)
}

fn discover_html_files(fragment_dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    let entries = fs::read_dir(fragment_dir)
        .with_context(|| format!("failed to read {}", fragment_dir.display()))?;

    for entry in entries {
        let entry =
            entry.with_context(|| format!("failed to read entry in {}", fragment_dir.display()))?;
        let path = entry.path();

        if !entry
            .file_type()
            .with_context(|| format!("failed to inspect file type: {}", path.display()))?
            .is_file()
        {
            continue;
        }

        let is_html = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("html"))
            .unwrap_or(false);

        if is_html {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fragment(code: &str) -> String {
        format!(
            r#"<html><body><table><tr><td class="info_label">Reference code</td><td class="info_value">{code}</td></tr></table></body></html>"#
        )
    }

    #[test]
    fn build_manifest_records_codes_and_counts_uncoded_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("2.html"), fragment("21M.1.HL.TZ1.2a")).expect("write");
        fs::write(temp.path().join("1.html"), fragment("21M.1.HL.TZ1.1")).expect("write");
        fs::write(temp.path().join("3.html"), "<p>no code</p>").expect("write");
        fs::write(temp.path().join("notes.txt"), fragment("ignored")).expect("write");

        let manifest = build_manifest(temp.path()).expect("manifest");

        assert_eq!(manifest.html_count, 3);
        assert_eq!(manifest.missing_code_count, 1);
        let codes = manifest
            .files
            .iter()
            .map(|file| (file.filename.as_str(), file.reference_code.as_str()))
            .collect::<Vec<_>>();
        assert_eq!(
            codes,
            vec![("1.html", "21M.1.HL.TZ1.1"), ("2.html", "21M.1.HL.TZ1.2a")]
        );
        assert_eq!(manifest.files[0].sha256.len(), 64);
    }

    #[test]
    fn build_manifest_fails_without_html_files() {
        let temp = tempfile::tempdir().expect("tempdir");
        let err = build_manifest(temp.path()).expect_err("empty directory should fail");
        assert!(err.to_string().contains("no HTML files"));
    }

    #[test]
    fn manifest_round_trips_into_corpus_entries() {
        let temp = tempfile::tempdir().expect("tempdir");
        fs::write(temp.path().join("7.html"), fragment("22N.2.SL.TZ0.7")).expect("write");

        let manifest_path = temp.path().join("manifests").join(MANIFEST_FILENAME);
        write_json_pretty(&manifest_path, &build_manifest(temp.path()).expect("manifest"))
            .expect("write manifest");

        let loaded = load_corpus_manifest(&manifest_path).expect("load");
        let scanned = collect_corpus_entries(temp.path()).expect("scan");
        assert_eq!(loaded, scanned);
        assert_eq!(loaded[0].path, temp.path().join("7.html"));
    }
}
