use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use scraper::Html;
use tracing::{info, warn};

use crate::cli::CompileArgs;
use crate::commands::selection::{PreparedSelection, prepare, resolve_source};
use crate::model::{CompileCounts, CompilePaths, CompileRunManifest};
use crate::page::{
    AssetRewrite, DocumentEdits, extract_fragment, render_document, render_question_container,
};
use crate::question_code::Representative;
use crate::util::{
    ensure_parent_directory, now_utc_string, read_html, sha256_file, utc_compact_string,
    write_json_pretty,
};

#[derive(Debug, Default)]
struct Assembly {
    questions_html: String,
    assembled: Vec<String>,
    missing_fragment_count: usize,
    empty_fragment_count: usize,
    warnings: Vec<String>,
}

pub fn run(args: CompileArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("compile-{}", utc_compact_string(started_ts));

    let seed_path = resolve_source(&args.selection.source)?;
    copy_seed(&seed_path, &args.output)?;
    info!(
        run_id = %run_id,
        seed = %seed_path.display(),
        output = %args.output.display(),
        "copied seed page"
    );

    let prepared = prepare(&args.selection, &seed_path)?;
    let rewrite = AssetRewrite {
        prefix: args.asset_prefix.clone(),
        root: args.asset_root.clone(),
    };

    let (status, assembly) = if prepared.selection.is_empty() {
        warn!("no questions remain after filtering, nothing to assemble");
        ("empty", Assembly::default())
    } else {
        let mut assembly =
            assemble_questions(&prepared.selection.representatives, &args, &rewrite);
        assembly.warnings.extend(
            prepared
                .selection
                .unresolved
                .iter()
                .map(|code| format!("no fragment link for {code}")),
        );

        let html = render_document(
            &prepared.document,
            &DocumentEdits {
                layout: args.selection.layout,
                rewrite: &rewrite,
                questions_html: &assembly.questions_html,
            },
        );
        fs::write(&args.output, html)
            .with_context(|| format!("failed to write {}", args.output.display()))?;

        info!(
            path = %args.output.display(),
            assembled = assembly.assembled.len(),
            missing = assembly.missing_fragment_count,
            empty = assembly.empty_fragment_count,
            "wrote compiled page"
        );
        ("completed", assembly)
    };

    if let Some(manifest_path) = &args.manifest_path {
        let manifest = build_manifest(
            run_id,
            status,
            started_at,
            &args,
            &prepared,
            &seed_path,
            assembly,
        )?;
        write_json_pretty(manifest_path, &manifest)?;
        info!(path = %manifest_path.display(), "wrote compile run manifest");
    }

    Ok(())
}

fn copy_seed(seed_path: &Path, output: &Path) -> Result<()> {
    if !seed_path.is_file() {
        bail!("seed page not found: {}", seed_path.display());
    }
    if output.exists() && fs::canonicalize(seed_path).ok() == fs::canonicalize(output).ok() {
        bail!("output {} would overwrite the seed page", output.display());
    }

    ensure_parent_directory(output)?;
    fs::copy(seed_path, output).with_context(|| {
        format!(
            "failed to copy {} to {}",
            seed_path.display(),
            output.display()
        )
    })?;
    Ok(())
}

fn assemble_questions(
    representatives: &[Representative],
    args: &CompileArgs,
    rewrite: &AssetRewrite,
) -> Assembly {
    let mut assembly = Assembly::default();

    for representative in representatives {
        let code = representative.code.as_str();
        let path = representative.path.as_path();

        if !path.is_file() {
            warn!(code = %code, path = %path.display(), "fragment file not found, skipping");
            assembly.missing_fragment_count += 1;
            assembly
                .warnings
                .push(format!("fragment file not found for {code}: {}", path.display()));
            continue;
        }

        let content = read_html(path).and_then(|raw| {
            extract_fragment(&Html::parse_document(&raw), args.selection.layout, rewrite)
        });

        match content {
            Ok(Some(content)) => {
                assembly
                    .questions_html
                    .push_str(&render_question_container(code, &content));
                assembly.assembled.push(code.to_string());
            }
            Ok(None) => {
                warn!(
                    code = %code,
                    path = %path.display(),
                    "fragment has no question content, skipping"
                );
                assembly.empty_fragment_count += 1;
                assembly
                    .warnings
                    .push(format!("no question content in {}", path.display()));
            }
            Err(err) => {
                warn!(code = %code, error = %err, "failed to process fragment, skipping");
                assembly.missing_fragment_count += 1;
                assembly.warnings.push(format!("error processing {code}: {err}"));
            }
        }
    }

    assembly
}

fn build_manifest(
    run_id: String,
    status: &str,
    started_at: String,
    args: &CompileArgs,
    prepared: &PreparedSelection,
    seed_path: &Path,
    assembly: Assembly,
) -> Result<CompileRunManifest> {
    let selection = &prepared.selection;

    Ok(CompileRunManifest {
        manifest_version: 1,
        run_id,
        status: status.to_string(),
        started_at,
        finished_at: now_utc_string(),
        layout: args.selection.layout,
        options: prepared.options.clone(),
        paths: CompilePaths {
            seed_path: seed_path.display().to_string(),
            output_path: args.output.display().to_string(),
        },
        seed_sha256: sha256_file(seed_path)?,
        output_sha256: args
            .output
            .is_file()
            .then(|| sha256_file(&args.output))
            .transpose()?,
        counts: CompileCounts {
            indexed_count: prepared.indexed_count,
            candidate_count: selection.candidate_count,
            filtered_count: selection.filtered_count,
            representative_count: selection.representatives.len(),
            unresolved_count: selection.unresolved.len(),
            assembled_count: assembly.assembled.len(),
            missing_fragment_count: assembly.missing_fragment_count,
            empty_fragment_count: assembly.empty_fragment_count,
        },
        assembled: assembly.assembled,
        warnings: assembly.warnings,
    })
}
