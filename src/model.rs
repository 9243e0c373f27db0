use serde::{Deserialize, Serialize};

use crate::page::PageLayout;
use crate::question_code::{NormalizeOptions, Representative};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusFileEntry {
    pub filename: String,
    pub reference_code: String,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub html_count: usize,
    pub missing_code_count: usize,
    pub files: Vec<CorpusFileEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompilePaths {
    pub seed_path: String,
    pub output_path: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompileCounts {
    pub indexed_count: usize,
    pub candidate_count: usize,
    pub filtered_count: usize,
    pub representative_count: usize,
    pub unresolved_count: usize,
    pub assembled_count: usize,
    pub missing_fragment_count: usize,
    pub empty_fragment_count: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct CompileRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub finished_at: String,
    pub layout: PageLayout,
    pub options: NormalizeOptions,
    pub paths: CompilePaths,
    pub seed_sha256: String,
    pub output_sha256: Option<String>,
    pub counts: CompileCounts,
    pub assembled: Vec<String>,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CodesListing {
    pub seed_path: String,
    pub layout: PageLayout,
    pub options: NormalizeOptions,
    pub candidate_count: usize,
    pub filtered_count: usize,
    pub representatives: Vec<Representative>,
    pub unresolved: Vec<String>,
}
