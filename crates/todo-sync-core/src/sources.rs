use crate::config::SourcesConfig;
use crate::error::Result;
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub path: PathBuf,
    pub content: String,
}

/// Find every file under `root` whose name ends with the configured suffix.
///
/// Directories named in `sources.exclude` are pruned (never the root itself).
/// Results are sorted by path so runs are reproducible.
pub fn discover(root: &Path, sources: &SourcesConfig) -> Result<Vec<PathBuf>> {
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| e.depth() == 0 || !is_excluded(e, &sources.exclude));

    let mut found = Vec::new();
    for entry in walker {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_string_lossy().ends_with(&sources.suffix) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

fn is_excluded(entry: &DirEntry, exclude: &[String]) -> bool {
    entry.file_type().is_dir()
        && exclude
            .iter()
            .any(|name| entry.file_name().to_string_lossy() == name.as_str())
}

pub fn load_documents(root: &Path, sources: &SourcesConfig) -> Result<Vec<SourceDocument>> {
    let mut docs = Vec::new();
    for path in discover(root, sources)? {
        let content = std::fs::read_to_string(&path)?;
        tracing::debug!(path = %path.display(), bytes = content.len(), "loaded source document");
        docs.push(SourceDocument { path, content });
    }
    Ok(docs)
}

/// Join documents into one text, each followed by a newline.
///
/// Blocks are extracted from the joined text, so a file that does not end in
/// a newline still has its last header line terminated.
pub fn concatenate(docs: &[SourceDocument]) -> String {
    let mut out = String::with_capacity(docs.iter().map(|d| d.content.len() + 1).sum());
    for doc in docs {
        out.push_str(&doc.content);
        out.push('\n');
    }
    out
}
