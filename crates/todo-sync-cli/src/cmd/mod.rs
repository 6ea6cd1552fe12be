pub mod config;
pub mod sync;
pub mod tasks;

use anyhow::Context;
use std::path::Path;
use todo_sync_core::config::SyncSettings;
use todo_sync_core::sources::{self, SourceDocument};

/// Load and check settings, then read every TODO document under `root`.
pub(crate) fn load_sources(root: &Path) -> anyhow::Result<(SyncSettings, Vec<SourceDocument>)> {
    let settings = SyncSettings::load(root).context("failed to load .todo-sync.yaml")?;
    settings.ensure_valid()?;
    let docs = sources::load_documents(root, &settings.sources)
        .with_context(|| format!("failed to read TODO documents under {}", root.display()))?;
    tracing::debug!(documents = docs.len(), "loaded TODO documents");
    Ok((settings, docs))
}
