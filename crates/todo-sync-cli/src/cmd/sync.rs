use crate::output::print_json;
use anyhow::Context;
use clap::Args;
use std::path::Path;
use todo_sync_core::config::TrackerConfig;
use todo_sync_core::reconcile::{self, Plan};
use todo_sync_core::sources;
use todo_sync_core::tracker::github::GitHubTracker;

#[derive(Args)]
pub struct TrackerArgs {
    /// GitHub token used as a bearer credential
    #[arg(long, env = "GITHUB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Target repository as owner/name
    #[arg(long = "repo", env = "GITHUB_REPOSITORY")]
    repository: Option<String>,

    /// API base URL (GitHub Enterprise or a test server)
    #[arg(long, env = "GITHUB_API_URL")]
    api_url: Option<String>,
}

pub fn run(root: &Path, args: TrackerArgs, dry_run: bool, json: bool) -> anyhow::Result<()> {
    let (settings, docs) = super::load_sources(root)?;

    // Resolve credentials before any network traffic.
    let config = TrackerConfig::resolve(args.token, args.repository, args.api_url)
        .context("invalid tracker configuration")?
        .with_settings(&settings.tracker);
    let repository = config.repository.clone();

    let text = sources::concatenate(&docs);
    tracing::info!(
        documents = docs.len(),
        repository = %repository,
        dry_run,
        "syncing TODO documents"
    );

    let plan = if dry_run {
        let tracker = GitHubTracker::new(config).context("failed to build HTTP client")?;
        reconcile::preview(&text, &tracker)
            .with_context(|| format!("failed to plan sync for {repository}"))?
    } else {
        reconcile::run(config, &text).with_context(|| format!("sync with {repository} failed"))?
    };

    if json {
        let documents: Vec<String> = docs
            .iter()
            .map(|d| {
                d.path
                    .strip_prefix(root)
                    .unwrap_or(&d.path)
                    .display()
                    .to_string()
            })
            .collect();
        print_json(&serde_json::json!({
            "repository": repository,
            "dry_run": dry_run,
            "documents": documents,
            "plan": plan,
        }))?;
    } else {
        print_plan(&plan, dry_run);
    }
    Ok(())
}

fn print_plan(plan: &Plan, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    for skipped in &plan.skipped {
        println!("{prefix}{skipped}");
    }
    for action in &plan.actions {
        println!("{prefix}{action}");
    }
    if plan.is_noop() {
        println!("{prefix}Everything up to date ({} tracked).", plan.unchanged);
    } else {
        println!("{prefix}{}", plan.summary());
    }
}
