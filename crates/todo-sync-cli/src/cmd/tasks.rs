use crate::output::{print_json, print_table};
use serde::Serialize;
use std::path::Path;
use todo_sync_core::extract::{extract_tasks, TaskRecord};
use todo_sync_core::label::determine_phase_label;
use todo_sync_core::sources;

#[derive(Serialize)]
struct TaskRow<'a> {
    #[serde(flatten)]
    task: &'a TaskRecord,
    label: String,
}

pub fn run(root: &Path, json: bool) -> anyhow::Result<()> {
    let (_, docs) = super::load_sources(root)?;
    let tasks = extract_tasks(&sources::concatenate(&docs));

    if json {
        let rows: Vec<TaskRow> = tasks
            .iter()
            .map(|task| TaskRow {
                task,
                label: determine_phase_label(&task.title),
            })
            .collect();
        return print_json(&rows);
    }

    if tasks.is_empty() {
        println!("No tasks found in {} document(s).", docs.len());
        return Ok(());
    }

    let rows = tasks
        .iter()
        .map(|t| {
            let (done, total) = t.progress();
            vec![
                t.id.clone(),
                if t.all_completed { "done" } else { "open" }.to_string(),
                format!("{done}/{total}"),
                determine_phase_label(&t.title),
                t.title.clone(),
            ]
        })
        .collect();
    print_table(&["ID", "STATUS", "CRITERIA", "LABEL", "TITLE"], rows);
    Ok(())
}
