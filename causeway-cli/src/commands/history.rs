//! History command - recent import runs

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(limit: usize, json: bool) -> Result<()> {
    let ctx = get_context()?;
    let runs = ctx.status_service.recent_runs(limit)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&runs)?);
        return Ok(());
    }

    if runs.is_empty() {
        println!("No import runs recorded.");
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec![
        "Finished",
        "Entity",
        "Source",
        "Accepted",
        "Duplicates",
        "Failed",
    ]);

    for run in &runs {
        table.add_row(vec![
            run.finished_at.format("%Y-%m-%d %H:%M").to_string(),
            run.entity.to_string(),
            run.source.clone(),
            run.accepted.to_string(),
            run.duplicates.to_string(),
            run.failed.to_string(),
        ]);
    }

    println!("{}", table);
    Ok(())
}
