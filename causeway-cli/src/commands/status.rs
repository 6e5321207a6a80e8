//! Status command - stored record counts and recent activity

use anyhow::Result;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context()?;
    let summary = ctx.status_service.get_status()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
        return Ok(());
    }

    let mut table = output::create_table();
    table.set_header(vec!["Entity", "Records"]);
    table.add_row(vec!["Donors".to_string(), summary.donors.to_string()]);
    table.add_row(vec!["Partners".to_string(), summary.partners.to_string()]);
    table.add_row(vec!["Companies".to_string(), summary.companies.to_string()]);
    println!("{}", table);

    if let Some(run) = &summary.last_run {
        println!();
        println!(
            "Last import: {} from {} on {} ({} accepted, {} duplicates, {} failed)",
            run.entity,
            run.source,
            run.finished_at.format("%Y-%m-%d %H:%M"),
            run.accepted,
            run.duplicates,
            run.failed
        );
    }

    Ok(())
}
