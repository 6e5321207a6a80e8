//! Import command - import records from CSV

use std::path::PathBuf;
use std::str::FromStr;

use anyhow::Result;
use colored::Colorize;
use indicatif::ProgressBar;

use super::get_context;
use causeway_core::config::{ImportProfile, ProfileOptions};
use causeway_core::services::{ImportOptions, NoProgress, ProgressFn};
use causeway_core::EntityKind;

use crate::output;

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: Option<PathBuf>,
    entity: Option<String>,
    allow_duplicates: bool,
    dry_run: bool,
    error_log: Option<PathBuf>,
    profile: Option<String>,
    save_profile: Option<String>,
    list_profiles: bool,
    json: bool,
) -> Result<()> {
    let ctx = get_context()?;

    // List profiles
    if list_profiles {
        let profiles = ctx.import_service.list_profiles()?;

        if json {
            println!("{}", serde_json::to_string_pretty(&profiles)?);
        } else if profiles.is_empty() {
            println!("No saved profiles.");
        } else {
            println!("Saved import profiles:");
            for (name, profile) in &profiles {
                println!();
                println!("  {}", name.green());
                println!("    Entity: {}", profile.entity);
                if !profile.options.skip_duplicates {
                    println!("    Options: allow duplicates");
                }
            }
        }
        return Ok(());
    }

    // Require file path for import
    let file_path = file.ok_or_else(|| anyhow::anyhow!("File path required for import"))?;

    // Resolve entity and default options from profile or flags
    let (kind, profile_options, using_profile) = if let Some(profile_name) = &profile {
        let p = ctx
            .import_service
            .get_profile(profile_name)?
            .ok_or_else(|| anyhow::anyhow!("Profile not found: {}", profile_name))?;
        (p.entity, Some(p.options), Some(profile_name.clone()))
    } else {
        let name = entity.ok_or_else(|| {
            anyhow::anyhow!("--entity required for import (donor, partner, or company)")
        })?;
        let kind = EntityKind::from_str(&name).map_err(|e| anyhow::anyhow!(e))?;
        (kind, None, None)
    };

    // CLI flags override profile options
    let skip_duplicates = if allow_duplicates {
        false
    } else {
        profile_options
            .as_ref()
            .map(|o| o.skip_duplicates)
            .unwrap_or(true)
    };

    let options = ImportOptions {
        skip_duplicates,
        dry_run,
        ..ImportOptions::default()
    };

    // Save profile if requested
    if let Some(profile_name) = save_profile {
        ctx.import_service.save_profile(
            &profile_name,
            ImportProfile {
                entity: kind,
                options: ProfileOptions { skip_duplicates },
            },
        )?;
        println!("Profile '{}' saved", profile_name);
    }

    if let Some(profile_name) = using_profile {
        if !json {
            output::info(&format!("Using profile '{}'", profile_name));
        }
    }

    let result = if json {
        ctx.import_service
            .import_path(&file_path, kind, &options, &mut NoProgress)?
    } else {
        let bar = ProgressBar::new(0);
        let mut observer = ProgressFn(|current: usize, total: usize| {
            if bar.length() != Some(total as u64) {
                bar.set_length(total as u64);
            }
            bar.set_position(current as u64);
        });
        let result = ctx
            .import_service
            .import_path(&file_path, kind, &options, &mut observer)?;
        bar.finish_and_clear();
        result
    };

    // Write the detail report if requested
    if let Some(log_path) = &error_log {
        if result.errors.is_empty() {
            if !json {
                println!("No row errors; skipped writing {}", log_path.display());
            }
        } else {
            std::fs::write(log_path, result.error_report())?;
            if !json {
                println!("Wrote row errors to {}", log_path.display());
            }
        }
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if dry_run {
        println!("{}", "DRY RUN - No changes applied".yellow());
        println!();

        if let Some(records) = &result.records {
            let mut table = output::create_table();
            table.set_header(vec!["Name", "Key", "Summary"]);

            for record in records.iter().take(10) {
                table.add_row(vec![&record.name, &record.key, &record.summary]);
            }

            println!("{}", table);

            if records.len() > 10 {
                println!("... and {} more", records.len() - 10);
            }
        }
    } else if result.cancelled {
        output::warning("Import cancelled");
    } else {
        output::success("Import complete");
    }

    println!();
    println!("  Accepted: {}", result.accepted);
    println!("  Duplicates: {}", result.duplicates);
    println!("  Failed: {}", result.failed);

    if !result.errors.is_empty() {
        println!();
        for error in result.errors.iter().take(5) {
            output::warning(&format!("Row {}: {}", error.row, error.message));
        }
        if result.errors.len() > 5 {
            println!("... and {} more row errors", result.errors.len() - 5);
        }
    }

    Ok(())
}
