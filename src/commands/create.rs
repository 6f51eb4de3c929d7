//! `anon create ...`: jobs from the mapping in the current folder.

use crate::commands::{Confirm, Context};
use crate::error::Result;
use crate::services::{self, JobApi};
use crate::utils::table;

/// Create one job per mapping row on `api`'s server.
pub async fn from_mapping(
    ctx: &Context,
    api: &dyn JobApi,
    dry_run: bool,
    confirm: &dyn Confirm,
) -> Result<String> {
    let mapping = ctx.mapping_folder().load().await?;
    let defaults = &ctx.settings.job_defaults;

    // Check every row before asking anything
    let requests = services::validate_mapping(&mapping, defaults)?;
    if !dry_run {
        let question = format!(
            "Create {} jobs on {}, for project {} writing to {}?",
            requests.len(),
            api.server().name,
            distinct(requests.iter().map(|r| r.project_name.as_str())),
            distinct(requests.iter().map(|r| r.destination_path.as_str())),
        );
        if !confirm.confirm(&question)? {
            return Ok("Created nothing".to_string());
        }
    }

    let store = ctx.batch_folder();
    let outcome =
        services::create_from_mapping(api, &store, &mapping, defaults, dry_run).await?;

    if dry_run {
        return Ok(format!(
            "Dry run: would create {} jobs on {}. Nothing was sent",
            outcome.requests.len(),
            api.server().name
        ));
    }
    let mut text = format!(
        "Created {} jobs: {:?}",
        outcome.created_ids.len(),
        outcome.created_ids
    );
    if !outcome.recorded {
        text.push_str("\nThe existing batch is for another server; jobs were not added to it");
    }
    Ok(text)
}

/// Distinct values in first-seen order, like `'a', 'b'`.
fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen.iter()
        .map(|v| format!("'{v}'"))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Set the project and destination used when a mapping does not name them.
pub fn set_defaults(
    ctx: &mut Context,
    project: Option<String>,
    destination: Option<String>,
) -> Result<String> {
    if let Some(project) = project {
        ctx.settings.job_defaults.project_name = Some(project);
    }
    if let Some(destination) = destination {
        ctx.settings.job_defaults.destination_path = Some(destination);
    }
    ctx.save_settings()?;
    Ok(show_defaults(ctx))
}

pub fn show_defaults(ctx: &Context) -> String {
    let defaults = &ctx.settings.job_defaults;
    table::key_value_table(&[
        (
            "project",
            defaults.project_name.clone().unwrap_or_default(),
        ),
        (
            "destination",
            defaults.destination_path.clone().unwrap_or_default(),
        ),
    ])
    .to_string()
}
