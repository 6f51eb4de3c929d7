//! `anon map ...`: the mapping in the current folder.

use crate::commands::{Confirm, Context};
use crate::error::{AppError, Result};
use crate::mapping::{Mapping, MappingRow, SourceIdentifier};

/// Write an example mapping to start from.
pub async fn init(ctx: &Context, overwrite: bool) -> Result<String> {
    let folder = ctx.mapping_folder();
    if !overwrite && folder.has_mapping().await {
        return Err(AppError::validation(format!(
            "Mapping already exists at {}",
            folder.mapping_path().display()
        )));
    }
    let mapping = Mapping::example(&ctx.settings.job_defaults, &ctx.settings.user_name);
    folder.save(&mapping).await?;
    Ok(format!(
        "Initialised example mapping in {}",
        folder.mapping_path().display()
    ))
}

/// Overview of the mapping, at most 20 rows.
pub async fn status(ctx: &Context) -> Result<String> {
    let mapping = ctx.mapping_folder().load().await?;
    let mut text = format!("Mapping with {} rows:\n", mapping.len());
    text.push_str(&mapping.summary_table(Some(20)).to_string());
    if mapping.len() > 20 {
        text.push_str(&format!("\n... and {} more", mapping.len() - 20));
    }
    Ok(text)
}

pub async fn delete(ctx: &Context, confirm: &dyn Confirm) -> Result<String> {
    let folder = ctx.mapping_folder();
    if !folder.has_mapping().await {
        return Err(AppError::NoMapping(folder.folder().to_path_buf()));
    }
    if !confirm.confirm(&format!("Delete {}?", folder.mapping_path().display()))? {
        return Ok("Deleted nothing".to_string());
    }
    folder.delete().await?;
    Ok(format!("Removed {}", folder.mapping_path().display()))
}

/// Add one row per folder, with generated pseudonyms.
pub async fn add_folders(ctx: &Context, folders: &[String]) -> Result<String> {
    let sources = folders
        .iter()
        .map(|f| SourceIdentifier::Folder(f.trim().to_string()));
    add_sources(ctx, sources).await
}

/// Add one PACS row per accession number, with generated pseudonyms.
pub async fn add_accession_numbers(ctx: &Context, numbers: &[String]) -> Result<String> {
    let sources = numbers
        .iter()
        .map(|n| SourceIdentifier::AccessionNumber(n.trim().to_string()));
    add_sources(ctx, sources).await
}

async fn add_sources(
    ctx: &Context,
    sources: impl Iterator<Item = SourceIdentifier>,
) -> Result<String> {
    let folder = ctx.mapping_folder();
    let mut mapping = folder.load().await?;
    let mut added = 0;
    for source in sources {
        if source.value().is_empty() {
            return Err(AppError::validation(format!("'{source}' has no value")));
        }
        mapping.add_row(MappingRow::generated(source));
        added += 1;
    }
    folder.save(&mapping).await?;
    Ok(format!(
        "Added {added} rows to mapping. Mapping has {} rows",
        mapping.len()
    ))
}
