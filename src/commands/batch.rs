//! `anon batch ...`: the batch in the current folder.

use crate::commands::{Confirm, Context};
use crate::error::Result;
use crate::models::{JobBatch, expand_job_ids};
use crate::services::{self, ActionOutcome, JobApi};
use crate::storage::BatchStore;
use crate::utils::table;

/// Start an empty batch for the active server.
pub async fn init(ctx: &Context, overwrite: bool) -> Result<String> {
    let server = ctx.active_server()?;
    let folder = ctx.batch_folder();
    folder.init(server.clone(), overwrite).await?;
    Ok(format!(
        "Initialised batch for {server} in {}",
        folder.folder().display()
    ))
}

pub async fn info(ctx: &Context) -> Result<String> {
    let batch = ctx.batch_folder().load().await?;
    Ok(describe(&batch))
}

pub async fn delete(ctx: &Context, confirm: &dyn Confirm) -> Result<String> {
    let folder = ctx.batch_folder();
    let batch = folder.load().await?;
    let question = format!(
        "Delete batch with {} jobs in {}? The jobs themselves are not touched",
        batch.len(),
        folder.folder().display()
    );
    if !confirm.confirm(&question)? {
        return Ok("Deleted nothing".to_string());
    }
    folder.delete().await?;
    Ok(format!("Removed batch in {}", folder.folder().display()))
}

/// Add job IDs or ranges like `5-7`.
pub async fn add(ctx: &Context, tokens: &[String]) -> Result<String> {
    let folder = ctx.batch_folder();
    let mut batch = folder.load().await?;
    let added = batch.add(tokens)?;
    folder.save(&batch).await?;
    Ok(format!(
        "Added {} jobs to batch, skipped {} already present. Batch has {} jobs",
        added.len(),
        expand_job_ids(tokens)?.len().saturating_sub(added.len()),
        batch.len()
    ))
}

pub async fn remove(ctx: &Context, tokens: &[String]) -> Result<String> {
    let folder = ctx.batch_folder();
    let mut batch = folder.load().await?;
    let removed = batch.remove(tokens)?;
    folder.save(&batch).await?;
    Ok(format!(
        "Removed {} jobs from batch. Batch has {} jobs",
        removed.len(),
        batch.len()
    ))
}

/// Status of every job in the batch, looked up on the batch's server.
pub async fn status(
    api: &dyn JobApi,
    batch: &JobBatch,
    extended: bool,
    summary: bool,
) -> Result<String> {
    let table = services::reconcile(api, batch, extended).await;
    let text = if summary {
        format!(
            "Status of {} jobs on {}:\n{}",
            table.len(),
            api.server().name,
            table.render_summary()
        )
    } else {
        format!(
            "{}\n\nSummary:\n{}",
            table.render(),
            table.render_summary()
        )
    };
    Ok(text)
}

pub async fn cancel(api: &dyn JobApi, batch: &JobBatch, confirm: &dyn Confirm) -> Result<String> {
    let question = format!("Cancel all {} jobs in batch on {}?", batch.len(), api.server().name);
    if !confirm.confirm(&question)? {
        return Ok("Cancelled nothing".to_string());
    }
    let outcome = services::cancel_batch(api, batch).await?;
    Ok(done("Cancelled", &outcome))
}

pub async fn reset(api: &dyn JobApi, batch: &JobBatch, confirm: &dyn Confirm) -> Result<String> {
    let question = format!("Reset all {} jobs in batch on {}?", batch.len(), api.server().name);
    if !confirm.confirm(&question)? {
        return Ok("Reset nothing".to_string());
    }
    let outcome = services::reset_batch(api, batch).await?;
    Ok(done("Reset", &outcome))
}

/// Reset the jobs in the batch that have status ERROR.
pub async fn reset_error(
    api: &dyn JobApi,
    batch: &JobBatch,
    confirm: &dyn Confirm,
) -> Result<String> {
    let ids = services::batch::error_job_ids(api, batch).await;
    if ids.is_empty() {
        return Ok("No jobs with status ERROR in batch".to_string());
    }
    let question = format!("Reset {} jobs with status ERROR: {ids:?}?", ids.len());
    if !confirm.confirm(&question)? {
        return Ok("Reset nothing".to_string());
    }
    let outcome = services::reset_errors(api, batch).await?;
    Ok(done("Reset", &outcome))
}

fn done(verb: &str, outcome: &ActionOutcome) -> String {
    format!("{verb} {} jobs: {:?}", outcome.succeeded.len(), outcome.succeeded)
}

fn describe(batch: &JobBatch) -> String {
    let ids = if batch.job_ids.len() > 20 {
        format!(
            "{} ... {} ({} jobs)",
            batch.job_ids[..10].join(", "),
            batch.job_ids[batch.job_ids.len() - 10..].join(", "),
            batch.len()
        )
    } else {
        batch.job_ids.join(", ")
    };
    table::key_value_table(&[("server", batch.server.to_string()), ("job ids", ids)]).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{AssumeYes, testing};
    use crate::error::AppError;
    use crate::models::JobStatus;
    use crate::services::mock::MockApi;

    struct Decline;

    impl Confirm for Decline {
        fn confirm(&self, _question: &str) -> Result<bool> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn test_init_add_remove_delete() {
        let (_dir, ctx) = testing::context();

        assert!(matches!(info(&ctx).await, Err(AppError::NoBatch(_))));
        init(&ctx, false).await.unwrap();
        assert!(matches!(init(&ctx, false).await, Err(AppError::BatchExists(_))));

        let text = add(&ctx, &["1".to_string(), "1-3".to_string()]).await.unwrap();
        assert!(text.contains("Added 3 jobs"));
        assert!(text.contains("skipped 1"));

        remove(&ctx, &["2".to_string()]).await.unwrap();
        assert_eq!(ctx.batch_folder().load().await.unwrap().job_ids, vec!["1", "3"]);
        assert!(info(&ctx).await.unwrap().contains("1, 3"));

        delete(&ctx, &AssumeYes).await.unwrap();
        assert!(!ctx.batch_folder().has_batch().await);
    }

    #[tokio::test]
    async fn test_bad_range_leaves_batch_unchanged() {
        let (_dir, ctx) = testing::context();
        init(&ctx, false).await.unwrap();
        add(&ctx, &["4".to_string()]).await.unwrap();

        assert!(add(&ctx, &["7-5".to_string()]).await.is_err());
        assert_eq!(ctx.batch_folder().load().await.unwrap().job_ids, vec!["4"]);
    }

    #[tokio::test]
    async fn test_status_and_reset_error() {
        let (_dir, ctx) = testing::context();
        let batch = {
            init(&ctx, false).await.unwrap();
            add(&ctx, &["1-3".to_string()]).await.unwrap();
            ctx.batch_folder().load().await.unwrap()
        };
        let api = MockApi::new()
            .with_job(1, JobStatus::Done)
            .with_job(2, JobStatus::Error)
            .failing_lookup("3");

        let text = status(&api, &batch, false, false).await.unwrap();
        assert!(text.contains("UNKNOWN"));
        assert!(text.contains("33.3%"));

        let text = reset_error(&api, &batch, &Decline).await.unwrap();
        assert_eq!(text, "Reset nothing");
        assert_eq!(api.status_of(2), Some(JobStatus::Error));

        let text = reset_error(&api, &batch, &AssumeYes).await.unwrap();
        assert!(text.contains("Reset 1 jobs"));
        assert_eq!(api.status_of(2), Some(JobStatus::Active));
        assert_eq!(api.status_of(1), Some(JobStatus::Done));

        let text = reset_error(&api, &batch, &AssumeYes).await.unwrap();
        assert_eq!(text, "No jobs with status ERROR in batch");
    }
}
