//! `anon server ...`

use crate::commands::Context;
use crate::error::Result;
use crate::models::{JobInfo, RemoteServer};
use crate::services::JobApi;
use crate::utils::table;

/// All servers, the active one marked with `*`.
pub fn list(ctx: &Context) -> String {
    if ctx.settings.servers.is_empty() {
        return "No servers. Add one with 'anon server add <NAME> <URL>'".to_string();
    }
    let mut out = table::create_table(&["", "name", "url"]);
    for server in &ctx.settings.servers {
        let marker = if ctx.settings.active_server.as_deref() == Some(server.name.as_str()) {
            "*"
        } else {
            ""
        };
        out.add_row(vec![marker, server.name.as_str(), server.url.as_str()]);
    }
    out.to_string()
}

pub fn add(ctx: &mut Context, name: &str, url: &str) -> Result<String> {
    ctx.settings.add_server(RemoteServer::new(name, url))?;
    ctx.save_settings()?;
    Ok(format!("Added server {name}: {url}"))
}

pub fn remove(ctx: &mut Context, name: &str) -> Result<String> {
    let removed = ctx.settings.remove_server(name)?;
    ctx.save_settings()?;
    Ok(format!("Removed server {removed}"))
}

pub fn activate(ctx: &mut Context, name: &str) -> Result<String> {
    ctx.settings.activate(name)?;
    ctx.save_settings()?;
    Ok(format!("Set active server to {name}"))
}

/// Check whether a server answers like an anonymization API.
pub async fn status(api: &dyn JobApi) -> Result<String> {
    api.server_status().await?;
    Ok(format!("OK: {} is online and responsive", api.server()))
}

/// Most recent jobs on a server.
pub async fn jobs(api: &dyn JobApi, limit: usize) -> Result<String> {
    let jobs = api.get_jobs(limit).await?;
    Ok(format!(
        "Most recent {} jobs on {}:\n{}",
        jobs.len(),
        api.server().name,
        job_table(&jobs)
    ))
}

pub(crate) fn job_table(jobs: &[JobInfo]) -> comfy_table::Table {
    let mut out = table::create_table(&[
        "job_id",
        "date",
        "status",
        "downloaded",
        "processed",
        "user",
    ]);
    for job in jobs {
        out.add_row(vec![
            job.job_id.to_string(),
            job.date.clone(),
            job.status.to_string(),
            job.files_downloaded.to_string(),
            job.files_processed.to_string(),
            job.user_name.clone(),
        ]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing;
    use crate::models::{JobStatus, Settings};
    use crate::services::mock::MockApi;

    #[test]
    fn test_add_activate_remove() {
        let (_dir, mut ctx) = testing::context();

        add(&mut ctx, "p01", "https://p01/api").unwrap();
        activate(&mut ctx, "p01").unwrap();
        assert!(list(&ctx).contains("p01"));

        let saved = Settings::load(&ctx.settings_path).unwrap();
        assert_eq!(saved.active_server.as_deref(), Some("p01"));

        remove(&mut ctx, "p01").unwrap();
        assert!(ctx.settings.active_server.is_none());
        assert!(activate(&mut ctx, "p01").is_err());
        assert!(add(&mut ctx, "test", "https://dup").is_err());
    }

    #[tokio::test]
    async fn test_status_and_jobs() {
        let api = MockApi::new()
            .with_job(1, JobStatus::Done)
            .with_job(2, JobStatus::Active);

        assert!(status(&api).await.unwrap().starts_with("OK"));

        let text = jobs(&api, 1).await.unwrap();
        assert!(text.contains("Most recent 1 jobs"));
        assert!(text.contains("ACTIVE"));
    }
}
