// src/models/mod.rs

//! Domain models for the anonymization client.
//!
//! This module contains the data structures shared by storage, services and
//! commands, organized by their primary purpose.

mod batch;
mod job;
mod selection;
mod server;
mod settings;

// Re-export all public types
pub use batch::{JobBatch, expand_job_ids};
pub use job::{JobInfo, JobRequest, JobSource, JobStatus};
pub use selection::FileSelection;
pub use server::RemoteServer;
pub use settings::{ClientConfig, JobDefaults, SETTINGS_FILE_NAME, Settings};
