// src/services/mod.rs

//! Service layer for the anonymization client.
//!
//! This module contains the business logic for:
//! - Talking to the web API (`JobApi`, `WebApiClient`)
//! - Status of every job in a batch (`reconcile`)
//! - Creating jobs from a mapping (`create_from_mapping`)
//! - Cancelling and resetting a batch (`cancel_batch`, `reset_batch`, `reset_errors`)

pub mod batch;
pub mod client;
pub mod create;
pub mod status;

#[cfg(test)]
pub(crate) mod mock;

pub use batch::{ActionOutcome, BatchAction, cancel_batch, reset_batch, reset_errors};
pub use client::{JobApi, WebApiClient, interpret_response, root_status};
pub use create::{CreateOutcome, batch_for, create_from_mapping, validate_mapping};
pub use status::{StatusCount, StatusRow, StatusTable, reconcile};
