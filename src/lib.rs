// src/lib.rs

//! Client for the IDIS anonymization web API.
//!
//! Describe anonymization jobs in a mapping file, create them on a server,
//! and follow them as a batch.

pub mod commands;
pub mod error;
pub mod mapping;
pub mod models;
pub mod services;
pub mod storage;
pub mod utils;
