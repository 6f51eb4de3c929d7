//! Per-folder state files.
//!
//! Every folder the client works in can hold a batch, a mapping and a file
//! selection:
//!
//! ```text
//! {folder}/
//! ├── anon_mapping.csv      # Mapping: jobs to create from this folder
//! ├── fileselection.txt     # File selection: files to use as job source
//! └── .anonapi/
//!     └── batch.yml         # Batch: job IDs created from this folder
//! ```
//!
//! Files are read fully, changed in memory and written back atomically.
//! Nothing guards against two invocations editing one folder at once.

pub mod batch;
pub mod local;
pub mod mapping;
pub mod selection;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::JobBatch;

// Re-export for convenience
pub use batch::{BATCH_FILE_KEY, BatchFolder};
pub use local::LocalStorage;
pub use mapping::MappingFolder;
pub use selection::{SELECTION_FILE_NAME, SelectionFolder};

/// Where a batch is kept.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Whether a batch exists.
    async fn has_batch(&self) -> bool;

    /// Load the batch. Fails with `NoBatch` if there is none.
    async fn load(&self) -> Result<JobBatch>;

    /// Write the batch, replacing any existing one.
    async fn save(&self, batch: &JobBatch) -> Result<()>;
}
