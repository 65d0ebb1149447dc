//! MongoDB connection management and operations.
//!
//! This module provides:
//! - `ConnectionManager`: runtime owner, connection and collection-level calls
//! - `ops`: documents, aggregation, admin commands, GridFS, indexes, import
//! - `types`: option and result types shared by the operations

pub mod manager;
pub mod ops;
pub mod types;

pub use manager::ConnectionManager;
pub use ops::aggregation::array_average_pipeline;
pub use types::{
    BucketSettings, FileRevision, FindDocumentsOptions, IndexSummary, StoredFile, UpdateSummary,
    default_index_name,
};
