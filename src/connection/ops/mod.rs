//! Database operations split into focused modules.

pub mod admin;
pub mod aggregation;
pub mod documents;
pub mod gridfs;
pub mod import;
pub mod indexes;
