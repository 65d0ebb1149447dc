//! A guided tour of a MongoDB deployment.
//!
//! The tour connects once, then walks through document CRUD, queries, an
//! aggregation pipeline, administrative commands, GridFS file streaming,
//! index management and a JSON Lines bulk import. Every database call goes
//! through [`connection::ConnectionManager`], which exposes the async driver
//! as blocking methods, and every tour stage is a [`workflow::WorkflowStep`]
//! so failures are reported per step.

pub mod bson;
pub mod config;
pub mod connection;
pub mod error;
pub mod workflow;

pub use config::{ConfigManager, TourConfig};
pub use connection::ConnectionManager;
pub use error::{Error, Result};
pub use workflow::{WorkflowReport, WorkflowRunner, run_tour};
