//! Regressivos backend client
//!
//! Typed async access to the admin and quality REST endpoints, the response
//! envelope and the error taxonomy the console front ends act on.

pub mod api;
pub mod client;
pub mod error;

pub use api::{CycleDetail, HealthStatus, RecordDetail, ReleaseNotes, SlaCheck};
pub use client::RegressivosClient;
pub use error::{ClientError, ClientResult};
