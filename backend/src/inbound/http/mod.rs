//! HTTP inbound adapter exposing REST endpoints.

pub mod commit_batches;
pub mod error;
pub mod schemas;
pub mod state;

pub use error::ApiResult;
