//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Repository implementations only translate between Diesel rows and domain
//! types. Connections come from a shared `bb8` pool through `diesel-async`,
//! and every database error is mapped onto the owning port's error enum.
//!
//! # Example
//!
//! ```ignore
//! use records_backend::outbound::persistence::{
//!     DbPool, DieselCommitBatchRepository, DieselRecordStore, PoolConfig,
//! };
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/records")).await?;
//! let batches = DieselCommitBatchRepository::new(pool.clone());
//! let records = DieselRecordStore::new(pool);
//! ```

mod diesel_commit_batch_repository;
mod diesel_error_mapping;
mod diesel_record_store;
mod models;
mod pool;
mod schema;

pub use diesel_commit_batch_repository::DieselCommitBatchRepository;
pub use diesel_record_store::DieselRecordStore;
pub use pool::{DbPool, PoolConfig, PoolError};
