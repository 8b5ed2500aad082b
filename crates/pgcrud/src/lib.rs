//! # pgcrud
//!
//! Schema-driven CRUD over PostgreSQL tables that are only known at runtime.
//!
//! ## Features
//!
//! - **Catalog-driven**: schemas, tables, columns and their declared types are
//!   looked up from the backend, never hard-coded
//! - **Typed binding**: text values are parsed into the column's declared type
//!   before anything reaches the backend
//! - **Injection-safe**: identifiers are quoted, values are always `$n` parameters
//! - **Transactional**: each mutation commits on success and rolls back on failure
//! - **Safe defaults**: DELETE and UPDATE refuse to run without a filter
//! - **Serialized or pooled**: one manager-wide critical section by default,
//!   plain connection pooling on request
//!
//! ## Example
//!
//! ```ignore
//! use pgcrud::{DatabaseManager, ManagerConfig, Record};
//!
//! let db = DatabaseManager::connect("postgres://localhost/school", ManagerConfig::default()).await?;
//!
//! let ana = Record::new()
//!     .with("id", "1", "integer")?
//!     .with("name", "Ana", "character varying")?
//!     .with("active", "true", "boolean")?;
//! db.insert("school", "student", &ana).await?;
//!
//! let by_id = Record::new().with("id", "1", "integer")?;
//! db.update("school", "student", "name", "Anna", &by_id).await?;
//! db.delete("school", "student", &by_id).await?;
//! ```

pub mod catalog;
pub mod client;
pub mod codec;
pub mod config;
pub mod error;
pub mod ident;
pub mod manager;
pub mod pool;
pub mod qb;
pub mod record;
pub mod trace;

pub use catalog::ColumnMeta;
pub use client::GenericClient;
pub use codec::{BoundValue, DeclaredType};
pub use config::{AccessMode, ManagerConfig};
pub use error::{CrudError, CrudResult};
pub use ident::Ident;
pub use manager::DatabaseManager;
pub use pool::create_pool;
pub use qb::{DeleteQb, InsertQb, SelectQb, SqlQb, UpdateQb};
pub use record::{Field, Record};
pub use trace::TracingSqlHook;

// Re-export deadpool-postgres types for pool configuration
pub use deadpool_postgres::{Pool, PoolError};
