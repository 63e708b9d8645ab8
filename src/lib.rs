//! sea-uow - Generic repository and unit of work over SeaORM
//!
//! This library puts a thin repository / unit-of-work facade in front of
//! SeaORM. Paging, filtering, projection, aggregation, raw SQL and
//! transaction control are all forwarded to SeaORM; nothing here plans
//! queries or tracks entities beyond recording which writes are pending.
//!
//! # Modules
//!
//! * [`repository`] - Per-entity data-access facade
//! * [`unit_of_work`] - Repositories sharing one transactional context
//! * [`paging`] - Page requests and paged results
//! * [`query`] - Filter, ordering and include descriptors
//! * [`config`] - Configuration loading and validation
//! * [`logger`] - Logging setup for host applications

/// Configuration module for connection, paging and logging settings
pub mod config;

/// Crate constants and default values
pub mod constants;

/// SeaORM entity models owned by this crate
pub mod entities;

/// Error type shared by all operations
pub mod error;

/// Logging utilities built on fern
pub mod logger;

/// Page requests and the paged result shape
pub mod paging;

/// Filter / sort / include descriptors
pub mod query;

/// Generic repository over a SeaORM entity
pub mod repository;

/// Unit of work and change tracking
pub mod unit_of_work;

/// Utility functions
pub mod utils;

pub use error::{Result, UnitOfWorkError};
pub use paging::{PageRequest, PagedList};
pub use query::QueryOptions;
pub use repository::Repository;
pub use unit_of_work::UnitOfWork;
