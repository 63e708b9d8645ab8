//! Utility modules for sea-uow.
//!
//! - [`database_url`] - Connection URL manipulation used when switching databases

pub mod database_url;
