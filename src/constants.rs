//! Constants used throughout the crate
//!
//! Default paging arguments, configuration file names and log messages are
//! centralized here so the config layer and the runtime agree on them.

// Paging defaults
/// First page number; pages are 1-based
pub const DEFAULT_PAGE_INDEX: u64 = 1;
/// Rows per page when the caller does not say otherwise
pub const DEFAULT_PAGE_SIZE: u64 = 20;
/// Pages shown on each side of the current one in a pager window
pub const DEFAULT_PAGE_JUMP: u64 = 2;
/// Upper bound accepted for the configured default page size
pub const DEFAULT_MAX_PAGE_SIZE: u64 = 1000;

// Database defaults
pub const DEFAULT_DATABASE_URL: &str = "sqlite::memory:";
pub const DEFAULT_MIN_CONNECTIONS: u32 = 1;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 8;

// Configuration file locations
pub const CONFIG_FILE_NAME: &str = "sea-uow.toml";
pub const CONFIG_DIR_NAME: &str = "sea-uow";
pub const CONFIG_GENERATED: &str = "Generated default configuration file";

// Logging
pub const LOG_FILE_NAME: &str = "sea-uow.log";
pub const LOG_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.3f";

// Error messages
pub const ERROR_INVALID_PAGE_INDEX: &str = "page_index must be greater than or equal to 1";
pub const ERROR_INVALID_PAGE_SIZE: &str = "page_size must be greater than 0";
pub const ERROR_PAGE_OUT_OF_RANGE: &str = "page_index and page_size put the page offset out of range";
pub const ERROR_PAGE_SIZE_TOO_LARGE: &str = "page_size exceeds the configured max_page_size";
pub const ERROR_CONTEXT_CLOSED: &str = "Unit of work has been closed";
