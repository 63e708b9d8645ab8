//! Connection URL helpers.

use crate::error::{Result, UnitOfWorkError};

/// Returns `url` pointing at `database` on the same server.
///
/// For server URLs (`postgres://user@host:5432/app?sslmode=disable`) the path
/// segment is replaced. For SQLite URLs the file path is replaced. Query
/// parameters are kept.
pub fn with_database(url: &str, database: &str) -> Result<String> {
    let database = database.trim();
    if database.is_empty() {
        return Err(UnitOfWorkError::new("Database name cannot be empty"));
    }

    let (base, query) = match url.split_once('?') {
        Some((base, query)) => (base, Some(query)),
        None => (url, None),
    };

    let replaced = if let Some(rest) = base.strip_prefix("sqlite:") {
        let prefix = if rest.starts_with("//") { "sqlite://" } else { "sqlite:" };
        format!("{}{}", prefix, database)
    } else {
        let (scheme, rest) = base
            .split_once("://")
            .ok_or_else(|| UnitOfWorkError::new(format!("Unsupported database URL: {}", url)))?;
        let authority = rest.split_once('/').map_or(rest, |(authority, _)| authority);
        format!("{}://{}/{}", scheme, authority, database)
    };

    Ok(match query {
        Some(query) => format!("{}?{}", replaced, query),
        None => replaced,
    })
}

/// Database segment of a URL, if it names one.
pub fn database_name(url: &str) -> Option<&str> {
    let base = url.split('?').next().unwrap_or(url);
    let name = if let Some(rest) = base.strip_prefix("sqlite:") {
        rest.trim_start_matches("//")
    } else {
        let (_, rest) = base.split_once("://")?;
        rest.split_once('/')?.1
    };
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}
