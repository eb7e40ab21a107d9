//! HTTP request handlers for all API endpoints.
//!
//! # Handler Modules
//!
//! - [`auth`]: Login, logout and the current session
//! - [`users`], [`authors`], [`categories`], [`articles`]: Blog and account administration
//! - [`products`], [`solutions`], [`services`], [`promos`], [`social_trust`]: Marketing pages
//! - [`public`]: Read-only endpoints for the marketing site
//! - [`cron`]: Scheduled maintenance jobs
//!
//! # Authentication
//!
//! Admin handlers take a [`crate::auth::permissions::RequiresPermission`] extractor, which
//! authenticates via bearer token or session cookie and checks the role before the handler runs.
//! Row-level rules (editors and their own articles) are enforced inside the handlers.

pub mod articles;
pub mod auth;
pub mod authors;
pub mod categories;
pub mod cron;
pub mod products;
pub mod promos;
pub mod public;
pub mod services;
pub mod social_trust;
pub mod solutions;
pub mod users;

use crate::errors::Error;

pub(crate) fn not_found(resource: &str, id: impl ToString) -> Error {
    Error::NotFound {
        resource: resource.to_string(),
        id: id.to_string(),
        message: None,
    }
}

/// Rejects a provided text field that is blank. `None` (field omitted) passes.
pub(crate) fn require_text(field: &str, value: Option<&str>) -> Result<(), Error> {
    match value {
        Some(v) if v.trim().is_empty() => Err(Error::BadRequest {
            message: format!("{field} must not be empty"),
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_text() {
        assert!(require_text("name", None).is_ok());
        assert!(require_text("name", Some("ERP")).is_ok());
        assert!(matches!(
            require_text("name", Some("  ")),
            Err(Error::BadRequest { message }) if message == "name must not be empty"
        ));
    }
}
