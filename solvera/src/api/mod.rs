//! API layer for HTTP request handling and data models.
//!
//! - **[`handlers`]**: Axum route handlers for all API endpoints
//! - **[`models`]**: Request/response data structures for API communication
//! - **[`extract`]**: Extractors shared by the handlers
//!
//! # API Structure
//!
//! - **Authentication** (`/authentication/*`): Login, logout, current user
//! - **Admin** (`/admin/api/v1/*`): CRUD for accounts, blog and marketing pages
//! - **Public** (`/api/v1/*`): Read-only, envelope-wrapped content for the site
//! - **Cron** (`/api/v1/cron/*`): Image cleanup
//!
//! API documentation is served at `/admin/docs`.

pub mod extract;
pub mod handlers;
pub mod models;
