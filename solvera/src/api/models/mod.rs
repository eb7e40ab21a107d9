//! API request and response data models.
//!
//! API models are kept separate from the database models in [`crate::db::models`] so the
//! stored and served shapes can differ. Public endpoints serve "shaped" variants
//! (`PublicSolution`, `PublicServicePage`, `PublicPromo`, ...) regrouped for the front-end.

pub mod articles;
pub mod auth;
pub mod authors;
pub mod categories;
pub mod cleanup;
pub mod common;
pub mod envelope;
pub mod list_field;
pub mod pagination;
pub mod products;
pub mod promos;
pub mod services;
pub mod social_trust;
pub mod solutions;
pub mod users;
