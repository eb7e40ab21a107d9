//! Repository implementations for database access.
//!
//! Each repository wraps a SQLx connection, builds its queries with `QueryBuilder` and
//! returns records from [`crate::db::models`]. Most implement the [`Repository`] trait.
//!
//! # Available Repositories
//!
//! - [`Users`], [`Authors`], [`Categories`]: accounts and blog metadata
//! - [`Articles`]: blog posts with author join and category links
//! - [`Products`], [`Solutions`], [`ServicePages`]: marketing pages with child collections
//! - [`Promos`], [`SocialTrusts`]: banner promos and partner logos
//! - [`Slugs`]: slug allocation across the slugged tables
//! - [`ImageRefs`]: image URLs still referenced by content, for blob cleanup
//! - [`faqs`]: FAQ rows shared by products and solutions

pub mod articles;
pub mod authors;
pub mod categories;
pub mod faqs;
pub mod image_refs;
pub mod products;
pub mod promos;
pub mod repository;
pub mod services;
pub mod slugs;
pub mod social_trust;
pub mod solutions;
pub mod users;
pub mod utils;

pub use articles::Articles;
pub use authors::Authors;
pub use categories::Categories;
pub use image_refs::ImageRefs;
pub use products::Products;
pub use promos::Promos;
pub use repository::Repository;
pub use services::ServicePages;
pub use slugs::Slugs;
pub use social_trust::SocialTrusts;
pub use solutions::Solutions;
pub use users::Users;
