//! Database layer for data persistence and access.
//!
//! This module implements the data access layer using SQLx with PostgreSQL.
//! It follows the Repository pattern to provide clean abstractions over database operations.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  (API request handlers)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │ Repositories│  (db::handlers - queries & child-collection writes)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │   Models    │  (db::models - database records)
//! └──────┬──────┘
//!        │
//!        ↓
//! ┌─────────────┐
//! │  PostgreSQL │
//! └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`handlers`]: Repository implementations for CRUD operations
//! - [`models`]: Database record structures matching table schemas
//! - [`errors`]: Database-specific error types
//!
//! # Aggregates
//!
//! Products, solutions and service pages own child collections (features, FAQs, steps, ...).
//! Their repositories open a transaction on the connection they are given, write the parent
//! row, replace the children and commit, so a failed child insert leaves nothing behind:
//!
//! ```ignore
//! use solvera::db::handlers::{Products, Repository};
//!
//! let mut conn = pool.acquire().await?;
//! let product = Products::new(&mut conn).create(&request).await?;
//! assert_eq!(product.features.len(), request.features.len());
//! ```
//!
//! # Migrations
//!
//! Database migrations are managed by SQLx and located in the `migrations/` directory.
//! The [`crate::migrator`] function provides access to the migrator:
//!
//! ```ignore
//! solvera::migrator().run(&pool).await?;
//! ```

pub mod errors;
pub mod handlers;
pub mod models;
