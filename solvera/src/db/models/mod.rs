//! Database record models matching table schemas.
//!
//! Parent records derive `sqlx::FromRow` and carry their child collections in
//! `#[sqlx(skip)]` fields that the repositories fill after the parent query. Child rows keep
//! their parent key for grouping but skip it when serialized.
//!
//! Conversions to API models live next to the API types as `From` impls.

pub mod articles;
pub mod authors;
pub mod categories;
pub mod common;
pub mod products;
pub mod promos;
pub mod services;
pub mod social_trust;
pub mod solutions;
pub mod users;
