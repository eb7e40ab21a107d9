//! Authentication and authorization.
//!
//! Admin API callers log in via `/authentication/login` with username/password and receive
//! a JWT session in an HTTP-only cookie. The same token is accepted as
//! `Authorization: Bearer <token>` for scripted access.
//!
//! Access control is role based (see [`permissions`]): admins manage everything, editors
//! write articles under their own author profile and read the remaining content.
//!
//! # Modules
//!
//! - [`current_user`]: Extractor resolving the authenticated user
//! - [`password`]: Password hashing and verification using Argon2
//! - [`permissions`]: Role permission table and the `RequiresPermission` extractor
//! - [`session`]: JWT session tokens and cookies
//!
//! # Usage in Handlers
//!
//! ```ignore
//! use solvera::auth::permissions::{operation, resource, RequiresPermission};
//!
//! async fn delete_product(
//!     State(state): State<AppState>,
//!     _: RequiresPermission<resource::Products, operation::DeleteAll>,
//!     Path(id): Path<ProductId>,
//! ) -> Result<StatusCode> {
//!     // ...
//! }
//! ```

pub mod current_user;
pub mod password;
pub mod permissions;
pub mod session;
