//! Common type definitions and permission system types.
//!
//! # ID Types
//!
//! Every entity is keyed by a UUID. The aliases below only document intent at call sites.
//!
//! # Permission System
//!
//! - [`Resource`]: What content type is being accessed (Articles, Products, ...)
//! - [`Operation`]: What action is being performed. `*All` operations are unrestricted,
//!   `*Own` operations are limited to rows linked to the caller (their own user record or
//!   articles written under their author profile).
//!
//! The role-to-permission table lives in [`crate::auth::permissions`].

use std::fmt;
use uuid::Uuid;

pub type UserId = Uuid;
pub type AuthorId = Uuid;
pub type CategoryId = Uuid;
pub type ArticleId = Uuid;
pub type ProductId = Uuid;
pub type SolutionId = Uuid;
pub type ServicePageId = Uuid;
pub type PromoId = Uuid;
pub type SocialTrustId = Uuid;

/// Abbreviate a UUID to its first 8 characters for more readable logs and traces
/// Example: "550e8400-e29b-41d4-a716-446655440000" -> "550e8400"
pub fn abbrev_uuid(uuid: &Uuid) -> String {
    uuid.to_string().chars().take(8).collect()
}

// *-All means unrestricted access, *-Own means restricted to own rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateAll,
    CreateOwn,
    ReadAll,
    ReadOwn,
    UpdateAll,
    UpdateOwn,
    DeleteAll,
    DeleteOwn,
}

impl Operation {
    /// The unrestricted counterpart of an `*Own` operation. `*All` operations map to themselves.
    pub fn widened(self) -> Operation {
        match self {
            Operation::CreateOwn => Operation::CreateAll,
            Operation::ReadOwn => Operation::ReadAll,
            Operation::UpdateOwn => Operation::UpdateAll,
            Operation::DeleteOwn => Operation::DeleteAll,
            other => other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    Users,
    Authors,
    Categories,
    Articles,
    Products,
    Solutions,
    Services,
    Promos,
    SocialTrust,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::CreateAll | Operation::CreateOwn => write!(f, "create"),
            Operation::ReadAll | Operation::ReadOwn => write!(f, "read"),
            Operation::UpdateAll | Operation::UpdateOwn => write!(f, "update"),
            Operation::DeleteAll | Operation::DeleteOwn => write!(f, "delete"),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Resource::Users => "users",
            Resource::Authors => "authors",
            Resource::Categories => "categories",
            Resource::Articles => "articles",
            Resource::Products => "products",
            Resource::Solutions => "solutions",
            Resource::Services => "service pages",
            Resource::Promos => "promos",
            Resource::SocialTrust => "partner logos",
        };
        f.write_str(name)
    }
}
