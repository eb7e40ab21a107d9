//! Role-based permission checks.
//!
//! Handlers declare the permission they need with [`RequiresPermission`], which rejects
//! the request before the handler body runs. `*Own` requirements pass for roles holding
//! either the `*Own` or the `*All` variant; the handler then narrows the rows it touches
//! using [`can_read_all_resources`] / [`has_permission`].

use crate::{
    AppState,
    api::models::users::{CurrentUser, Role},
    errors::Error,
    types::{Operation, Resource},
};
use axum::{extract::FromRequestParts, http::request::Parts};
use std::{marker::PhantomData, ops::Deref};

/// Whether `role` holds exactly `operation` on `resource`.
pub fn role_has_permission(role: Role, resource: Resource, operation: Operation) -> bool {
    match role {
        Role::Admin => true,
        Role::Editor => match resource {
            Resource::Users => matches!(operation, Operation::ReadOwn | Operation::UpdateOwn),
            Resource::Authors => matches!(operation, Operation::ReadAll | Operation::UpdateOwn),
            Resource::Categories => matches!(operation, Operation::ReadAll | Operation::CreateAll),
            Resource::Articles => matches!(
                operation,
                Operation::CreateOwn | Operation::ReadOwn | Operation::UpdateOwn | Operation::DeleteOwn
            ),
            Resource::Products | Resource::Solutions | Resource::Services | Resource::Promos | Resource::SocialTrust => {
                operation == Operation::ReadAll
            }
        },
    }
}

/// Whether the user may perform `operation`. An `*Own` operation is also granted by its
/// `*All` counterpart.
pub fn has_permission(user: &CurrentUser, resource: Resource, operation: Operation) -> bool {
    role_has_permission(user.role, resource, operation) || role_has_permission(user.role, resource, operation.widened())
}

/// Whether the user sees every row of `resource` rather than only their own.
pub fn can_read_all_resources(user: &CurrentUser, resource: Resource) -> bool {
    role_has_permission(user.role, resource, Operation::ReadAll)
}

/// Type-level resource markers for [`RequiresPermission`].
pub mod resource {
    use crate::types::Resource;

    pub trait ResourceMarker {
        const RESOURCE: Resource;
    }

    macro_rules! markers {
        ($($name:ident),* $(,)?) => {
            $(
                #[derive(Debug)]
                pub struct $name;
                impl ResourceMarker for $name {
                    const RESOURCE: Resource = Resource::$name;
                }
            )*
        };
    }

    markers!(Users, Authors, Categories, Articles, Products, Solutions, Services, Promos, SocialTrust);
}

/// Type-level operation markers for [`RequiresPermission`].
pub mod operation {
    use crate::types::Operation;

    pub trait OperationMarker {
        const OPERATION: Operation;
    }

    macro_rules! markers {
        ($($name:ident),* $(,)?) => {
            $(
                #[derive(Debug)]
                pub struct $name;
                impl OperationMarker for $name {
                    const OPERATION: Operation = Operation::$name;
                }
            )*
        };
    }

    markers!(CreateAll, CreateOwn, ReadAll, ReadOwn, UpdateAll, UpdateOwn, DeleteAll, DeleteOwn);
}

/// Extractor yielding the authenticated user once the permission check passed.
///
/// Rejects with 401 when no valid session is present and 403 when the role lacks the
/// permission.
#[derive(Debug)]
pub struct RequiresPermission<R, O> {
    user: CurrentUser,
    _marker: PhantomData<(R, O)>,
}

impl<R, O> RequiresPermission<R, O> {
    pub fn into_inner(self) -> CurrentUser {
        self.user
    }
}

impl<R, O> Deref for RequiresPermission<R, O> {
    type Target = CurrentUser;

    fn deref(&self) -> &CurrentUser {
        &self.user
    }
}

impl<R, O> FromRequestParts<AppState> for RequiresPermission<R, O>
where
    R: resource::ResourceMarker + Send + Sync,
    O: operation::OperationMarker + Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let user = CurrentUser::from_request_parts(parts, state).await?;

        if !has_permission(&user, R::RESOURCE, O::OPERATION) {
            return Err(Error::InsufficientPermissions {
                resource: R::RESOURCE,
                action: O::OPERATION,
            });
        }

        Ok(Self {
            user,
            _marker: PhantomData,
        })
    }
}
