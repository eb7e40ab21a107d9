use crate::{
    AppState,
    api::models::users::CurrentUser,
    auth::session,
    config::Config,
    db::handlers::{Repository, Users},
    errors::{Error, Result},
};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use tracing::{debug, instrument, trace};

/// Extract user from a `Bearer` JWT in the Authorization header.
/// Returns:
/// - None: No Authorization header or not a Bearer token
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Bearer token present but invalid or expired
fn try_bearer_auth(headers: &HeaderMap, config: &Config) -> Option<Result<CurrentUser>> {
    let auth_header = headers.get(header::AUTHORIZATION)?;

    let auth_str = match auth_header.to_str() {
        Ok(s) => s,
        Err(e) => {
            return Some(Err(Error::BadRequest {
                message: format!("Invalid authorization header: {e}"),
            }));
        }
    };

    let token = auth_str.strip_prefix("Bearer ")?;
    Some(session::verify_session_token(token.trim(), config))
}

/// Extract user from the JWT session cookie if present and valid
/// Returns:
/// - None: No session cookie present
/// - Some(Ok(user)): Valid JWT found and verified
/// - Some(Err(error)): Cookie present but the token is invalid or expired
fn try_cookie_auth(headers: &HeaderMap, config: &Config) -> Option<Result<CurrentUser>> {
    let cookie_name = &config.auth.session.cookie_name;
    let mut last_error = None;

    for cookie_header in headers.get_all(header::COOKIE) {
        let Ok(cookie_str) = cookie_header.to_str() else {
            continue;
        };

        for cookie in cookie_str.split(';') {
            if let Some((name, value)) = cookie.trim().split_once('=')
                && name == cookie_name
            {
                match session::verify_session_token(value, config) {
                    Ok(user) => return Some(Ok(user)),
                    // keep looking, a stale duplicate cookie may precede the fresh one
                    Err(e) => last_error = Some(e),
                }
            }
        }
    }

    last_error.map(Err)
}

/// Resolve the caller from request headers, preferring the Authorization header.
pub fn authenticate(headers: &HeaderMap, config: &Config) -> Result<CurrentUser> {
    let mut auth_errors = Vec::new();

    for (method, attempt) in [
        ("bearer", try_bearer_auth(headers, config)),
        ("cookie", try_cookie_auth(headers, config)),
    ] {
        match attempt {
            Some(Ok(user)) => {
                debug!(user_id = %user.id, method, "Authenticated user");
                return Ok(user);
            }
            Some(Err(e)) => {
                trace!("{method} authentication failed: {e:?}");
                auth_errors.push(e);
            }
            None => trace!("No {method} authentication attempted"),
        }
    }

    // Surface server-side failures (e.g. missing secret key) instead of masking them as 401
    if let Some(pos) = auth_errors.iter().position(|e| matches!(e, Error::Internal { .. })) {
        return Err(auth_errors.swap_remove(pos));
    }

    Err(Error::Unauthenticated { message: None })
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Error;

    /// The token only identifies the account; role and author link are read from the
    /// `users` row so relinks and deletions apply immediately.
    #[instrument(skip(parts, state))]
    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self> {
        let claimed = authenticate(&parts.headers, &state.config)?;

        let mut conn = state.db.acquire().await.map_err(|e| Error::Database(e.into()))?;
        let user = Users::new(&mut conn)
            .get_by_id(claimed.id)
            .await?
            .ok_or(Error::Unauthenticated { message: None })?;

        Ok(CurrentUser::from(user))
    }
}
