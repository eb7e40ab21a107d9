//! JWT session token creation and verification.

use chrono::Utc;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind};
use serde::{Deserialize, Serialize};

use crate::{
    api::models::users::{CurrentUser, Role},
    config::Config,
    errors::Error,
    types::{AuthorId, UserId},
};

/// JWT session claims
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: UserId,                   // Subject (user ID)
    pub username: String,              // Username
    pub role: Role,                    // Account role
    pub author_id: Option<AuthorId>,   // Linked author profile
    pub exp: i64,                      // Expiration time
    pub iat: i64,                      // Issued at
}

impl SessionClaims {
    pub fn new(user: &CurrentUser, config: &Config) -> Self {
        let now = Utc::now();
        let exp = now + config.auth.security.jwt_expiry;

        Self {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            author_id: user.author_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
        }
    }
}

impl From<SessionClaims> for CurrentUser {
    fn from(claims: SessionClaims) -> Self {
        Self {
            id: claims.sub,
            username: claims.username,
            role: claims.role,
            author_id: claims.author_id,
        }
    }
}

fn secret_key(config: &Config) -> Result<&str, Error> {
    config
        .secret_key
        .as_deref()
        .filter(|k| !k.is_empty())
        .ok_or_else(|| Error::Internal {
            operation: "JWT sessions: secret_key is required".to_string(),
        })
}

/// Create a JWT token for a user session
pub fn create_session_token(user: &CurrentUser, config: &Config) -> Result<String, Error> {
    let claims = SessionClaims::new(user, config);
    let key = EncodingKey::from_secret(secret_key(config)?.as_bytes());
    encode(&Header::default(), &claims, &key).map_err(|e| Error::Internal {
        operation: format!("create JWT: {e}"),
    })
}

/// Verify and decode a JWT session token
pub fn verify_session_token(token: &str, config: &Config) -> Result<CurrentUser, Error> {
    let key = DecodingKey::from_secret(secret_key(config)?.as_bytes());

    let token_data = decode::<SessionClaims>(token, &key, &Validation::default()).map_err(|e| match e.kind() {
        // Client errors (401): malformed, tampered or expired tokens
        ErrorKind::InvalidToken
        | ErrorKind::InvalidSignature
        | ErrorKind::ExpiredSignature
        | ErrorKind::MissingRequiredClaim(_)
        | ErrorKind::InvalidIssuer
        | ErrorKind::InvalidAudience
        | ErrorKind::InvalidSubject
        | ErrorKind::ImmatureSignature
        | ErrorKind::Base64(_)
        | ErrorKind::Json(_)
        | ErrorKind::Utf8(_)
        | ErrorKind::InvalidAlgorithm => Error::Unauthenticated { message: None },

        // Server errors (500): key issues, internal failures
        _ => Error::Internal {
            operation: format!("JWT verification: {e}"),
        },
    })?;

    Ok(CurrentUser::from(token_data.claims))
}

/// `Set-Cookie` value carrying a fresh session token.
pub fn create_session_cookie(token: &str, config: &Config) -> String {
    let session = &config.auth.session;
    let secure = if session.cookie_secure { "; Secure" } else { "" };

    format!(
        "{}={}; Path=/; HttpOnly{}; SameSite={}; Max-Age={}",
        session.cookie_name,
        token,
        secure,
        capitalize(&session.cookie_same_site),
        session.timeout.as_secs()
    )
}

/// `Set-Cookie` value that expires the session cookie.
pub fn clear_session_cookie(config: &Config) -> String {
    format!(
        "{}=; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=0",
        config.auth.session.cookie_name
    )
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AuthConfig, SecurityConfig};
    use std::time::Duration;
    use uuid::Uuid;

    fn create_test_config() -> Config {
        Config {
            secret_key: Some("test-secret-key-for-jwt".to_string()),
            auth: AuthConfig {
                security: SecurityConfig {
                    jwt_expiry: Duration::from_secs(3600), // 1 hour
                    cors: crate::config::CorsConfig::default(),
                },
                ..Default::default()
            },
            ..Default::default()
        }
    }

    fn create_test_user() -> CurrentUser {
        CurrentUser {
            id: Uuid::new_v4(),
            username: "dina".to_string(),
            role: Role::Editor,
            author_id: Some(Uuid::new_v4()),
        }
    }

    #[test]
    fn test_create_and_verify_session_token() {
        let config = create_test_config();
        let user = create_test_user();

        let token = create_session_token(&user, &config).unwrap();
        assert!(!token.is_empty());

        let verified = verify_session_token(&token, &config).unwrap();
        assert_eq!(verified.id, user.id);
        assert_eq!(verified.username, user.username);
        assert_eq!(verified.role, Role::Editor);
        assert_eq!(verified.author_id, user.author_id);
    }

    #[test]
    fn test_verify_token_wrong_secret() {
        let mut config = create_test_config();
        let token = create_session_token(&create_test_user(), &config).unwrap();

        config.secret_key = Some("different-secret".to_string());
        let result = verify_session_token(&token, &config);
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_verify_expired_token() {
        let config = create_test_config();
        let user = create_test_user();

        let now = Utc::now();
        let claims = SessionClaims {
            sub: user.id,
            username: user.username.clone(),
            role: user.role,
            author_id: None,
            exp: (now - chrono::Duration::seconds(3600)).timestamp(),
            iat: now.timestamp(),
        };
        let key = EncodingKey::from_secret(config.secret_key.as_ref().unwrap().as_bytes());
        let token = encode(&Header::default(), &claims, &key).unwrap();

        let result = verify_session_token(&token, &config);
        assert!(matches!(result, Err(Error::Unauthenticated { .. })));
    }

    #[test]
    fn test_verify_malformed_token() {
        let config = create_test_config();

        for token in ["not.a.token", "invalid", "", "too.many.parts.in.this.token"] {
            let result = verify_session_token(token, &config);
            assert!(
                matches!(result, Err(Error::Unauthenticated { .. })),
                "Expected Unauthenticated error for token: {token}"
            );
        }
    }

    #[test]
    fn test_missing_secret_is_internal() {
        let config = Config {
            secret_key: None,
            ..create_test_config()
        };
        assert!(matches!(
            create_session_token(&create_test_user(), &config),
            Err(Error::Internal { .. })
        ));
    }

    #[test]
    fn test_session_cookie_format() {
        let config = create_test_config();
        let cookie = create_session_cookie("abc", &config);
        assert_eq!(cookie, "solvera_session=abc; Path=/; HttpOnly; Secure; SameSite=Strict; Max-Age=86400");

        let mut insecure = create_test_config();
        insecure.auth.session.cookie_secure = false;
        insecure.auth.session.cookie_same_site = "lax".to_string();
        assert!(create_session_cookie("abc", &insecure).contains("HttpOnly; SameSite=Lax;"));

        assert!(clear_session_cookie(&config).ends_with("Max-Age=0"));
    }
}
