//! JWT authentication module.
//!
//! Tokens are minted by the identity provider; this server only verifies
//! them. [`JwtVerifier::issue`] exists for the seed tooling and tests.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user id)
    pub sub: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID
    #[serde(default)]
    pub jti: Option<String>,

    /// Billing entitlements, e.g. `ai_flashcard_generation`
    #[serde(default)]
    pub features: Vec<String>,
}

/// HS256 token verifier.
pub struct JwtVerifier {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl JwtVerifier {
    pub fn new(secret: &str) -> Self {
        JwtVerifier {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Mints a token for `user_id`.
    pub fn issue(
        &self,
        user_id: &str,
        features: &[&str],
        lifetime: Duration,
    ) -> Result<String, ApiError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: (now + lifetime).timestamp(),
            jti: Some(Uuid::new_v4().to_string()),
            features: features.iter().map(|f| f.to_string()).collect(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "Failed to generate token");
            ApiError::unexpected("Failed to generate token")
        })
    }

    /// Validates signature and expiry, then returns the claims.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Rejected token");
            ApiError::unauthorized("Invalid or expired token")
        })?;

        if data.claims.sub.trim().is_empty() {
            return Err(ApiError::unauthorized("Token has no subject"));
        }

        Ok(data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

// =============================================================================
// Extractor
// =============================================================================

/// The acting user, resolved from the `Authorization` header.
///
/// Handlers that take an `AuthUser` reject unauthenticated requests with 401
/// before any of their code runs.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub features: Vec<String>,
}

impl AuthUser {
    pub fn has_feature(&self, feature: &str) -> bool {
        self.features.iter().any(|f| f == feature)
    }

    /// Fails with `FEATURE_REQUIRED` unless the user holds `feature`.
    pub fn require_feature(&self, feature: &str) -> Result<(), ApiError> {
        if self.has_feature(feature) {
            Ok(())
        } else {
            Err(ApiError::feature_required(feature))
        }
    }
}

impl From<Claims> for AuthUser {
    fn from(claims: Claims) -> Self {
        AuthUser {
            id: claims.sub,
            features: claims.features,
        }
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = extract_bearer_token(header)
            .ok_or_else(|| ApiError::unauthorized("Expected a bearer token"))?;

        state.jwt.verify(token).map(AuthUser::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashdeck_core::AI_GENERATION_FEATURE;

    #[test]
    fn test_jwt_roundtrip() {
        let verifier = JwtVerifier::new("test-secret");

        let token = verifier
            .issue("user-001", &[AI_GENERATION_FEATURE], Duration::hours(1))
            .unwrap();
        let user = AuthUser::from(verifier.verify(&token).unwrap());

        assert_eq!(user.id, "user-001");
        assert!(user.has_feature(AI_GENERATION_FEATURE));
        assert!(user.require_feature("something_else").is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let token = JwtVerifier::new("one")
            .issue("user-001", &[], Duration::hours(1))
            .unwrap();

        assert!(JwtVerifier::new("two").verify(&token).is_err());
    }

    #[test]
    fn test_expired_token() {
        let verifier = JwtVerifier::new("test-secret");
        // Past the default 60s leeway
        let token = verifier
            .issue("user-001", &[], Duration::minutes(-5))
            .unwrap();

        assert!(verifier.verify(&token).is_err());
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Bearer "), None);
        assert_eq!(extract_bearer_token("Basic dXNlcg=="), None);
    }
}
