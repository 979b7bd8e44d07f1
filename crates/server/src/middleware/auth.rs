//! Bearer token authentication
//!
//! The identity provider signs HS256 tokens with a shared secret. The `sub`
//! claim identifies the user; every stored record is scoped to it.

use axum::{
    Json,
    body::Body,
    extract::Request,
    http::{HeaderMap, StatusCode, header},
    middleware::Next,
    response::{IntoResponse, Response},
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use scribe_core::ErrorResponse;
use serde::Deserialize;

/// Token verification state
#[derive(Clone)]
pub struct JwtAuth {
    key: Option<DecodingKey>,
    validation: Validation,
}

/// The authenticated caller, available to handlers as an extension
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser(pub String);

#[derive(Debug, Deserialize)]
struct Claims {
    sub: String,
}

impl JwtAuth {
    /// Without a secret no token can be verified and every request is rejected
    pub fn new(secret: Option<&str>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            key: secret.map(|s| DecodingKey::from_secret(s.as_bytes())),
            validation,
        }
    }

    fn verify(&self, token: &str) -> Option<AuthUser> {
        let key = self.key.as_ref()?;
        match decode::<Claims>(token, key, &self.validation) {
            Ok(data) if !data.claims.sub.trim().is_empty() => Some(AuthUser(data.claims.sub)),
            Ok(_) => None,
            Err(e) => {
                tracing::debug!(error = %e, "Rejected bearer token");
                None
            }
        }
    }
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Authentication middleware
pub async fn auth_middleware(mut request: Request<Body>, next: Next) -> Response {
    let user = request
        .extensions()
        .get::<JwtAuth>()
        .and_then(|auth| bearer_token(request.headers()).and_then(|t| auth.verify(t)));

    let Some(user) = user else {
        return (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse::not_authenticated()),
        )
            .into_response();
    };

    request.extensions_mut().insert(user.clone());
    let mut response = next.run(request).await;
    // Lets the audit log name the caller
    response.extensions_mut().insert(user);
    response
}
