use crate::errors::ApiError;
use axum::extract::FromRequestParts;
use http::request::Parts;
use headers::authorization::Bearer;
use headers::{Authorization, HeaderMapExt};
use std::sync::Arc;

/// Token guarding mutating routes; `None` leaves them open.
#[derive(Debug, Clone, Default)]
pub struct AdminToken(pub Option<Arc<str>>);

impl AdminToken {
    pub fn new(token: Option<&str>) -> Self {
        Self(token.map(Arc::from))
    }

    fn permits(&self, presented: Option<&str>) -> bool {
        match (&self.0, presented) {
            (None, _) => true,
            (Some(expected), Some(presented)) => expected.as_ref() == presented,
            (Some(_), None) => false,
        }
    }
}

/// Extractor for upload/delete/create handlers.
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = parts
            .extensions
            .get::<AdminToken>()
            .cloned()
            .unwrap_or_default();

        let bearer = parts.headers.typed_get::<Authorization<Bearer>>();
        let presented = bearer.as_ref().map(|auth| auth.token());

        if token.permits(presented) {
            Ok(RequireAdmin)
        } else {
            Err(ApiError::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_when_no_token_configured() {
        let token = AdminToken::new(None);
        assert!(token.permits(None));
        assert!(token.permits(Some("anything")));
    }

    #[test]
    fn configured_token_must_match() {
        let token = AdminToken::new(Some("s3cret"));
        assert!(token.permits(Some("s3cret")));
        assert!(!token.permits(Some("guess")));
        assert!(!token.permits(None));
    }
}
