//! Bearer-token authentication for the event API.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request, StatusCode},
    middleware::Next,
    response::Response,
};

/// Token adapters must present as `Authorization: Bearer <token>`.
#[derive(Clone, Debug, Default)]
pub struct ApiAuth {
    token: Option<String>,
}

impl ApiAuth {
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
        }
    }

    /// Accept every request (local development and tests).
    pub fn disabled() -> Self {
        Self { token: None }
    }

    fn accepts(&self, header: Option<&str>) -> Result<(), &'static str> {
        let Some(expected) = &self.token else {
            return Ok(());
        };
        match header {
            Some(value) => match value.strip_prefix("Bearer ") {
                Some(token) if token == expected => Ok(()),
                Some(_) => Err("Invalid bearer token provided"),
                None => Err("Invalid Authorization header format"),
            },
            None => Err("Missing Authorization header"),
        }
    }
}

pub async fn auth_middleware(
    State(auth): State<ApiAuth>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    match auth.accepts(header) {
        Ok(()) => Ok(next.run(request).await),
        Err(reason) => {
            tracing::warn!("{}", reason);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_accepts_anything() {
        assert!(ApiAuth::disabled().accepts(None).is_ok());
    }

    #[test]
    fn requires_matching_bearer_token() {
        let auth = ApiAuth::with_token("secret");
        assert!(auth.accepts(Some("Bearer secret")).is_ok());
        assert!(auth.accepts(Some("Bearer wrong")).is_err());
        assert!(auth.accepts(Some("secret")).is_err());
        assert!(auth.accepts(None).is_err());
    }
}
