//! Cross-origin access for the browser dashboard.
//!
//! Only configured origins get CORS headers. Credentials are allowed, so the
//! allowed methods and headers echo what the preflight asked for instead of
//! using a wildcard.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Origins allowed to call the API
#[derive(Debug, Clone)]
pub struct CorsPolicy {
    allowed_origins: Arc<[String]>,
}

impl CorsPolicy {
    /// Allow exactly these origins
    pub fn new(allowed_origins: &[String]) -> Self {
        Self {
            allowed_origins: allowed_origins
                .iter()
                .map(|o| o.trim_end_matches('/').to_string())
                .collect(),
        }
    }

    /// The request's origin, if it is allowed
    fn allowed_origin(&self, headers: &HeaderMap) -> Option<HeaderValue> {
        let origin = headers.get(header::ORIGIN)?;
        let value = origin.to_str().ok()?;
        self.allowed_origins
            .iter()
            .any(|o| o == value)
            .then(|| origin.clone())
    }
}

/// Answer preflight requests and decorate responses for allowed origins
pub async fn cors_middleware(
    State(policy): State<CorsPolicy>,
    req: Request,
    next: Next,
) -> Response {
    let origin = policy.allowed_origin(req.headers());

    let is_preflight = req.method() == Method::OPTIONS
        && req.headers().contains_key(header::ACCESS_CONTROL_REQUEST_METHOD);
    if is_preflight {
        let mut resp = StatusCode::NO_CONTENT.into_response();
        if let Some(origin) = origin {
            let request_headers = req.headers();
            let headers = resp.headers_mut();
            allow_origin(headers, origin);
            if let Some(method) = request_headers.get(header::ACCESS_CONTROL_REQUEST_METHOD) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, method.clone());
            }
            if let Some(requested) = request_headers.get(header::ACCESS_CONTROL_REQUEST_HEADERS) {
                headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, requested.clone());
            }
        }
        return resp;
    }

    let mut resp = next.run(req).await;
    if let Some(origin) = origin {
        allow_origin(resp.headers_mut(), origin);
    }
    resp
}

fn allow_origin(headers: &mut HeaderMap, origin: HeaderValue) {
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, origin);
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_CREDENTIALS,
        HeaderValue::from_static("true"),
    );
    headers.append(header::VARY, HeaderValue::from_static("origin"));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allowed_origin_matches_exactly() {
        let policy = CorsPolicy::new(&["http://localhost:5173/".to_string()]);

        let mut headers = HeaderMap::new();
        headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:5173"));
        assert!(policy.allowed_origin(&headers).is_some());

        headers.insert(header::ORIGIN, HeaderValue::from_static("http://localhost:5174"));
        assert!(policy.allowed_origin(&headers).is_none());

        assert!(policy.allowed_origin(&HeaderMap::new()).is_none());
    }
}
