//! Security headers and CORS middleware.
//!
//! Every response carries the security header set. CORS is permissive in
//! development; production restricts `Access-Control-Allow-Origin` to the
//! configured allow-list. OPTIONS preflight requests are answered directly
//! with the same headers.

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::config::schema::ServerConfig;

pub async fn security_headers_middleware(
    State(config): State<Arc<ServerConfig>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let origin = request
        .headers()
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned);

    let mut response = if request.method() == Method::OPTIONS {
        StatusCode::OK.into_response()
    } else {
        next.run(request).await
    };

    apply_headers(response.headers_mut(), &config, origin.as_deref());
    response
}

fn apply_headers(headers: &mut HeaderMap, config: &ServerConfig, origin: Option<&str>) {
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(
        header::X_XSS_PROTECTION,
        HeaderValue::from_static("1; mode=block"),
    );
    headers.insert(
        header::REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    let allow_origin = if config.environment.is_production() {
        origin
            .filter(|o| config.cors.allowed_origins.iter().any(|allowed| allowed == o))
            .and_then(|o| HeaderValue::from_str(o).ok())
    } else {
        Some(HeaderValue::from_static("*"))
    };

    if let Some(value) = allow_origin {
        headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, value);
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_static("GET, POST, PUT, DELETE, OPTIONS"),
        );
        headers.insert(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static("Content-Type, Authorization"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::Environment;

    #[test]
    fn test_development_allows_any_origin() {
        let config = ServerConfig::default();
        let mut headers = HeaderMap::new();

        apply_headers(&mut headers, &config, Some("https://anywhere.example"));

        assert_eq!(headers[header::X_CONTENT_TYPE_OPTIONS], "nosniff");
        assert_eq!(headers[header::X_FRAME_OPTIONS], "DENY");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    }

    #[test]
    fn test_production_restricts_to_allow_list() {
        let mut config = ServerConfig::default();
        config.environment = Environment::Production;
        config.cors.allowed_origins = vec!["https://app.example.com".into()];

        let mut headers = HeaderMap::new();
        apply_headers(&mut headers, &config, Some("https://app.example.com"));
        assert_eq!(
            headers[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example.com"
        );

        let mut headers = HeaderMap::new();
        apply_headers(&mut headers, &config, Some("https://evil.example.com"));
        assert!(headers.get(header::ACCESS_CONTROL_ALLOW_ORIGIN).is_none());
        // Security headers are still present.
        assert_eq!(headers[header::REFERRER_POLICY], "strict-origin-when-cross-origin");
    }
}
