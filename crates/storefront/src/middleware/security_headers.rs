//! Security headers middleware.
//!
//! Locked down by default. The CSP opens exactly what the pages use: the
//! Leaflet bundle from unpkg, OpenStreetMap tiles for the store map picker and
//! product photos served from the backend's storage over https.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Leaflet script and stylesheet origin.
pub const LEAFLET_CDN: &str = "https://unpkg.com";
/// OpenStreetMap tile servers.
pub const OSM_TILES: &str = "https://*.tile.openstreetmap.org";

/// Build the CSP header value for a response.
#[must_use]
pub fn content_security_policy(nonce: Option<&str>) -> String {
    let script_nonce = nonce
        .filter(|n| !n.is_empty())
        .map(|n| format!(" 'nonce-{n}'"))
        .unwrap_or_default();

    format!(
        "default-src 'none'; \
         script-src 'self'{script_nonce} {LEAFLET_CDN}; \
         style-src 'self' {LEAFLET_CDN}; \
         font-src 'self'; \
         img-src 'self' data: https: {OSM_TILES}; \
         connect-src 'self'; \
         frame-src 'none'; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let nonce = response
        .extensions()
        .get::<CspNonce>()
        .map(|n| n.value().to_owned());
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    match HeaderValue::from_str(&content_security_policy(nonce.as_deref())) {
        Ok(value) => {
            headers.insert(CONTENT_SECURITY_POLICY, value);
        }
        Err(e) => tracing::error!(error = %e, "CSP header is not a valid header value"),
    }

    // The map picker may center on the buyer's own location.
    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), microphone=(), payment=(), usb=(), geolocation=(self), \
             interest-cohort=()",
        ),
    );

    if !headers.contains_key(CACHE_CONTROL) {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin"),
    );

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_allows_map_sources() {
        let csp = content_security_policy(Some("abc123"));
        assert!(csp.contains("'nonce-abc123'"));
        assert!(csp.contains(OSM_TILES));
        assert!(csp.contains(LEAFLET_CDN));
        assert!(csp.contains("frame-ancestors 'none'"));
    }

    #[test]
    fn test_policy_without_nonce() {
        let csp = content_security_policy(None);
        assert!(!csp.contains("nonce-"));
    }
}
