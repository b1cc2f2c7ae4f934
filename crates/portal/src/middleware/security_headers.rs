//! Security headers middleware.
//!
//! Locked down except where Google Identity needs room: its script, button
//! iframe, and stylesheet load from `accounts.google.com`, and the popup
//! flow needs `same-origin-allow-popups`. No cross-origin embedder policy
//! is sent because the Google button iframe does not set CORP headers.

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

/// Content Security Policy for every page.
///
/// Google posts the sign-in form back to us, so `form-action` stays `'self'`.
pub const CONTENT_SECURITY_POLICY_VALUE: &str = "default-src 'none'; \
     script-src 'self' https://accounts.google.com/gsi/client; \
     style-src 'self' https://accounts.google.com/gsi/style; \
     font-src 'self'; \
     img-src 'self' data: https://*.googleusercontent.com; \
     connect-src 'self' https://accounts.google.com/gsi/; \
     frame-src https://accounts.google.com/gsi/; \
     object-src 'none'; \
     base-uri 'self'; \
     form-action 'self'; \
     frame-ancestors 'none'";

fn policy_headers() -> [(HeaderName, HeaderValue); 8] {
    [
        (X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
        (X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (
            REFERRER_POLICY,
            HeaderValue::from_static("strict-origin-when-cross-origin"),
        ),
        (
            CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CONTENT_SECURITY_POLICY_VALUE),
        ),
        (
            HeaderName::from_static("permissions-policy"),
            HeaderValue::from_static(
                "camera=(), microphone=(), geolocation=(), payment=(), usb=(), \
                 interest-cohort=(), browsing-topics=()",
            ),
        ),
        // Dashboards show personal data
        (CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0")),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin-allow-popups"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
    ]
}

/// Add security headers to all responses.
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    for (name, value) in policy_headers() {
        headers.insert(name, value);
    }
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_allows_google_identity_only() {
        assert!(CONTENT_SECURITY_POLICY_VALUE.contains("https://accounts.google.com/gsi/client"));
        assert!(CONTENT_SECURITY_POLICY_VALUE.contains("frame-ancestors 'none'"));
        assert!(!CONTENT_SECURITY_POLICY_VALUE.contains("unsafe-inline"));
    }

    #[test]
    fn test_opener_policy_allows_sign_in_popup() {
        let headers = policy_headers();
        let coop = headers
            .iter()
            .find(|(name, _)| name.as_str() == "cross-origin-opener-policy")
            .map(|(_, value)| value.clone());
        assert_eq!(
            coop,
            Some(HeaderValue::from_static("same-origin-allow-popups"))
        );
        assert!(
            !headers
                .iter()
                .any(|(name, _)| name.as_str() == "cross-origin-embedder-policy")
        );
    }
}
