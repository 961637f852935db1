//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. `TraceLayer` (request span with a `request_id` field)
//! 3. Request ID (fills the span field, echoes `x-request-id`)
//! 4. Security headers
//! 5. Error detail exposure (development only)
//! 6. CSRF guard (`/api` only)
//! 7. Rate limiting (per route group)

pub mod csrf;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;

pub use csrf::{
    CSRF_COOKIE_NAME, CSRF_ERROR_MESSAGE, CSRF_HEADER_NAME, CsrfError, CsrfGuard, IssuedToken,
    csrf_middleware, requires_csrf,
};
pub use rate_limit::{api_rate_limiter, coupon_rate_limiter};
pub use request_id::{REQUEST_ID_HEADER, RequestId, request_id_middleware};
pub use security_headers::{security_headers_middleware, security_headers_with_hsts_middleware};
