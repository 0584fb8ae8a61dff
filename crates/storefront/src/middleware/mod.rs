//! HTTP middleware stack for storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Security headers
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting (governor on the cart API, fixed window on signups)

pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use rate_limit::{FixedWindowLimiter, RateDecision, api_rate_limiter, client_identifier};
pub use request_id::request_id_middleware;
pub use security_headers::{hsts_middleware, security_headers_middleware};
pub use session::{create_session_layer, session_layer};
