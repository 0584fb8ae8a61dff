//! Integration test harness for the Soirn storefront.
//!
//! Drives the full router (middleware stack included) in-process against an
//! in-memory signup store, an in-memory session store, and a scripted
//! checkout platform. No database or Shopify credentials are needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p soirn-integration-tests
//! ```
//!
//! # Test Categories
//!
//! - `waitlist` - Signup gateway over HTTP
//! - `checkout` - Hosted checkout from line items
//! - `cart` - Session cart and cart checkout
//! - `products` - Catalog listing and detail

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Method, Request, StatusCode, header};
use serde_json::Value;
use tokio::sync::Mutex;
use tower::ServiceExt;
use tower_sessions::MemoryStore;

use soirn_storefront::catalog::Catalog;
use soirn_storefront::config::WaitlistConfig;
use soirn_storefront::db::{RepositoryError, SignupStore};
use soirn_storefront::middleware::session_layer;
use soirn_storefront::models::signup::{NewSignup, WaitlistSignup};
use soirn_storefront::shopify::{
    CheckoutLineInput, CheckoutPlatform, CheckoutSession, ShopifyError,
};
use soirn_storefront::state::AppState;

/// Catalog used by the tests: one hoodie with two mapped sizes and one
/// size that has no platform variant.
pub const TEST_CATALOG: &str = r#"{
  "products": [
    {
      "slug": "drop-001-hoodie-black",
      "name": "Drop 001 Hoodie - Black",
      "price": 14000,
      "status": "coming_soon",
      "sizes": ["S", "M", "L"],
      "shopifyVariants": {
        "S": "gid://shopify/ProductVariant/1001",
        "M": "gid://shopify/ProductVariant/1002"
      }
    },
    {
      "slug": "logo-tee-white",
      "name": "Logo Tee - White",
      "price": 4500,
      "sizes": ["M"],
      "shopifyVariants": { "M": "gid://shopify/ProductVariant/2001" }
    }
  ]
}"#;

// =============================================================================
// Signup store
// =============================================================================

/// In-memory waitlist with a unique email constraint.
#[derive(Default)]
pub struct MemorySignupStore {
    rows: Mutex<Vec<WaitlistSignup>>,
    next_id: AtomicI32,
    failing: AtomicBool,
}

impl MemorySignupStore {
    /// Make every subsequent insert fail with a database error.
    pub fn fail_inserts(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Stored signups in insertion order.
    pub async fn rows(&self) -> Vec<WaitlistSignup> {
        self.rows.lock().await.clone()
    }
}

#[async_trait]
impl SignupStore for MemorySignupStore {
    async fn insert(&self, signup: &NewSignup) -> Result<WaitlistSignup, RepositoryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepositoryError::DataCorruption(
                "connection reset by peer".to_string(),
            ));
        }

        let mut rows = self.rows.lock().await;
        if rows.iter().any(|row| row.email == signup.email) {
            return Err(RepositoryError::Conflict(format!(
                "Email already registered: {}",
                signup.email
            )));
        }

        let row = WaitlistSignup {
            id: (self.next_id.fetch_add(1, Ordering::SeqCst) + 1).into(),
            email: signup.email.clone(),
            source: signup.source.clone(),
            created_at: chrono::Utc::now(),
        };
        rows.push(row.clone());
        Ok(row)
    }

    async fn ping(&self) -> Result<(), RepositoryError> {
        Ok(())
    }
}

// =============================================================================
// Checkout platform
// =============================================================================

/// What the scripted platform answers with.
#[derive(Debug, Clone)]
pub enum CheckoutScript {
    Succeed(CheckoutSession),
    Reject(String),
    Fail,
}

/// Checkout platform that replays a scripted answer and records every call.
pub struct ScriptedCheckout {
    script: Mutex<CheckoutScript>,
    calls: Mutex<Vec<Vec<CheckoutLineInput>>>,
}

impl ScriptedCheckout {
    #[must_use]
    pub fn new(script: CheckoutScript) -> Self {
        Self {
            script: Mutex::new(script),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Replace the scripted answer.
    pub async fn set_script(&self, script: CheckoutScript) {
        *self.script.lock().await = script;
    }

    /// Lines of every call received so far.
    pub async fn calls(&self) -> Vec<Vec<CheckoutLineInput>> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl CheckoutPlatform for ScriptedCheckout {
    async fn create_checkout(
        &self,
        lines: &[CheckoutLineInput],
    ) -> Result<CheckoutSession, ShopifyError> {
        self.calls.lock().await.push(lines.to_vec());

        match self.script.lock().await.clone() {
            CheckoutScript::Succeed(session) => Ok(session),
            CheckoutScript::Reject(message) => Err(ShopifyError::UserError(message)),
            CheckoutScript::Fail => Err(ShopifyError::NotFound("checkout cart".to_string())),
        }
    }
}

/// A checkout session the default script hands out.
#[must_use]
pub fn sample_session() -> CheckoutSession {
    CheckoutSession {
        checkout_id: "gid://shopify/Cart/c1".to_string(),
        checkout_url: "https://soirn.myshopify.com/cart/c/c1".to_string(),
    }
}

// =============================================================================
// Test context
// =============================================================================

/// A decoded response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

/// Router plus handles on its fakes.
pub struct TestContext {
    pub app: Router,
    pub signups: Arc<MemorySignupStore>,
    pub checkout: Arc<ScriptedCheckout>,
    cookie: Option<String>,
}

impl TestContext {
    /// Context with the default waitlist limits (5 per 60s).
    #[must_use]
    pub fn new() -> Self {
        Self::with_waitlist(WaitlistConfig::default())
    }

    /// Context with a custom signup rate limit.
    #[must_use]
    pub fn with_rate_limit(max: u32, window: Duration) -> Self {
        Self::with_waitlist(WaitlistConfig {
            rate_limit_max: max,
            rate_limit_window: window,
        })
    }

    fn with_waitlist(waitlist: WaitlistConfig) -> Self {
        let signups = Arc::new(MemorySignupStore::default());
        let checkout = Arc::new(ScriptedCheckout::new(CheckoutScript::Succeed(
            sample_session(),
        )));
        let catalog = Catalog::from_json(TEST_CATALOG).unwrap();

        let state = AppState::new(signups.clone(), checkout.clone(), catalog, waitlist);
        let app = soirn_storefront::build_router(
            state,
            session_layer(MemoryStore::default(), false),
        );

        Self {
            app,
            signups,
            checkout,
            cookie: None,
        }
    }

    /// Send a request, carrying the session cookie between calls.
    pub async fn request(
        &mut self,
        method: Method,
        uri: &str,
        body: Option<&str>,
        client: Option<&str>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if body.is_some() {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
        }
        if let Some(client) = client {
            builder = builder.header("x-forwarded-for", client);
        }
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
            .unwrap();

        let response = self.app.clone().oneshot(request).await.unwrap();

        if let Some(set_cookie) = response.headers().get(header::SET_COOKIE)
            && let Some(pair) = set_cookie.to_str().unwrap().split(';').next()
        {
            self.cookie = Some(pair.to_string());
        }

        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = serde_json::from_slice(&bytes)
            .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()));

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.request(Method::GET, uri, None, None).await
    }

    pub async fn post(&mut self, uri: &str, body: &str) -> TestResponse {
        self.request(Method::POST, uri, Some(body), None).await
    }

    /// POST as a specific client address.
    pub async fn post_as(&mut self, client: &str, uri: &str, body: &str) -> TestResponse {
        self.request(Method::POST, uri, Some(body), Some(client))
            .await
    }
}

impl Default for TestContext {
    fn default() -> Self {
        Self::new()
    }
}
