//! Application state shared across handlers.

use std::sync::Arc;

use crate::catalog::Catalog;
use crate::config::WaitlistConfig;
use crate::db::SignupStore;
use crate::middleware::rate_limit::FixedWindowLimiter;
use crate::services::waitlist::SignupGateway;
use crate::shopify::CheckoutPlatform;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc`. The signup store and the
/// checkout platform are held behind traits so the router can run against
/// test doubles.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    signups: Arc<dyn SignupStore>,
    gateway: SignupGateway,
    checkout: Arc<dyn CheckoutPlatform>,
    catalog: Catalog,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `signups` - Waitlist signup store
    /// * `checkout` - Hosted checkout platform
    /// * `catalog` - Product catalog
    /// * `waitlist` - Signup rate limit settings
    #[must_use]
    pub fn new(
        signups: Arc<dyn SignupStore>,
        checkout: Arc<dyn CheckoutPlatform>,
        catalog: Catalog,
        waitlist: WaitlistConfig,
    ) -> Self {
        let limiter = FixedWindowLimiter::new(waitlist.rate_limit_max, waitlist.rate_limit_window);
        let gateway = SignupGateway::new(Arc::clone(&signups), limiter);

        Self {
            inner: Arc::new(AppStateInner {
                signups,
                gateway,
                checkout,
                catalog,
            }),
        }
    }

    /// Get the waitlist signup store.
    #[must_use]
    pub fn signups(&self) -> &dyn SignupStore {
        self.inner.signups.as_ref()
    }

    /// Get the waitlist signup gateway.
    #[must_use]
    pub fn gateway(&self) -> &SignupGateway {
        &self.inner.gateway
    }

    /// Get the hosted checkout platform.
    #[must_use]
    pub fn checkout(&self) -> &dyn CheckoutPlatform {
        self.inner.checkout.as_ref()
    }

    /// Get the product catalog.
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }
}
