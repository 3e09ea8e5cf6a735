//! Checkout flow.
//!
//! ```text
//! Idle -> Validating -> Submitting -> Succeeded
//!              |             \-----> Failed
//!              \-> Failed (empty cart)
//!              \-> Idle   (not logged in)
//! ```
//!
//! Terminal states fall back to `Idle` when the next submission starts. The
//! cart is only cleared once the backend has confirmed the order.

use std::time::Duration;

use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::api::{ApiClient, ApiFailure, CheckoutReceipt, CheckoutRequest};
use crate::stores::{CartStore, SessionStore};

/// Where a checkout attempt currently stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CheckoutState {
    #[default]
    Idle,
    Validating,
    Submitting,
    Succeeded,
    Failed,
}

/// A state change the flow does not allow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("illegal checkout transition {from:?} -> {to:?}")]
pub struct IllegalTransition {
    pub from: CheckoutState,
    pub to: CheckoutState,
}

impl CheckoutState {
    /// Whether the attempt has finished.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed)
    }

    /// Move to `to`, or refuse if the flow never goes that way.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransition` for any move not in the diagram above.
    pub const fn transition(self, to: Self) -> Result<Self, IllegalTransition> {
        let allowed = matches!(
            (self, to),
            (Self::Idle, Self::Validating)
                | (Self::Validating, Self::Submitting | Self::Failed | Self::Idle)
                | (Self::Submitting, Self::Succeeded | Self::Failed)
                | (Self::Succeeded | Self::Failed, Self::Idle)
        );
        if allowed {
            Ok(to)
        } else {
            Err(IllegalTransition { from: self, to })
        }
    }
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckoutOutcome {
    /// Nothing to buy; no request was made.
    EmptyCart,
    /// No session; the user has to log in first. No request was made.
    AuthenticationRequired,
    /// The backend accepted the order and the cart was cleared.
    Placed(CheckoutReceipt),
    /// The backend refused the order or could not be reached.
    Rejected(ApiFailure),
}

/// Drives one checkout at a time.
#[derive(Debug, Clone)]
pub struct CheckoutFlow {
    state: CheckoutState,
    delay: Duration,
}

impl CheckoutFlow {
    /// A flow that pauses `delay` before submitting (simulated payment).
    #[must_use]
    pub const fn new(delay: Duration) -> Self {
        Self {
            state: CheckoutState::Idle,
            delay,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> CheckoutState {
        self.state
    }

    /// The pause before the order is sent.
    #[must_use]
    pub const fn delay(&self) -> Duration {
        self.delay
    }

    fn advance(&mut self, to: CheckoutState) {
        match self.state.transition(to) {
            Ok(next) => self.state = next,
            Err(e) => error!(error = %e, "Checkout state machine out of sync"),
        }
    }

    /// Validate the cart and session, then place the order.
    ///
    /// The cart is cleared only on [`CheckoutOutcome::Placed`].
    #[instrument(skip_all, fields(items = cart.count()))]
    pub async fn submit(
        &mut self,
        cart: &mut CartStore,
        session: &SessionStore,
        api: &ApiClient,
        address: Option<String>,
    ) -> CheckoutOutcome {
        if self.state.is_terminal() {
            self.advance(CheckoutState::Idle);
        }
        self.advance(CheckoutState::Validating);

        if cart.is_empty() {
            self.advance(CheckoutState::Failed);
            return CheckoutOutcome::EmptyCart;
        }

        let user = match (session.token(), session.user()) {
            (Some(_), Some(user)) => user,
            _ => {
                info!("Checkout requires login");
                self.advance(CheckoutState::Idle);
                return CheckoutOutcome::AuthenticationRequired;
            }
        };

        self.advance(CheckoutState::Submitting);

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        let request = CheckoutRequest {
            user_email: user.email.as_str().to_string(),
            total_amount: cart.total(),
            items: cart.order_items(),
            address: address
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty()),
        };

        match api.checkout(&request, session.token()).await {
            Ok(receipt) => {
                info!(order_id = %receipt.order_id, total = %request.total_amount, "Order placed");
                cart.clear();
                self.advance(CheckoutState::Succeeded);
                CheckoutOutcome::Placed(receipt)
            }
            Err(failure) => {
                warn!(status = failure.status, detail = %failure.detail, "Checkout rejected");
                self.advance(CheckoutState::Failed);
                CheckoutOutcome::Rejected(failure)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::cache::{KeyValueCache, MemoryCache};
    use crate::stores::catalog::tests::beer;
    use crate::stores::session::keys;

    fn offline_api() -> ApiClient {
        ApiClient::with_base_url(url::Url::parse("http://127.0.0.1:9/api").unwrap())
    }

    fn logged_in() -> SessionStore {
        let cache = MemoryCache::new();
        cache.set(keys::ACCESS_TOKEN, "abc").unwrap();
        cache
            .set(keys::CURRENT_USER, r#"{"name":"Ana","email":"a@x.cl"}"#)
            .unwrap();
        SessionStore::restore(Arc::new(cache))
    }

    #[test]
    fn test_transitions() {
        use CheckoutState::{Failed, Idle, Submitting, Succeeded, Validating};

        assert_eq!(Idle.transition(Validating), Ok(Validating));
        assert_eq!(Validating.transition(Submitting), Ok(Submitting));
        assert_eq!(Submitting.transition(Succeeded), Ok(Succeeded));
        assert_eq!(Succeeded.transition(Idle), Ok(Idle));
        assert_eq!(Failed.transition(Idle), Ok(Idle));

        assert!(Idle.transition(Submitting).is_err());
        assert!(Idle.transition(Succeeded).is_err());
        assert!(Submitting.transition(Idle).is_err());
        assert!(Succeeded.transition(Validating).is_err());
        assert_eq!(
            Failed.transition(Submitting).unwrap_err(),
            IllegalTransition {
                from: Failed,
                to: Submitting
            }
        );
    }

    #[tokio::test]
    async fn test_empty_cart_fails_without_request() {
        let mut flow = CheckoutFlow::new(Duration::ZERO);
        let mut cart = CartStore::new();

        let outcome = flow.submit(&mut cart, &logged_in(), &offline_api(), None).await;
        assert_eq!(outcome, CheckoutOutcome::EmptyCart);
        assert_eq!(flow.state(), CheckoutState::Failed);
    }

    #[tokio::test]
    async fn test_logged_out_requires_authentication() {
        let mut flow = CheckoutFlow::new(Duration::ZERO);
        let mut cart = CartStore::new();
        cart.add(beer("p1", 3000));
        let session = SessionStore::new(Arc::new(MemoryCache::new()));

        let outcome = flow.submit(&mut cart, &session, &offline_api(), None).await;
        assert_eq!(outcome, CheckoutOutcome::AuthenticationRequired);
        assert_eq!(flow.state(), CheckoutState::Idle);
        assert_eq!(cart.count(), 1);
    }

    #[tokio::test]
    async fn test_connection_error_keeps_cart() {
        let mut flow = CheckoutFlow::new(Duration::ZERO);
        let mut cart = CartStore::new();
        cart.add(beer("p1", 3000));

        let outcome = flow.submit(&mut cart, &logged_in(), &offline_api(), None).await;
        let CheckoutOutcome::Rejected(failure) = outcome else {
            panic!("expected rejection, got {outcome:?}");
        };
        assert!(failure.is_connection_error());
        assert_eq!(flow.state(), CheckoutState::Failed);
        assert_eq!(cart.total().amount(), 3000);

        // A retry starts over from Idle.
        let outcome = flow.submit(&mut cart, &logged_in(), &offline_api(), None).await;
        assert!(matches!(outcome, CheckoutOutcome::Rejected(_)));
    }
}
