//! View controller.
//!
//! Owns every store and turns user events into store mutations and backend
//! calls. Each event returns an optional [`Notice`] that the routes render as
//! a toast; failures are reported that way and never escape as errors.
//!
//! The controller holds no locks of its own. The application state keeps it
//! behind a single async mutex, so events run one at a time.

pub mod section;

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use tracing::{info, instrument, warn};

use taproom_core::{NewProduct, Order, Price, Product, ProductId};

use crate::api::{ApiClient, ProductQuery};
use crate::checkout::{CheckoutFlow, CheckoutOutcome};
use crate::error::{add_breadcrumb, clear_sentry_user, set_sentry_user};
use crate::stores::{CartStore, CatalogStore, SessionError, SessionStore};

pub use section::{Section, SectionEffect, UnknownSection};

/// Toast severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
    Info,
}

impl NoticeKind {
    /// CSS modifier class.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub text: String,
}

impl Notice {
    #[must_use]
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn error(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Info,
            text: text.into(),
        }
    }
}

/// Which form the Account section shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthTab {
    #[default]
    Login,
    Register,
}

impl AuthTab {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Login => "login",
            Self::Register => "register",
        }
    }
}

impl fmt::Display for AuthTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AuthTab {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "login" => Ok(Self::Login),
            "register" => Ok(Self::Register),
            other => Err(UnknownSection(other.to_string())),
        }
    }
}

/// Owner of all client-side state.
#[derive(Debug)]
pub struct ViewController {
    api: ApiClient,
    catalog: CatalogStore,
    cart: CartStore,
    session: SessionStore,
    checkout: CheckoutFlow,
    section: Section,
    cart_open: bool,
    auth_tab: AuthTab,
    orders: Vec<Order>,
    orders_error: Option<String>,
    admin_products: Vec<Product>,
    admin_error: Option<String>,
}

impl ViewController {
    /// A controller on the Home section with an empty cart.
    #[must_use]
    pub fn new(api: ApiClient, session: SessionStore, checkout_delay: Duration) -> Self {
        if let Some(user) = session.user() {
            set_sentry_user(&user.email, Some(user.email.as_str()));
        }

        Self {
            api,
            catalog: CatalogStore::new(),
            cart: CartStore::new(),
            session,
            checkout: CheckoutFlow::new(checkout_delay),
            section: Section::Home,
            cart_open: false,
            auth_tab: AuthTab::Login,
            orders: Vec::new(),
            orders_error: None,
            admin_products: Vec::new(),
            admin_error: None,
        }
    }

    /// Initial catalog fetch. A failure only shows up as the catalog's
    /// inline error.
    pub async fn start(&mut self) {
        if let Err(failure) = self.catalog.load(&self.api, ProductQuery::default()).await {
            warn!(detail = %failure.detail, "Initial catalog load failed");
        }
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    /// Switch the visible section and run its entry load.
    #[instrument(skip(self), fields(section = %section))]
    pub async fn show(&mut self, section: Section) -> Option<Notice> {
        add_breadcrumb("navigation", "Show section", Some(&[("section", section.as_str())]));

        let (shown, effect) = section.enter(self.session.is_authenticated());
        self.section = shown;

        match effect {
            SectionEffect::None => {}
            SectionEffect::ReloadCatalog => {
                // Failures render inline in the grid.
                let _ = self.catalog.reload(&self.api).await;
            }
            SectionEffect::LoadOrders => self.load_orders().await,
            SectionEffect::LoadAdminProducts => self.load_admin_products().await,
        }

        (shown != section).then(|| Notice::info("Inicia sesión para ver tus pedidos"))
    }

    async fn load_orders(&mut self) {
        match self.api.my_orders(self.session.token()).await {
            Ok(orders) => {
                info!(count = orders.len(), "Order history loaded");
                self.orders = orders;
                self.orders_error = None;
            }
            Err(failure) => {
                warn!(status = failure.status, detail = %failure.detail, "Order history failed");
                self.orders.clear();
                self.orders_error = Some(failure.detail);
            }
        }
    }

    async fn load_admin_products(&mut self) {
        match self.api.list_products(&ProductQuery::default()).await {
            Ok(products) => {
                self.admin_products = products;
                self.admin_error = None;
            }
            Err(failure) => {
                warn!(status = failure.status, detail = %failure.detail, "Admin product list failed");
                self.admin_products.clear();
                self.admin_error = Some(failure.detail);
            }
        }
    }

    // =========================================================================
    // Catalog
    // =========================================================================

    /// Free-text search.
    pub async fn search(&mut self, term: &str) -> Option<Notice> {
        add_breadcrumb("catalog", "Search", Some(&[("term", term)]));
        self.load_catalog(ProductQuery::search(term)).await
    }

    /// Filter by beer style and maximum price.
    pub async fn apply_filters(&mut self, beer_type: &str, max_price: Option<Price>) -> Option<Notice> {
        add_breadcrumb("catalog", "Filter", Some(&[("type", beer_type)]));
        self.load_catalog(ProductQuery::filter(beer_type, max_price)).await
    }

    async fn load_catalog(&mut self, query: ProductQuery) -> Option<Notice> {
        self.section = Section::Catalog;
        match self.catalog.load(&self.api, query).await {
            Ok(_) => None,
            Err(failure) => Some(Notice::error(failure.detail)),
        }
    }

    /// Previous/next page.
    pub fn change_page(&mut self, delta: i64) -> Option<Notice> {
        self.catalog.change_page(delta);
        None
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Append a catalog product to the cart.
    pub fn add_to_cart(&mut self, id: &ProductId) -> Option<Notice> {
        let Some(product) = self.catalog.find(id).cloned() else {
            warn!(product_id = %id, "Add to cart for unknown product");
            return Some(Notice::error("Producto no disponible"));
        };

        add_breadcrumb("cart", "Add to cart", Some(&[("product_id", id.as_str())]));
        let name = product.name.clone();
        self.cart.add(product);
        Some(Notice::success(format!("{name} añadido al carrito")))
    }

    /// Remove the cart row at `index`. Stale indexes are ignored.
    pub fn remove_from_cart(&mut self, index: usize) -> Option<Notice> {
        if self.cart.remove(index) {
            add_breadcrumb("cart", "Remove from cart", None);
        }
        None
    }

    /// Open or close the cart sidebar.
    pub fn toggle_cart(&mut self) -> Option<Notice> {
        self.cart_open = !self.cart_open;
        None
    }

    /// Place an order for the cart.
    #[instrument(skip(self, address))]
    pub async fn checkout(&mut self, address: Option<String>) -> Option<Notice> {
        add_breadcrumb("checkout", "Submit order", None);

        let outcome = self
            .checkout
            .submit(&mut self.cart, &self.session, &self.api, address)
            .await;

        let notice = match outcome {
            CheckoutOutcome::EmptyCart => Notice::error("El carrito está vacío"),
            CheckoutOutcome::AuthenticationRequired => {
                self.cart_open = false;
                self.section = Section::Account;
                self.auth_tab = AuthTab::Login;
                Notice::info("Debes iniciar sesión para comprar.")
            }
            CheckoutOutcome::Placed(receipt) => {
                self.cart_open = false;
                self.section = Section::Orders;
                self.load_orders().await;
                Notice::success(format!("¡Pedido realizado! ID Pedido: {}", receipt.order_id))
            }
            CheckoutOutcome::Rejected(failure) => Notice::error(format!("Error: {}", failure.detail)),
        };
        Some(notice)
    }

    // =========================================================================
    // Account
    // =========================================================================

    /// Switch between the login and register forms.
    pub fn auth_tab(&mut self, tab: AuthTab) -> Option<Notice> {
        self.auth_tab = tab;
        None
    }

    /// Log in and go to the catalog.
    pub async fn login(&mut self, email: &str, password: &str) -> Option<Notice> {
        let result = self.session.login(&self.api, email, password).await;
        match result {
            Ok(user) => {
                set_sentry_user(&user.email, Some(user.email.as_str()));
                add_breadcrumb("auth", "Logged in", None);
            }
            Err(e) => return Some(Notice::error(e.to_string())),
        }

        self.section = Section::Catalog;
        let _ = self.catalog.reload(&self.api).await;
        Some(Notice::success("¡Bienvenido!"))
    }

    /// Create an account, then show the login form.
    pub async fn register(&mut self, name: &str, email: &str, password: &str) -> Option<Notice> {
        match SessionStore::register(&self.api, name, email, password).await {
            Ok(()) => {
                add_breadcrumb("auth", "Registered", None);
                self.auth_tab = AuthTab::Login;
                Some(Notice::success("¡Registro exitoso! Ahora inicia sesión."))
            }
            Err(e @ SessionError::Api(_)) => Some(Notice::error(format!("Error: {e}"))),
            Err(e) => Some(Notice::error(e.to_string())),
        }
    }

    /// Drop the session and every piece of client state tied to it.
    pub fn logout(&mut self) -> Option<Notice> {
        self.session.logout();
        clear_sentry_user();

        self.cart.clear();
        self.orders.clear();
        self.orders_error = None;
        self.cart_open = false;
        self.auth_tab = AuthTab::Login;
        self.section = Section::Home;
        None
    }

    // =========================================================================
    // Admin
    // =========================================================================

    /// Create a product and refresh the admin table.
    #[instrument(skip(self, product), fields(name = %product.name))]
    pub async fn create_product(&mut self, product: &NewProduct) -> Option<Notice> {
        let problems = product.problems();
        if !problems.is_empty() {
            return Some(Notice::error(problems.join(", ")));
        }

        let notice = match self.api.create_product(product).await {
            Ok(created) => {
                info!(product_id = %created.id, "Product created");
                Notice::success(format!("Producto \"{}\" creado", product.name))
            }
            Err(failure) => Notice::error(format!("Error: {}", failure.detail)),
        };

        self.section = Section::Admin;
        self.load_admin_products().await;
        Some(notice)
    }

    /// Delete a product and refresh the admin table.
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn delete_product(&mut self, id: &ProductId) -> Option<Notice> {
        let notice = match self.api.delete_product(id).await {
            Ok(()) => {
                info!("Product deleted");
                Notice::success("Producto eliminado")
            }
            Err(failure) => Notice::error(format!("Error: {}", failure.detail)),
        };

        self.section = Section::Admin;
        self.load_admin_products().await;
        Some(notice)
    }

    // =========================================================================
    // Read access for rendering
    // =========================================================================

    #[must_use]
    pub const fn section(&self) -> Section {
        self.section
    }

    #[must_use]
    pub const fn catalog(&self) -> &CatalogStore {
        &self.catalog
    }

    #[must_use]
    pub const fn cart(&self) -> &CartStore {
        &self.cart
    }

    #[must_use]
    pub const fn session(&self) -> &SessionStore {
        &self.session
    }

    #[must_use]
    pub const fn checkout_flow(&self) -> &CheckoutFlow {
        &self.checkout
    }

    #[must_use]
    pub const fn cart_open(&self) -> bool {
        self.cart_open
    }

    #[must_use]
    pub const fn auth_tab_selected(&self) -> AuthTab {
        self.auth_tab
    }

    #[must_use]
    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    #[must_use]
    pub fn orders_error(&self) -> Option<&str> {
        self.orders_error.as_deref()
    }

    #[must_use]
    pub fn admin_products(&self) -> &[Product] {
        &self.admin_products
    }

    #[must_use]
    pub fn admin_error(&self) -> Option<&str> {
        self.admin_error.as_deref()
    }
}
