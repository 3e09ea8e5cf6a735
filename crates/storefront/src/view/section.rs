//! Visible page sections.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The one section of the page that is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Section {
    #[default]
    Home,
    Catalog,
    Account,
    Orders,
    Admin,
}

/// Work to do when a section is entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SectionEffect {
    None,
    /// Re-fetch the catalog with the last query.
    ReloadCatalog,
    /// Fetch the logged-in user's order history.
    LoadOrders,
    /// Fetch the product list for the admin table.
    LoadAdminProducts,
}

/// A section name that does not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown section: {0}")]
pub struct UnknownSection(pub String);

impl Section {
    /// Every section in navigation order.
    pub const ALL: [Self; 5] = [
        Self::Home,
        Self::Catalog,
        Self::Account,
        Self::Orders,
        Self::Admin,
    ];

    /// URL slug.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Home => "home",
            Self::Catalog => "catalog",
            Self::Account => "account",
            Self::Orders => "orders",
            Self::Admin => "admin",
        }
    }

    /// Navigation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Home => "Inicio",
            Self::Catalog => "Catálogo",
            Self::Account => "Mi Cuenta",
            Self::Orders => "Mis Pedidos",
            Self::Admin => "Admin",
        }
    }

    /// Resolve a navigation request into the section actually shown and the
    /// load it triggers.
    ///
    /// Order history needs a session; without one the user lands on Account.
    #[must_use]
    pub const fn enter(self, authenticated: bool) -> (Self, SectionEffect) {
        match self {
            Self::Home => (Self::Home, SectionEffect::None),
            Self::Account => (Self::Account, SectionEffect::None),
            Self::Catalog => (Self::Catalog, SectionEffect::ReloadCatalog),
            Self::Orders if authenticated => (Self::Orders, SectionEffect::LoadOrders),
            Self::Orders => (Self::Account, SectionEffect::None),
            Self::Admin => (Self::Admin, SectionEffect::LoadAdminProducts),
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Section {
    type Err = UnknownSection;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|section| section.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSection(s.to_string()))
    }
}
