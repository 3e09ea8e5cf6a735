//! Page shell and section navigation.
//!
//! The whole storefront is one page. `GET /` renders the shell; every other
//! route returns an [`UpdateTemplate`]: the main section plus out-of-band
//! swaps for the nav bar, the cart sidebar and an optional toast.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    http::HeaderMap,
    response::{Html, IntoResponse, Response},
};
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::filters;
use crate::routes::admin::AdminView;
use crate::routes::auth::AccountView;
use crate::routes::cart::CartView;
use crate::routes::catalog::{CatalogView, ProductView};
use crate::routes::orders::OrdersView;
use crate::state::AppState;
use crate::view::{Notice, Section, ViewController};

/// Products shown in the Home section.
const FEATURED_COUNT: usize = 3;

/// Navigation link display data.
#[derive(Clone)]
pub struct NavLinkView {
    pub slug: &'static str,
    pub label: String,
    pub active: bool,
}

/// Toast display data.
#[derive(Clone)]
pub struct NoticeView {
    pub kind: &'static str,
    pub text: String,
}

impl From<Notice> for NoticeView {
    fn from(notice: Notice) -> Self {
        Self {
            kind: notice.kind.as_str(),
            text: notice.text,
        }
    }
}

/// Everything the page templates need, snapshotted from the controller.
#[derive(Clone)]
pub struct PageView {
    pub section: &'static str,
    pub nav: Vec<NavLinkView>,
    pub authenticated: bool,
    pub featured: Vec<ProductView>,
    pub catalog: CatalogView,
    pub cart: CartView,
    pub account: AccountView,
    pub orders: OrdersView,
    pub admin: AdminView,
}

impl PageView {
    #[must_use]
    pub fn from_view(view: &ViewController) -> Self {
        let session = view.session();
        let current = view.section();

        let nav = Section::ALL
            .into_iter()
            .map(|section| NavLinkView {
                slug: section.as_str(),
                label: if section == Section::Account && session.is_authenticated() {
                    format!("Hola, {}", session.greeting_name())
                } else {
                    section.label().to_string()
                },
                active: section == current,
            })
            .collect();

        Self {
            section: current.as_str(),
            nav,
            authenticated: session.is_authenticated(),
            featured: view
                .catalog()
                .products()
                .iter()
                .take(FEATURED_COUNT)
                .map(ProductView::from)
                .collect(),
            catalog: CatalogView::from(view.catalog()),
            cart: CartView::from_view(view),
            account: AccountView::from_view(view),
            orders: OrdersView::from_view(view),
            admin: AdminView::from_view(view),
        }
    }
}

/// Full page template.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct IndexTemplate {
    pub page: PageView,
    pub notice: Option<NoticeView>,
    pub oob: bool,
}

/// HTMX update: main section plus out-of-band nav, cart and toast.
#[derive(Template, WebTemplate)]
#[template(path = "partials/update.html")]
pub struct UpdateTemplate {
    pub page: PageView,
    pub notice: Option<NoticeView>,
    pub oob: bool,
}

/// Render the HTMX update for the controller's current state.
///
/// # Errors
///
/// Returns `AppError::Render` if a template fails.
pub fn render_update(view: &ViewController, notice: Option<Notice>) -> Result<Html<String>> {
    let template = UpdateTemplate {
        page: PageView::from_view(view),
        notice: notice.map(NoticeView::from),
        oob: true,
    };
    Ok(Html(template.render()?))
}

fn render_page(view: &ViewController, notice: Option<Notice>) -> Result<Html<String>> {
    let template = IndexTemplate {
        page: PageView::from_view(view),
        notice: notice.map(NoticeView::from),
        oob: false,
    };
    Ok(Html(template.render()?))
}

fn is_htmx(headers: &HeaderMap) -> bool {
    headers.get("HX-Request").is_some_and(|v| v == "true")
}

/// Display the page shell on the current section.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let view = state.view().await;
    render_page(&view, None)
}

/// Switch section.
///
/// HTMX navigation gets the update fragment; a plain request (bookmark,
/// reload) gets the full page.
#[instrument(skip(state, headers))]
pub async fn show_section(
    State(state): State<AppState>,
    Path(section): Path<String>,
    headers: HeaderMap,
) -> Result<Response> {
    let section: Section = section
        .parse()
        .map_err(|e: crate::view::UnknownSection| AppError::NotFound(e.to_string()))?;

    let mut view = state.view().await;
    let notice = view.show(section).await;

    if is_htmx(&headers) {
        Ok(render_update(&view, notice)?.into_response())
    } else {
        Ok(render_page(&view, notice)?.into_response())
    }
}
