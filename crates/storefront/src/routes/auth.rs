//! Account route handlers: login, registration and logout.

use axum::{
    Form,
    extract::State,
    response::{AppendHeaders, Html, IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::routes::home::render_update;
use crate::state::AppState;
use crate::view::{AuthTab, ViewController};

/// Account section display data.
#[derive(Clone)]
pub struct AccountView {
    pub tab: &'static str,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl AccountView {
    #[must_use]
    pub fn from_view(view: &ViewController) -> Self {
        let user = view
            .session()
            .is_authenticated()
            .then(|| view.session().user())
            .flatten();

        Self {
            tab: view.auth_tab_selected().as_str(),
            user_name: user.map(|u| u.name.clone()),
            user_email: user.map(|u| u.email.to_string()),
        }
    }
}

/// Tab switch form data.
#[derive(Debug, Deserialize)]
pub struct TabForm {
    pub tab: String,
}

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Registration form data.
#[derive(Deserialize)]
pub struct RegisterForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// Switch between the login and register forms.
#[instrument(skip(state))]
pub async fn tab(State(state): State<AppState>, Form(form): Form<TabForm>) -> Result<Html<String>> {
    let tab: AuthTab = form
        .tab
        .parse()
        .map_err(|_| AppError::BadRequest(format!("unknown tab: {}", form.tab)))?;

    let mut view = state.view().await;
    let notice = view.auth_tab(tab);
    render_update(&view, notice)
}

/// Handle login form submission.
#[instrument(skip(state, form))]
pub async fn login(State(state): State<AppState>, Form(form): Form<LoginForm>) -> Result<Html<String>> {
    let mut view = state.view().await;
    let notice = view.login(&form.email, &form.password).await;
    render_update(&view, notice)
}

/// Handle registration form submission.
#[instrument(skip(state, form))]
pub async fn register(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Result<Html<String>> {
    let mut view = state.view().await;
    let notice = view.register(&form.name, &form.email, &form.password).await;
    render_update(&view, notice)
}

/// Handle logout.
///
/// Everything tied to the session is dropped, so the browser is told to
/// reload the page from scratch.
#[instrument(skip(state))]
pub async fn logout(State(state): State<AppState>) -> Response {
    let mut view = state.view().await;
    view.logout();
    (AppendHeaders([("HX-Refresh", "true")]), "").into_response()
}
