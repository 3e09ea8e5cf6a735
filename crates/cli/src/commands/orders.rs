//! Order history command.

use secrecy::{ExposeSecret, SecretString};
use tracing::info;

use taproom_storefront::api::{ApiClient, Credentials};

use super::CommandError;

/// Environment variable holding the customer password.
pub const PASSWORD_ENV: &str = "TAPROOM_PASSWORD";

/// Read the customer password from [`PASSWORD_ENV`].
///
/// # Errors
///
/// Returns `CommandError::MissingPassword` if the variable is unset or blank.
pub fn password_from_env() -> Result<SecretString, CommandError> {
    password_from(std::env::var(PASSWORD_ENV).ok())
}

fn password_from(value: Option<String>) -> Result<SecretString, CommandError> {
    value
        .filter(|v| !v.is_empty())
        .map(SecretString::from)
        .ok_or(CommandError::MissingPassword(PASSWORD_ENV))
}

/// Log in as a customer and list their orders.
///
/// The token is used for this one call and never stored.
///
/// # Errors
///
/// Returns `CommandError::Api` if the credentials are rejected or the
/// backend is unreachable.
pub async fn list(
    api: &ApiClient,
    email: &str,
    password: &SecretString,
) -> Result<(), CommandError> {
    let credentials = Credentials {
        email: email.trim().to_string(),
        password: password.expose_secret().to_string(),
    };
    let login = api.login(&credentials).await?;
    let token = SecretString::from(login.access_token);

    let orders = api.my_orders(Some(&token)).await?;

    info!("{} order(s) for {}", orders.len(), login.user.name);
    for order in &orders {
        let id = order
            .id
            .as_ref()
            .map_or_else(|| "-".to_string(), ToString::to_string);
        let created = order
            .created_at
            .map(|at| at.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default();

        info!(
            "  {id}  {created}  {:<10} {} unit(s)  {}",
            order.status.label(),
            order.unit_count(),
            order.total_amount
        );
        for item in &order.items {
            info!("      {} x{}  {}", item.name, item.quantity, item.line_total());
        }
    }
    Ok(())
}
