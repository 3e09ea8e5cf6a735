//! Custom Askama template filters.

use std::fmt::Display;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Local::now().year())
}

/// Formats an alcohol percentage with one decimal.
///
/// Usage in templates: `{{ product.alcohol|abv }}` renders `6.5%`.
#[allow(clippy::unnecessary_wraps)]
#[askama::filter_fn]
pub fn abv(value: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_abv(&value.to_string()))
}

fn format_abv(raw: &str) -> String {
    raw.trim().parse::<f64>().map_or_else(
        |_| format!("{}%", raw.trim()),
        |value| format!("{value:.1}%"),
    )
}
