//! Catalog commands.
//!
//! # Seed file format
//!
//! ```yaml
//! products:
//!   - name: IPA Artesanal
//!     type: IPA
//!     price: 5500
//!     description: IPA con intenso aroma a lúpulo.
//!     image: https://...
//!     alcohol: 6.5
//! ```

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use tracing::{error, info, warn};

use taproom_core::{NewProduct, Price, ProductId};
use taproom_storefront::api::{ApiClient, ProductQuery};

use super::CommandError;

/// Contents of a seed file.
#[derive(Debug, Deserialize)]
pub struct SeedFile {
    pub products: Vec<NewProduct>,
}

/// Problems in a seed file, one line per offending product.
#[must_use]
pub fn validate_seed(seed: &SeedFile) -> Vec<String> {
    seed.products
        .iter()
        .enumerate()
        .filter_map(|(i, product)| {
            let problems = product.problems();
            (!problems.is_empty()).then(|| {
                format!("product #{} ({}): {}", i + 1, product.name, problems.join(", "))
            })
        })
        .collect()
}

/// List products matching the optional filters.
///
/// # Errors
///
/// Returns `CommandError::Api` if the backend is unreachable.
pub async fn list(
    api: &ApiClient,
    search: Option<String>,
    beer_type: Option<String>,
    max_price: Option<u32>,
) -> Result<(), CommandError> {
    let query = ProductQuery {
        search: search.filter(|s| !s.trim().is_empty()),
        beer_type: beer_type.filter(|t| !t.trim().is_empty()),
        max_price: max_price.map(Price::new),
    };

    let products = api.list_products(&query).await?;

    info!("{} product(s)", products.len());
    for product in &products {
        info!(
            "  {}  {:<24} {:<8} {:>5.1}%  {}",
            product.id, product.name, product.beer_type, product.alcohol, product.price
        );
    }
    Ok(())
}

/// Create every product of a seed file that the backend does not have yet.
///
/// The whole file is validated before anything is sent. Products are matched
/// by name, so re-running the seed is harmless.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, fails validation,
/// or the backend cannot be listed.
pub async fn seed(api: &ApiClient, file_path: &str) -> Result<(), CommandError> {
    let path = Path::new(file_path);
    info!(path = %file_path, "Loading seed file");

    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CommandError::Io {
            path: file_path.to_string(),
            source,
        })?;
    let seed: SeedFile = serde_yaml::from_str(&content)?;

    let errors = validate_seed(&seed);
    if !errors.is_empty() {
        error!("Seed validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(CommandError::Validation(errors.len()));
    }

    let existing: HashSet<String> = api
        .list_products(&ProductQuery::default())
        .await?
        .into_iter()
        .map(|p| p.name)
        .collect();

    let mut inserted = 0usize;
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for product in &seed.products {
        if existing.contains(&product.name) {
            skipped += 1;
            continue;
        }

        match api.create_product(product).await {
            Ok(created) => {
                inserted += 1;
                info!(id = %created.id, name = %product.name, "Created");
            }
            Err(failure) => {
                failed += 1;
                warn!(name = %product.name, "Create failed: {failure}");
            }
        }
    }

    info!("Seeding complete!");
    info!("  Products inserted: {inserted}");
    info!("  Products skipped (already exist): {skipped}");
    if failed > 0 {
        error!("  Failed: {failed}");
    }

    Ok(())
}

/// Delete a product.
///
/// # Errors
///
/// Returns `CommandError::Api` if the backend refuses.
pub async fn delete(api: &ApiClient, id: &str) -> Result<(), CommandError> {
    api.delete_product(&ProductId::new(id)).await?;
    info!(id, "Product deleted");
    Ok(())
}
