//! Seed the catalog from a YAML file.
//!
//! ```yaml
//! products:
//!   - name: ASUS Vivobook 14 A1404
//!     brand: ASUS
//!     category: laptop
//!     processor: Intel Core i3-1215U
//!     ram_gb: 8
//!     storage_gb: 512
//!     price: "6499000"
//!     stock: 4
//! ```
//!
//! Products are matched by slug (derived from the name when omitted), so
//! re-running the seed updates rows instead of duplicating them.

use std::path::Path;

use laptop_shop_admin::db::{self, ProductRepository};
use laptop_shop_core::product::ProductInput;
use serde::Deserialize;
use tracing::{error, info};

use super::database_url;

/// Catalog file layout.
#[derive(Debug, Deserialize)]
pub struct CatalogFile {
    pub products: Vec<ProductInput>,
}

impl CatalogFile {
    /// Validate every product and check for duplicate slugs.
    ///
    /// Returns one message per problem.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        let mut seen = std::collections::HashSet::new();
        for (index, product) in self.products.iter().enumerate() {
            if let Err(e) = product.validate() {
                errors.push(format!("product #{} ({}): {e}", index + 1, product.name));
            }
            let slug = product.effective_slug();
            if !seen.insert(slug.clone()) {
                errors.push(format!("product #{}: duplicate slug {slug}", index + 1));
            }
        }
        errors
    }
}

/// Upsert products from `file_path`.
///
/// With `replace`, active products that are not in the file are
/// deactivated (never deleted; orders reference them).
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, a product is
/// invalid, or a database operation fails.
pub async fn catalog(file_path: &str, replace: bool) -> Result<(), Box<dyn std::error::Error>> {
    let path = Path::new(file_path);
    if !path.exists() {
        return Err(format!("File not found: {file_path}").into());
    }

    info!(path = %file_path, "Loading catalog from file");

    // Read and validate YAML before connecting to database
    let content = tokio::fs::read_to_string(path).await?;
    let catalog: CatalogFile = serde_yaml::from_str(&content)?;
    info!(products = catalog.products.len(), "Parsed catalog");

    let errors = catalog.validate();
    if !errors.is_empty() {
        error!("Catalog validation failed:");
        for err in &errors {
            error!("  - {err}");
        }
        return Err(format!("{} validation errors found", errors.len()).into());
    }

    let database_url = database_url()?;
    let pool = db::create_pool(&database_url).await?;
    info!("Connected to database");

    let products = ProductRepository::new(&pool);
    let mut inserted = 0_usize;
    let mut updated = 0_usize;
    for input in &catalog.products {
        let (_, is_new) = products.upsert_by_slug(input).await?;
        if is_new {
            inserted += 1;
        } else {
            updated += 1;
        }
    }

    let deactivated = if replace {
        let keep: Vec<String> = catalog
            .products
            .iter()
            .map(ProductInput::effective_slug)
            .collect();
        products.deactivate_except(&keep).await?
    } else {
        0
    };

    info!("Seeding complete!");
    info!("  Inserted: {inserted}");
    info!("  Updated: {updated}");
    info!("  Deactivated: {deactivated}");
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
products:
  - name: Lenovo IdeaPad Slim 3
    brand: Lenovo
    category: laptop
    ram_gb: 8
    storage_gb: 512
    price: "7299000"
    stock: 3
  - slug: lenovo-ideapad-slim-3
    name: Lenovo IdeaPad Slim 3 (copy)
    brand: Lenovo
    category: laptop
    price: "-1"
"#;

    #[test]
    fn test_catalog_file_parses_and_reports_problems() {
        let catalog: CatalogFile = serde_yaml::from_str(SAMPLE).unwrap();
        assert_eq!(catalog.products.len(), 2);
        assert_eq!(
            catalog.products[0].effective_slug(),
            "lenovo-ideapad-slim-3"
        );

        let errors = catalog.validate();
        assert_eq!(errors.len(), 2, "{errors:?}");
        assert!(errors.iter().any(|e| e.contains("duplicate slug")));
        assert!(errors.iter().any(|e| e.contains("price")));
    }
}
