//! Catalog product model.
//!
//! Products are shared by the storefront (browsing), the admin console
//! (catalog management) and the CLI (seeding), so the model and its input
//! validation live here.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::checkout::ProductSnapshot;
use crate::types::ProductId;

/// Whether a unit is new or second-hand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProductCondition {
    #[default]
    New,
    Used,
}

impl ProductCondition {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Used => "used",
        }
    }
}

impl std::str::FromStr for ProductCondition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" | "baru" => Ok(Self::New),
            "used" | "second" | "bekas" => Ok(Self::Used),
            other => Err(format!("invalid product condition: {other}")),
        }
    }
}

/// A catalog product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub color: Option<String>,
    pub processor: Option<String>,
    pub ram_gb: Option<i32>,
    pub storage_gb: Option<i32>,
    pub condition: ProductCondition,
    pub price: Decimal,
    pub stock: i32,
    pub is_active: bool,
    pub description: String,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// The fields checkout needs.
    #[must_use]
    pub fn snapshot(&self) -> ProductSnapshot {
        ProductSnapshot {
            id: self.id,
            name: self.name.clone(),
            unit_price: self.price,
            stock: self.stock,
            is_active: self.is_active,
        }
    }

    #[must_use]
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Errors from [`ProductInput::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProductInputError {
    #[error("{0} is required")]
    Missing(&'static str),

    #[error("slug may only contain lowercase letters, digits and dashes")]
    InvalidSlug,

    #[error("price cannot be negative")]
    NegativePrice,

    #[error("stock cannot be negative")]
    NegativeStock,

    #[error("{0} must be positive")]
    NonPositive(&'static str),
}

/// Fields for creating or replacing a product.
///
/// Used for admin JSON bodies and catalog seed files alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInput {
    /// Derived from `name` when omitted.
    #[serde(default)]
    pub slug: Option<String>,
    pub name: String,
    pub brand: String,
    pub category: String,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub processor: Option<String>,
    #[serde(default)]
    pub ram_gb: Option<i32>,
    #[serde(default)]
    pub storage_gb: Option<i32>,
    #[serde(default)]
    pub condition: ProductCondition,
    pub price: Decimal,
    #[serde(default)]
    pub stock: i32,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image_url: Option<String>,
}

const fn default_true() -> bool {
    true
}

impl ProductInput {
    /// The slug to store: the given one, or one derived from the name.
    #[must_use]
    pub fn effective_slug(&self) -> String {
        self.slug
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map_or_else(|| slugify(&self.name), str::to_owned)
    }

    /// Check required fields and ranges.
    ///
    /// # Errors
    ///
    /// Returns the first invalid field.
    pub fn validate(&self) -> Result<(), ProductInputError> {
        for (field, value) in [
            ("name", &self.name),
            ("brand", &self.brand),
            ("category", &self.category),
        ] {
            if value.trim().is_empty() {
                return Err(ProductInputError::Missing(field));
            }
        }

        let slug = self.effective_slug();
        if slug.is_empty()
            || !slug
                .chars()
                .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            return Err(ProductInputError::InvalidSlug);
        }

        if self.price.is_sign_negative() {
            return Err(ProductInputError::NegativePrice);
        }
        if self.stock < 0 {
            return Err(ProductInputError::NegativeStock);
        }
        if self.ram_gb.is_some_and(|v| v <= 0) {
            return Err(ProductInputError::NonPositive("ram_gb"));
        }
        if self.storage_gb.is_some_and(|v| v <= 0) {
            return Err(ProductInputError::NonPositive("storage_gb"));
        }
        Ok(())
    }
}

/// Turn a product name into a URL slug: `"ASUS ROG Strix G16"` becomes
/// `"asus-rog-strix-g16"`.
#[must_use]
pub fn slugify(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.is_empty() && !slug.ends_with('-') {
            slug.push('-');
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}
