//! Catalog browsing: query parsing, facet filtering, sorting and paging.
//!
//! The whole active catalog is small enough to filter in memory, so the
//! listing endpoint works on the cached snapshot from
//! [`AppState::catalog`](crate::state::AppState::catalog) rather than
//! building SQL per request.

pub mod facets;

use laptop_shop_core::product::Product;
use laptop_shop_core::{CurrencyCode, Price, ProductId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

pub use facets::{Facet, FacetCount, FacetCounts, FacetSelection, PriceBounds, evaluate};

/// Default page size.
pub const DEFAULT_PER_PAGE: u32 = 24;

/// Largest page size a client may request.
pub const MAX_PER_PAGE: u32 = 60;

/// Listing sort order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    #[default]
    Newest,
    PriceAsc,
    PriceDesc,
    Name,
}

impl SortOrder {
    fn sort(self, products: &mut [&Product]) {
        match self {
            Self::Newest => products.sort_by(|a, b| {
                b.created_at
                    .cmp(&a.created_at)
                    .then_with(|| b.id.cmp(&a.id))
            }),
            Self::PriceAsc => products.sort_by(|a, b| a.price.cmp(&b.price).then(a.id.cmp(&b.id))),
            Self::PriceDesc => {
                products.sort_by(|a, b| b.price.cmp(&a.price).then(a.id.cmp(&b.id)));
            }
            Self::Name => products.sort_by_cached_key(|p| (p.name.to_lowercase(), p.id)),
        }
    }
}

impl std::str::FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "newest" => Ok(Self::Newest),
            "price_asc" => Ok(Self::PriceAsc),
            "price_desc" => Ok(Self::PriceDesc),
            "name" => Ok(Self::Name),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

/// Raw `GET /api/products` query string.
///
/// Facet parameters take comma-separated values (`brand=asus,lenovo`).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogQuery {
    pub category: Option<String>,
    pub brand: Option<String>,
    pub color: Option<String>,
    pub processor: Option<String>,
    pub ram: Option<String>,
    pub storage: Option<String>,
    pub condition: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub q: Option<String>,
    pub sort: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CatalogQuery {
    fn raw(&self, facet: Facet) -> Option<&str> {
        match facet {
            Facet::Category => self.category.as_deref(),
            Facet::Brand => self.brand.as_deref(),
            Facet::Color => self.color.as_deref(),
            Facet::Processor => self.processor.as_deref(),
            Facet::Ram => self.ram.as_deref(),
            Facet::Storage => self.storage.as_deref(),
            Facet::Condition => self.condition.as_deref(),
        }
    }

    /// Build the facet selection described by this query.
    #[must_use]
    pub fn selection(&self) -> FacetSelection {
        let mut selection = FacetSelection::new();
        for facet in Facet::ALL {
            if let Some(raw) = self.raw(facet) {
                for value in raw.split(',') {
                    selection.select(facet, value);
                }
            }
        }
        selection.price_range(self.min_price, self.max_price);
        if let Some(q) = &self.q {
            selection.search(q);
        }
        selection
    }

    /// Sort order; an unrecognized value falls back to newest.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or_default()
    }

    /// Clamp to a valid 1-indexed page and page size.
    #[must_use]
    pub fn pagination(&self) -> (u32, u32) {
        let page = self.page.unwrap_or(1).max(1);
        let per_page = self.per_page.unwrap_or(DEFAULT_PER_PAGE).clamp(1, MAX_PER_PAGE);
        (page, per_page)
    }
}

/// A product as listed in the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCard {
    pub id: ProductId,
    pub slug: String,
    pub name: String,
    pub brand: String,
    pub category: String,
    pub color: Option<String>,
    pub processor: Option<String>,
    pub ram_gb: Option<i32>,
    pub storage_gb: Option<i32>,
    pub condition: &'static str,
    pub price: Price,
    pub price_display: String,
    pub in_stock: bool,
    pub stock: i32,
    pub image_url: Option<String>,
}

impl ProductCard {
    #[must_use]
    pub fn new(product: &Product, currency: CurrencyCode) -> Self {
        let price = Price::new(product.price, currency);
        Self {
            id: product.id,
            slug: product.slug.clone(),
            name: product.name.clone(),
            brand: product.brand.clone(),
            category: product.category.clone(),
            color: product.color.clone(),
            processor: product.processor.clone(),
            ram_gb: product.ram_gb,
            storage_gb: product.storage_gb,
            condition: product.condition.as_str(),
            price_display: price.display(),
            price,
            in_stock: product.in_stock(),
            stock: product.stock,
            image_url: product.image_url.clone(),
        }
    }
}

/// One page of the listing with facet counts.
#[derive(Debug, Clone, Serialize)]
pub struct CatalogPage {
    pub products: Vec<ProductCard>,
    pub total: usize,
    pub page: u32,
    pub per_page: u32,
    pub total_pages: u32,
    pub sort: SortOrder,
    pub facets: Vec<FacetCounts>,
    pub price_bounds: Option<PriceBounds>,
}

/// Filter, sort and page `products` according to `query`.
#[must_use]
pub fn browse(products: &[Product], query: &CatalogQuery, currency: CurrencyCode) -> CatalogPage {
    let selection = query.selection();
    let sort = query.sort_order();
    let (page, per_page) = query.pagination();

    let mut result = evaluate(products, &selection);
    sort.sort(&mut result.products);

    let total = result.products.len();
    let total_pages = u32::try_from(total.div_ceil(per_page as usize)).unwrap_or(u32::MAX);
    let offset = (page as usize - 1).saturating_mul(per_page as usize);

    let cards = result
        .products
        .iter()
        .skip(offset)
        .take(per_page as usize)
        .map(|p| ProductCard::new(p, currency))
        .collect();

    CatalogPage {
        products: cards,
        total,
        page,
        per_page,
        total_pages,
        sort,
        facets: result.counts,
        price_bounds: result.price_bounds,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::{Duration, Utc};
    use laptop_shop_core::product::ProductCondition;

    use super::*;

    fn product(id: i32, brand: &str, price: i64, age_days: i64) -> Product {
        let created = Utc::now() - Duration::days(age_days);
        Product {
            id: ProductId::new(id),
            slug: format!("item-{id}"),
            name: format!("{brand} {id}"),
            brand: brand.to_owned(),
            category: "Laptop".to_owned(),
            color: None,
            processor: None,
            ram_gb: Some(8),
            storage_gb: Some(256),
            condition: ProductCondition::New,
            price: Decimal::from(price),
            stock: 1,
            is_active: true,
            description: String::new(),
            image_url: None,
            created_at: created,
            updated_at: created,
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(1, "Acer", 9_000_000, 3),
            product(2, "Dell", 4_000_000, 1),
            product(3, "Asus", 6_500_000, 2),
        ]
    }

    fn ids(page: &CatalogPage) -> Vec<i32> {
        page.products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_comma_separated_values() {
        let query = CatalogQuery {
            brand: Some("asus, Dell,,".to_owned()),
            ram: Some("8GB".to_owned()),
            ..CatalogQuery::default()
        };
        let selection = query.selection();
        let brands: Vec<_> = selection
            .selected(Facet::Brand)
            .unwrap()
            .iter()
            .cloned()
            .collect();
        assert_eq!(brands, vec!["asus", "dell"]);
        assert!(selection.selected(Facet::Ram).unwrap().contains("8"));
        assert!(selection.selected(Facet::Color).is_none());
    }

    #[test]
    fn test_sort_orders() {
        let products = catalog();
        let mut query = CatalogQuery::default();
        assert_eq!(ids(&browse(&products, &query, CurrencyCode::IDR)), vec![2, 3, 1]);

        query.sort = Some("price_asc".to_owned());
        assert_eq!(ids(&browse(&products, &query, CurrencyCode::IDR)), vec![2, 3, 1]);

        query.sort = Some("price_desc".to_owned());
        assert_eq!(ids(&browse(&products, &query, CurrencyCode::IDR)), vec![1, 3, 2]);

        query.sort = Some("name".to_owned());
        assert_eq!(ids(&browse(&products, &query, CurrencyCode::IDR)), vec![1, 3, 2]);

        query.sort = Some("bogus".to_owned());
        assert_eq!(query.sort_order(), SortOrder::Newest);
    }

    #[test]
    fn test_pagination_clamps() {
        let query = CatalogQuery {
            page: Some(0),
            per_page: Some(500),
            ..CatalogQuery::default()
        };
        assert_eq!(query.pagination(), (1, MAX_PER_PAGE));

        let query = CatalogQuery {
            page: Some(2),
            per_page: Some(2),
            ..CatalogQuery::default()
        };
        let page = browse(&catalog(), &query, CurrencyCode::IDR);
        assert_eq!(page.total, 3);
        assert_eq!(page.total_pages, 2);
        assert_eq!(ids(&page), vec![1]);
    }

    #[test]
    fn test_page_past_end_is_empty() {
        let query = CatalogQuery {
            page: Some(9),
            ..CatalogQuery::default()
        };
        let page = browse(&catalog(), &query, CurrencyCode::IDR);
        assert!(page.products.is_empty());
        assert_eq!(page.total, 3);
    }

    #[test]
    fn test_card_carries_display_price() {
        let page = browse(&catalog(), &CatalogQuery::default(), CurrencyCode::IDR);
        let card = &page.products[0];
        assert_eq!(card.price.amount, Decimal::from(4_000_000));
        assert_eq!(card.price_display, card.price.display());
        assert!(card.in_stock);
    }
}
