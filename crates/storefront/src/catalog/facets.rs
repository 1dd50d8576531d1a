//! Faceted filtering and counting.
//!
//! A [`FacetSelection`] holds the accepted values per facet, an optional
//! price range and an optional text query. [`evaluate`] returns the products
//! matching every constraint, plus per-facet counts where each facet is
//! counted with its own constraint removed. That is what lets a shopper who
//! picked `brand=asus` still see how many Lenovo laptops would match if they
//! added Lenovo too.
//!
//! The text query and the active flag always apply, including when counting.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

use laptop_shop_core::product::Product;
use rust_decimal::Decimal;
use serde::Serialize;

/// A filterable product attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Facet {
    Category,
    Brand,
    Color,
    Processor,
    Ram,
    Storage,
    Condition,
}

impl Facet {
    /// Every facet, in display order.
    pub const ALL: [Self; 7] = [
        Self::Category,
        Self::Brand,
        Self::Color,
        Self::Processor,
        Self::Ram,
        Self::Storage,
        Self::Condition,
    ];

    /// Query-string parameter name.
    #[must_use]
    pub const fn param(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Brand => "brand",
            Self::Color => "color",
            Self::Processor => "processor",
            Self::Ram => "ram",
            Self::Storage => "storage",
            Self::Condition => "condition",
        }
    }

    const fn is_numeric(self) -> bool {
        matches!(self, Self::Ram | Self::Storage)
    }

    /// The product's value for this facet, if it has one.
    #[must_use]
    pub fn value_of(self, product: &Product) -> Option<FacetValue> {
        match self {
            Self::Category => FacetValue::text(&product.category),
            Self::Brand => FacetValue::text(&product.brand),
            Self::Color => product.color.as_deref().and_then(FacetValue::text),
            Self::Processor => product.processor.as_deref().and_then(FacetValue::text),
            Self::Ram => product.ram_gb.and_then(FacetValue::gigabytes),
            Self::Storage => product.storage_gb.and_then(FacetValue::gigabytes),
            Self::Condition => Some(FacetValue {
                key: product.condition.as_str().to_owned(),
                label: match product.condition {
                    laptop_shop_core::product::ProductCondition::New => "New".to_owned(),
                    laptop_shop_core::product::ProductCondition::Used => "Used".to_owned(),
                },
            }),
        }
    }

    /// Normalize a value typed in a query string to a facet key.
    ///
    /// Text facets compare trimmed and lowercased. Numeric facets accept
    /// `16`, `16gb` or `16 GB`; storage also accepts `1tb` (1024 GB).
    #[must_use]
    pub fn normalize(self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        if !self.is_numeric() {
            return Some(trimmed.to_lowercase());
        }

        let lower = trimmed.to_ascii_lowercase();
        let digits: String = lower.chars().take_while(char::is_ascii_digit).collect();
        let amount: u32 = digits.parse().ok()?;
        let unit = lower.get(digits.len()..).unwrap_or_default().trim();
        let gigabytes = match unit {
            "" | "g" | "gb" => amount,
            "t" | "tb" => amount.checked_mul(1024)?,
            _ => return None,
        };
        Some(gigabytes.to_string())
    }
}

/// One facet value: a normalized key for matching and a label for display.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FacetValue {
    pub key: String,
    pub label: String,
}

impl FacetValue {
    fn text(raw: &str) -> Option<Self> {
        let label = raw.trim();
        (!label.is_empty()).then(|| Self {
            key: label.to_lowercase(),
            label: label.to_owned(),
        })
    }

    fn gigabytes(gb: i32) -> Option<Self> {
        (gb > 0).then(|| Self {
            key: gb.to_string(),
            label: gigabyte_label(gb),
        })
    }
}

fn gigabyte_label(gb: i32) -> String {
    if gb >= 1024 && gb % 1024 == 0 {
        format!("{} TB", gb / 1024)
    } else {
        format!("{gb} GB")
    }
}

/// Accepted values per facet plus price and text constraints.
///
/// An empty (or absent) value set leaves the facet unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FacetSelection {
    values: BTreeMap<Facet, BTreeSet<String>>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    query: Option<String>,
}

impl FacetSelection {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `raw` for `facet`. Values that do not normalize are ignored.
    pub fn select(&mut self, facet: Facet, raw: &str) -> &mut Self {
        if let Some(key) = facet.normalize(raw) {
            self.values.entry(facet).or_default().insert(key);
        }
        self
    }

    /// Set the inclusive price range. A reversed range is swapped.
    pub fn price_range(&mut self, min: Option<Decimal>, max: Option<Decimal>) -> &mut Self {
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => {
                self.min_price = Some(hi);
                self.max_price = Some(lo);
            }
            _ => {
                self.min_price = min;
                self.max_price = max;
            }
        }
        self
    }

    /// Set the free-text query matched against name, brand and processor.
    pub fn search(&mut self, query: &str) -> &mut Self {
        let q = query.trim().to_lowercase();
        self.query = (!q.is_empty()).then_some(q);
        self
    }

    /// Selected keys for `facet`.
    #[must_use]
    pub fn selected(&self, facet: Facet) -> Option<&BTreeSet<String>> {
        self.values.get(&facet).filter(|set| !set.is_empty())
    }

    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    fn matches_text(&self, product: &Product) -> bool {
        let Some(q) = self.query.as_deref() else {
            return true;
        };
        let haystack = [
            Some(product.name.as_str()),
            Some(product.brand.as_str()),
            product.processor.as_deref(),
        ];
        q.split_whitespace().all(|term| {
            haystack
                .iter()
                .flatten()
                .any(|field| field.to_lowercase().contains(term))
        })
    }

    fn matches_price(&self, product: &Product) -> bool {
        self.min_price.is_none_or(|min| product.price >= min)
            && self.max_price.is_none_or(|max| product.price <= max)
    }

    fn matches_facet(&self, facet: Facet, product: &Product) -> bool {
        let Some(accepted) = self.selected(facet) else {
            return true;
        };
        facet
            .value_of(product)
            .is_some_and(|value| accepted.contains(&value.key))
    }

    /// Whether `product` passes every facet except `skip`, and the price
    /// range unless `skip_price` is set. Text and the active flag are
    /// checked separately by [`evaluate`].
    fn matches(&self, product: &Product, skip: Option<Facet>, skip_price: bool) -> bool {
        (skip_price || self.matches_price(product))
            && Facet::ALL
                .iter()
                .filter(|&&f| Some(f) != skip)
                .all(|&f| self.matches_facet(f, product))
    }
}

/// One entry of a facet's value list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCount {
    pub value: String,
    pub label: String,
    pub count: usize,
    pub selected: bool,
}

/// Counts for one facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FacetCounts {
    pub facet: Facet,
    pub values: Vec<FacetCount>,
}

/// Lowest and highest price among the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PriceBounds {
    pub min: Decimal,
    pub max: Decimal,
}

/// Result of [`evaluate`].
#[derive(Debug, Clone)]
pub struct FacetResult<'a> {
    /// Products matching every constraint, in input order.
    pub products: Vec<&'a Product>,
    /// Per-facet counts, in [`Facet::ALL`] order.
    pub counts: Vec<FacetCounts>,
    /// Price range of products matching everything except the price range.
    pub price_bounds: Option<PriceBounds>,
}

/// Filter `products` by `selection` and compute facet counts.
#[must_use]
pub fn evaluate<'a>(products: &'a [Product], selection: &FacetSelection) -> FacetResult<'a> {
    let pool: Vec<&Product> = products
        .iter()
        .filter(|p| p.is_active && selection.matches_text(p))
        .collect();

    let matched = pool
        .iter()
        .copied()
        .filter(|p| selection.matches(p, None, false))
        .collect();

    let counts = Facet::ALL
        .iter()
        .map(|&facet| count_facet(&pool, selection, facet))
        .collect();

    let price_bounds = pool
        .iter()
        .filter(|p| selection.matches(p, None, true))
        .fold(None, |bounds: Option<PriceBounds>, p| {
            Some(bounds.map_or(
                PriceBounds {
                    min: p.price,
                    max: p.price,
                },
                |b| PriceBounds {
                    min: b.min.min(p.price),
                    max: b.max.max(p.price),
                },
            ))
        });

    FacetResult {
        products: matched,
        counts,
        price_bounds,
    }
}

fn count_facet(pool: &[&Product], selection: &FacetSelection, facet: Facet) -> FacetCounts {
    let mut tally: HashMap<String, (String, usize)> = HashMap::new();

    for product in pool.iter().filter(|p| selection.matches(p, Some(facet), false)) {
        if let Some(value) = facet.value_of(product) {
            tally.entry(value.key).or_insert((value.label, 0)).1 += 1;
        }
    }

    let selected = selection.selected(facet);
    if let Some(keys) = selected {
        for key in keys {
            tally
                .entry(key.clone())
                .or_insert_with(|| (fallback_label(facet, key), 0));
        }
    }

    let mut values: Vec<FacetCount> = tally
        .into_iter()
        .map(|(value, (label, count))| FacetCount {
            selected: selected.is_some_and(|keys| keys.contains(&value)),
            value,
            label,
            count,
        })
        .collect();
    values.sort_by(|a, b| compare_entries(facet, a, b));

    FacetCounts { facet, values }
}

/// Label for a selected value that no candidate carries.
fn fallback_label(facet: Facet, key: &str) -> String {
    if facet.is_numeric() {
        key.parse().map_or_else(|_| key.to_owned(), gigabyte_label)
    } else {
        key.to_owned()
    }
}

/// Text facets sort by label; RAM and storage sort by size.
fn compare_entries(facet: Facet, a: &FacetCount, b: &FacetCount) -> Ordering {
    if facet.is_numeric() {
        let size = |e: &FacetCount| e.value.parse::<u64>().unwrap_or(u64::MAX);
        size(a).cmp(&size(b))
    } else {
        a.label
            .to_lowercase()
            .cmp(&b.label.to_lowercase())
            .then_with(|| a.value.cmp(&b.value))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use chrono::Utc;
    use laptop_shop_core::ProductId;
    use laptop_shop_core::product::ProductCondition;

    use super::*;

    struct Fixture {
        brand: &'static str,
        category: &'static str,
        color: &'static str,
        ram: i32,
        storage: i32,
        price: i64,
    }

    fn product(id: i32, s: &Fixture) -> Product {
        Product {
            id: ProductId::new(id),
            slug: format!("p-{id}"),
            name: format!("{} Laptop {id}", s.brand),
            brand: s.brand.to_owned(),
            category: s.category.to_owned(),
            color: Some(s.color.to_owned()),
            processor: Some("Intel Core i5".to_owned()),
            ram_gb: Some(s.ram),
            storage_gb: Some(s.storage),
            condition: ProductCondition::New,
            price: Decimal::from(s.price),
            stock: 3,
            is_active: true,
            description: String::new(),
            image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn catalog() -> Vec<Product> {
        vec![
            product(
                1,
                &Fixture {
                    brand: "ASUS",
                    category: "Laptop",
                    color: "Black",
                    ram: 16,
                    storage: 512,
                    price: 12_000_000,
                },
            ),
            product(
                2,
                &Fixture {
                    brand: "ASUS",
                    category: "Laptop",
                    color: "Silver",
                    ram: 8,
                    storage: 512,
                    price: 7_000_000,
                },
            ),
            product(
                3,
                &Fixture {
                    brand: "Lenovo",
                    category: "Laptop",
                    color: "Black",
                    ram: 16,
                    storage: 1024,
                    price: 15_000_000,
                },
            ),
            product(
                4,
                &Fixture {
                    brand: "Lenovo",
                    category: "Tablet",
                    color: "Grey",
                    ram: 8,
                    storage: 256,
                    price: 5_000_000,
                },
            ),
            product(
                5,
                &Fixture {
                    brand: "HP",
                    category: "Laptop",
                    color: "Silver",
                    ram: 32,
                    storage: 1024,
                    price: 22_000_000,
                },
            ),
        ]
    }

    fn counts_for(result: &FacetResult<'_>, facet: Facet) -> Vec<(String, usize)> {
        result
            .counts
            .iter()
            .find(|c| c.facet == facet)
            .unwrap()
            .values
            .iter()
            .map(|v| (v.value.clone(), v.count))
            .collect()
    }

    fn ids(result: &FacetResult<'_>) -> Vec<i32> {
        result.products.iter().map(|p| p.id.as_i32()).collect()
    }

    #[test]
    fn test_empty_selection_matches_all_active() {
        let mut products = catalog();
        products[4].is_active = false;

        let result = evaluate(&products, &FacetSelection::new());
        assert_eq!(ids(&result), vec![1, 2, 3, 4]);
        assert_eq!(
            counts_for(&result, Facet::Brand),
            vec![("asus".to_owned(), 2), ("lenovo".to_owned(), 2)]
        );
    }

    #[test]
    fn test_facet_counts_drop_own_constraint() {
        let products = catalog();
        let mut selection = FacetSelection::new();
        selection.select(Facet::Brand, "asus").select(Facet::Color, "black");

        let result = evaluate(&products, &selection);
        assert_eq!(ids(&result), vec![1]);

        // Brand counts ignore the brand filter but keep color=black.
        assert_eq!(
            counts_for(&result, Facet::Brand),
            vec![("asus".to_owned(), 1), ("lenovo".to_owned(), 1)]
        );
        // Color counts ignore the color filter but keep brand=asus.
        assert_eq!(
            counts_for(&result, Facet::Color),
            vec![("black".to_owned(), 1), ("silver".to_owned(), 1)]
        );
        // Other facets are counted with both constraints.
        assert_eq!(counts_for(&result, Facet::Ram), vec![("16".to_owned(), 1)]);
    }

    #[test]
    fn test_values_within_facet_are_ored() {
        let products = catalog();
        let mut selection = FacetSelection::new();
        selection.select(Facet::Brand, "ASUS").select(Facet::Brand, " hp ");

        let result = evaluate(&products, &selection);
        assert_eq!(ids(&result), vec![1, 2, 5]);
    }

    #[test]
    fn test_selected_value_with_zero_count_is_kept() {
        let products = catalog();
        let mut selection = FacetSelection::new();
        selection
            .select(Facet::Category, "tablet")
            .select(Facet::Brand, "hp");

        let result = evaluate(&products, &selection);
        assert!(result.products.is_empty());

        let brand = result
            .counts
            .iter()
            .find(|c| c.facet == Facet::Brand)
            .unwrap();
        let hp = brand.values.iter().find(|v| v.value == "hp").unwrap();
        assert_eq!(hp.count, 0);
        assert!(hp.selected);
        assert_eq!(counts_for(&result, Facet::Brand), vec![
            ("hp".to_owned(), 0),
            ("lenovo".to_owned(), 1)
        ]);
    }

    #[test]
    fn test_price_range_inclusive_and_bounds_ignore_price() {
        let products = catalog();
        let mut selection = FacetSelection::new();
        selection
            .select(Facet::Category, "laptop")
            .price_range(Some(Decimal::from(7_000_000)), Some(Decimal::from(12_000_000)));

        let result = evaluate(&products, &selection);
        assert_eq!(ids(&result), vec![1, 2]);
        assert_eq!(
            result.price_bounds,
            Some(PriceBounds {
                min: Decimal::from(7_000_000),
                max: Decimal::from(22_000_000),
            })
        );
        // Facet counts still honour the price range.
        assert_eq!(counts_for(&result, Facet::Brand), vec![("asus".to_owned(), 2)]);
    }

    #[test]
    fn test_reversed_price_range_is_swapped() {
        let mut selection = FacetSelection::new();
        selection.price_range(Some(Decimal::from(10)), Some(Decimal::from(5)));
        assert_eq!(selection.min_price, Some(Decimal::from(5)));
        assert_eq!(selection.max_price, Some(Decimal::from(10)));
    }

    #[test]
    fn test_text_query_applies_to_counts() {
        let products = catalog();
        let mut selection = FacetSelection::new();
        selection.search("lenovo");

        let result = evaluate(&products, &selection);
        assert_eq!(ids(&result), vec![3, 4]);
        assert_eq!(counts_for(&result, Facet::Brand), vec![("lenovo".to_owned(), 2)]);
    }

    #[test]
    fn test_numeric_facets_normalize_and_sort_by_size() {
        assert_eq!(Facet::Ram.normalize("16GB"), Some("16".to_owned()));
        assert_eq!(Facet::Ram.normalize(" 8 gb"), Some("8".to_owned()));
        assert_eq!(Facet::Storage.normalize("1tb"), Some("1024".to_owned()));
        assert_eq!(Facet::Storage.normalize("lots"), None);

        let products = catalog();
        let mut selection = FacetSelection::new();
        selection.select(Facet::Storage, "1TB");
        let result = evaluate(&products, &selection);
        assert_eq!(ids(&result), vec![3, 5]);

        assert_eq!(
            counts_for(&result, Facet::Storage),
            vec![
                ("256".to_owned(), 1),
                ("512".to_owned(), 2),
                ("1024".to_owned(), 2)
            ]
        );
        let storage = result
            .counts
            .iter()
            .find(|c| c.facet == Facet::Storage)
            .unwrap();
        assert_eq!(storage.values[2].label, "1 TB");
    }

    #[test]
    fn test_products_without_value_fail_constrained_facet() {
        let mut products = catalog();
        products[0].color = None;
        let mut selection = FacetSelection::new();
        selection.select(Facet::Color, "black");

        let result = evaluate(&products, &selection);
        assert_eq!(ids(&result), vec![3]);
    }
}
