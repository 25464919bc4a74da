//! Product listing logic: sort orders, client-side filters and facets

use crate::error::ClientError;
use crate::types::Product;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// Display order of clothing sizes; anything else sorts after these
const SIZE_ORDER: [&str; 8] = ["XS", "S", "M", "L", "XL", "XXL", "2XL", "3XL"];

/// Listing sort order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortOrder {
    /// Server order
    #[default]
    Featured,
    NameAsc,
    NameDesc,
    PriceAsc,
    PriceDesc,
    /// Most recently created first
    Newest,
}

impl SortOrder {
    pub const ALL: [Self; 6] = [
        Self::Featured,
        Self::NameAsc,
        Self::NameDesc,
        Self::PriceAsc,
        Self::PriceDesc,
        Self::Newest,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Featured => "featured",
            Self::NameAsc => "name-asc",
            Self::NameDesc => "name-desc",
            Self::PriceAsc => "price-asc",
            Self::PriceDesc => "price-desc",
            Self::Newest => "newest",
        }
    }

    fn compare(self, a: &Product, b: &Product) -> Ordering {
        match self {
            Self::Featured => Ordering::Equal,
            Self::NameAsc => compare_names(&a.name, &b.name),
            Self::NameDesc => compare_names(&b.name, &a.name),
            Self::PriceAsc => a.price.total_cmp(&b.price),
            Self::PriceDesc => b.price.total_cmp(&a.price),
            // Undated products go last
            Self::Newest => match (a.created_at, b.created_at) {
                (Some(a), Some(b)) => b.cmp(&a),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            },
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ClientError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|order| order.as_str() == s)
            .ok_or_else(|| ClientError::Validation(format!("Unknown sort order: {s}")))
    }
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

/// Stock filter
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Availability {
    pub in_stock: bool,
    pub out_of_stock: bool,
}

impl Availability {
    fn matches(self, product: &Product) -> bool {
        match (self.in_stock, self.out_of_stock) {
            (true, false) => product.stock > 0,
            (false, true) => product.stock == 0,
            _ => true,
        }
    }
}

/// Inclusive price bounds
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PriceRange {
    pub from: Option<f64>,
    pub to: Option<f64>,
}

impl PriceRange {
    fn contains(self, price: f64) -> bool {
        self.from.is_none_or(|from| price >= from) && self.to.is_none_or(|to| price <= to)
    }
}

/// Selections of the listing sidebar. Empty sets do not constrain.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogFilter {
    pub categories: BTreeSet<String>,
    pub brands: BTreeSet<String>,
    pub colors: BTreeSet<String>,
    pub sizes: BTreeSet<String>,
    pub availability: Availability,
    pub price: PriceRange,
}

fn toggle(set: &mut BTreeSet<String>, value: &str) {
    if !set.remove(value) {
        set.insert(value.to_string());
    }
}

fn any_selected(selected: &BTreeSet<String>, values: &[String]) -> bool {
    selected.is_empty() || values.iter().any(|value| selected.contains(value))
}

fn one_selected(selected: &BTreeSet<String>, value: Option<&String>) -> bool {
    selected.is_empty() || value.is_some_and(|value| selected.contains(value))
}

impl CatalogFilter {
    pub fn toggle_category(&mut self, category: &str) {
        toggle(&mut self.categories, category);
    }

    pub fn toggle_brand(&mut self, brand: &str) {
        toggle(&mut self.brands, brand);
    }

    pub fn toggle_color(&mut self, color: &str) {
        toggle(&mut self.colors, color);
    }

    pub fn toggle_size(&mut self, size: &str) {
        toggle(&mut self.sizes, size);
    }

    /// Drop every selection
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn matches(&self, product: &Product) -> bool {
        one_selected(&self.categories, product.category.as_ref())
            && one_selected(&self.brands, product.brand.as_ref())
            && any_selected(&self.colors, &product.attributes.color)
            && any_selected(&self.sizes, &product.attributes.size)
            && self.availability.matches(product)
            && self.price.contains(product.price)
    }

    /// Matching products in the requested order; ties keep server order
    pub fn apply(&self, products: &[Product], order: SortOrder) -> Vec<Product> {
        let mut result: Vec<Product> = products
            .iter()
            .filter(|product| self.matches(product))
            .cloned()
            .collect();
        result.sort_by(|a, b| order.compare(a, b));
        result
    }
}

/// Distinct values offered as filters for a product list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Facets {
    pub categories: Vec<String>,
    pub brands: Vec<String>,
    pub colors: Vec<String>,
    pub sizes: Vec<String>,
}

impl Facets {
    pub fn from_products(products: &[Product]) -> Self {
        let categories = distinct(products.iter().filter_map(|p| p.category.as_deref()));
        let brands = distinct(products.iter().filter_map(|p| p.brand.as_deref()));
        let colors = distinct(
            products
                .iter()
                .flat_map(|p| p.attributes.color.iter().map(String::as_str)),
        );
        let mut sizes = distinct(
            products
                .iter()
                .flat_map(|p| p.attributes.size.iter().map(String::as_str)),
        );
        sizes.sort_by(|a, b| compare_sizes(a, b));

        Self {
            categories,
            brands,
            colors,
            sizes,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    values
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_owned)
        .collect()
}

fn size_rank(size: &str) -> Option<usize> {
    let upper = size.to_uppercase();
    SIZE_ORDER.iter().position(|known| *known == upper)
}

fn compare_sizes(a: &str, b: &str) -> Ordering {
    match (size_rank(a), size_rank(b)) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.cmp(b),
    }
}
