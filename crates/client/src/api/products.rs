//! Product API client methods

use super::{ensure_success, list_field, wrapped_or_bare};
use crate::catalog::SortOrder;
use crate::client::{RequestOptions, StorefrontClient};
use crate::error::Result;
use crate::types::{Product, ProductInput};
use url::form_urlencoded;

/// Server-side listing parameters
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ProductQuery {
    pub sort: SortOrder,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
}

impl ProductQuery {
    /// Listing path with its query string. The default order is not sent.
    pub fn to_path(&self) -> String {
        let mut query = form_urlencoded::Serializer::new(String::new());
        if self.sort != SortOrder::Featured {
            query.append_pair("sortBy", self.sort.as_str());
        }
        if let Some(min) = self.min_price {
            query.append_pair("minPrice", &min.to_string());
        }
        if let Some(max) = self.max_price {
            query.append_pair("maxPrice", &max.to_string());
        }

        let query = query.finish();
        if query.is_empty() {
            "/api/products".to_string()
        } else {
            format!("/api/products?{query}")
        }
    }
}

impl StorefrontClient {
    /// List products
    pub async fn list_products(&self, query: &ProductQuery) -> Result<Vec<Product>> {
        let mut body = ensure_success(self.send(&query.to_path(), RequestOptions::get()).await?)?;
        list_field(&mut body, "products")
    }

    /// Get one product
    pub async fn get_product(&self, id: &str) -> Result<Product> {
        let path = format!("/api/products/{id}");
        let body = ensure_success(self.send(&path, RequestOptions::get()).await?)?;
        wrapped_or_bare(body, "product")
    }

    /// Create a product (admin)
    pub async fn create_product(&self, input: &ProductInput) -> Result<Product> {
        let options = RequestOptions::post().with_json(serde_json::to_value(input)?);
        let body = ensure_success(self.send("/api/products", options).await?)?;
        wrapped_or_bare(body, "product")
    }

    /// Replace a product (admin)
    pub async fn update_product(&self, id: &str, input: &ProductInput) -> Result<Product> {
        let path = format!("/api/products/{id}");
        let options = RequestOptions::put().with_json(serde_json::to_value(input)?);
        let body = ensure_success(self.send(&path, options).await?)?;
        wrapped_or_bare(body, "product")
    }

    /// Delete a product (admin)
    pub async fn delete_product(&self, id: &str) -> Result<()> {
        let path = format!("/api/products/{id}");
        ensure_success(self.send(&path, RequestOptions::delete()).await?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn featured_without_bounds_has_no_query() {
        assert_eq!(ProductQuery::default().to_path(), "/api/products");
    }

    #[test]
    fn query_carries_sort_and_bounds() {
        let query = ProductQuery {
            sort: SortOrder::PriceAsc,
            min_price: Some(10.0),
            max_price: Some(99.5),
        };
        assert_eq!(
            query.to_path(),
            "/api/products?sortBy=price-asc&minPrice=10&maxPrice=99.5"
        );
    }
}
