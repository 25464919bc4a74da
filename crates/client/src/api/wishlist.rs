//! Wishlist API client methods

use super::{ensure_success, list_field};
use crate::client::{RequestOptions, StorefrontClient};
use crate::error::Result;
use crate::types::WishlistItem;
use serde_json::Value;

impl StorefrontClient {
    /// Items on the signed-in user's wishlist
    pub async fn wishlist(&self) -> Result<Vec<WishlistItem>> {
        let mut body = ensure_success(self.send("/api/wishlist", RequestOptions::get()).await?)?;
        list_field(&mut body, "data")
    }

    pub async fn add_to_wishlist(&self, product_id: &str) -> Result<()> {
        let path = format!("/api/wishlist/{product_id}");
        ensure_success(self.send(&path, RequestOptions::post()).await?)?;
        Ok(())
    }

    pub async fn remove_from_wishlist(&self, product_id: &str) -> Result<()> {
        let path = format!("/api/wishlist/{product_id}");
        ensure_success(self.send(&path, RequestOptions::delete()).await?)?;
        Ok(())
    }

    pub async fn is_in_wishlist(&self, product_id: &str) -> Result<bool> {
        let path = format!("/api/wishlist/check/{product_id}");
        let body = self.send(&path, RequestOptions::get()).await?;
        Ok(body
            .get("isInWishlist")
            .and_then(Value::as_bool)
            .unwrap_or(false))
    }
}
