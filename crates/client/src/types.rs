//! Wire types shared by the endpoint bindings

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Account role
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl From<String> for Role {
    fn from(role: String) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        role.to_string()
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => f.write_str("user"),
            Self::Admin => f.write_str("admin"),
        }
    }
}

/// Signed-in user as returned by login and `/api/users/me`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawUserProfile")]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

/// The backend spells the identifier `_id`, `id` or `userId` depending on the route
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawUserProfile {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    role: Option<Role>,
}

impl From<RawUserProfile> for UserProfile {
    fn from(raw: RawUserProfile) -> Self {
        Self {
            id: raw.user_id.or(raw.id).or(raw.mongo_id).unwrap_or_default(),
            name: raw.name.unwrap_or_default(),
            email: raw.email.unwrap_or_default(),
            role: raw.role.unwrap_or_default(),
        }
    }
}

/// Login form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Signup form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignupRequest {
    pub name: String,
    pub email: String,
    pub password: String,
}

/// Variant attributes of a product
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttributes {
    #[serde(default)]
    pub color: Vec<String>,
    #[serde(default)]
    pub size: Vec<String>,
}

/// Catalog product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawProduct")]
pub struct Product {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub category: Option<String>,
    pub brand: Option<String>,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub images: Vec<String>,
    pub attributes: ProductAttributes,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Product documents may carry `_id`, `id` or both
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawProduct {
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: String,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    brand: Option<String>,
    #[serde(default)]
    description: String,
    #[serde(default)]
    price: f64,
    #[serde(default)]
    stock: i64,
    #[serde(default)]
    images: Vec<String>,
    #[serde(default)]
    attributes: ProductAttributes,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

impl From<RawProduct> for Product {
    fn from(raw: RawProduct) -> Self {
        Self {
            id: raw.mongo_id.or(raw.id).unwrap_or_default(),
            name: raw.name,
            category: raw.category,
            brand: raw.brand,
            description: raw.description,
            price: raw.price,
            stock: raw.stock,
            images: raw.images,
            attributes: raw.attributes,
            created_at: raw.created_at,
        }
    }
}

impl Product {
    pub const fn in_stock(&self) -> bool {
        self.stock > 0
    }
}

/// Payload for creating or updating a product
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductInput {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub description: String,
    pub price: f64,
    pub stock: i64,
    pub images: Vec<String>,
    pub attributes: ProductAttributes,
}

/// Entry of the signed-in user's wishlist
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "RawWishlistItem")]
pub struct WishlistItem {
    #[serde(rename = "_id")]
    pub id: String,
    pub product: Product,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub added_at: Option<DateTime<Utc>>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawWishlistItem {
    #[serde(default, rename = "_id")]
    mongo_id: Option<String>,
    #[serde(default)]
    id: Option<String>,
    product: Product,
    #[serde(default)]
    added_at: Option<DateTime<Utc>>,
}

impl From<RawWishlistItem> for WishlistItem {
    fn from(raw: RawWishlistItem) -> Self {
        Self {
            id: raw.mongo_id.or(raw.id).unwrap_or_default(),
            product: raw.product,
            added_at: raw.added_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn user_profile_accepts_every_id_spelling() {
        let from_login: UserProfile = serde_json::from_value(json!({
            "userId": "u1", "name": "Ada", "email": "ada@example.com", "role": "admin"
        }))
        .unwrap();
        assert_eq!(from_login.id, "u1");
        assert!(from_login.is_admin());

        let from_me: UserProfile =
            serde_json::from_value(json!({"_id": "u2", "name": "Bo", "email": "bo@example.com"}))
                .unwrap();
        assert_eq!(from_me.id, "u2");
        assert_eq!(from_me.role, Role::User);
    }

    #[test]
    fn unknown_role_is_plain_user() {
        let user: UserProfile =
            serde_json::from_value(json!({"id": "u3", "role": "moderator"})).unwrap();
        assert_eq!(user.role, Role::User);
        assert_eq!(serde_json::to_value(Role::Admin).unwrap(), json!("admin"));
    }

    #[test]
    fn product_tolerates_sparse_documents() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1",
            "name": "Runner",
            "price": 89.5,
            "stock": 0,
            "attributes": {"size": ["M"]},
            "createdAt": "2024-05-01T10:00:00Z"
        }))
        .unwrap();
        assert_eq!(product.id, "p1");
        assert_eq!(product.brand, None);
        assert!(!product.in_stock());
        assert!(product.attributes.color.is_empty());
        assert!(product.created_at.is_some());
    }

    #[test]
    fn documents_with_both_id_keys_are_accepted() {
        let product: Product = serde_json::from_value(json!({
            "_id": "p1", "id": "p1", "name": "Runner", "price": 10.0
        }))
        .unwrap();
        assert_eq!(product.id, "p1");

        let item: WishlistItem = serde_json::from_value(json!({
            "_id": "w1", "id": "w1", "product": {"id": "p2", "name": "Trail"}
        }))
        .unwrap();
        assert_eq!(item.id, "w1");
        assert_eq!(item.product.id, "p2");

        // Serialized back with the backend's spelling
        assert_eq!(serde_json::to_value(&product).unwrap()["_id"], json!("p1"));
    }
}
