//! Integration tests for the endpoint bindings

use serde_json::json;
use std::sync::Arc;
use storefront_client::validation::{MAX_UPLOAD_BYTES, UPLOAD_TOO_LARGE};
use storefront_client::{
    ClientError, MemorySessionStore, PersistedSession, ProductAttributes, ProductInput,
    ProductQuery, SortOrder, StorefrontClient,
};
use wiremock::matchers::{
    body_json, body_string_contains, header_regex, method, path, query_param,
    query_param_is_missing,
};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer) -> StorefrontClient {
    StorefrontClient::new(server.uri()).unwrap()
}

#[tokio::test]
async fn test_list_products_sends_query() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param("sortBy", "price-desc"))
        .and(query_param("minPrice", "20"))
        .and(query_param_is_missing("maxPrice"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "products": [
                {"_id": "p2", "name": "Boot", "price": 120, "stock": 2},
                {"_id": "p1", "name": "Runner", "price": 90, "stock": 0}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = ProductQuery {
        sort: SortOrder::PriceDesc,
        min_price: Some(20.0),
        max_price: None,
    };
    let products = client(&server).list_products(&query).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, "p2");
    assert!(!products[1].in_stock());
}

#[tokio::test]
async fn test_featured_listing_sends_no_sort() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .and(query_param_is_missing("sortBy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let products = client(&server)
        .list_products(&ProductQuery::default())
        .await
        .unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn test_get_product_accepts_wrapped_and_bare_bodies() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products/p1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "product": {"_id": "p1", "name": "Runner", "brand": "Swift"}
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products/p2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"_id": "p2", "name": "Boot"})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let wrapped = client.get_product("p1").await.unwrap();
    assert_eq!(wrapped.brand.as_deref(), Some("Swift"));
    let bare = client.get_product("p2").await.unwrap();
    assert_eq!(bare.name, "Boot");
}

#[tokio::test]
async fn test_create_product_posts_payload() {
    let server = MockServer::start().await;

    let input = ProductInput {
        name: "Runner".into(),
        category: "Shoes".into(),
        brand: "Swift".into(),
        description: "Light trainer".into(),
        price: 89.5,
        stock: 4,
        images: vec!["https://cdn.test/runner.png".into()],
        attributes: ProductAttributes {
            color: vec!["Red".into()],
            size: vec!["M".into()],
        },
    };

    Mock::given(method("POST"))
        .and(path("/api/products"))
        .and(body_json(json!({
            "name": "Runner",
            "category": "Shoes",
            "brand": "Swift",
            "description": "Light trainer",
            "price": 89.5,
            "stock": 4,
            "images": ["https://cdn.test/runner.png"],
            "attributes": {"color": ["Red"], "size": ["M"]}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "success": true,
            "product": {"_id": "p9", "name": "Runner", "price": 89.5, "stock": 4}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let product = client(&server).create_product(&input).await.unwrap();
    assert_eq!(product.id, "p9");
}

#[tokio::test]
async fn test_delete_product_reports_forbidden() {
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/api/products/p1"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"success": false, "message": "Admin only"})),
        )
        .mount(&server)
        .await;

    let err = client(&server).delete_product("p1").await.unwrap_err();
    assert!(matches!(err, ClientError::Forbidden(_)));
    assert_eq!(err.failure().unwrap().message, "Admin only");
}

#[tokio::test]
async fn test_wishlist_round() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/wishlist"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "data": [{"_id": "w1", "product": {"_id": "p1", "name": "Runner"}}]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/wishlist/check/p1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"success": true, "isInWishlist": true})),
        )
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/wishlist/p2"))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/wishlist/p1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Not in wishlist"})),
        )
        .mount(&server)
        .await;

    let client = client(&server);
    let items = client.wishlist().await.unwrap();
    assert_eq!(items[0].product.name, "Runner");
    assert!(client.is_in_wishlist("p1").await.unwrap());
    client.add_to_wishlist("p2").await.unwrap();

    let err = client.remove_from_wishlist("p1").await.unwrap_err();
    assert!(matches!(err, ClientError::Rejected(_)));
    assert_eq!(err.failure().unwrap().message, "Not in wishlist");
}

#[tokio::test]
async fn test_users_admin_endpoints() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users/all"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "users": [
                {"_id": "u1", "name": "Ada", "email": "ada@example.com", "role": "admin"},
                {"_id": "u2", "name": "Bo", "email": "bo@example.com"}
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("DELETE"))
        .and(path("/api/users/u2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    let users = client.list_users().await.unwrap();
    assert!(users[0].is_admin());
    assert_eq!(users[1].id, "u2");
    client.delete_user("u2").await.unwrap();
}

#[tokio::test]
async fn test_upload_sends_multipart_image() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(header_regex("content-type", "^multipart/form-data"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"shoe.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "imageUrl": "https://cdn.test/shoe.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let url = client(&server)
        .upload_image("shoe.png", b"png bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.test/shoe.png");
}

#[tokio::test]
async fn test_upload_failure_flag_becomes_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"success": false, "message": "Unsupported format"})),
        )
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_image("notes.txt", b"text".to_vec())
        .await
        .unwrap_err();
    assert_eq!(err.failure().unwrap().message, "Unsupported format");
}

#[tokio::test]
async fn test_oversized_upload_is_refused_locally() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = client(&server)
        .upload_image("huge.jpg", vec![0; MAX_UPLOAD_BYTES + 1])
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Validation(_)));
    assert_eq!(err.to_string(), UPLOAD_TOO_LARGE);
}

#[tokio::test]
async fn test_upload_is_replayed_after_refresh() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/upload"))
        .and(body_string_contains("filename=\"shoe.png\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "imageUrl": "https://cdn.test/shoe.png"
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/users/refresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = StorefrontClient::builder()
        .base_url(server.uri())
        .session_store(Arc::new(MemorySessionStore::with_session(PersistedSession {
            is_authenticated: true,
            cookies: None,
        })))
        .build()
        .unwrap();

    let url = client
        .upload_image("shoe.png", b"png bytes".to_vec())
        .await
        .unwrap();
    assert_eq!(url, "https://cdn.test/shoe.png");
}
