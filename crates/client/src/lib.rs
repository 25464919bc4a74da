//! Storefront client library
//!
//! Async access to the storefront REST API. Requests carry the session
//! cookies, expired sessions are renewed transparently, and the session
//! lifecycle is exposed through [`SessionController`]. The catalog and
//! validation modules hold the listing and form logic the storefront runs
//! before or after talking to the API.

pub mod api;
pub mod catalog;
pub mod client;
pub mod config;
pub mod error;
pub mod jwt;
pub mod session;
pub mod types;
pub mod validation;

pub use api::ProductQuery;
pub use catalog::{CatalogFilter, Facets, SortOrder};
pub use client::{
    FilePart, MultipartForm, RequestBody, RequestOptions, StorefrontClient,
    StorefrontClientBuilder,
};
pub use config::ClientConfig;
pub use error::{ApiFailure, ClientError, Result};
pub use session::{
    FileSessionStore, MemorySessionStore, PersistedSession, SessionController, SessionEvent,
    SessionState, SessionStore,
};
pub use types::{
    LoginRequest, Product, ProductAttributes, ProductInput, Role, SignupRequest, UserProfile,
    WishlistItem,
};
