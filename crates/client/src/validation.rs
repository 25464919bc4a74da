//! Form checks run before anything is sent

use crate::error::{ClientError, Result};
use crate::types::{LoginRequest, ProductAttributes, ProductInput, SignupRequest};
use regex::Regex;
use std::sync::LazyLock;

/// Largest accepted image upload
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

pub const MISSING_CREDENTIALS: &str = "Please enter email and password.";
pub const INVALID_EMAIL: &str = "Please enter a valid email address.";
pub const MISSING_SIGNUP_FIELDS: &str = "Please fill all fields.";
pub const PASSWORD_TOO_SHORT: &str = "Password should be at least 6 characters.";
pub const MISSING_PRODUCT_FIELDS: &str =
    "Please fill in all required fields (Name, Category, Brand, Price, Description)";
pub const INVALID_PRICE: &str = "Please enter a valid price.";
pub const INVALID_STOCK: &str = "Stock must be a whole number.";
pub const MISSING_IMAGES: &str = "Please upload at least one image";
pub const UPLOAD_TOO_LARGE: &str = "Some files are too large. Maximum size is 10MB per file.";

const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Option<Regex>> = LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").ok());

fn invalid(message: &str) -> ClientError {
    ClientError::Validation(message.to_string())
}

pub fn is_valid_email(email: &str) -> bool {
    EMAIL.as_ref().is_some_and(|re| re.is_match(email))
}

pub fn validate_login(credentials: &LoginRequest) -> Result<()> {
    if credentials.email.trim().is_empty() || credentials.password.is_empty() {
        return Err(invalid(MISSING_CREDENTIALS));
    }
    if !is_valid_email(&credentials.email) {
        return Err(invalid(INVALID_EMAIL));
    }
    Ok(())
}

pub fn validate_signup(form: &SignupRequest) -> Result<()> {
    if form.name.trim().is_empty() || form.email.trim().is_empty() || form.password.is_empty() {
        return Err(invalid(MISSING_SIGNUP_FIELDS));
    }
    if !is_valid_email(&form.email) {
        return Err(invalid(INVALID_EMAIL));
    }
    if form.password.chars().count() < MIN_PASSWORD_LEN {
        return Err(invalid(PASSWORD_TOO_SHORT));
    }
    Ok(())
}

pub fn check_upload_size(len: usize) -> Result<()> {
    if len > MAX_UPLOAD_BYTES {
        return Err(invalid(UPLOAD_TOO_LARGE));
    }
    Ok(())
}

/// Comma-separated list, entries trimmed, blanks dropped
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(str::to_owned)
        .collect()
}

/// Admin product form as typed by the user
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductForm {
    pub name: String,
    pub category: String,
    pub brand: String,
    pub price: String,
    pub description: String,
    pub stock: String,
    pub colors: String,
    pub sizes: String,
    pub images: Vec<String>,
}

impl ProductForm {
    /// Check the form and build the request payload
    pub fn into_input(self) -> Result<ProductInput> {
        let required = [
            &self.name,
            &self.category,
            &self.brand,
            &self.price,
            &self.description,
        ];
        if required.iter().any(|value| value.trim().is_empty()) {
            return Err(invalid(MISSING_PRODUCT_FIELDS));
        }

        let price: f64 = self
            .price
            .trim()
            .parse()
            .ok()
            .filter(|price: &f64| price.is_finite())
            .ok_or_else(|| invalid(INVALID_PRICE))?;

        let stock = match self.stock.trim() {
            "" => 0,
            raw => raw.parse().map_err(|_| invalid(INVALID_STOCK))?,
        };

        if self.images.is_empty() {
            return Err(invalid(MISSING_IMAGES));
        }

        Ok(ProductInput {
            name: self.name,
            category: self.category,
            brand: self.brand,
            description: self.description,
            price,
            stock,
            images: self.images,
            attributes: ProductAttributes {
                color: split_list(&self.colors),
                size: split_list(&self.sizes),
            },
        })
    }
}
