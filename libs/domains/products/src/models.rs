use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// Product metadata holding the optional lookup keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ProductMeta {
    /// Barcode (UPC, EAN, etc.)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub barcode: Option<String>,
}

/// Product entity as served by the API
///
/// The identifier is the store-assigned hex form; it is opaque to clients
/// and immutable. Persisted products always carry a non-empty title, a valid
/// expiry date, and at least one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Store-assigned identifier
    pub id: String,
    /// Product title
    pub title: String,
    /// Expiry date (UTC)
    pub expiry_date: DateTime<Utc>,
    /// Image references, in display order
    pub images: Vec<String>,
    /// Optional metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<ProductMeta>,
}

/// Validated field set handed to the store for insertion
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub title: String,
    pub expiry_date: DateTime<Utc>,
    pub images: Vec<String>,
    pub meta: Option<ProductMeta>,
}

/// DTO for creating a product
///
/// Every field is lenient at the serde level so that missing values surface
/// as validation errors rather than body rejections.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    #[serde(default)]
    #[validate(length(min = 1))]
    pub title: String,
    #[serde(default)]
    #[validate(required)]
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    #[validate(length(min = 1))]
    pub images: Vec<String>,
    #[serde(default)]
    pub meta: Option<ProductMeta>,
}

/// DTO for the batch lookup endpoint
#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdsRequest {
    /// Candidate identifiers; malformed entries are filtered, not rejected
    #[serde(default)]
    pub product_ids: Vec<String>,
}
