use async_trait::async_trait;

use crate::error::StoreResult;
use crate::models::{NewProduct, Product};

/// Storage interface for products
///
/// Implementations decide what a structurally valid identifier looks like;
/// callers route every identifier through [`is_valid_identifier`] before
/// using it in a lookup or deletion.
///
/// [`is_valid_identifier`]: ProductRepository::is_valid_identifier
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProductRepository: Send + Sync {
    /// Fetch every product in the store
    async fn find_all(&self) -> StoreResult<Vec<Product>>;

    /// Fetch at most one product by exact match on a document field path
    async fn find_one_by_field(&self, path: &str, value: &str) -> StoreResult<Option<Product>>;

    /// Fetch the products whose identifiers appear in `ids`
    ///
    /// Identifiers with no matching document are skipped; the result may be
    /// shorter than `ids`. Duplicate identifiers yield at most one result.
    async fn find_by_id_set(&self, ids: &[String]) -> StoreResult<Vec<Product>>;

    /// Persist a new product and return it with the assigned identifier
    async fn insert(&self, fields: NewProduct) -> StoreResult<Product>;

    /// Atomically find and remove a product, returning the removed document
    async fn remove_by_id(&self, id: &str) -> StoreResult<Option<Product>>;

    /// Whether `candidate` has the shape of a store identifier
    fn is_valid_identifier(&self, candidate: &str) -> bool;
}
