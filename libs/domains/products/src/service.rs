//! Product Service - Business logic layer

use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::error::{ProductError, ProductResult, StoreAction};
use crate::models::{CreateProductRequest, NewProduct, Product};
use crate::repository::ProductRepository;

/// Business logic over a product store
///
/// The service owns validation and orchestration; every store failure is
/// tagged with the operation that triggered it so the transport layer can
/// produce the operation-specific error envelope.
pub struct ProductService<R: ProductRepository> {
    repository: Arc<R>,
}

impl<R: ProductRepository> ProductService<R> {
    /// Create a new ProductService with the given repository
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// List every product in the catalog
    #[instrument(skip(self))]
    pub async fn list_products(&self) -> ProductResult<Vec<Product>> {
        let products = self
            .repository
            .find_all()
            .await
            .map_err(|e| ProductError::store(StoreAction::List, e))?;

        info!(count = products.len(), "Product list retrieved");
        Ok(products)
    }

    /// Look up a single product by its barcode
    #[instrument(skip(self))]
    pub async fn product_by_barcode(&self, barcode: &str) -> ProductResult<Product> {
        let product = self
            .repository
            .find_one_by_field("meta.barcode", barcode)
            .await
            .map_err(|e| ProductError::store(StoreAction::Retrieve, e))?
            .ok_or(ProductError::NotFound)?;

        info!(product_id = %product.id, "Product retrieved by barcode");
        Ok(product)
    }

    /// Batch lookup by candidate identifier list
    ///
    /// Malformed candidates are silently dropped; the call only fails when
    /// the list is empty or nothing survives the format check. Identifiers
    /// that are well-formed but unknown simply do not contribute to the
    /// result.
    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    pub async fn products_by_ids(&self, ids: &[String]) -> ProductResult<Vec<Product>> {
        if ids.is_empty() {
            return Err(ProductError::EmptyIdentifierList);
        }

        let valid_ids: Vec<String> = ids
            .iter()
            .filter(|id| self.repository.is_valid_identifier(id))
            .cloned()
            .collect();

        if valid_ids.is_empty() {
            return Err(ProductError::NoValidIdentifiers);
        }

        let products = self
            .repository
            .find_by_id_set(&valid_ids)
            .await
            .map_err(|e| ProductError::store(StoreAction::Retrieve, e))?;

        info!(
            found = products.len(),
            requested = ids.len(),
            "Products retrieved by identifier set"
        );
        Ok(products)
    }

    /// Create a product after validating the required fields
    #[instrument(skip(self, input))]
    pub async fn create_product(&self, input: CreateProductRequest) -> ProductResult<Product> {
        input
            .validate()
            .map_err(|e| ProductError::InvalidFields(e.to_string()))?;

        let Some(expiry_date) = input.expiry_date else {
            return Err(ProductError::InvalidFields("expiryDate missing".to_string()));
        };

        let fields = NewProduct {
            title: input.title,
            expiry_date,
            images: input.images,
            meta: input.meta,
        };

        let product = self
            .repository
            .insert(fields)
            .await
            .map_err(|e| ProductError::store(StoreAction::Create, e))?;

        info!(product_id = %product.id, "Product created");
        Ok(product)
    }

    /// Delete a product by identifier, returning the removed document
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: &str) -> ProductResult<Product> {
        if !self.repository.is_valid_identifier(id) {
            return Err(ProductError::InvalidIdentifier(id.to_string()));
        }

        let product = self
            .repository
            .remove_by_id(id)
            .await
            .map_err(|e| ProductError::store(StoreAction::Delete, e))?
            .ok_or(ProductError::NotFound)?;

        info!(product_id = %product.id, "Product deleted");
        Ok(product)
    }
}

impl<R: ProductRepository> Clone for ProductService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::models::ProductMeta;
    use crate::repository::MockProductRepository;
    use chrono::Utc;
    use mockall::predicate;

    const VALID_ID: &str = "665f1f77bcf86cd799439011";
    const OTHER_ID: &str = "665f1f77bcf86cd799439012";

    fn sample_product(id: &str) -> Product {
        Product {
            id: id.to_string(),
            title: "Milk".to_string(),
            expiry_date: Utc::now(),
            images: vec!["milk.png".to_string()],
            meta: Some(ProductMeta {
                barcode: Some("5901234123457".to_string()),
            }),
        }
    }

    fn store_error() -> StoreError {
        StoreError::Mongo(mongodb::error::Error::custom("connection reset"))
    }

    fn valid_create_request() -> CreateProductRequest {
        CreateProductRequest {
            title: "Milk".to_string(),
            expiry_date: Some(Utc::now()),
            images: vec!["milk.png".to_string()],
            meta: None,
        }
    }

    #[tokio::test]
    async fn test_list_products_returns_all() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_find_all()
            .returning(|| Ok(vec![sample_product(VALID_ID), sample_product(OTHER_ID)]));

        let service = ProductService::new(repository);
        let products = service.list_products().await.unwrap();
        assert_eq!(products.len(), 2);
    }

    #[tokio::test]
    async fn test_list_products_maps_store_failure() {
        let mut repository = MockProductRepository::new();
        repository.expect_find_all().returning(|| Err(store_error()));

        let service = ProductService::new(repository);
        let err = service.list_products().await.unwrap_err();
        assert_eq!(err.to_string(), "list retrieval failed");
    }

    #[tokio::test]
    async fn test_product_by_barcode_queries_meta_path() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_find_one_by_field()
            .with(predicate::eq("meta.barcode"), predicate::eq("5901234123457"))
            .returning(|_, _| Ok(Some(sample_product(VALID_ID))));

        let service = ProductService::new(repository);
        let product = service.product_by_barcode("5901234123457").await.unwrap();
        assert_eq!(product.id, VALID_ID);
    }

    #[tokio::test]
    async fn test_product_by_barcode_unknown_is_not_found() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_find_one_by_field()
            .returning(|_, _| Ok(None));

        let service = ProductService::new(repository);
        let err = service.product_by_barcode("0000000000000").await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound));
    }

    #[tokio::test]
    async fn test_product_by_barcode_maps_store_failure() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_find_one_by_field()
            .returning(|_, _| Err(store_error()));

        let service = ProductService::new(repository);
        let err = service.product_by_barcode("5901234123457").await.unwrap_err();
        assert_eq!(err.to_string(), "retrieval failed");
    }

    #[tokio::test]
    async fn test_products_by_ids_rejects_empty_list() {
        // The store must never be touched for an empty request.
        let repository = MockProductRepository::new();

        let service = ProductService::new(repository);
        let err = service.products_by_ids(&[]).await.unwrap_err();
        assert!(matches!(err, ProductError::EmptyIdentifierList));
    }

    #[tokio::test]
    async fn test_products_by_ids_rejects_all_malformed() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_is_valid_identifier()
            .returning(|_| false);

        let service = ProductService::new(repository);
        let ids = vec!["junk".to_string(), "more junk".to_string()];
        let err = service.products_by_ids(&ids).await.unwrap_err();
        assert!(matches!(err, ProductError::NoValidIdentifiers));
    }

    #[tokio::test]
    async fn test_products_by_ids_filters_before_querying() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_is_valid_identifier()
            .returning(|candidate| candidate == VALID_ID || candidate == OTHER_ID);
        repository
            .expect_find_by_id_set()
            .withf(|ids: &[String]| ids == [VALID_ID.to_string(), OTHER_ID.to_string()])
            .returning(|_| Ok(vec![sample_product(VALID_ID)]));

        let service = ProductService::new(repository);
        let ids = vec![
            VALID_ID.to_string(),
            "junk".to_string(),
            OTHER_ID.to_string(),
        ];

        // One of the two surviving identifiers is unknown to the store; the
        // partial result comes back as a success.
        let products = service.products_by_ids(&ids).await.unwrap();
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].id, VALID_ID);
    }

    #[tokio::test]
    async fn test_products_by_ids_maps_store_failure() {
        let mut repository = MockProductRepository::new();
        repository.expect_is_valid_identifier().returning(|_| true);
        repository
            .expect_find_by_id_set()
            .returning(|_| Err(store_error()));

        let service = ProductService::new(repository);
        let ids = vec![VALID_ID.to_string()];
        let err = service.products_by_ids(&ids).await.unwrap_err();
        assert_eq!(err.to_string(), "retrieval failed");
    }

    #[tokio::test]
    async fn test_create_product_persists_valid_input() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_insert()
            .withf(|fields: &NewProduct| {
                fields.title == "Milk" && fields.images == ["milk.png"]
            })
            .returning(|fields| {
                Ok(Product {
                    id: VALID_ID.to_string(),
                    title: fields.title,
                    expiry_date: fields.expiry_date,
                    images: fields.images,
                    meta: fields.meta,
                })
            });

        let service = ProductService::new(repository);
        let product = service.create_product(valid_create_request()).await.unwrap();
        assert_eq!(product.id, VALID_ID);
        assert_eq!(product.title, "Milk");
    }

    #[tokio::test]
    async fn test_create_product_rejects_empty_title() {
        let repository = MockProductRepository::new();

        let service = ProductService::new(repository);
        let input = CreateProductRequest {
            title: String::new(),
            ..valid_create_request()
        };
        let err = service.create_product(input).await.unwrap_err();
        assert!(matches!(err, ProductError::InvalidFields(_)));
        assert_eq!(err.to_string(), "missing or invalid fields");
    }

    #[tokio::test]
    async fn test_create_product_rejects_missing_expiry() {
        let repository = MockProductRepository::new();

        let service = ProductService::new(repository);
        let input = CreateProductRequest {
            expiry_date: None,
            ..valid_create_request()
        };
        let err = service.create_product(input).await.unwrap_err();
        assert!(matches!(err, ProductError::InvalidFields(_)));
    }

    #[tokio::test]
    async fn test_create_product_rejects_empty_images() {
        let repository = MockProductRepository::new();

        let service = ProductService::new(repository);
        let input = CreateProductRequest {
            images: vec![],
            ..valid_create_request()
        };
        let err = service.create_product(input).await.unwrap_err();
        assert!(matches!(err, ProductError::InvalidFields(_)));
    }

    #[tokio::test]
    async fn test_create_product_keeps_supplied_barcode() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_insert()
            .withf(|fields: &NewProduct| {
                fields
                    .meta
                    .as_ref()
                    .and_then(|m| m.barcode.as_deref())
                    == Some("5901234123457")
            })
            .returning(|fields| {
                Ok(Product {
                    id: VALID_ID.to_string(),
                    title: fields.title,
                    expiry_date: fields.expiry_date,
                    images: fields.images,
                    meta: fields.meta,
                })
            });

        let service = ProductService::new(repository);
        let input = CreateProductRequest {
            meta: Some(ProductMeta {
                barcode: Some("5901234123457".to_string()),
            }),
            ..valid_create_request()
        };
        let product = service.create_product(input).await.unwrap();
        assert_eq!(
            product.meta.and_then(|m| m.barcode).as_deref(),
            Some("5901234123457")
        );
    }

    #[tokio::test]
    async fn test_create_product_maps_store_failure() {
        let mut repository = MockProductRepository::new();
        repository.expect_insert().returning(|_| Err(store_error()));

        let service = ProductService::new(repository);
        let err = service
            .create_product(valid_create_request())
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "creation failed");
    }

    #[tokio::test]
    async fn test_delete_by_id_rejects_malformed_identifier() {
        let mut repository = MockProductRepository::new();
        repository
            .expect_is_valid_identifier()
            .with(predicate::eq("junk"))
            .returning(|_| false);

        let service = ProductService::new(repository);
        let err = service.delete_by_id("junk").await.unwrap_err();
        assert!(matches!(err, ProductError::InvalidIdentifier(_)));
        assert_eq!(err.to_string(), "invalid identifier");
    }

    #[tokio::test]
    async fn test_delete_by_id_returns_removed_snapshot() {
        let mut repository = MockProductRepository::new();
        repository.expect_is_valid_identifier().returning(|_| true);
        repository
            .expect_remove_by_id()
            .with(predicate::eq(VALID_ID))
            .returning(|id| Ok(Some(sample_product(id))));

        let service = ProductService::new(repository);
        let removed = service.delete_by_id(VALID_ID).await.unwrap();
        assert_eq!(removed.id, VALID_ID);
    }

    #[tokio::test]
    async fn test_delete_by_id_missing_is_not_found() {
        let mut repository = MockProductRepository::new();
        repository.expect_is_valid_identifier().returning(|_| true);
        repository.expect_remove_by_id().returning(|_| Ok(None));

        let service = ProductService::new(repository);
        let err = service.delete_by_id(VALID_ID).await.unwrap_err();
        assert!(matches!(err, ProductError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_by_id_maps_store_failure() {
        let mut repository = MockProductRepository::new();
        repository.expect_is_valid_identifier().returning(|_| true);
        repository
            .expect_remove_by_id()
            .returning(|_| Err(store_error()));

        let service = ProductService::new(repository);
        let err = service.delete_by_id(VALID_ID).await.unwrap_err();
        assert_eq!(err.to_string(), "deletion failed");
    }
}
