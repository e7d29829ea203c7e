//! MongoDB implementation of ProductRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mongodb::{
    bson::{doc, oid::ObjectId, Document},
    options::IndexOptions,
    Collection, Database, IndexModel,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::StoreResult;
use crate::models::{NewProduct, Product, ProductMeta};
use crate::repository::ProductRepository;

/// Persisted shape of a product
///
/// Kept separate from [`Product`] so the API serves hex identifiers while
/// the collection stores native ObjectIds. `id` is `None` only before the
/// store has assigned one.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ProductDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    id: Option<ObjectId>,
    title: String,
    expiry_date: DateTime<Utc>,
    images: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    meta: Option<ProductMeta>,
}

impl From<NewProduct> for ProductDocument {
    fn from(fields: NewProduct) -> Self {
        Self {
            id: None,
            title: fields.title,
            expiry_date: fields.expiry_date,
            images: fields.images,
            meta: fields.meta,
        }
    }
}

impl From<ProductDocument> for Product {
    fn from(document: ProductDocument) -> Self {
        Self {
            id: document
                .id
                .map(|oid| oid.to_hex())
                .unwrap_or_default(),
            title: document.title,
            expiry_date: document.expiry_date,
            images: document.images,
            meta: document.meta,
        }
    }
}

/// MongoDB implementation of the ProductRepository
pub struct MongoProductRepository {
    collection: Collection<ProductDocument>,
}

impl MongoProductRepository {
    /// Create a new MongoProductRepository
    pub fn new(db: &Database) -> Self {
        let collection = db.collection::<ProductDocument>("products");
        Self { collection }
    }

    /// Create a new MongoProductRepository with a custom collection name
    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        let collection = db.collection::<ProductDocument>(collection_name);
        Self { collection }
    }

    /// Initialize indexes for optimal query performance
    ///
    /// The barcode index is sparse and non-unique: products without a
    /// barcode skip it, and duplicate barcodes are not rejected at the
    /// storage level.
    pub async fn init_indexes(&self) -> StoreResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "meta.barcode": 1 })
                .options(
                    IndexOptions::builder()
                        .sparse(true)
                        .name("idx_meta_barcode".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!("Product indexes created successfully");
        Ok(())
    }

    fn parse_object_id(candidate: &str) -> Option<ObjectId> {
        ObjectId::parse_str(candidate).ok()
    }

    /// Build the `$in` filter for a batch of candidate identifiers
    ///
    /// Entries that do not parse as ObjectIds are dropped from the filter,
    /// and duplicates collapse to a single entry so a repeated identifier
    /// can never produce more than one result.
    fn id_set_filter(ids: &[String]) -> Document {
        let mut object_ids: Vec<ObjectId> = ids
            .iter()
            .filter_map(|id| Self::parse_object_id(id))
            .collect();
        object_ids.sort_unstable();
        object_ids.dedup();

        doc! { "_id": { "$in": object_ids } }
    }
}

#[async_trait]
impl ProductRepository for MongoProductRepository {
    #[instrument(skip(self))]
    async fn find_all(&self) -> StoreResult<Vec<Product>> {
        use futures_util::TryStreamExt;

        let cursor = self.collection.find(doc! {}).await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_one_by_field(&self, path: &str, value: &str) -> StoreResult<Option<Product>> {
        let mut filter = Document::new();
        filter.insert(path, value);

        let document = self.collection.find_one(filter).await?;
        Ok(document.map(Product::from))
    }

    #[instrument(skip(self, ids), fields(requested = ids.len()))]
    async fn find_by_id_set(&self, ids: &[String]) -> StoreResult<Vec<Product>> {
        use futures_util::TryStreamExt;

        let cursor = self.collection.find(Self::id_set_filter(ids)).await?;
        let documents: Vec<ProductDocument> = cursor.try_collect().await?;

        Ok(documents.into_iter().map(Product::from).collect())
    }

    #[instrument(skip(self, fields), fields(title = %fields.title))]
    async fn insert(&self, fields: NewProduct) -> StoreResult<Product> {
        let mut document = ProductDocument::from(fields);

        let result = self.collection.insert_one(&document).await?;
        document.id = result.inserted_id.as_object_id();

        Ok(document.into())
    }

    #[instrument(skip(self))]
    async fn remove_by_id(&self, id: &str) -> StoreResult<Option<Product>> {
        let Some(object_id) = Self::parse_object_id(id) else {
            return Ok(None);
        };

        let document = self
            .collection
            .find_one_and_delete(doc! { "_id": object_id })
            .await?;

        Ok(document.map(Product::from))
    }

    fn is_valid_identifier(&self, candidate: &str) -> bool {
        Self::parse_object_id(candidate).is_some()
    }
}
