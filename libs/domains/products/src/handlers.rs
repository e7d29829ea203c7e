//! HTTP handlers for the Products API

use axum::{
    extract::{FromRequest, Request, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use utoipa::OpenApi;

use crate::envelope::{Envelope, ResponseStatus};
use crate::error::ProductResult;
use crate::models::{CreateProductRequest, Product, ProductIdsRequest, ProductMeta};
use crate::repository::ProductRepository;
use crate::service::ProductService;

/// OpenAPI documentation for the Products API
#[derive(OpenApi)]
#[openapi(
    paths(
        list_products,
        create_product,
        get_by_ids,
        get_by_barcode,
        delete_product,
    ),
    components(
        schemas(
            Product, ProductMeta, CreateProductRequest, ProductIdsRequest,
            ResponseStatus, Envelope<Product>, Envelope<Vec<Product>>
        )
    ),
    tags(
        (name = "Products", description = "Product catalog endpoints")
    )
)]
pub struct ApiDoc;

/// Create the products router with all HTTP endpoints
pub fn router<R: ProductRepository + 'static>(service: ProductService<R>) -> Router {
    let shared_service = Arc::new(service);

    Router::new()
        .route("/", get(list_products).post(create_product))
        .route("/by-ids", post(get_by_ids))
        .route("/barcode/{barcode}", get(get_by_barcode))
        .route("/{id}", axum::routing::delete(delete_product))
        .with_state(shared_service)
}

/// JSON extractor that answers rejections with an envelope
///
/// A syntactically broken body must still produce the uniform response
/// shape, so the stock `Json` rejection is replaced with a 400 envelope and
/// the parser detail goes to the log only.
pub struct EnvelopeJson<T>(pub T);

impl<T, S> FromRequest<S> for EnvelopeJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(data) = Json::<T>::from_request(req, state).await.map_err(|e| {
            tracing::warn!("Request body rejected: {}", e.body_text());
            Envelope::<()>::error(StatusCode::BAD_REQUEST, "invalid request body").into_response()
        })?;

        Ok(EnvelopeJson(data))
    }
}

/// List all products
#[utoipa::path(
    get,
    path = "",
    tag = "Products",
    responses(
        (status = 200, description = "Product list retrieved", body = Envelope<Vec<Product>>),
        (status = 500, description = "List retrieval failed")
    )
)]
async fn list_products<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
) -> ProductResult<Envelope<Vec<Product>>> {
    let products = service.list_products().await?;
    Ok(Envelope::success(StatusCode::OK, "list retrieved", products))
}

/// Create a new product
#[utoipa::path(
    post,
    path = "",
    tag = "Products",
    request_body = CreateProductRequest,
    responses(
        (status = 201, description = "Product created", body = Envelope<Product>),
        (status = 400, description = "Missing or invalid fields"),
        (status = 500, description = "Creation failed")
    )
)]
async fn create_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    EnvelopeJson(input): EnvelopeJson<CreateProductRequest>,
) -> ProductResult<Envelope<Product>> {
    let product = service.create_product(input).await?;
    Ok(Envelope::success(StatusCode::CREATED, "created", product))
}

/// Get products by a list of identifiers
#[utoipa::path(
    post,
    path = "/by-ids",
    tag = "Products",
    request_body = ProductIdsRequest,
    responses(
        (status = 200, description = "Products retrieved", body = Envelope<Vec<Product>>),
        (status = 400, description = "Empty or entirely malformed identifier list"),
        (status = 500, description = "Retrieval failed")
    )
)]
async fn get_by_ids<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    EnvelopeJson(request): EnvelopeJson<ProductIdsRequest>,
) -> ProductResult<Envelope<Vec<Product>>> {
    let products = service.products_by_ids(&request.product_ids).await?;
    Ok(Envelope::success(StatusCode::OK, "retrieved", products))
}

/// Get a product by barcode
#[utoipa::path(
    get,
    path = "/barcode/{barcode}",
    tag = "Products",
    params(
        ("barcode" = String, Path, description = "Product barcode (UPC, EAN, etc.)")
    ),
    responses(
        (status = 200, description = "Product retrieved", body = Envelope<Product>),
        (status = 404, description = "No product carries this barcode"),
        (status = 500, description = "Retrieval failed")
    )
)]
async fn get_by_barcode<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    axum::extract::Path(barcode): axum::extract::Path<String>,
) -> ProductResult<Envelope<Product>> {
    let product = service.product_by_barcode(&barcode).await?;
    Ok(Envelope::success(StatusCode::OK, "retrieved", product))
}

/// Delete a product by identifier
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Products",
    params(
        ("id" = String, Path, description = "Product identifier")
    ),
    responses(
        (status = 200, description = "Product deleted, body carries the removed document", body = Envelope<Product>),
        (status = 400, description = "Malformed identifier"),
        (status = 404, description = "No product with this identifier"),
        (status = 500, description = "Deletion failed")
    )
)]
async fn delete_product<R: ProductRepository>(
    State(service): State<Arc<ProductService<R>>>,
    axum::extract::Path(id): axum::extract::Path<String>,
) -> ProductResult<Envelope<Product>> {
    let product = service.delete_by_id(&id).await?;
    Ok(Envelope::success(StatusCode::OK, "deleted", product))
}
