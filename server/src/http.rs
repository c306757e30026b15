//! REST routes.
//!
//! Handlers are thin: decode (and validate) the request, make one store call,
//! and, for order writes, hand a message to the notifier once the write has
//! committed.

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};

use ruralcart_common::category::Category;
use ruralcart_common::identity::{CategoryId, OrderId, ProductId, UserId};
use ruralcart_common::order::{NewOrder, Order, OrderPatch};
use ruralcart_common::product::{Product, ProductPatch};
use ruralcart_common::user::{NewUser, User, UserPatch};
use ruralcart_common::validation::FieldError;

use crate::error::ApiError;
use crate::extract::ValidJson;
use crate::{AppState, Storage};

type ApiResult<T> = Result<T, ApiError>;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health_handler))
        .route("/api/categories", get(categories_handler))
        .route(
            "/api/categories/{category_id}/products",
            get(category_products_handler),
        )
        .route("/api/products", get(products_handler))
        .route(
            "/api/products/{product_id}",
            get(product_handler).patch(update_product_handler),
        )
        .route("/api/search", get(search_handler))
        .route("/api/users", post(create_user_handler))
        .route("/api/users/phone/{phone}", get(user_by_phone_handler))
        .route(
            "/api/users/{user_id}",
            get(user_handler).patch(update_user_handler),
        )
        .route("/api/users/{user_id}/orders", get(user_orders_handler))
        .route("/api/orders", get(orders_handler).post(create_order_handler))
        .route(
            "/api/orders/{order_id}",
            get(order_handler).patch(update_order_handler),
        )
}

// ─── Health ─────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    categories: usize,
    products: usize,
    users: usize,
    orders: usize,
}

async fn health_handler(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let counts = state.store.counts();
    Json(HealthResponse {
        status: "ok",
        categories: counts.categories,
        products: counts.products,
        users: counts.users,
        orders: counts.orders,
    })
}

// ─── Catalogue ──────────────────────────────────────────────────────────────

async fn categories_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Category>> {
    Json(state.store.categories())
}

async fn category_products_handler(
    State(state): State<Arc<AppState>>,
    Path(category_id): Path<String>,
) -> Json<Vec<Product>> {
    Json(state.store.products_by_category(&CategoryId::from(category_id)))
}

async fn products_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Product>> {
    Json(state.store.products())
}

async fn product_handler(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
) -> ApiResult<Json<Product>> {
    state
        .store
        .product(&ProductId::from(product_id))
        .map(Json)
        .ok_or_else(|| ApiError::not_found("product"))
}

async fn update_product_handler(
    State(state): State<Arc<AppState>>,
    Path(product_id): Path<String>,
    ValidJson(patch): ValidJson<ProductPatch>,
) -> ApiResult<Json<Product>> {
    let product = state
        .store
        .update_product(&ProductId::from(product_id), patch)?;
    tracing::info!(product = %product.id, in_stock = product.in_stock, "product updated");
    Ok(Json(product))
}

#[derive(Deserialize)]
struct SearchParams {
    #[serde(default)]
    q: String,
}

async fn search_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Json<Vec<Product>> {
    if params.q.trim().is_empty() {
        return Json(Vec::new());
    }
    let needle = params.q.to_lowercase();
    let hits = state
        .store
        .products()
        .into_iter()
        .filter(|p| p.matches(&needle))
        .collect();
    Json(hits)
}

// ─── Users ──────────────────────────────────────────────────────────────────

async fn user_by_phone_handler(
    State(state): State<Arc<AppState>>,
    Path(phone): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .store
        .user_by_phone(&phone)
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

async fn create_user_handler(
    State(state): State<Arc<AppState>>,
    ValidJson(new): ValidJson<NewUser>,
) -> ApiResult<(StatusCode, Json<User>)> {
    let user = state.store.create_user(new)?;
    tracing::info!(user = %user.id, "user registered");
    Ok((StatusCode::CREATED, Json(user)))
}

async fn user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<User>> {
    state
        .store
        .user(&UserId::from(user_id))
        .map(Json)
        .ok_or_else(|| ApiError::not_found("user"))
}

async fn update_user_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    ValidJson(patch): ValidJson<UserPatch>,
) -> ApiResult<Json<User>> {
    let user = state.store.update_user(&UserId::from(user_id), patch)?;
    Ok(Json(user))
}

async fn user_orders_handler(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> Json<Vec<Order>> {
    Json(state.store.orders_by_user(&UserId::from(user_id)))
}

// ─── Orders ─────────────────────────────────────────────────────────────────

async fn orders_handler(State(state): State<Arc<AppState>>) -> Json<Vec<Order>> {
    Json(state.store.orders())
}

async fn create_order_handler(
    State(state): State<Arc<AppState>>,
    ValidJson(new): ValidJson<NewOrder>,
) -> ApiResult<(StatusCode, Json<Order>)> {
    let unavailable = out_of_stock_lines(state.store.as_ref(), &new);
    if !unavailable.is_empty() {
        return Err(ApiError::Validation(unavailable));
    }
    let order = state.store.create_order(new)?;
    tracing::info!(
        order = %order.id,
        user = %order.user_id,
        total = order.total,
        items = order.items.len(),
        "order placed"
    );
    state.notifier.order_placed(&order);
    Ok((StatusCode::CREATED, Json(order)))
}

/// Lines naming a catalogue product that is currently out of stock. Product
/// ids the catalogue does not know are let through.
fn out_of_stock_lines(store: &dyn Storage, order: &NewOrder) -> Vec<FieldError> {
    order
        .items
        .iter()
        .enumerate()
        .filter(|(_, item)| store.product(&item.product_id).is_some_and(|p| !p.in_stock))
        .map(|(i, item)| {
            FieldError::new(
                format!("items[{i}].productId"),
                format!("{} is out of stock", item.name),
            )
        })
        .collect()
}

async fn order_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
) -> ApiResult<Json<Order>> {
    state
        .store
        .order(&OrderId::from(order_id))
        .map(Json)
        .ok_or_else(|| ApiError::not_found("order"))
}

async fn update_order_handler(
    State(state): State<Arc<AppState>>,
    Path(order_id): Path<String>,
    ValidJson(patch): ValidJson<OrderPatch>,
) -> ApiResult<Json<Order>> {
    let status_changed = patch.status.is_some();
    let order = state.store.update_order(&OrderId::from(order_id), patch)?;
    tracing::info!(order = %order.id, status = %order.status, "order updated");
    if status_changed {
        state.notifier.status_changed(&order);
    }
    Ok(Json(order))
}
