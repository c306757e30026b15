//! Typed client for the storefront REST API.

use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use ruralcart_common::category::Category;
use ruralcart_common::identity::{CategoryId, OrderId, ProductId, UserId};
use ruralcart_common::order::{NewOrder, Order, OrderPatch};
use ruralcart_common::product::{Product, ProductPatch};
use ruralcart_common::user::{NewUser, User, UserPatch};
use ruralcart_common::validation::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("invalid base url {0}")]
    BaseUrl(String),

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    NotFound(String),

    #[error("{message}")]
    Validation {
        message: String,
        errors: Vec<FieldError>,
    },

    #[error("{0}")]
    Conflict(String),

    #[error("server returned {status}: {message}")]
    Status { status: u16, message: String },
}

impl ClientError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClientError::NotFound(_))
    }
}

/// Error body returned by the API.
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    errors: Vec<FieldError>,
}

/// `GET /health` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Health {
    pub status: String,
    pub categories: usize,
    pub products: usize,
    pub users: usize,
    pub orders: usize,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    base: Url,
    http: reqwest::Client,
}

impl ApiClient {
    /// Client for the server at `base` (e.g. `http://localhost:5000`).
    pub fn new(base: &str) -> Result<Self, ClientError> {
        Self::with_client(base, reqwest::Client::new())
    }

    pub fn with_client(base: &str, http: reqwest::Client) -> Result<Self, ClientError> {
        let base = Url::parse(base).map_err(|e| ClientError::BaseUrl(format!("{base}: {e}")))?;
        if base.cannot_be_a_base() {
            return Err(ClientError::BaseUrl(base.to_string()));
        }
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn request(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        self.http.request(method, self.url(segments))
    }

    // ─── Catalogue ──────────────────────────────────────────────────────────

    pub async fn health(&self) -> Result<Health, ClientError> {
        send(self.request(Method::GET, &["health"])).await
    }

    pub async fn categories(&self) -> Result<Vec<Category>, ClientError> {
        send(self.request(Method::GET, &["api", "categories"])).await
    }

    pub async fn category_products(&self, id: &CategoryId) -> Result<Vec<Product>, ClientError> {
        send(self.request(Method::GET, &["api", "categories", id.as_str(), "products"])).await
    }

    pub async fn products(&self) -> Result<Vec<Product>, ClientError> {
        send(self.request(Method::GET, &["api", "products"])).await
    }

    pub async fn product(&self, id: &ProductId) -> Result<Product, ClientError> {
        send(self.request(Method::GET, &["api", "products", id.as_str()])).await
    }

    pub async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
    ) -> Result<Product, ClientError> {
        send(self.request(Method::PATCH, &["api", "products", id.as_str()]).json(patch)).await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<Product>, ClientError> {
        send(self.request(Method::GET, &["api", "search"]).query(&[("q", query)])).await
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn user_by_phone(&self, phone: &str) -> Result<User, ClientError> {
        send(self.request(Method::GET, &["api", "users", "phone", phone])).await
    }

    pub async fn create_user(&self, new: &NewUser) -> Result<User, ClientError> {
        send(self.request(Method::POST, &["api", "users"]).json(new)).await
    }

    pub async fn user(&self, id: &UserId) -> Result<User, ClientError> {
        send(self.request(Method::GET, &["api", "users", id.as_str()])).await
    }

    pub async fn update_user(&self, id: &UserId, patch: &UserPatch) -> Result<User, ClientError> {
        send(self.request(Method::PATCH, &["api", "users", id.as_str()]).json(patch)).await
    }

    pub async fn user_orders(&self, id: &UserId) -> Result<Vec<Order>, ClientError> {
        send(self.request(Method::GET, &["api", "users", id.as_str(), "orders"])).await
    }

    // ─── Orders ─────────────────────────────────────────────────────────────

    pub async fn orders(&self) -> Result<Vec<Order>, ClientError> {
        send(self.request(Method::GET, &["api", "orders"])).await
    }

    pub async fn create_order(&self, new: &NewOrder) -> Result<Order, ClientError> {
        send(self.request(Method::POST, &["api", "orders"]).json(new)).await
    }

    pub async fn order(&self, id: &OrderId) -> Result<Order, ClientError> {
        send(self.request(Method::GET, &["api", "orders", id.as_str()])).await
    }

    pub async fn update_order(&self, id: &OrderId, patch: &OrderPatch) -> Result<Order, ClientError> {
        send(self.request(Method::PATCH, &["api", "orders", id.as_str()]).json(patch)).await
    }
}

async fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
    let response = request.send().await?;
    if response.status().is_success() {
        return Ok(response.json().await?);
    }
    Err(error_from(response).await)
}

async fn error_from(response: Response) -> ClientError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: ErrorBody = serde_json::from_str(&text).unwrap_or_else(|_| ErrorBody {
        message: text,
        errors: Vec::new(),
    });
    match status {
        StatusCode::NOT_FOUND => ClientError::NotFound(body.message),
        StatusCode::BAD_REQUEST => ClientError::Validation {
            message: body.message,
            errors: body.errors,
        },
        StatusCode::CONFLICT => ClientError::Conflict(body.message),
        other => ClientError::Status {
            status: other.as_u16(),
            message: body.message,
        },
    }
}
