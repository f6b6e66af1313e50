//! Pasarku REST backend client.
//!
//! # Architecture
//!
//! - Plain `reqwest` calls against a single backend origin
//! - The backend is the source of truth; nothing is persisted locally
//! - Bearer token taken from the caller's session on every authenticated call
//! - Public catalog data cached in memory via `moka`
//!
//! Responses may be wrapped in `{ "data": ... }` or returned bare; both are
//! accepted. Failures are mapped to [`ApiError`] with the backend's own
//! message when it sent one.
//!
//! # Example
//!
//! ```rust,ignore
//! use pasarku_storefront::api::PasarkuClient;
//!
//! let client = PasarkuClient::new(&config.api)?;
//! let token = client.login("budi@pasarku.id", "rahasia").await?.token;
//! let cart = client.cart(&token.into()).await?;
//! ```

mod cache;
pub mod types;

use std::sync::Arc;

use moka::future::Cache;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, RequestBuilder, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, instrument};

use pasarku_core::{CartEntryId, ItemId, MerchantId, OrderId, OrderStatus};

use crate::config::PasarkuApiConfig;

use cache::{CacheKey, CacheValue};
pub use types::*;

/// Longest backend body excerpt kept in logs and error messages.
const BODY_EXCERPT: usize = 200;

/// Errors that can occur when talking to the Pasarku backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The token is missing, expired or rejected.
    #[error("Unauthorized")]
    Unauthorized,

    /// The resource does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Any other non-2xx response.
    #[error("API error: {status} - {message}")]
    Status { status: u16, message: String },

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// A required field was absent from an otherwise valid response.
    #[error("Missing field in response: {0}")]
    MissingField(&'static str),
}

impl ApiError {
    /// Message suitable for showing inline on a page.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Http(_) => "Tidak dapat terhubung ke server. Silakan coba lagi.".to_string(),
            Self::Unauthorized => "Sesi Anda telah berakhir. Silakan login kembali.".to_string(),
            Self::NotFound(_) => "Data tidak ditemukan.".to_string(),
            Self::Status { message, .. } => message.clone(),
            Self::Parse(_) | Self::MissingField(_) => {
                "Respons server tidak valid. Silakan coba lagi.".to_string()
            }
        }
    }

    /// HTTP status the backend answered with, if it answered at all.
    #[must_use]
    pub const fn status_code(&self) -> Option<u16> {
        match self {
            Self::Unauthorized => Some(401),
            Self::NotFound(_) => Some(404),
            Self::Status { status, .. } => Some(*status),
            Self::Http(_) | Self::Parse(_) | Self::MissingField(_) => None,
        }
    }

    /// Whether the backend itself failed (as opposed to rejecting the request).
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        match self {
            Self::Http(_) | Self::Parse(_) | Self::MissingField(_) => true,
            Self::Status { status, .. } => *status >= 500,
            Self::Unauthorized | Self::NotFound(_) => false,
        }
    }
}

/// A file forwarded from a storefront form to the backend.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    fn into_part(self) -> Result<Part, ApiError> {
        Ok(Part::bytes(self.bytes)
            .file_name(self.file_name)
            .mime_str(&self.content_type)?)
    }
}

// =============================================================================
// PasarkuClient
// =============================================================================

/// Client for the Pasarku REST backend.
///
/// Cheap to clone. The catalog search and merchant list are cached for the
/// configured TTL; everything else goes to the backend every time.
#[derive(Clone)]
pub struct PasarkuClient {
    inner: Arc<PasarkuClientInner>,
}

struct PasarkuClientInner {
    client: reqwest::Client,
    config: PasarkuApiConfig,
    cache: Cache<CacheKey, CacheValue>,
}

impl PasarkuClient {
    /// Create a new backend client.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(config: &PasarkuApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(concat!("pasarku-storefront/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let cache = Cache::builder()
            .max_capacity(500)
            .time_to_live(config.catalog_ttl)
            .build();

        Ok(Self {
            inner: Arc::new(PasarkuClientInner {
                client,
                config: config.clone(),
                cache,
            }),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&SecretString>) -> RequestBuilder {
        let builder = self
            .inner
            .client
            .request(method, self.inner.config.endpoint(path));
        match token {
            Some(token) => builder.bearer_auth(token.expose_secret()),
            None => builder,
        }
    }

    /// Send a request and return the (unwrapped) JSON body.
    async fn send_value(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        self.send_raw(builder).await.map(unwrap_envelope)
    }

    /// Send a request and return the JSON body as the backend wrote it.
    async fn send_raw(&self, builder: RequestBuilder) -> Result<Value, ApiError> {
        let response = builder.send().await?;
        let status = response.status();
        let url = response.url().path().to_string();
        let body = response.text().await?;

        if !status.is_success() {
            tracing::warn!(
                status = %status,
                path = %url,
                body = %excerpt(&body),
                "Pasarku backend returned non-success status"
            );
            return Err(error_for_status(status, &url, &body));
        }

        if body.trim().is_empty() {
            return Ok(Value::Null);
        }

        let value: Value = serde_json::from_str(&body).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %url,
                body = %excerpt(&body),
                "Failed to parse Pasarku backend response"
            );
            ApiError::Parse(e)
        })?;

        Ok(value)
    }

    /// Send a request and deserialize the body.
    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T, ApiError> {
        let value = self.send_value(builder).await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Send a request and deserialize a list body, treating `null` as empty.
    async fn send_list<T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<Vec<T>, ApiError> {
        match self.send_value(builder).await? {
            Value::Null => Ok(Vec::new()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    /// Send a request whose body is irrelevant.
    async fn send_unit(&self, builder: RequestBuilder) -> Result<(), ApiError> {
        self.send_value(builder).await.map(drop)
    }

    // =========================================================================
    // Auth and profile
    // =========================================================================

    /// Register a new account.
    ///
    /// # Errors
    ///
    /// Returns an error if the backend rejects the registration (e.g. the
    /// email is taken) or the request fails.
    #[instrument(skip(self, password))]
    pub async fn register(&self, name: &str, email: &str, password: &str) -> Result<(), ApiError> {
        let form = Form::new()
            .text("name", name.to_string())
            .text("displayName", name.to_string())
            .text("email", email.to_string())
            .text("password", password.to_string());
        self.send_unit(self.request(Method::POST, "/register", None).multipart(form))
            .await
    }

    /// Exchange credentials for a bearer token.
    ///
    /// # Errors
    ///
    /// Returns an error if the credentials are rejected or the response has no token.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<LoginResponse, ApiError> {
        let form = Form::new()
            .text("email", email.to_string())
            .text("password", password.to_string());
        let value = self
            .send_raw(self.request(Method::POST, "/login", None).multipart(form))
            .await?;

        login_token(&value)
            .map(|token| LoginResponse { token })
            .ok_or(ApiError::MissingField("token"))
    }

    /// Profile of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn profile(&self, token: &SecretString) -> Result<Profile, ApiError> {
        self.send(self.request(Method::GET, "/profile", Some(token)))
            .await
    }

    /// Update display name, phone and address.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_profile(
        &self,
        token: &SecretString,
        update: &ProfileUpdate,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(Method::PUT, "/profile", Some(token))
                .json(update),
        )
        .await
    }

    // =========================================================================
    // Merchants
    // =========================================================================

    /// Open a merchant (toko) for the token's owner and return its id.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or no id can be found in the response.
    #[instrument(skip(self, token, photo))]
    pub async fn create_merchant(
        &self,
        token: &SecretString,
        merchant: &NewMerchant,
        photo: Option<Upload>,
    ) -> Result<MerchantId, ApiError> {
        let mut form = Form::new()
            .text("name", merchant.name.clone())
            .text("category", merchant.category.clone())
            .text("lat", merchant.lat.to_string())
            .text("lng", merchant.lng.to_string());
        if let Some(photo) = photo {
            form = form.part("photo", photo.into_part()?);
        }

        let value = self
            .send_value(
                self.request(Method::POST, "/merchant", Some(token))
                    .multipart(form),
            )
            .await?;
        self.inner.cache.invalidate(&CacheKey::Merchants).await;

        find_id(&value)
            .map(MerchantId::new)
            .ok_or(ApiError::MissingField("id"))
    }

    /// Every merchant. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn merchants(&self) -> Result<Vec<Merchant>, ApiError> {
        if let Some(CacheValue::Merchants(merchants)) =
            self.inner.cache.get(&CacheKey::Merchants).await
        {
            debug!("Cache hit for merchants");
            return Ok(merchants);
        }

        let merchants: Vec<Merchant> = self
            .send_list(self.request(Method::GET, "/merchants", None))
            .await?;
        self.inner
            .cache
            .insert(CacheKey::Merchants, CacheValue::Merchants(merchants.clone()))
            .await;
        Ok(merchants)
    }

    /// The merchant owned by the token's owner.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::NotFound`] if the user has no merchant.
    #[instrument(skip_all)]
    pub async fn merchant(&self, token: &SecretString) -> Result<Merchant, ApiError> {
        let value = self
            .send_value(self.request(Method::GET, "/merchant", Some(token)))
            .await?;
        // Some deployments answer with a one-element list.
        let value = match value {
            Value::Array(list) => list
                .into_iter()
                .next()
                .ok_or_else(|| ApiError::NotFound("/merchant".to_string()))?,
            Value::Null => return Err(ApiError::NotFound("/merchant".to_string())),
            other => other,
        };
        Ok(serde_json::from_value(value)?)
    }

    // =========================================================================
    // Items and stock
    // =========================================================================

    /// Items of the token owner's merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn items(&self, token: &SecretString) -> Result<Vec<Item>, ApiError> {
        self.send_list(self.request(Method::GET, "/items", Some(token)))
            .await
    }

    /// Add an item (with initial stock) to the token owner's merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, photo))]
    pub async fn create_item(
        &self,
        token: &SecretString,
        item: &NewItem,
        photo: Option<Upload>,
    ) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("name", item.name.clone())
            .text("category", item.category.clone())
            .text("basePrice", item.base_price.amount().to_string())
            .text("stock", item.stock.to_string());
        if let Some(photo) = photo {
            form = form.part("photo", photo.into_part()?);
        }

        self.send_unit(
            self.request(Method::POST, "/item", Some(token))
                .multipart(form),
        )
        .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Edit an item's name, category and price.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_item(
        &self,
        token: &SecretString,
        id: &ItemId,
        update: &ItemUpdate,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(Method::PUT, &format!("/item/{}", encode(id.as_str())), Some(token))
                .json(update),
        )
        .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Delete an item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn delete_item(&self, token: &SecretString, id: &ItemId) -> Result<(), ApiError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/item/{}", encode(id.as_str())),
            Some(token),
        ))
        .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Stock rows of the token owner's merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn stock(&self, token: &SecretString) -> Result<Vec<StockEntry>, ApiError> {
        self.send_list(self.request(Method::GET, "/stock", Some(token)))
            .await
    }

    /// Set the stock of one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_stock(
        &self,
        token: &SecretString,
        update: &StockUpdate,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(Method::POST, "/stock", Some(token))
                .json(update),
        )
        .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Search the public catalog; an empty query lists everything. Cached.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, query: &str) -> Result<Vec<ProductListing>, ApiError> {
        let key = CacheKey::search(query);
        if let Some(CacheValue::Listings(listings)) = self.inner.cache.get(&key).await {
            debug!("Cache hit for product search");
            return Ok(listings);
        }

        let path = format!("/product/search?q={}", encode(query.trim()));
        let listings: Vec<ProductListing> =
            self.send_list(self.request(Method::GET, &path, None)).await?;
        self.inner
            .cache
            .insert(key, CacheValue::Listings(listings.clone()))
            .await;
        Ok(listings)
    }

    /// Drop cached catalog data after an item or stock write.
    pub fn invalidate_catalog(&self) {
        self.inner.cache.invalidate_all();
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Place one order for one item.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token, proof))]
    pub async fn create_order(
        &self,
        token: &SecretString,
        order: &NewOrder,
        proof: Option<Upload>,
    ) -> Result<(), ApiError> {
        let mut form = Form::new()
            .text("itemId", order.item_id.to_string())
            .text("merchantId", order.merchant_id.to_string())
            .text("quantity", order.quantity.to_string())
            .text("deliveryMethod", order.delivery_method.as_str())
            .text("paymentMethod", order.payment_method.as_str())
            .text("totalPrice", order.total_price.amount().to_string());
        if let Some(address) = &order.address {
            form = form.text("address", address.clone());
        }
        if let Some(proof) = proof {
            form = form.part("paymentProof", proof.into_part()?);
        }

        self.send_unit(
            self.request(Method::POST, "/order", Some(token))
                .multipart(form),
        )
        .await?;
        self.invalidate_catalog();
        Ok(())
    }

    /// Orders placed by the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn buyer_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.send_list(self.request(Method::GET, "/order", Some(token)))
            .await
    }

    /// Orders received by the token owner's merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn merchant_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.send_list(self.request(Method::GET, "/merchant/orders", Some(token)))
            .await
    }

    /// Every order across merchants (owner role only).
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the token is not an owner's.
    #[instrument(skip_all)]
    pub async fn all_orders(&self, token: &SecretString) -> Result<Vec<Order>, ApiError> {
        self.send_list(self.request(Method::GET, "/order?all=true", Some(token)))
            .await
    }

    /// Set an order's status.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_order_status(
        &self,
        token: &SecretString,
        id: &OrderId,
        status: &OrderStatus,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/order/{}/status", encode(id.as_str())),
                Some(token),
            )
            .json(&StatusUpdate {
                status: status.as_str(),
            }),
        )
        .await
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Cart entries of the token's owner.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn cart(&self, token: &SecretString) -> Result<Vec<CartEntry>, ApiError> {
        self.send_list(self.request(Method::GET, "/cart", Some(token)))
            .await
    }

    /// Add an item to the cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn add_to_cart(
        &self,
        token: &SecretString,
        item_id: &ItemId,
        merchant_id: &MerchantId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        let body = AddToCart {
            item_id: item_id.clone(),
            merchant_id: merchant_id.clone(),
            quantity,
        };
        self.send_unit(
            self.request(Method::POST, "/cart", Some(token))
                .json(&body),
        )
        .await
    }

    /// Change the quantity of one cart entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn update_cart_entry(
        &self,
        token: &SecretString,
        id: &CartEntryId,
        quantity: u32,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(
                Method::PUT,
                &format!("/cart/{}", encode(id.as_str())),
                Some(token),
            )
            .json(&QuantityUpdate { quantity }),
        )
        .await
    }

    /// Remove one cart entry.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn remove_cart_entry(
        &self,
        token: &SecretString,
        id: &CartEntryId,
    ) -> Result<(), ApiError> {
        self.send_unit(self.request(
            Method::DELETE,
            &format!("/cart/{}", encode(id.as_str())),
            Some(token),
        ))
        .await
    }

    // =========================================================================
    // Dashboard and messages
    // =========================================================================

    /// Summary numbers for the token owner's merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn dashboard(&self, token: &SecretString) -> Result<DashboardStats, ApiError> {
        match self
            .send_value(self.request(Method::GET, "/dashboard", Some(token)))
            .await?
        {
            Value::Null => Ok(DashboardStats::default()),
            value => Ok(serde_json::from_value(value)?),
        }
    }

    /// Contact messages addressed to the token owner's merchant.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip_all)]
    pub async fn merchant_messages(
        &self,
        token: &SecretString,
    ) -> Result<Vec<MerchantMessage>, ApiError> {
        self.send_list(self.request(Method::GET, "/merchant/messages", Some(token)))
            .await
    }

    /// Send a contact message. Visitors may send without logging in.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    #[instrument(skip(self, token))]
    pub async fn send_message(
        &self,
        token: Option<&SecretString>,
        message: &ContactMessage,
    ) -> Result<(), ApiError> {
        self.send_unit(
            self.request(Method::POST, "/send-message", token)
                .json(message),
        )
        .await
    }
}

// =============================================================================
// Response helpers
// =============================================================================

/// Strip a `{ "data": ... }` wrapper if present.
fn unwrap_envelope(value: Value) -> Value {
    match value {
        Value::Object(mut map) if map.contains_key("data") => {
            map.remove("data").unwrap_or(Value::Null)
        }
        other => other,
    }
}

/// The bearer token of a login response.
///
/// Looks at the top level before the `data` wrapper, since the backend puts
/// the token beside `data` on some deployments and inside it on others.
fn login_token(value: &Value) -> Option<String> {
    let token_in = |object: &Value| {
        ["token", "accessToken"].iter().find_map(|key| {
            object
                .get(key)
                .and_then(Value::as_str)
                .filter(|token| !token.is_empty())
                .map(str::to_string)
        })
    };
    token_in(value).or_else(|| value.get("data").and_then(token_in))
}

/// Map a non-2xx response to an [`ApiError`].
fn error_for_status(status: StatusCode, path: &str, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => ApiError::NotFound(path.to_string()),
        _ => ApiError::Status {
            status: status.as_u16(),
            message: error_message(body).unwrap_or_else(|| {
                let excerpt = excerpt(body);
                if excerpt.is_empty() {
                    format!("HTTP {status}")
                } else {
                    excerpt
                }
            }),
        },
    }
}

/// The `message` or `error` string of a JSON error body.
fn error_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    ["message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(Value::as_str))
        .map(str::to_string)
}

/// Find a created resource id in `data.id`, `id` or `merchantId`.
///
/// `value` has already had its `data` wrapper removed.
fn find_id(value: &Value) -> Option<String> {
    ["id", "merchantId", "_id"].iter().find_map(|key| {
        match value.get(key)? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    })
}

fn excerpt(body: &str) -> String {
    body.chars().take(BODY_EXCERPT).collect()
}

fn encode(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}
