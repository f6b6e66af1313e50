//! In-process mock of the Pasarku REST backend.
//!
//! Serves just enough of the backend for the storefront pages under test:
//! login, profile, catalog search, cart, orders, order status and the
//! merchant dashboard feeds. Every request is recorded so tests can assert
//! what the storefront sent.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post, put},
};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use serde_json::{Value, json};
use tokio::net::TcpListener;
use tokio::sync::{Mutex, MutexGuard};
use url::Url;

use crate::{PASSWORD, TestResult};

/// A seeded backend account.
#[derive(Debug, Clone)]
pub struct MockUser {
    pub uid: String,
    pub email: String,
    pub name: String,
    pub role: &'static str,
    pub token: String,
}

impl MockUser {
    /// A regular buyer account.
    #[must_use]
    pub fn buyer(uid: &str, name: &str) -> Self {
        Self::new(uid, name, "user")
    }

    /// An owner account.
    #[must_use]
    pub fn owner(uid: &str, name: &str) -> Self {
        Self::new(uid, name, "owner")
    }

    fn new(uid: &str, name: &str, role: &'static str) -> Self {
        let email = format!("{uid}@pasarku.test");
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(
            json!({
                "uid": uid,
                "email": email,
                "displayName": name,
                "role": role,
                "iat": 1_749_600_000,
            })
            .to_string(),
        );
        Self {
            uid: uid.to_string(),
            email,
            name: name.to_string(),
            role,
            token: format!("{header}.{payload}.bW9jaw"),
        }
    }
}

/// Mutable backend data.
#[derive(Debug, Default)]
pub struct MockState {
    pub users: Vec<MockUser>,
    /// Rows returned by `/product/search`.
    pub listings: Vec<Value>,
    /// Cart entries; `userId` marks the owner.
    pub cart: Vec<Value>,
    /// Orders; `userId` marks the buyer.
    pub orders: Vec<Value>,
    /// Items whose order creation fails.
    pub failing_items: Vec<String>,
    /// Cart entries whose update is refused, with the quantity the backend
    /// holds for them afterwards.
    pub failing_cart_entries: HashMap<String, u32>,
    /// Merchants keyed by the uid of the account that owns them.
    pub merchants: HashMap<String, Value>,
    /// Merchant items; `merchantId` links them to a merchant.
    pub items: Vec<Value>,
    /// Stock rows for merchant items.
    pub stock: Vec<Value>,
    /// `METHOD /path` of every request received.
    pub calls: Vec<String>,
    next_id: u32,
}

impl MockState {
    fn user(&self, headers: &HeaderMap) -> Option<MockUser> {
        let token = headers
            .get(header::AUTHORIZATION)?
            .to_str()
            .ok()?
            .strip_prefix("Bearer ")?;
        self.users.iter().find(|u| u.token == token).cloned()
    }

    fn own_merchant(&self, headers: &HeaderMap) -> Option<&Value> {
        let user = self.user(headers)?;
        self.merchants.get(&user.uid)
    }

    fn next_id(&mut self, prefix: &str) -> String {
        self.next_id += 1;
        format!("{prefix}-{}", self.next_id)
    }

    /// Whether any recorded call starts with `prefix`.
    #[must_use]
    pub fn called(&self, prefix: &str) -> bool {
        self.calls.iter().any(|c| c.starts_with(prefix))
    }
}

type Shared = Arc<Mutex<MockState>>;

/// Handle to a running mock backend.
#[derive(Clone)]
pub struct MockBackend {
    url: Url,
    state: Shared,
}

impl MockBackend {
    /// Start the mock on an ephemeral port with the given accounts.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener cannot bind.
    pub async fn start(users: Vec<MockUser>) -> TestResult<Self> {
        let state: Shared = Arc::new(Mutex::new(MockState {
            users,
            ..MockState::default()
        }));

        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let url = Url::parse(&format!("http://{}/", listener.local_addr()?))?;
        let router = routes().with_state(state.clone());
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });

        Ok(Self { url, state })
    }

    #[must_use]
    pub const fn url(&self) -> &Url {
        &self.url
    }

    /// Lock the backend data for seeding or inspection.
    pub async fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().await
    }

    /// Add a catalog row and return its item id.
    pub async fn add_listing(&self, name: &str, price: i64, stock: u32) -> String {
        let mut state = self.state.lock().await;
        let stock_id = state.next_id("stock");
        let item_id = state.next_id("item");
        state.listings.push(json!({
            "id": stock_id,
            "quantity": stock,
            "merchantId": "m-1",
            "merchant": { "id": "m-1", "name": "Toko Sayur Bu Ani" },
            "item": {
                "id": item_id,
                "name": name,
                "category": "Sayur",
                "basePrice": price,
                "merchantId": "m-1",
            },
        }));
        item_id
    }

    /// Put `quantity` of a catalog item into `user`'s cart.
    pub async fn add_cart_entry(&self, user: &MockUser, item_id: &str, quantity: u32) -> String {
        let mut state = self.state.lock().await;
        let item = state
            .listings
            .iter()
            .find(|l| l["item"]["id"] == item_id)
            .map(|l| l["item"].clone())
            .unwrap_or(Value::Null);
        let id = state.next_id("cart");
        state.cart.push(json!({
            "id": id,
            "userId": user.uid,
            "itemId": item_id,
            "merchantId": "m-1",
            "quantity": quantity,
            "item": item,
            "merchant": { "id": "m-1", "name": "Toko Sayur Bu Ani" },
        }));
        id
    }

    /// Give `owner` a merchant. Numeric ids are sent as JSON numbers.
    pub async fn add_merchant(&self, owner: &MockUser, id: u64, name: &str) {
        self.state.lock().await.merchants.insert(
            owner.uid.clone(),
            json!({
                "id": id,
                "name": name,
                "category": "Sayur",
                "lat": "-2.9761",
                "lng": 104.7754,
            }),
        );
    }

    /// Add an item to `owner`'s merchant and return its id. `stock` of
    /// `None` leaves the item without a stock row.
    pub async fn add_merchant_item(
        &self,
        owner: &MockUser,
        name: &str,
        price: i64,
        stock: Option<u32>,
    ) -> String {
        let mut state = self.state.lock().await;
        let merchant_id = state
            .merchants
            .get(&owner.uid)
            .map(|m| m["id"].clone())
            .unwrap_or(Value::Null);
        let item_id = state.next_id("item");
        state.items.push(json!({
            "id": item_id,
            "name": name,
            "category": "Sayur",
            "basePrice": price,
            "merchantId": merchant_id,
        }));
        if let Some(quantity) = stock {
            let stock_id = state.next_id("stock");
            state.stock.push(json!({
                "id": stock_id,
                "itemId": item_id,
                "quantity": quantity,
                "merchantId": merchant_id,
            }));
        }
        item_id
    }

    /// Record an existing order with the given status.
    pub async fn add_order(&self, buyer: &MockUser, status: &str) -> String {
        let mut state = self.state.lock().await;
        let id = state.next_id("order");
        state.orders.push(json!({
            "id": id,
            "userId": buyer.uid,
            "userName": buyer.name,
            "itemId": "item-x",
            "merchantId": "m-1",
            "quantity": 1,
            "totalPrice": 15_000,
            "deliveryMethod": "ambil",
            "paymentMethod": "digital",
            "status": status,
        }));
        id
    }

    /// Status of an order, if it exists.
    pub async fn order_status(&self, id: &str) -> Option<String> {
        self.state
            .lock()
            .await
            .orders
            .iter()
            .find(|o| o["id"] == id)
            .and_then(|o| o["status"].as_str())
            .map(str::to_string)
    }
}

fn routes() -> Router<Shared> {
    Router::new()
        .route("/login", post(login))
        .route("/profile", get(profile))
        .route("/merchant", get(merchant))
        .route("/items", get(merchant_items))
        .route("/stock", get(merchant_stock))
        .route("/dashboard", get(dashboard))
        .route("/merchants", get(merchants))
        .route("/product/search", get(search))
        .route("/cart", get(cart).post(add_to_cart))
        .route("/cart/{id}", put(update_cart).delete(remove_cart))
        .route("/order", get(orders).post(create_order))
        .route("/order/{id}/status", put(update_status))
        .route("/merchant/orders", get(merchant_orders))
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn record(state: &Shared, call: String) -> MutexGuard<'_, MockState> {
    let mut guard = state.lock().await;
    guard.calls.push(call);
    guard
}

/// Text fields of a multipart body; file parts are skipped.
async fn text_fields(mut multipart: Multipart) -> HashMap<String, String> {
    let mut fields = HashMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };
        if field.file_name().is_some() {
            let _ = field.bytes().await;
            fields.insert(name, "<file>".to_string());
        } else if let Ok(text) = field.text().await {
            fields.insert(name, text);
        }
    }
    fields
}

async fn login(State(state): State<Shared>, multipart: Multipart) -> Response {
    let fields = text_fields(multipart).await;
    let state = record(&state, "POST /login".to_string()).await;
    let email = fields.get("email").map(String::as_str).unwrap_or_default();
    let password = fields.get("password").map(String::as_str).unwrap_or_default();

    match state.users.iter().find(|u| u.email == email) {
        Some(user) if password == PASSWORD => Json(json!({
            "message": "Login berhasil",
            "token": user.token,
            "data": { "uid": user.uid, "email": user.email },
        }))
        .into_response(),
        _ => error(StatusCode::UNAUTHORIZED, "Invalid credentials"),
    }
}

async fn profile(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = record(&state, "GET /profile".to_string()).await;
    let Some(user) = state.user(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    Json(json!({
        "uid": user.uid,
        "email": user.email,
        "displayName": user.name,
        "role": user.role,
    }))
    .into_response()
}

async fn merchant(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = record(&state, "GET /merchant".to_string()).await;
    match state.own_merchant(&headers) {
        Some(merchant) => Json(json!({ "data": merchant })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Merchant not found"),
    }
}

/// Rows of `rows` that belong to the caller's merchant.
fn owned_rows(state: &MockState, headers: &HeaderMap, rows: &[Value]) -> Option<Vec<Value>> {
    let merchant_id = &state.own_merchant(headers)?["id"];
    Some(
        rows.iter()
            .filter(|row| &row["merchantId"] == merchant_id)
            .cloned()
            .collect(),
    )
}

async fn merchant_items(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = record(&state, "GET /items".to_string()).await;
    match owned_rows(&state, &headers, &state.items) {
        Some(rows) => Json(rows).into_response(),
        None => error(StatusCode::NOT_FOUND, "Merchant not found"),
    }
}

async fn merchant_stock(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = record(&state, "GET /stock".to_string()).await;
    match owned_rows(&state, &headers, &state.stock) {
        Some(rows) => Json(json!({ "data": rows })).into_response(),
        None => error(StatusCode::NOT_FOUND, "Merchant not found"),
    }
}

async fn dashboard(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = record(&state, "GET /dashboard".to_string()).await;
    match owned_rows(&state, &headers, &state.items) {
        Some(items) => Json(json!({
            "totalProducts": items.len(),
            "totalOrders": "3",
            "pendingOrders": 1,
            "totalRevenue": 45_000,
        }))
        .into_response(),
        None => error(StatusCode::NOT_FOUND, "Merchant not found"),
    }
}

async fn merchants(State(state): State<Shared>) -> Response {
    let _state = record(&state, "GET /merchants".to_string()).await;
    Json(json!([{ "id": "m-1", "name": "Toko Sayur Bu Ani", "category": "Sayur" }])).into_response()
}

async fn search(
    State(state): State<Shared>,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = record(&state, "GET /product/search".to_string()).await;
    let q = query.get("q").map(|q| q.to_lowercase()).unwrap_or_default();
    let rows: Vec<Value> = state
        .listings
        .iter()
        .filter(|l| {
            l["item"]["name"]
                .as_str()
                .is_some_and(|n| n.to_lowercase().contains(&q))
        })
        .cloned()
        .collect();
    Json(json!({ "data": rows })).into_response()
}

async fn cart(State(state): State<Shared>, headers: HeaderMap) -> Response {
    let state = record(&state, "GET /cart".to_string()).await;
    let Some(user) = state.user(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let entries: Vec<Value> = state
        .cart
        .iter()
        .filter(|e| e["userId"] == user.uid.as_str())
        .cloned()
        .collect();
    Json(entries).into_response()
}

async fn add_to_cart(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = record(&state, "POST /cart".to_string()).await;
    let Some(user) = state.user(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let id = state.next_id("cart");
    let item = state
        .listings
        .iter()
        .find(|l| l["item"]["id"] == body["itemId"])
        .map(|l| l["item"].clone())
        .unwrap_or(Value::Null);
    state.cart.push(json!({
        "id": id,
        "userId": user.uid,
        "itemId": body["itemId"],
        "merchantId": body["merchantId"],
        "quantity": body["quantity"],
        "item": item,
    }));
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn update_cart(
    State(state): State<Shared>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = record(&state, format!("PUT /cart/{id}")).await;
    let refused = state.failing_cart_entries.get(&id).copied();
    match state.cart.iter_mut().find(|e| e["id"] == id.as_str()) {
        Some(entry) if refused.is_some() => {
            entry["quantity"] = json!(refused);
            error(StatusCode::BAD_REQUEST, "Stok tidak mencukupi")
        }
        Some(entry) => {
            entry["quantity"] = body["quantity"].clone();
            Json(json!({ "message": "ok" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Cart entry not found"),
    }
}

async fn remove_cart(State(state): State<Shared>, Path(id): Path<String>) -> Response {
    let mut state = record(&state, format!("DELETE /cart/{id}")).await;
    let before = state.cart.len();
    state.cart.retain(|e| e["id"] != id.as_str());
    if state.cart.len() == before {
        return error(StatusCode::NOT_FOUND, "Cart entry not found");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn orders(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
) -> Response {
    let state = record(&state, "GET /order".to_string()).await;
    let Some(user) = state.user(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let all = query.get("all").is_some_and(|v| v == "true");
    if all && user.role != "owner" {
        return error(StatusCode::FORBIDDEN, "Owner only");
    }
    let rows: Vec<Value> = state
        .orders
        .iter()
        .filter(|o| all || o["userId"] == user.uid.as_str())
        .cloned()
        .collect();
    Json(rows).into_response()
}

async fn create_order(
    State(state): State<Shared>,
    headers: HeaderMap,
    multipart: Multipart,
) -> Response {
    let fields = text_fields(multipart).await;
    let mut state = record(&state, "POST /order".to_string()).await;
    let Some(user) = state.user(&headers) else {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    };
    let field = |name: &str| fields.get(name).cloned().unwrap_or_default();
    let item_id = field("itemId");
    if state.failing_items.contains(&item_id) {
        return error(StatusCode::BAD_REQUEST, "Stok tidak mencukupi");
    }

    let status = if field("paymentMethod") == "digital" {
        "konfirmasi pembayaran"
    } else {
        "pending"
    };
    let id = state.next_id("order");
    state.orders.push(json!({
        "id": id,
        "userId": user.uid,
        "userName": user.name,
        "itemId": item_id,
        "merchantId": field("merchantId"),
        "quantity": field("quantity"),
        "totalPrice": field("totalPrice").parse::<i64>().unwrap_or_default(),
        "deliveryMethod": field("deliveryMethod"),
        "paymentMethod": field("paymentMethod"),
        "address": fields.get("address"),
        "paymentProof": fields.get("paymentProof"),
        "status": status,
    }));
    (StatusCode::CREATED, Json(json!({ "id": id }))).into_response()
}

async fn update_status(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> Response {
    let mut state = record(&state, format!("PUT /order/{id}/status")).await;
    if state.user(&headers).is_none() {
        return error(StatusCode::UNAUTHORIZED, "Unauthorized");
    }
    match state.orders.iter_mut().find(|o| o["id"] == id.as_str()) {
        Some(order) => {
            order["status"] = body["status"].clone();
            Json(json!({ "message": "ok" })).into_response()
        }
        None => error(StatusCode::NOT_FOUND, "Order not found"),
    }
}

async fn merchant_orders(State(state): State<Shared>) -> Response {
    let _state = record(&state, "GET /merchant/orders".to_string()).await;
    Json(json!([])).into_response()
}
