//! In-process HTTP tests: the router is driven with `oneshot`, no socket.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::{TimeZone, Utc};
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use bazaar_core::{ActingUser, Role, SellableUnit, Store};
use bazaar_db::{Database, DbConfig};
use bazaar_sales::{EngineConfig, FixedClock, SaleEngine};

use crate::{router, ApiConfig, AppState};

struct TestApp {
    state: AppState,
    store: Store,
    unit: SellableUnit,
    _dir: TempDir,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("api.db")))
            .await
            .unwrap();

        let store = add_store(&db, "Acme Store").await;
        let unit = add_unit(&db, &store.id, 5000, 3).await;

        TestApp {
            state: AppState::new(db, &ApiConfig::default()),
            store,
            unit,
            _dir: dir,
        }
    }

    fn app(&self) -> Router {
        router(self.state.clone())
    }

    fn token_for(&self, role: Role, store_id: Option<&str>) -> String {
        let user = ActingUser {
            user_id: "user-1".to_string(),
            role,
            store_id: store_id.map(str::to_string),
        };
        self.state.jwt.issue(&user).unwrap()
    }

    fn cashier_token(&self) -> String {
        self.token_for(Role::Cashier, Some(&self.store.id))
    }
}

async fn add_store(db: &Database, name: &str) -> Store {
    let store = Store {
        id: uuid::Uuid::new_v4().to_string(),
        name: name.to_string(),
        is_active: true,
        created_at: Utc::now(),
    };
    db.stores().insert(&store).await.unwrap();
    store
}

async fn add_unit(db: &Database, store_id: &str, price_cents: i64, qty: i64) -> SellableUnit {
    let id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now();
    let unit = SellableUnit {
        sku: format!("SKU-{}", &id[..8]),
        id,
        store_id: store_id.to_string(),
        parent_product_id: None,
        name: "Product A".to_string(),
        variant_label: None,
        price_cents,
        quantity_on_hand: qty,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.catalog().insert(&unit).await.unwrap();
    unit
}

fn post_sale(token: Option<&str>, body: String) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/v1/sales")
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::empty()).unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

#[tokio::test]
async fn test_health() {
    let t = TestApp::new().await;
    let (status, body) = send(t.app(), get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "serving");
    assert_eq!(body["database"], true);
}

#[tokio::test]
async fn test_create_sale_returns_201_with_receipt() {
    let t = TestApp::new().await;
    let body = json!({ "items": [{ "unit_id": t.unit.id, "quantity": 2 }] });

    let (status, body) = send(
        t.app(),
        post_sale(Some(&t.cashier_token()), body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert!(body["invoice_number"].as_str().unwrap().starts_with("ACM-"));
    assert!(body["invoice_number"].as_str().unwrap().ends_with("-0001"));
    assert_eq!(body["grand_total_cents"], 10000);
    assert_eq!(body["items"].as_array().unwrap().len(), 1);

    let remaining = t.state.db.catalog().quantity_on_hand(&t.unit.id).await.unwrap();
    assert_eq!(remaining, Some(1));
}

#[tokio::test]
async fn test_missing_token_is_401() {
    let t = TestApp::new().await;
    let body = json!({ "items": [{ "unit_id": t.unit.id, "quantity": 1 }] });

    let (status, body) = send(t.app(), post_sale(None, body.to_string())).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_garbage_token_is_401() {
    let t = TestApp::new().await;
    let body = json!({ "items": [{ "unit_id": t.unit.id, "quantity": 1 }] });

    let (status, _) = send(t.app(), post_sale(Some("not.a.jwt"), body.to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_stock_shortage_is_422_with_details() {
    let t = TestApp::new().await;
    let body = json!({ "items": [{ "unit_id": t.unit.id, "quantity": 5 }] });

    let (status, body) = send(
        t.app(),
        post_sale(Some(&t.cashier_token()), body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "STOCK_UNAVAILABLE");
    assert_eq!(
        body["message"],
        "Insufficient stock for Product A: available 3, requested 5"
    );
    assert_eq!(body["details"][0]["unit_id"], t.unit.id.as_str());
    assert_eq!(body["details"][0]["available"], 3);
    assert_eq!(body["details"][0]["requested"], 5);
}

#[tokio::test]
async fn test_malformed_json_is_422() {
    let t = TestApp::new().await;

    let (status, body) = send(
        t.app(),
        post_sale(Some(&t.cashier_token()), "{ not json".to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["code"], "VALIDATION_FAILED");
}

#[tokio::test]
async fn test_unknown_unit_is_404() {
    let t = TestApp::new().await;
    let body = json!({ "items": [{ "unit_id": "no-such-unit", "quantity": 1 }] });

    let (status, body) = send(
        t.app(),
        post_sale(Some(&t.cashier_token()), body.to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "PRODUCT_NOT_FOUND_IN_STORE");
}

#[tokio::test]
async fn test_get_sale_is_store_scoped() {
    let t = TestApp::new().await;
    let other = add_store(&t.state.db, "Bolt Mart").await;
    let body = json!({ "items": [{ "unit_id": t.unit.id, "quantity": 1 }] });

    let (_, created) = send(
        t.app(),
        post_sale(Some(&t.cashier_token()), body.to_string()),
    )
    .await;
    let uri = format!("/api/v1/sales/{}", created["id"].as_str().unwrap());

    let (status, body) = send(t.app(), get(&uri, Some(&t.cashier_token()))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["invoice_number"], created["invoice_number"]);

    let outsider = t.token_for(Role::Manager, Some(&other.id));
    let (status, body) = send(t.app(), get(&uri, Some(&outsider))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "SALE_NOT_FOUND");

    let admin = t.token_for(Role::Admin, None);
    let (status, _) = send(t.app(), get(&uri, Some(&admin))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_invoice_uses_engine_clock() {
    let t = TestApp::new().await;
    let at = Utc.with_ymd_and_hms(2024, 3, 9, 23, 59, 0).unwrap();
    let engine = SaleEngine::new(t.state.db.clone(), EngineConfig::default())
        .with_clock(Arc::new(FixedClock::new(at)));
    let app = router(t.state.clone().with_engine(engine));
    let body = json!({ "items": [{ "unit_id": t.unit.id, "quantity": 1 }] });

    let (status, body) = send(app, post_sale(Some(&t.cashier_token()), body.to_string())).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["invoice_number"], "ACM-240309-0001");
    assert_eq!(body["sale_date"], "2024-03-09");
}
