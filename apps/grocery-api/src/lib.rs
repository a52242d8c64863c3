//! # Grocery API
//!
//! HTTP/JSON server for the browser till.
//!
//! ## Route Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                          Grocery API Routes                             │
//! │                                                                         │
//! │  GET  /health                         liveness + database ping          │
//! │                                                                         │
//! │  /login        register, logindata, reset-password                      │
//! │  /product      add-product, get-products, update-product, delete-...    │
//! │  /Product      (same routes, legacy casing used by older tills)         │
//! │  /dailybill    save-bill, bill/{id}, by-date/{date}, counter/{prefix}   │
//! │  /DailyBill    (same routes, legacy casing)                             │
//! │                                                                         │
//! │  Layers: TraceLayer (request spans) → CorsLayer (browser origin)        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use axum::extract::State;
use axum::http::header::CONTENT_TYPE;
use axum::http::Method;
use axum::routing::get;
use axum::Router;
use tokio::signal;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use error::{ApiError, ErrorCode};
use state::AppState;

/// Builds the full application router.
pub fn app(state: AppState) -> Router {
    let origin = match &state.config.cors_origin {
        Some(origin) => AllowOrigin::exact(origin.clone()),
        None => AllowOrigin::from(Any),
    };

    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/health", get(health))
        .nest("/login", routes::auth::router())
        .nest("/product", routes::product::router())
        .nest("/Product", routes::product::router())
        .nest("/dailybill", routes::bill::router())
        .nest("/DailyBill", routes::bill::router())
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// `OK` while the database answers, 503 otherwise.
async fn health(State(state): State<AppState>) -> Result<&'static str, ApiError> {
    if state.db.health_check().await {
        Ok("OK")
    } else {
        Err(ApiError::new(
            ErrorCode::ServiceUnavailable,
            "Database unavailable",
        ))
    }
}

/// Resolves on Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown...");
}

// =============================================================================
// HTTP Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::NaiveDate;
    use grocery_core::{BillNumber, Money};
    use grocery_db::{BillRepository, Database, DbConfig};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::ApiConfig;

    async fn test_app() -> (Router, Database) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let state = AppState::new(db.clone(), ApiConfig::default());
        (app(state), db)
    }

    async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    fn checkout(date: &str) -> Value {
        json!({
            "billNumber": "ignored-by-server",
            "date": date,
            "items": [
                { "productCode": "RICE-5KG", "productName": "Basmati Rice", "price": 10.5, "quantity": 2, "total": 21 },
                { "productCode": "MILK-1L", "productName": "Milk", "price": "2.25", "quantity": "1.5", "total": 3.375 }
            ],
            "totalAmount": 24.38
        })
    }

    #[tokio::test]
    async fn test_health() {
        let (app, db) = test_app().await;

        let response = app
            .clone()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");

        db.close().await;
        let (status, body) = send(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_save_bill_issues_sequential_ids() {
        let (app, _db) = test_app().await;

        let (status, body) = send(&app, Method::POST, "/dailybill/save-bill", Some(checkout("2025-06-15"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Bill saved successfully");
        assert_eq!(body["billId"], "2506-000001");

        // Legacy casing and field names
        let legacy = json!({
            "date": "2025-06-20T09:30:00.000Z",
            "billItems": [{ "productCode": "SUGAR-1KG" }],
            "totalBill": "3.10"
        });
        let (status, body) = send(&app, Method::POST, "/DailyBill/save-bill", Some(legacy)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["billId"], "2506-000002");

        let (status, body) = send(&app, Method::POST, "/dailybill/save-bill", Some(checkout("2025-07-01"))).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["billId"], "2507-000001");

        let (_, body) = send(&app, Method::GET, "/dailybill/counter/2506", None).await;
        assert_eq!(body["prefix"], "2506");
        assert_eq!(body["lastNumber"], 2);
    }

    #[tokio::test]
    async fn test_save_bill_rejects_bad_input() {
        let (app, _db) = test_app().await;

        let empty = json!({ "date": "2025-06-15", "items": [], "totalAmount": 0 });
        let (status, body) = send(&app, Method::POST, "/dailybill/save-bill", Some(empty)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["message"], "items must contain at least one entry");

        let negative = json!({ "date": "2025-06-15", "items": [{ "productCode": "A" }], "totalAmount": -1 });
        let (status, _) = send(&app, Method::POST, "/dailybill/save-bill", Some(negative)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let no_date = json!({ "items": [{ "productCode": "A" }], "totalAmount": 1 });
        let (status, _) = send(&app, Method::POST, "/dailybill/save-bill", Some(no_date)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let request = Request::builder()
            .method(Method::POST)
            .uri("/dailybill/save-bill")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app.clone().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        // Nothing was numbered
        let (_, body) = send(&app, Method::GET, "/dailybill/counter/2506", None).await;
        assert_eq!(body["lastNumber"], 0);
    }

    #[tokio::test]
    async fn test_save_bill_ignores_line_arithmetic() {
        let (app, _db) = test_app().await;

        let weighed = json!({
            "date": "2025-06-15",
            "items": [
                { "productCode": "SAFFRON", "productName": "Saffron", "price": 2500, "quantity": 0.004, "total": 10 },
                { "productCode": "LOOSE-TEA", "price": "", "quantity": "0.125" }
            ],
            "totalAmount": 10
        });
        let (status, body) = send(&app, Method::POST, "/dailybill/save-bill", Some(weighed)).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["billId"], "2506-000001");

        let (_, body) = send(&app, Method::GET, "/dailybill/bill/2506-000001", None).await;
        assert_eq!(body["productCodes"], json!(["SAFFRON", "LOOSE-TEA"]));
        assert_eq!(body["totalAmount"], "10.00");
    }

    #[tokio::test]
    async fn test_save_bill_conflict_after_retry_fails() {
        let (app, db) = test_app().await;

        // A bill row the counter doesn't know about
        {
            let mut conn = db.pool().acquire().await.unwrap();
            let stray: BillNumber = "2506-000001".parse().unwrap();
            BillRepository::insert(
                &mut conn,
                &stray,
                NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
                &["STRAY".to_string()],
                Money::from_cents(100),
            )
            .await
            .unwrap();
        }

        let (status, body) = send(&app, Method::POST, "/dailybill/save-bill", Some(checkout("2025-06-15"))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["code"], "INTERNAL");

        // Both attempts rolled back
        let (_, body) = send(&app, Method::GET, "/dailybill/counter/2506", None).await;
        assert_eq!(body["lastNumber"], 0);
        assert_eq!(db.bills().count_for_prefix("2506").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_bill_lookup() {
        let (app, _db) = test_app().await;
        send(&app, Method::POST, "/dailybill/save-bill", Some(checkout("2025-06-15"))).await;
        send(&app, Method::POST, "/dailybill/save-bill", Some(checkout("2025-06-15"))).await;

        let (status, body) = send(&app, Method::GET, "/dailybill/bill/2506-000001", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["billId"], "2506-000001");
        assert_eq!(body["date"], "2025-06-15");
        assert_eq!(body["productCodes"], json!(["RICE-5KG", "MILK-1L"]));
        assert_eq!(body["totalAmount"], "24.38");

        let (status, _) = send(&app, Method::GET, "/dailybill/bill/2506-000099", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::GET, "/dailybill/bill/not-a-bill", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/dailybill/by-date/2025-06-15", None).await;
        assert_eq!(status, StatusCode::OK);
        let ids: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|b| b["billId"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec!["2506-000001", "2506-000002"]);

        let (status, _) = send(&app, Method::GET, "/dailybill/counter/25-6", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_product_crud() {
        let (app, _db) = test_app().await;

        let new_product = json!({
            "productCode": "RICE-5KG",
            "productName": "Basmati Rice",
            "price": 10.5,
            "productQty": "20"
        });
        let (status, body) = send(&app, Method::POST, "/product/add-product", Some(new_product.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["productCode"], "RICE-5KG");
        assert_eq!(body["price"], "10.50");
        assert_eq!(body["productQty"], "20.00");

        let (status, body) = send(&app, Method::POST, "/product/add-product", Some(new_product)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let no_price = json!({ "productCode": "MILK-1L", "productName": "Milk" });
        let (status, _) = send(&app, Method::POST, "/product/add-product", Some(no_price)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(&app, Method::GET, "/Product/get-products", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);
        assert_eq!(body[0]["pid"], "RICE-5KG");

        let update = json!({ "price": "11", "productQty": 5 });
        let (status, body) = send(&app, Method::PUT, "/product/update-product/RICE-5KG", Some(update.clone())).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["price"], "11.00");
        assert_eq!(body["productQty"], "5.00");

        let (status, _) = send(&app, Method::PUT, "/product/update-product/NOPE", Some(update)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = send(&app, Method::DELETE, "/product/delete-product/RICE-5KG", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "Product deleted successfully");

        let (status, _) = send(&app, Method::DELETE, "/product/delete-product/RICE-5KG", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_register_and_login() {
        let (app, _db) = test_app().await;

        let account = json!({ "email": "cashier@shop.lk", "password": "secret1", "jobrole": "cashier" });
        let (status, body) = send(&app, Method::POST, "/login/register", Some(account.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["message"], "Registration successful");

        let (status, body) = send(&app, Method::POST, "/login/register", Some(account)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["message"], "Email already registered");

        let login = json!({ "email": "cashier@shop.lk", "password": "secret1" });
        let (status, body) = send(&app, Method::POST, "/login/logindata", Some(login)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["user"]["email"], "cashier@shop.lk");
        assert_eq!(body["user"]["jobrole"], "cashier");
        assert!(body["user"].get("password_hash").is_none());

        let wrong = json!({ "email": "cashier@shop.lk", "password": "secret2" });
        let (status, body) = send(&app, Method::POST, "/login/logindata", Some(wrong)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["message"], "Invalid email or password");

        let reset = json!({ "email": "cashier@shop.lk", "newPassword": "secret2" });
        let (status, _) = send(&app, Method::POST, "/login/reset-password", Some(reset)).await;
        assert_eq!(status, StatusCode::OK);

        let login = json!({ "email": "cashier@shop.lk", "password": "secret2" });
        let (status, _) = send(&app, Method::POST, "/login/logindata", Some(login)).await;
        assert_eq!(status, StatusCode::OK);

        let unknown = json!({ "email": "ghost@shop.lk", "newPassword": "secret3" });
        let (status, _) = send(&app, Method::POST, "/login/reset-password", Some(unknown)).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
