//! HTTP 层集成测试
//!
//! 认证中间件、错误码映射和一次完整的命令往返。

use atelier_server::db::DbService;
use atelier_server::{Config, ServerState, routes};
use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode, header};
use shared::order::{Order, OrderStatus};
use shared::role::{Role, Viewer};
use tower::ServiceExt;

async fn test_app() -> (Router, ServerState) {
    let db = DbService::memory().await.expect("in-memory db");
    let state = ServerState::with_db(Config::with_overrides("/tmp/atelier-test", 0), db);
    let app = routes::build_app(&state).with_state(state.clone());
    (app, state)
}

fn bearer(state: &ServerState, viewer: &Viewer) -> String {
    let token = state
        .get_jwt_service()
        .issue(viewer)
        .expect("token issuance");
    format!("Bearer {token}")
}

fn draft_body() -> String {
    serde_json::json!({
        "client": "Acme",
        "initial_product": "Steel",
        "initial_quantity": 10,
        "submitter": "Mohamed",
        "machine_name": "CNC"
    })
    .to_string()
}

async fn json_body<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("body");
    serde_json::from_slice(&bytes).expect("json body")
}

#[tokio::test]
async fn health_is_public() {
    let (app, _state) = test_app().await;
    let response = app
        .oneshot(Request::get("/api/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn api_routes_require_a_viewer_identity() {
    let (app, _state) = test_app().await;

    let response = app
        .clone()
        .oneshot(Request::get("/api/orders").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app
        .oneshot(
            Request::get("/api/orders")
                .header(header::AUTHORIZATION, "Bearer not-a-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_and_list_round_trip() {
    let (app, state) = test_app().await;
    let auth = bearer(&state, &Viewer::new("rouiba-1", "Mohamed", Role::Originator));

    let response = app
        .clone()
        .oneshot(
            Request::post("/api/orders")
                .header(header::AUTHORIZATION, &auth)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(draft_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let created: Order = json_body(response).await;
    assert_eq!(created.status, OrderStatus::Pending);
    assert_eq!(created.order_number, "CMD-0001");

    let response = app
        .oneshot(
            Request::get("/api/orders")
                .header(header::AUTHORIZATION, &auth)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let orders: Vec<Order> = json_body(response).await;
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0].order_number, "CMD-0001");
}

#[tokio::test]
async fn error_taxonomy_maps_to_status_codes() {
    let (app, state) = test_app().await;
    let originator = bearer(&state, &Viewer::new("rouiba-1", "Mohamed", Role::Originator));
    let operator = bearer(&state, &Viewer::new("hangar-1", "Islam", Role::Operator));

    // Validation error -> 400
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/orders")
                .header(header::AUTHORIZATION, &originator)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({
                        "client": "",
                        "initial_product": "Steel",
                        "initial_quantity": 10,
                        "submitter": "Mohamed",
                        "machine_name": "CNC"
                    })
                    .to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Seed one order for the transition cases
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/orders")
                .header(header::AUTHORIZATION, &originator)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(draft_body()))
                .unwrap(),
        )
        .await
        .unwrap();
    let created: Order = json_body(response).await;

    // Illegal transition -> 422
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/orders/{}/transition", created.id))
                .header(header::AUTHORIZATION, &operator)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"status": "fini"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Role policy -> 403
    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/api/orders/{}/transition", created.id))
                .header(header::AUTHORIZATION, &operator)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(
                    serde_json::json!({"status": "accepted"}).to_string(),
                ))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // Unknown order -> 404
    let response = app
        .oneshot(
            Request::get("/api/orders/order:missing")
                .header(header::AUTHORIZATION, &originator)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
