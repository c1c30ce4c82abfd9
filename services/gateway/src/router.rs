use crate::handlers::{assets, categories, portfolio, tenants};
use crate::state::AppState;
use axum::{
    routing::{delete, get, post, put},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/tenants", post(tenants::register_tenant))
        .route(
            "/assets",
            get(assets::list_assets).post(assets::create_asset),
        )
        .route("/assets/archived", get(assets::archived_assets))
        .route(
            "/assets/{id}",
            put(assets::update_asset).delete(assets::archive_asset),
        )
        .route("/assets/{id}/restore", post(assets::restore_asset))
        .route("/assets/{id}/history", get(assets::asset_history))
        .route(
            "/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route("/categories/{id}", delete(categories::delete_category))
        .route("/portfolio", get(portfolio::get_portfolio));

    Router::new()
        .nest("/v1", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tenant::TENANT_HEADER;
    use axum::body::{to_bytes, Body};
    use axum::http::{header, Method, Request, StatusCode};
    use ledger::store::LedgerStore;
    use serde_json::{json, Value};
    use tower::util::ServiceExt;

    fn app() -> Router {
        create_router(AppState::new(LedgerStore::in_memory()))
    }

    fn request(
        method: Method,
        uri: &str,
        tenant: Option<&str>,
        body: Option<Value>,
    ) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(tenant) = tenant {
            builder = builder.header(TENANT_HEADER, tenant);
        }
        match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    async fn register_tenant(app: &Router) -> String {
        let (status, body) = send(app, request(Method::POST, "/v1/tenants", None, None)).await;
        assert_eq!(status, StatusCode::CREATED);
        body["tenant_id"].as_str().unwrap().to_string()
    }

    async fn create_asset(app: &Router, tenant: &str, name: &str, price: &str) -> String {
        let (status, body) = send(
            app,
            request(
                Method::POST,
                "/v1/assets",
                Some(tenant),
                Some(json!({
                    "name": name,
                    "purchase_price": price,
                    "purchase_date": 1_708_123_456_789_000_000i64,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED, "create failed: {}", body);
        body["asset_id"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    async fn test_register_seeds_default_profile() {
        let app = app();
        let (status, body) = send(&app, request(Method::POST, "/v1/tenants", None, None)).await;

        assert_eq!(status, StatusCode::CREATED);
        assert!(body["tenant_id"].is_string());
        let categories = body["categories"].as_array().unwrap();
        assert_eq!(categories.len(), 10);
        assert!(categories
            .iter()
            .any(|c| c["name"] == "Watches" && c["base_risk_score"] == 3));
    }

    #[tokio::test]
    async fn test_missing_tenant_header_is_unauthorized() {
        let app = app();
        let (status, body) = send(&app, request(Method::GET, "/v1/assets", None, None)).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "UNAUTHORIZED");
    }

    #[tokio::test]
    async fn test_unregistered_tenant_reads_as_not_found() {
        let app = app();
        let unknown = types::ids::TenantId::new().to_string();
        let (status, body) =
            send(&app, request(Method::GET, "/v1/assets", Some(&unknown), None)).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_create_and_list_assets_with_risk() {
        let app = app();
        let tenant = register_tenant(&app).await;
        create_asset(&app, &tenant, "Rolex Submariner", "8500").await;

        let (status, body) =
            send(&app, request(Method::GET, "/v1/assets", Some(&tenant), None)).await;
        assert_eq!(status, StatusCode::OK);

        let views = body.as_array().unwrap();
        assert_eq!(views.len(), 1);
        assert_eq!(views[0]["asset"]["name"], "Rolex Submariner");
        assert_eq!(views[0]["asset"]["current_value"], "8500");
        assert_eq!(views[0]["asset"]["status"], "ACTIVE");
        // Uncategorised, fresh, sole asset: 0.4*5 + 0.2*10 = 4.0, Medium.
        assert_eq!(views[0]["risk"]["score"], "4.0");
        assert_eq!(views[0]["risk"]["band"], "Medium");
    }

    #[tokio::test]
    async fn test_revaluation_appends_history_newest_first() {
        let app = app();
        let tenant = register_tenant(&app).await;
        let asset_id = create_asset(&app, &tenant, "Rolex Submariner", "8500").await;

        let (status, body) = send(
            &app,
            request(
                Method::PUT,
                &format!("/v1/assets/{}", asset_id),
                Some(&tenant),
                Some(json!({
                    "name": "Rolex Submariner",
                    "current_value": "14500",
                    "note": "Year-End Audit",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["current_value"], "14500");

        let (status, body) = send(
            &app,
            request(
                Method::GET,
                &format!("/v1/assets/{}/history", asset_id),
                Some(&tenant),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let history = body.as_array().unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0]["kind"], "Revalued");
        assert_eq!(history[0]["old_value"], "8500");
        assert_eq!(history[0]["new_value"], "14500");
        assert_eq!(history[0]["delta"], "6000");
        assert_eq!(history[0]["note"], "Year-End Audit");
        assert_eq!(history[1]["kind"], "Created");
        assert_eq!(history[1]["old_value"], "0");
    }

    #[tokio::test]
    async fn test_metadata_edit_leaves_history_alone() {
        let app = app();
        let tenant = register_tenant(&app).await;
        let asset_id = create_asset(&app, &tenant, "Rolex Submariner", "8500").await;

        let (status, _) = send(
            &app,
            request(
                Method::PUT,
                &format!("/v1/assets/{}", asset_id),
                Some(&tenant),
                Some(json!({
                    "name": "Rolex Submariner (serviced)",
                    "current_value": "8500",
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, body) = send(
            &app,
            request(
                Method::GET,
                &format!("/v1/assets/{}/history", asset_id),
                Some(&tenant),
                None,
            ),
        )
        .await;
        assert_eq!(body.as_array().unwrap().len(), 1, "only the genesis event");
    }

    #[tokio::test]
    async fn test_archive_and_restore_lifecycle() {
        let app = app();
        let tenant = register_tenant(&app).await;
        let asset_id = create_asset(&app, &tenant, "Chateau Margaux 2015", "500").await;

        let (status, body) = send(
            &app,
            request(
                Method::DELETE,
                &format!("/v1/assets/{}", asset_id),
                Some(&tenant),
                Some(json!({"reason": "Sold at Auction"})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ARCHIVED");

        // Gone from active views, present in the archive.
        let (_, active) =
            send(&app, request(Method::GET, "/v1/assets", Some(&tenant), None)).await;
        assert!(active.as_array().unwrap().is_empty());

        let (_, archived) = send(
            &app,
            request(Method::GET, "/v1/assets/archived", Some(&tenant), None),
        )
        .await;
        assert_eq!(archived.as_array().unwrap().len(), 1);

        // Double archive conflicts.
        let (status, body) = send(
            &app,
            request(
                Method::DELETE,
                &format!("/v1/assets/{}", asset_id),
                Some(&tenant),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"], "CONFLICT");

        // Restore brings it back with the full trail intact.
        let (status, body) = send(
            &app,
            request(
                Method::POST,
                &format!("/v1/assets/{}/restore", asset_id),
                Some(&tenant),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ACTIVE");

        let (_, history) = send(
            &app,
            request(
                Method::GET,
                &format!("/v1/assets/{}/history", asset_id),
                Some(&tenant),
                None,
            ),
        )
        .await;
        let history = history.as_array().unwrap();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0]["kind"], "Restored");
        assert_eq!(history[1]["kind"], "Archived");
        assert_eq!(history[1]["note"], "Asset Archived: Sold at Auction");
        assert_eq!(history[2]["kind"], "Created");
    }

    #[tokio::test]
    async fn test_cross_tenant_access_reads_as_not_found() {
        let app = app();
        let tenant_a = register_tenant(&app).await;
        let tenant_b = register_tenant(&app).await;
        let asset_id = create_asset(&app, &tenant_a, "Bored Ape NFT #8817", "120000").await;

        let (status, _) = send(
            &app,
            request(
                Method::GET,
                &format!("/v1/assets/{}/history", asset_id),
                Some(&tenant_b),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(
            &app,
            request(
                Method::DELETE,
                &format!("/v1/assets/{}", asset_id),
                Some(&tenant_b),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Tenant A still sees its asset untouched.
        let (_, active) = send(
            &app,
            request(Method::GET, "/v1/assets", Some(&tenant_a), None),
        )
        .await;
        assert_eq!(active.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_category_lifecycle_detaches_assets() {
        let app = app();
        let tenant = register_tenant(&app).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/v1/categories",
                Some(&tenant),
                Some(json!({"name": "Vintage Synths", "base_risk_score": 6})),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let category_id = body["category_id"].as_str().unwrap().to_string();

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/v1/assets",
                Some(&tenant),
                Some(json!({
                    "name": "Yamaha CS-80",
                    "category_id": category_id,
                    "purchase_price": "40000",
                    "purchase_date": 1_708_123_456_789_000_000i64,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let asset_id = body["asset_id"].as_str().unwrap().to_string();
        assert_eq!(body["category_id"], category_id.as_str());

        let (status, _) = send(
            &app,
            request(
                Method::DELETE,
                &format!("/v1/categories/{}", category_id),
                Some(&tenant),
                None,
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (_, categories) = send(
            &app,
            request(Method::GET, "/v1/categories", Some(&tenant), None),
        )
        .await;
        assert_eq!(categories.as_array().unwrap().len(), 10);

        let (_, assets) =
            send(&app, request(Method::GET, "/v1/assets", Some(&tenant), None)).await;
        let assets = assets.as_array().unwrap();
        assert_eq!(assets[0]["asset"]["asset_id"], asset_id.as_str());
        assert!(assets[0]["asset"]["category_id"].is_null());
    }

    #[tokio::test]
    async fn test_portfolio_totals_over_active_assets() {
        let app = app();
        let tenant = register_tenant(&app).await;
        create_asset(&app, &tenant, "Rolex Submariner", "8500").await;
        let wine = create_asset(&app, &tenant, "Chateau Margaux 2015", "500").await;
        send(
            &app,
            request(
                Method::DELETE,
                &format!("/v1/assets/{}", wine),
                Some(&tenant),
                None,
            ),
        )
        .await;

        let (status, body) = send(
            &app,
            request(Method::GET, "/v1/portfolio", Some(&tenant), None),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["summary"]["asset_count"], 1);
        assert_eq!(body["summary"]["total_cost"], "8500");
        assert_eq!(body["summary"]["total_value"], "8500");
        assert_eq!(body["summary"]["unrealized_gain"], "0");

        let lines = body["assets"].as_array().unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0]["name"], "Rolex Submariner");
        assert!(lines[0]["factors"].as_str().unwrap().starts_with("Class:"));
    }

    #[tokio::test]
    async fn test_negative_purchase_price_never_reaches_the_store() {
        let app = app();
        let tenant = register_tenant(&app).await;

        // The Money decode rejects the sign, so the body fails
        // extraction before any handler runs.
        let response = app
            .clone()
            .oneshot(request(
                Method::POST,
                "/v1/assets",
                Some(&tenant),
                Some(json!({
                    "name": "Bored Ape NFT #8817",
                    "purchase_price": "-5000",
                    "purchase_date": 0,
                })),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let (_, active) =
            send(&app, request(Method::GET, "/v1/assets", Some(&tenant), None)).await;
        assert!(active.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_asset_name_is_bad_request() {
        let app = app();
        let tenant = register_tenant(&app).await;

        let (status, body) = send(
            &app,
            request(
                Method::POST,
                "/v1/assets",
                Some(&tenant),
                Some(json!({
                    "name": "   ",
                    "purchase_price": "100",
                    "purchase_date": 0,
                })),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "BAD_REQUEST");
    }
}
