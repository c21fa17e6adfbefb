#![cfg(feature = "server")]

use axum::body::Body;
use axum::http::{header, Request, Response, StatusCode};
use axum::Router;
use debt_ledger::{open_store, web, Config, LedgerStore};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

struct TestApp {
    _dir: TempDir,
    store: Arc<dyn LedgerStore>,
    router: Router,
}

impl TestApp {
    async fn spawn() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::sqlite(dir.path().join("ledger.db"));
        let store = open_store(&config).await.unwrap();
        let router = web::router(store.clone());
        TestApp {
            _dir: dir,
            store,
            router,
        }
    }

    async fn get(&self, uri: &str) -> Response<Body> {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    async fn post_form(&self, uri: &str, body: &str) -> Response<Body> {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body.to_string()))
            .unwrap();
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Alice=1, Bob=2; Alice -> Bob 100 on 2024-01-01, Bob -> Alice 30 on 2024-01-02.
    async fn seed_alice_and_bob(&self) {
        for name in ["Alice", "Bob"] {
            let response = self.post_form("/add_account", &format!("account_name={}", name)).await;
            assert_eq!(location(&response), "/");
        }
        for body in [
            "date=2024-01-01&from_account=1&to_account=2&amount=100&remark=dinner",
            "date=2024-01-02&from_account=2&to_account=1&amount=30&remark=taxi",
        ] {
            let response = self.post_form("/add_transaction", body).await;
            assert_eq!(location(&response), "/");
        }
    }
}

fn location(response: &Response<Body>) -> String {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    response.headers()[header::LOCATION].to_str().unwrap().to_string()
}

async fn body_text(response: Response<Body>) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let app = TestApp::spawn().await;
    let response = app.get("/api/health").await;
    assert_eq!(response.status(), StatusCode::OK);

    let json: serde_json::Value = serde_json::from_str(&body_text(response).await).unwrap();
    assert_eq!(json, serde_json::json!({"success": true, "data": "OK"}));
}

#[tokio::test]
async fn test_dashboard_shows_debt_summary() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = body_text(response).await;

    assert!(html.contains("Alice"));
    assert!(html.contains("dinner"));

    let (_, debts) = html.split_once("Debt summary").unwrap();
    assert!(debts.contains(r#"<td>Alice</td><td>Bob</td><td class="amount">70.00</td>"#));
    assert!(!debts.contains(r#"<td>Bob</td><td>Alice</td>"#));
}

#[tokio::test]
async fn test_dashboard_filter_keeps_dates() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let html = body_text(app.post_form("/", "start_date=2024-01-02&end_date=2024-01-31").await).await;
    assert!(html.contains(r#"value="2024-01-02""#));
    assert!(html.contains("taxi"));
    assert!(!html.contains("dinner"));
    // debt summary is not date-filtered
    assert!(html.contains("70.00"));
}

#[tokio::test]
async fn test_empty_account_name_is_rejected() {
    let app = TestApp::spawn().await;

    let response = app.post_form("/add_account", "account_name=+++").await;
    assert!(location(&response).starts_with("/?error="));
    assert!(app.store.list_accounts().await.unwrap().is_empty());

    let response = app.post_form("/add_account", "").await;
    assert!(location(&response).starts_with("/?error="));
}

#[tokio::test]
async fn test_transaction_with_unknown_account_is_rejected() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let response = app
        .post_form("/add_transaction", "date=2024-01-03&from_account=1&to_account=99&amount=5&remark=")
        .await;
    let target = location(&response);
    assert!(target.starts_with("/?error="));
    assert_eq!(app.store.list_transactions(None).await.unwrap().len(), 2);

    let html = body_text(app.get(&target).await).await;
    assert!(html.contains("account 99 does not exist"));
}

#[tokio::test]
async fn test_non_numeric_amount_is_rejected() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let response = app
        .post_form("/add_transaction", "date=2024-01-03&from_account=1&to_account=2&amount=lots&remark=")
        .await;
    assert!(location(&response).starts_with("/?error="));
    assert_eq!(app.store.list_transactions(None).await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_repeated_scalar_field_is_rejected() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let response = app
        .post_form(
            "/add_transaction",
            "date=2024-01-03&from_account=1&to_account=2&amount=5&amount=6&remark=",
        )
        .await;
    assert!(location(&response).starts_with("/?error="));
    assert_eq!(app.store.list_transactions(None).await.unwrap().len(), 2);

    let response = app.post_form("/add_account", "account_name=Carol&account_name=Dave").await;
    assert!(location(&response).starts_with("/?error="));
    assert_eq!(app.store.list_accounts().await.unwrap().len(), 2);
}

#[tokio::test]
async fn test_bulk_delete_transactions() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;
    let ids: Vec<i64> = app.store.list_transactions(None).await.unwrap().iter().map(|t| t.id).collect();

    // unknown id: nothing changes, no error
    let response = app.post_form("/delete_transaction", "transaction_ids=4242").await;
    assert_eq!(location(&response), "/");
    assert_eq!(app.store.list_transactions(None).await.unwrap().len(), 2);

    let body = format!("transaction_ids={}&transaction_ids={}&transaction_ids=4242", ids[0], ids[1]);
    let response = app.post_form("/delete_transaction", &body).await;
    assert_eq!(location(&response), "/");
    assert!(app.store.list_transactions(None).await.unwrap().is_empty());

    let response = app.post_form("/delete_transaction", "").await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_delete_account_cascades() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let response = app.get("/delete_account/1").await;
    assert_eq!(location(&response), "/");

    let accounts = app.store.list_accounts().await.unwrap();
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].name, "Bob");
    assert!(app.store.list_transactions(None).await.unwrap().is_empty());

    // idempotent
    let response = app.get("/delete_account/1").await;
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn test_ledger_report() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let html = body_text(app.get("/ledger_report").await).await;
    assert!(html.contains(r#"<option value="1">Alice</option>"#));
    assert!(!html.contains("<table>"));

    let html = body_text(
        app.post_form("/ledger_report", "account_id=1&start_date=2024-01-01&end_date=2024-01-31")
            .await,
    )
    .await;
    assert!(html.contains("Alice (2024-01-01 to 2024-01-31)"));
    assert!(html.contains(r#"<td>2024-01-01</td><td class="amount">100.00</td><td class="amount">0.00</td>"#));
    assert!(html.contains(r#"<td>2024-01-02</td><td class="amount">0.00</td><td class="amount">30.00</td>"#));
}

#[tokio::test]
async fn test_account_summary() {
    let app = TestApp::spawn().await;
    app.seed_alice_and_bob().await;

    let html = body_text(
        app.post_form("/account_summary", "account_id=2&start_date=2024-01-01&end_date=2024-01-31")
            .await,
    )
    .await;
    assert!(html.contains(r#"<td>Alice</td><td class="amount">30.00</td><td class="amount">100.00</td>"#));

    // unknown account: empty report, not a failure
    let response = app
        .post_form("/account_summary", "account_id=77&start_date=2024-01-01&end_date=2024-01-31")
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(!body_text(response).await.contains("<table>"));
}
