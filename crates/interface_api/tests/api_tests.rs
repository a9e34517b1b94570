//! HTTP API tests over the in-memory ledger

use axum::http::StatusCode;
use axum_test::TestServer;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{json, Value};

use domain_wallet::{Actor, Role};
use interface_api::auth::create_token;
use interface_api::config::{ApiConfig, StorageBackend};
use interface_api::create_router;
use test_utils::{AccountFixtures, LedgerFixture};

const SECRET: &str = "api-test-secret";

struct Api {
    server: TestServer,
    ledger: LedgerFixture,
    admin_token: String,
}

async fn api() -> Api {
    let ledger = LedgerFixture::new().await;
    let config = ApiConfig {
        jwt_secret: SECRET.to_string(),
        storage: StorageBackend::Memory,
        ..ApiConfig::default()
    };
    let server = TestServer::new(create_router(ledger.engine.clone(), config)).unwrap();
    let admin_token = token(&ledger.admin);
    Api {
        server,
        ledger,
        admin_token,
    }
}

fn token(actor: &Actor) -> String {
    create_token(actor.id, actor.role, SECRET, 3600).unwrap()
}

fn decimal(value: &Value) -> Decimal {
    serde_json::from_value(value.clone()).unwrap()
}

// ============================================================================
// Health and authentication
// ============================================================================

mod auth_tests {
    use super::*;

    #[tokio::test]
    async fn test_health_endpoints_are_public() {
        let api = api().await;
        api.server.get("/health").await.assert_status_ok();
        api.server.get("/health/ready").await.assert_status_ok();
    }

    #[tokio::test]
    async fn test_responses_carry_request_id() {
        let api = api().await;
        let response = api.server.get("/health").await;
        assert!(response.headers().contains_key("x-request-id"));
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthorized() {
        let api = api().await;
        let response = api.server.get("/api/v1/wallet/me").await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(response.json::<Value>()["error"], "unauthorized");
    }

    #[tokio::test]
    async fn test_token_signed_with_other_secret_is_rejected() {
        let api = api().await;
        let forged = create_token(api.ledger.admin.id, Role::Admin, "other", 3600).unwrap();
        let response = api
            .server
            .get("/api/v1/stats/summary")
            .authorization_bearer(forged)
            .await;
        assert_eq!(response.status_code(), StatusCode::UNAUTHORIZED);
    }
}

// ============================================================================
// Registration
// ============================================================================

mod registration_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_returns_usable_token() {
        let api = api().await;
        let response = api
            .server
            .post("/api/v1/accounts")
            .json(&json!({
                "name": "Rahim Uddin",
                "email": "rahim@example.com",
                "phone": "01711000001",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);

        let body = response.json::<Value>();
        assert_eq!(body["actor"]["role"], "user");
        assert_eq!(body["actor"]["approval"], "approved");
        let access_token = body["access_token"].as_str().unwrap().to_string();

        let wallet = api
            .server
            .get("/api/v1/wallet/me")
            .authorization_bearer(access_token)
            .await;
        wallet.assert_status_ok();
        assert_eq!(decimal(&wallet.json::<Value>()["balance"]), dec!(0));
    }

    #[tokio::test]
    async fn test_agent_registers_pending() {
        let api = api().await;
        let response = api
            .server
            .post("/api/v1/accounts")
            .json(&json!({
                "name": "Karim Store",
                "email": "karim@example.com",
                "phone": "+8801711000002",
                "role": "agent",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.json::<Value>()["actor"]["approval"], "pending");
    }

    #[tokio::test]
    async fn test_invalid_phone_is_unprocessable() {
        let api = api().await;
        let response = api
            .server
            .post("/api/v1/accounts")
            .json(&json!({
                "name": "Rahim Uddin",
                "email": "rahim@example.com",
                "phone": "12345",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(response.json::<Value>()["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let api = api().await;
        api.ledger.user(1).await;
        let response = api
            .server
            .post("/api/v1/accounts")
            .json(&json!({
                "name": "Someone Else",
                "email": AccountFixtures::email(1),
                "phone": "01799999999",
            }))
            .await;
        assert_eq!(response.status_code(), StatusCode::CONFLICT);
        assert_eq!(response.json::<Value>()["error"], "duplicate_account");
    }
}

// ============================================================================
// Money movement
// ============================================================================

mod movement_tests {
    use super::*;

    #[tokio::test]
    async fn test_top_up_and_send_by_phone() {
        let api = api().await;
        let alice = api.ledger.user(1).await;
        let bob = api.ledger.user(2).await;

        let top_up = api
            .server
            .post("/api/v1/wallet/top-up")
            .authorization_bearer(token(&alice))
            .json(&json!({ "amount": "500" }))
            .await;
        top_up.assert_status_ok();
        assert_eq!(decimal(&top_up.json::<Value>()["balance"]), dec!(500));

        let send = api
            .server
            .post("/api/v1/wallet/send")
            .authorization_bearer(token(&alice))
            .json(&json!({ "phone": bob.phone, "amount": "200", "note": "rent" }))
            .await;
        send.assert_status_ok();
        let body = send.json::<Value>();
        assert_eq!(decimal(&body["balance"]), dec!(300));
        // only the sender's own entry is returned
        assert_eq!(body["entries"].as_array().unwrap().len(), 1);
        assert_eq!(body["entries"][0]["kind"], "send_money");
        assert_eq!(body["entries"][0]["note"], "rent");

        assert_eq!(api.ledger.balance(&bob).await, dec!(200));
    }

    #[tokio::test]
    async fn test_insufficient_funds_is_bad_request() {
        let api = api().await;
        let alice = api.ledger.user(1).await;
        let bob = api.ledger.user(2).await;

        let response = api
            .server
            .post("/api/v1/wallet/send")
            .authorization_bearer(token(&alice))
            .json(&json!({ "phone": bob.phone, "amount": "10" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>()["error"], "insufficient_funds");
    }

    #[tokio::test]
    async fn test_unknown_recipient_is_not_found() {
        let api = api().await;
        let alice = api.ledger.funded_user(1, dec!(100)).await;

        let response = api
            .server
            .post("/api/v1/wallet/send")
            .authorization_bearer(token(&alice))
            .json(&json!({ "phone": "01799999999", "amount": "10" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_cash_out_through_agent() {
        let api = api().await;
        let user = api.ledger.funded_user(1, dec!(1000)).await;
        let agent = api.ledger.approved_agent(2).await;

        let response = api
            .server
            .post("/api/v1/agent/cash-out")
            .authorization_bearer(token(&user))
            .json(&json!({ "phone": agent.phone, "amount": "500" }))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(decimal(&body["balance"]), dec!(490));
        assert_eq!(decimal(&body["entries"][0]["fee"]), dec!(10));
        assert_eq!(api.ledger.balance(&agent).await, dec!(500));
    }

    #[tokio::test]
    async fn test_agent_initiated_cash_out() {
        let api = api().await;
        let user = api.ledger.funded_user(1, dec!(1000)).await;
        let agent = api.ledger.approved_agent(2).await;

        let response = api
            .server
            .post("/api/v1/agent/cash-out")
            .authorization_bearer(token(&agent))
            .json(&json!({ "phone": user.phone, "amount": "100" }))
            .await;
        response.assert_status_ok();

        assert_eq!(decimal(&response.json::<Value>()["balance"]), dec!(100));
        assert_eq!(api.ledger.balance(&user).await, dec!(898));
    }

    #[tokio::test]
    async fn test_cash_in_requires_agent_role() {
        let api = api().await;
        let alice = api.ledger.funded_user(1, dec!(100)).await;
        let bob = api.ledger.user(2).await;

        let response = api
            .server
            .post("/api/v1/agent/cash-in")
            .authorization_bearer(token(&alice))
            .json(&json!({ "phone": bob.phone, "amount": "10" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_agent_cash_in_earns_commission() {
        let api = api().await;
        let user = api.ledger.user(1).await;
        let agent = api.ledger.approved_agent(2).await;
        api.ledger
            .engine
            .top_up(agent.id, dec!(1000), None)
            .await
            .unwrap();

        let response = api
            .server
            .post("/api/v1/agent/cash-in")
            .authorization_bearer(token(&agent))
            .json(&json!({ "phone": user.phone, "amount": "400" }))
            .await;
        response.assert_status_ok();

        // 1000 - 400 + 4 commission
        assert_eq!(decimal(&response.json::<Value>()["balance"]), dec!(604));
        assert_eq!(api.ledger.balance(&user).await, dec!(400));
    }
}

// ============================================================================
// Administration
// ============================================================================

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_admin_routes_reject_users() {
        let api = api().await;
        let alice = api.ledger.user(1).await;

        let response = api
            .server
            .get("/api/v1/admin/wallets")
            .authorization_bearer(token(&alice))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_approve_agent_twice_conflicts() {
        let api = api().await;
        let agent = api.ledger.register(AccountFixtures::agent(2)).await;
        let path = format!("/api/v1/admin/agents/{}/approve", agent.id.as_uuid());

        let first = api
            .server
            .patch(&path)
            .authorization_bearer(api.admin_token.clone())
            .await;
        first.assert_status_ok();
        assert_eq!(first.json::<Value>()["approval"], "approved");

        let second = api
            .server
            .patch(&path)
            .authorization_bearer(api.admin_token.clone())
            .await;
        assert_eq!(second.status_code(), StatusCode::CONFLICT);
        assert_eq!(second.json::<Value>()["error"], "already_in_state");
    }

    #[tokio::test]
    async fn test_blocked_wallet_rejects_movements() {
        let api = api().await;
        let alice = api.ledger.user(1).await;
        let path = format!("/api/v1/admin/wallets/{}/block", alice.wallet_id.as_uuid());

        let blocked = api
            .server
            .patch(&path)
            .authorization_bearer(api.admin_token.clone())
            .await;
        blocked.assert_status_ok();
        assert_eq!(blocked.json::<Value>()["status"], "blocked");

        let response = api
            .server
            .post("/api/v1/wallet/top-up")
            .authorization_bearer(token(&alice))
            .json(&json!({ "amount": "50" }))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(response.json::<Value>()["error"], "wallet_blocked");
    }

    #[tokio::test]
    async fn test_wallet_lookup_is_owner_or_admin() {
        let api = api().await;
        let alice = api.ledger.user(1).await;
        let bob = api.ledger.user(2).await;
        let path = format!("/api/v1/wallets/{}", alice.wallet_id.as_uuid());

        api.server
            .get(&path)
            .authorization_bearer(token(&alice))
            .await
            .assert_status_ok();
        api.server
            .get(&path)
            .authorization_bearer(api.admin_token.clone())
            .await
            .assert_status_ok();
        let response = api
            .server
            .get(&path)
            .authorization_bearer(token(&bob))
            .await;
        assert_eq!(response.status_code(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_list_agents_is_paginated() {
        let api = api().await;
        for n in 1..=3 {
            api.ledger.register(AccountFixtures::agent(n)).await;
        }

        let response = api
            .server
            .get("/api/v1/admin/agents")
            .add_query_param("page", 2)
            .add_query_param("limit", 2)
            .authorization_bearer(api.admin_token.clone())
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["data"].as_array().unwrap().len(), 1);
        assert_eq!(body["meta"]["total"], 3);
        assert_eq!(body["meta"]["total_page"], 2);
    }
}

// ============================================================================
// History and statistics
// ============================================================================

mod read_tests {
    use super::*;

    #[tokio::test]
    async fn test_history_filters_by_kind() {
        let api = api().await;
        let alice = api.ledger.funded_user(1, dec!(500)).await;
        api.ledger
            .engine
            .withdraw(alice.id, dec!(50), None)
            .await
            .unwrap();
        api.ledger
            .engine
            .withdraw(alice.id, dec!(25), None)
            .await
            .unwrap();

        let response = api
            .server
            .get("/api/v1/transactions/me")
            .add_query_param("kind", "withdraw")
            .add_query_param("sort", "asc")
            .authorization_bearer(token(&alice))
            .await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        assert_eq!(body["meta"]["total"], 2);
        assert_eq!(decimal(&body["data"][0]["amount"]), dec!(50));
        assert_eq!(decimal(&body["data"][1]["resulting_balance"]), dec!(425));
    }

    #[tokio::test]
    async fn test_bad_history_filter_is_rejected() {
        let api = api().await;
        let alice = api.ledger.user(1).await;

        let response = api
            .server
            .get("/api/v1/transactions/me")
            .add_query_param("kind", "refund")
            .authorization_bearer(token(&alice))
            .await;
        assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_summary_and_dashboard() {
        let api = api().await;
        let alice = api.ledger.funded_user(1, dec!(300)).await;
        api.ledger.user(2).await;

        let summary = api
            .server
            .get("/api/v1/stats/summary")
            .authorization_bearer(api.admin_token.clone())
            .await;
        summary.assert_status_ok();
        assert_eq!(decimal(&summary.json::<Value>()["total_add_money"]), dec!(300));

        let dashboard = api
            .server
            .get("/api/v1/stats/dashboard")
            .authorization_bearer(token(&alice))
            .await;
        dashboard.assert_status_ok();
        let body = dashboard.json::<Value>();
        assert_eq!(decimal(&body["wallet_balance"]), dec!(300));
        assert_eq!(body["total_users"], 2);
        assert_eq!(body["total_agents"], 0);
    }

    #[tokio::test]
    async fn test_my_volume() {
        let api = api().await;
        let alice = api.ledger.funded_user(1, dec!(300)).await;

        let response = api
            .server
            .get("/api/v1/stats/me")
            .authorization_bearer(token(&alice))
            .await;
        response.assert_status_ok();
        assert_eq!(decimal(&response.json::<Value>()["last_7_days"]), dec!(300));
    }
}
