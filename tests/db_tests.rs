//! Store-backed integration tests.
//!
//! These exercise the provisioning upsert, the billing reconciler, and usage
//! aggregation against a real PostgreSQL, so they are ignored by default.
//! Point `DATABASE_URL` at a disposable database and run:
//!
//! ```text
//! DATABASE_URL=postgres://localhost/screenshot_test cargo test -- --ignored
//! ```
//!
//! Migrations run on first connection. Every test works with a fresh random
//! identity, so a shared database stays usable across runs.

use axum::{Json, Router, routing::post};
use screenshot_service::config::Config;
use screenshot_service::db::{self, DbPool};
use screenshot_service::models::api_key::KEY_PREFIX;
use screenshot_service::models::profile::Profile;
use screenshot_service::models::stripe_event::StripeEvent;
use screenshot_service::services::billing_service::{self, StripeClient};
use screenshot_service::services::{key_service, usage_service};
use serde_json::json;
use uuid::Uuid;

async fn test_pool() -> DbPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must point at a test database");
    let pool = db::create_pool(&url).await.expect("connect to test database");
    db::run_migrations(&pool).await.expect("run migrations");
    pool
}

/// Insert a fresh profile and return its user id.
async fn seed_profile(pool: &DbPool) -> Uuid {
    let user_id = Uuid::new_v4();
    sqlx::query("INSERT INTO profiles (id, email) VALUES ($1, $2)")
        .bind(user_id)
        .bind(format!("{}@example.com", user_id))
        .execute(pool)
        .await
        .expect("seed profile");
    user_id
}

async fn fetch_profile(pool: &DbPool, user_id: Uuid) -> Profile {
    sqlx::query_as::<_, Profile>("SELECT * FROM profiles WHERE id = $1")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("fetch profile")
}

async fn active_key_count(pool: &DbPool, user_id: Uuid) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE user_id = $1 AND is_active = true")
        .bind(user_id)
        .fetch_one(pool)
        .await
        .expect("count active keys")
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn first_provisioning_is_idempotent() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;

    let first = key_service::ensure_active_key(&pool, user_id)
        .await
        .expect("first provisioning");
    assert!(first.key.starts_with(KEY_PREFIX));
    assert_eq!(first.key.len(), KEY_PREFIX.len() + 32);

    // A subsequent call returns the identical key, not a new one
    let second = key_service::ensure_active_key(&pool, user_id)
        .await
        .expect("second provisioning");
    assert_eq!(first.id, second.id);
    assert_eq!(first.key, second.key);
    assert_eq!(active_key_count(&pool, user_id).await, 1);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn concurrent_first_time_provisioning_creates_one_key() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;

    // Two first-time calls racing for the same identity: the loser of the
    // insert must fall through to the winner's key
    let (a, b) = {
        let pool_a = pool.clone();
        let pool_b = pool.clone();
        let task_a =
            tokio::spawn(async move { key_service::ensure_active_key(&pool_a, user_id).await });
        let task_b =
            tokio::spawn(async move { key_service::ensure_active_key(&pool_b, user_id).await });
        (
            task_a.await.expect("join a").expect("provision a"),
            task_b.await.expect("join b").expect("provision b"),
        )
    };

    assert_eq!(a.id, b.id, "both callers must see the same key");
    assert_eq!(a.key, b.key);
    assert_eq!(active_key_count(&pool, user_id).await, 1);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn rotation_replaces_the_active_key() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;

    let original = key_service::ensure_active_key(&pool, user_id)
        .await
        .expect("provision");
    let rotated = key_service::rotate_key(&pool, user_id)
        .await
        .expect("rotate");

    assert_ne!(original.id, rotated.id);
    assert_eq!(active_key_count(&pool, user_id).await, 1);

    // Provisioning after rotation must return the rotated key, and the old
    // row must survive deactivated (usage history stays attached)
    let current = key_service::ensure_active_key(&pool, user_id)
        .await
        .expect("re-provision");
    assert_eq!(current.id, rotated.id);

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM api_keys WHERE user_id = $1")
        .bind(user_id)
        .fetch_one(&pool)
        .await
        .expect("count keys");
    assert_eq!(total, 2);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn checkout_completed_upgrades_profile() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;

    billing_service::reconcile(
        &pool,
        StripeEvent::CheckoutSessionCompleted {
            user_id: Some(user_id),
            customer: Some("cus_checkout".to_string()),
        },
    )
    .await
    .expect("reconcile checkout");

    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.plan, "pro");
    assert_eq!(profile.credits_limit, 5000);
    assert_eq!(profile.stripe_customer_id.as_deref(), Some("cus_checkout"));
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn renewal_reapplies_plan_by_customer_reference() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;
    let customer = format!("cus_{}", user_id.simple());

    sqlx::query("UPDATE profiles SET stripe_customer_id = $1 WHERE id = $2")
        .bind(&customer)
        .bind(user_id)
        .execute(&pool)
        .await
        .expect("store customer reference");

    // Renewal events carry no user metadata; resolution is by customer id
    billing_service::reconcile(
        &pool,
        StripeEvent::InvoicePaymentSucceeded {
            customer: Some(customer),
        },
    )
    .await
    .expect("reconcile renewal");

    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.plan, "pro");
    assert_eq!(profile.credits_limit, 5000);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn renewal_for_unknown_customer_mutates_nothing() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;

    billing_service::reconcile(
        &pool,
        StripeEvent::InvoicePaymentSucceeded {
            customer: Some("cus_nobody_has_this".to_string()),
        },
    )
    .await
    .expect("reconcile must not error on unknown customers");

    // The seeded profile keeps its free-plan defaults
    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.plan, "free");
    assert_eq!(profile.credits_limit, 100);
    assert_eq!(profile.stripe_customer_id, None);
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn usage_sums_seeded_entries() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;
    let key = key_service::ensure_active_key(&pool, user_id)
        .await
        .expect("provision");

    // No entries yet
    assert_eq!(
        usage_service::usage_for(&pool, key.id).await.expect("sum"),
        0
    );

    for count in [Some(3), None, Some(5)] {
        sqlx::query("INSERT INTO usage_logs (key_id, request_count) VALUES ($1, $2)")
            .bind(key.id)
            .bind(count)
            .execute(&pool)
            .await
            .expect("seed usage log");
    }

    assert_eq!(
        usage_service::usage_for(&pool, key.id).await.expect("sum"),
        8
    );
}

/// Serve a stand-in Stripe API on an ephemeral port; returns its base URL.
async fn spawn_fake_stripe() -> String {
    let router = Router::new()
        .route(
            "/v1/customers",
            post(|| async { Json(json!({ "id": "cus_local" })) }),
        )
        .route(
            "/v1/checkout/sessions",
            post(|| async {
                Json(json!({ "url": "https://checkout.stripe.com/c/pay/cs_local" }))
            }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

#[tokio::test]
#[ignore = "requires a live PostgreSQL (set DATABASE_URL)"]
async fn checkout_session_creates_and_persists_customer() {
    let pool = test_pool().await;
    let user_id = seed_profile(&pool).await;

    let mut config = Config::test_default();
    config.stripe_api_url = spawn_fake_stripe().await;
    let stripe = StripeClient::new(&config).expect("stripe client");

    let url = billing_service::create_checkout_session(
        &pool,
        &stripe,
        &config,
        user_id,
        "price_test_123",
    )
    .await
    .expect("create checkout session");

    assert_eq!(url, "https://checkout.stripe.com/c/pay/cs_local");

    // The customer created on first checkout is remembered on the profile
    let profile = fetch_profile(&pool, user_id).await;
    assert_eq!(profile.stripe_customer_id.as_deref(), Some("cus_local"));
}
