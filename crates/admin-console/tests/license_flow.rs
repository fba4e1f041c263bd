//! End-to-end license lifecycle and listing tests against a stateful stub
//! backend that mirrors the server's extend-from-stored-expiry semantics.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use serde_json::{json, Value};
use uuid::Uuid;

use streampass_admin_console::{
    Audience, LicenseAdmin, LicenseState, NotificationDraft, NotificationSender, PlanSelection,
    UserDirectory, UserQuery, UserOps,
};
use streampass_client::{ApiGateway, PlanCatalog, SessionStore};
use streampass_core::{ApiError, Role};

#[derive(Clone)]
struct StubUser {
    id: Uuid,
    username: String,
    tariff_id: Option<String>,
    license_expires_at: Option<DateTime<Utc>>,
    role: String,
    banned: bool,
}

#[derive(Default)]
struct StubState {
    users: Vec<StubUser>,
    last_notification: Option<Value>,
}

type Shared = Arc<Mutex<StubState>>;

fn user_json(u: &StubUser) -> Value {
    json!({
        "id": u.id,
        "username": u.username,
        "tariff_id": u.tariff_id,
        "license_expires_at": u.license_expires_at,
        "role": u.role,
        "is_banned": u.banned,
    })
}

async fn plans() -> Json<Value> {
    Json(json!({
        "items": [
            { "id": "nova_streamer_one_mobile", "name": "NovaStreamer One (Mobile)", "allowed_platforms": ["mobile"] },
            { "id": "nova_streamer_duo", "name": "NovaStreamer Duo", "allowed_platforms": ["desktop", "mobile"] },
        ]
    }))
}

async fn list_users(
    State(state): State<Shared>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<Value> {
    let state = state.lock();
    let q = params.get("q").map(String::as_str).unwrap_or("");
    let matched: Vec<&StubUser> = state
        .users
        .iter()
        .filter(|u| q.is_empty() || u.username.contains(q))
        .collect();

    let offset: usize = params
        .get("offset")
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    let limit: usize = params
        .get("limit")
        .and_then(|v| v.parse().ok())
        .unwrap_or(50);
    let page: Vec<Value> = matched
        .iter()
        .skip(offset)
        .take(limit)
        .map(|u| user_json(u))
        .collect();

    Json(json!({ "items": page, "total": matched.len() }))
}

async fn set_license(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock();
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "user not found" })),
        );
    };
    match body["plan"].as_str() {
        Some(plan) => {
            let ttl = body["ttl_days"].as_u64().unwrap_or(30) as i64;
            user.tariff_id = Some(plan.to_string());
            user.license_expires_at = Some(Utc::now() + Duration::days(ttl));
        }
        None => {
            user.tariff_id = None;
            user.license_expires_at = None;
        }
    }
    (StatusCode::OK, Json(json!({})))
}

async fn extend_license(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock();
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "user not found" })),
        );
    };
    let Some(current) = user.license_expires_at else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "detail": "no license" })),
        );
    };
    let days = body["extend_days"].as_u64().unwrap_or(0) as i64;
    // Server semantics: extend from the stored expiry, never from now.
    user.license_expires_at = Some(current + Duration::days(days));
    (StatusCode::OK, Json(json!({})))
}

async fn revoke_license(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock();
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "user not found" })),
        );
    };
    user.tariff_id = None;
    user.license_expires_at = None;
    (StatusCode::OK, Json(json!({})))
}

async fn set_role(
    State(state): State<Shared>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let mut state = state.lock();
    let Some(user) = state.users.iter_mut().find(|u| u.id == id) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "detail": "user not found" })),
        );
    };
    user.role = body["role"].as_str().unwrap_or("user").to_string();
    (StatusCode::OK, Json(json!({})))
}

async fn send_notification(
    State(state): State<Shared>,
    Json(body): Json<Value>,
) -> Json<Value> {
    state.lock().last_notification = Some(body);
    Json(json!({ "id": Uuid::new_v4() }))
}

async fn spawn_stub(state: Shared) -> SocketAddr {
    let app = Router::new()
        .route("/v2/license/plans", get(plans))
        .route("/v2/admin/users", get(list_users))
        .route("/v2/admin/users/:id/license/set", post(set_license))
        .route("/v2/admin/users/:id/license/extend", post(extend_license))
        .route("/v2/admin/users/:id/license/revoke", post(revoke_license))
        .route(
            "/v2/admin/users/:id/role",
            axum::routing::patch(set_role),
        )
        .route("/v2/admin/notifications", post(send_notification))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

fn seeded_state() -> (Shared, Uuid, Uuid) {
    let active_id = Uuid::new_v4();
    let expired_id = Uuid::new_v4();
    let state = Arc::new(Mutex::new(StubState {
        users: vec![
            StubUser {
                id: active_id,
                username: "fresh_streamer".into(),
                tariff_id: None,
                license_expires_at: None,
                role: "user".into(),
                banned: false,
            },
            StubUser {
                id: expired_id,
                username: "lapsed_streamer".into(),
                tariff_id: Some("nova_streamer_duo".into()),
                license_expires_at: Some(Utc::now() - Duration::days(10)),
                role: "user".into(),
                banned: false,
            },
        ],
        last_notification: None,
    }));
    (state, active_id, expired_id)
}

async fn console_for(addr: SocketAddr) -> (Arc<ApiGateway>, LicenseAdmin, UserDirectory) {
    let base = format!("http://{addr}").parse().unwrap();
    let gateway = Arc::new(ApiGateway::new(base, Arc::new(SessionStore::in_memory())));
    let catalog = PlanCatalog::new(Arc::clone(&gateway)).list().await.unwrap();
    let admin = LicenseAdmin::new(Arc::clone(&gateway), catalog);
    let directory = UserDirectory::new(Arc::clone(&gateway));
    (gateway, admin, directory)
}

#[tokio::test]
async fn grant_then_extend_computes_from_grant_expiry() {
    let (state, user_id, _) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let (_gateway, admin, directory) = console_for(addr).await;
    let operator = Role::Superadmin;

    let grant_time = Utc::now();
    admin
        .grant(
            &operator,
            user_id,
            &PlanSelection::Paid("nova_streamer_duo".into()),
            Some(30),
        )
        .await
        .unwrap();

    // Read-your-writes via re-query.
    let record = directory
        .refetch("fresh_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.tariff_id.as_deref(), Some("nova_streamer_duo"));
    assert_eq!(LicenseState::of_record(&record), LicenseState::Active);

    admin.extend(&operator, &record, 15).await.unwrap();

    let record = directory
        .refetch("fresh_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    let expiry = record.license_expires_at.unwrap();
    let expected = grant_time + Duration::days(45);
    // Expiry is grant time + 30 + 15 days, not now + 15.
    assert!((expiry - expected).num_seconds().abs() < 5);
}

#[tokio::test]
async fn extend_expired_license_uses_stale_expiry() {
    let (state, _, expired_id) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let (_gateway, admin, directory) = console_for(addr).await;
    let operator = Role::Superadmin;

    let record = directory
        .refetch("lapsed_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.id, expired_id);
    assert_eq!(LicenseState::of_record(&record), LicenseState::Expired);
    let stale_expiry = record.license_expires_at.unwrap();

    admin.extend(&operator, &record, 15).await.unwrap();

    let record = directory
        .refetch("lapsed_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    let expiry = record.license_expires_at.unwrap();
    // Stored expiry (10 days ago) + 15, still in the past relative to a
    // from-now computation.
    assert!((expiry - (stale_expiry + Duration::days(15))).num_seconds().abs() < 5);
    assert!(expiry < Utc::now() + Duration::days(15));
    assert_eq!(LicenseState::of_record(&record), LicenseState::Active);
}

#[tokio::test]
async fn revoke_clears_plan_and_expiry() {
    let (state, _, _) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let (_gateway, admin, directory) = console_for(addr).await;
    let operator = Role::Superadmin;

    let record = directory
        .refetch("lapsed_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    admin.revoke(&operator, &record).await.unwrap();

    let record = directory
        .refetch("lapsed_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.tariff_id, None);
    assert_eq!(record.license_expires_at, None);
    assert_eq!(LicenseState::of_record(&record), LicenseState::None);
}

#[tokio::test]
async fn grant_free_clears_license() {
    let (state, _, _) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let (_gateway, admin, directory) = console_for(addr).await;
    let operator = Role::Superadmin;

    let record = directory
        .refetch("lapsed_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    admin
        .grant(&operator, record.id, &PlanSelection::Free, None)
        .await
        .unwrap();

    let record = directory
        .refetch("lapsed_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(LicenseState::of_record(&record), LicenseState::None);
}

#[tokio::test]
async fn listing_requires_staff_tier() {
    let (state, _, _) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let (_gateway, _admin, directory) = console_for(addr).await;

    let err = directory
        .list(&UserQuery::default(), &Role::User)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));

    let page = directory
        .list(&UserQuery::default(), &Role::Staff("staff".into()))
        .await
        .unwrap();
    assert_eq!(page.total, 2);
    assert!(!UserQuery::default().has_next(page.total));
}

#[tokio::test]
async fn role_change_roundtrip() {
    let (state, user_id, _) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let base = format!("http://{addr}").parse().unwrap();
    let gateway = Arc::new(ApiGateway::new(base, Arc::new(SessionStore::in_memory())));
    let ops = UserOps::new(Arc::clone(&gateway));
    let directory = UserDirectory::new(Arc::clone(&gateway));
    let operator = Role::Superadmin;

    ops.set_role(&operator, user_id, "staff").await.unwrap();

    let record = directory
        .refetch("fresh_streamer", &operator)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(record.role.as_deref(), Some("staff"));
    assert!(Role::parse(record.role.as_deref()).can_view_admin_console());
}

#[tokio::test]
async fn notification_send_records_wire_shape() {
    let (state, _, _) = seeded_state();
    let addr = spawn_stub(Arc::clone(&state)).await;
    let base = format!("http://{addr}").parse().unwrap();
    let gateway = Arc::new(ApiGateway::new(base, Arc::new(SessionStore::in_memory())));
    let sender = NotificationSender::new(gateway);

    let mut draft = NotificationDraft::new("Discount for email", "Add an email and save 10%");
    draft.link = Some("https://streampass.io/profile".into());

    sender
        .send(
            &Role::Staff("staff".into()),
            &draft,
            Audience::MissingEmail,
            "",
        )
        .await
        .unwrap();

    let sent = state.lock().last_notification.clone().unwrap();
    assert_eq!(sent["title"], "Discount for email");
    assert_eq!(
        sent["targeting"],
        json!({ "all_users": true, "missing_email": true })
    );

    // Regular users may not send at all; nothing new is recorded.
    let err = sender
        .send(&Role::User, &draft, Audience::All, "")
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Forbidden(_)));
}
