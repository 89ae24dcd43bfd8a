use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    Json, Router,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{self, HeaderName, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{get, patch, post},
};
use platform_api::{ApiError, ApiResult};
use platform_db::DbPool;
use products_marketplace::{
    activities, requests,
    dto::{ActivityDto, MessageDto, RequestDto},
    schema::{ListActivitiesQuery, NewActivityInput, NewRequestInput},
    views::{self, ActivityView},
};
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::info;
use uuid::Uuid;

use crate::{
    auth::{CurrentUser, RequireCustomer, RequirePetsitter},
    config::AppConfig,
};

#[derive(Clone)]
pub struct AppState {
    pub db: DbPool,
    pub config: Arc<AppConfig>,
}

pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let router = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!(%addr, "marketplace server listening");
    axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let allowed = origins
        .iter()
        .filter_map(|origin| origin.parse::<HeaderValue>().ok())
        .collect::<Vec<_>>();
    let allow_origin = if allowed.is_empty() {
        AllowOrigin::any()
    } else {
        AllowOrigin::list(allowed)
    };
    CorsLayer::new()
        .allow_headers([http::header::CONTENT_TYPE, http::header::AUTHORIZATION])
        .allow_methods([Method::GET, Method::POST, Method::PATCH])
        .allow_origin(allow_origin)
}

pub fn build_router(state: AppState) -> Router {
    let header_name = HeaderName::from_static("x-request-id");
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/activities",
            get(list_activities_handler).post(create_activity_handler),
        )
        .route("/activities/{id}", get(activity_view_handler))
        .route("/requests", post(create_request_handler))
        // `{id}` is the activity id here; matchit wants one name per segment.
        .route("/requests/{id}", get(list_requests_handler))
        .route("/requests/{id}/accept", patch(accept_request_handler))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(header_name.clone(), MakeRequestUuid))
                .layer(PropagateRequestIdLayer::new(header_name))
                .layer(TraceLayer::new_for_http())
                .layer(cors_layer(&state.config.cors_allowed_origins)),
        )
        .with_state(state)
}

fn bad_body(rejection: JsonRejection) -> ApiError {
    ApiError::invalid(rejection.body_text())
}

fn bad_path(rejection: PathRejection) -> ApiError {
    ApiError::invalid(rejection.body_text())
}

fn bad_query(rejection: QueryRejection) -> ApiError {
    ApiError::invalid(rejection.body_text())
}

async fn create_activity_handler(
    State(state): State<AppState>,
    RequireCustomer(caller): RequireCustomer,
    body: Result<Json<NewActivityInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<ActivityDto>)> {
    let Json(input) = body.map_err(bad_body)?;
    let created = activities::create_activity(&state.db, caller.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn list_activities_handler(
    State(state): State<AppState>,
    CurrentUser(_caller): CurrentUser,
    query: Result<Query<ListActivitiesQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<ActivityDto>>> {
    let Query(query) = query.map_err(bad_query)?;
    let rows = activities::list_open_activities(&state.db, query).await?;
    Ok(Json(rows.into_iter().map(ActivityDto::from).collect()))
}

async fn activity_view_handler(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<ActivityView>> {
    let Path(id) = id.map_err(bad_path)?;
    let view = views::activity_view(&state.db, caller, id).await?;
    Ok(Json(view))
}

async fn create_request_handler(
    State(state): State<AppState>,
    RequirePetsitter(caller): RequirePetsitter,
    body: Result<Json<NewRequestInput>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<RequestDto>)> {
    let Json(input) = body.map_err(bad_body)?;
    let created = requests::create_request(&state.db, caller.user_id, input).await?;
    Ok((StatusCode::CREATED, Json(created.into())))
}

async fn accept_request_handler(
    State(state): State<AppState>,
    RequireCustomer(caller): RequireCustomer,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<MessageDto>> {
    let Path(request_id) = id.map_err(bad_path)?;
    requests::accept_request(&state.db, caller.user_id, request_id).await?;
    Ok(Json(MessageDto {
        message: "Request accepted".to_string(),
    }))
}

async fn list_requests_handler(
    State(state): State<AppState>,
    CurrentUser(caller): CurrentUser,
    id: Result<Path<Uuid>, PathRejection>,
) -> ApiResult<Json<Vec<RequestDto>>> {
    let Path(activity_id) = id.map_err(bad_path)?;
    let rows = requests::list_requests(&state.db, caller, activity_id).await?;
    Ok(Json(rows.into_iter().map(RequestDto::from).collect()))
}

async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let db_ok = platform_db::ping(&state.db).await;
    Json(HealthResponse {
        ok: db_ok,
        db_ok,
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    ok: bool,
    db_ok: bool,
    version: &'static str,
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install CTRL+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        signal(SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthConfig, issue_token};
    use axum::body::Body;
    use http_body_util::BodyExt;
    use migration::{Migrator, MigratorTrait};
    use products_marketplace::seed::{SeededMarketplace, seed_demo};
    use sea_orm::Database;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    struct Harness {
        router: Router,
        auth: AuthConfig,
        seeded: SeededMarketplace,
    }

    impl Harness {
        async fn new() -> Self {
            let db = Database::connect("sqlite::memory:").await.unwrap();
            Migrator::up(&db, None).await.unwrap();
            let seeded = seed_demo(&db).await.unwrap();
            let auth = AuthConfig::new(vec![9u8; 32], 30);
            let config = AppConfig {
                auth: auth.clone(),
                cors_allowed_origins: vec![],
            };
            let router = build_router(AppState {
                db,
                config: Arc::new(config),
            });
            Self {
                router,
                auth,
                seeded,
            }
        }

        fn token(&self, email: &str) -> String {
            let user = self.seeded.user_email(email).unwrap();
            issue_token(user.id, user.role, &self.auth).unwrap()
        }

        fn activity_id(&self) -> Uuid {
            self.seeded.activities[0].id
        }

        async fn call(
            &self,
            method: Method,
            uri: &str,
            token: Option<&str>,
            body: Option<Value>,
        ) -> (StatusCode, Value) {
            let mut builder = http::Request::builder().method(method).uri(uri);
            if let Some(token) = token {
                builder = builder.header(http::header::AUTHORIZATION, format!("Bearer {token}"));
            }
            let request = match body {
                Some(body) => builder
                    .header(http::header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
                None => builder.body(Body::empty()).unwrap(),
            };
            let response = self.router.clone().oneshot(request).await.unwrap();
            let status = response.status();
            let bytes = response.into_body().collect().await.unwrap().to_bytes();
            let value = if bytes.is_empty() {
                Value::Null
            } else {
                serde_json::from_slice(&bytes).unwrap_or(Value::Null)
            };
            (status, value)
        }
    }

    #[tokio::test]
    async fn health_reports_database() {
        let h = Harness::new().await;
        let (status, body) = h.call(Method::GET, "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ok"], true);
        assert_eq!(body["dbOk"], true);
    }

    #[tokio::test]
    async fn missing_token_is_unauthorized() {
        let h = Harness::new().await;
        let (status, body) = h.call(Method::GET, "/activities", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["code"], "UNAUTHORIZED");

        let (status, _) = h
            .call(Method::GET, "/activities", Some("garbage"), None)
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn full_request_and_accept_flow() {
        let h = Harness::new().await;
        let activity_id = h.activity_id();
        let sam = h.token("sam@pawpal.test");
        let pia = h.token("pia@pawpal.test");
        let carla = h.token("carla@pawpal.test");

        let (status, first) = h
            .call(
                Method::POST,
                "/requests",
                Some(&sam),
                Some(json!({"activityId": activity_id, "price": 30, "message": "Hi!"})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["state"], "PENDING");

        let (status, _) = h
            .call(
                Method::POST,
                "/requests",
                Some(&pia),
                Some(json!({"activityId": activity_id, "price": 45})),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, listed) = h
            .call(
                Method::GET,
                &format!("/requests/{activity_id}"),
                Some(&carla),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(2));

        let request_id = first["id"].as_str().unwrap();
        let (status, body) = h
            .call(
                Method::PATCH,
                &format!("/requests/{request_id}/accept"),
                Some(&carla),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({"message": "Request accepted"}));

        let (status, view) = h
            .call(
                Method::GET,
                &format!("/activities/{activity_id}"),
                Some(&carla),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["view"], "customer");
        assert_eq!(view["activity"]["state"], "ASSIGNED");
        assert_eq!(view["activity"]["price"], 30);
        let states: Vec<&str> = view["requests"]
            .as_array()
            .unwrap()
            .iter()
            .map(|r| r["state"].as_str().unwrap())
            .collect();
        assert!(states.contains(&"ACCEPTED"));
        assert!(states.contains(&"REJECTED"));
    }

    #[tokio::test]
    async fn role_guards_and_error_envelope() {
        let h = Harness::new().await;
        let activity_id = h.activity_id();
        let carla = h.token("carla@pawpal.test");
        let sam = h.token("sam@pawpal.test");

        let (status, body) = h
            .call(
                Method::POST,
                "/requests",
                Some(&carla),
                Some(json!({"activityId": activity_id, "price": 30})),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["code"], "FORBIDDEN");

        let (status, body) = h
            .call(
                Method::POST,
                "/requests",
                Some(&sam),
                Some(json!({"activityId": activity_id, "price": 501})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, body) = h
            .call(
                Method::POST,
                "/requests",
                Some(&sam),
                Some(json!({"activityId": Uuid::new_v4(), "price": 30})),
            )
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Activity not found");

        let (status, body) = h
            .call(
                Method::POST,
                "/requests",
                Some(&sam),
                Some(json!({"price": "cheap"})),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");

        let (status, _) = h
            .call(
                Method::PATCH,
                "/requests/not-a-uuid/accept",
                Some(&carla),
                None,
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn customer_posts_activity() {
        let h = Harness::new().await;
        let carla = h.token("carla@pawpal.test");
        let (status, body) = h
            .call(
                Method::POST,
                "/activities",
                Some(&carla),
                Some(json!({
                    "title": "Cat sitting",
                    "startDateTime": "2030-01-01T10:00:00Z",
                    "endDateTime": "2030-01-01T12:00:00Z",
                    "pickupPoint": "Flat 3",
                    "price": 60
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["state"], "OPEN");
        assert_eq!(body["petsitterId"], Value::Null);

        let admin = h.token("admin@pawpal.test");
        let (status, listed) = h.call(Method::GET, "/activities", Some(&admin), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed.as_array().map(Vec::len), Some(2));
        assert_eq!(listed[0]["title"], "Evening walk for Rex");

        let (status, body) = h
            .call(Method::GET, "/activities?limit=0", Some(&admin), None)
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "INVALID_ARGUMENT");
    }
}
