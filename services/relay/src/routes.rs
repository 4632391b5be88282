//! Relay service routes

use axum::{
    Json, Router,
    extract::{Path, Query, State, rejection::JsonRejection},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde_json::{Value, json};
use tracing::{error, info};

use crate::{
    AppState, analytics,
    error::{ApiError, ApiResult},
    models::{
        AuthTokenRequest, AuthTokenResponse, RoomQuery,
        call::{CallRequest, OutboundCall},
    },
    token::AuthTokenGrant,
    validation::{validate_identifier, validate_phone_number, validate_room_toggle},
};

/// Create the router for the relay service
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/auth-token", post(issue_auth_token))
        .route("/create-room", post(create_room))
        .route("/enable-disable-room", post(enable_disable_room))
        .route("/list-rooms", get(list_rooms))
        .route("/session-list-by-room", get(session_list_by_room))
        .route("/session-analytics-by-room", get(session_analytics_by_room))
        .route("/initiate-call", post(initiate_call))
        .route("/call-status/:call_sid", get(call_status))
        .with_state(state)
}

/// Unwrap a JSON body, reporting malformed input as a bad request
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> ApiResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn room_id_from(query: &RoomQuery) -> ApiResult<String> {
    validate_identifier("room_id", query.room_id.as_deref()).map_err(ApiError::BadRequest)
}

/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "relay"
    }))
}

/// Issue a token that lets a client join a room with a role
pub async fn issue_auth_token(
    State(state): State<AppState>,
    payload: Result<Json<AuthTokenRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let payload = json_body(payload)?;

    let grant = AuthTokenGrant {
        room_id: validate_identifier("room_id", payload.room_id.as_deref())
            .map_err(ApiError::BadRequest)?,
        user_id: validate_identifier("user_id", payload.user_id.as_deref())
            .map_err(ApiError::BadRequest)?,
        role: validate_identifier("role", payload.role.as_deref())
            .map_err(ApiError::BadRequest)?,
    };

    let token = state.token_service.issue_auth_token(&grant).map_err(|e| {
        error!("Failed to generate auth token: {}", e);
        ApiError::InternalServerError
    })?;

    Ok(Json(AuthTokenResponse { token }))
}

/// Create a room
pub async fn create_room(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let definition = json_body(payload)?;
    if !definition.is_object() {
        return Err(ApiError::BadRequest(
            "Room definition must be a JSON object".to_string(),
        ));
    }

    let room = state
        .room_repository
        .create(&definition)
        .await
        .map_err(|e| {
            error!("Failed to create room: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(room))
}

/// Enable or disable a room
pub async fn enable_disable_room(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let toggle = validate_room_toggle(&json_body(payload)?).map_err(ApiError::BadRequest)?;
    info!(
        "Setting room {} enabled = {}",
        toggle.room_id, toggle.enabled
    );

    let room = state
        .room_repository
        .set_enabled(&toggle)
        .await
        .map_err(|e| {
            error!("Failed to update room {}: {}", toggle.room_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(room))
}

/// List rooms with their guest room codes
pub async fn list_rooms(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    info!("Listing rooms");

    let rooms = state
        .room_repository
        .list_with_guest_codes()
        .await
        .map_err(|e| {
            error!("Failed to list rooms: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(rooms))
}

/// List every session of a room
pub async fn session_list_by_room(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> ApiResult<impl IntoResponse> {
    let room_id = room_id_from(&query)?;
    info!("Listing sessions for room {}", room_id);

    let sessions = state
        .session_repository
        .list_by_room(&room_id)
        .await
        .map_err(|e| {
            error!("Failed to list sessions for room {}: {}", room_id, e);
            ApiError::from(e)
        })?;

    Ok(Json(sessions))
}

/// Usage analytics for the latest session of a room
pub async fn session_analytics_by_room(
    State(state): State<AppState>,
    Query(query): Query<RoomQuery>,
) -> ApiResult<impl IntoResponse> {
    let room_id = room_id_from(&query)?;
    info!("Computing session analytics for room {}", room_id);

    let session = state
        .session_repository
        .latest_by_room(&room_id)
        .await
        .map_err(|e| {
            error!("Failed to fetch sessions for room {}: {}", room_id, e);
            ApiError::from(e)
        })?
        .ok_or_else(|| ApiError::NotFound(format!("No session found for room {}", room_id)))?;

    Ok(Json(analytics::aggregate(&session, Utc::now())))
}

/// Place an outbound phone call
pub async fn initiate_call(
    State(state): State<AppState>,
    payload: Result<Json<CallRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let payload = json_body(payload)?;

    let to = validate_phone_number("to", payload.to.as_deref()).map_err(ApiError::BadRequest)?;
    let from = match payload.from.as_deref() {
        Some(from) => validate_phone_number("from", Some(from)).map_err(ApiError::BadRequest)?,
        None => state.telephony.default_from().to_string(),
    };
    let url = payload
        .url
        .or_else(|| state.telephony.default_voice_url().map(str::to_string))
        .ok_or_else(|| {
            ApiError::BadRequest("url is required when no default voice URL is configured".into())
        })?;

    let call = state
        .telephony
        .initiate_call(&OutboundCall { to, from, url })
        .await
        .map_err(|e| {
            error!("Failed to initiate call: {}", e);
            ApiError::from(e)
        })?;

    Ok(Json(call))
}

/// Current state of a phone call
pub async fn call_status(
    State(state): State<AppState>,
    Path(call_sid): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let call_sid =
        validate_identifier("call_sid", Some(call_sid.as_str())).map_err(ApiError::BadRequest)?;

    let call = state.telephony.call_status(&call_sid).await.map_err(|e| {
        error!("Failed to fetch call {}: {}", call_sid, e);
        ApiError::from(e)
    })?;

    Ok(Json(call))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::TelephonyConfig,
        repositories::{RoomRepository, SessionRepository},
        telephony::TelephonyClient,
        testutils::{FakeResourceApi, query_value},
        token::{TokenConfig, TokenService},
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use common::UpstreamError;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn app_with(api: Arc<FakeResourceApi>, telephony_url: &str, voice_url: Option<&str>) -> Router {
        let token_service = TokenService::new(TokenConfig {
            access_key: "access-key".to_string(),
            app_secret: "app-secret".to_string(),
            management_token_expiry: 3600,
            auth_token_expiry: 3600,
        })
        .unwrap();

        let telephony = TelephonyClient::new(
            reqwest::Client::new(),
            TelephonyConfig {
                account_sid: "AC123".to_string(),
                auth_token: "secret".to_string(),
                from_number: "+15550001111".to_string(),
                api_base_url: telephony_url.to_string(),
                voice_url: voice_url.map(str::to_string),
            },
        );

        create_router(AppState {
            token_service,
            room_repository: RoomRepository::new(api.clone(), "guest"),
            session_repository: SessionRepository::new(api, 20, 50),
            telephony,
        })
    }

    fn app(api: Arc<FakeResourceApi>) -> Router {
        app_with(api, "http://127.0.0.1:9", None)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn session_json(id: &str, peers: Value) -> Value {
        json!({
            "id": id,
            "room_id": "room-1",
            "created_at": "2024-03-01T10:00:00Z",
            "updated_at": "2024-03-01T10:12:00Z",
            "peers": peers
        })
    }

    #[tokio::test]
    async fn test_health_check() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(Value::Null)));
        let (status, body) = send(app(api), get("/health")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_session_analytics_aggregates_latest_session() {
        let api = Arc::new(FakeResourceApi::new(|_| {
            Ok(json!({
                "data": [session_json("s-1", json!({
                    "p-1": {
                        "user_id": "u-1", "name": "Ada",
                        "joined_at": "2024-03-01T10:00:00.000Z",
                        "left_at": "2024-03-01T10:05:00.300Z"
                    },
                    "p-2": {
                        "user_id": "u-1", "name": "Ada",
                        "joined_at": "2024-03-01T10:06:00.000Z",
                        "left_at": "2024-03-01T10:08:00.000Z"
                    }
                }))]
            }))
        }));

        let (status, body) = send(app(api), get("/session-analytics-by-room?room_id=room-1")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(
            body,
            json!({
                "user_duration_list": [{"name": "Ada", "user_id": "u-1", "duration": 7.01}],
                "session_duration": "12.00",
                "total_peer_duration": "7.01"
            })
        );
    }

    #[tokio::test]
    async fn test_session_analytics_without_sessions_is_not_found() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(json!({"data": []}))));

        let (status, body) = send(app(api), get("/session-analytics-by-room?room_id=room-1")).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body["error"].as_str().unwrap().contains("room-1"));
    }

    #[tokio::test]
    async fn test_room_id_is_required() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(json!({"data": []}))));

        let (status, _) = send(app(api.clone()), get("/session-analytics-by-room")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(app(api.clone()), get("/session-list-by-room?room_id=")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_session_list_is_flattened_across_pages() {
        let api = Arc::new(FakeResourceApi::new(|call| {
            let data: Vec<Value> = match query_value(&call.query, "start") {
                None => (0..20)
                    .map(|i| session_json(&format!("s-{i}"), json!({})))
                    .collect(),
                Some(_) => vec![session_json("s-20", json!({}))],
            };
            Ok(json!({"limit": 20, "data": data, "last": "s-19"}))
        }));

        let (status, body) =
            send(app(api.clone()), get("/session-list-by-room?room_id=room-1")).await;

        assert_eq!(status, StatusCode::OK);
        let sessions = body.as_array().unwrap();
        assert_eq!(sessions.len(), 21);
        assert_eq!(sessions[20]["id"], "s-20");
        assert_eq!(api.calls().len(), 2);
    }

    #[tokio::test]
    async fn test_session_list_reuses_upstream_status() {
        let api = Arc::new(FakeResourceApi::new(|_| {
            Err(UpstreamError::Status {
                status: 429,
                body: Some(json!({"message": "rate limited"})),
            })
        }));

        let (status, body) = send(app(api), get("/session-list-by-room?room_id=room-1")).await;

        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(body["message"], "rate limited");
    }

    #[tokio::test]
    async fn test_list_rooms_survives_partial_failure() {
        let api = Arc::new(FakeResourceApi::new(|call| match call.path.as_str() {
            "/rooms" => Ok(json!({"data": [{"id": "r1"}, {"id": "r2"}]})),
            "/room-codes/room/r1" => Err(UpstreamError::Status {
                status: 500,
                body: None,
            }),
            _ => Ok(json!({"data": [{"code": "guest-code", "role": "guest"}]})),
        }));

        let (status, body) = send(app(api), get("/list-rooms")).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["id"], "r1");
        assert_eq!(body["data"][0]["guest_room_codes"], json!([]));
        assert_eq!(body["data"][0]["guest_room_codes_error"], true);
        assert_eq!(body["data"][1]["guest_room_codes"][0]["code"], "guest-code");
        assert!(body["data"][1].get("guest_room_codes_error").is_none());
    }

    #[tokio::test]
    async fn test_enable_disable_room_rejects_non_boolean() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(json!({}))));

        let (status, body) = send(
            app(api.clone()),
            post_json("/enable-disable-room", json!({"room_id": "r1", "enabled": "yes"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "enabled must be a boolean");
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_enable_disable_room_forwards_flag() {
        let api = Arc::new(FakeResourceApi::new(|call| {
            Ok(json!({"id": "r1", "enabled": call.body.as_ref().unwrap()["enabled"]}))
        }));

        let (status, body) = send(
            app(api.clone()),
            post_json("/enable-disable-room", json!({"room_id": "r1", "enabled": false})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["enabled"], false);
        assert_eq!(api.calls()[0].path, "/rooms/r1");
    }

    #[tokio::test]
    async fn test_create_room_passes_definition_through() {
        let api = Arc::new(FakeResourceApi::new(|call| {
            let mut room = call.body.clone().unwrap();
            room["id"] = json!("new-room");
            Ok(room)
        }));

        let (status, body) = send(
            app(api.clone()),
            post_json("/create-room", json!({"name": "standup", "template_id": "t-1"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], "new-room");
        assert_eq!(body["name"], "standup");
        assert_eq!(api.calls()[0].path, "/rooms");
    }

    #[tokio::test]
    async fn test_auth_token_requires_all_fields() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(Value::Null)));

        let (status, body) = send(
            app(api.clone()),
            post_json("/auth-token", json!({"room_id": "r1", "user_id": "u1"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "role is required");

        let (status, body) = send(
            app(api),
            post_json(
                "/auth-token",
                json!({"room_id": "r1", "user_id": "u1", "role": "host"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["token"].as_str().unwrap().split('.').count(), 3);
    }

    #[tokio::test]
    async fn test_malformed_json_is_bad_request() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(Value::Null)));
        let request = Request::builder()
            .method("POST")
            .uri("/auth-token")
            .header("content-type", "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let (status, body) = send(app(api), request).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_initiate_call_needs_a_voice_url() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(Value::Null)));

        let (status, body) = send(
            app(api),
            post_json("/initiate-call", json!({"to": "+14155550123"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("url"));
    }

    #[tokio::test]
    async fn test_initiate_call_uses_configured_defaults() {
        use wiremock::matchers::{body_string_contains, method, path};
        use wiremock::{Mock, MockServer, ResponseTemplate};

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/Accounts/AC123/Calls.json"))
            .and(body_string_contains("From=%2B15550001111"))
            .and(body_string_contains("Url=https%3A%2F%2Fexample.com%2Fvoice.xml"))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"sid": "CA1"})))
            .expect(1)
            .mount(&server)
            .await;

        let api = Arc::new(FakeResourceApi::new(|_| Ok(Value::Null)));
        let app = app_with(api, &server.uri(), Some("https://example.com/voice.xml"));

        let (status, body) = send(
            app,
            post_json("/initiate-call", json!({"to": "+14155550123"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["sid"], "CA1");
    }

    #[tokio::test]
    async fn test_call_status_transport_failure_is_generic_500() {
        let api = Arc::new(FakeResourceApi::new(|_| Ok(Value::Null)));

        let (status, body) = send(app(api), get("/call-status/CA1")).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Internal server error");
    }
}
