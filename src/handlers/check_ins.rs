use axum::{
    extract::{Path, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};

use crate::dto::{CheckInResponse, CreateCheckInRequest, UpdateCheckInRequest};
use crate::error::{AppError, AppResult};
use crate::extract::{DateFilter, ValidatedJson};
use crate::services::check_ins::CheckInService;
use crate::AppState;

fn service(state: &AppState) -> CheckInService {
    CheckInService::new(state.db.clone())
}

pub async fn create_check_in(
    State(state): State<AppState>,
    ValidatedJson(body): ValidatedJson<CreateCheckInRequest>,
) -> AppResult<impl IntoResponse> {
    let check_in = service(&state).create(body).await?;
    let location = format!("/api/checkins/{}", check_in.id);

    Ok((StatusCode::CREATED, [(header::LOCATION, location)], Json(check_in)))
}

pub async fn list_check_ins(
    State(state): State<AppState>,
    DateFilter(range): DateFilter,
) -> AppResult<Json<Vec<CheckInResponse>>> {
    let check_ins = service(&state).list_all(range).await?;
    Ok(Json(check_ins))
}

pub async fn list_user_check_ins(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    DateFilter(range): DateFilter,
) -> AppResult<Json<Vec<CheckInResponse>>> {
    let check_ins = service(&state).list_by_user(&user_id, range).await?;
    Ok(Json(check_ins))
}

pub async fn get_check_in(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<CheckInResponse>> {
    let check_in = service(&state)
        .get_by_id(id)
        .await?
        .ok_or(AppError::check_in_not_found(id))?;

    Ok(Json(check_in))
}

pub async fn update_check_in(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidatedJson(body): ValidatedJson<UpdateCheckInRequest>,
) -> AppResult<Json<CheckInResponse>> {
    let check_in = service(&state)
        .update(id, body)
        .await?
        .ok_or(AppError::check_in_not_found(id))?;

    Ok(Json(check_in))
}

pub async fn delete_check_in(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !service(&state).delete(id).await? {
        return Err(AppError::check_in_not_found(id));
    }

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::Body,
        http::{Method, Request},
        Router,
    };
    use chrono::{Duration, TimeZone, Utc};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::db;

    async fn app() -> (Router, sqlx::SqlitePool) {
        let db = db::memory_pool().await.unwrap();
        let state = AppState {
            db: db.clone(),
            config: Arc::new(Config::for_testing()),
        };
        (crate::router(state), db)
    }

    async fn send(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };

        let response = app
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn create(app: &Router, body: Value) -> CheckInResponse {
        let (status, json) = send(app, Method::POST, "/api/checkins", Some(body)).await;
        assert_eq!(status, StatusCode::CREATED);
        serde_json::from_value(json).unwrap()
    }

    #[tokio::test]
    async fn test_create_valid_returns_created() {
        let (app, _db) = app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/checkins")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({"userId": "testuser", "mood": 4, "notes": "Feeling good today"})
                            .to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let location = response.headers()[header::LOCATION].to_str().unwrap().to_string();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let check_in: CheckInResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(check_in.user_id, "testuser");
        assert_eq!(check_in.mood, 4);
        assert_eq!(check_in.notes.as_deref(), Some("Feeling good today"));
        assert!(check_in.id > 0);
        assert!(check_in.updated_at.is_none());
        assert_eq!(location, format!("/api/checkins/{}", check_in.id));
    }

    #[tokio::test]
    async fn test_create_invalid_mood_is_bad_request() {
        let (app, db) = app().await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/checkins",
            Some(json!({"userId": "testuser", "mood": 10, "notes": "Test notes"})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], 400);
        assert!(json["error"]["details"].get("mood").is_some());

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_empty_user_id_is_bad_request() {
        let (app, _db) = app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/checkins",
            Some(json!({"userId": "", "mood": 3, "notes": "Test notes"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_create_blank_user_id_is_bad_request() {
        let (app, db) = app().await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/checkins",
            Some(json!({"userId": "   ", "mood": 3})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"]["code"], 400);

        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM check_ins")
            .fetch_one(&db)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_create_with_naive_date_is_read_as_utc() {
        let (app, _db) = app().await;

        let created = create(
            &app,
            json!({"userId": "u", "mood": 3, "date": "2024-05-01T10:00:00"}),
        )
        .await;
        assert_eq!(
            created.date,
            Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap()
        );

        let (status, json) = send(
            &app,
            Method::PUT,
            &format!("/api/checkins/{}", created.id),
            Some(json!({"date": "2024-04-30"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let updated: CheckInResponse = serde_json::from_value(json).unwrap();
        assert_eq!(
            updated.date,
            Utc.with_ymd_and_hms(2024, 4, 30, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_create_missing_mood_is_bad_request() {
        let (app, _db) = app().await;

        let (status, json) = send(
            &app,
            Method::POST,
            "/api/checkins",
            Some(json!({"userId": "testuser"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"]["message"].is_string());
    }

    #[tokio::test]
    async fn test_create_notes_too_long_is_bad_request() {
        let (app, _db) = app().await;

        let (status, _) = send(
            &app,
            Method::POST,
            "/api/checkins",
            Some(json!({"userId": "testuser", "mood": 3, "notes": "x".repeat(501)})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_list_by_user_returns_only_that_user() {
        let (app, _db) = app().await;
        create(&app, json!({"userId": "testuser123", "mood": 3})).await;
        create(&app, json!({"userId": "someoneelse", "mood": 2})).await;

        let (status, json) =
            send(&app, Method::GET, "/api/checkins/user/testuser123", None).await;

        assert_eq!(status, StatusCode::OK);
        let rows: Vec<CheckInResponse> = serde_json::from_value(json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].user_id, "testuser123");
    }

    #[tokio::test]
    async fn test_list_by_unknown_user_is_empty_ok() {
        let (app, _db) = app().await;

        let (status, json) =
            send(&app, Method::GET, "/api/checkins/user/nonexistentuser", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json, json!([]));
    }

    #[tokio::test]
    async fn test_list_all_with_from_date() {
        let (app, _db) = app().await;
        let now = Utc::now();

        create(
            &app,
            json!({"userId": "u", "mood": 2, "date": now - Duration::days(10)}),
        )
        .await;
        let recent = create(
            &app,
            json!({"userId": "u", "mood": 4, "date": now - Duration::days(1)}),
        )
        .await;

        let from = (now - Duration::days(5)).date_naive();
        let (status, json) = send(
            &app,
            Method::GET,
            &format!("/api/checkins?fromDate={from}"),
            None,
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let rows: Vec<CheckInResponse> = serde_json::from_value(json).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, recent.id);
    }

    #[tokio::test]
    async fn test_list_with_bad_date_is_bad_request() {
        let (app, _db) = app().await;

        let (status, _) = send(&app, Method::GET, "/api/checkins?toDate=yesterday", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_get_existing_matches_created() {
        let (app, _db) = app().await;
        let created = create(
            &app,
            json!({"userId": "testuser", "mood": 5, "notes": "Great"}),
        )
        .await;

        let uri = format!("/api/checkins/{}", created.id);
        let (status, json) = send(&app, Method::GET, &uri, None).await;

        assert_eq!(status, StatusCode::OK);
        let fetched: CheckInResponse = serde_json::from_value(json).unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_get_missing_is_not_found() {
        let (app, _db) = app().await;

        let (status, json) = send(&app, Method::GET, "/api/checkins/999", None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"]["message"], "Check-in with ID 999 not found.");
    }

    #[tokio::test]
    async fn test_update_existing_returns_ok() {
        let (app, _db) = app().await;
        let created = create(
            &app,
            json!({"userId": "testuser", "mood": 2, "notes": "Original notes"}),
        )
        .await;

        let (status, json) = send(
            &app,
            Method::PUT,
            &format!("/api/checkins/{}", created.id),
            Some(json!({"mood": 5, "notes": "Updated notes"})),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let updated: CheckInResponse = serde_json::from_value(json).unwrap();
        assert_eq!(updated.mood, 5);
        assert_eq!(updated.notes.as_deref(), Some("Updated notes"));
        assert!(updated.updated_at.is_some());
        assert_eq!(updated.user_id, created.user_id);
        assert_eq!(updated.date, created.date);
        assert_eq!(updated.created_at, created.created_at);
    }

    #[tokio::test]
    async fn test_update_invalid_mood_is_bad_request() {
        let (app, _db) = app().await;
        let created = create(&app, json!({"userId": "testuser", "mood": 2})).await;

        let (status, _) = send(
            &app,
            Method::PUT,
            &format!("/api/checkins/{}", created.id),
            Some(json!({"mood": 0})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let (app, _db) = app().await;

        let (status, _) = send(
            &app,
            Method::PUT,
            "/api/checkins/999",
            Some(json!({"mood": 5, "notes": "Updated notes"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_delete_existing_then_missing() {
        let (app, _db) = app().await;
        let created = create(&app, json!({"userId": "testuser", "mood": 3})).await;
        let uri = format!("/api/checkins/{}", created.id);

        let (status, body) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        assert_eq!(body, Value::Null);

        let (status, _) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_storage_fault_is_server_error() {
        let (app, db) = app().await;
        db.close().await;

        let (status, json) = send(&app, Method::GET, "/api/checkins", None).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let message = json["error"]["message"].as_str().unwrap();
        assert!(message.starts_with("An error occurred: "));
    }
}
