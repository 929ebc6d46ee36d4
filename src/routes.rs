use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::{
    database,
    error::AppError,
    models::{
        ApiResponse, ClassificationResult, ClassifyRequest, Course, SaveCourseRequest, SavedCourse,
        Stream, Subject,
    },
    state::AppState,
};

fn classification_envelope(
    result: Option<ClassificationResult>,
) -> Json<ApiResponse<ClassificationResult>> {
    // No matching stream is an empty success, not an error.
    Json(match result {
        Some(result) => ApiResponse::ok(result),
        None => ApiResponse::none(),
    })
}

pub async fn classify_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<ClassifyRequest>,
) -> Result<Json<ApiResponse<ClassificationResult>>, AppError> {
    let result = state.combinations.classify(&payload.subject_ids)?;

    Ok(classification_envelope(result))
}

/// Path-parameter convenience form of [`classify_handler`].
pub async fn validate_handler(
    State(state): State<Arc<AppState>>,
    Path((subject_id1, subject_id2, subject_id3)): Path<(i64, i64, i64)>,
) -> Result<Json<ApiResponse<ClassificationResult>>, AppError> {
    let result = state
        .combinations
        .classify(&[subject_id1, subject_id2, subject_id3])?;

    Ok(classification_envelope(result))
}

pub async fn streams_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Stream>>>, AppError> {
    let streams = database::list_streams(&state.pool).await?;

    Ok(Json(ApiResponse::ok(streams)))
}

pub async fn subjects_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Subject>>>, AppError> {
    let subjects = database::list_subjects(&state.pool).await?;

    Ok(Json(ApiResponse::ok(subjects)))
}

pub async fn stream_courses_handler(
    State(state): State<Arc<AppState>>,
    Path(stream_id): Path<i64>,
) -> Result<Json<ApiResponse<Vec<Course>>>, AppError> {
    let courses = database::courses_for_stream(&state.pool, stream_id).await?;

    Ok(Json(ApiResponse::ok(courses)))
}

pub async fn save_course_handler(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SaveCourseRequest>,
) -> Result<Json<ApiResponse<SavedCourse>>, AppError> {
    if !database::course_exists(&state.pool, payload.course_id).await? {
        return Err(AppError::NotFound("Course"));
    }

    let saved = database::save_course(&state.pool, &payload.user_ref, payload.course_id).await?;

    Ok(Json(ApiResponse::ok(saved)))
}

/// Removing an absent bookmark is a no-op, keeping the toggle idempotent.
pub async fn remove_saved_course_handler(
    State(state): State<Arc<AppState>>,
    Path((user_ref, course_id)): Path<(String, i64)>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    database::remove_saved_course(&state.pool, &user_ref, course_id).await?;

    Ok(Json(ApiResponse::none()))
}

pub async fn saved_courses_handler(
    State(state): State<Arc<AppState>>,
    Path(user_ref): Path<String>,
) -> Result<Json<ApiResponse<Vec<Course>>>, AppError> {
    let courses = database::saved_courses_for_user(&state.pool, &user_ref).await?;

    Ok(Json(ApiResponse::ok(courses)))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{header::CONTENT_TYPE, Request, StatusCode},
        Router,
    };
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tempfile::{tempdir, TempDir};
    use tower::ServiceExt;

    use crate::{app, config::Config, models::*, state::AppState};

    async fn test_app() -> (TempDir, Router) {
        let dir = tempdir().expect("Failed to create temp dir");
        let db_path = dir.path().join("test.sqlite");

        let config = Config {
            port: 0,
            database_url: format!("sqlite://{}?mode=rwc", db_path.display()),
            seed_on_start: true,
        };

        let state = AppState::new(config).await.expect("Failed to build state");

        (dir, app(state))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn classify_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/streams/classify")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn classify_matches_seeded_combination() {
        let (_dir, app) = test_app().await;

        let response = app
            .oneshot(classify_request(json!({ "subjectIds": [3, 1, 2] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"]["streamName"], json!("Physical Science Stream"));
        assert_eq!(
            body["data"]["matchedRule"],
            json!("combined-maths-physics-chemistry")
        );
        assert_eq!(body["data"]["subjectIds"], json!([1, 2, 3]));
    }

    #[tokio::test]
    async fn classify_unknown_triple_is_empty_success() {
        let (_dir, app) = test_app().await;

        let response = app
            .oneshot(classify_request(json!({ "subjectIds": [1, 2, 4] })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(true));
        assert_eq!(body["data"], Value::Null);
    }

    #[tokio::test]
    async fn classify_rejects_invalid_selections() {
        for payload in [
            json!({ "subjectIds": [1, 2] }),
            json!({ "subjectIds": [1, 2, 3, 4] }),
            json!({ "subjectIds": [] }),
            json!({ "subjectIds": [0, 2, 3] }),
            json!({ "subjectIds": [-1, 2, 3] }),
            json!({ "subjectIds": [1, 1, 3] }),
        ] {
            let (_dir, app) = test_app().await;

            let response = app.oneshot(classify_request(payload)).await.unwrap();

            assert_eq!(response.status(), StatusCode::BAD_REQUEST);

            let body = body_json(response).await;
            assert_eq!(body["success"], json!(false));
            assert_eq!(body["error"], json!("Invalid subject selection"));
            assert!(body["details"].is_string());
        }
    }

    #[tokio::test]
    async fn validate_path_variant_matches_body_variant() {
        let (_dir, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/streams/validate/2/3/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let path_body = body_json(response).await;

        let response = app
            .oneshot(classify_request(json!({ "subjectIds": [1, 2, 3] })))
            .await
            .unwrap();
        let post_body = body_json(response).await;

        assert_eq!(path_body, post_body);
    }

    #[tokio::test]
    async fn streams_and_subjects_are_listed() {
        let (_dir, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/streams")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ApiResponse<Vec<Stream>> = serde_json::from_slice(&bytes).unwrap();
        assert!(envelope.success);
        assert_eq!(envelope.data.unwrap().len(), 5);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/subjects")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ApiResponse<Vec<Subject>> = serde_json::from_slice(&bytes).unwrap();
        assert!(!envelope.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn stream_courses_are_listed() {
        let (_dir, app) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/streams/1/courses")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ApiResponse<Vec<Course>> = serde_json::from_slice(&bytes).unwrap();
        let courses = envelope.data.unwrap();
        assert!(!courses.is_empty());
        assert!(courses.iter().all(|c| c.stream_id == 1));
    }

    #[tokio::test]
    async fn saved_course_flow_over_http() {
        let (_dir, app) = test_app().await;

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/saved-courses")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "userRef": "student-1", "courseId": 2 }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/api/saved-courses/student-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ApiResponse<Vec<Course>> = serde_json::from_slice(&bytes).unwrap();
        let saved = envelope.data.unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].name, "Computer Science");

        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .method("DELETE")
                    .uri("/api/saved-courses/student-1/2")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/api/saved-courses/student-1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let envelope: ApiResponse<Vec<Course>> = serde_json::from_slice(&bytes).unwrap();
        assert!(envelope.data.unwrap().is_empty());
    }

    #[tokio::test]
    async fn saving_unknown_course_is_not_found() {
        let (_dir, app) = test_app().await;

        let response = app
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/saved-courses")
                    .header(CONTENT_TYPE, "application/json")
                    .body(Body::from(
                        json!({ "userRef": "student-1", "courseId": 999 }).to_string(),
                    ))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["success"], json!(false));
    }
}
