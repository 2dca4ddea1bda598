//! HTTP route handlers for the generation API.

use std::fs;

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use forge::client::ChatError;
use forge::pipeline::{JobOptions, start_job};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::error;

use crate::state::AppState;

/// Build the API router.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/", get(root))
        .route("/status/{job_id}", get(get_status))
        .route("/download/{job_id}", get(download))
        .route("/generate", post(generate))
}

/// Error body in the `{"detail": ...}` shape clients already expect.
#[derive(Debug, Serialize)]
struct ErrorBody {
    detail: String,
}

type ApiError = (StatusCode, Json<ErrorBody>);

fn not_found() -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            detail: "Job not found".to_string(),
        }),
    )
}

/// GET / - health check.
async fn root() -> Json<Value> {
    Json(json!({ "message": "forge API is running" }))
}

#[derive(Serialize)]
struct StatusResponse {
    job_id: String,
    status: String,
}

/// GET /status/{job_id} - current phase string, 404 for unknown jobs.
async fn get_status(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let status = state.registry.status(&job_id).ok_or_else(not_found)?;
    Ok(Json(StatusResponse { job_id, status }))
}

/// GET /download/{job_id} - zip the job directory (once) and return it.
async fn download(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> Result<Response, ApiError> {
    if !state.jobs_root.join(&job_id).is_dir() {
        return Err(not_found());
    }

    let jobs_root = state.jobs_root.clone();
    let id = job_id.clone();
    let zip_path = tokio::task::spawn_blocking(move || {
        forge::archive::ensure_archive(&jobs_root, &id)
    })
    .await
    .map_err(|e| internal(&anyhow::anyhow!("archive task failed: {e}")))?
    .map_err(|e| internal(&e))?;

    let bytes = fs::read(&zip_path).map_err(|e| internal(&anyhow::anyhow!("read archive: {e}")))?;

    let headers = [
        (header::CONTENT_TYPE, "application/zip".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{job_id}.zip\""),
        ),
    ];
    Ok((headers, bytes).into_response())
}

#[derive(Debug, Deserialize)]
struct GenerateRequest {
    prompt: String,
    #[serde(default)]
    recursion_limit: Option<u32>,
}

#[derive(Serialize)]
struct GenerateResponse {
    job_id: String,
}

/// POST /generate - run the full pipeline synchronously, return the job id.
///
/// Rate-limit failures from the model backend map to 429; everything else
/// to 500 with the error message.
async fn generate(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let options = JobOptions {
        recursion_limit: req
            .recursion_limit
            .unwrap_or(state.config.default_recursion_limit),
    };

    let result = tokio::task::spawn_blocking(move || {
        start_job(
            &state.jobs_root,
            &req.prompt,
            &options,
            state.client.as_ref(),
            &state.registry,
        )
    })
    .await
    .map_err(|e| internal(&anyhow::anyhow!("pipeline task failed: {e}")))?;

    match result {
        Ok(job_id) => Ok(Json(GenerateResponse { job_id })),
        Err(err) => Err(map_pipeline_error(&err)),
    }
}

/// Classify a pipeline failure: upstream rate limit → 429, anything else → 500.
fn map_pipeline_error(err: &anyhow::Error) -> ApiError {
    let rate_limited = err.chain().any(|cause| {
        cause
            .downcast_ref::<ChatError>()
            .is_some_and(|e| matches!(e, ChatError::RateLimited { .. }))
    });
    if rate_limited {
        return (
            StatusCode::TOO_MANY_REQUESTS,
            Json(ErrorBody {
                detail: "Model rate limit reached. Please try again later.".to_string(),
            }),
        );
    }
    error!(error = %format!("{err:#}"), "generate failed");
    internal(err)
}

fn internal(err: &anyhow::Error) -> ApiError {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorBody {
            detail: format!("{err:#}"),
        }),
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::{Body, to_bytes};
    use axum::http::Request;
    use forge::config::ForgeConfig;
    use forge::test_support::{
        ScriptedChatClient, ScriptedReply, coder_reply, sample_plan_reply,
        sample_task_plan_reply,
    };
    use tower::ServiceExt;

    use super::*;

    fn app(temp: &tempfile::TempDir, replies: Vec<ScriptedReply>) -> (Router, AppState) {
        let state = AppState::new(
            temp.path().to_path_buf(),
            ForgeConfig::default(),
            Arc::new(ScriptedChatClient::new(replies)),
        );
        let app = api_router().with_state(state.clone());
        (app, state)
    }

    fn happy_replies() -> Vec<ScriptedReply> {
        vec![
            ScriptedReply::Text(sample_plan_reply()),
            ScriptedReply::Text(sample_task_plan_reply()),
            ScriptedReply::Text(coder_reply("<h1>todo</h1>")),
            ScriptedReply::Text(coder_reply("console.log('todo');")),
        ]
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        serde_json::from_slice(&bytes).expect("json body")
    }

    #[tokio::test]
    async fn health_check_reports_running() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (app, _state) = app(&temp, Vec::new());

        let response = app
            .oneshot(Request::get("/").body(Body::empty()).expect("request"))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert!(body["message"].as_str().expect("message").contains("running"));
    }

    /// A status request for a non-existent job yields 404.
    #[tokio::test]
    async fn status_unknown_job_is_404() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (app, _state) = app(&temp, Vec::new());

        let response = app
            .oneshot(
                Request::get("/status/nope")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = body_json(response).await;
        assert_eq!(body["detail"], "Job not found");
    }

    /// A download request for a non-existent job yields 404.
    #[tokio::test]
    async fn download_unknown_job_is_404() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (app, _state) = app(&temp, Vec::new());

        let response = app
            .oneshot(
                Request::get("/download/nope")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn generate_then_status_then_download() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (app, state) = app(&temp, happy_replies());

        let response = app
            .clone()
            .oneshot(
                Request::post("/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(
                        json!({ "prompt": "build a todo app" }).to_string(),
                    ))
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        let job_id = body_json(response).await["job_id"]
            .as_str()
            .expect("job id")
            .to_string();

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/status/{job_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "DONE");

        let response = app
            .clone()
            .oneshot(
                Request::get(format!("/download/{job_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response
                .headers()
                .get(header::CONTENT_TYPE)
                .expect("content type"),
            "application/zip"
        );

        // The cached archive is served as-is on later downloads.
        let zip_path = forge::archive::archive_path(&state.jobs_root, &job_id);
        assert!(zip_path.is_file());
        fs::write(&zip_path, b"sentinel").expect("overwrite");

        let response = app
            .oneshot(
                Request::get(format!("/download/{job_id}"))
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        assert_eq!(&bytes[..], b"sentinel");
    }

    /// A rate-limited model reply surfaces as HTTP 429.
    #[tokio::test]
    async fn generate_maps_rate_limit_to_429() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (app, _state) = app(&temp, vec![ScriptedReply::RateLimited]);

        let response = app
            .oneshot(
                Request::post("/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "prompt": "anything" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        let body = body_json(response).await;
        assert!(body["detail"].as_str().expect("detail").contains("rate limit"));
    }

    /// Any other pipeline failure surfaces as HTTP 500 with its message.
    #[tokio::test]
    async fn generate_maps_other_failures_to_500() {
        let temp = tempfile::tempdir().expect("tempdir");
        let (app, _state) = app(
            &temp,
            vec![ScriptedReply::Text("not json at all".to_string())],
        );

        let response = app
            .oneshot(
                Request::post("/generate")
                    .header("content-type", "application/json")
                    .body(Body::from(json!({ "prompt": "anything" }).to_string()))
                    .expect("request"),
            )
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(
            body["detail"]
                .as_str()
                .expect("detail")
                .contains("parse model reply")
        );
    }
}
