// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license

//! HTTP service for wrist posture checks.
//!
//! `POST /check_ergonomics` takes a multipart upload with an `image` field and
//! answers with the wrist verdict plus the detected body landmarks.

use std::sync::Arc;

use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State},
    http::StatusCode,
    response::{Html, Json},
    routing::{get, post},
};
use tokio::sync::Mutex;
use utoipa::OpenApi;

use crate::api::{ErgonomicsResponse, ErrorResponse, HealthResponse, InfoResponse, LandmarkData};
use crate::config::ServerConfig;
use crate::ergonomics::ErgonomicBand;
use crate::error::{ErgonomicsError, Result};
use crate::landmark::PoseLandmark;
use crate::provider::{PoseProvider, ProviderInfo};

type ApiError = (StatusCode, Json<ErrorResponse>);

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html>
<head><title>Wrist Ergonomics</title></head>
<body>
<h1>Wrist Ergonomics Server</h1>
<p>POST an image as the multipart field <code>image</code> to <code>/check_ergonomics</code>.</p>
<p>OpenAPI document at <a href="/api-docs/openapi.json">/api-docs/openapi.json</a>.</p>
</body>
</html>
"#;

/// Shared application state.
pub struct AppState {
    provider: Mutex<Box<dyn PoseProvider>>,
    band: ErgonomicBand,
}

impl AppState {
    /// Wrap a provider. Requests are served one inference at a time.
    #[must_use]
    pub fn new(provider: Box<dyn PoseProvider>, band: ErgonomicBand) -> Self {
        Self {
            provider: Mutex::new(provider),
            band,
        }
    }

    #[must_use]
    pub const fn band(&self) -> &ErgonomicBand {
        &self.band
    }
}

// OpenAPI Documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Wrist Ergonomics Server",
        description = "Pose-based wrist posture checks. Upload an image to `/check_ergonomics` and receive the verdict with 33 body landmarks.",
        license(name = "AGPL-3.0", url = "https://ultralytics.com/license")
    ),
    paths(root, health, info, check_ergonomics),
    components(schemas(
        LandmarkData,
        ErgonomicsResponse,
        ErrorResponse,
        HealthResponse,
        InfoResponse,
        ProviderInfo,
        ErgonomicBand
    )),
    tags(
        (name = "ergonomics", description = "Posture check endpoints"),
        (name = "health", description = "Health check endpoints")
    )
)]
pub struct ApiDoc;

/// Build the application router.
pub fn router(state: Arc<AppState>, body_limit: usize) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/info", get(info))
        .route("/check_ergonomics", post(check_ergonomics))
        .route("/api-docs/openapi.json", get(openapi))
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

/// Bind the configured address and serve until the process is stopped.
///
/// # Errors
///
/// Returns an error if the address can't be bound or the server fails.
pub async fn serve(config: &ServerConfig, provider: Box<dyn PoseProvider>) -> Result<()> {
    let state = Arc::new(AppState::new(provider, config.band));
    let app = router(state, config.body_limit);

    let listener = tokio::net::TcpListener::bind(config.addr()).await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;
    Ok(())
}

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

fn provider_error(e: &ErgonomicsError) -> ApiError {
    let status = if e.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    error_response(status, format!("Pose estimation failed: {e}"))
}

/// Root endpoint
///
/// Returns a short HTML page describing the service.
#[utoipa::path(
    get,
    path = "/",
    tag = "health",
    responses(
        (status = 200, description = "Landing page", body = String, content_type = "text/html")
    )
)]
async fn root() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Server is healthy", body = HealthResponse)
    )
)]
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: crate::VERSION.to_string(),
    })
}

/// Provider information endpoint
///
/// Returns the pose provider description and the accepted wrist ratio band.
#[utoipa::path(
    get,
    path = "/info",
    tag = "ergonomics",
    responses(
        (status = 200, description = "Provider information", body = InfoResponse)
    )
)]
async fn info(State(state): State<Arc<AppState>>) -> Json<InfoResponse> {
    let provider = state.provider.lock().await.info();
    Json(InfoResponse {
        provider,
        band: state.band,
        landmark_names: PoseLandmark::ALL
            .iter()
            .map(|l| l.as_str().to_string())
            .collect(),
    })
}

async fn openapi() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Check wrist posture in an image
///
/// Upload an image as the multipart field `image`. `is_ergonomic` is `null`
/// and `landmarks` is empty when no person is detected.
#[utoipa::path(
    post,
    path = "/check_ergonomics",
    tag = "ergonomics",
    request_body(content_type = "multipart/form-data", description = "Image file to analyze"),
    responses(
        (status = 200, description = "Posture checked", body = ErgonomicsResponse),
        (status = 400, description = "Bad request - invalid image or missing field", body = ErrorResponse),
        (status = 500, description = "Pose estimation failed", body = ErrorResponse)
    )
)]
async fn check_ergonomics(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> std::result::Result<Json<ErgonomicsResponse>, ApiError> {
    tracing::info!("Received request to /check_ergonomics");

    while let Some(field) = multipart.next_field().await.map_err(|e| {
        error_response(
            StatusCode::BAD_REQUEST,
            format!("Failed to read multipart body: {e}"),
        )
    })? {
        if field.name() != Some("image") {
            continue;
        }

        let data = field.bytes().await.map_err(|e| {
            error_response(StatusCode::BAD_REQUEST, format!("Failed to read field: {e}"))
        })?;

        let img = image::load_from_memory(&data)
            .map_err(|e| error_response(StatusCode::BAD_REQUEST, format!("Invalid image: {e}")))?;

        let landmarks = {
            let mut provider = state.provider.lock().await;
            provider.estimate(&img).map_err(|e| {
                tracing::error!("Pose estimation failed: {e}");
                provider_error(&e)
            })?
        };

        let response =
            ErgonomicsResponse::from_pose(landmarks.as_ref(), img.width(), img.height(), &state.band);
        tracing::info!("Successfully processed request to /check_ergonomics");
        return Ok(Json(response));
    }

    Err(error_response(
        StatusCode::BAD_REQUEST,
        "Missing 'image' field",
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::landmark::{Landmark, LandmarkSet, NUM_LANDMARKS};
    use axum::body::Body;
    use axum::http::{Request, header};
    use http_body_util::BodyExt;
    use image::DynamicImage;
    use std::io::Cursor;
    use tower::ServiceExt;

    const BOUNDARY: &str = "ergonomics-test-boundary";

    enum Canned {
        Pose(LandmarkSet),
        Nobody,
        Fail,
        BadOutput,
    }

    struct MockProvider(Canned);

    impl PoseProvider for MockProvider {
        fn estimate(&mut self, _image: &DynamicImage) -> Result<Option<LandmarkSet>> {
            match &self.0 {
                Canned::Pose(set) => Ok(Some(set.clone())),
                Canned::Nobody => Ok(None),
                Canned::Fail => Err(ErgonomicsError::InferenceError("boom".to_string())),
                Canned::BadOutput => Err(ErgonomicsError::LandmarkError(
                    "expected 33 landmarks, got 12".to_string(),
                )),
            }
        }

        fn info(&self) -> ProviderInfo {
            ProviderInfo {
                name: "mock".to_string(),
                imgsz: (256, 256),
                min_detection_confidence: 0.5,
            }
        }
    }

    /// Arms laid along the x axis with the wrist halfway to the hand.
    fn neutral_pose() -> LandmarkSet {
        let mut points = [Landmark::default(); NUM_LANDMARKS];
        for (elbow, wrist, index, pinky) in [
            (PoseLandmark::LeftElbow, PoseLandmark::LeftWrist, PoseLandmark::LeftIndex, PoseLandmark::LeftPinky),
            (PoseLandmark::RightElbow, PoseLandmark::RightWrist, PoseLandmark::RightIndex, PoseLandmark::RightPinky),
        ] {
            points[elbow.index()] = Landmark::new(0.1, 0.5, 0.0);
            points[wrist.index()] = Landmark::new(0.2, 0.5, 0.0);
            points[index.index()] = Landmark::new(0.3, 0.48, 0.0);
            points[pinky.index()] = Landmark::new(0.3, 0.52, 0.0);
        }
        LandmarkSet::new(points)
    }

    fn app(canned: Canned) -> Router {
        let state = Arc::new(AppState::new(
            Box::new(MockProvider(canned)),
            ErgonomicBand::DEFAULT,
        ));
        router(state, 1024 * 1024)
    }

    fn png_bytes() -> Vec<u8> {
        let img = DynamicImage::new_rgb8(64, 48);
        let mut buf = Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    fn multipart_request(field: &str, payload: &[u8]) -> Request<Body> {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field}\"; filename=\"frame.png\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(payload);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        Request::builder()
            .method("POST")
            .uri("/check_ergonomics")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_pose_returns_verdict_and_landmarks() {
        let response = app(Canned::Pose(neutral_pose()))
            .oneshot(multipart_request("image", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["is_ergonomic"], serde_json::json!(true));
        let landmarks = json["landmarks"].as_array().unwrap();
        assert_eq!(landmarks.len(), NUM_LANDMARKS);
        assert_eq!(landmarks[0]["name"], "NOSE");
        assert_eq!(landmarks[16]["name"], "RIGHT_WRIST");
    }

    #[tokio::test]
    async fn test_no_person_returns_null() {
        let response = app(Canned::Nobody)
            .oneshot(multipart_request("image", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            json_body(response).await,
            serde_json::json!({ "is_ergonomic": null, "landmarks": [] })
        );
    }

    #[tokio::test]
    async fn test_missing_field_is_bad_request() {
        let response = app(Canned::Nobody)
            .oneshot(multipart_request("photo", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await["error"], "Missing 'image' field");
    }

    #[tokio::test]
    async fn test_garbage_bytes_is_bad_request() {
        let response = app(Canned::Nobody)
            .oneshot(multipart_request("image", b"definitely not an image"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = json_body(response).await;
        assert!(json["error"].as_str().unwrap().starts_with("Invalid image"));
    }

    #[tokio::test]
    async fn test_provider_failure_is_server_error() {
        let response = app(Canned::Fail)
            .oneshot(multipart_request("image", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_malformed_model_output_is_server_error() {
        let response = app(Canned::BadOutput)
            .oneshot(multipart_request("image", &png_bytes()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_health_and_info() {
        let app = app(Canned::Nobody);

        let response = app
            .clone()
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "healthy");

        let response = app
            .oneshot(Request::get("/info").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let json = json_body(response).await;
        assert_eq!(json["provider"]["name"], "mock");
        assert_eq!(json["landmark_names"].as_array().unwrap().len(), NUM_LANDMARKS);
    }

    #[tokio::test]
    async fn test_openapi_lists_check_route() {
        let response = app(Canned::Nobody)
            .oneshot(
                Request::get("/api-docs/openapi.json")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert!(json["paths"]["/check_ergonomics"].is_object());
    }
}
