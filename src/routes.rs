use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Form, Json, Router,
};
use include_dir::{include_dir, Dir};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use crate::{
    controller::SubmissionController,
    models::{FormSummary, ImageUpload},
    render::{self, CopyField, Notice, COPIED_MESSAGE},
    submission::Submission,
};

static ASSETS: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets");

const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub controller: Arc<SubmissionController>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index).post(submit))
        .route("/copy", post(copy))
        .route("/api/state", get(current_state))
        .route("/assets/*path", get(asset))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state)
}

fn render_page(controller: &SubmissionController, notice: Option<&Notice>) -> Html<String> {
    let form = FormSummary::from(&controller.form());
    Html(render::page(&form, &controller.submission(), notice))
}

pub async fn index(State(state): State<AppState>) -> Html<String> {
    render_page(&state.controller, None)
}

/// Keeps axum's status, so an oversize upload answers 413 rather than 400.
fn rejected(e: MultipartError) -> StatusCode {
    warn!("⚠️ Bad multipart body: {}", e);
    e.status()
}

pub async fn submit(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Html<String>, StatusCode> {
    let controller = &state.controller;

    while let Some(field) = multipart.next_field().await.map_err(rejected)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().map(str::to_string);
                let data = field.bytes().await.map_err(rejected)?;
                // browsers send an empty part when no file was picked; keep the previous one
                if !file_name.is_empty() || !data.is_empty() {
                    controller.set_image(Some(ImageUpload { file_name, content_type, data }));
                }
            }
            "product_name" => {
                controller.set_product_name(field.text().await.map_err(rejected)?);
            }
            "keywords" => {
                controller.set_keywords(field.text().await.map_err(rejected)?);
            }
            _ => {}
        }
    }

    controller.submit(controller.form()).await;
    Ok(render_page(controller, None))
}

#[derive(Debug, Deserialize)]
pub struct CopyRequest {
    pub field: CopyField,
}

pub async fn copy(State(state): State<AppState>, Form(body): Form<CopyRequest>) -> Response {
    let controller = &state.controller;
    let Some(payload) = controller.submission().payload().cloned() else {
        let notice = Notice::Error("Nothing to copy yet.".to_string());
        return (StatusCode::CONFLICT, render_page(controller, Some(&notice))).into_response();
    };

    match controller.copy_to_clipboard(&body.field.text(&payload)).await {
        Ok(()) => {
            info!("📋 Copied {:?} to clipboard", body.field);
            render_page(controller, Some(&Notice::Info(COPIED_MESSAGE.to_string()))).into_response()
        }
        Err(e) => {
            let notice = Notice::Error(format!("Could not copy to clipboard: {e}"));
            (StatusCode::INTERNAL_SERVER_ERROR, render_page(controller, Some(&notice))).into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StateView {
    #[serde(flatten)]
    pub submission: Submission,
    pub form: FormSummary,
}

pub async fn current_state(State(state): State<AppState>) -> Json<StateView> {
    Json(StateView {
        submission: state.controller.submission(),
        form: FormSummary::from(&state.controller.form()),
    })
}

pub async fn asset(Path(path): Path<String>) -> Response {
    let Some(file) = ASSETS.get_file(&path) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let content_type = match path.rsplit('.').next() {
        Some("css") => "text/css; charset=utf-8",
        Some("svg") => "image/svg+xml",
        _ => "application/octet-stream",
    };
    ([(header::CONTENT_TYPE, content_type)], file.contents()).into_response()
}
