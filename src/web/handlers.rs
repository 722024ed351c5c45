use crate::core::export::to_csv;
use crate::core::loader::{parse_table, TableFormat};
use crate::core::pipeline::build_shortlist;
use crate::domain::model::{FilterOutcome, LoadedTable};
use crate::utils::error::{FinderError, Result};
use crate::web::form::FilterForm;
use crate::web::render::{self, NoticeKind, ResultsPage};
use crate::web::session::{session_cookie, session_id_from_headers, SessionStore, UploadedFile};
use crate::web::AppState;
use axum::extract::{Multipart, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use chrono::Utc;

fn shortlist(loaded: &LoadedTable, form: &FilterForm) -> Result<FilterOutcome> {
    let criteria = form.to_criteria()?;
    Ok(build_shortlist(loaded, &criteria, form.sort_spec()))
}

/// The file uploaded under this browser's cookie, if it is still alive.
async fn session_file(state: &AppState, headers: &HeaderMap) -> Result<UploadedFile> {
    let id = session_id_from_headers(headers).ok_or(FinderError::SessionNotFound)?;
    state
        .sessions
        .get(&id)
        .await
        .ok_or(FinderError::SessionNotFound)
}

pub async fn index(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(form): Query<FilterForm>,
) -> Response {
    let uploaded = match session_file(&state, &headers).await {
        Ok(uploaded) => uploaded,
        Err(_) => return Html(render::upload_page(None)).into_response(),
    };

    let outcome = shortlist(&uploaded.loaded, &form).map_err(|e| e.user_friendly_message());
    if let Ok(outcome) = &outcome {
        tracing::debug!(
            "Matched {} of {} candidates in {}",
            outcome.view.matched(),
            outcome.view.total(),
            uploaded.file_name
        );
    }

    let page = ResultsPage {
        file_name: &uploaded.file_name,
        form: &form,
        outcome,
        max_rows: state.config.display.preview_rows,
    };
    Html(render::results_page(&page)).into_response()
}

fn upload_error(status: StatusCode, message: &str) -> Response {
    (
        status,
        Html(render::upload_page(Some((NoticeKind::Error, message)))),
    )
        .into_response()
}

async fn read_upload(multipart: &mut Multipart) -> std::result::Result<Option<(String, Vec<u8>)>, String> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Upload failed: {}", e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| format!("Upload failed: {}", e.body_text()))?;
        if file_name.is_empty() && data.is_empty() {
            return Ok(None);
        }
        return Ok(Some((file_name, data.to_vec())));
    }
    Ok(None)
}

pub async fn upload(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Response {
    let (file_name, data) = match read_upload(&mut multipart).await {
        Ok(Some(upload)) => upload,
        Ok(None) => return upload_error(StatusCode::BAD_REQUEST, "Choose a file to upload."),
        Err(message) => {
            tracing::warn!("⚠️ {}", message);
            return upload_error(StatusCode::BAD_REQUEST, &message);
        }
    };

    let format = TableFormat::detect(&file_name, &data);
    let loaded = match parse_table(&file_name, &data, format) {
        Ok(loaded) => loaded,
        Err(e) => {
            tracing::warn!("❌ Rejected upload '{}': {}", file_name, e);
            return upload_error(StatusCode::UNPROCESSABLE_ENTITY, &e.user_friendly_message());
        }
    };

    tracing::info!(
        "📥 Uploaded '{}': {} rows ({} skipped)",
        file_name,
        loaded.table.len(),
        loaded.report.skipped.len()
    );

    // 只沿用仍有效的 session，其餘一律發新 id
    let session_id = match session_id_from_headers(&headers) {
        Some(id) if state.sessions.contains(&id).await => id,
        _ => SessionStore::new_session_id(),
    };
    state
        .sessions
        .insert(
            &session_id,
            UploadedFile {
                file_name,
                loaded,
                uploaded_at: Utc::now(),
            },
        )
        .await;

    (
        StatusCode::SEE_OTHER,
        [
            (header::LOCATION, "/".to_string()),
            (header::SET_COOKIE, session_cookie(&session_id)),
        ],
    )
        .into_response()
}

pub async fn download(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(form): Query<FilterForm>,
) -> Response {
    let uploaded = match session_file(&state, &headers).await {
        Ok(uploaded) => uploaded,
        Err(e) => {
            tracing::debug!("Download without upload: {}", e);
            return Redirect::to("/").into_response();
        }
    };

    let csv = shortlist(&uploaded.loaded, &form).and_then(|outcome| to_csv(&outcome.view));
    match csv {
        Ok(bytes) => (
            [
                (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!(
                        "attachment; filename=\"{}\"",
                        state.config.display.download_filename
                    ),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(e @ FinderError::InvalidCriteriaError { .. }) => {
            (StatusCode::UNPROCESSABLE_ENTITY, e.user_friendly_message()).into_response()
        }
        Err(e) => {
            tracing::error!("❌ Download failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.user_friendly_message()).into_response()
        }
    }
}

pub async fn reset(State(state): State<AppState>, headers: HeaderMap) -> Redirect {
    if let Some(id) = session_id_from_headers(&headers) {
        if state.sessions.remove(&id).await {
            tracing::info!("🗑️ Session file discarded");
        }
    }
    Redirect::to("/")
}

pub async fn health() -> &'static str {
    "ok"
}
