//! server::upload
//!
//! `POST /upload?vocabulary_name=..&repo_full_name=..`
//!
//! The vocabulary arrives either as the `file` field of a multipart form,
//! named by its filename, or as the raw request body, named
//! `<vocabulary_name>.rdf`.

use axum::body::Bytes;
use axum::extract::{FromRequest, Multipart, Query, Request, State};
use axum::http::header::CONTENT_TYPE;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span, Instrument};
use uuid::Uuid;

use super::error::AppError;
use super::AppState;
use crate::publish::PublicationRequest;

/// Query parameters of an upload.
#[derive(Debug, Default, Deserialize)]
pub struct UploadParams {
    pub vocabulary_name: Option<String>,
    pub repo_full_name: Option<String>,
}

/// Successful upload response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadFileResponse {
    pub success: bool,
    pub original_filename: String,
    pub repo_full_name: String,
    pub pull_request_branch: String,
    pub pushed_filename: String,
    pub pull_request_url: String,
    pub msg: String,
}

pub async fn upload(
    State(state): State<AppState>,
    Query(params): Query<UploadParams>,
    request: Request,
) -> Response {
    let request_id = Uuid::new_v4();
    let span = info_span!("upload", %request_id);
    match handle_upload(&state, params, request).instrument(span).await {
        Ok(body) => Json(body).into_response(),
        Err(err) => err.into_response_with_id(request_id),
    }
}

async fn handle_upload(
    state: &AppState,
    params: UploadParams,
    request: Request,
) -> Result<UploadFileResponse, AppError> {
    info!("requested file upload");

    let vocabulary_name = params.vocabulary_name.ok_or_else(|| {
        AppError::BadRequest("Please provide 'vocabulary_name' query parameter.".into())
    })?;
    let repo_full_name = params.repo_full_name.ok_or_else(|| {
        AppError::BadRequest("Please provide 'repo_full_name' query parameter.".into())
    })?;

    let (file_name, content) = read_upload(request, &vocabulary_name).await?;
    info!(
        file = %file_name,
        repo = %repo_full_name,
        vocabulary = %vocabulary_name,
        bytes = content.len(),
        "file will be pushed"
    );

    let publication = PublicationRequest::new(
        vocabulary_name,
        &repo_full_name,
        file_name.as_str(),
        content,
        Local::now().naive_local(),
    )?;
    let result = state.publisher.publish(&publication).await?;

    let msg = result.summary(&file_name);
    info!("{}", msg);

    Ok(UploadFileResponse {
        success: true,
        original_filename: file_name,
        repo_full_name: result.repository_full_name,
        pull_request_branch: result.branch_name,
        pushed_filename: result.pushed_file_name,
        pull_request_url: result.pull_request_url,
        msg,
    })
}

/// Extract the file name and bytes from a multipart or raw body.
async fn read_upload(request: Request, vocabulary_name: &str) -> Result<(String, Vec<u8>), AppError> {
    let content_type = request
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if !content_type.starts_with("multipart/form-data") {
        debug!(content_type, "reading vocabulary from request body");
        let body = Bytes::from_request(request, &())
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok((format!("{}.rdf", vocabulary_name), body.to_vec()));
    }

    debug!("reading vocabulary from multipart 'file' field");
    let mut multipart = Multipart::from_request(request, &())
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .ok_or_else(|| AppError::BadRequest("'file' attachment has no filename.".into()))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.body_text()))?;
        return Ok((file_name, bytes.to_vec()));
    }

    Err(AppError::BadRequest(
        "Please provide a valid 'file' attachment in RDF/XML format.".into(),
    ))
}
