//! HTTP handlers for the bucket's object operations.
//! All of them sit behind the access gate and delegate storage concerns to
//! `StorageService`. Download is the only handler that skips the JSON envelope.

use crate::{
    errors::AppError,
    models::{envelope::ApiResponse, object::ObjectResponse},
    services::storage_service::StorageService,
};
use axum::{
    Json,
    body::Body,
    extract::{Multipart, Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::Response,
};
use bytes::Bytes;
use serde::Deserialize;

/// Multipart field carrying the uploaded file.
const FILE_FIELD: &str = "file";

/// Query params accepted by `POST /s3/upload`.
#[derive(Debug, Deserialize)]
pub struct UploadQuery {
    pub key: Option<String>,
}

/// `GET /s3/objects` — every object in the bucket.
pub async fn list_objects(
    State(service): State<StorageService>,
) -> Result<Json<ApiResponse<Vec<ObjectResponse>>>, AppError> {
    let records = service.list_objects().await?;
    let objects: Vec<ObjectResponse> = records
        .iter()
        .map(|record| record.to_response(&service.public_url))
        .collect();

    Ok(Json(ApiResponse::data(objects)))
}

/// `POST /s3/upload?key=` — store the multipart `file` field.
///
/// The optional `key` query parameter overrides the uploaded file's name.
pub async fn upload_object(
    State(service): State<StorageService>,
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<()>>, AppError> {
    let (filename, payload) = read_file_field(&mut multipart).await?;

    let key = service
        .upload_object(query.key.as_deref(), filename.as_deref(), payload)
        .await?;

    Ok(Json(ApiResponse::message(format!(
        "File uploaded successfully as {key}."
    ))))
}

/// `GET /s3/download/{*key}` — raw object bytes.
pub async fn download_object(
    State(service): State<StorageService>,
    Path(key): Path<String>,
) -> Result<Response, AppError> {
    let body = service.download_object(&key).await?;

    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    set_download_headers(response.headers_mut(), &key, body.len());
    *response.body_mut() = Body::from(body);

    Ok(response)
}

/// `DELETE /s3/delete/{*key}` — remove an object; absent keys succeed too.
pub async fn delete_object(
    State(service): State<StorageService>,
    Path(key): Path<String>,
) -> Result<Json<ApiResponse<()>>, AppError> {
    service.delete_object(&key).await?;

    Ok(Json(ApiResponse::message(format!(
        "File {key} deleted successfully."
    ))))
}

/// Pull the `file` field out of the form, skipping any other fields.
async fn read_file_field(
    multipart: &mut Multipart,
) -> Result<(Option<String>, Bytes), AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| AppError::new(err.status(), err.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().map(str::to_string);
        let payload = field
            .bytes()
            .await
            .map_err(|err| AppError::new(err.status(), err.body_text()))?;
        return Ok((filename, payload));
    }

    Err(AppError::bad_request("multipart field `file` is required"))
}

fn set_download_headers(headers: &mut HeaderMap, key: &str, len: usize) {
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/octet-stream"),
    );
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(len));

    let filename = key.rsplit('/').next().unwrap_or(key).replace('"', "");
    if let Ok(value) = HeaderValue::from_str(&format!("attachment; filename=\"{filename}\"")) {
        headers.insert(header::CONTENT_DISPOSITION, value);
    }
}
