use std::sync::Arc;

use axum::extract::{Json, Multipart, State};
use chrono::Utc;
use tracing::warn;

use super::{
    models::{MAX_UPLOAD_BYTES, UploadForm, UploadKind, UploadResponse, clean_order_ref},
    storage::{MediaStore, UploadFile},
};
use crate::{
    auth::AdminClaims,
    config::Config,
    order::checkout::{DocType, generate_order_id},
    utils::{AppError, AppMultipart, types::JsonResult},
};

async fn read_form(mut multipart: Multipart) -> Result<UploadForm, AppError> {
    let mut form = UploadForm::default();

    while let Some(field) = multipart.next_field().await? {
        let name = field.name().unwrap_or_default().to_owned();

        if name == "file" || field.file_name().is_some() {
            let file_name = field.file_name().unwrap_or("upload").to_owned();
            let content_type = field
                .content_type()
                .unwrap_or("application/octet-stream")
                .to_owned();
            let bytes = field.bytes().await?;

            form.file = Some(UploadFile {
                file_name,
                content_type,
                bytes,
            });
        } else {
            let value = field.text().await?;
            form.fields.insert(name, value);
        }
    }

    Ok(form)
}

fn checked_file(form: &mut UploadForm, kind: UploadKind) -> Result<UploadFile, AppError> {
    let file = form
        .file
        .take()
        .ok_or_else(|| AppError::Validation("file is required".to_owned()))?;

    if file.bytes.is_empty() {
        return Err(AppError::Validation("file is empty".to_owned()));
    }
    if file.bytes.len() > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation("file exceeds the 10 MB limit".to_owned()));
    }
    if !kind.accepts(&file.content_type) {
        return Err(AppError::Validation(format!(
            "{} files are not accepted here",
            file.content_type
        )));
    }

    Ok(file)
}

async fn store(
    http: &reqwest::Client,
    config: &Config,
    folder: &str,
    file: UploadFile,
) -> Result<String, AppError> {
    MediaStore::new(http, &config.media)
        .store(folder, file)
        .await
        .map_err(|e| {
            warn!(error = %e, folder, "upload failed");
            AppError::Upstream(e.to_string())
        })
}

async fn simple_upload(
    http: &reqwest::Client,
    config: &Config,
    multipart: Multipart,
    kind: UploadKind,
) -> JsonResult<UploadResponse> {
    let mut form = read_form(multipart).await?;
    let file = checked_file(&mut form, kind)?;
    let url = store(http, config, kind.folder(), file).await?;

    Ok(Json(UploadResponse {
        success: true,
        url,
        order_id: None,
        doc_type: None,
    }))
}

pub async fn upload_blog_media(
    _admin: AdminClaims,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppMultipart(multipart): AppMultipart,
) -> JsonResult<UploadResponse> {
    simple_upload(&http, &config, multipart, UploadKind::Blog).await
}

pub async fn upload_banner_image(
    _admin: AdminClaims,
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppMultipart(multipart): AppMultipart,
) -> JsonResult<UploadResponse> {
    simple_upload(&http, &config, multipart, UploadKind::Banner).await
}

pub async fn upload_file(
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppMultipart(multipart): AppMultipart,
) -> JsonResult<UploadResponse> {
    simple_upload(&http, &config, multipart, UploadKind::General).await
}

/// KYC upload during checkout. The first upload of a checkout has no order
/// reference yet; one is generated and returned for the following uploads.
pub async fn upload_order_document(
    State(config): State<Arc<Config>>,
    State(http): State<reqwest::Client>,
    AppMultipart(multipart): AppMultipart,
) -> JsonResult<UploadResponse> {
    let mut form = read_form(multipart).await?;

    let doc_type = form
        .field("docType")
        .or_else(|| form.field("doc_type"))
        .ok_or_else(|| AppError::Validation("docType is required".to_owned()))?
        .parse::<DocType>()?;

    let order_id = form
        .field("orderId")
        .or_else(|| form.field("order_id"))
        .and_then(clean_order_ref)
        .unwrap_or_else(|| generate_order_id(Utc::now()));

    let file = checked_file(&mut form, UploadKind::OrderDocument)?;
    let folder = format!("{}/{order_id}/{doc_type}", UploadKind::OrderDocument.folder());
    let url = store(&http, &config, &folder, file).await?;

    Ok(Json(UploadResponse {
        success: true,
        url,
        order_id: Some(order_id),
        doc_type: Some(doc_type.to_string()),
    }))
}
