use std::path::{Component, Path};

use axum::body::Bytes;
use chrono::Utc;
use reqwest::{StatusCode, multipart};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::config::MediaConfig;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media host answered {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid storage folder {0}")]
    Folder(String),
}

#[derive(Debug)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

#[derive(Debug, Deserialize)]
struct CloudinaryResponse {
    secure_url: String,
}

/// Keeps ASCII letters, digits, dot, dash and underscore.
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();

    let cleaned = cleaned.trim_matches('.');
    if cleaned.is_empty() {
        "file".to_owned()
    } else {
        cleaned.to_owned()
    }
}

/// Stored names are unique; the original name is kept as a readable suffix.
pub fn unique_name(original: &str) -> String {
    let id = Uuid::new_v4().simple().to_string();
    format!("{}-{}", &id[..12], sanitize_file_name(original))
}

fn check_folder(folder: &str) -> Result<(), StorageError> {
    let path = Path::new(folder);
    let plain = !folder.is_empty()
        && path
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
    if plain {
        Ok(())
    } else {
        Err(StorageError::Folder(folder.to_owned()))
    }
}

/// Signature over the alphabetically sorted upload parameters.
pub fn cloudinary_signature(params: &[(&str, &str)], api_secret: &str) -> String {
    let mut sorted = params.to_vec();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&");

    hex::encode(Sha256::digest(format!("{to_sign}{api_secret}").as_bytes()))
}

pub struct MediaStore<'a> {
    http: &'a reqwest::Client,
    config: &'a MediaConfig,
}

impl<'a> MediaStore<'a> {
    pub fn new(http: &'a reqwest::Client, config: &'a MediaConfig) -> Self {
        Self { http, config }
    }

    /// Stores `file` under `folder` and returns its public URL.
    pub async fn store(&self, folder: &str, file: UploadFile) -> Result<String, StorageError> {
        check_folder(folder)?;
        let name = unique_name(&file.file_name);
        let size = file.bytes.len();

        let url = match self.config {
            MediaConfig::Cloudinary {
                cloud_name,
                api_key,
                api_secret,
                api_base,
            } => {
                let timestamp = Utc::now().timestamp().to_string();
                let public_id = name
                    .rsplit_once('.')
                    .map_or(name.as_str(), |(stem, _)| stem)
                    .to_owned();

                let signature = cloudinary_signature(
                    &[
                        ("folder", folder),
                        ("public_id", public_id.as_str()),
                        ("timestamp", timestamp.as_str()),
                    ],
                    api_secret,
                );

                let part = multipart::Part::bytes(file.bytes.to_vec())
                    .file_name(name.clone())
                    .mime_str(&file.content_type)?;

                let form = multipart::Form::new()
                    .part("file", part)
                    .text("api_key", api_key.clone())
                    .text("folder", folder.to_owned())
                    .text("public_id", public_id)
                    .text("timestamp", timestamp)
                    .text("signature", signature)
                    .text("signature_algorithm", "sha256");

                let response = self
                    .http
                    .post(format!("{api_base}/v1_1/{cloud_name}/auto/upload"))
                    .multipart(form)
                    .send()
                    .await?;

                let status = response.status();
                if !status.is_success() {
                    let body = response.text().await.unwrap_or_default();
                    return Err(StorageError::Status { status, body });
                }

                response.json::<CloudinaryResponse>().await?.secure_url
            }
            MediaConfig::Local { dir, public_base } => {
                let target_dir = dir.join(folder);
                fs::create_dir_all(&target_dir).await?;
                fs::write(target_dir.join(&name), &file.bytes).await?;

                format!("{}/{folder}/{name}", public_base.trim_end_matches('/'))
            }
        };

        info!(folder, size, url = %url, "file stored");

        Ok(url)
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn file_names_are_sanitized() {
        assert_eq!(sanitize_file_name("RC front (1).JPG"), "RC_front__1_.JPG");
        assert_eq!(sanitize_file_name("../../etc/passwd"), "_.._etc_passwd");
        assert_eq!(sanitize_file_name("..."), "file");
    }

    #[test]
    fn folders_cannot_escape_the_store() {
        assert!(check_folder("orders/ORD-1/rc_front").is_ok());
        assert!(check_folder("../secrets").is_err());
        assert!(check_folder("/etc").is_err());
        assert!(check_folder("").is_err());
    }

    #[test]
    fn signature_sorts_parameters() {
        let a = cloudinary_signature(&[("timestamp", "1"), ("folder", "blogs")], "secret");
        let b = cloudinary_signature(&[("folder", "blogs"), ("timestamp", "1")], "secret");
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert_eq!(
            a,
            hex::encode(Sha256::digest(b"folder=blogs&timestamp=1secret"))
        );
    }

    #[tokio::test]
    async fn local_store_writes_under_folder() {
        let dir = std::env::temp_dir().join(format!("fastag-media-{}", Uuid::new_v4()));
        let config = MediaConfig::Local {
            dir: PathBuf::from(&dir),
            public_base: "/media/".to_owned(),
        };
        let http = reqwest::Client::new();

        let url = MediaStore::new(&http, &config)
            .store(
                "orders/ORD-1/rc_front",
                UploadFile {
                    file_name: "rc.jpg".to_owned(),
                    content_type: "image/jpeg".to_owned(),
                    bytes: Bytes::from_static(b"jpeg"),
                },
            )
            .await
            .unwrap();

        assert!(url.starts_with("/media/orders/ORD-1/rc_front/"));
        assert!(url.ends_with("-rc.jpg"));

        let stored = url.trim_start_matches("/media/");
        assert_eq!(std::fs::read(dir.join(stored)).unwrap(), b"jpeg");

        std::fs::remove_dir_all(dir).unwrap();
    }
}
