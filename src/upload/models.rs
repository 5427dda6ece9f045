use std::collections::HashMap;

use serde::Serialize;

use super::storage::UploadFile;

/// Uploads larger than this are rejected before reaching the media store.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UploadKind {
    Blog,
    Banner,
    OrderDocument,
    General,
}

impl UploadKind {
    pub fn accepts(self, content_type: &str) -> bool {
        let ct = content_type.trim().to_ascii_lowercase();
        let image = ct.starts_with("image/");
        let pdf = ct == "application/pdf";
        let video = ct.starts_with("video/");

        match self {
            UploadKind::Blog => image || pdf || video,
            UploadKind::Banner => image,
            UploadKind::OrderDocument | UploadKind::General => image || pdf,
        }
    }

    pub fn folder(self) -> &'static str {
        match self {
            UploadKind::Blog => "blogs",
            UploadKind::Banner => "banners",
            UploadKind::OrderDocument => "orders",
            UploadKind::General => "uploads",
        }
    }
}

/// A parsed multipart body: the `file` part plus any text fields.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadFile>,
    pub fields: HashMap<String, String>,
}

impl UploadForm {
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }
}

/// Order references end up in storage paths, so only `[A-Za-z0-9-]` survives.
pub fn clean_order_ref(order_id: &str) -> Option<String> {
    let cleaned: String = order_id
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .take(64)
        .collect();
    (!cleaned.is_empty()).then_some(cleaned)
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_types_per_kind() {
        assert!(UploadKind::Blog.accepts("video/mp4"));
        assert!(UploadKind::Blog.accepts("application/pdf"));
        assert!(UploadKind::Banner.accepts("image/webp"));
        assert!(!UploadKind::Banner.accepts("application/pdf"));
        assert!(UploadKind::OrderDocument.accepts("IMAGE/JPEG"));
        assert!(!UploadKind::OrderDocument.accepts("video/mp4"));
        assert!(!UploadKind::General.accepts("text/html"));
    }

    #[test]
    fn order_refs_are_path_safe() {
        assert_eq!(clean_order_ref("ORD-20250114-ab12").as_deref(), Some("ORD-20250114-ab12"));
        assert_eq!(clean_order_ref("../ORD/1").as_deref(), Some("ORD1"));
        assert_eq!(clean_order_ref(" ./ "), None);
    }
}
