//! Streaming a stored document back to the client.

use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Displayed by the browser (preview)
    Inline,
    /// Saved to disk (download)
    Attachment,
}

impl Disposition {
    fn as_str(self) -> &'static str {
        match self {
            Disposition::Inline => "inline",
            Disposition::Attachment => "attachment",
        }
    }
}

/// File bytes plus the metadata needed for the response headers
#[derive(Debug)]
pub struct FileResponse {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub disposition: Disposition,
}

/// `Content-Disposition` value with an ASCII fallback name and an RFC 5987 UTF-8 name
pub fn content_disposition(disposition: Disposition, filename: &str) -> String {
    let fallback: String = filename
        .chars()
        .map(|c| {
            if c == ' ' || (c.is_ascii_graphic() && c != '"' && c != '\\') {
                c
            } else {
                '_'
            }
        })
        .collect();

    format!(
        "{}; filename=\"{}\"; filename*=UTF-8''{}",
        disposition.as_str(),
        fallback,
        urlencoding::encode(filename)
    )
}

impl IntoResponse for FileResponse {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
        let disposition = HeaderValue::from_str(&content_disposition(
            self.disposition,
            &self.filename,
        ))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));

        (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, content_type),
                (header::CONTENT_DISPOSITION, disposition),
            ],
            Body::from(self.data),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition() {
        assert_eq!(
            content_disposition(Disposition::Attachment, "rapport.pdf"),
            "attachment; filename=\"rapport.pdf\"; filename*=UTF-8''rapport.pdf"
        );
        assert_eq!(
            content_disposition(Disposition::Inline, "bilan été.pdf"),
            "inline; filename=\"bilan _t_.pdf\"; filename*=UTF-8''bilan%20%C3%A9t%C3%A9.pdf"
        );
    }

    #[tokio::test]
    async fn test_response_headers() {
        let response = FileResponse {
            filename: "a\"b.txt".to_string(),
            content_type: "text/plain".to_string(),
            data: b"hello".to_vec(),
            disposition: Disposition::Attachment,
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], "text/plain");
        assert!(response.headers()[header::CONTENT_DISPOSITION]
            .to_str()
            .unwrap()
            .starts_with("attachment; filename=\"a_b.txt\""));

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"hello");
    }
}
