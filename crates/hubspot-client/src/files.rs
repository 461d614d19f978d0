use std::time::Duration;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use crate::types::{FileUpload, UploadOptions, UploadedFile};
use crate::{status_error, HubSpotClient, HubSpotError, Result};

impl HubSpotClient {
    /// Upload a file into the file manager.
    ///
    /// Sends `file` (raw bytes, MIME, name) and `options` (JSON access level
    /// and destination folder) as multipart fields. Only `201 Created` with a
    /// body carrying both `id` and `url` counts as success.
    pub async fn upload_file(&self, upload: FileUpload, timeout: Duration) -> Result<UploadedFile> {
        let url = self.endpoint(&["files", "v3", "files"])?;
        let options = serde_json::to_string(&UploadOptions {
            access: upload.access,
            folder_id: upload.folder_id.as_deref(),
        })?;

        let size = upload.bytes.len();
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name.clone())
            .mime_str(&upload.mime)?;
        let form = Form::new().part("file", part).text("options", options);

        tracing::debug!(file = %upload.file_name, size, "uploading file");
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .timeout(timeout)
            .multipart(form)
            .send()
            .await?;

        if resp.status() != StatusCode::CREATED {
            return Err(status_error(resp).await);
        }

        let body: serde_json::Value = serde_json::from_slice(&resp.bytes().await?)?;
        parse_uploaded(&body)
    }
}

/// Pull `id` and `url` out of a create-file response. The API returns `id` as
/// a string but older deployments emit a number, so accept both.
fn parse_uploaded(body: &serde_json::Value) -> Result<UploadedFile> {
    let id = match body.get("id") {
        Some(serde_json::Value::String(s)) if !s.is_empty() => s.clone(),
        Some(serde_json::Value::Number(n)) => n.to_string(),
        _ => return Err(HubSpotError::MissingField("id")),
    };
    let url = body
        .get("url")
        .and_then(|v| v.as_str())
        .filter(|s| !s.is_empty())
        .ok_or(HubSpotError::MissingField("url"))?
        .to_string();
    Ok(UploadedFile { id, url })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::FileAccess;
    use mockito::Matcher;

    fn png_upload() -> FileUpload {
        FileUpload {
            bytes: b"fake-png-bytes".to_vec(),
            file_name: "signature_1700000000_abcDEF123456.png".into(),
            mime: "image/png".into(),
            folder_id: Some("777".into()),
            access: FileAccess::Private,
        }
    }

    #[tokio::test]
    async fn upload_returns_created_file() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/files/v3/files")
            .match_header("authorization", "Bearer secret")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex("signature_1700000000_abcDEF123456".into()),
                Matcher::Regex("fake-png-bytes".into()),
                Matcher::Regex(r#""access":"PRIVATE""#.into()),
                Matcher::Regex(r#""folderId":"777""#.into()),
            ]))
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":"4242","url":"https://files.example/sig.png"}"#)
            .create_async()
            .await;

        let client = HubSpotClient::new(server.url(), "secret");
        let file = client
            .upload_file(png_upload(), Duration::from_secs(5))
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(file.id, "4242");
        assert_eq!(file.url, "https://files.example/sig.png");
    }

    #[tokio::test]
    async fn upload_rejects_non_created_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/files/v3/files")
            .with_status(200)
            .with_body(r#"{"id":"1","url":"u"}"#)
            .create_async()
            .await;

        let client = HubSpotClient::new(server.url(), "secret");
        let err = client
            .upload_file(png_upload(), Duration::from_secs(5))
            .await
            .unwrap_err();
        assert!(matches!(err, HubSpotError::Status { status: 200, .. }));
    }

    #[tokio::test]
    async fn upload_surfaces_error_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/files/v3/files")
            .with_status(401)
            .with_body("expired token")
            .create_async()
            .await;

        let client = HubSpotClient::new(server.url(), "secret");
        let err = client
            .upload_file(png_upload(), Duration::from_secs(5))
            .await
            .unwrap_err();
        match err {
            HubSpotError::Status { status, body } => {
                assert_eq!(status, 401);
                assert_eq!(body, "expired token");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn parse_uploaded_accepts_numeric_id() {
        let body = serde_json::json!({ "id": 17, "url": "https://f/x.png" });
        let file = parse_uploaded(&body).unwrap();
        assert_eq!(file.id, "17");
    }

    #[test]
    fn parse_uploaded_requires_id() {
        let body = serde_json::json!({ "url": "https://f/x.png" });
        assert!(matches!(
            parse_uploaded(&body),
            Err(HubSpotError::MissingField("id"))
        ));
    }

    #[test]
    fn parse_uploaded_requires_url() {
        let body = serde_json::json!({ "id": "5" });
        assert!(matches!(
            parse_uploaded(&body),
            Err(HubSpotError::MissingField("url"))
        ));
    }
}
