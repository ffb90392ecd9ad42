//! File analysis handler.
//!
//! Accepts a single file through a `multipart/form-data` request and reports
//! its name, declared content type and size. The content is buffered for the
//! lifetime of the request and never stored.

use aide::axum::ApiRouter;
use aide::transform::TransformOperation;
use axum::Json;
use axum::body::Bytes;
use axum::extract::{DefaultBodyLimit, State};

use crate::extract::Multipart;
use crate::handler::request::{DEFAULT_CONTENT_TYPE, UploadedFile};
use crate::handler::response::{ErrorResponse, FileMetadata};
use crate::handler::{ErrorKind, Result};
use crate::service::{ServiceState, UploadLimits};

/// Tracing target for file analysis operations.
const TRACING_TARGET: &str = "fileanalyse_server::handler::fileanalyse";

/// Form field that carries the uploaded file.
pub const UPLOAD_FIELD: &str = "upfile";

/// Reads the first file part named [`UPLOAD_FIELD`] from the request.
///
/// Parts with other names, text parts and any further file parts are drained
/// so that framing errors and body limits are still detected.
async fn read_upload(
    multipart: &mut Multipart,
    limits: UploadLimits,
) -> Result<Option<UploadedFile>> {
    let mut upload = None;

    while let Some(mut field) = multipart.next_field().await? {
        if upload.is_some() || field.name() != Some(UPLOAD_FIELD) {
            tracing::debug!(
                target: TRACING_TARGET,
                field = field.name(),
                file_name = field.file_name(),
                content_type = field.content_type(),
                "Skipping multipart field"
            );
            continue;
        }

        let Some(name) = field.file_name().map(ToOwned::to_owned) else {
            tracing::debug!(
                target: TRACING_TARGET,
                field = UPLOAD_FIELD,
                content_type = field.content_type(),
                "Skipping upload field without filename"
            );
            continue;
        };

        tracing::debug!(
            target: TRACING_TARGET,
            field = UPLOAD_FIELD,
            file_name = %name,
            content_type = field.content_type(),
            "Reading upload field"
        );

        let content_type = field
            .content_type()
            .unwrap_or(DEFAULT_CONTENT_TYPE)
            .to_owned();

        let mut data = Vec::new();
        while let Some(chunk) = field.chunk().await? {
            let size = (data.len() + chunk.len()) as u64;
            if limits.exceeds_file_size(size) {
                return Err(ErrorKind::PayloadTooLarge
                    .with_resource(UPLOAD_FIELD)
                    .with_context(format!(
                        "File '{}' exceeds the maximum size of {} bytes",
                        name,
                        limits.max_file_size()
                    )));
            }

            data.extend_from_slice(&chunk);
        }

        upload = Some(UploadedFile {
            name,
            content_type,
            data: Bytes::from(data),
        });
    }

    Ok(upload)
}

/// Reports the metadata of an uploaded file.
#[tracing::instrument(skip_all)]
async fn analyse_file(
    State(limits): State<UploadLimits>,
    mut multipart: Multipart,
) -> Result<Json<FileMetadata>> {
    tracing::debug!(
        target: TRACING_TARGET,
        max_file_size = limits.max_file_size(),
        "Received file upload"
    );

    let Some(file) = read_upload(&mut multipart, limits).await? else {
        return Err(ErrorKind::MissingFile
            .with_resource(UPLOAD_FIELD)
            .with_context("Request has no file part"));
    };

    let metadata = FileMetadata::from(&file);

    tracing::debug!(
        target: TRACING_TARGET,
        name = %metadata.name,
        content_type = %metadata.content_type,
        size = metadata.size,
        "File analysed"
    );

    Ok(Json(metadata))
}

fn analyse_file_docs(op: TransformOperation) -> TransformOperation {
    op.summary("Analyse file")
        .description(
            "Accepts a multipart form with a single file in the `upfile` field and \
             returns its original name, declared MIME type and size in bytes. \
             The file content is not stored.",
        )
        .response::<200, Json<FileMetadata>>()
        .response::<400, Json<ErrorResponse<'static>>>()
        .response::<413, Json<ErrorResponse<'static>>>()
}

/// Returns a [`Router`] with the file analysis route.
///
/// The request body is capped at [`UploadLimits::max_body_size`].
///
/// [`Router`]: axum::routing::Router
pub fn routes(limits: UploadLimits) -> ApiRouter<ServiceState> {
    use aide::axum::routing::*;

    ApiRouter::new()
        .api_route(
            "/api/fileanalyse",
            post_with(analyse_file, analyse_file_docs),
        )
        .layer(DefaultBodyLimit::max(limits.max_body_size()))
        .with_path_items(|item| item.tag("Files"))
}

#[cfg(test)]
mod tests {
    use axum::body::Bytes;
    use axum::http::StatusCode;
    use axum_test::multipart::{MultipartForm, Part};
    use serde_json::{Value, json};

    use crate::handler::test::{create_test_server, create_test_server_with_config};
    use crate::service::ServiceConfig;

    const PATH: &str = "/api/fileanalyse";
    const BOUNDARY: &str = "fileanalyse-boundary";

    fn file_part(content: &'static [u8], file_name: &str, mime_type: &str) -> Part {
        Part::bytes(content)
            .file_name(file_name.to_owned())
            .mime_type(mime_type.to_owned())
    }

    fn raw_multipart(parts: &[&str]) -> String {
        let mut body = String::new();
        for part in parts {
            body.push_str(&format!("--{BOUNDARY}\r\n{part}\r\n"));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    fn multipart_content_type() -> String {
        format!("multipart/form-data; boundary={BOUNDARY}")
    }

    #[tokio::test]
    async fn reports_file_metadata() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let form =
            MultipartForm::new().add_part("upfile", file_part(b"hello", "test.txt", "text/plain"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "name": "test.txt", "type": "text/plain", "size": 5 }));
        Ok(())
    }

    #[tokio::test]
    async fn response_has_exactly_three_keys() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let content: &'static [u8] = &[0u8; 1234];
        let form = MultipartForm::new()
            .add_part("upfile", file_part(content, "image.png", "image/png"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status_ok();

        let body = response.json::<Value>();
        let object = body.as_object().expect("json object");
        assert_eq!(object.len(), 3);
        assert!(object["name"].is_string());
        assert!(object["type"].is_string());
        assert_eq!(object["size"], 1234);
        Ok(())
    }

    #[tokio::test]
    async fn empty_file_has_zero_size() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let form =
            MultipartForm::new().add_part("upfile", file_part(b"", "empty.txt", "text/plain"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["size"], 0);
        Ok(())
    }

    #[tokio::test]
    async fn empty_form_is_missing_file() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.post(PATH).multipart(MultipartForm::new()).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No file uploaded" }));
        Ok(())
    }

    #[tokio::test]
    async fn empty_body_is_missing_file() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post(PATH)
            .bytes(Bytes::new())
            .content_type(&multipart_content_type())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No file uploaded" }));
        Ok(())
    }

    #[tokio::test]
    async fn closing_delimiter_only_is_missing_file() -> anyhow::Result<()> {
        let server = create_test_server()?;

        for body in [format!("--{BOUNDARY}--\r\n"), format!("--{BOUNDARY}--")] {
            let response = server
                .post(PATH)
                .bytes(Bytes::from(body))
                .content_type(&multipart_content_type())
                .await;
            response.assert_status(StatusCode::BAD_REQUEST);
            response.assert_json(&json!({ "error": "No file uploaded" }));
        }
        Ok(())
    }

    #[tokio::test]
    async fn wrong_field_name_is_missing_file() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let form = MultipartForm::new()
            .add_part("document", file_part(b"hello", "test.txt", "text/plain"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No file uploaded" }));
        Ok(())
    }

    #[tokio::test]
    async fn text_field_is_missing_file() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let form = MultipartForm::new().add_text("upfile", "hello");

        let response = server.post(PATH).multipart(form).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No file uploaded" }));
        Ok(())
    }

    #[tokio::test]
    async fn non_multipart_body_is_missing_file() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.post(PATH).json(&json!({ "upfile": "hello" })).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "No file uploaded" }));
        Ok(())
    }

    #[tokio::test]
    async fn malformed_multipart_is_bad_request() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server
            .post(PATH)
            .bytes(Bytes::from_static(b"this body has no multipart framing"))
            .content_type(&multipart_content_type())
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        response.assert_json(&json!({ "error": "Invalid multipart request" }));
        Ok(())
    }

    #[tokio::test]
    async fn missing_content_type_defaults_to_octet_stream() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let body = raw_multipart(&[
            "Content-Disposition: form-data; name=\"upfile\"; filename=\"data.bin\"\r\n\r\nabc",
        ]);

        let response = server
            .post(PATH)
            .bytes(Bytes::from(body))
            .content_type(&multipart_content_type())
            .await;
        response.assert_status_ok();
        response.assert_json(
            &json!({ "name": "data.bin", "type": "application/octet-stream", "size": 3 }),
        );
        Ok(())
    }

    #[tokio::test]
    async fn empty_filename_still_counts() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let body = raw_multipart(&[
            "Content-Disposition: form-data; name=\"upfile\"; filename=\"\"\r\n\
             Content-Type: text/plain\r\n\r\nhello",
        ]);

        let response = server
            .post(PATH)
            .bytes(Bytes::from(body))
            .content_type(&multipart_content_type())
            .await;
        response.assert_status_ok();
        response.assert_json(&json!({ "name": "", "type": "text/plain", "size": 5 }));
        Ok(())
    }

    #[tokio::test]
    async fn first_upload_wins() -> anyhow::Result<()> {
        let server = create_test_server()?;
        let form = MultipartForm::new()
            .add_text("comment", "two files")
            .add_part("upfile", file_part(b"first", "first.txt", "text/plain"))
            .add_part("upfile", file_part(b"second file", "second.csv", "text/csv"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status_ok();
        response.assert_json(&json!({ "name": "first.txt", "type": "text/plain", "size": 5 }));
        Ok(())
    }

    #[tokio::test]
    async fn file_at_limit_is_accepted() -> anyhow::Result<()> {
        let server = create_test_server_with_config(&ServiceConfig::with_max_file_size(5))?;
        let form =
            MultipartForm::new().add_part("upfile", file_part(b"hello", "test.txt", "text/plain"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn oversized_file_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server_with_config(&ServiceConfig::with_max_file_size(4))?;
        let form =
            MultipartForm::new().add_part("upfile", file_part(b"hello", "test.txt", "text/plain"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json(&json!({ "error": "File too large" }));

        // The server keeps serving after a rejected upload.
        let form =
            MultipartForm::new().add_part("upfile", file_part(b"ok", "ok.txt", "text/plain"));
        let response = server.post(PATH).multipart(form).await;
        response.assert_status_ok();
        Ok(())
    }

    #[tokio::test]
    async fn oversized_body_is_rejected() -> anyhow::Result<()> {
        let server = create_test_server_with_config(&ServiceConfig::with_max_file_size(4))?;
        let padding = "x".repeat(128 * 1024);
        let form = MultipartForm::new()
            .add_text("padding", padding)
            .add_part("upfile", file_part(b"ok", "ok.txt", "text/plain"));

        let response = server.post(PATH).multipart(form).await;
        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json(&json!({ "error": "File too large" }));
        Ok(())
    }

    #[tokio::test]
    async fn get_is_not_found() -> anyhow::Result<()> {
        let server = create_test_server()?;

        let response = server.get(PATH).await;
        response.assert_status_not_found();
        response.assert_text("Sorry, can't find that!");
        Ok(())
    }
}
