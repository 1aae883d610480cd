//! Axum route handler for résumé generation.

use anyhow::anyhow;
use axum::{
    extract::{rejection::BytesRejection, State},
    http::header,
    response::{IntoResponse, Response},
};
use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::LayoutBlock;
use crate::models::resume::ResumeRecord;
use crate::render::{DocumentBuilder, RenderError};
use crate::state::AppState;

pub const ATTACHMENT_FILENAME: &str = "generated_resume.pdf";

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

/// POST /generate_resume
///
/// Body: résumé JSON. Returns the PDF as an attachment. Every failure, including
/// a body that is not JSON or exceeds `MAX_BODY_BYTES`, comes back as 500 with
/// `{"error": "<message>"}`.
pub async fn handle_generate_resume(
    State(state): State<AppState>,
    body: Result<Bytes, BytesRejection>,
) -> Result<Response, AppError> {
    let request_id = Uuid::new_v4();
    let body = body?;
    let record = ResumeRecord::from_json(&body)?;
    info!(
        %request_id,
        experience = record.experience.len(),
        education = record.education.len(),
        skills = record.skills.len(),
        "Generating resume"
    );

    let blocks = state
        .builder
        .build_blocks(&record, state.refiner.as_ref())
        .await?;

    let builder = state.builder.clone();
    let pdf = tokio::task::spawn_blocking(move || render_to_temp_file(&builder, &blocks))
        .await
        .map_err(|e| anyhow!("render task failed: {e}"))??;

    info!(%request_id, bytes = pdf.len(), "Resume generated");

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ATTACHMENT_FILENAME}\""),
            ),
        ],
        pdf,
    )
        .into_response())
}

/// Writes the PDF into a temporary file owned by this request and reads it back.
/// The file is deleted when `sink` is dropped.
fn render_to_temp_file(
    builder: &DocumentBuilder,
    blocks: &[LayoutBlock],
) -> Result<Vec<u8>, RenderError> {
    let mut sink = tempfile::Builder::new()
        .prefix("resume-")
        .suffix(".pdf")
        .tempfile()?;
    builder.write_blocks(blocks, sink.as_file_mut())?;
    Ok(std::fs::read(sink.path())?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::refinement::TextRefiner;
    use crate::routes::build_router;

    fn test_state() -> AppState {
        AppState {
            refiner: Arc::new(TextRefiner::disabled()),
            builder: DocumentBuilder::new(None),
        }
    }

    async fn post(body: impl Into<Body>) -> Response {
        build_router(test_state())
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/generate_resume")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(body.into())
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn json_body(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_generate_resume_returns_pdf_attachment() {
        let payload = json!({
            "name": "Jane Doe",
            "email": "jane@example.com",
            "experience": [{
                "title": "Engineer",
                "company": "Acme",
                "dates": "2020-2023",
                "details": "Built APIs. Ran on-call."
            }],
            "skills": ["Rust"]
        });
        let response = post(payload.to_string()).await;

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/pdf"
        );
        assert_eq!(
            response.headers()[header::CONTENT_DISPOSITION],
            "attachment; filename=\"generated_resume.pdf\""
        );

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(bytes.starts_with(b"%PDF-"));
        let doc = lopdf::Document::load_mem(&bytes).unwrap();
        assert!(!doc.get_pages().is_empty());
    }

    #[tokio::test]
    async fn test_generate_resume_missing_name_is_500_with_error() {
        let response = post(json!({"email": "jane@example.com"}).to_string()).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json_body(response).await,
            json!({"error": "Validation error: name is required"})
        );
    }

    #[tokio::test]
    async fn test_generate_resume_malformed_json_is_500_with_error() {
        let response = post("{not json").await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Validation error: invalid resume payload"));
    }

    #[tokio::test]
    async fn test_generate_resume_oversized_body_is_500_with_error() {
        let response = post(vec![b' '; MAX_BODY_BYTES + 1]).await;
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = json_body(response).await;
        assert!(body["error"]
            .as_str()
            .unwrap()
            .starts_with("Invalid request body"));
    }

    #[tokio::test]
    async fn test_health_reports_ok() {
        let response = build_router(test_state())
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(json_body(response).await["status"], "ok");
    }
}
