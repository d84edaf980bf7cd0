//! Axum route handlers for the Analysis API.

use axum::{
    async_trait,
    extract::{FromRequest, Multipart, Request, State},
    http::{header::CONTENT_TYPE, StatusCode},
    Json,
};
use tracing::{debug, info};

use crate::analysis::models::{AnalysisFields, AnalysisResult, JsonUpload};
use crate::errors::AppError;
use crate::state::AppState;

const PDF_MIME: &str = "application/pdf";

/// Upload fields from either a JSON body (base64 document) or a multipart form.
/// Rejections are converted to `AppError` so every failure renders as `{detail}`.
pub struct AnalysisUpload(pub AnalysisFields);

#[async_trait]
impl<S> FromRequest<S> for AnalysisUpload
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let content_type = req
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_ascii_lowercase();

        if content_type.starts_with("multipart/form-data") {
            let multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| rejection(e.status(), e.body_text()))?;
            read_multipart(multipart).await.map(Self)
        } else {
            let Json(upload) = Json::<JsonUpload>::from_request(req, state)
                .await
                .map_err(|e| rejection(e.status(), e.body_text()))?;
            upload.into_fields().map(Self)
        }
    }
}

fn rejection(status: StatusCode, text: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge
    } else {
        AppError::InvalidRequest(text)
    }
}

async fn read_multipart(mut multipart: Multipart) -> Result<AnalysisFields, AppError> {
    let mut fields = AnalysisFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| rejection(e.status(), e.body_text()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                if let Some(mime) = field.content_type() {
                    if !mime.eq_ignore_ascii_case(PDF_MIME) {
                        return Err(AppError::InvalidRequest(
                            "Only PDF files are allowed.".to_string(),
                        ));
                    }
                }
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                fields.document = Some(bytes);
            }
            "Target_Role" | "Target_Company" | "Years_of_Experience" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| rejection(e.status(), e.body_text()))?;
                match name.as_str() {
                    "Target_Role" => fields.target_role = Some(value),
                    "Target_Company" => fields.target_company = Some(value),
                    _ => fields.years_of_experience = Some(value),
                }
            }
            other => debug!("Ignoring unknown form field '{other}'"),
        }
    }

    Ok(fields)
}

/// POST /api/analyze-resume (JSON) and POST /v1/analyze_resume/ (multipart)
///
/// Both paths accept both encodings; the Content-Type header decides.
pub async fn handle_analyze(
    State(state): State<AppState>,
    AnalysisUpload(fields): AnalysisUpload,
) -> Result<Json<AnalysisResult>, AppError> {
    let request = fields.into_request(state.config.max_document_bytes)?;
    info!(
        "Received analysis request: role={}, {} byte document",
        request.target_role,
        request.document.len()
    );

    let result = state.analyzer.analyze(request).await?;
    Ok(Json(result))
}

/// Any non-POST method on the analysis paths.
pub async fn handle_method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}
