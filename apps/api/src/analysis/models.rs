use base64::{engine::general_purpose::STANDARD, Engine as _};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::errors::AppError;

pub const MAX_YEARS_OF_EXPERIENCE: f64 = 50.0;

// ────────────────────────────────────────────────────────────────────────────
// Request side
// ────────────────────────────────────────────────────────────────────────────

/// A validated analysis request. Built from either upload encoding.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub document: Bytes,
    pub target_role: String,
    pub target_company: Option<String>,
    pub years_of_experience: f64,
}

/// Upload fields before validation, shared by the JSON and multipart encodings.
#[derive(Debug, Default)]
pub struct AnalysisFields {
    pub document: Option<Bytes>,
    pub target_role: Option<String>,
    pub target_company: Option<String>,
    pub years_of_experience: Option<String>,
}

/// JSON request body: the PDF travels base64-encoded.
#[derive(Debug, Deserialize)]
pub struct JsonUpload {
    #[serde(rename = "resumeBase64")]
    pub resume_base64: Option<String>,
    #[serde(rename = "Target_Role")]
    pub target_role: Option<String>,
    #[serde(rename = "Target_Company")]
    pub target_company: Option<String>,
    /// The browser form sends a string; numbers are accepted too.
    #[serde(rename = "Years_of_Experience")]
    pub years_of_experience: Option<Value>,
}

impl JsonUpload {
    pub fn into_fields(self) -> Result<AnalysisFields, AppError> {
        let document = self
            .resume_base64
            .filter(|s| !s.trim().is_empty())
            .map(|encoded| decode_document(&encoded))
            .transpose()?;

        let years_of_experience = match self.years_of_experience {
            None | Some(Value::Null) => None,
            Some(Value::String(s)) => Some(s),
            Some(Value::Number(n)) => Some(n.to_string()),
            Some(other) => {
                return Err(AppError::InvalidRequest(format!(
                    "Years_of_Experience must be a number, got {other}"
                )))
            }
        };

        Ok(AnalysisFields {
            document,
            target_role: self.target_role,
            target_company: self.target_company,
            years_of_experience,
        })
    }
}

/// Decodes a base64 document, tolerating a `data:<mime>;base64,` prefix and
/// embedded whitespace.
pub fn decode_document(encoded: &str) -> Result<Bytes, AppError> {
    let payload = match encoded.split_once(";base64,") {
        Some((prefix, rest)) if prefix.starts_with("data:") => rest,
        _ => encoded,
    };
    let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();

    STANDARD
        .decode(compact.as_bytes())
        .map(Bytes::from)
        .map_err(|e| AppError::InvalidRequest(format!("resumeBase64 is not valid base64: {e}")))
}

impl AnalysisFields {
    /// Checks presence, numeric coercion and size limits.
    pub fn into_request(self, max_document_bytes: usize) -> Result<AnalysisRequest, AppError> {
        let target_role = self.target_role.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());
        let years = self
            .years_of_experience
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());
        let document = self.document.filter(|d| !d.is_empty());

        let mut missing = Vec::new();
        if document.is_none() {
            missing.push("resume");
        }
        if target_role.is_none() {
            missing.push("Target_Role");
        }
        if years.is_none() {
            missing.push("Years_of_Experience");
        }

        let (Some(document), Some(target_role), Some(years)) = (document, target_role, years) else {
            return Err(AppError::InvalidRequest(format!(
                "Missing required form fields: {}.",
                missing.join(", ")
            )));
        };

        if document.len() > max_document_bytes {
            return Err(AppError::InvalidRequest(format!(
                "Resume must be less than {} MB.",
                max_document_bytes / (1024 * 1024)
            )));
        }

        let years_of_experience = parse_years(&years)?;
        let target_company = self
            .target_company
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(AnalysisRequest {
            document,
            target_role,
            target_company,
            years_of_experience,
        })
    }
}

fn parse_years(raw: &str) -> Result<f64, AppError> {
    let years: f64 = raw.parse().map_err(|_| {
        AppError::InvalidRequest(format!("Years_of_Experience must be a number, got '{raw}'."))
    })?;

    if !years.is_finite() {
        return Err(AppError::InvalidRequest(format!(
            "Years_of_Experience must be a number, got '{raw}'."
        )));
    }
    if years < 0.0 {
        return Err(AppError::InvalidRequest(
            "Years of Experience cannot be negative.".to_string(),
        ));
    }
    if years > MAX_YEARS_OF_EXPERIENCE {
        return Err(AppError::InvalidRequest(
            "Years of Experience seems too high.".to_string(),
        ));
    }
    Ok(years)
}

// ────────────────────────────────────────────────────────────────────────────
// Result side
// ────────────────────────────────────────────────────────────────────────────

/// The recovered analysis. Keys other than the two required ones are kept
/// in `extra` and serialized back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub extracted_fields: Map<String, Value>,
    pub questionnaire_prompt: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AnalysisResult {
    /// Splits a parsed JSON object into the result shape, or explains what is missing.
    pub fn from_object(mut object: Map<String, Value>) -> Result<Self, String> {
        let extracted_fields = match object.remove("extracted_fields") {
            Some(Value::Object(fields)) => fields,
            Some(other) => {
                return Err(format!(
                    "extracted_fields must be an object, got {}",
                    json_kind(&other)
                ))
            }
            None => return Err("missing required key extracted_fields".to_string()),
        };

        let questionnaire_prompt = match object.remove("questionnaire_prompt") {
            Some(Value::String(prompt)) => prompt,
            Some(other) => {
                return Err(format!(
                    "questionnaire_prompt must be a string, got {}",
                    json_kind(&other)
                ))
            }
            None => return Err("missing required key questionnaire_prompt".to_string()),
        };

        Ok(Self {
            extracted_fields,
            questionnaire_prompt,
            extra: object,
        })
    }
}

pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
