//! HTTP request handlers for the rule extraction API.
//!
//! The extraction endpoints never surface pipeline failures as HTTP errors;
//! a failed extraction is a `200` carrying the fallback rule with
//! `degraded: true`.

use crate::cors::{cors_middleware, CorsPolicy};
use axum::{
    async_trait,
    extract::{
        multipart::{MultipartError, MultipartRejection},
        DefaultBodyLimit, FromRequest, Multipart, Request, State,
    },
    http::{header, StatusCode},
    middleware,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router as AxumRouter,
};
use harmonizer_domain::{Category, CategoryCounts, RuleCandidate};
use harmonizer_extractor::{DocumentUpload, OutcomeSummary, RuleExtractor};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, warn};

/// Largest accepted request body (uploads included)
pub const MAX_UPLOAD_BYTES: usize = 20 * 1024 * 1024;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// The extraction pipeline and its rule memory
    pub extractor: Arc<RuleExtractor>,
}

impl AppState {
    /// Wrap an extractor for sharing across requests
    pub fn new(extractor: Arc<RuleExtractor>) -> Self {
        Self { extractor }
    }
}

/// Form fields of `POST /api/extract-rule`
///
/// Accepted as `multipart/form-data` or `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractRuleForm {
    /// Text or code to extract a rule from
    pub text: String,
    /// Requested category; `None` when unknown, so the classifier decides
    pub category: Option<Category>,
    /// Rule pack label, echoed back
    pub rule_pack: String,
    /// Author label, echoed back
    pub created_by: String,
}

impl ExtractRuleForm {
    fn from_fields(mut fields: HashMap<String, String>) -> Result<Self, AppError> {
        let text = fields
            .remove("text")
            .ok_or_else(|| AppError::MissingField("text".to_string()))?;

        let rule_type = fields.remove("rule_type").unwrap_or_else(|| "code".to_string());
        let category = Category::parse(&rule_type);
        if category.is_none() {
            debug!("Unknown rule_type '{}', classifying instead", rule_type);
        }

        Ok(Self {
            text,
            category,
            rule_pack: fields
                .remove("rule_pack")
                .unwrap_or_else(|| "generic".to_string()),
            created_by: fields
                .remove("created_by")
                .unwrap_or_else(|| "anonymous".to_string()),
        })
    }

    fn candidate(&self) -> RuleCandidate {
        let candidate = RuleCandidate::new(self.text.as_str());
        match self.category {
            Some(category) => candidate.with_category(category),
            None => candidate,
        }
    }
}

#[async_trait]
impl<S> FromRequest<S> for ExtractRuleForm
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let is_multipart = req
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("multipart/form-data"));

        let fields = if is_multipart {
            let mut multipart = Multipart::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            let mut fields = HashMap::new();
            while let Some(field) = multipart.next_field().await? {
                let Some(name) = field.name().map(str::to_string) else {
                    continue;
                };
                let value = field.text().await?;
                fields.entry(name).or_insert(value);
            }
            fields
        } else {
            let Form(fields) = Form::<HashMap<String, String>>::from_request(req, state)
                .await
                .map_err(|e| AppError::BadRequest(e.to_string()))?;
            fields
        };

        Self::from_fields(fields)
    }
}

/// Response of `POST /api/extract-rule`
#[derive(Debug, Serialize, Deserialize)]
pub struct ExtractRuleResponse {
    /// Rule YAML
    pub yaml: String,
    /// Confidence in [0, 1]
    pub confidence: f64,
    /// Category the rule was extracted as
    pub rule_type: String,
    /// Echoed rule pack
    pub rule_pack: String,
    /// Echoed author
    pub created_by: String,
    /// Identifier of the duplicated rule, if any
    pub duplicate_of: Option<String>,
    /// Similarity to the duplicated rule, if any
    pub similarity: Option<f32>,
    /// True when extraction failed and the fallback rule was returned
    pub degraded: bool,
}

/// One entry of `POST /api/extract-from-document`
#[derive(Debug, Serialize)]
pub struct DocumentRuleResponse {
    /// Extraction result for the line
    #[serde(flatten)]
    pub result: OutcomeSummary,
    /// The line the rule was extracted from
    pub source_snippet: String,
}

/// Response of `POST /api/extract-from-document`
#[derive(Debug, Serialize)]
pub struct DocumentRulesResponse {
    /// Rules in document order
    pub rules: Vec<DocumentRuleResponse>,
}

/// Response of `GET /api/rules/summary`
#[derive(Debug, Serialize, Deserialize)]
pub struct SummaryResponse {
    /// Code rules
    pub code: u32,
    /// Design rules
    pub design: u32,
    /// Naming rules
    pub naming: u32,
    /// Performance rules
    pub performance: u32,
    /// Template rules
    pub template: u32,
    /// Sum of all categories
    pub total: u32,
}

impl From<CategoryCounts> for SummaryResponse {
    fn from(counts: CategoryCounts) -> Self {
        Self {
            code: counts.code,
            design: counts.design,
            naming: counts.naming,
            performance: counts.performance,
            template: counts.template,
            total: counts.total(),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthCheckResponse {
    /// Always "ok" while the process serves requests
    pub status: String,
}

/// Error response
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

/// Application error type
#[derive(Debug)]
pub enum AppError {
    /// A required form field is absent
    MissingField(String),
    /// The request body could not be read
    BadRequest(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AppError::MissingField(field) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                format!("Missing required field: {}", field),
            ),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
        };

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}

impl From<MultipartError> for AppError {
    fn from(e: MultipartError) -> Self {
        AppError::BadRequest(e.to_string())
    }
}

/// POST /api/extract-rule - Extract one rule from text
async fn extract_rule(
    State(state): State<AppState>,
    form: ExtractRuleForm,
) -> Json<ExtractRuleResponse> {
    let outcome = state.extractor.extract(&form.candidate()).await;

    Json(ExtractRuleResponse {
        yaml: outcome.yaml().to_string(),
        confidence: outcome.confidence(),
        rule_type: outcome.category().to_string(),
        rule_pack: form.rule_pack,
        created_by: form.created_by,
        duplicate_of: outcome.duplicate_of().map(str::to_string),
        similarity: outcome.similarity(),
        degraded: outcome.is_degraded(),
    })
}

/// POST /api/extract-from-document - Extract rules from an uploaded file
///
/// An unreadable upload is treated as an empty document.
async fn extract_from_document(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Json<DocumentRulesResponse> {
    let upload = match multipart {
        Ok(multipart) => read_upload(multipart).await.unwrap_or_else(|e| {
            warn!("Could not read uploaded document: {}", e);
            DocumentUpload::default()
        }),
        Err(e) => {
            warn!("Document upload is not multipart: {}", e);
            DocumentUpload::default()
        }
    };

    let rules = state
        .extractor
        .extract_document(&upload)
        .await
        .into_iter()
        .map(|r| DocumentRuleResponse {
            result: OutcomeSummary::from(&r.outcome),
            source_snippet: r.source_snippet,
        })
        .collect();

    Json(DocumentRulesResponse { rules })
}

/// The first multipart field carrying a filename
async fn read_upload(mut multipart: Multipart) -> Result<DocumentUpload, MultipartError> {
    while let Some(field) = multipart.next_field().await? {
        let Some(filename) = field.file_name().map(str::to_string) else {
            continue;
        };
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await?;
        debug!("Received upload '{}' ({} bytes)", filename, bytes.len());

        let upload = DocumentUpload::new(filename, bytes.to_vec());
        return Ok(match content_type {
            Some(ct) => upload.with_content_type(ct),
            None => upload,
        });
    }
    Ok(DocumentUpload::default())
}

/// GET /api/rules/summary - Static rule counts per category
async fn rules_summary() -> Json<SummaryResponse> {
    Json(CategoryCounts::published().into())
}

/// GET /api/health - Liveness check
async fn health_check() -> Json<HealthCheckResponse> {
    Json(HealthCheckResponse {
        status: "ok".to_string(),
    })
}

/// Create the axum router with all routes under `/api`
pub fn create_router(state: AppState, cors: CorsPolicy) -> AxumRouter {
    let api = AxumRouter::new()
        .route("/extract-rule", post(extract_rule))
        .route("/extract-from-document", post(extract_from_document))
        .route("/rules/summary", get(rules_summary))
        .route("/health", get(health_check))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(state);

    AxumRouter::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(cors, cors_middleware))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_form_defaults() {
        let form = ExtractRuleForm::from_fields(fields(&[("text", "SELECT *")])).unwrap();
        assert_eq!(form.category, Some(Category::Code));
        assert_eq!(form.rule_pack, "generic");
        assert_eq!(form.created_by, "anonymous");
    }

    #[test]
    fn test_form_requires_text() {
        let result = ExtractRuleForm::from_fields(fields(&[("rule_type", "naming")]));
        assert!(matches!(result, Err(AppError::MissingField(f)) if f == "text"));
    }

    #[test]
    fn test_unknown_rule_type_defers_to_classifier() {
        let form = ExtractRuleForm::from_fields(fields(&[
            ("text", "Use the strategy pattern"),
            ("rule_type", "architecture"),
        ]))
        .unwrap();
        assert_eq!(form.category, None);
        assert_eq!(form.candidate().resolved_category(), Category::Design);
    }

    #[test]
    fn test_rule_type_is_case_insensitive() {
        let form = ExtractRuleForm::from_fields(fields(&[("text", "x"), ("rule_type", " Naming ")]))
            .unwrap();
        assert_eq!(form.category, Some(Category::Naming));
    }

    #[test]
    fn test_summary_total() {
        let summary = SummaryResponse::from(CategoryCounts::published());
        assert_eq!(summary.total, 147);
        assert_eq!(summary.naming, 35);
    }
}
