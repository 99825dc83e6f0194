//! Request/response envelope of one extraction.

use serde::{Deserialize, Serialize};

use crate::base::Span;
use crate::config::{AnnotationPolicy, ExtractorConfig};
use crate::error::ExtractError;
use crate::hir::{Diagnostic, Severity};
use crate::model::{AnonymousIds, Model};

/// Per-request overrides of the host configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RequestParams {
    pub anonymous_ids: Option<AnonymousIds>,
    pub annotations: Option<AnnotationPolicy>,
}

impl RequestParams {
    pub fn is_empty(&self) -> bool {
        self.anonymous_ids.is_none() && self.annotations.is_none()
    }

    /// `base` with these overrides applied.
    pub fn apply(&self, base: &ExtractorConfig) -> ExtractorConfig {
        let mut config = base.clone();
        if let Some(mode) = self.anonymous_ids {
            config.anonymous_ids = mode;
        }
        if let Some(policy) = self.annotations {
            config.annotations = policy;
        }
        config
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionRequest {
    pub file_path: String,
    pub span: Span,
    /// Document version the span was computed against
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(default, skip_serializing_if = "RequestParams::is_empty")]
    pub params: RequestParams,
}

impl ExtractionRequest {
    pub fn new(file_path: impl Into<String>, span: Span) -> Self {
        Self {
            file_path: file_path.into(),
            span,
            version: None,
            params: RequestParams::default(),
        }
    }

    pub fn with_version(mut self, version: i32) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_params(mut self, params: RequestParams) -> Self {
        self.params = params;
        self
    }
}

/// Why a request produced no model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResponseError {
    pub message: String,
    /// Retry after re-syncing the document
    pub recoverable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<Model>,
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
    /// Some constructs in the span could not be extracted
    pub partial: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ResponseError>,
}

impl ExtractionResponse {
    pub fn from_model(model: Model) -> Self {
        let diagnostics = model.diagnostics.clone();
        let partial = diagnostics.iter().any(|d| d.severity == Severity::Error);
        Self {
            model: Some(model),
            diagnostics,
            partial,
            error: None,
        }
    }

    pub fn from_error(error: &ExtractError) -> Self {
        Self {
            model: None,
            diagnostics: Vec::new(),
            partial: false,
            error: Some(ResponseError {
                message: error.to_string(),
                recoverable: error.is_recoverable(),
            }),
        }
    }

    pub fn to_json(&self) -> Result<String, ExtractError> {
        Ok(serde_json::to_string(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Leniency;

    #[test]
    fn test_request_from_json() {
        let request: ExtractionRequest = serde_json::from_str(
            r#"{
                "filePath": "main.bal",
                "span": { "start": { "line": 1, "column": 0 }, "end": { "line": 3, "column": 1 } },
                "version": 7,
                "params": { "anonymousIds": "random" }
            }"#,
        )
        .unwrap();
        assert_eq!(request.version, Some(7));
        assert_eq!(request.span, Span::from_coords(1, 0, 3, 1));
        let config = request.params.apply(&ExtractorConfig::default());
        assert_eq!(config.anonymous_ids, AnonymousIds::Random);
        assert_eq!(config.annotations.label, Leniency::Lenient);
    }

    #[test]
    fn test_error_response_json() {
        let response = ExtractionResponse::from_error(&ExtractError::StaleLocation {
            requested: 1,
            current: Some(2),
        });
        let json: serde_json::Value = serde_json::from_str(&response.to_json().unwrap()).unwrap();
        assert_eq!(json["partial"], false);
        assert_eq!(json["error"]["recoverable"], true);
        assert!(json.get("model").is_none());
    }
}
