use crate::core::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Retrieval mode understood by the search service.
///
/// The service treats the value as an opaque mode string; the client only
/// ever needs `hybrid` but the other modes are accepted for experimentation.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
#[value(rename_all = "snake_case")]
pub enum QueryType {
    #[default]
    Hybrid,
    /// Dense vectors only; the service calls this mode "default"
    #[serde(rename = "default")]
    #[value(name = "default")]
    Dense,
    Sparse,
    TextSearch,
}

/// Body of `POST /collections/{name}/search`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    pub query: String,
    pub query_type: QueryType,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>, query_type: QueryType) -> Self {
        Self {
            query: query.into(),
            query_type,
        }
    }

    pub fn hybrid(query: impl Into<String>) -> Self {
        Self::new(query, QueryType::Hybrid)
    }
}

/// One code snippet returned by the search service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnippetResult {
    /// Opaque identifier, unique within one response
    pub id: String,
    /// Path of the originating file, relative to the indexed root
    pub file_path: String,
    /// Raw source text of the snippet
    pub content: String,
    /// Line number of the first line of `content`
    pub line_start: u32,
    // Accepted but not displayed
    #[serde(default)]
    pub file_name: String,
    #[serde(default)]
    pub line_end: u32,
    #[serde(default)]
    pub vector_score: Option<f64>,
}

impl SnippetResult {
    /// Create a snippet with only the fields the renderer consumes
    pub fn new(
        id: impl Into<String>,
        file_path: impl Into<String>,
        content: impl Into<String>,
        line_start: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_path: file_path.into(),
            content: content.into(),
            line_start,
            file_name: String::new(),
            line_end: 0,
            vector_score: None,
        }
    }

    /// Line number to print next to the first line of the snippet.
    /// The service reports 0 when it has no line metadata.
    pub fn first_line(&self) -> u32 {
        self.line_start.max(1)
    }
}

/// Body returned by the collection admin endpoints
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CollectionMessage {
    pub message: String,
}

/// Error body attached to non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// Decode the body of a successful search response
pub fn parse_search_response(body: &str) -> Result<Vec<SnippetResult>> {
    serde_json::from_str(body)
        .map_err(|e| Error::Decode(format!("Failed to parse search results: {}", e)))
}

/// Decode the body of a successful admin response
pub fn parse_collection_message(body: &str) -> Result<CollectionMessage> {
    serde_json::from_str(body)
        .map_err(|e| Error::Decode(format!("Failed to parse service message: {}", e)))
}

/// Extract a human-readable reason from a non-2xx body.
/// Falls back to the raw body when it is not the usual `{"detail": ...}` shape.
pub fn error_detail(body: &str) -> String {
    match serde_json::from_str::<ErrorBody>(body) {
        Ok(ErrorBody {
            detail: serde_json::Value::String(detail),
        }) => detail,
        Ok(ErrorBody { detail }) => detail.to_string(),
        Err(_) => body.trim().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_uses_camel_case_wire_names() {
        let json = serde_json::to_value(SearchRequest::hybrid("find login handler")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "query": "find login handler", "queryType": "hybrid" })
        );
    }

    #[test]
    fn response_accepts_unused_and_null_fields() {
        let body = r#"[
            {"id": "1", "filePath": "auth/login.ts", "fileName": "login.ts",
             "content": "export {}", "lineStart": 10, "lineEnd": 12, "vectorScore": null},
            {"id": "2", "filePath": "README", "content": "hi", "lineStart": 0}
        ]"#;
        let results = parse_search_response(body).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].file_path, "auth/login.ts");
        assert_eq!(results[0].line_start, 10);
        assert_eq!(results[0].vector_score, None);
        assert_eq!(results[1].first_line(), 1);
    }

    #[test]
    fn malformed_response_is_a_decode_error() {
        let err = parse_search_response(r#"{"results": []}"#).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn error_detail_prefers_detail_field() {
        assert_eq!(
            error_detail(r#"{"detail": "Collection 'x' does not exist."}"#),
            "Collection 'x' does not exist."
        );
        assert_eq!(error_detail("Internal Server Error\n"), "Internal Server Error");
    }
}
