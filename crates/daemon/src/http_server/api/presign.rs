use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};

use common::document::{ContentKind, ObjectName, ObjectNameError};
use common::grant::GrantError;

use crate::http_server::api::client::ApiRequest;
use crate::http_server::api::PRESIGN_PATH;
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct PresignRequest {
    /// Object name without extension
    #[serde(rename = "fileName", skip_serializing_if = "Option::is_none")]
    #[arg(long = "name")]
    pub file_name: Option<String>,
    /// "json" for a JSON object, anything else for a structured document
    #[serde(rename = "fileType", skip_serializing_if = "Option::is_none")]
    #[arg(long = "kind")]
    pub file_type: Option<String>,
}

impl PresignRequest {
    pub fn new(name: &ObjectName, kind: ContentKind) -> Self {
        Self {
            file_name: Some(name.to_string()),
            file_type: Some(kind.to_string()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresignResponse {
    pub url: Url,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Query(req): Query<PresignRequest>,
) -> Result<impl IntoResponse, PresignError> {
    let kind = ContentKind::from_query(req.file_type.as_deref());
    let name = ObjectName::new(req.file_name.unwrap_or_default()).map_err(|e| {
        tracing::warn!("PRESIGN: rejected object name: {}", e);
        PresignError::InvalidName(e)
    })?;

    tracing::info!("PRESIGN: issuing write grant for {}", name.object_key(kind));
    let grant = state.broker().issue_write_grant(&name, kind).await?;

    Ok(Json(PresignResponse { url: grant.url }))
}

#[derive(Debug, thiserror::Error)]
pub enum PresignError {
    #[error("invalid file name: {0}")]
    InvalidName(#[from] ObjectNameError),
    #[error(transparent)]
    Grant(#[from] GrantError),
}

impl IntoResponse for PresignError {
    fn into_response(self) -> Response {
        let status = match &self {
            PresignError::InvalidName(_) => http::StatusCode::BAD_REQUEST,
            PresignError::Grant(e) => {
                tracing::error!("PRESIGN ERROR: {}", e);
                http::StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({"error": self.to_string()});
        (status, Json(body)).into_response()
    }
}

// Client implementation - builds request for this operation
impl ApiRequest for PresignRequest {
    type Response = PresignResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> RequestBuilder {
        let full_url = base_url.join(PRESIGN_PATH).unwrap();
        client.get(full_url).query(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_request_query() {
        let base = Url::parse("http://localhost:3002").unwrap();
        let name = ObjectName::new("report").unwrap();
        let request = PresignRequest::new(&name, ContentKind::GenericJson)
            .build_request(&base, &Client::new())
            .build()
            .unwrap();

        assert_eq!(request.method(), reqwest::Method::GET);
        assert_eq!(
            request.url().as_str(),
            "http://localhost:3002/generate-presigned-url?fileName=report&fileType=json"
        );
    }
}
