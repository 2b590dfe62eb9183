use reqwest::{header::HeaderMap, header::HeaderValue, header::CONTENT_TYPE, Client};
use url::Url;

use common::document::ObjectName;
use common::session::LocalExport;

use super::error::{ApiError, UploadError};
use super::ApiRequest;
use crate::http_server::api::presign::PresignRequest;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert("Accept", HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&mut self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client);
        let response = request_builder.send().await?;

        if response.status().is_success() {
            Ok(response.json::<T::Response>().await?)
        } else {
            Err(ApiError::HttpStatus(
                response.status(),
                response.text().await?,
            ))
        }
    }

    /// Ask the broker for a write grant, then `PUT` the export through it.
    ///
    /// Returns the grant URL the body was written to. Nothing is retried.
    pub async fn upload(
        &mut self,
        name: &ObjectName,
        export: &LocalExport,
    ) -> Result<Url, UploadError> {
        let grant = self
            .call(PresignRequest::new(name, export.kind))
            .await
            .map_err(UploadError::Grant)?;

        tracing::debug!(key = %name.object_key(export.kind), "uploading through write grant");
        let response = self
            .client
            .put(grant.url.clone())
            .header(CONTENT_TYPE, export.mime)
            .body(export.bytes.clone())
            .send()
            .await
            .map_err(|e| UploadError::UploadFailed(e.into()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(%status, "upload rejected by storage");
            return Err(UploadError::UploadFailed(ApiError::HttpStatus(status, body)));
        }

        tracing::info!(key = %name.object_key(export.kind), "uploaded document");
        Ok(grant.url)
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}
