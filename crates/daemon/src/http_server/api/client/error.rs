use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("HTTP request failed: {0}")]
    Reqwest(#[from] reqwest::Error),
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
    #[error("HTTP status {0}: {1}")]
    HttpStatus(StatusCode, String),
}

/// Uploading a document through a write grant.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("could not obtain a write grant: {0}")]
    Grant(ApiError),
    #[error("upload failed: {0}")]
    UploadFailed(ApiError),
}
