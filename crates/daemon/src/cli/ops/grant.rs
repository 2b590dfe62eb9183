use clap::Args;

use docvault_daemon::http_server::api::client::ApiError;
use docvault_daemon::http_server::api::presign::{PresignRequest, PresignResponse};

/// Ask the broker for a write grant without uploading anything.
#[derive(Args, Debug, Clone)]
pub struct Grant {
    #[command(flatten)]
    pub request: PresignRequest,
}

#[derive(Debug, thiserror::Error)]
pub enum GrantError {
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Grant {
    type Error = GrantError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let mut client = ctx.client.clone();
        let response: PresignResponse = client.call(self.request.clone()).await?;
        Ok(response.url.to_string())
    }
}
