//! Shared fixtures for the daemon integration tests.
#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use url::Url;

use ::common::grant::{CredentialBroker, GrantSigner, SignError};
use docvault_daemon::ServiceState;

/// Signs URLs under `base` without talking to any storage.
#[derive(Debug)]
pub enum FakeSigner {
    Working(Url),
    Broken,
}

impl FakeSigner {
    pub fn working() -> Self {
        FakeSigner::Working(Url::parse("https://storage.example.com/docs/").unwrap())
    }
}

#[async_trait]
impl GrantSigner for FakeSigner {
    async fn sign_put(
        &self,
        object_key: &str,
        _content_type: &str,
        expires_in: Duration,
    ) -> Result<Url, SignError> {
        match self {
            FakeSigner::Working(base) => {
                let mut url = base.join(object_key).unwrap();
                url.query_pairs_mut()
                    .append_pair("X-Amz-Expires", &expires_in.as_secs().to_string());
                Ok(url)
            }
            FakeSigner::Broken => Err(SignError::MissingCredentials("no keys".into())),
        }
    }

    async fn check(&self) -> Result<(), SignError> {
        match self {
            FakeSigner::Working(_) => Ok(()),
            FakeSigner::Broken => Err(SignError::MissingCredentials("no keys".into())),
        }
    }
}

pub fn state(signer: FakeSigner) -> ServiceState {
    ServiceState::new(CredentialBroker::new(Arc::new(signer)))
}

/// Serve `router` on an ephemeral localhost port for the rest of the test.
pub async fn spawn_router(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}
