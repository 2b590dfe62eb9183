use std::path::PathBuf;

use clap::Args;

use common::document::ObjectNameError;
use common::prelude::{ContentKind, EditorSession, MemorySurface, ObjectName, SessionError};
use docvault_daemon::http_server::api::client::UploadError;

/// Upload a local .sfdt or .json file through a broker-issued write grant.
#[derive(Args, Debug, Clone)]
pub struct Upload {
    /// File to upload
    pub file: PathBuf,

    /// Object name without extension (defaults to the file's stem)
    #[arg(long)]
    pub name: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum UploadOpError {
    #[error("could not read {0}: {1}")]
    Read(PathBuf, std::io::Error),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("invalid file name: {0}")]
    Name(#[from] ObjectNameError),
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl Upload {
    fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    fn object_name(&self) -> Result<ObjectName, ObjectNameError> {
        match &self.name {
            Some(name) => ObjectName::new(name.clone()),
            None => {
                let stem = self
                    .file
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default();
                ObjectName::new(stem)
            }
        }
    }
}

#[async_trait::async_trait]
impl crate::cli::op::Op for Upload {
    type Error = UploadOpError;
    type Output = String;

    async fn execute(&self, ctx: &crate::cli::op::OpContext) -> Result<Self::Output, Self::Error> {
        let bytes = tokio::fs::read(&self.file)
            .await
            .map_err(|e| UploadOpError::Read(self.file.clone(), e))?;
        let file_name = self.file_name();
        let name = self.object_name()?;

        let session = EditorSession::local(MemorySurface::ready());
        session.open_local(&file_name, &bytes)?;

        let kind = ContentKind::from_file_name(&file_name).unwrap_or_default();
        let export = session.export_local(&name, kind);

        let mut client = ctx.client.clone();
        let url = client.upload(&name, &export).await?;

        let mut location = url;
        location.set_query(None);
        Ok(format!(
            "Uploaded {} as {} ({} bytes)\n{}",
            self.file.display(),
            export.file_name,
            export.bytes.len(),
            location
        ))
    }
}
