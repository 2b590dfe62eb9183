//! Document payloads, content kinds and object naming.
//!
//! The editor widget owns the structured document format. Everything in here
//! treats the payload as an opaque JSON tree and only cares about how it is
//! named, labelled and encoded on its way to and from storage.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// MIME type the browser labels structured-document blobs with.
pub const SFDT_MIME: &str = "application/vnd.syncfusion.sfdt";
/// MIME type the credential broker signs structured-document uploads for.
pub const SFDT_GRANT_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const JSON_MIME: &str = "application/json";

pub const SFDT_EXTENSION: &str = "sfdt";
pub const JSON_EXTENSION: &str = "json";

/// Name used when the user doesn't pick one.
pub const DEFAULT_DOCUMENT_NAME: &str = "Document";

/// The closed set of payload kinds an object can be stored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// The editor's native serialized tree
    #[default]
    StructuredDocument,
    /// The same tree labelled as plain JSON
    GenericJson,
}

impl ContentKind {
    /// Anything other than `"json"` (including nothing) is a structured document.
    pub fn from_query(value: Option<&str>) -> Self {
        match value {
            Some(JSON_EXTENSION) => ContentKind::GenericJson,
            _ => ContentKind::StructuredDocument,
        }
    }

    pub fn extension(&self) -> &'static str {
        match self {
            ContentKind::StructuredDocument => SFDT_EXTENSION,
            ContentKind::GenericJson => JSON_EXTENSION,
        }
    }

    /// Content type bound into an upload grant.
    pub fn grant_mime(&self) -> &'static str {
        match self {
            ContentKind::StructuredDocument => SFDT_GRANT_MIME,
            ContentKind::GenericJson => JSON_MIME,
        }
    }

    /// Content type for local downloads and upload bodies.
    pub fn export_mime(&self) -> &'static str {
        match self {
            ContentKind::StructuredDocument => SFDT_MIME,
            ContentKind::GenericJson => JSON_MIME,
        }
    }

    /// Recognize a kind from a file name's extension.
    pub fn from_file_name(file_name: &str) -> Option<Self> {
        let (_, ext) = file_name.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            SFDT_EXTENSION => Some(ContentKind::StructuredDocument),
            JSON_EXTENSION => Some(ContentKind::GenericJson),
            _ => None,
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for ContentKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::from_query(Some(s)))
    }
}

/// A bare object name, without its extension.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObjectNameError {
    #[error("object name cannot be empty")]
    Empty,
    #[error("object name cannot contain '/': {0}")]
    Separator(String),
    #[error("object name must not carry an extension: {0}")]
    HasExtension(String),
}

impl ObjectName {
    pub fn new(name: impl Into<String>) -> Result<Self, ObjectNameError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ObjectNameError::Empty);
        }
        if trimmed.contains('/') {
            return Err(ObjectNameError::Separator(name));
        }
        if ContentKind::from_file_name(trimmed).is_some() {
            return Err(ObjectNameError::HasExtension(name));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The storage key (and download file name) for this name and kind.
    pub fn object_key(&self, kind: ContentKind) -> String {
        format!("{}.{}", self.0, kind.extension())
    }
}

impl Default for ObjectName {
    fn default() -> Self {
        Self(DEFAULT_DOCUMENT_NAME.to_string())
    }
}

impl TryFrom<String> for ObjectName {
    type Error = ObjectNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ObjectName> for String {
    fn from(value: ObjectName) -> Self {
        value.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("payload is not valid UTF-8: {0}")]
    Utf8(#[from] std::str::Utf8Error),
    #[error("payload is not a JSON document: {0}")]
    Json(#[from] serde_json::Error),
}

/// A serialized document tree.
///
/// Cloning produces an independent copy; surfaces never share a payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentContent(Value);

impl DocumentContent {
    pub fn new(tree: Value) -> Self {
        Self(tree)
    }

    /// The document a fresh editor starts with.
    pub fn blank() -> Self {
        Self(Value::Object(Default::default()))
    }

    /// Decode raw bytes as UTF-8 JSON text.
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let text = std::str::from_utf8(bytes)?;
        Ok(Self(serde_json::from_str(text)?))
    }

    pub fn encode(&self) -> Vec<u8> {
        // Serializing a Value can't fail
        serde_json::to_vec(&self.0).unwrap_or_default()
    }

    pub fn tree(&self) -> &Value {
        &self.0
    }

    pub fn into_tree(self) -> Value {
        self.0
    }
}
