//! ListObjectVersions request building and response parsing.

use chrono::{DateTime, Utc};
use common::revision::{Revision, RevisionId};
use common::store::{PageCursor, VersionPage};
use serde::Deserialize;
use url::Url;

use crate::error::Result;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListVersionsResult {
    #[serde(default)]
    is_truncated: bool,
    #[serde(default)]
    next_key_marker: Option<String>,
    #[serde(default)]
    next_version_id_marker: Option<String>,
    // Interleaved with DeleteMarker elements, which are dropped
    #[serde(default, rename = "Version")]
    versions: Vec<ObjectVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ObjectVersion {
    key: String,
    version_id: String,
    last_modified: DateTime<Utc>,
    #[serde(default)]
    size: u64,
}

/// URL for one page of versions of `key`.
pub(crate) fn list_url(bucket_url: &Url, key: &str, cursor: Option<&PageCursor>) -> Url {
    let mut url = bucket_url.clone();
    {
        let mut query = url.query_pairs_mut();
        query.append_pair("versions", "");
        query.append_pair("prefix", key);
        if let Some(cursor) = cursor {
            query.append_pair("key-marker", &cursor.key_marker);
            query.append_pair("version-id-marker", &cursor.version_id_marker);
        }
    }
    url
}

/// Parse a ListVersionsResult body, keeping only versions of exactly `key`.
pub(crate) fn parse_page(body: &str, key: &str) -> Result<VersionPage> {
    let result: ListVersionsResult = quick_xml::de::from_str(body)?;

    let revisions = result
        .versions
        .into_iter()
        .filter(|v| v.key == key)
        .map(|v| Revision {
            version_id: RevisionId::new(v.version_id),
            last_modified: v.last_modified,
            size: v.size,
        })
        .collect();

    let next = match (
        result.is_truncated,
        result.next_key_marker,
        result.next_version_id_marker,
    ) {
        (true, Some(key_marker), version_id_marker) => Some(PageCursor {
            key_marker,
            version_id_marker: version_id_marker.unwrap_or_default(),
        }),
        _ => None,
    };

    Ok(VersionPage { revisions, next })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRUNCATED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListVersionsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>docs</Name>
  <Prefix>document.json</Prefix>
  <KeyMarker></KeyMarker>
  <VersionIdMarker></VersionIdMarker>
  <NextKeyMarker>document.json</NextKeyMarker>
  <NextVersionIdMarker>3HL4kqCxf3vjVBH40Nrjfkd</NextVersionIdMarker>
  <MaxKeys>3</MaxKeys>
  <IsTruncated>true</IsTruncated>
  <Version>
    <Key>document.json</Key>
    <VersionId>3sL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY</VersionId>
    <IsLatest>true</IsLatest>
    <LastModified>2024-03-01T11:00:00.000Z</LastModified>
    <ETag>"fba9dede5f27731c9771645a39863328"</ETag>
    <Size>2048</Size>
    <StorageClass>STANDARD</StorageClass>
  </Version>
  <DeleteMarker>
    <Key>document.json</Key>
    <VersionId>03jpff543dhffds434rfdsFDN943fdsFkdmqnh892</VersionId>
    <IsLatest>false</IsLatest>
    <LastModified>2024-03-01T10:30:00.000Z</LastModified>
  </DeleteMarker>
  <Version>
    <Key>document.json.bak</Key>
    <VersionId>QUpfdndhfd8438MNFDN93jdnJFkdmqnh893</VersionId>
    <IsLatest>true</IsLatest>
    <LastModified>2024-03-01T10:15:00.000Z</LastModified>
    <Size>12</Size>
  </Version>
  <Version>
    <Key>document.json</Key>
    <VersionId>3HL4kqCxf3vjVBH40Nrjfkd</VersionId>
    <IsLatest>false</IsLatest>
    <LastModified>2024-03-01T10:00:00.000Z</LastModified>
    <Size>1024</Size>
  </Version>
</ListVersionsResult>"#;

    const LAST: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<ListVersionsResult xmlns="http://s3.amazonaws.com/doc/2006-03-01/">
  <Name>docs</Name>
  <Prefix>document.json</Prefix>
  <IsTruncated>false</IsTruncated>
</ListVersionsResult>"#;

    #[test]
    fn test_parse_truncated_page() {
        let page = parse_page(TRUNCATED, "document.json").unwrap();

        let ids: Vec<_> = page.revisions.iter().map(|r| r.version_id.as_str()).collect();
        assert_eq!(
            ids,
            vec!["3sL4kqtJlcpXroDTDmJ+rmSpXd3dIbrHY", "3HL4kqCxf3vjVBH40Nrjfkd"]
        );
        assert_eq!(page.revisions[0].size, 2048);
        assert_eq!(
            page.revisions[1].last_modified.to_rfc3339(),
            "2024-03-01T10:00:00+00:00"
        );

        let next = page.next.unwrap();
        assert_eq!(next.key_marker, "document.json");
        assert_eq!(next.version_id_marker, "3HL4kqCxf3vjVBH40Nrjfkd");
    }

    #[test]
    fn test_parse_empty_last_page() {
        let page = parse_page(LAST, "document.json").unwrap();
        assert!(page.revisions.is_empty());
        assert!(page.next.is_none());
    }

    #[test]
    fn test_list_url() {
        let base = Url::parse("http://localhost:9000/docs/").unwrap();
        assert_eq!(
            list_url(&base, "document.json", None).as_str(),
            "http://localhost:9000/docs/?versions=&prefix=document.json"
        );

        let cursor = PageCursor {
            key_marker: "document.json".into(),
            version_id_marker: "a+b".into(),
        };
        assert_eq!(
            list_url(&base, "document.json", Some(&cursor)).as_str(),
            "http://localhost:9000/docs/?versions=&prefix=document.json\
             &key-marker=document.json&version-id-marker=a%2Bb"
        );
    }
}
