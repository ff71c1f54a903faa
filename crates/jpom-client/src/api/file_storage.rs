// ABOUTME: File storage endpoints (/file-storage/*)
// ABOUTME: List, sharded upload and merge, edit, remote download, lookup, delete, trigger URL

use serde::de::IgnoredAny;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::dispatch::Dispatcher;
use crate::error::ApiError;
use crate::request::{ApiRequest, MultipartField};
use crate::transport::to_form_pairs;

/// How a stored file got there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileSource {
    Upload,
    Build,
    RemoteDownload,
    Certificate,
}

impl TryFrom<i32> for FileSource {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FileSource::Upload),
            1 => Ok(FileSource::Build),
            2 => Ok(FileSource::RemoteDownload),
            3 => Ok(FileSource::Certificate),
            other => Err(other),
        }
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileSource::Upload => "upload",
            FileSource::Build => "build",
            FileSource::RemoteDownload => "remote download",
            FileSource::Certificate => "certificate",
        })
    }
}

/// Download state of a stored file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileStatus {
    Downloading,
    Success,
    Failed,
}

impl TryFrom<i32> for FileStatus {
    type Error = i32;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(FileStatus::Downloading),
            1 => Ok(FileStatus::Success),
            2 => Ok(FileStatus::Failed),
            other => Err(other),
        }
    }
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Downloading => "downloading",
            FileStatus::Success => "success",
            FileStatus::Failed => "failed",
        })
    }
}

/// A file held by the server's file storage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StoredFile {
    pub id: String,
    pub name: Option<String>,
    pub ext_name: Option<String>,
    pub size: Option<u64>,
    pub source: Option<i32>,
    pub status: Option<i32>,
    pub description: Option<String>,
    pub alias_code: Option<String>,
    pub keep_day: Option<u32>,
    pub valid_until: Option<i64>,
    pub progress_desc: Option<String>,
    pub create_time_millis: Option<i64>,
}

impl StoredFile {
    pub fn source(&self) -> Option<FileSource> {
        self.source.and_then(|s| FileSource::try_from(s).ok())
    }

    pub fn status(&self) -> Option<FileStatus> {
        self.status.and_then(|s| FileStatus::try_from(s).ok())
    }
}

/// One page of a list query.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Page<T> {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub result: Vec<T>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ext_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
}

impl Default for ListParams {
    fn default() -> Self {
        Self {
            page: 1,
            limit: 10,
            name: None,
            ext_name: None,
            source: None,
            status: None,
        }
    }
}

/// Metadata shared by merge, edit and remote download.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keep_day: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub global: Option<bool>,
}

/// One shard of a sharded upload.
#[derive(Debug, Clone)]
pub struct UploadSlice {
    pub slice_id: String,
    pub total_slice: u32,
    /// Zero-based index of this shard.
    pub now_slice: u32,
    pub file_sum_md5: String,
    pub file_name: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeParams {
    pub slice_id: String,
    pub total_slice: u32,
    pub file_sum_md5: String,
    #[serde(flatten)]
    pub meta: FileMeta,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EditParams {
    pub id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub meta: FileMeta,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteDownloadParams {
    pub url: String,
    #[serde(flatten)]
    pub meta: FileMeta,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TriggerUrl {
    pub id: Option<String>,
    pub trigger_url: String,
    pub trigger_token: Option<String>,
}

fn pairs(params: &impl Serialize) -> Result<Vec<(String, String)>, ApiError> {
    to_form_pairs(params).map_err(|e| ApiError::InvalidRequest(e.to_string()))
}

pub async fn list(dispatcher: &Dispatcher, params: &ListParams) -> Result<Page<StoredFile>, ApiError> {
    dispatcher
        .request(ApiRequest::post("/file-storage/list").form(pairs(params)?))
        .await
}

pub async fn upload_sharding(dispatcher: &Dispatcher, slice: UploadSlice) -> Result<(), ApiError> {
    let fields = vec![
        MultipartField::text("sliceId", slice.slice_id),
        MultipartField::text("totalSlice", slice.total_slice.to_string()),
        MultipartField::text("nowSlice", slice.now_slice.to_string()),
        MultipartField::text("fileSumMd5", slice.file_sum_md5),
        MultipartField::file("file", slice.file_name, slice.bytes),
    ];
    let _: IgnoredAny = dispatcher
        .request(
            ApiRequest::post("/file-storage/upload-sharding")
                .multipart(fields)
                .no_timeout(),
        )
        .await?;
    Ok(())
}

pub async fn upload_sharding_merge(dispatcher: &Dispatcher, params: &MergeParams) -> Result<(), ApiError> {
    let _: IgnoredAny = dispatcher
        .request(
            ApiRequest::post("/file-storage/upload-sharding-merge")
                .form(pairs(params)?)
                .no_timeout(),
        )
        .await?;
    Ok(())
}

pub async fn edit(dispatcher: &Dispatcher, params: &EditParams) -> Result<(), ApiError> {
    let _: IgnoredAny = dispatcher
        .request(ApiRequest::post("/file-storage/edit").form(pairs(params)?))
        .await?;
    Ok(())
}

pub async fn remote_download(dispatcher: &Dispatcher, params: &RemoteDownloadParams) -> Result<(), ApiError> {
    let _: IgnoredAny = dispatcher
        .request(ApiRequest::post("/file-storage/remote-download").form(pairs(params)?))
        .await?;
    Ok(())
}

/// Look a file up by checksum. `None` when the server has no such file.
pub async fn has_file(dispatcher: &Dispatcher, file_sum_md5: &str) -> Result<Option<StoredFile>, ApiError> {
    dispatcher
        .request(
            ApiRequest::get("/file-storage/has-file")
                .query(vec![("fileSumMd5".to_string(), file_sum_md5.to_string())]),
        )
        .await
}

pub async fn delete(dispatcher: &Dispatcher, id: &str) -> Result<(), ApiError> {
    let _: IgnoredAny = dispatcher
        .request(ApiRequest::get("/file-storage/del").query(vec![("id".to_string(), id.to_string())]))
        .await?;
    Ok(())
}

/// Fetch the trigger URL of a file. `rebuild` asks the server to issue a new token.
pub async fn trigger_url(dispatcher: &Dispatcher, id: &str, rebuild: bool) -> Result<TriggerUrl, ApiError> {
    let mut query = vec![("id".to_string(), id.to_string())];
    if rebuild {
        query.push(("rest".to_string(), "rest".to_string()));
    }
    dispatcher
        .request(ApiRequest::get("/file-storage/trigger-url").query(query))
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_source_and_status_codes() {
        assert_eq!(FileSource::try_from(0), Ok(FileSource::Upload));
        assert_eq!(FileSource::try_from(3), Ok(FileSource::Certificate));
        assert_eq!(FileSource::try_from(4), Err(4));
        assert_eq!(FileStatus::try_from(2), Ok(FileStatus::Failed));
        assert_eq!(FileStatus::try_from(-1), Err(-1));
        assert_eq!(FileSource::RemoteDownload.to_string(), "remote download");
    }

    #[test]
    fn test_stored_file_tolerates_partial_payload() {
        let file: StoredFile = serde_json::from_value(json!({
            "id": "f1",
            "name": "app.jar",
            "source": 1,
            "status": 9,
            "unknownField": "ignored"
        }))
        .unwrap();
        assert_eq!(file.id, "f1");
        assert_eq!(file.source(), Some(FileSource::Build));
        assert_eq!(file.status(), None);
        assert!(file.size.is_none());
    }

    #[test]
    fn test_list_params_form_pairs() {
        let mut p = pairs(&ListParams {
            name: Some("app".to_string()),
            ..ListParams::default()
        })
        .unwrap();
        p.sort();
        assert_eq!(
            p,
            vec![
                ("limit".to_string(), "10".to_string()),
                ("name".to_string(), "app".to_string()),
                ("page".to_string(), "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_merge_params_flatten_meta() {
        let mut p = pairs(&MergeParams {
            slice_id: "s".to_string(),
            total_slice: 2,
            file_sum_md5: "abc".to_string(),
            meta: FileMeta {
                keep_day: Some(7),
                global: Some(false),
                ..FileMeta::default()
            },
        })
        .unwrap();
        p.sort();
        assert_eq!(
            p,
            vec![
                ("fileSumMd5".to_string(), "abc".to_string()),
                ("global".to_string(), "false".to_string()),
                ("keepDay".to_string(), "7".to_string()),
                ("sliceId".to_string(), "s".to_string()),
                ("totalSlice".to_string(), "2".to_string()),
            ]
        );
    }

    #[test]
    fn test_page_defaults() {
        let page: Page<StoredFile> = serde_json::from_value(json!({"total": 3})).unwrap();
        assert_eq!(page.total, 3);
        assert!(page.result.is_empty());
    }
}
