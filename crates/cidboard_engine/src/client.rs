use std::path::{Path, PathBuf};
use std::time::Duration;

use board_logging::{board_debug, board_info};
use futures_util::StreamExt;
use reqwest::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use url::Url;

use crate::endpoint::{endpoint, parse_base};
use crate::filename::download_filename;
use crate::persist::AtomicFileWriter;
use crate::types::Acknowledgement;
use crate::{
    ApiError, AuthAck, CollectionList, ControlKind, DownloadedFile, FailureKind, LoginRequest,
    RegisterRequest, Reply, RetryReceipt, RetryRequest, StartReceipt, StartRequest, StatusReport,
    UploadReceipt,
};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";
const XLS_MIME: &str = "application/vnd.ms-excel";

#[derive(Debug, Clone)]
pub struct ClientSettings {
    /// Single origin for auth and dashboard calls alike.
    pub base_url: String,
    pub connect_timeout: Duration,
    pub request_timeout: Duration,
    pub max_download_bytes: u64,
    pub download_dir: PathBuf,
    pub overwrite_downloads: bool,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:9200".to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(120),
            max_download_bytes: 100 * 1024 * 1024,
            download_dir: PathBuf::from("downloads"),
            overwrite_downloads: false,
        }
    }
}

/// The processing service's HTTP contract.
#[async_trait::async_trait]
pub trait ApiClient: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> Result<AuthAck, ApiError>;

    async fn register(&self, request: &RegisterRequest) -> Result<AuthAck, ApiError>;

    async fn upload(
        &self,
        file: &Path,
        tag: &str,
        collection: &str,
    ) -> Result<Reply<UploadReceipt>, ApiError>;

    async fn start(&self, request: &StartRequest) -> Result<Reply<StartReceipt>, ApiError>;

    async fn control(&self, kind: ControlKind) -> Result<Reply<String>, ApiError>;

    /// `collection = None` asks for the backend's current collection.
    async fn status(&self, collection: Option<&str>) -> Result<Reply<StatusReport>, ApiError>;

    async fn collections(&self) -> Result<Reply<CollectionList>, ApiError>;

    async fn delete_collection(&self, name: &str) -> Result<Reply<String>, ApiError>;

    async fn retry_failed(&self, request: &RetryRequest) -> Result<Reply<RetryReceipt>, ApiError>;

    async fn download(&self, tag: &str, collection: &str)
        -> Result<Reply<DownloadedFile>, ApiError>;
}

#[derive(Debug, Clone)]
pub struct ReqwestApiClient {
    settings: ClientSettings,
    base: Url,
    client: reqwest::Client,
}

impl ReqwestApiClient {
    pub fn new(settings: ClientSettings) -> Result<Self, ApiError> {
        let base = parse_base(&settings.base_url)?;
        let client = reqwest::Client::builder()
            .connect_timeout(settings.connect_timeout)
            .timeout(settings.request_timeout)
            .build()
            .map_err(|err| ApiError::new(FailureKind::Network, err.to_string()))?;
        Ok(Self {
            settings,
            base,
            client,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    fn url(&self, segments: &[&str], query: &[(&str, &str)]) -> Url {
        endpoint(&self.base, segments, query)
    }

    async fn send(&self, request: reqwest::RequestBuilder) -> Result<reqwest::Response, ApiError> {
        request.send().await.map_err(map_reqwest_error)
    }

    /// Auth calls fail on any non-2xx status, keeping the body's `message`.
    async fn auth_call<B: Serialize + Sync>(
        &self,
        segments: &[&str],
        body: &B,
    ) -> Result<AuthAck, ApiError> {
        let url = self.url(segments, &[]);
        let response = self.send(self.client.post(url).json(body)).await?;
        let status = response.status();
        let bytes = response.bytes().await.map_err(map_reqwest_error)?;
        if !status.is_success() {
            let server_message = serde_json::from_slice::<Value>(&bytes)
                .ok()
                .and_then(|body| body.get("message").and_then(Value::as_str).map(str::to_owned));
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                format!("Request failed with status code {}", status.as_u16()),
            )
            .with_server_message(server_message));
        }
        if bytes.is_empty() {
            return Ok(AuthAck::default());
        }
        serde_json::from_slice(&bytes).map_err(decode_error)
    }
}

#[async_trait::async_trait]
impl ApiClient for ReqwestApiClient {
    async fn login(&self, request: &LoginRequest) -> Result<AuthAck, ApiError> {
        board_info!("login as {}", request.email);
        self.auth_call(&["api", "auth", "login"], request).await
    }

    async fn register(&self, request: &RegisterRequest) -> Result<AuthAck, ApiError> {
        board_info!("register {} as {}", request.email, request.role);
        self.auth_call(&["api", "auth", "register"], request).await
    }

    async fn upload(
        &self,
        file: &Path,
        tag: &str,
        collection: &str,
    ) -> Result<Reply<UploadReceipt>, ApiError> {
        let data = tokio::fs::read(file)
            .await
            .map_err(|err| ApiError::new(FailureKind::Io, format!("{}: {err}", file.display())))?;
        let file_name = file
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.xlsx".to_string());
        board_info!(
            "upload {} ({} bytes) tag={} collection={}",
            file_name,
            data.len(),
            tag,
            collection
        );

        let part = Part::bytes(data)
            .file_name(file_name.clone())
            .mime_str(excel_mime(&file_name))
            .map_err(map_reqwest_error)?;
        let form = Form::new()
            .part("file", part)
            .text("tag", tag.to_string())
            .text("collection", collection.to_string());

        let response = self
            .send(self.client.post(self.url(&["upload"], &[])).multipart(form))
            .await?;
        read_reply(response).await
    }

    async fn start(&self, request: &StartRequest) -> Result<Reply<StartReceipt>, ApiError> {
        let response = self
            .send(self.client.post(self.url(&["start"], &[])).json(request))
            .await?;
        read_reply(response).await
    }

    async fn control(&self, kind: ControlKind) -> Result<Reply<String>, ApiError> {
        let response = self
            .send(self.client.post(self.url(&[kind.path()], &[])))
            .await?;
        let reply: Reply<Acknowledgement> = read_reply(response).await?;
        Ok(map_reply(reply, |ack| ack.message))
    }

    async fn status(&self, collection: Option<&str>) -> Result<Reply<StatusReport>, ApiError> {
        let query: Vec<(&str, &str)> = collection
            .map(|name| vec![("collection", name)])
            .unwrap_or_default();
        let response = self
            .send(self.client.get(self.url(&["status"], &query)))
            .await?;
        read_reply(response).await
    }

    async fn collections(&self) -> Result<Reply<CollectionList>, ApiError> {
        let response = self
            .send(self.client.get(self.url(&["collections"], &[])))
            .await?;
        read_reply(response).await
    }

    async fn delete_collection(&self, name: &str) -> Result<Reply<String>, ApiError> {
        board_info!("delete collection {}", name);
        let response = self
            .send(self.client.delete(self.url(&["collections", name], &[])))
            .await?;
        let reply: Reply<Acknowledgement> = read_reply(response).await?;
        Ok(map_reply(reply, |ack| ack.message))
    }

    async fn retry_failed(&self, request: &RetryRequest) -> Result<Reply<RetryReceipt>, ApiError> {
        let response = self
            .send(self.client.post(self.url(&["retry-failed"], &[])).json(request))
            .await?;
        read_reply(response).await
    }

    async fn download(
        &self,
        tag: &str,
        collection: &str,
    ) -> Result<Reply<DownloadedFile>, ApiError> {
        let url = self.url(&["download"], &[("tag", tag), ("collection", collection)]);
        let response = self.send(self.client.get(url)).await?;

        let content_type = header_value(&response, CONTENT_TYPE);
        if content_type
            .as_deref()
            .is_some_and(|ct| ct.trim_start().starts_with("application/json"))
        {
            // The export endpoint only answers JSON when it has nothing to send.
            return match read_reply::<Value>(response).await? {
                Reply::Refused(error) => Ok(Reply::Refused(error)),
                Reply::Success(_) => Err(ApiError::new(
                    FailureKind::Decode,
                    "expected a file but the server sent JSON",
                )),
            };
        }

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::new(
                FailureKind::HttpStatus(status.as_u16()),
                status.to_string(),
            ));
        }

        let max_bytes = self.settings.max_download_bytes;
        if let Some(content_len) = response.content_length() {
            if content_len > max_bytes {
                return Err(too_large(max_bytes, Some(content_len)));
            }
        }

        let file_name = download_filename(
            header_value(&response, CONTENT_DISPOSITION).as_deref(),
            collection,
            tag,
        );

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > max_bytes {
                return Err(too_large(max_bytes, Some(next_len)));
            }
            bytes.extend_from_slice(&chunk);
        }
        board_debug!("downloaded {} bytes for {}", bytes.len(), file_name);

        let dir = self.settings.download_dir.clone();
        let writer = if self.settings.overwrite_downloads {
            AtomicFileWriter::overwriting(dir)
        } else {
            AtomicFileWriter::new(dir)
        };
        let path = writer
            .write(&file_name, &bytes)
            .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or(file_name);
        board_info!("saved export to {:?}", path);

        Ok(Reply::Success(DownloadedFile {
            path,
            file_name,
            bytes: bytes.len() as u64,
        }))
    }
}

/// Reads a dashboard reply. The HTTP status is not consulted: the body alone
/// decides between refusal and success.
async fn read_reply<T: DeserializeOwned>(response: reqwest::Response) -> Result<Reply<T>, ApiError> {
    let status = response.status();
    let bytes = response.bytes().await.map_err(map_reqwest_error)?;
    if bytes.is_empty() {
        return Err(ApiError::new(
            FailureKind::Decode,
            format!("server returned no content ({status})"),
        ));
    }
    let body: Value = serde_json::from_slice(&bytes).map_err(decode_error)?;
    if let Some(error) = refusal(&body) {
        return Ok(Reply::Refused(error));
    }
    serde_json::from_value(body)
        .map(Reply::Success)
        .map_err(decode_error)
}

fn refusal(body: &Value) -> Option<String> {
    match body.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::String(text) if text.is_empty() => None,
        Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn map_reply<T, U>(reply: Reply<T>, f: impl FnOnce(T) -> U) -> Reply<U> {
    match reply {
        Reply::Success(value) => Reply::Success(f(value)),
        Reply::Refused(error) => Reply::Refused(error),
    }
}

fn header_value(response: &reqwest::Response, name: reqwest::header::HeaderName) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn excel_mime(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    if lower.ends_with(".xlsx") {
        XLSX_MIME
    } else if lower.ends_with(".xls") {
        XLS_MIME
    } else {
        "application/octet-stream"
    }
}

fn too_large(max_bytes: u64, actual: Option<u64>) -> ApiError {
    ApiError::new(
        FailureKind::TooLarge { max_bytes, actual },
        "response too large",
    )
}

fn decode_error(err: serde_json::Error) -> ApiError {
    ApiError::new(FailureKind::Decode, err.to_string())
}

fn map_reqwest_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        return ApiError::new(FailureKind::Timeout, err.to_string());
    }
    if err.is_decode() {
        return ApiError::new(FailureKind::Decode, err.to_string());
    }
    if err.is_builder() {
        return ApiError::new(FailureKind::InvalidUrl, err.to_string());
    }
    ApiError::new(FailureKind::Network, err.to_string())
}
