use std::time::Duration;

use frontier_core::{CrawlError, DocumentRef, Feature};
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::{RequestBuilder, Response, StatusCode, Url};
use serde::Serialize;
use thiserror::Error;

use crate::wire::{DeleteRequest, FeaturesResponse, SaveRequest};
use crate::{AuthToken, DocumentPage, FeatureStore};

pub const AUTH_HEADER: &str = "X-Auth-Token";
const FEATURE_ENDPOINT: [&str; 2] = ["image", "feature"];

#[derive(Debug, Clone)]
pub struct StoreSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    pub max_bytes: u64,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            base_url: "http://api.welcome.kakao.com".to_string(),
            connect_timeout: Duration::from_secs(10),
            max_bytes: 4 * 1024 * 1024,
        }
    }
}

#[derive(Debug, Error)]
pub enum ClientBuildError {
    #[error("invalid base url {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },
    #[error("failed to build http client: {0}")]
    Client(#[from] reqwest::Error),
}

pub(crate) fn parse_base_url(raw: &str) -> Result<Url, ClientBuildError> {
    let url = Url::parse(raw).map_err(|err| ClientBuildError::BaseUrl {
        url: raw.to_string(),
        reason: err.to_string(),
    })?;
    if url.cannot_be_a_base() {
        return Err(ClientBuildError::BaseUrl {
            url: raw.to_string(),
            reason: "url cannot carry a path".to_string(),
        });
    }
    Ok(url)
}

/// Appends percent-encoded path segments to `base`, keeping any base path.
pub(crate) fn endpoint(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

pub(crate) fn build_client(settings: &StoreSettings) -> Result<reqwest::Client, ClientBuildError> {
    Ok(reqwest::Client::builder()
        .connect_timeout(settings.connect_timeout)
        .build()?)
}

/// [`FeatureStore`] backed by the remote HTTP API.
#[derive(Debug, Clone)]
pub struct ReqwestStore {
    client: reqwest::Client,
    base: Url,
    token: AuthToken,
    max_bytes: u64,
}

impl ReqwestStore {
    pub fn new(settings: StoreSettings, token: AuthToken) -> Result<Self, ClientBuildError> {
        Ok(Self {
            client: build_client(&settings)?,
            base: parse_base_url(&settings.base_url)?,
            token,
            max_bytes: settings.max_bytes,
        })
    }

    async fn send(
        &self,
        request: RequestBuilder,
        timeout: Duration,
        rejected: fn(u16) -> CrawlError,
    ) -> Result<Response, CrawlError> {
        let response = request
            .header(AUTH_HEADER, self.token.value())
            .timeout(timeout)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        match response.status() {
            StatusCode::OK => Ok(response),
            StatusCode::UNAUTHORIZED => Err(CrawlError::Unauthorized),
            status => Err(rejected(status.as_u16())),
        }
    }

    async fn read_body(&self, response: Response) -> Result<Vec<u8>, CrawlError> {
        if let Some(content_len) = response.content_length() {
            if content_len > self.max_bytes {
                return Err(too_large(self.max_bytes, content_len));
            }
        }

        let mut bytes = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(map_reqwest_error)?;
            let next_len = bytes.len() as u64 + chunk.len() as u64;
            if next_len > self.max_bytes {
                return Err(too_large(self.max_bytes, next_len));
            }
            bytes.extend_from_slice(&chunk);
        }
        Ok(bytes)
    }

    fn json_request<T: Serialize>(
        &self,
        request: RequestBuilder,
        payload: &T,
    ) -> Result<RequestBuilder, CrawlError> {
        let body = serde_json::to_vec(payload)
            .map_err(|err| CrawlError::Transient(format!("failed to encode request: {err}")))?;
        Ok(request.header(CONTENT_TYPE, "application/json").body(body))
    }
}

#[async_trait::async_trait]
impl FeatureStore for ReqwestStore {
    async fn fetch_document(
        &self,
        doc: &DocumentRef,
        timeout: Duration,
    ) -> Result<DocumentPage, CrawlError> {
        let url = endpoint(&self.base, &["doc", doc.category(), doc.id()]);
        let response = self
            .send(self.client.get(url), timeout, |status| {
                CrawlError::CollectionFailed { status }
            })
            .await?;
        let body = self.read_body(response).await?;
        decode(&body)
    }

    async fn fetch_features(
        &self,
        ids: &[String],
        timeout: Duration,
    ) -> Result<Vec<Feature>, CrawlError> {
        let mut url = endpoint(&self.base, &FEATURE_ENDPOINT);
        url.query_pairs_mut().append_pair("id", &ids.join(","));
        let response = self
            .send(self.client.get(url), timeout, rejected)
            .await?;
        let body = self.read_body(response).await?;
        decode::<FeaturesResponse>(&body)?
            .into_features()
            .map_err(CrawlError::Transient)
    }

    async fn persist_features(
        &self,
        features: &[Feature],
        timeout: Duration,
    ) -> Result<(), CrawlError> {
        let url = endpoint(&self.base, &FEATURE_ENDPOINT);
        let request = self.json_request(self.client.post(url), &SaveRequest::new(features))?;
        self.send(request, timeout, rejected).await.map(drop)
    }

    async fn delete_features(&self, ids: &[String], timeout: Duration) -> Result<(), CrawlError> {
        let url = endpoint(&self.base, &FEATURE_ENDPOINT);
        let request = self.json_request(self.client.delete(url), &DeleteRequest::new(ids))?;
        self.send(request, timeout, rejected).await.map(drop)
    }
}

fn rejected(status: u16) -> CrawlError {
    CrawlError::Rejected { status }
}

fn decode<T: serde::de::DeserializeOwned>(body: &[u8]) -> Result<T, CrawlError> {
    serde_json::from_slice(body)
        .map_err(|err| CrawlError::Transient(format!("malformed response: {err}")))
}

fn too_large(max_bytes: u64, actual: u64) -> CrawlError {
    CrawlError::Transient(format!("response too large (max {max_bytes}, actual {actual})"))
}

fn map_reqwest_error(err: reqwest::Error) -> CrawlError {
    if err.is_timeout() {
        return CrawlError::Transient(format!("timeout: {err}"));
    }
    if err.is_connect() {
        return CrawlError::Transient(format!("connection failed: {err}"));
    }
    CrawlError::Transient(format!("network error: {err}"))
}
