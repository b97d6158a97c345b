use std::io;

use engine_logging::{engine_info, engine_warn};
use frontier_core::{parse_seed_list, DocumentRef, SeedError};
use reqwest::{StatusCode, Url};
use thiserror::Error;

use crate::http::{build_client, endpoint, parse_base_url, AUTH_HEADER};
use crate::{AuthToken, ClientBuildError, PersistError, StoreSettings, TokenCache};

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("token request rejected with status {status}")]
    TokenRejected { status: u16 },
    #[error("token not reissued yet and the cached copy is unusable: {0}")]
    Cache(#[from] PersistError),
    #[error("seed request rejected with status {status}")]
    SeedRejected { status: u16 },
    #[error("malformed seed: {0}")]
    Seed(#[from] SeedError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error(transparent)]
    Client(#[from] ClientBuildError),
    #[error("failed to start the bootstrap runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Credential and starting documents for one run.
#[derive(Debug, Clone)]
pub struct Bootstrap {
    pub token: AuthToken,
    pub seeds: Vec<DocumentRef>,
}

/// One-time setup calls made before the engine starts.
pub struct Bootstrapper {
    client: reqwest::Client,
    base: Url,
    cache: TokenCache,
}

impl Bootstrapper {
    pub fn new(settings: &StoreSettings, cache: TokenCache) -> Result<Self, ClientBuildError> {
        Ok(Self {
            client: build_client(settings)?,
            base: parse_base_url(&settings.base_url)?,
            cache,
        })
    }

    /// 200 issues a fresh token and caches it. 403 means the previous token
    /// is still valid, so the cached copy is used instead.
    pub async fn obtain_token(&self, api_key: &str) -> Result<AuthToken, BootstrapError> {
        let url = endpoint(&self.base, &["token", api_key]);
        let response = self.client.get(url).send().await?;
        match response.status() {
            StatusCode::OK => {
                let token = response.text().await?.trim().to_string();
                match self.cache.store(&token) {
                    Ok(path) => engine_info!("obtained new token, cached at {:?}", path),
                    Err(err) => engine_warn!("obtained new token but could not cache it: {err}"),
                }
                Ok(AuthToken::new(token))
            }
            StatusCode::FORBIDDEN => {
                engine_info!("token not yet expired, using cached token");
                Ok(AuthToken::new(self.cache.load()?))
            }
            status => Err(BootstrapError::TokenRejected {
                status: status.as_u16(),
            }),
        }
    }

    pub async fn fetch_seeds(&self, token: &AuthToken) -> Result<Vec<DocumentRef>, BootstrapError> {
        let url = endpoint(&self.base, &["seed"]);
        let response = self
            .client
            .get(url)
            .header(AUTH_HEADER, token.value())
            .send()
            .await?;
        let status = response.status();
        if status != StatusCode::OK {
            return Err(BootstrapError::SeedRejected {
                status: status.as_u16(),
            });
        }
        let seeds = parse_seed_list(&response.text().await?)?;
        engine_info!("received {} seed document(s)", seeds.len());
        Ok(seeds)
    }

    pub async fn bootstrap(&self, api_key: &str) -> Result<Bootstrap, BootstrapError> {
        let token = self.obtain_token(api_key).await?;
        let seeds = self.fetch_seeds(&token).await?;
        Ok(Bootstrap { token, seeds })
    }

    /// Runs [`Bootstrapper::bootstrap`] on a private single-threaded runtime.
    pub fn bootstrap_blocking(&self, api_key: &str) -> Result<Bootstrap, BootstrapError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(BootstrapError::Runtime)?;
        runtime.block_on(self.bootstrap(api_key))
    }
}
