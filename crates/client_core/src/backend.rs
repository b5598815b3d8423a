use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Response};
use shared::{
    domain::{GuardianContact, PanicLogEntry},
    error::{ApiError, ApiException},
    protocol::{guardian_route, panic_log_route, GuardianContactDto, SaveGuardianRequest},
};
use storage::Storage;
use url::Url;

const HTTP_TIMEOUT: Duration = Duration::from_secs(5);

#[async_trait]
pub trait GuardianDirectory: Send + Sync {
    /// `Ok(None)` when no guardian has been saved yet.
    async fn get_guardian_contact(&self) -> Result<Option<GuardianContact>>;
    async fn save_guardian_contact(&self, contact: &GuardianContact) -> Result<()>;
}

#[async_trait]
pub trait PanicLedger: Send + Sync {
    async fn log_panic_activation(&self) -> Result<()>;
    async fn get_panic_log(&self) -> Result<Vec<PanicLogEntry>>;
}

pub struct MissingBackend;

#[async_trait]
impl GuardianDirectory for MissingBackend {
    async fn get_guardian_contact(&self) -> Result<Option<GuardianContact>> {
        Err(anyhow!("guardian directory is unavailable"))
    }

    async fn save_guardian_contact(&self, _contact: &GuardianContact) -> Result<()> {
        Err(anyhow!("guardian directory is unavailable"))
    }
}

#[async_trait]
impl PanicLedger for MissingBackend {
    async fn log_panic_activation(&self) -> Result<()> {
        Err(anyhow!("panic ledger is unavailable"))
    }

    async fn get_panic_log(&self) -> Result<Vec<PanicLogEntry>> {
        Err(anyhow!("panic ledger is unavailable"))
    }
}

pub struct HttpBackend {
    http: Client,
    base_url: Url,
}

impl HttpBackend {
    pub fn new(server_url: &str) -> Result<Self> {
        let base_url =
            Url::parse(server_url).with_context(|| format!("invalid server url: {server_url}"))?;
        if !matches!(base_url.scheme(), "http" | "https") {
            bail!("server_url must start with http:// or https://");
        }
        let http = Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()
            .context("failed to build http client")?;
        Ok(Self { http, base_url })
    }

    fn endpoint(&self, route: &str) -> Result<Url> {
        self.base_url
            .join(route)
            .with_context(|| format!("failed to build url for {route}"))
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match response.json::<ApiError>().await {
        Ok(api_error) => Err(ApiException::from(api_error).into()),
        Err(_) => bail!("server responded with {status}"),
    }
}

#[async_trait]
impl GuardianDirectory for HttpBackend {
    async fn get_guardian_contact(&self) -> Result<Option<GuardianContact>> {
        let response = self.http.get(self.endpoint(guardian_route())?).send().await?;
        let dto: GuardianContactDto = check_status(response)
            .await?
            .json()
            .await
            .context("malformed guardian response")?;
        Ok(dto.into_contact())
    }

    async fn save_guardian_contact(&self, contact: &GuardianContact) -> Result<()> {
        let response = self
            .http
            .put(self.endpoint(guardian_route())?)
            .json(&SaveGuardianRequest::from(contact))
            .send()
            .await?;
        check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl PanicLedger for HttpBackend {
    async fn log_panic_activation(&self) -> Result<()> {
        let response = self.http.post(self.endpoint(panic_log_route())?).send().await?;
        check_status(response).await?;
        Ok(())
    }

    async fn get_panic_log(&self) -> Result<Vec<PanicLogEntry>> {
        let response = self.http.get(self.endpoint(panic_log_route())?).send().await?;
        let entries = check_status(response)
            .await?
            .json()
            .await
            .context("malformed panic log response")?;
        Ok(entries)
    }
}

#[derive(Clone)]
pub struct StorageBackend {
    storage: Storage,
}

impl StorageBackend {
    pub fn new(storage: Storage) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl GuardianDirectory for StorageBackend {
    async fn get_guardian_contact(&self) -> Result<Option<GuardianContact>> {
        self.storage.load_guardian_contact().await
    }

    async fn save_guardian_contact(&self, contact: &GuardianContact) -> Result<()> {
        self.storage.save_guardian_contact(contact).await
    }
}

#[async_trait]
impl PanicLedger for StorageBackend {
    async fn log_panic_activation(&self) -> Result<()> {
        self.storage.append_panic_log().await.map(|_| ())
    }

    async fn get_panic_log(&self) -> Result<Vec<PanicLogEntry>> {
        self.storage.list_panic_log().await
    }
}

#[cfg(test)]
#[path = "tests/backend_tests.rs"]
mod tests;
