//! Client for the local AnDistro package daemon

pub mod types;

pub use types::{
    normalize_package_name, CommandResponse, IconResponse, InstalledNamesResponse,
    InstalledResponse, OpenResponse, PackageRecord, PackageRequest, PingResponse,
    SearchResponse, UpdatesResponse,
};

use crate::error::{DaemonError, DaemonResult};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;

pub const DEFAULT_DAEMON_URL: &str = "http://127.0.0.1:27777";

/// Operations the daemon exposes. Page controllers only talk to this trait.
#[async_trait]
pub trait Daemon: Send + Sync {
    async fn ping(&self) -> DaemonResult<PingResponse>;

    async fn search(&self, query: &str, lang: Option<&str>) -> DaemonResult<Vec<PackageRecord>>;

    async fn installed(&self) -> DaemonResult<InstalledResponse>;

    async fn installed_names(&self) -> DaemonResult<Vec<String>>;

    async fn updates(&self) -> DaemonResult<Vec<PackageRecord>>;

    async fn install(&self, pkg: &str) -> DaemonResult<CommandResponse>;

    async fn remove(&self, pkg: &str) -> DaemonResult<CommandResponse>;

    async fn open(&self, pkg: &str) -> DaemonResult<OpenResponse>;

    /// Filesystem path of the package icon, if the daemon found one
    async fn icon(&self, pkg: &str) -> DaemonResult<Option<String>>;
}

pub struct DaemonClient {
    client: Client,
    base_url: String,
}

impl DaemonClient {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &'static str,
        query: &[(&str, &str)],
    ) -> DaemonResult<T> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(query)
            .send()
            .await
            .map_err(|source| DaemonError::Unreachable { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DaemonError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }

        response.json::<T>().await.map_err(|e| DaemonError::Decode {
            endpoint,
            message: e.to_string(),
        })
    }

    async fn post_pkg(
        &self,
        endpoint: &'static str,
        pkg: &str,
    ) -> DaemonResult<(StatusCode, Vec<u8>)> {
        let response = self
            .client
            .post(self.url(endpoint))
            .json(&PackageRequest { pkg })
            .send()
            .await
            .map_err(|source| DaemonError::Unreachable { endpoint, source })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|source| DaemonError::Unreachable { endpoint, source })?;
        Ok((status, body.to_vec()))
    }
}

/// Maps an `/install` or `/remove` answer onto success or failure.
/// Success needs a 2xx status and an application code of exactly 0.
pub fn interpret_command(
    endpoint: &'static str,
    status: StatusCode,
    body: &[u8],
) -> DaemonResult<CommandResponse> {
    // an unparsable body counts as an empty object
    let parsed: CommandResponse = serde_json::from_slice(body).unwrap_or_else(|e| {
        log::debug!("{} body is not JSON: {}", endpoint, e);
        CommandResponse::default()
    });

    if !status.is_success() {
        if !parsed.stderr.trim().is_empty() {
            log::error!("{} stderr: {}", endpoint, parsed.stderr.trim());
        }
        return Err(DaemonError::Status {
            endpoint,
            status: status.as_u16(),
        });
    }

    match parsed.code {
        Some(0) => Ok(parsed),
        other => Err(DaemonError::Rejected {
            endpoint,
            code: other.unwrap_or(-1),
        }),
    }
}

/// Maps an `/open` answer; success needs a 2xx status and `ok: true`.
pub fn interpret_open(pkg: &str, status: StatusCode, body: &[u8]) -> DaemonResult<OpenResponse> {
    let parsed: OpenResponse = serde_json::from_slice(body).unwrap_or_default();

    if !status.is_success() {
        return Err(DaemonError::Status {
            endpoint: "/open",
            status: status.as_u16(),
        });
    }
    if !parsed.ok {
        if let Some(err) = &parsed.error {
            log::error!("/open {} failed: {}", pkg, err);
        }
        return Err(DaemonError::OpenFailed {
            pkg: pkg.to_string(),
        });
    }
    Ok(parsed)
}

#[async_trait]
impl Daemon for DaemonClient {
    async fn ping(&self) -> DaemonResult<PingResponse> {
        let endpoint = "/ping";
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(|source| DaemonError::Unreachable { endpoint, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DaemonError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        // any 2xx means the environment is present, the body is informative only
        Ok(response.json::<PingResponse>().await.unwrap_or_default())
    }

    async fn search(&self, query: &str, lang: Option<&str>) -> DaemonResult<Vec<PackageRecord>> {
        let mut params = vec![("q", query)];
        if let Some(lang) = lang {
            params.push(("lang", lang));
        }
        let response: SearchResponse = self.get_json("/search", &params).await?;
        Ok(response.results)
    }

    async fn installed(&self) -> DaemonResult<InstalledResponse> {
        self.get_json("/installed", &[]).await
    }

    async fn installed_names(&self) -> DaemonResult<Vec<String>> {
        let response: InstalledNamesResponse = self.get_json("/installed-names", &[]).await?;
        Ok(response.packages)
    }

    async fn updates(&self) -> DaemonResult<Vec<PackageRecord>> {
        let response: UpdatesResponse = self.get_json("/updates", &[]).await?;
        Ok(response.updates)
    }

    async fn install(&self, pkg: &str) -> DaemonResult<CommandResponse> {
        let (status, body) = self.post_pkg("/install", pkg).await?;
        interpret_command("/install", status, &body)
    }

    async fn remove(&self, pkg: &str) -> DaemonResult<CommandResponse> {
        let (status, body) = self.post_pkg("/remove", pkg).await?;
        interpret_command("/remove", status, &body)
    }

    async fn open(&self, pkg: &str) -> DaemonResult<OpenResponse> {
        let (status, body) = self.post_pkg("/open", pkg).await?;
        interpret_open(pkg, status, &body)
    }

    async fn icon(&self, pkg: &str) -> DaemonResult<Option<String>> {
        let endpoint = "/icon";
        let response = self
            .client
            .get(self.url(endpoint))
            .query(&[("pkg", pkg)])
            .send()
            .await
            .map_err(|source| DaemonError::Unreachable { endpoint, source })?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(DaemonError::Status {
                endpoint,
                status: status.as_u16(),
            });
        }
        let parsed: IconResponse = response.json().await.unwrap_or_default();
        Ok(if parsed.found { parsed.path } else { None })
    }
}
