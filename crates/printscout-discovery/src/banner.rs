// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Device probe: fetch the embedded web page of a reachable endpoint and
// classify it.
//
// Printers serve a status page on their HTTP ports; its body and `<title>`
// are usually enough to tell the vendor and model apart without speaking IPP.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use printscout_core::error::{Result, ScoutError};
use printscout_core::types::{PrinterRecord, PrinterStatus, RecordSource};

use crate::heuristics::{DeviceClassifier, Identification};

/// Fetches the root page of `http://<ip>:<port>/`.
///
/// Returns `None` on any failure (timeout, refused, non-200, unreadable body).
#[async_trait]
pub trait BannerFetcher: Send + Sync {
    async fn fetch(&self, ip: IpAddr, port: u16, timeout: Duration) -> Option<String>;
}

/// `reqwest`-backed banner fetcher.
#[derive(Debug, Clone)]
pub struct HttpBannerFetcher {
    client: reqwest::Client,
}

impl HttpBannerFetcher {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("printscout/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ScoutError::Http(format!("failed to build HTTP client: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl BannerFetcher for HttpBannerFetcher {
    async fn fetch(&self, ip: IpAddr, port: u16, timeout: Duration) -> Option<String> {
        let url = format!("http://{}/", std::net::SocketAddr::new(ip, port));
        let response = match self.client.get(&url).timeout(timeout).send().await {
            Ok(r) => r,
            Err(e) => {
                debug!(%url, error = %e, "banner request failed");
                return None;
            }
        };

        if response.status() != reqwest::StatusCode::OK {
            debug!(%url, status = %response.status(), "banner request not OK");
            return None;
        }

        match response.text().await {
            Ok(body) => Some(body),
            Err(e) => {
                debug!(%url, error = %e, "banner body unreadable");
                None
            }
        }
    }
}

/// Builds the identity URI for a device found by the subnet sweep.
pub fn network_uri(ip: IpAddr, port: u16) -> String {
    format!("ipp://{}/ipp/print", std::net::SocketAddr::new(ip, port))
}

/// Banner fetch plus vendor classification for one endpoint.
#[derive(Clone)]
pub struct DeviceProbe {
    fetcher: Arc<dyn BannerFetcher>,
    classifier: Arc<DeviceClassifier>,
    timeout: Duration,
}

impl DeviceProbe {
    pub fn new(
        fetcher: Arc<dyn BannerFetcher>,
        classifier: Arc<DeviceClassifier>,
        timeout: Duration,
    ) -> Self {
        Self {
            fetcher,
            classifier,
            timeout,
        }
    }

    pub fn classifier(&self) -> &DeviceClassifier {
        &self.classifier
    }

    /// Fetch and classify the banner. `None` if the fetch failed or the body
    /// carries no vendor keyword.
    pub async fn identify(&self, ip: IpAddr, port: u16) -> Option<Identification> {
        self.identify_with_timeout(ip, port, self.timeout).await
    }

    /// As [`identify`](Self::identify) but with an explicit deadline.
    pub async fn identify_with_timeout(
        &self,
        ip: IpAddr,
        port: u16,
        timeout: Duration,
    ) -> Option<Identification> {
        let body = self.fetcher.fetch(ip, port, timeout).await?;
        self.classifier.identify(ip, &body)
    }

    /// Raw banner body, for callers that apply their own heuristic.
    pub async fn fetch_banner(&self, ip: IpAddr, port: u16, timeout: Duration) -> Option<String> {
        self.fetcher.fetch(ip, port, timeout).await
    }

    /// Turn a reachable endpoint into a network-scan candidate.
    ///
    /// The display name must itself look like a vendor device; a page that
    /// merely mentions a keyword somewhere but is titled otherwise is dropped.
    pub async fn candidate(&self, ip: IpAddr, port: u16) -> Option<PrinterRecord> {
        let id = self.identify(ip, port).await?;
        if !self.classifier.matches(&id.name) {
            debug!(%ip, port, name = %id.name, "title does not look like a vendor device");
            return None;
        }
        Some(
            PrinterRecord::new(
                network_uri(ip, port),
                id.name,
                PrinterStatus::Available,
                id.model,
                RecordSource::NetworkScan,
            )
            .with_endpoint(ip, port),
        )
    }
}
