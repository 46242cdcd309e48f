// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Single-endpoint TCP reachability.
//
// A plain connect with a deadline: no payload is exchanged, and every failure
// (refused, unreachable, DNS, timeout) collapses to `false`.

use std::time::Duration;

use tokio::net::TcpStream;
use tracing::debug;
use url::Url;

use printscout_core::error::{Result, ScoutError};

/// Port assumed when a printer URI does not name one.
pub const DEFAULT_IPP_PORT: u16 = 631;

/// Bounded TCP connect check, shared by the subnet sweep, manual-entry
/// revalidation, and the manual add flow.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectivityTester;

impl ConnectivityTester {
    pub fn new() -> Self {
        Self
    }

    /// Whether `host:port` accepts a TCP connection within `timeout`.
    /// `host` may be an address literal or a resolvable name.
    pub async fn is_reachable(&self, host: &str, port: u16, timeout: Duration) -> bool {
        let addr = (host, port);
        match tokio::time::timeout(timeout, TcpStream::connect(addr)).await {
            Ok(Ok(_stream)) => {
                debug!(host, port, "endpoint reachable");
                true
            }
            Ok(Err(e)) => {
                debug!(host, port, error = %e, "connect failed");
                false
            }
            Err(_) => {
                debug!(host, port, timeout_ms = timeout.as_millis(), "connect timed out");
                false
            }
        }
    }

    /// Reachability of the host and port named by a printer URI.
    pub async fn is_uri_reachable(&self, uri: &str, timeout: Duration) -> bool {
        match uri_endpoint(uri) {
            Ok((host, port)) => self.is_reachable(&host, port, timeout).await,
            Err(e) => {
                debug!(uri, error = %e, "cannot test unparsable URI");
                false
            }
        }
    }
}

/// Split a printer URI into host and port, defaulting the port to 631.
pub fn uri_endpoint(uri: &str) -> Result<(String, u16)> {
    let parsed = Url::parse(uri).map_err(|_| ScoutError::InvalidUri(uri.to_string()))?;
    let host = parsed
        .host_str()
        .filter(|h| !h.is_empty())
        .ok_or_else(|| ScoutError::InvalidUri(uri.to_string()))?;
    let host = host.trim_start_matches('[').trim_end_matches(']').to_string();
    Ok((host, parsed.port().unwrap_or(DEFAULT_IPP_PORT)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn endpoint_from_ipp_uri() {
        let (host, port) = uri_endpoint("ipp://10.0.0.9:631/ipp/print").unwrap();
        assert_eq!(host, "10.0.0.9");
        assert_eq!(port, 631);
    }

    #[test]
    fn endpoint_defaults_port() {
        let (host, port) = uri_endpoint("ipp://Canon-TS3400.local/ipp/print").unwrap();
        assert_eq!(host, "Canon-TS3400.local");
        assert_eq!(port, DEFAULT_IPP_PORT);
    }

    #[test]
    fn endpoint_rejects_garbage() {
        assert!(matches!(uri_endpoint("not a uri"), Err(ScoutError::InvalidUri(_))));
        assert!(uri_endpoint("cups:Canon_MG3600").is_err());
    }

    #[tokio::test]
    async fn listening_port_is_reachable() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let tester = ConnectivityTester::new();
        assert!(tester.is_reachable("127.0.0.1", port, Duration::from_secs(2)).await);
        let uri = format!("ipp://127.0.0.1:{port}/ipp/print");
        assert!(tester.is_uri_reachable(&uri, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn closed_port_is_unreachable() {
        // Bind then drop to get a port that is very likely closed.
        let port = {
            let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
            listener.local_addr().unwrap().port()
        };
        let tester = ConnectivityTester::new();
        assert!(!tester.is_reachable("127.0.0.1", port, Duration::from_secs(2)).await);
    }

    #[tokio::test]
    async fn bad_uri_is_unreachable() {
        let tester = ConnectivityTester::new();
        assert!(!tester.is_uri_reachable("::::", Duration::from_millis(100)).await);
    }
}
