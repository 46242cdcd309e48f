// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Port reachability seam used by the subnet sweep.

use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;

use crate::connectivity::ConnectivityTester;

/// Tests whether one `(ip, port)` accepts TCP connections.
///
/// Implementations must never fail: any error is `false`.
#[async_trait]
pub trait PortProber: Send + Sync {
    async fn probe(&self, ip: IpAddr, port: u16, timeout: Duration) -> bool;
}

/// Real prober: a bounded TCP connect.
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpPortProber {
    tester: ConnectivityTester,
}

impl TcpPortProber {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PortProber for TcpPortProber {
    async fn probe(&self, ip: IpAddr, port: u16, timeout: Duration) -> bool {
        self.tester.is_reachable(&ip.to_string(), port, timeout).await
    }
}
