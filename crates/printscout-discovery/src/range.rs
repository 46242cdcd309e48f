// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Which address ranges to sweep.
//
// Explicitly configured ranges win. Otherwise the /24 around the default
// gateway is used, and when no gateway can be found a fixed set of common
// home/office subnets stands in. The resolver never fails and never returns
// an empty list.

use std::net::Ipv4Addr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use printscout_core::types::{Ipv4Cidr, NetworkRange};

use crate::command::{CommandRunner, SystemCommands};

/// Subnets swept when nothing better is known.
pub const FALLBACK_RANGES: &[&str] = &[
    "192.168.1.0/24",
    "192.168.0.0/24",
    "10.0.0.0/24",
    "172.16.0.0/24",
];

/// Where the default IPv4 gateway comes from.
#[async_trait]
pub trait GatewaySource: Send + Sync {
    async fn default_gateway(&self) -> Option<Ipv4Addr>;
}

/// Linux kernel routing table.
pub const PROC_NET_ROUTE: &str = "/proc/net/route";

/// Reads the gateway from the kernel routing table, then from
/// `route -n get default` (BSD/macOS).
#[derive(Clone)]
pub struct SystemGateway {
    command_timeout: Duration,
    route_table: PathBuf,
    runner: Arc<dyn CommandRunner>,
}

impl SystemGateway {
    pub fn new(command_timeout: Duration) -> Self {
        Self {
            command_timeout,
            route_table: PathBuf::from(PROC_NET_ROUTE),
            runner: Arc::new(SystemCommands),
        }
    }

    pub fn with_route_table(mut self, path: impl Into<PathBuf>) -> Self {
        self.route_table = path.into();
        self
    }

    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }
}

#[async_trait]
impl GatewaySource for SystemGateway {
    async fn default_gateway(&self) -> Option<Ipv4Addr> {
        if let Ok(table) = tokio::fs::read_to_string(&self.route_table).await {
            if let Some(gw) = parse_proc_net_route(&table) {
                debug!(gateway = %gw, "gateway from kernel routing table");
                return Some(gw);
            }
        }

        let output = self
            .runner
            .run("route", &["-n", "get", "default"], self.command_timeout)
            .await?;
        let gw = parse_route_get(&output);
        if let Some(gw) = gw {
            debug!(gateway = %gw, "gateway from route(8)");
        }
        gw
    }
}

/// Parse the Linux `/proc/net/route` table for the default route's gateway.
///
/// Addresses are hex in host byte order as the kernel stores them.
pub fn parse_proc_net_route(table: &str) -> Option<Ipv4Addr> {
    const RTF_GATEWAY: u32 = 0x2;

    table.lines().skip(1).find_map(|line| {
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 || fields[1] != "00000000" {
            return None;
        }
        let flags = u32::from_str_radix(fields[3], 16).ok()?;
        if flags & RTF_GATEWAY == 0 {
            return None;
        }
        let raw = u32::from_str_radix(fields[2], 16).ok()?;
        let gw = Ipv4Addr::from(raw.to_le_bytes());
        (!gw.is_unspecified()).then_some(gw)
    })
}

/// Parse `route -n get default` output (`gateway: 192.168.1.1`).
pub fn parse_route_get(output: &str) -> Option<Ipv4Addr> {
    output.lines().find_map(|line| {
        let (key, value) = line.split_once(':')?;
        if key.trim() != "gateway" {
            return None;
        }
        value.trim().parse().ok()
    })
}

/// Resolves the list of ranges the sweep will cover.
#[derive(Clone)]
pub struct NetworkRangeResolver {
    scan_ranges: Vec<String>,
    ports: Vec<u16>,
    gateway: Arc<dyn GatewaySource>,
}

impl NetworkRangeResolver {
    pub fn new(scan_ranges: Vec<String>, ports: Vec<u16>, gateway: Arc<dyn GatewaySource>) -> Self {
        Self {
            scan_ranges,
            ports,
            gateway,
        }
    }

    pub async fn resolve(&self) -> Vec<NetworkRange> {
        let configured = self.configured();
        if !configured.is_empty() {
            info!(ranges = configured.len(), "using configured scan ranges");
            return configured;
        }

        if let Some(gw) = self.gateway.default_gateway().await {
            let cidr = Ipv4Cidr::slash24(gw);
            info!(gateway = %gw, range = %cidr, "derived scan range from default gateway");
            return vec![NetworkRange::new(cidr, self.ports.clone())];
        }

        warn!("no default gateway found; sweeping common private subnets");
        self.fallback()
    }

    fn configured(&self) -> Vec<NetworkRange> {
        self.scan_ranges
            .iter()
            .filter_map(|r| match r.parse::<Ipv4Cidr>() {
                Ok(cidr) => Some(NetworkRange::new(cidr, self.ports.clone())),
                Err(e) => {
                    warn!(range = %r, error = %e, "ignoring configured scan range");
                    None
                }
            })
            .collect()
    }

    fn fallback(&self) -> Vec<NetworkRange> {
        FALLBACK_RANGES
            .iter()
            .filter_map(|r| r.parse::<Ipv4Cidr>().ok())
            .map(|cidr| NetworkRange::new(cidr, self.ports.clone()))
            .collect()
    }
}
