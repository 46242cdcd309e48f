// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the Printscout discovery engine.

use std::collections::BTreeSet;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ScoutError;

/// Reachability of a discovered printer at the time of discovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrinterStatus {
    Available,
    Offline,
    Unknown,
    Error,
}

impl std::fmt::Display for PrinterStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Available => "Available",
            Self::Offline => "Offline",
            Self::Unknown => "Unknown",
            Self::Error => "Error",
        };
        f.write_str(s)
    }
}

/// Where a record came from.
///
/// Declaration order is deduplication priority: when two sources report the
/// same URI, the earlier variant wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordSource {
    /// Saved by the user through the "add printer manually" flow.
    Manual,
    /// Reported by the operating system's printer list.
    System,
    /// Found by sweeping the local subnet.
    NetworkScan,
    /// Advertised over multicast DNS.
    Mdns,
}

impl std::fmt::Display for RecordSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Manual => "manual",
            Self::System => "system",
            Self::NetworkScan => "network_scan",
            Self::Mdns => "mdns",
        };
        f.write_str(s)
    }
}

/// Print quality levels, in ascending order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrintQuality {
    Draft,
    Normal,
    High,
}

/// Coarse capability descriptor attached to every discovery result.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Capabilities {
    pub duplex: bool,
    pub color: bool,
    pub max_copies: u32,
    pub supported_media: BTreeSet<String>,
    /// Ordered from lowest to highest quality.
    pub supported_quality: Vec<PrintQuality>,
}

/// The canonical discovery result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrinterRecord {
    /// Identity key, `scheme://host[:port]/path`.
    pub uri: String,
    pub name: String,
    pub status: PrinterStatus,
    pub model: String,
    pub source: RecordSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ip: Option<IpAddr>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    pub capabilities: Capabilities,
}

impl PrinterRecord {
    /// Build a record with empty capabilities; the engine fills them in last.
    pub fn new(
        uri: impl Into<String>,
        name: impl Into<String>,
        status: PrinterStatus,
        model: impl Into<String>,
        source: RecordSource,
    ) -> Self {
        Self {
            uri: uri.into(),
            name: name.into(),
            status,
            model: model.into(),
            source,
            ip: None,
            port: None,
            capabilities: Capabilities::default(),
        }
    }

    /// Attach the network endpoint the record was found at.
    pub fn with_endpoint(mut self, ip: IpAddr, port: u16) -> Self {
        self.ip = Some(ip);
        self.port = Some(port);
        self
    }
}

/// Device description as handed over by an external enumeration source
/// (OS printer list, multicast browse).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDeviceInfo {
    pub name: String,
    pub uri: String,
    pub status: PrinterStatus,
    pub model: String,
}

/// A manually configured printer as stored by the outer application.
///
/// Unknown fields in the stored document (capabilities, last_seen, …) are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualEntry {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub manually_added: bool,
    #[serde(default)]
    pub ip: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
}

/// An IPv4 CIDR block, normalised to its network address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv4Cidr {
    network: Ipv4Addr,
    prefix: u8,
}

impl Ipv4Cidr {
    /// Create a block from any address inside it; host bits are cleared.
    pub fn new(addr: Ipv4Addr, prefix: u8) -> crate::error::Result<Self> {
        if prefix > 32 {
            return Err(ScoutError::InvalidCidr(format!("{addr}/{prefix}")));
        }
        let network = u32::from(addr) & Self::mask(prefix);
        Ok(Self {
            network: Ipv4Addr::from(network),
            prefix,
        })
    }

    /// The /24 containing `addr`.
    pub fn slash24(addr: Ipv4Addr) -> Self {
        Self {
            network: Ipv4Addr::from(u32::from(addr) & Self::mask(24)),
            prefix: 24,
        }
    }

    pub fn network(&self) -> Ipv4Addr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Number of addresses in the block, network and broadcast included.
    pub fn len(&self) -> u64 {
        1u64 << (32 - u32::from(self.prefix))
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn contains(&self, addr: Ipv4Addr) -> bool {
        u32::from(addr) & Self::mask(self.prefix) == u32::from(self.network)
    }

    /// Every address in the block in ascending order, including the network
    /// and broadcast addresses.
    pub fn addresses(&self) -> impl Iterator<Item = Ipv4Addr> + use<> {
        let start = u32::from(self.network);
        let end = start | !Self::mask(self.prefix);
        (start..=end).map(Ipv4Addr::from)
    }

    fn mask(prefix: u8) -> u32 {
        if prefix == 0 {
            0
        } else {
            u32::MAX << (32 - u32::from(prefix))
        }
    }
}

impl FromStr for Ipv4Cidr {
    type Err = ScoutError;

    fn from_str(s: &str) -> crate::error::Result<Self> {
        let invalid = || ScoutError::InvalidCidr(s.to_string());
        let (addr, prefix) = s.trim().split_once('/').ok_or_else(invalid)?;
        let addr: Ipv4Addr = addr.parse().map_err(|_| invalid())?;
        let prefix: u8 = prefix.parse().map_err(|_| invalid())?;
        Self::new(addr, prefix).map_err(|_| invalid())
    }
}

impl std::fmt::Display for Ipv4Cidr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

/// A CIDR block plus the ports probed against every address in it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRange {
    pub cidr: Ipv4Cidr,
    /// Tried in order; the first reachable and matching port wins.
    pub ports: Vec<u16>,
}

impl NetworkRange {
    pub fn new(cidr: Ipv4Cidr, ports: Vec<u16>) -> Self {
        Self { cidr, ports }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cidr_parses_and_normalises_host_bits() {
        let cidr: Ipv4Cidr = "192.168.1.77/24".parse().unwrap();
        assert_eq!(cidr.network(), Ipv4Addr::new(192, 168, 1, 0));
        assert_eq!(cidr.prefix(), 24);
        assert_eq!(cidr.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn cidr_rejects_garbage() {
        assert!("192.168.1.0".parse::<Ipv4Cidr>().is_err());
        assert!("192.168.1.0/33".parse::<Ipv4Cidr>().is_err());
        assert!("not-an-ip/24".parse::<Ipv4Cidr>().is_err());
        assert!("10.0.0.0/x".parse::<Ipv4Cidr>().is_err());
    }

    #[test]
    fn slash24_iterates_all_256_addresses() {
        let cidr = Ipv4Cidr::slash24(Ipv4Addr::new(10, 0, 0, 1));
        let addrs: Vec<_> = cidr.addresses().collect();
        assert_eq!(addrs.len(), 256);
        assert_eq!(cidr.len(), 256);
        assert_eq!(addrs[0], Ipv4Addr::new(10, 0, 0, 0));
        assert_eq!(addrs[255], Ipv4Addr::new(10, 0, 0, 255));
    }

    #[test]
    fn single_host_block() {
        let cidr: Ipv4Cidr = "172.16.4.9/32".parse().unwrap();
        let addrs: Vec<_> = cidr.addresses().collect();
        assert_eq!(addrs, vec![Ipv4Addr::new(172, 16, 4, 9)]);
        assert!(cidr.contains(Ipv4Addr::new(172, 16, 4, 9)));
        assert!(!cidr.contains(Ipv4Addr::new(172, 16, 4, 10)));
    }

    #[test]
    fn source_order_is_priority_order() {
        assert!(RecordSource::Manual < RecordSource::System);
        assert!(RecordSource::System < RecordSource::NetworkScan);
        assert!(RecordSource::NetworkScan < RecordSource::Mdns);
    }

    #[test]
    fn record_serializes_snake_case_enums() {
        let record = PrinterRecord::new(
            "ipp://10.0.0.9:631/ipp/print",
            "Office",
            PrinterStatus::Available,
            "Canon MX920",
            RecordSource::NetworkScan,
        );
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"source\":\"network_scan\""));
        assert!(json.contains("\"status\":\"available\""));
        assert!(!json.contains("\"ip\""));
    }

    #[test]
    fn manual_entry_ignores_unknown_fields() {
        let json = r#"{"name":"Den","manually_added":true,"port":631,"last_seen":"2026-01-01"}"#;
        let entry: ManualEntry = serde_json::from_str(json).unwrap();
        assert!(entry.manually_added);
        assert_eq!(entry.name.as_deref(), Some("Den"));
        assert_eq!(entry.model, None);
    }
}
