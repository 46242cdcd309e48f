// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Discovery configuration.

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScoutError};
use crate::types::Ipv4Cidr;

/// Longest accepted timeout or deadline, in seconds (one day).
pub const MAX_TIMEOUT_S: f64 = 86_400.0;

/// Shortest accepted prefix for an explicit scan range. A /16 is already
/// 65 536 hosts.
pub const MIN_SCAN_PREFIX: u8 = 16;

/// Tunables for one discovery run.
///
/// Every field has a default, so a partial JSON document is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Ports tried against every scanned host, in order.
    pub ports: Vec<u16>,
    /// Maximum number of probes in flight at once.
    pub max_workers: usize,
    /// TCP connect deadline per probe, in seconds.
    pub port_timeout_s: f64,
    /// HTTP banner fetch deadline, in seconds.
    pub banner_timeout_s: f64,
    /// Reachability deadline used when revalidating manual entries.
    pub connectivity_timeout_s: f64,
    /// Overall deadline for the subnet sweep.
    pub sweep_deadline_s: f64,
    /// How long the multicast browse listens for announcements.
    pub mdns_browse_s: f64,
    /// Deadline for external OS tools (lpstat, lpoptions, route).
    pub command_timeout_s: f64,
    /// Explicit ranges to sweep. Empty means "detect from the default gateway".
    pub scan_ranges: Vec<String>,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            ports: vec![631, 9100, 8080, 80],
            max_workers: 50,
            port_timeout_s: 1.0,
            banner_timeout_s: 3.0,
            connectivity_timeout_s: 5.0,
            sweep_deadline_s: 120.0,
            mdns_browse_s: 5.0,
            command_timeout_s: 10.0,
            scan_ranges: Vec::new(),
        }
    }
}

impl DiscoveryConfig {
    /// Load and validate a JSON config file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would stall or break a sweep.
    pub fn validate(&self) -> Result<()> {
        if self.ports.is_empty() {
            return Err(ScoutError::Config("at least one port is required".into()));
        }
        if self.ports.contains(&0) {
            return Err(ScoutError::Config("port 0 cannot be probed".into()));
        }
        if self.max_workers == 0 {
            return Err(ScoutError::Config("max_workers must be at least 1".into()));
        }

        let timeouts = [
            ("port_timeout_s", self.port_timeout_s),
            ("banner_timeout_s", self.banner_timeout_s),
            ("connectivity_timeout_s", self.connectivity_timeout_s),
            ("sweep_deadline_s", self.sweep_deadline_s),
            ("mdns_browse_s", self.mdns_browse_s),
            ("command_timeout_s", self.command_timeout_s),
        ];
        for (name, value) in timeouts {
            if !value.is_finite() || value <= 0.0 {
                return Err(ScoutError::Config(format!(
                    "{name} must be a positive number of seconds, got {value}"
                )));
            }
            if value > MAX_TIMEOUT_S || Duration::try_from_secs_f64(value).is_err() {
                return Err(ScoutError::Config(format!(
                    "{name} must be at most {MAX_TIMEOUT_S} seconds, got {value}"
                )));
            }
        }

        for range in &self.scan_ranges {
            let cidr: Ipv4Cidr = range.parse()?;
            if cidr.prefix() < MIN_SCAN_PREFIX {
                return Err(ScoutError::Config(format!(
                    "scan range {range} is larger than /{MIN_SCAN_PREFIX}"
                )));
            }
        }
        Ok(())
    }

    pub fn port_timeout(&self) -> Duration {
        secs(self.port_timeout_s)
    }

    pub fn banner_timeout(&self) -> Duration {
        secs(self.banner_timeout_s)
    }

    pub fn connectivity_timeout(&self) -> Duration {
        secs(self.connectivity_timeout_s)
    }

    pub fn sweep_deadline(&self) -> Duration {
        secs(self.sweep_deadline_s)
    }

    pub fn mdns_browse(&self) -> Duration {
        secs(self.mdns_browse_s)
    }

    pub fn command_timeout(&self) -> Duration {
        secs(self.command_timeout_s)
    }
}

/// Convert seconds to a `Duration`. Only reached with validated values; anything
/// else clamps to zero.
fn secs(value: f64) -> Duration {
    Duration::try_from_secs_f64(value).unwrap_or(Duration::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_documented_values() {
        let config = DiscoveryConfig::default();
        assert_eq!(config.ports, vec![631, 9100, 8080, 80]);
        assert_eq!(config.max_workers, 50);
        assert_eq!(config.port_timeout(), Duration::from_secs(1));
        assert_eq!(config.banner_timeout(), Duration::from_secs(3));
        assert_eq!(config.connectivity_timeout(), Duration::from_secs(5));
        assert!(config.scan_ranges.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_fills_defaults() {
        let config: DiscoveryConfig =
            serde_json::from_str(r#"{"ports":[631],"max_workers":8}"#).unwrap();
        assert_eq!(config.ports, vec![631]);
        assert_eq!(config.max_workers, 8);
        assert_eq!(config.banner_timeout_s, 3.0);
    }

    #[test]
    fn zero_workers_rejected() {
        let config = DiscoveryConfig {
            max_workers: 0,
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScoutError::Config(_))));
    }

    #[test]
    fn empty_ports_rejected() {
        let config = DiscoveryConfig {
            ports: Vec::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn negative_timeout_rejected() {
        let config = DiscoveryConfig {
            sweep_deadline_s: -1.0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = DiscoveryConfig {
            port_timeout_s: f64::NAN,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn oversized_timeouts_rejected() {
        for huge in [1e19, 1e300, MAX_TIMEOUT_S + 1.0] {
            let config = DiscoveryConfig {
                sweep_deadline_s: huge,
                ..Default::default()
            };
            assert!(
                matches!(config.validate(), Err(ScoutError::Config(_))),
                "{huge} accepted"
            );
        }

        let config = DiscoveryConfig {
            sweep_deadline_s: MAX_TIMEOUT_S,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
        assert_eq!(config.sweep_deadline(), Duration::from_secs(86_400));
    }

    #[test]
    fn scan_ranges_wider_than_slash16_rejected() {
        let config = DiscoveryConfig {
            scan_ranges: vec!["10.0.0.0/12".into()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScoutError::Config(_))));

        let config = DiscoveryConfig {
            scan_ranges: vec!["10.0.0.0/16".into()],
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn bad_scan_range_rejected() {
        let config = DiscoveryConfig {
            scan_ranges: vec!["192.168.1.0/24".into(), "bogus".into()],
            ..Default::default()
        };
        assert!(matches!(config.validate(), Err(ScoutError::InvalidCidr(_))));
    }

    #[test]
    fn loads_from_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"scan_ranges":["10.1.2.0/24"],"port_timeout_s":0.25}}"#).unwrap();

        let config = DiscoveryConfig::from_json_file(file.path()).unwrap();
        assert_eq!(config.scan_ranges, vec!["10.1.2.0/24".to_string()]);
        assert_eq!(config.port_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn invalid_json_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(matches!(
            DiscoveryConfig::from_json_file(file.path()),
            Err(ScoutError::Serialization(_))
        ));
    }
}
