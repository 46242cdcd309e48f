// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Probe for the "add a printer by IP address" flow.
//
// The caller supplies an address (and optionally a port and name); we check
// it answers, try to identify it, and hand back an entry ready to be saved in
// the manual cache. Saving is the caller's job.

use std::net::{IpAddr, Ipv4Addr};
use std::time::Duration;

use tracing::{info, warn};

use printscout_core::error::{Result, ScoutError};
use printscout_core::types::ManualEntry;

use crate::banner::{DeviceProbe, network_uri};
use crate::connectivity::{ConnectivityTester, DEFAULT_IPP_PORT};

/// Keywords that identify the vendor on a generic web interface.
const WEB_UI_KEYWORDS: &[&str] = &["canon", "pixma", "imageclass"];

/// Port of the embedded web interface when the IPP port itself serves none.
const WEB_UI_PORT: u16 = 80;

/// A probed printer ready to be written to the manual cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualAddition {
    pub uri: String,
    pub entry: ManualEntry,
}

/// Check and identify a printer the user entered by hand.
///
/// Fails if `ip` is not a dotted-quad IPv4 address or nothing answers on
/// `ip:port`. Identification never fails: an unrecognised device still gets
/// a generic name.
pub async fn probe_manual_printer(
    tester: &ConnectivityTester,
    device: &DeviceProbe,
    timeout: Duration,
    ip: &str,
    port: u16,
    name: Option<&str>,
) -> Result<ManualAddition> {
    let addr: Ipv4Addr = ip
        .trim()
        .parse()
        .map_err(|_| ScoutError::InvalidAddress(ip.to_string()))?;
    let ip = IpAddr::V4(addr);

    info!(%ip, port, "adding printer manually");
    if !tester.is_reachable(&ip.to_string(), port, timeout).await {
        warn!(%ip, port, "manually entered printer does not answer");
        return Err(ScoutError::Unreachable {
            host: ip.to_string(),
            port,
        });
    }

    let identified = device.identify(ip, port).await.filter(|id| !id.name.is_empty());
    let (found_name, model) = match identified {
        Some(id) => (id.name, id.model),
        None => identify_from_web_ui(device, ip, port, timeout).await,
    };

    let entry = ManualEntry {
        name: Some(name.map(str::to_string).unwrap_or(found_name)),
        model: Some(model),
        manually_added: true,
        ip: Some(ip.to_string()),
        port: Some(port),
    };
    let uri = network_uri(ip, port);
    info!(%uri, name = ?entry.name, model = ?entry.model, "manual printer probed");
    Ok(ManualAddition { uri, entry })
}

/// Second chance: look at the web interface (port 80 when the user gave the
/// IPP port) with a narrower vendor check.
async fn identify_from_web_ui(
    device: &DeviceProbe,
    ip: IpAddr,
    port: u16,
    timeout: Duration,
) -> (String, String) {
    let web_port = if port == DEFAULT_IPP_PORT { WEB_UI_PORT } else { port };
    let vendor = device.classifier().profile().vendor().to_string();

    match device.fetch_banner(ip, web_port, timeout).await {
        Some(body) => {
            let lower = body.to_lowercase();
            if WEB_UI_KEYWORDS.iter().any(|k| lower.contains(k)) {
                (
                    format!("{vendor} Printer at {ip}"),
                    format!("Unknown {vendor} Model"),
                )
            } else {
                (format!("Printer at {ip}"), "Unknown".into())
            }
        }
        None => {
            warn!(%ip, port = web_port, "could not verify printer type");
            (format!("Printer at {ip}"), "Unknown".into())
        }
    }
}
