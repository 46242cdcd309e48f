// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Multicast DNS browse for IPP printers.
//
// We browse `_ipp._tcp.local.` with the `mdns-sd` crate for a fixed window,
// keep every resolved service whose instance name passes the vendor keyword
// filter, then shut the daemon down. The daemon's receiver is blocking, so
// the whole browse runs on a blocking thread.

use std::collections::BTreeMap;
use std::net::IpAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use mdns_sd::{ServiceDaemon, ServiceEvent, ServiceInfo};
use tracing::{debug, info, warn};

use printscout_core::types::{PrinterStatus, RawDeviceInfo};

use super::PrinterSource;
use crate::connectivity::DEFAULT_IPP_PORT;
use crate::heuristics::DeviceClassifier;

/// mDNS service type for plain IPP.
pub const IPP_SERVICE: &str = "_ipp._tcp.local.";

/// Browses the local link for vendor IPP printers.
#[derive(Debug, Clone)]
pub struct MdnsSource {
    classifier: Arc<DeviceClassifier>,
    browse_for: Duration,
}

impl MdnsSource {
    pub fn new(classifier: Arc<DeviceClassifier>, browse_for: Duration) -> Self {
        Self {
            classifier,
            browse_for,
        }
    }
}

#[async_trait]
impl PrinterSource for MdnsSource {
    async fn enumerate(&self) -> Vec<RawDeviceInfo> {
        let classifier = Arc::clone(&self.classifier);
        let browse_for = self.browse_for;
        match tokio::task::spawn_blocking(move || browse(&classifier, browse_for)).await {
            Ok(devices) => devices,
            Err(e) => {
                warn!(error = %e, "mDNS browse thread failed");
                Vec::new()
            }
        }
    }
}

/// Run one browse window and return the matching printers ordered by their
/// mDNS full name.
fn browse(classifier: &DeviceClassifier, browse_for: Duration) -> Vec<RawDeviceInfo> {
    let daemon = match ServiceDaemon::new() {
        Ok(d) => d,
        Err(e) => {
            warn!(error = %e, "failed to start mDNS daemon");
            return Vec::new();
        }
    };

    let receiver = match daemon.browse(IPP_SERVICE) {
        Ok(r) => r,
        Err(e) => {
            warn!(service_type = IPP_SERVICE, error = %e, "mDNS browse failed");
            let _ = daemon.shutdown();
            return Vec::new();
        }
    };

    let deadline = Instant::now() + browse_for;
    let mut found: BTreeMap<String, RawDeviceInfo> = BTreeMap::new();

    while let Ok(event) = receiver.recv_deadline(deadline) {
        match event {
            ServiceEvent::ServiceResolved(info) => {
                let fullname = info.get_fullname().to_owned();
                match service_to_device(&info, classifier) {
                    Some(device) => {
                        debug!(name = %device.name, uri = %device.uri, "vendor printer resolved");
                        found.insert(fullname, device);
                    }
                    None => debug!(name = %fullname, "resolved service is not a vendor printer"),
                }
            }
            ServiceEvent::ServiceRemoved(_, fullname) => {
                found.remove(&fullname);
            }
            ServiceEvent::SearchStopped(_) => break,
            other => debug!(event = ?other, "mDNS event"),
        }
    }

    if let Err(e) = daemon.stop_browse(IPP_SERVICE) {
        debug!(error = %e, "stop browse");
    }
    if let Err(e) = daemon.shutdown() {
        debug!(error = %e, "mDNS daemon shutdown");
    }

    info!(printers = found.len(), "mDNS browse finished");
    found.into_values().collect()
}

fn service_to_device(info: &ServiceInfo, classifier: &DeviceClassifier) -> Option<RawDeviceInfo> {
    let hostname = info.get_hostname().trim_end_matches('.');
    // Prefer the advertised name; fall back to an address (IPv4 first).
    let host = if hostname.is_empty() {
        let addrs = info.get_addresses();
        let ip: &IpAddr = addrs
            .iter()
            .find(|a| a.is_ipv4())
            .or_else(|| addrs.iter().next())?;
        match ip {
            IpAddr::V4(v4) => v4.to_string(),
            IpAddr::V6(v6) => format!("[{v6}]"),
        }
    } else {
        hostname.to_string()
    };

    resolved_to_device(
        info.get_fullname(),
        info.get_type(),
        &host,
        info.get_port(),
        info.get_property_val_str("rp"),
        info.get_property_val_str("printer-make-and-model"),
        classifier,
    )
}

/// Convert the parts of a resolved service into a device description, or
/// `None` if the instance name does not look like a vendor printer.
///
/// The model comes from the `printer-make-and-model` TXT record when it is
/// present and recognisable, else from the instance name.
pub fn resolved_to_device(
    fullname: &str,
    service_type: &str,
    host: &str,
    port: u16,
    resource_path: Option<&str>,
    make_and_model: Option<&str>,
    classifier: &DeviceClassifier,
) -> Option<RawDeviceInfo> {
    let instance = fullname
        .strip_suffix(service_type)
        .unwrap_or(fullname)
        .trim_end_matches('.');
    if instance.is_empty() || !classifier.matches(instance) {
        return None;
    }

    let port = if port == 0 { DEFAULT_IPP_PORT } else { port };
    let path = resource_path
        .map(|p| p.trim_start_matches('/'))
        .filter(|p| !p.is_empty())
        .unwrap_or("ipp/print");

    Some(RawDeviceInfo {
        name: instance.to_string(),
        uri: format!("ipp://{host}:{port}/{path}"),
        status: PrinterStatus::Available,
        model: advertised_model(make_and_model, classifier)
            .unwrap_or_else(|| classifier.extract_model(instance)),
    })
}

fn advertised_model(make_and_model: Option<&str>, classifier: &DeviceClassifier) -> Option<String> {
    let advertised = make_and_model.map(str::trim).filter(|m| classifier.matches(m))?;
    let model = classifier.extract_model(advertised);
    // A generic fallback says less than the instance name might.
    (model != classifier.extract_model("")).then_some(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> DeviceClassifier {
        DeviceClassifier::default()
    }

    #[test]
    fn canon_service_becomes_device() {
        let device = resolved_to_device(
            "Canon MG3600 series._ipp._tcp.local.",
            IPP_SERVICE,
            "Canon-MG3600.local",
            631,
            Some("ipp/print"),
            None,
            &classifier(),
        )
        .unwrap();
        assert_eq!(device.name, "Canon MG3600 series");
        assert_eq!(device.uri, "ipp://Canon-MG3600.local:631/ipp/print");
        assert_eq!(device.model, "Canon MG3600");
        assert_eq!(device.status, PrinterStatus::Available);
    }

    #[test]
    fn missing_rp_defaults_to_ipp_print() {
        let device = resolved_to_device(
            "PIXMA TS5050._ipp._tcp.local.",
            IPP_SERVICE,
            "pixma.local",
            0,
            None,
            None,
            &classifier(),
        )
        .unwrap();
        assert_eq!(device.uri, "ipp://pixma.local:631/ipp/print");
        assert_eq!(device.model, "Canon TS5050");
    }

    #[test]
    fn foreign_service_is_filtered_out() {
        assert!(resolved_to_device(
            "Brother HL-L2350DW._ipp._tcp.local.",
            IPP_SERVICE,
            "brother.local",
            631,
            None,
            None,
            &classifier(),
        )
        .is_none());
    }

    #[test]
    fn custom_resource_path_is_kept() {
        let device = resolved_to_device(
            "Canon iR-ADV._ipp._tcp.local.",
            IPP_SERVICE,
            "10.0.0.20",
            8631,
            Some("/printers/main"),
            None,
            &classifier(),
        )
        .unwrap();
        assert_eq!(device.uri, "ipp://10.0.0.20:8631/printers/main");
    }

    #[test]
    fn make_and_model_record_is_preferred() {
        let device = resolved_to_device(
            "Study Printer (Canon)._ipp._tcp.local.",
            IPP_SERVICE,
            "study.local",
            631,
            None,
            Some("Canon MG3600 series"),
            &classifier(),
        )
        .unwrap();
        assert_eq!(device.name, "Study Printer (Canon)");
        assert_eq!(device.model, "Canon MG3600");
    }

    #[test]
    fn unhelpful_make_and_model_falls_back_to_instance_name() {
        for txt in ["Generic IPP Everywhere", "Canon Printer", "   "] {
            let device = resolved_to_device(
                "Canon MX490 series._ipp._tcp.local.",
                IPP_SERVICE,
                "mx490.local",
                631,
                None,
                Some(txt),
                &classifier(),
            )
            .unwrap();
            assert_eq!(device.model, "Canon MX490", "TXT value {txt:?}");
        }
    }
}
