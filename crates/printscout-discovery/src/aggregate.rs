// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Gathers candidate records from every producer in priority order:
//
//   1. manual cache (revalidated, never dropped)
//   2. OS printer list
//   3. subnet sweep (fully drained before it is appended)
//   4. multicast DNS
//
// Outputs are concatenated without interleaving, so position in the
// aggregate encodes priority for the deduplicator.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{info, warn};

use printscout_core::types::{
    ManualEntry, PrinterRecord, PrinterStatus, RawDeviceInfo, RecordSource,
};

use crate::connectivity::{ConnectivityTester, DEFAULT_IPP_PORT};
use crate::range::NetworkRangeResolver;
use crate::sources::{ManualPrinterCache, PrinterSource};
use crate::sweep::SubnetSweep;

/// The four producers plus what manual revalidation needs.
#[derive(Clone)]
pub struct SourceAggregator {
    pub(crate) manual: Option<Arc<dyn ManualPrinterCache>>,
    pub(crate) system: Arc<dyn PrinterSource>,
    pub(crate) resolver: NetworkRangeResolver,
    pub(crate) sweep: SubnetSweep,
    pub(crate) mdns: Arc<dyn PrinterSource>,
    pub(crate) tester: ConnectivityTester,
    pub(crate) connectivity_timeout: Duration,
}

impl SourceAggregator {
    /// Run every producer in priority order and concatenate their output.
    pub async fn aggregate(&self) -> Vec<PrinterRecord> {
        let manual = self.manual_records().await;
        let system = tag(self.system.enumerate().await, RecordSource::System);
        let network = self.network_records().await;
        let mdns = tag(self.mdns.enumerate().await, RecordSource::Mdns);

        info!(
            manual = manual.len(),
            system = system.len(),
            network = network.len(),
            mdns = mdns.len(),
            "sources gathered"
        );

        let mut all = Vec::with_capacity(manual.len() + system.len() + network.len() + mdns.len());
        all.extend(manual);
        all.extend(system);
        all.extend(network);
        all.extend(mdns);
        all
    }

    /// Resolve ranges and sweep them. Returns only after every probe has
    /// finished or the sweep deadline has passed.
    pub async fn network_records(&self) -> Vec<PrinterRecord> {
        let ranges = self.resolver.resolve().await;
        self.sweep.run(&ranges).await
    }

    /// Manually added entries, each revalidated for reachability.
    ///
    /// Checks run concurrently; output keeps the cache's order.
    pub async fn manual_records(&self) -> Vec<PrinterRecord> {
        let Some(cache) = &self.manual else {
            return Vec::new();
        };

        let mut checks = JoinSet::new();
        for (index, (uri, entry)) in cache
            .entries()
            .into_iter()
            .filter(|(_, entry)| entry.manually_added)
            .enumerate()
        {
            let tester = self.tester;
            let timeout = self.connectivity_timeout;
            checks.spawn(async move {
                let online = tester.is_uri_reachable(&uri, timeout).await;
                (index, manual_record(uri, entry, online))
            });
        }

        let mut records = Vec::with_capacity(checks.len());
        while let Some(joined) = checks.join_next().await {
            match joined {
                Ok(pair) => records.push(pair),
                Err(e) => warn!(error = %e, "manual revalidation task failed"),
            }
        }
        records.sort_by_key(|(index, _)| *index);
        records.into_iter().map(|(_, record)| record).collect()
    }
}

/// Build the record for a saved entry given its reachability.
pub fn manual_record(uri: String, entry: ManualEntry, online: bool) -> PrinterRecord {
    let status = if online {
        PrinterStatus::Available
    } else {
        PrinterStatus::Offline
    };
    let mut record = PrinterRecord::new(
        uri,
        entry.name.unwrap_or_else(|| "Unknown Printer".into()),
        status,
        entry.model.unwrap_or_else(|| "Unknown".into()),
        RecordSource::Manual,
    );
    record.ip = entry.ip.as_deref().and_then(|ip| ip.parse::<IpAddr>().ok());
    record.port = Some(entry.port.unwrap_or(DEFAULT_IPP_PORT));
    record
}

fn tag(devices: Vec<RawDeviceInfo>, source: RecordSource) -> Vec<PrinterRecord> {
    devices
        .into_iter()
        .map(|d| PrinterRecord::new(d.uri, d.name, d.status, d.model, source))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_record_defaults() {
        let entry = ManualEntry {
            name: None,
            model: None,
            manually_added: true,
            ip: None,
            port: None,
        };
        let r = manual_record("ipp://10.0.0.9:631/ipp/print".into(), entry, false);
        assert_eq!(r.name, "Unknown Printer");
        assert_eq!(r.model, "Unknown");
        assert_eq!(r.status, PrinterStatus::Offline);
        assert_eq!(r.source, RecordSource::Manual);
        assert_eq!(r.ip, None);
        assert_eq!(r.port, Some(631));
    }

    #[test]
    fn manual_record_keeps_saved_fields() {
        let entry = ManualEntry {
            name: Some("Study".into()),
            model: Some("Canon MG3600".into()),
            manually_added: true,
            ip: Some("10.0.0.9".into()),
            port: Some(8631),
        };
        let r = manual_record("ipp://10.0.0.9:8631/ipp/print".into(), entry, true);
        assert_eq!(r.name, "Study");
        assert_eq!(r.status, PrinterStatus::Available);
        assert_eq!(r.ip, Some("10.0.0.9".parse().unwrap()));
        assert_eq!(r.port, Some(8631));
    }

    #[test]
    fn tagging_preserves_order() {
        let devices = vec![
            RawDeviceInfo {
                name: "b".into(),
                uri: "cups://b".into(),
                status: PrinterStatus::Available,
                model: "Canon Printer".into(),
            },
            RawDeviceInfo {
                name: "a".into(),
                uri: "cups://a".into(),
                status: PrinterStatus::Offline,
                model: "Canon Printer".into(),
            },
        ];
        let records = tag(devices, RecordSource::System);
        assert_eq!(records[0].name, "b");
        assert_eq!(records[1].status, PrinterStatus::Offline);
        assert!(records.iter().all(|r| r.source == RecordSource::System));
    }
}
