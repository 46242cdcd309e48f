// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Bounded-concurrency subnet sweep.
//
// Every address of every range gets one task. The semaphore permit is taken
// before the task is spawned and held for its whole lifetime, so at most
// `max_workers` hosts are being probed (or waiting to be) at any instant. Within a host, ports are tried in configured order and the
// first port that is both reachable and serves a vendor banner wins.
//
// Results are buffered until the batch is drained, or until the overall
// deadline expires (which also stops further submission), and then ordered by
// submission index. The output never depends on which probe finished first.

use std::net::IpAddr;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinSet};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use printscout_core::types::{NetworkRange, PrinterRecord};

use crate::banner::DeviceProbe;
use crate::prober::PortProber;

/// Sweeps network ranges for vendor devices.
#[derive(Clone)]
pub struct SubnetSweep {
    prober: Arc<dyn PortProber>,
    device: DeviceProbe,
    max_workers: usize,
    port_timeout: Duration,
    deadline: Duration,
}

impl SubnetSweep {
    pub fn new(
        prober: Arc<dyn PortProber>,
        device: DeviceProbe,
        max_workers: usize,
        port_timeout: Duration,
        deadline: Duration,
    ) -> Self {
        Self {
            prober,
            device,
            max_workers: max_workers.max(1),
            port_timeout,
            deadline,
        }
    }

    /// Probe every address in `ranges` and return the vendor devices found,
    /// ordered by range, then address.
    ///
    /// A host task is only spawned once a worker permit is free, so the
    /// deadline also bounds submission and memory stays proportional to
    /// `max_workers` rather than to the size of the ranges.
    pub async fn run(&self, ranges: &[NetworkRange]) -> Vec<PrinterRecord> {
        if ranges.is_empty() {
            debug!("no ranges to sweep");
            return Vec::new();
        }

        let started = Instant::now();
        // An unrepresentable deadline means "no deadline".
        let deadline = started.checked_add(self.deadline);
        let permits = Arc::new(Semaphore::new(self.max_workers));
        let mut tasks = JoinSet::new();
        let mut found: Vec<(usize, PrinterRecord)> = Vec::new();
        let mut submitted = 0usize;
        let mut expired = false;

        info!(
            ranges = ranges.len(),
            hosts = ranges.iter().map(|r| r.cidr.len()).sum::<u64>(),
            max_workers = self.max_workers,
            "network sweep started"
        );

        'submit: for range in ranges {
            let ports: Arc<[u16]> = range.ports.clone().into();
            for addr in range.cidr.addresses() {
                let permit = match until(deadline, Arc::clone(&permits).acquire_owned()).await {
                    Some(Ok(permit)) => permit,
                    // The semaphore is never closed while the sweep is alive.
                    Some(Err(_)) => break 'submit,
                    None => {
                        expired = true;
                        break 'submit;
                    }
                };

                let index = submitted;
                submitted += 1;
                let prober = Arc::clone(&self.prober);
                let device = self.device.clone();
                let ports = Arc::clone(&ports);
                let timeout = self.port_timeout;

                tasks.spawn(async move {
                    let _permit = permit;
                    let found =
                        probe_host(prober.as_ref(), &device, IpAddr::V4(addr), &ports, timeout)
                            .await;
                    (index, found)
                });

                while let Some(joined) = tasks.try_join_next() {
                    collect(&mut found, joined);
                }
            }
        }

        while !expired {
            match until(deadline, tasks.join_next()).await {
                Some(Some(joined)) => collect(&mut found, joined),
                Some(None) => break,
                None => expired = true,
            }
        }

        if expired {
            while let Some(joined) = tasks.try_join_next() {
                collect(&mut found, joined);
            }
            warn!(
                deadline_s = self.deadline.as_secs_f64(),
                submitted,
                outstanding = tasks.len(),
                "sweep deadline reached; abandoning outstanding probes"
            );
            tasks.abort_all();
        }

        found.sort_by_key(|(index, _)| *index);
        info!(
            found = found.len(),
            elapsed_ms = started.elapsed().as_millis(),
            "network sweep finished"
        );
        found.into_iter().map(|(_, record)| record).collect()
    }
}

type HostOutcome = Result<(usize, Option<PrinterRecord>), JoinError>;

fn collect(found: &mut Vec<(usize, PrinterRecord)>, joined: HostOutcome) {
    match joined {
        Ok((index, Some(record))) => {
            info!(uri = %record.uri, name = %record.name, "printer found by sweep");
            found.push((index, record));
        }
        Ok((_, None)) => {}
        Err(e) => warn!(error = %e, "sweep task failed"),
    }
}

/// Await `fut`, giving up at `deadline` if there is one.
async fn until<F: Future>(deadline: Option<Instant>, fut: F) -> Option<F::Output> {
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, fut).await.ok(),
        None => Some(fut.await),
    }
}

/// Try each port in order; stop at the first reachable port whose banner
/// classifies as a vendor device.
async fn probe_host(
    prober: &dyn PortProber,
    device: &DeviceProbe,
    ip: IpAddr,
    ports: &[u16],
    timeout: Duration,
) -> Option<PrinterRecord> {
    for &port in ports {
        if !prober.probe(ip, port, timeout).await {
            continue;
        }
        debug!(%ip, port, "port open");
        if let Some(record) = device.candidate(ip, port).await {
            return Some(record);
        }
    }
    None
}
