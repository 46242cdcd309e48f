// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// The discovery engine: aggregate every source, deduplicate by URI, attach
// capabilities.
//
// Each call to `discover` is independent; nothing is remembered between runs.
// Collaborators default to the real network/OS implementations and can be
// swapped with the `with_*` methods.

use std::sync::Arc;

use tracing::{info, instrument};

use printscout_core::config::DiscoveryConfig;
use printscout_core::error::Result;
use printscout_core::types::PrinterRecord;

use crate::aggregate::SourceAggregator;
use crate::banner::{BannerFetcher, DeviceProbe, HttpBannerFetcher};
use crate::capabilities::CapabilityEstimator;
use crate::connectivity::ConnectivityTester;
use crate::dedup::dedup;
use crate::heuristics::{DeviceClassifier, VendorProfile};
use crate::manual_add::{ManualAddition, probe_manual_printer};
use crate::prober::{PortProber, TcpPortProber};
use crate::range::{GatewaySource, NetworkRangeResolver, SystemGateway};
use crate::sources::{ManualPrinterCache, MdnsSource, PrinterSource, platform_source};
use crate::sweep::SubnetSweep;

/// Printer discovery engine.
pub struct PrinterDiscovery {
    config: DiscoveryConfig,
    classifier: Arc<DeviceClassifier>,
    prober: Arc<dyn PortProber>,
    fetcher: Arc<dyn BannerFetcher>,
    gateway: Arc<dyn GatewaySource>,
    manual: Option<Arc<dyn ManualPrinterCache>>,
    /// `None` means the default built from the current classifier.
    system: Option<Arc<dyn PrinterSource>>,
    mdns: Option<Arc<dyn PrinterSource>>,
    tester: ConnectivityTester,
    estimator: CapabilityEstimator,
}

impl PrinterDiscovery {
    /// Create an engine with the real collaborators. Fails only on an invalid
    /// config or if the HTTP client cannot be built.
    pub fn new(config: DiscoveryConfig) -> Result<Self> {
        config.validate()?;
        let gateway = Arc::new(SystemGateway::new(config.command_timeout()));
        Ok(Self {
            classifier: Arc::new(DeviceClassifier::default()),
            prober: Arc::new(TcpPortProber::new()),
            fetcher: Arc::new(HttpBannerFetcher::new()?),
            gateway,
            manual: None,
            system: None,
            mdns: None,
            tester: ConnectivityTester::new(),
            estimator: CapabilityEstimator::new(),
            config,
        })
    }

    pub fn config(&self) -> &DiscoveryConfig {
        &self.config
    }

    /// Use a different vendor's heuristic tables.
    pub fn with_vendor_profile(mut self, profile: VendorProfile) -> Self {
        self.classifier = Arc::new(DeviceClassifier::new(profile));
        self
    }

    pub fn with_manual_cache(mut self, cache: Arc<dyn ManualPrinterCache>) -> Self {
        self.manual = Some(cache);
        self
    }

    pub fn with_system_source(mut self, source: Arc<dyn PrinterSource>) -> Self {
        self.system = Some(source);
        self
    }

    pub fn with_mdns_source(mut self, source: Arc<dyn PrinterSource>) -> Self {
        self.mdns = Some(source);
        self
    }

    pub fn with_prober(mut self, prober: Arc<dyn PortProber>) -> Self {
        self.prober = prober;
        self
    }

    pub fn with_banner_fetcher(mut self, fetcher: Arc<dyn BannerFetcher>) -> Self {
        self.fetcher = fetcher;
        self
    }

    pub fn with_gateway_source(mut self, gateway: Arc<dyn GatewaySource>) -> Self {
        self.gateway = gateway;
        self
    }

    /// Run one full discovery: gather, deduplicate, annotate.
    ///
    /// Never fails; an empty list means nothing was found.
    #[instrument(skip(self))]
    pub async fn discover(&self) -> Vec<PrinterRecord> {
        info!("printer discovery started");

        let gathered = self.aggregator().aggregate().await;
        let total = gathered.len();

        let mut printers = dedup(gathered);
        for printer in &mut printers {
            printer.capabilities = self.estimator.estimate(&printer.uri);
        }

        info!(gathered = total, unique = printers.len(), "printer discovery finished");
        printers
    }

    /// Probe a printer the user entered by address, for saving to the manual
    /// cache.
    pub async fn probe_manual_printer(
        &self,
        ip: &str,
        port: u16,
        name: Option<&str>,
    ) -> Result<ManualAddition> {
        probe_manual_printer(
            &self.tester,
            &self.device_probe(),
            self.config.connectivity_timeout(),
            ip,
            port,
            name,
        )
        .await
    }

    /// The reachability checker, for callers that revalidate entries
    /// themselves.
    pub fn connectivity(&self) -> ConnectivityTester {
        self.tester
    }

    fn device_probe(&self) -> DeviceProbe {
        DeviceProbe::new(
            Arc::clone(&self.fetcher),
            Arc::clone(&self.classifier),
            self.config.banner_timeout(),
        )
    }

    fn aggregator(&self) -> SourceAggregator {
        let config = &self.config;
        let system = self.system.clone().unwrap_or_else(|| {
            platform_source(Arc::clone(&self.classifier), config.command_timeout())
        });
        let mdns = self.mdns.clone().unwrap_or_else(|| {
            Arc::new(MdnsSource::new(
                Arc::clone(&self.classifier),
                config.mdns_browse(),
            ))
        });

        SourceAggregator {
            manual: self.manual.clone(),
            system,
            resolver: NetworkRangeResolver::new(
                config.scan_ranges.clone(),
                config.ports.clone(),
                Arc::clone(&self.gateway),
            ),
            sweep: SubnetSweep::new(
                Arc::clone(&self.prober),
                self.device_probe(),
                config.max_workers,
                config.port_timeout(),
                config.sweep_deadline(),
            ),
            mdns,
            tester: self.tester,
            connectivity_timeout: config.connectivity_timeout(),
        }
    }
}
