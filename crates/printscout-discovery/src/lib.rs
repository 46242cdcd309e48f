// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Printscout discovery: subnet sweeps, banner classification, mDNS browsing
// and OS printer enumeration, merged into one deduplicated printer list.

pub mod aggregate;
pub mod banner;
pub mod capabilities;
pub mod command;
pub mod connectivity;
pub mod dedup;
pub mod discovery;
pub mod heuristics;
pub mod manual_add;
pub mod prober;
pub mod range;
pub mod sources;
pub mod sweep;

pub use aggregate::SourceAggregator;
pub use banner::{BannerFetcher, DeviceProbe, HttpBannerFetcher};
pub use capabilities::CapabilityEstimator;
pub use command::{CommandRunner, SystemCommands};
pub use connectivity::ConnectivityTester;
pub use discovery::PrinterDiscovery;
pub use heuristics::{DeviceClassifier, VendorProfile};
pub use manual_add::ManualAddition;
pub use prober::{PortProber, TcpPortProber};
pub use range::{GatewaySource, NetworkRangeResolver, SystemGateway};
pub use sources::{ManualCache, ManualPrinterCache, PowerShellSource, PrinterSource};
pub use sweep::SubnetSweep;
