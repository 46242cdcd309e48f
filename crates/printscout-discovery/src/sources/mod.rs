// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// External record producers: the manual printer cache, the operating system's
// printer list (CUPS or the Windows spooler), and multicast DNS browsing.
//
// Each sits behind a narrow trait so the engine never sees platform-specific
// control flow, and tests can substitute canned answers.

pub mod manual;
pub mod mdns;
pub mod system;

use async_trait::async_trait;

use printscout_core::types::RawDeviceInfo;

pub use manual::{ManualCache, ManualPrinterCache};
pub use mdns::MdnsSource;
pub use system::{LpstatSource, PowerShellSource, platform_source};

/// A producer of already-filtered device descriptions.
///
/// Implementations absorb their own failures and return an empty list.
#[async_trait]
pub trait PrinterSource: Send + Sync {
    async fn enumerate(&self) -> Vec<RawDeviceInfo>;
}

/// A source that never reports anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSource;

#[async_trait]
impl PrinterSource for NoSource {
    async fn enumerate(&self) -> Vec<RawDeviceInfo> {
        Vec::new()
    }
}

/// A source with a fixed answer.
#[derive(Debug, Clone, Default)]
pub struct StaticSource {
    devices: Vec<RawDeviceInfo>,
}

impl StaticSource {
    pub fn new(devices: Vec<RawDeviceInfo>) -> Self {
        Self { devices }
    }
}

#[async_trait]
impl PrinterSource for StaticSource {
    async fn enumerate(&self) -> Vec<RawDeviceInfo> {
        self.devices.clone()
    }
}
